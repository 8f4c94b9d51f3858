// NASA NeoWs API Client
// Looks up a NEO by id and normalizes the sparse upstream record into the
// orbital elements and approach samples the simulation consumes.
//
// NeoWs serves every numeric orbital field as a string and omits fields
// freely. Each one is parsed into an Option and validated in one step that
// names every unusable field, instead of injecting 0.0 into the physics.

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Result, SimulationError};
use crate::orbital::OrbitalElements;

// =============================================================================
// API RESPONSE TYPES
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct NeoObject {
    pub id: String,
    pub name: String,
    pub estimated_diameter: Option<EstimatedDiameter>,
    pub close_approach_data: Option<Vec<CloseApproachData>>,
    pub orbital_data: Option<OrbitalData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EstimatedDiameter {
    pub kilometers: Option<DiameterRange>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiameterRange {
    pub estimated_diameter_min: f64,
    pub estimated_diameter_max: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CloseApproachData {
    pub close_approach_date: Option<String>,
    pub relative_velocity: Option<RelativeVelocity>,
    pub miss_distance: Option<MissDistance>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelativeVelocity {
    pub kilometers_per_second: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MissDistance {
    pub kilometers: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrbitalData {
    pub epoch_osculation: Option<String>,
    pub semi_major_axis: Option<String>,
    pub eccentricity: Option<String>,
    pub inclination: Option<String>,
    pub ascending_node_longitude: Option<String>,
    pub perihelion_argument: Option<String>,
    pub mean_anomaly: Option<String>,
}

// =============================================================================
// NORMALIZED RECORD
// =============================================================================

/// One sampled close approach from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApproachSample {
    pub date: String,
    pub velocity_kps: f64,
    pub miss_distance_km: Option<f64>,
}

/// Catalog record reduced to what a simulation run needs.
#[derive(Debug, Clone)]
pub struct NeoRecord {
    pub id: String,
    pub name: String,
    pub diameter_km: f64,
    pub elements: OrbitalElements,
    pub approaches: Vec<ApproachSample>,
}

impl NeoRecord {
    /// The approach sample a simulation uses: the first one on record.
    pub fn first_approach(&self) -> Result<&ApproachSample> {
        self.approaches.first().ok_or_else(|| {
            SimulationError::InvalidImpactor(format!(
                "NEO {} has no close-approach sample",
                self.id
            ))
        })
    }
}

fn parse_numeric(value: &Option<String>) -> Option<f64> {
    value.as_deref().and_then(|s| s.trim().parse().ok())
}

impl OrbitalData {
    /// Validate and convert into classical elements. Fails listing every
    /// missing or unparsable field.
    pub fn to_elements(&self) -> Result<OrbitalElements> {
        let fields = [
            ("semi_major_axis", &self.semi_major_axis),
            ("eccentricity", &self.eccentricity),
            ("inclination", &self.inclination),
            ("ascending_node_longitude", &self.ascending_node_longitude),
            ("perihelion_argument", &self.perihelion_argument),
            ("mean_anomaly", &self.mean_anomaly),
            ("epoch_osculation", &self.epoch_osculation),
        ];

        let mut parsed = [0.0_f64; 7];
        let mut unusable = Vec::new();
        for (slot, (name, raw)) in parsed.iter_mut().zip(fields.iter()) {
            match parse_numeric(raw) {
                Some(v) => *slot = v,
                None => unusable.push(*name),
            }
        }

        if !unusable.is_empty() {
            return Err(SimulationError::InvalidOrbitalElements(format!(
                "unusable orbital fields: {}",
                unusable.join(", ")
            )));
        }

        Ok(OrbitalElements {
            semi_major_axis_au: parsed[0],
            eccentricity: parsed[1],
            inclination_deg: parsed[2],
            ascending_node_deg: parsed[3],
            perihelion_arg_deg: parsed[4],
            mean_anomaly_deg: parsed[5],
            epoch_jd: parsed[6],
        })
    }
}

impl NeoObject {
    /// Normalize the raw catalog object.
    pub fn to_record(&self) -> Result<NeoRecord> {
        let orbital_data = self.orbital_data.as_ref().ok_or_else(|| {
            SimulationError::InvalidOrbitalElements(format!(
                "NEO {} carries no orbital_data",
                self.id
            ))
        })?;
        let elements = orbital_data.to_elements()?;

        let diameter_km = self
            .estimated_diameter
            .as_ref()
            .and_then(|d| d.kilometers.as_ref())
            .map(|km| km.estimated_diameter_max)
            .ok_or_else(|| {
                SimulationError::InvalidImpactor(format!(
                    "NEO {} has no estimated diameter",
                    self.id
                ))
            })?;

        let approaches = self
            .close_approach_data
            .iter()
            .flatten()
            .filter_map(|ca| {
                let velocity_kps = parse_numeric(
                    &ca.relative_velocity
                        .as_ref()
                        .and_then(|v| v.kilometers_per_second.clone()),
                )?;
                Some(ApproachSample {
                    date: ca.close_approach_date.clone().unwrap_or_default(),
                    velocity_kps,
                    miss_distance_km: parse_numeric(
                        &ca.miss_distance.as_ref().and_then(|m| m.kilometers.clone()),
                    ),
                })
            })
            .collect();

        Ok(NeoRecord {
            id: self.id.clone(),
            name: self.name.clone(),
            diameter_km,
            elements,
            approaches,
        })
    }
}

// =============================================================================
// API CLIENT
// =============================================================================

pub struct NeoWsClient {
    api_key: String,
    base_url: String,
    limit_ms: u64,
    client: reqwest::Client,
}

impl NeoWsClient {
    /// Build a client whose requests share the configured deadline.
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.deadline)
            .build()
            .map_err(|e| SimulationError::UpstreamFetch(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_key: config.nasa_api_key.clone(),
            base_url: config.neows_base_url.clone(),
            limit_ms: config.deadline.as_millis() as u64,
            client,
        })
    }

    fn map_request_error(&self, e: reqwest::Error, context: &str) -> SimulationError {
        if e.is_timeout() {
            SimulationError::Timeout {
                stage: "NEO fetch",
                limit_ms: self.limit_ms,
            }
        } else {
            SimulationError::UpstreamFetch(format!("{context}: {e}"))
        }
    }

    /// Fetch one NEO by its SPK-ID and normalize it.
    pub async fn fetch_neo(&self, neo_id: &str) -> Result<NeoRecord> {
        let url = format!("{}/neo/{}?api_key={}", self.base_url, neo_id, self.api_key);
        tracing::debug!(neo_id, "fetching NEO record");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_request_error(e, "request failed"))?;

        if !response.status().is_success() {
            return Err(SimulationError::UpstreamFetch(format!(
                "API returned status: {}",
                response.status()
            )));
        }

        let neo: NeoObject = response
            .json()
            .await
            .map_err(|e| self.map_request_error(e, "failed to parse response"))?;

        neo.to_record()
    }
}
