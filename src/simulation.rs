// Simulation Orchestrator - one impact scenario end to end
// Sequences orbit propagation, energy, consequences, and atmosphere, joins
// the independent elevation lookup, and assembles the result document.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::task;
use tokio::time::timeout;

use crate::atmosphere::{estimate_atmospheric_changes, AtmosphericEffect};
use crate::consequences;
use crate::elevation::{ElevationResolver, ElevationSource};
use crate::energy::{self, ASTEROID_DENSITY};
use crate::error::{Result, SimulationError};
use crate::neo_client::{ApproachSample, NeoRecord};
use crate::orbital::{HeliocentricPosition, OrbitalElements};
use crate::persistence::ResultStore;

/// Tsunami run-up is reported at this fixed distance from the impact.
pub const TSUNAMI_REFERENCE_KM: f64 = 200.0;

// =============================================================================
// SCENARIO
// =============================================================================

/// Everything one simulation run consumes.
#[derive(Debug, Clone)]
pub struct ImpactScenario {
    pub asteroid_id: String,
    pub asteroid_name: String,
    pub diameter_km: f64,
    pub approach: ApproachSample,
    pub elements: OrbitalElements,
    pub impact_lat: f64,
    pub impact_lon: f64,
    pub dem_source: ElevationSource,
    pub propagate_days: f64,
}

impl ImpactScenario {
    /// Build a scenario from a normalized catalog record; the first
    /// close-approach sample supplies velocity and date.
    pub fn from_record(
        record: &NeoRecord,
        impact_lat: f64,
        impact_lon: f64,
        dem_source: ElevationSource,
        propagate_days: f64,
    ) -> Result<Self> {
        let approach = record.first_approach()?.clone();
        Ok(Self {
            asteroid_id: record.id.clone(),
            asteroid_name: record.name.clone(),
            diameter_km: record.diameter_km,
            approach,
            elements: record.elements.clone(),
            impact_lat,
            impact_lon,
            dem_source,
            propagate_days,
        })
    }
}

// =============================================================================
// RESULT DOCUMENT
// =============================================================================
// Field names and units below are the unit of external compatibility and
// must round-trip bit-for-bit through the persisted JSON.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AsteroidSummary {
    pub id: String,
    pub name: String,
    pub diameter_km: f64,
    pub velocity_kps_sample: f64,
    pub approach_date: String,
    pub miss_distance_km_sample: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HeliocentricCoords {
    #[serde(rename = "x_AU")]
    pub x_au: f64,
    #[serde(rename = "y_AU")]
    pub y_au: f64,
    #[serde(rename = "z_AU")]
    pub z_au: f64,
}

impl From<HeliocentricPosition> for HeliocentricCoords {
    fn from(pos: HeliocentricPosition) -> Self {
        Self {
            x_au: pos.x_au,
            y_au: pos.y_au,
            z_au: pos.z_au,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrbitSummary {
    pub epoch_jd: f64,
    #[serde(rename = "semi_major_axis_AU")]
    pub semi_major_axis_au: f64,
    pub eccentricity: f64,
    pub inclination_deg: f64,
    pub raan_deg: f64,
    pub argp_deg: f64,
    pub true_anomaly_deg: f64,
    pub heliocentric_current: HeliocentricCoords,
    pub heliocentric_future: HeliocentricCoords,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergyInfo {
    pub joules: f64,
    pub megatons_tnt: f64,
    pub risk_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactLocation {
    pub lat: f64,
    pub lon: f64,
    pub elevation_m: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsequenceReport {
    pub impact_location: ImpactLocation,
    pub crater_km: f64,
    pub seismic_mw: f64,
    pub tsunami_m_at_200km: f64,
    pub atmospheric_changes: AtmosphericEffect,
}

/// Aggregate of one simulation run; immutable after construction, owned by
/// the orchestrator until handed to the result store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    pub timestamp_utc: String,
    pub asteroid: AsteroidSummary,
    pub orbit: OrbitSummary,
    pub energy: EnergyInfo,
    pub consequences: ConsequenceReport,
}

// =============================================================================
// ORCHESTRATOR
// =============================================================================

pub struct Simulator {
    resolver: Arc<ElevationResolver>,
    store: ResultStore,
    deadline: Duration,
}

impl Simulator {
    pub fn new(resolver: ElevationResolver, store: ResultStore, deadline: Duration) -> Self {
        Self {
            resolver: Arc::new(resolver),
            store,
            deadline,
        }
    }

    /// Run one impact scenario and persist the result document.
    ///
    /// The elevation lookup has no ordering dependency on the orbital chain,
    /// so it runs on the blocking pool while the chain computes here. Either
    /// side failing fails the run; no partially-populated result escapes.
    pub async fn run(&self, scenario: ImpactScenario) -> Result<SimulationResult> {
        tracing::info!(
            asteroid_id = %scenario.asteroid_id,
            name = %scenario.asteroid_name,
            lat = scenario.impact_lat,
            lon = scenario.impact_lon,
            propagate_days = scenario.propagate_days,
            "starting impact simulation"
        );

        let resolver = Arc::clone(&self.resolver);
        let (lat, lon, source) = (scenario.impact_lat, scenario.impact_lon, scenario.dem_source);
        let elevation_task = task::spawn_blocking(move || resolver.elevation_at(lat, lon, source));

        // Orbital chain: current state, future state, reported anomaly
        let elements = &scenario.elements;
        let current_pos = elements.heliocentric_position()?;
        let future_elements = elements.propagate(scenario.propagate_days)?;
        let future_pos = future_elements.heliocentric_position()?;
        let true_anomaly_deg = elements.true_anomaly_deg()?;
        tracing::debug!(
            x_au = current_pos.x_au,
            y_au = current_pos.y_au,
            z_au = current_pos.z_au,
            "heliocentric state at epoch"
        );

        // Energy and risk
        let mass_kg = energy::mass_kg(scenario.diameter_km, ASTEROID_DENSITY)?;
        let joules = energy::kinetic_energy_j(mass_kg, scenario.approach.velocity_kps)?;
        let megatons_tnt = energy::energy_megatons(joules);
        let risk_text = energy::classify_risk(megatons_tnt).to_string();
        tracing::info!(joules, megatons_tnt, risk = %risk_text, "impact energy");

        // Consequences at the impact site
        let crater_km = consequences::crater_diameter_km(joules)?;
        let seismic_mw = consequences::seismic_magnitude(joules)?;
        let tsunami_m = consequences::tsunami_height_m(joules, TSUNAMI_REFERENCE_KM)?;
        let atmospheric_changes =
            estimate_atmospheric_changes(joules, scenario.impact_lat, scenario.impact_lon);

        let elevation_m = self.bounded("elevation lookup", elevation_task).await?;
        tracing::info!(lat, lon, elevation_m, "impact site elevation");

        let result = SimulationResult {
            timestamp_utc: Utc::now().to_rfc3339(),
            asteroid: AsteroidSummary {
                id: scenario.asteroid_id,
                name: scenario.asteroid_name,
                diameter_km: scenario.diameter_km,
                velocity_kps_sample: scenario.approach.velocity_kps,
                approach_date: scenario.approach.date,
                miss_distance_km_sample: scenario.approach.miss_distance_km,
            },
            orbit: OrbitSummary {
                epoch_jd: elements.epoch_jd,
                semi_major_axis_au: elements.semi_major_axis_au,
                eccentricity: elements.eccentricity,
                inclination_deg: elements.inclination_deg,
                raan_deg: elements.ascending_node_deg,
                argp_deg: elements.perihelion_arg_deg,
                true_anomaly_deg,
                heliocentric_current: current_pos.into(),
                heliocentric_future: future_pos.into(),
            },
            energy: EnergyInfo {
                joules,
                megatons_tnt,
                risk_text,
            },
            consequences: ConsequenceReport {
                impact_location: ImpactLocation {
                    lat: scenario.impact_lat,
                    lon: scenario.impact_lon,
                    elevation_m,
                },
                crater_km,
                seismic_mw,
                tsunami_m_at_200km: tsunami_m,
                atmospheric_changes,
            },
        };

        let store = self.store.clone();
        let document = result.clone();
        let persist_task = task::spawn_blocking(move || store.save(&document));
        let saved_to = self.bounded("result persistence", persist_task).await?;
        tracing::info!(path = %saved_to.display(), "simulation result persisted");
        Ok(result)
    }

    /// Join a blocking step under the configured deadline. Expiry maps to
    /// `Timeout`, a cancelled or panicked task to `Cancelled`.
    async fn bounded<T>(
        &self,
        stage: &'static str,
        handle: task::JoinHandle<Result<T>>,
    ) -> Result<T> {
        match timeout(self.deadline, handle).await {
            Err(_) => Err(SimulationError::Timeout {
                stage,
                limit_ms: self.deadline.as_millis() as u64,
            }),
            Ok(Err(join_err)) => Err(SimulationError::Cancelled {
                stage,
                reason: join_err.to_string(),
            }),
            Ok(Ok(outcome)) => outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simulator(deadline: Duration) -> Simulator {
        Simulator::new(
            ElevationResolver::new("data"),
            ResultStore::new("data/simulation_result.json"),
            deadline,
        )
    }

    #[tokio::test]
    async fn expired_deadline_maps_to_timeout() {
        let sim = simulator(Duration::from_millis(10));
        let slow = task::spawn_blocking(|| -> Result<f64> {
            std::thread::sleep(Duration::from_millis(200));
            Ok(12.5)
        });

        let err = sim.bounded("elevation lookup", slow).await.unwrap_err();
        assert!(matches!(
            err,
            SimulationError::Timeout {
                stage: "elevation lookup",
                limit_ms: 10,
            }
        ));
    }

    #[tokio::test]
    async fn panicked_lookup_maps_to_cancelled() {
        let sim = simulator(Duration::from_secs(5));
        let doomed = task::spawn_blocking(|| -> Result<f64> { panic!("lookup thread died") });

        let err = sim.bounded("elevation lookup", doomed).await.unwrap_err();
        assert!(matches!(
            err,
            SimulationError::Cancelled {
                stage: "elevation lookup",
                ..
            }
        ));
    }
}
