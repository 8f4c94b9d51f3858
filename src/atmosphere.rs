// Atmospheric Model - illustrative post-impact perturbations
// Linear in energy and independently capped. These are not real climate
// physics; the caps keep the outputs in a plausible display range.

use serde::{Deserialize, Serialize};

/// Capped atmospheric perturbations at the impact site.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AtmosphericEffect {
    #[serde(rename = "temperature_rise_C")]
    pub temperature_rise_c: f64,
    #[serde(rename = "pressure_wave_hPa")]
    pub pressure_wave_hpa: f64,
    pub wind_speed_kmh: f64,
}

/// Estimate atmospheric changes from the impact energy.
///
/// Latitude and longitude are provenance only; the scaling is location
/// independent. Known limitation of the model.
pub fn estimate_atmospheric_changes(
    energy_joules: f64,
    impact_lat: f64,
    impact_lon: f64,
) -> AtmosphericEffect {
    tracing::debug!(
        lat = impact_lat,
        lon = impact_lon,
        energy_joules,
        "estimating atmospheric changes"
    );

    AtmosphericEffect {
        temperature_rise_c: round2((energy_joules / 1e18).min(10.0)),
        pressure_wave_hpa: round2((energy_joules / 1e17).min(500.0)),
        wind_speed_kmh: round2((energy_joules / 1e16).min(300.0)),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
