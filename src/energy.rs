// Impact Energy Model - mass, kinetic energy, and comparative risk tiers
// Pure functions over impactor geometry; nothing here touches I/O.

use std::f64::consts::PI;

use crate::error::{Result, SimulationError};

/// Bulk density of a typical stony asteroid (kg/m³)
pub const ASTEROID_DENSITY: f64 = 3000.0;

/// TNT equivalent: 1 megaton = 4.184e15 J
pub const JOULES_PER_MEGATON: f64 = 4.184e15;

/// Mass in kg of a uniform sphere of the given diameter and bulk density.
pub fn mass_kg(diameter_km: f64, density_kg_m3: f64) -> Result<f64> {
    if !(diameter_km > 0.0) {
        return Err(SimulationError::InvalidImpactor(format!(
            "diameter must be positive, got {} km",
            diameter_km
        )));
    }
    if !(density_kg_m3 > 0.0) {
        return Err(SimulationError::InvalidImpactor(format!(
            "density must be positive, got {} kg/m³",
            density_kg_m3
        )));
    }

    let radius_m = diameter_km * 1000.0 / 2.0;
    let volume = (4.0 / 3.0) * PI * radius_m.powi(3);
    Ok(volume * density_kg_m3)
}

/// Kinetic energy in joules: ½·m·v².
pub fn kinetic_energy_j(mass_kg: f64, velocity_kps: f64) -> Result<f64> {
    if !(mass_kg > 0.0) {
        return Err(SimulationError::InvalidImpactor(format!(
            "mass must be positive, got {} kg",
            mass_kg
        )));
    }
    if !(velocity_kps > 0.0) {
        return Err(SimulationError::InvalidImpactor(format!(
            "velocity must be positive, got {} km/s",
            velocity_kps
        )));
    }

    let velocity_ms = velocity_kps * 1000.0;
    Ok(0.5 * mass_kg * velocity_ms * velocity_ms)
}

/// Joules to megatons of TNT equivalent.
pub fn energy_megatons(energy_joules: f64) -> f64 {
    energy_joules / JOULES_PER_MEGATON
}

/// Classify impact energy against historical and comparative events.
///
/// Reference points: Hiroshima ~0.015 MT, Tunguska ~15 MT,
/// Chicxulub ~1e8 MT. Monotone step function over megatons.
pub fn classify_risk(energy_mt: f64) -> &'static str {
    if energy_mt < 0.001 {
        "Negligible (smaller than most nuclear tests)"
    } else if energy_mt < 0.015 {
        "Comparable to small nuclear bomb (< Hiroshima)"
    } else if energy_mt < 1.0 {
        "Comparable to Hiroshima bomb (15 kt TNT)"
    } else if energy_mt < 20.0 {
        "Comparable to Tunguska event (~15 MT)"
    } else if energy_mt < 1e6 {
        "Regional catastrophe (could devastate a country)"
    } else if energy_mt < 1e8 {
        "Global consequences (climate disruption)"
    } else {
        "Mass extinction scale (Chicxulub-level event)"
    }
}
