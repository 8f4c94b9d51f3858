// Consequence Model - crater, seismic, and tsunami scaling laws
// Simplified empirical relations over the computed impact energy.

use crate::error::{Result, SimulationError};

fn require_positive_energy(energy_j: f64) -> Result<f64> {
    if !(energy_j > 0.0) {
        return Err(SimulationError::InvalidImpactor(format!(
            "impact energy must be positive, got {} J",
            energy_j
        )));
    }
    Ok(energy_j)
}

/// Transient crater diameter in km: 1.8 · E^0.22 meters.
pub fn crater_diameter_km(energy_j: f64) -> Result<f64> {
    let energy = require_positive_energy(energy_j)?;
    Ok(1.8 * energy.powf(0.22) / 1000.0)
}

/// Richter-like moment magnitude: Mw = (log10(E) - 4.8) / 1.5.
pub fn seismic_magnitude(energy_j: f64) -> Result<f64> {
    let energy = require_positive_energy(energy_j)?;
    Ok((energy.log10() - 4.8) / 1.5)
}

/// Tsunami run-up height in meters at `distance_km` from the impact:
/// source height h0 = E^0.25 / 1e5, attenuated by 1/sqrt(d).
pub fn tsunami_height_m(energy_j: f64, distance_km: f64) -> Result<f64> {
    let energy = require_positive_energy(energy_j)?;
    if !(distance_km > 0.0) {
        return Err(SimulationError::InvalidImpactor(format!(
            "tsunami reference distance must be positive, got {} km",
            distance_km
        )));
    }

    let h0 = energy.powf(0.25) / 1e5;
    Ok(h0 / distance_km.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::energy::{kinetic_energy_j, mass_kg, ASTEROID_DENSITY};
    use approx::assert_relative_eq;

    /// Energy of the 0.3 km / 20 km/s reference impactor, recomputed here so
    /// the scaling laws are cross-checked against the energy chain.
    fn reference_energy() -> f64 {
        let mass = mass_kg(0.3, ASTEROID_DENSITY).unwrap();
        kinetic_energy_j(mass, 20.0).unwrap()
    }

    #[test]
    fn reference_crater() {
        let crater = crater_diameter_km(reference_energy()).unwrap();
        assert_relative_eq!(crater, 26.2752, max_relative = 1e-4);
    }

    #[test]
    fn reference_seismic_magnitude() {
        let mw = seismic_magnitude(reference_energy()).unwrap();
        assert_relative_eq!(mw, 9.41901, max_relative = 1e-5);
    }

    #[test]
    fn reference_tsunami_at_200km() {
        let h = tsunami_height_m(reference_energy(), 200.0).unwrap();
        assert_relative_eq!(h, 0.0381604, max_relative = 1e-4);
    }

    #[test]
    fn tsunami_attenuates_with_distance() {
        let e = reference_energy();
        let near = tsunami_height_m(e, 50.0).unwrap();
        let far = tsunami_height_m(e, 800.0).unwrap();
        assert!(near > far);
        // 1/sqrt(d) attenuation: 16x distance -> 4x smaller
        assert_relative_eq!(near / far, 4.0, epsilon = 1e-9);
    }

    #[test]
    fn zero_energy_fails_instead_of_defaulting() {
        assert!(matches!(
            seismic_magnitude(0.0),
            Err(SimulationError::InvalidImpactor(_))
        ));
        assert!(crater_diameter_km(0.0).is_err());
        assert!(crater_diameter_km(-1.0).is_err());
        assert!(tsunami_height_m(0.0, 200.0).is_err());
    }

    #[test]
    fn zero_distance_fails() {
        assert!(matches!(
            tsunami_height_m(reference_energy(), 0.0),
            Err(SimulationError::InvalidImpactor(_))
        ));
    }
}
