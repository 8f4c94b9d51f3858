// Orbital State Model - heliocentric two-body Kepler mechanics
// Converts classical elements to a heliocentric position and propagates
// the mean anomaly forward in time. Single-body, no perturbations.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};

/// Astronomical Unit in meters
pub const AU: f64 = 1.495978707e11;

/// Sun's gravitational parameter μ = G * M_sun (m³/s²)
pub const MU_SUN: f64 = 1.32712440018e20;

pub const SECONDS_PER_DAY: f64 = 86400.0;

/// Newton-Raphson stopping tolerance on the eccentric-anomaly step (rad).
const KEPLER_TOLERANCE: f64 = 1e-12;
const KEPLER_MAX_ITERATIONS: usize = 50;

// =============================================================================
// CLASSICAL ORBITAL ELEMENTS
// =============================================================================

/// Classical orbital elements at an osculation epoch.
///
/// Lengths are in AU and angles in degrees, matching the normalized NEO
/// record this model consumes. Only elliptical orbits (e < 1) are valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitalElements {
    /// Semi-major axis (AU)
    pub semi_major_axis_au: f64,
    /// Eccentricity, valid in [0, 1)
    pub eccentricity: f64,
    /// Inclination (degrees)
    pub inclination_deg: f64,
    /// Longitude of the ascending node (degrees)
    pub ascending_node_deg: f64,
    /// Argument of perihelion (degrees)
    pub perihelion_arg_deg: f64,
    /// Mean anomaly at epoch (degrees)
    pub mean_anomaly_deg: f64,
    /// Osculation epoch (Julian date)
    pub epoch_jd: f64,
}

/// Heliocentric ecliptic position in AU, tagged with the epoch it holds for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HeliocentricPosition {
    pub x_au: f64,
    pub y_au: f64,
    pub z_au: f64,
    pub epoch_jd: f64,
}

impl OrbitalElements {
    /// Reject elements the two-body model cannot represent.
    pub fn validate(&self) -> Result<()> {
        if !(self.semi_major_axis_au > 0.0) {
            return Err(SimulationError::InvalidOrbitalElements(format!(
                "semi-major axis must be positive, got {} AU",
                self.semi_major_axis_au
            )));
        }
        if !(0.0..1.0).contains(&self.eccentricity) {
            return Err(SimulationError::InvalidOrbitalElements(format!(
                "eccentricity must be in [0, 1) for an elliptical orbit, got {}",
                self.eccentricity
            )));
        }
        Ok(())
    }

    /// Mean motion n = sqrt(μ_sun / a³) in rad/s.
    fn mean_motion_rad_s(&self) -> f64 {
        let a_m = self.semi_major_axis_au * AU;
        (MU_SUN / (a_m * a_m * a_m)).sqrt()
    }

    fn eccentric_anomaly(&self) -> Result<f64> {
        solve_kepler_equation(self.mean_anomaly_deg.to_radians(), self.eccentricity)
    }

    /// True anomaly in degrees, normalized to [0, 360).
    pub fn true_anomaly_deg(&self) -> Result<f64> {
        self.validate()?;
        let e = self.eccentricity;
        let ecc_anom = self.eccentric_anomaly()?;
        let nu = 2.0
            * ((1.0 + e).sqrt() * (ecc_anom / 2.0).sin())
                .atan2((1.0 - e).sqrt() * (ecc_anom / 2.0).cos());
        Ok(nu.to_degrees().rem_euclid(360.0))
    }

    /// Heliocentric ecliptic position at the elements' own epoch.
    ///
    /// Perifocal coordinates from (a, e, ν), then the 3-1-3 rotation through
    /// argument of perihelion, inclination, and ascending-node longitude.
    pub fn heliocentric_position(&self) -> Result<HeliocentricPosition> {
        self.validate()?;

        let a = self.semi_major_axis_au;
        let e = self.eccentricity;
        let i = self.inclination_deg.to_radians();
        let omega_big = self.ascending_node_deg.to_radians();
        let omega_small = self.perihelion_arg_deg.to_radians();

        let ecc_anom = self.eccentric_anomaly()?;
        let cos_e = ecc_anom.cos();
        let true_anomaly = 2.0
            * ((1.0 + e).sqrt() * (ecc_anom / 2.0).sin())
                .atan2((1.0 - e).sqrt() * (ecc_anom / 2.0).cos());

        // Distance from focus and position in the orbital plane
        let r = a * (1.0 - e * cos_e);
        let x_orb = r * true_anomaly.cos();
        let y_orb = r * true_anomaly.sin();

        // Rotation from perifocal to heliocentric ecliptic frame
        let cos_omega = omega_big.cos();
        let sin_omega = omega_big.sin();
        let cos_w = omega_small.cos();
        let sin_w = omega_small.sin();
        let cos_i = i.cos();
        let sin_i = i.sin();

        let r11 = cos_omega * cos_w - sin_omega * sin_w * cos_i;
        let r12 = -cos_omega * sin_w - sin_omega * cos_w * cos_i;
        let r21 = sin_omega * cos_w + cos_omega * sin_w * cos_i;
        let r22 = -sin_omega * sin_w + cos_omega * cos_w * cos_i;
        let r31 = sin_w * sin_i;
        let r32 = cos_w * sin_i;

        Ok(HeliocentricPosition {
            x_au: r11 * x_orb + r12 * y_orb,
            y_au: r21 * x_orb + r22 * y_orb,
            z_au: r31 * x_orb + r32 * y_orb,
            epoch_jd: self.epoch_jd,
        })
    }

    /// Advance the mean anomaly by `delta_days` and return the elements at
    /// the future epoch. All other elements are unchanged by the two-body
    /// model. `delta_days = 0` returns the current elements unmodified.
    pub fn propagate(&self, delta_days: f64) -> Result<OrbitalElements> {
        self.validate()?;
        if delta_days == 0.0 {
            return Ok(self.clone());
        }

        let n = self.mean_motion_rad_s();
        let m0 = self.mean_anomaly_deg.to_radians();
        let m = (m0 + n * delta_days * SECONDS_PER_DAY).rem_euclid(2.0 * PI);

        Ok(OrbitalElements {
            mean_anomaly_deg: m.to_degrees(),
            epoch_jd: self.epoch_jd + delta_days,
            ..self.clone()
        })
    }
}

/// Solve Kepler's equation M = E - e*sin(E) via Newton-Raphson, seeded at
/// E0 = M. Fails instead of returning a stale guess when the iteration
/// budget runs out.
pub fn solve_kepler_equation(mean_anomaly: f64, eccentricity: f64) -> Result<f64> {
    if eccentricity >= 1.0 {
        return Err(SimulationError::InvalidOrbitalElements(format!(
            "Kepler's equation is only solved for elliptical orbits, got e = {}",
            eccentricity
        )));
    }

    let mut e_anom = mean_anomaly;
    for _ in 0..KEPLER_MAX_ITERATIONS {
        let f = e_anom - eccentricity * e_anom.sin() - mean_anomaly;
        let f_prime = 1.0 - eccentricity * e_anom.cos();
        let delta = f / f_prime;
        e_anom -= delta;

        if delta.abs() < KEPLER_TOLERANCE {
            return Ok(e_anom);
        }
    }

    Err(SimulationError::InvalidOrbitalElements(format!(
        "Kepler solve did not converge within {} iterations (M = {}, e = {})",
        KEPLER_MAX_ITERATIONS, mean_anomaly, eccentricity
    )))
}

// =============================================================================
// TESTS
// =============================================================================
