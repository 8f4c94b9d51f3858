// Meteor Defender - asteroid impact simulation core
// From a NEO's orbital elements and an impact location, estimates impact
// energy, crater size, seismic magnitude, tsunami run-up, and rough
// atmospheric effects, with a terrain elevation lookup at the impact point.

pub mod atmosphere;
pub mod config;
pub mod consequences;
pub mod elevation;
pub mod energy;
pub mod error;
pub mod neo_client;
pub mod orbital;
pub mod persistence;
pub mod simulation;

pub use error::{Result, SimulationError};
pub use simulation::{ImpactScenario, SimulationResult, Simulator};
