// Error taxonomy shared by every simulation component.
// The elevation resolver's auto mode recovers from the three dataset tags;
// everything else propagates to the caller untouched.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimulationError {
    /// Elements that cannot feed the two-body model: missing or unparsable
    /// fields, eccentricity >= 1, or a non-convergent Kepler solve.
    #[error("invalid orbital elements: {0}")]
    InvalidOrbitalElements(String),

    /// Non-physical impactor input (zero diameter, velocity, energy, ...).
    #[error("invalid impactor input: {0}")]
    InvalidImpactor(String),

    /// Every elevation source was tried and none covers the point.
    #[error("no elevation dataset covers ({lat}, {lon})")]
    MissingDataset { lat: f64, lon: f64 },

    /// The point maps outside the raster's row/column range.
    #[error("point outside raster {dataset}")]
    PointOutsideRaster { dataset: String },

    /// The raster covers the point but holds its no-data sentinel there.
    #[error("no data at point in {dataset}")]
    NoDataAtPoint { dataset: String },

    /// Unrecognized elevation source mode string.
    #[error("unknown elevation source: {0:?}")]
    UnknownSource(String),

    /// A command-line argument failed to parse.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// NEO catalog lookup failed (network, HTTP status, or JSON shape).
    #[error("NEO fetch failed: {0}")]
    UpstreamFetch(String),

    /// A blocking step exceeded the caller-supplied deadline.
    #[error("{stage} timed out after {limit_ms} ms")]
    Timeout { stage: &'static str, limit_ms: u64 },

    /// A spawned lookup task was cancelled or panicked before finishing.
    #[error("{stage} was cancelled: {reason}")]
    Cancelled { stage: &'static str, reason: String },

    #[error("failed to read dataset {path}: {source}")]
    DatasetRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed dataset header {path}: {source}")]
    DatasetHeader {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode simulation result: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to persist result to {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, SimulationError>;
