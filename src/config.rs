// Process configuration - resolved once at startup and passed explicitly.
// The core never reads environment state on its own.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_NEOWS_BASE_URL: &str = "https://api.nasa.gov/neo/rest/v1";

#[derive(Debug, Clone)]
pub struct Config {
    /// NASA API key; `DEMO_KEY` works with tight rate limits.
    pub nasa_api_key: String,
    pub neows_base_url: String,
    /// Root of the elevation dataset tree (usgs/, srtm/, gebco/).
    pub data_dir: PathBuf,
    /// Where the persisted simulation result document lands.
    pub result_path: PathBuf,
    /// Deadline applied to the NEO fetch and to each blocking step of a
    /// simulation run.
    pub deadline: Duration,
}

impl Config {
    /// Build from environment variables, loading `.env` first when present.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let data_dir = PathBuf::from(
            env::var("METEORSIM_DATA_DIR").unwrap_or_else(|_| "data".to_string()),
        );
        let result_path = env::var("METEORSIM_RESULT_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("simulation_result.json"));
        let deadline_secs = env::var("METEORSIM_DEADLINE_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        Self {
            nasa_api_key: env::var("NASA_API_KEY").unwrap_or_else(|_| "DEMO_KEY".to_string()),
            neows_base_url: env::var("NEOWS_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_NEOWS_BASE_URL.to_string()),
            data_dir,
            result_path,
            deadline: Duration::from_secs(deadline_secs),
        }
    }
}
