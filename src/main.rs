// Meteor Defender simulation runner
// Fetches one NEO from NASA, runs a single impact scenario against the local
// elevation datasets, and persists the result document.
//
// Usage: meteorsim [asteroid_id] [impact_lat] [impact_lon] [source] [days]

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use meteorsim::config::Config;
use meteorsim::elevation::{ElevationResolver, ElevationSource};
use meteorsim::neo_client::NeoWsClient;
use meteorsim::persistence::ResultStore;
use meteorsim::simulation::{ImpactScenario, Simulator};
use meteorsim::SimulationError;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "simulation failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> meteorsim::Result<()> {
    let config = Config::from_env();
    let args: Vec<String> = std::env::args().skip(1).collect();

    let asteroid_id = args
        .first()
        .cloned()
        .unwrap_or_else(|| "3542519".to_string());
    let impact_lat = numeric_arg(&args, 1, "impact_lat", 28.5)?;
    let impact_lon = numeric_arg(&args, 2, "impact_lon", -89.5)?;
    let dem_source = match args.get(3) {
        Some(raw) => raw.parse::<ElevationSource>()?,
        None => ElevationSource::Auto,
    };
    let propagate_days = numeric_arg(&args, 4, "days", 30.0)?;

    let record = NeoWsClient::new(&config)?.fetch_neo(&asteroid_id).await?;
    tracing::info!(
        name = %record.name,
        diameter_km = record.diameter_km,
        approaches = record.approaches.len(),
        "fetched NEO record"
    );

    let scenario = ImpactScenario::from_record(
        &record,
        impact_lat,
        impact_lon,
        dem_source,
        propagate_days,
    )?;

    let simulator = Simulator::new(
        ElevationResolver::new(config.data_dir.clone()),
        ResultStore::new(config.result_path.clone()),
        config.deadline,
    );
    let result = simulator.run(scenario).await?;

    tracing::info!(
        megatons_tnt = result.energy.megatons_tnt,
        risk = %result.energy.risk_text,
        crater_km = result.consequences.crater_km,
        seismic_mw = result.consequences.seismic_mw,
        "simulation complete"
    );
    Ok(())
}

/// Positional argument as f64; absent means the default, malformed is an
/// error rather than a silent fallback.
fn numeric_arg(args: &[String], index: usize, name: &str, default: f64) -> meteorsim::Result<f64> {
    match args.get(index) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| {
            SimulationError::InvalidArgument(format!("{name} must be numeric, got {raw:?}"))
        }),
    }
}
