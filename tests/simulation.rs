// End-to-end simulation runs against temporary elevation datasets.
// No network: scenarios are built directly from normalized elements.

use std::fs;
use std::path::Path;
use std::time::Duration;

use approx::assert_relative_eq;
use serde_json::json;
use tempfile::TempDir;

use meteorsim::elevation::{ElevationResolver, ElevationSource};
use meteorsim::neo_client::ApproachSample;
use meteorsim::orbital::OrbitalElements;
use meteorsim::persistence::ResultStore;
use meteorsim::simulation::{ImpactScenario, Simulator};
use meteorsim::SimulationError;

/// Write a 10x10 tile over lat [28, 29], lon [-90, -89] with 12.5 m at the
/// cell containing (28.5, -89.5).
fn write_gulf_tile(root: &Path) {
    let dir = root.join("usgs");
    fs::create_dir_all(&dir).unwrap();
    let header = json!({
        "width": 10,
        "height": 10,
        "origin_lon": -90.0,
        "origin_lat": 29.0,
        "pixel_deg_lon": 0.1,
        "pixel_deg_lat": 0.1,
        "crs": "EPSG:4326",
        "nodata": -9999.0,
    });
    fs::write(dir.join("n29w090.json"), serde_json::to_vec(&header).unwrap()).unwrap();

    let mut values = vec![3.0_f32; 100];
    values[5 * 10 + 5] = 12.5;
    let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
    fs::write(dir.join("n29w090.grid"), bytes).unwrap();
}

fn reference_elements() -> OrbitalElements {
    OrbitalElements {
        semi_major_axis_au: 1.458,
        eccentricity: 0.2226,
        inclination_deg: 10.83,
        ascending_node_deg: 304.3,
        perihelion_arg_deg: 178.9,
        mean_anomaly_deg: 246.9,
        epoch_jd: 2460000.5,
    }
}

fn reference_scenario(propagate_days: f64) -> ImpactScenario {
    ImpactScenario {
        asteroid_id: "3542519".to_string(),
        asteroid_name: "(2010 PK9)".to_string(),
        diameter_km: 0.3,
        approach: ApproachSample {
            date: "2026-07-21".to_string(),
            velocity_kps: 20.0,
            miss_distance_km: Some(1200000.5),
        },
        elements: reference_elements(),
        impact_lat: 28.5,
        impact_lon: -89.5,
        dem_source: ElevationSource::Auto,
        propagate_days,
    }
}

fn simulator(data_root: &Path) -> Simulator {
    Simulator::new(
        ElevationResolver::new(data_root),
        ResultStore::new(data_root.join("simulation_result.json")),
        Duration::from_secs(10),
    )
}

#[tokio::test]
async fn full_run_produces_reference_numbers() {
    let dir = TempDir::new().unwrap();
    write_gulf_tile(dir.path());

    let result = simulator(dir.path())
        .run(reference_scenario(30.0))
        .await
        .unwrap();

    assert_relative_eq!(result.energy.joules, 8.4823e18, max_relative = 1e-4);
    assert_relative_eq!(result.energy.megatons_tnt, 2027.318, max_relative = 1e-4);
    assert_eq!(
        result.energy.risk_text,
        "Regional catastrophe (could devastate a country)"
    );

    assert_relative_eq!(result.consequences.crater_km, 26.2752, max_relative = 1e-4);
    assert_relative_eq!(result.consequences.seismic_mw, 9.41901, max_relative = 1e-5);
    assert_relative_eq!(
        result.consequences.tsunami_m_at_200km,
        0.0381604,
        max_relative = 1e-4
    );

    let atmo = &result.consequences.atmospheric_changes;
    assert_relative_eq!(atmo.temperature_rise_c, 8.48);
    assert_relative_eq!(atmo.pressure_wave_hpa, 84.82);
    assert_relative_eq!(atmo.wind_speed_kmh, 300.0);

    assert_relative_eq!(result.consequences.impact_location.elevation_m, 12.5);
    assert_relative_eq!(result.orbit.epoch_jd, 2460000.5);
    assert_eq!(result.asteroid.miss_distance_km_sample, Some(1200000.5));

    // 30 days on a 1.458 AU orbit moves the body
    let cur = &result.orbit.heliocentric_current;
    let fut = &result.orbit.heliocentric_future;
    assert!(
        (cur.x_au - fut.x_au).abs() + (cur.y_au - fut.y_au).abs() + (cur.z_au - fut.z_au).abs()
            > 1e-3
    );
}

#[tokio::test]
async fn zero_day_propagation_keeps_positions_identical() {
    let dir = TempDir::new().unwrap();
    write_gulf_tile(dir.path());

    let result = simulator(dir.path())
        .run(reference_scenario(0.0))
        .await
        .unwrap();

    let cur = &result.orbit.heliocentric_current;
    let fut = &result.orbit.heliocentric_future;
    assert_relative_eq!(cur.x_au, fut.x_au, epsilon = 1e-12);
    assert_relative_eq!(cur.y_au, fut.y_au, epsilon = 1e-12);
    assert_relative_eq!(cur.z_au, fut.z_au, epsilon = 1e-12);
}

#[tokio::test]
async fn persisted_document_keeps_exact_field_names() {
    let dir = TempDir::new().unwrap();
    write_gulf_tile(dir.path());

    simulator(dir.path())
        .run(reference_scenario(30.0))
        .await
        .unwrap();

    let raw = fs::read(dir.path().join("simulation_result.json")).unwrap();
    let doc: serde_json::Value = serde_json::from_slice(&raw).unwrap();

    assert!(doc["timestamp_utc"].is_string());
    for key in [
        "id",
        "name",
        "diameter_km",
        "velocity_kps_sample",
        "approach_date",
        "miss_distance_km_sample",
    ] {
        assert!(
            doc["asteroid"].get(key).is_some(),
            "missing asteroid.{key}"
        );
    }
    for key in [
        "epoch_jd",
        "semi_major_axis_AU",
        "eccentricity",
        "inclination_deg",
        "raan_deg",
        "argp_deg",
        "true_anomaly_deg",
    ] {
        assert!(doc["orbit"][key].is_f64() || doc["orbit"][key].is_i64(), "orbit.{key}");
    }
    for key in ["x_AU", "y_AU", "z_AU"] {
        assert!(doc["orbit"]["heliocentric_current"][key].is_f64());
        assert!(doc["orbit"]["heliocentric_future"][key].is_f64());
    }
    for key in ["joules", "megatons_tnt", "risk_text"] {
        assert!(doc["energy"].get(key).is_some(), "energy.{key}");
    }
    for key in ["lat", "lon", "elevation_m"] {
        assert!(doc["consequences"]["impact_location"][key].is_f64());
    }
    for key in ["crater_km", "seismic_mw", "tsunami_m_at_200km"] {
        assert!(doc["consequences"][key].is_f64(), "consequences.{key}");
    }
    for key in ["temperature_rise_C", "pressure_wave_hPa", "wind_speed_kmh"] {
        assert!(
            doc["consequences"]["atmospheric_changes"][key].is_f64(),
            "atmospheric_changes.{key}"
        );
    }
}

#[tokio::test]
async fn hyperbolic_elements_fail_before_anything_is_written() {
    let dir = TempDir::new().unwrap();
    write_gulf_tile(dir.path());

    let mut scenario = reference_scenario(30.0);
    scenario.elements.eccentricity = 1.05;

    let err = simulator(dir.path()).run(scenario).await.unwrap_err();
    assert!(matches!(err, SimulationError::InvalidOrbitalElements(_)));
    assert!(!dir.path().join("simulation_result.json").exists());
}

#[tokio::test]
async fn missing_every_dataset_surfaces_missing_dataset() {
    let dir = TempDir::new().unwrap();

    let err = simulator(dir.path())
        .run(reference_scenario(30.0))
        .await
        .unwrap_err();
    assert!(matches!(err, SimulationError::MissingDataset { .. }));
    assert!(!dir.path().join("simulation_result.json").exists());
}

#[tokio::test]
async fn explicit_source_mode_is_honored_end_to_end() {
    let dir = TempDir::new().unwrap();
    write_gulf_tile(dir.path());

    let mut scenario = reference_scenario(30.0);
    scenario.dem_source = ElevationSource::Usgs;
    let explicit = simulator(dir.path()).run(scenario).await.unwrap();
    assert_relative_eq!(explicit.consequences.impact_location.elevation_m, 12.5);

    let mut scenario = reference_scenario(30.0);
    scenario.dem_source = ElevationSource::Gebco;
    let err = simulator(dir.path()).run(scenario).await.unwrap_err();
    assert!(matches!(err, SimulationError::MissingDataset { .. }));
}
