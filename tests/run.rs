//! Integration tests for the `run` command.
use float_cmp::assert_approx_eq;
use h2demand::cli::{RunOpts, handle_run_command};
use h2demand::settings::Settings;
use itertools::Itertools;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

#[derive(Deserialize)]
struct FacilityRow {
    year: u32,
    facility_id: String,
    zone: Option<String>,
    source: String,
    h2_demand_kg: f64,
}

#[derive(Deserialize)]
struct ZoneRow {
    year: u32,
    zone: String,
    h2_demand_kg: f64,
}

/// Get the path to the example model.
fn get_model_dir() -> PathBuf {
    PathBuf::from("demos/simple")
}

/// Count the data rows in a CSV file
fn count_rows(file_path: &Path) -> usize {
    csv::Reader::from_path(file_path)
        .unwrap()
        .records()
        .count()
}

/// Read all rows of a CSV file
fn read_rows<T: serde::de::DeserializeOwned>(file_path: &Path) -> Vec<T> {
    csv::Reader::from_path(file_path)
        .unwrap()
        .into_deserialize()
        .try_collect()
        .unwrap()
}

/// Get a zone's annual demand in a year from a load zone results file
fn zone_demand(file_path: &Path, year: u32, zone: &str) -> f64 {
    read_rows::<ZoneRow>(file_path)
        .into_iter()
        .find(|row| row.year == year && row.zone == zone)
        .unwrap()
        .h2_demand_kg
}

/// Check that existing hydrogen consumption is carried through to the combined totals
fn check_existing_hydrogen(output_dir: &Path) {
    let facilities: Vec<FacilityRow> =
        read_rows(&output_dir.join("industry/demand_by_facility.csv"));
    let plant = facilities
        .iter()
        .find(|row| row.year == 2050 && row.facility_id == "H2001")
        .unwrap();
    assert_eq!(plant.source, "existing_h2");
    assert_eq!(plant.zone.as_deref(), Some("CA_SOUTH"));
    assert_approx_eq!(f64, plant.h2_demand_kg, 25_000_000.0 * 0.2, epsilon = 1e-3);

    let industry = zone_demand(
        &output_dir.join("industry/load_zone_results.csv"),
        2050,
        "CA_SOUTH",
    );
    let transport = zone_demand(
        &output_dir.join("transport/load_zone_results.csv"),
        2050,
        "CA_SOUTH",
    );
    let combined = zone_demand(
        &output_dir.join("combined/load_zone_results.csv"),
        2050,
        "CA_SOUTH",
    );
    assert!(industry >= plant.h2_demand_kg);
    assert_approx_eq!(f64, combined, industry + transport, epsilon = 1e-3);
}

/// An integration test for the `run` command.
#[test]
fn test_handle_run_command() {
    unsafe { std::env::set_var("H2DEMAND_LOG_LEVEL", "off") };

    let tempdir = tempdir().unwrap();
    {
        // Save results to non-existent directory to check that directory creation works
        let output_dir = tempdir.path().join("results");
        let opts = RunOpts {
            output_dir: Some(output_dir.clone()),
            ..Default::default()
        };
        handle_run_command(&get_model_dir(), &opts, Some(Settings::default())).unwrap();

        assert!(output_dir.join("metadata.toml").is_file());
        assert!(output_dir.join("warnings.csv").is_file());
        assert!(count_rows(&output_dir.join("warnings.csv")) > 0);
        assert!(output_dir.join("transport/demand_by_state.csv").is_file());
        assert!(output_dir.join("industry/discrepancy_audit.csv").is_file());
        assert!(output_dir.join("combined/2050_demand_grid.geojson").is_file());

        // One row per zone and year
        assert_eq!(
            count_rows(&output_dir.join("combined/load_zone_results.csv")),
            6
        );

        // Hourly profiles for 2030, 2040 (a leap year) and 2050 are stacked in one file
        assert_eq!(
            count_rows(&output_dir.join("combined/demand_profiles/CA_NORTH_profile.csv")),
            8760 + 8784 + 8760
        );

        check_existing_hydrogen(&output_dir);
    }

    // Second time will fail because the logging is already initialised
    let opts = RunOpts {
        output_dir: Some(tempdir.path().join("more_results")),
        ..Default::default()
    };
    assert_eq!(
        handle_run_command(&get_model_dir(), &opts, Some(Settings::default()))
            .unwrap_err()
            .chain()
            .next()
            .unwrap()
            .to_string(),
        "Failed to initialise logging."
    );
}
