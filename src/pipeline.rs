//! Functionality for running the demand model over its milestone years.
//!
//! Each (year, sector) pair is run independently. An integrity failure aborts only the affected
//! pair: it is logged and the remaining pairs still run, but the run as a whole then fails.
use crate::combine::{combine_annual, combine_grids, combine_hourly};
use crate::demand::AnnualDemandTable;
use crate::grid::DemandGrid;
use crate::model::Model;
use crate::model::parameters::Sector;
use crate::output::DataWriter;
use crate::temporal::HourlyProfile;
use crate::zone::ZoneID;
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;
use log::{error, info};
use std::path::{Path, PathBuf};

pub mod industry;
use industry::run_industry;
pub mod transport;
use transport::run_transport;

/// Configuration for a single model run.
///
/// Holds no reference data or results: those are owned by the [`Model`] and the stages.
#[derive(Debug, Clone, PartialEq)]
pub struct RunContext {
    /// Folder where output files are written
    pub output_path: PathBuf,
    /// Whether to write extra intermediate outputs
    pub debug_model: bool,
    /// The milestone years to run, in ascending order
    pub years: Vec<u32>,
}

impl RunContext {
    /// Create a new [`RunContext`].
    ///
    /// # Arguments
    ///
    /// * `model` - The model to be run
    /// * `output_path` - Folder where output files are written
    /// * `debug_model` - Whether to write extra intermediate outputs
    /// * `years` - A subset of the model's milestone years to run (all years if `None`)
    pub fn new(
        model: &Model,
        output_path: &Path,
        debug_model: bool,
        years: Option<&[u32]>,
    ) -> Result<Self> {
        let years = match years {
            None => model.iter_years().collect(),
            Some(years) => {
                ensure!(!years.is_empty(), "No years selected");
                for year in years {
                    ensure!(
                        model.parameters.milestone_years.contains(year),
                        "{year} is not a milestone year of this model"
                    );
                }
                let mut years = years.to_vec();
                years.sort_unstable();
                years.dedup();
                years
            }
        };

        Ok(Self {
            output_path: output_path.to_path_buf(),
            debug_model,
            years,
        })
    }
}

/// Annual and hourly demand by zone (and optionally by grid cell) for one year
#[derive(Debug, Clone, PartialEq)]
pub struct SectorOutput {
    /// The model year
    pub year: u32,
    /// Annual demand per zone
    pub zone_totals: AnnualDemandTable<ZoneID>,
    /// Hourly demand per zone
    pub zone_profiles: IndexMap<ZoneID, HourlyProfile>,
    /// Annual demand per grid cell, if the model has a grid
    pub grid: Option<DemandGrid>,
}

impl SectorOutput {
    /// Sum two outputs for the same year, keeping zones and cells present in either
    pub fn combine(&self, other: &Self) -> Result<Self> {
        ensure!(
            self.year == other.year,
            "Cannot combine outputs for different years ({} and {})",
            self.year,
            other.year
        );

        let grid = match (&self.grid, &other.grid) {
            (Some(a), Some(b)) => Some(combine_grids(a, b).context("Failed to combine grids")?),
            (Some(grid), None) | (None, Some(grid)) => Some(grid.clone()),
            (None, None) => None,
        };

        Ok(Self {
            year: self.year,
            zone_totals: combine_annual(&self.zone_totals, &other.zone_totals)?,
            zone_profiles: combine_hourly(&self.zone_profiles, &other.zone_profiles)?,
            grid,
        })
    }

    /// Log the totals of this output
    fn log_totals(&self, label: &str) {
        info!(
            "{label} demand for {}: {:.1} kg H2 across {} zone(s)",
            self.year,
            self.zone_totals.total().value(),
            self.zone_totals.len()
        );
    }
}

/// Log a failed (year, sector) pair and record it
fn record_failure(failures: &mut Vec<String>, label: String, err: &anyhow::Error) {
    error!("{label} failed: {err:?}");
    failures.push(label);
}

/// Run the model.
///
/// # Arguments
///
/// * `model` - The model to run
/// * `context` - Configuration for the run
pub fn run(model: &Model, context: &RunContext) -> Result<()> {
    let sectors = &model.parameters.sectors;
    let mut writer = DataWriter::create(&context.output_path, sectors, context.debug_model)?;
    let mut failures = Vec::new();

    for &year in &context.years {
        info!("Milestone year: {year}");

        let mut outputs = Vec::new();
        if model.parameters.models_industry() {
            match run_industry(model, year) {
                Ok(output) => {
                    output.demand.log_totals("Industry");
                    output.warnings.log_summary(&format!("Industry {year}"));
                    writer.write_warnings(year, Sector::Industry, &output.warnings)?;
                    writer.write_industry(&output)?;
                    outputs.push(output.demand);
                }
                Err(err) => record_failure(&mut failures, format!("Industry {year}"), &err),
            }
        }

        if model.parameters.models_transport() {
            match run_transport(model, year) {
                Ok(output) => {
                    output.demand.log_totals("Transport");
                    output.warnings.log_summary(&format!("Transport {year}"));
                    writer.write_warnings(year, Sector::Transport, &output.warnings)?;
                    writer.write_transport(&output)?;
                    outputs.push(output.demand);
                }
                Err(err) => record_failure(&mut failures, format!("Transport {year}"), &err),
            }
        }

        // Sectors are only combined when every modelled sector succeeded
        if sectors.len() > 1 && outputs.len() == sectors.len() {
            match outputs[0].combine(&outputs[1]) {
                Ok(combined) => {
                    combined.log_totals("Combined");
                    writer.write_combined(&combined)?;
                }
                Err(err) => record_failure(&mut failures, format!("Combining {year}"), &err),
            }
        }
    }

    writer.flush()?;
    ensure!(
        failures.is_empty(),
        "Model run failed for: {}",
        failures.join(", ")
    );

    Ok(())
}
