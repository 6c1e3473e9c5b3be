//! Defines the `ModelParameters` struct, which represents the contents of `model.toml`.
use crate::input::{input_err_msg, read_toml};
use crate::shape::ReferenceWeekday;
use crate::units::{Dimensionless, EnergyPerHydrogen, energy_per_kg_hydrogen};
use crate::year::check_model_years;
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use serde_string_enum::DeserializeLabeledStringEnum;
use std::path::Path;

const MODEL_PARAMETERS_FILE_NAME: &str = "model.toml";

/// Btu in one pound of hydrogen (higher heating value)
const HHV_BTU_PER_LB: f64 = 61_013.0;

/// Btu in one pound of hydrogen (lower heating value)
const LHV_BTU_PER_LB: f64 = 51_585.0;

macro_rules! define_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            $value
        }
    };
}

define_param_default!(default_sectors, Vec<Sector>, vec![Sector::Transport, Sector::Industry]);
define_param_default!(default_fuel, String, "Natural Gas".into());
define_param_default!(default_zone_boundary_tolerance, bool, true);

/// An end-use sector for which hydrogen demand is modelled
#[derive(
    DeserializeLabeledStringEnum,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Clone,
    Copy,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumIter,
)]
pub enum Sector {
    /// On-road transport (light- and heavy-duty vehicles)
    #[string = "transport"]
    #[strum(serialize = "transport")]
    Transport,
    /// Heavy industry
    #[string = "industry"]
    #[strum(serialize = "industry")]
    Industry,
}

/// The heating value used to convert fuel energy into a mass of hydrogen
#[derive(DeserializeLabeledStringEnum, Debug, PartialEq, Default, Clone, Copy)]
pub enum HeatingValue {
    /// Higher heating value
    #[default]
    #[string = "hhv"]
    Higher,
    /// Lower heating value
    #[string = "lhv"]
    Lower,
}

impl HeatingValue {
    /// Btu contained in one pound of hydrogen
    pub fn btu_per_lb(self) -> f64 {
        match self {
            Self::Higher => HHV_BTU_PER_LB,
            Self::Lower => LHV_BTU_PER_LB,
        }
    }

    /// Energy (mmBtu) contained in one kilogram of hydrogen
    pub fn energy_per_kg(self) -> EnergyPerHydrogen {
        energy_per_kg_hydrogen(self.btu_per_lb())
    }
}

/// Represents the contents of the entire model file.
#[derive(Debug, Deserialize, PartialEq)]
pub struct ModelParameters {
    /// Years for which hydrogen demand is estimated
    pub milestone_years: Vec<u32>,
    /// Which end-use sectors to model
    #[serde(default = "default_sectors")]
    pub sectors: Vec<Sector>,
    /// The heating value used to convert fuel energy into hydrogen
    #[serde(default)]
    pub heating_value: HeatingValue,
    /// The fuel assumed for units which do not report a fuel type
    #[serde(default = "default_fuel")]
    pub default_fuel: String,
    /// The day of the week on which weekly shape profiles start
    #[serde(default)]
    pub reference_weekday: ReferenceWeekday,
    /// Whether facilities lying exactly on a zone boundary are attributed to that zone
    #[serde(default = "default_zone_boundary_tolerance")]
    pub zone_boundary_tolerance: bool,
    /// Percentage of existing hydrogen consumption counted as demand, one per milestone year.
    ///
    /// If empty, existing consumption contributes no demand.
    #[serde(default)]
    pub existing_h2_percent: Vec<f64>,
}

/// Check that the `sectors` parameter is valid
fn check_sectors(sectors: &[Sector]) -> Result<()> {
    ensure!(!sectors.is_empty(), "`sectors` is empty");

    let mut sorted = sectors.to_vec();
    sorted.sort();
    sorted.dedup();
    ensure!(
        sorted.len() == sectors.len(),
        "`sectors` must not contain duplicates"
    );

    Ok(())
}

/// Check that there is one valid `existing_h2_percent` value per milestone year, if any are given
fn check_existing_h2_percent(percent: &[f64], milestone_years: &[u32]) -> Result<()> {
    if percent.is_empty() {
        return Ok(());
    }

    ensure!(
        percent.len() == milestone_years.len(),
        "`existing_h2_percent` must have one value per milestone year (expected {}, found {})",
        milestone_years.len(),
        percent.len()
    );
    for value in percent {
        ensure!(
            (0.0..=100.0).contains(value),
            "`existing_h2_percent` values must be between 0 and 100 (found {value})"
        );
    }

    Ok(())
}

impl ModelParameters {
    /// Read a model file from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    ///
    /// # Returns
    ///
    /// The model file contents as a [`ModelParameters`] struct or an error if the file is invalid
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<ModelParameters> {
        let file_path = model_dir.as_ref().join(MODEL_PARAMETERS_FILE_NAME);
        let model_params: ModelParameters = read_toml(&file_path)?;

        model_params
            .validate()
            .with_context(|| input_err_msg(file_path))?;

        Ok(model_params)
    }

    /// Validate parameters after reading in file
    fn validate(&self) -> Result<()> {
        check_model_years(&self.milestone_years)?;
        check_sectors(&self.sectors)?;
        check_existing_h2_percent(&self.existing_h2_percent, &self.milestone_years)?;
        ensure!(
            !self.default_fuel.trim().is_empty(),
            "`default_fuel` cannot be empty"
        );

        Ok(())
    }

    /// Whether the transport sector is modelled
    pub fn models_transport(&self) -> bool {
        self.sectors.contains(&Sector::Transport)
    }

    /// Whether the industry sector is modelled
    pub fn models_industry(&self) -> bool {
        self.sectors.contains(&Sector::Industry)
    }

    /// The fraction (0-1) of existing hydrogen consumption counted as demand in `year`
    pub fn existing_h2_fraction(&self, year: u32) -> Result<Dimensionless> {
        if self.existing_h2_percent.is_empty() {
            return Ok(Dimensionless(0.0));
        }

        let index = self
            .milestone_years
            .iter()
            .position(|milestone_year| *milestone_year == year)
            .with_context(|| format!("{year} is not a milestone year"))?;
        let percent = self
            .existing_h2_percent
            .get(index)
            .with_context(|| format!("No existing hydrogen percentage for {year}"))?;

        Ok(Dimensionless(percent / 100.0))
    }
}
