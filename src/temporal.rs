//! Disaggregation of annual demand into hourly profiles using weekly and seasonal shapes.
use crate::demand::{AnnualDemandTable, DemandKey};
use crate::shape::{DemandShape, hours_in_year, year_start};
use crate::units::Hydrogen;
use anyhow::{Context, Result, ensure};
use chrono::{Duration, NaiveDateTime};
use indexmap::IndexMap;
use std::iter;

/// Hourly demand (kg) for every hour of a year, starting at midnight on 1 January
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyProfile {
    year: u32,
    values: Vec<f64>,
}

/// Iterate over every hour of a year
fn iter_hours(year: u32) -> Result<impl Iterator<Item = NaiveDateTime>> {
    let start = year_start(year)?;
    let hours = hours_in_year(year)?;
    Ok(iter::successors(Some(start), |hour| Some(*hour + Duration::hours(1))).take(hours))
}

impl HourlyProfile {
    /// Create a profile from hourly values, checking its length matches the year
    pub fn new(year: u32, values: Vec<f64>) -> Result<Self> {
        let expected = hours_in_year(year)?;
        ensure!(
            values.len() == expected,
            "Hourly profile for {year} must have {expected} values (found {})",
            values.len()
        );

        Ok(Self { year, values })
    }

    /// The year this profile describes
    pub fn year(&self) -> u32 {
        self.year
    }

    /// Hourly values in chronological order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// The number of hours in the profile
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the profile has no hours
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Sum of all hourly values
    pub fn total(&self) -> Hydrogen {
        Hydrogen(self.values.iter().sum())
    }

    /// Iterate over (timestamp, value) pairs
    pub fn iter(&self) -> Result<impl Iterator<Item = (NaiveDateTime, f64)> + '_> {
        Ok(iter_hours(self.year)?.zip(self.values.iter().copied()))
    }

    /// Add two profiles hour by hour.
    ///
    /// Both profiles must describe the same year.
    pub fn try_add(&self, other: &HourlyProfile) -> Result<HourlyProfile> {
        ensure!(
            self.year == other.year && self.len() == other.len(),
            "Cannot add hourly profiles for different years ({} and {})",
            self.year,
            other.year
        );

        Ok(Self {
            year: self.year,
            values: self
                .values
                .iter()
                .zip(&other.values)
                .map(|(a, b)| a + b)
                .collect(),
        })
    }
}

/// Expand an annual total into an hourly profile.
///
/// Each hour is weighted by the product of its weekly and seasonal shape weights. Weights are
/// renormalised over the actual calendar of `year`, so the profile always sums to
/// `annual_total`.
pub fn disaggregate(
    annual_total: Hydrogen,
    shape: &DemandShape,
    year: u32,
) -> Result<HourlyProfile> {
    let total = annual_total.value();
    ensure!(
        total.is_finite() && total >= 0.0,
        "Invalid annual total {total} for {year}"
    );

    let weights: Vec<f64> = iter_hours(year)?
        .map(|datetime| shape.weekly.weight(datetime) * shape.seasonal.weight(datetime))
        .collect();
    let weight_sum: f64 = weights.iter().sum();
    ensure!(weight_sum > 0.0, "Combined shape weights sum to zero over {year}");

    let values = weights
        .into_iter()
        .map(|weight| total * weight / weight_sum)
        .collect();

    HourlyProfile::new(year, values)
}

/// Expand the annual total of every entry of a demand table into an hourly profile
pub fn disaggregate_table<K: DemandKey>(
    table: &AnnualDemandTable<K>,
    shape: &DemandShape,
) -> Result<IndexMap<K, HourlyProfile>> {
    table
        .iter()
        .map(|(key, total)| {
            let profile = disaggregate(total, shape, table.year())
                .with_context(|| format!("Failed to build hourly profile for {key}"))?;
            Ok((key.clone(), profile))
        })
        .collect()
}
