//! Code for working with temporal shape profiles.
//!
//! Shape profiles describe how an annual quantity is distributed over recurring periods: the
//! hours of a week and the months (or weeks) of a year. Raw weights are never assumed to be
//! normalised; every shape is normalised when it is constructed.
use anyhow::{Context, Result, bail, ensure};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};
use serde_string_enum::DeserializeLabeledStringEnum;
use std::collections::HashMap;

/// Number of hours in a day
pub const HOURS_PER_DAY: usize = 24;

/// Number of hours in a week
pub const HOURS_PER_WEEK: usize = 7 * HOURS_PER_DAY;

/// Number of months in a year
pub const MONTHS_PER_YEAR: usize = 12;

/// Tolerance used when checking that weights sum to one
const NORMALISATION_TOLERANCE: f64 = 1e-9;

/// An ordered sequence of non-negative weights over a fixed period
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeProfile(Vec<f64>);

impl ShapeProfile {
    /// Create a new [`ShapeProfile`] from raw weights.
    ///
    /// Weights must be finite and non-negative. They do not have to sum to one.
    pub fn new(weights: Vec<f64>) -> Result<Self> {
        ensure!(!weights.is_empty(), "Shape profile cannot be empty");
        for (i, weight) in weights.iter().enumerate() {
            ensure!(
                weight.is_finite() && *weight >= 0.0,
                "Invalid weight {weight} at position {i}: weights must be finite and >= 0"
            );
        }

        Ok(Self(weights))
    }

    /// The raw weights
    pub fn weights(&self) -> &[f64] {
        &self.0
    }

    /// The number of weights in the profile
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the profile contains no weights
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The sum of all weights
    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }

    /// Whether the weights already sum to one
    pub fn is_normalised(&self) -> bool {
        (self.sum() - 1.0).abs() <= NORMALISATION_TOLERANCE
    }

    /// Get a copy of this profile with weights scaled to sum to one.
    ///
    /// An all-zero profile cannot be normalised and results in an error.
    pub fn normalised(&self) -> Result<Self> {
        let sum = self.sum();
        ensure!(
            sum > 0.0,
            "Shape profile cannot be normalised: all weights are zero"
        );

        Ok(Self(self.0.iter().map(|weight| weight / sum).collect()))
    }

    /// Get the weight at the given index
    pub fn get(&self, index: usize) -> f64 {
        self.0[index]
    }
}

/// The day of the week on which weekly shape profiles start
#[derive(DeserializeLabeledStringEnum, Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum ReferenceWeekday {
    /// Profiles start at midnight on Sunday
    #[default]
    #[string = "sunday"]
    Sunday,
    /// Profiles start at midnight on Monday
    #[string = "monday"]
    Monday,
}

impl From<ReferenceWeekday> for Weekday {
    fn from(value: ReferenceWeekday) -> Self {
        match value {
            ReferenceWeekday::Sunday => Weekday::Sun,
            ReferenceWeekday::Monday => Weekday::Mon,
        }
    }
}

/// Get the index into a weekly shape for the given hour.
///
/// Index 0 is midnight on `reference`, so the calendar's actual weekday is rotated onto the
/// shape rather than assuming the year starts on the reference day.
pub fn hour_of_week(datetime: NaiveDateTime, reference: Weekday) -> usize {
    let days = (7 + datetime.weekday().num_days_from_monday() - reference.num_days_from_monday())
        % 7;
    days as usize * HOURS_PER_DAY + datetime.hour() as usize
}

/// The first hour of the given year
pub fn year_start(year: u32) -> Result<NaiveDateTime> {
    let year_i32 = i32::try_from(year).context("Year out of range")?;
    NaiveDate::from_ymd_opt(year_i32, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .with_context(|| format!("Invalid year {year}"))
}

/// The number of hours in the given year (8760, or 8784 for leap years)
pub fn hours_in_year(year: u32) -> Result<usize> {
    let start = year_start(year)?;
    let next = year_start(year + 1)?;
    let hours = (next - start).num_hours();

    usize::try_from(hours).context("Invalid number of hours in year")
}

/// A normalised 168-hour profile describing demand over the course of a week
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyShape {
    profile: ShapeProfile,
    reference: Weekday,
}

impl WeeklyShape {
    /// Create a new weekly shape from 168 raw hourly weights starting at midnight on `reference`
    pub fn new(weights: Vec<f64>, reference: Weekday) -> Result<Self> {
        ensure!(
            weights.len() == HOURS_PER_WEEK,
            "Weekly shape must have {HOURS_PER_WEEK} hourly weights (found {})",
            weights.len()
        );
        let profile = ShapeProfile::new(weights)?.normalised()?;

        Ok(Self { profile, reference })
    }

    /// Build a Sunday-first weekly shape from 24-hour weekday and weekend profiles.
    ///
    /// Sunday and Saturday use the weekend profile; all other days the weekday profile.
    pub fn from_day_profiles(weekday: &[f64], weekend: &[f64]) -> Result<Self> {
        ensure!(
            weekday.len() == HOURS_PER_DAY && weekend.len() == HOURS_PER_DAY,
            "Daily profiles must have {HOURS_PER_DAY} hourly weights"
        );

        let weights = (0..7)
            .flat_map(|day| {
                if day == 0 || day == 6 {
                    weekend.iter().copied()
                } else {
                    weekday.iter().copied()
                }
            })
            .collect();

        Self::new(weights, Weekday::Sun)
    }

    /// A weekly shape with equal weights for every hour
    pub fn uniform() -> Self {
        Self {
            profile: ShapeProfile(vec![1.0 / HOURS_PER_WEEK as f64; HOURS_PER_WEEK]),
            reference: Weekday::Sun,
        }
    }

    /// The normalised weights
    pub fn profile(&self) -> &ShapeProfile {
        &self.profile
    }

    /// The weekday on which the shape starts
    pub fn reference(&self) -> Weekday {
        self.reference
    }

    /// Get the weight for the given hour
    pub fn weight(&self, datetime: NaiveDateTime) -> f64 {
        self.profile.get(hour_of_week(datetime, self.reference))
    }
}

/// A normalised profile describing how demand varies over the course of a year
#[derive(Debug, Clone, PartialEq)]
pub enum SeasonalShape {
    /// One weight for each calendar month
    Monthly(ShapeProfile),
    /// One weight for each ISO week (52 or 53).
    ///
    /// Days are assigned by ISO week rather than calendar week, so the last days of December
    /// may take the weight of week 1 and the first days of January the weight of week 52 or 53.
    /// Week 53 maps onto the final weight for 52-week profiles.
    Weekly(ShapeProfile),
}

impl SeasonalShape {
    /// Create a seasonal shape from raw weights, choosing the period from the number of weights
    pub fn from_weights(weights: Vec<f64>) -> Result<Self> {
        let profile = ShapeProfile::new(weights)?.normalised()?;
        match profile.len() {
            MONTHS_PER_YEAR => Ok(Self::Monthly(profile)),
            52 | 53 => Ok(Self::Weekly(profile)),
            len => bail!("Seasonal shape must have 12, 52 or 53 weights (found {len})"),
        }
    }

    /// A seasonal shape with equal weights for every month
    pub fn uniform_monthly() -> Self {
        Self::Monthly(ShapeProfile(vec![
            1.0 / MONTHS_PER_YEAR as f64;
            MONTHS_PER_YEAR
        ]))
    }

    /// The normalised weights
    pub fn profile(&self) -> &ShapeProfile {
        match self {
            Self::Monthly(profile) | Self::Weekly(profile) => profile,
        }
    }

    /// Get the weight for the given hour.
    ///
    /// For weekly shapes this is the weight of the hour's ISO week, which near the turn of the
    /// year can belong to the neighbouring year.
    pub fn weight(&self, datetime: NaiveDateTime) -> f64 {
        match self {
            Self::Monthly(profile) => profile.get(datetime.month0() as usize),
            Self::Weekly(profile) => {
                let week0 = datetime.iso_week().week0() as usize;
                profile.get(week0.min(profile.len() - 1))
            }
        }
    }
}

/// A stream of demand with its own temporal shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
pub enum DemandStream {
    /// Industrial process heat
    #[strum(serialize = "industry")]
    Industry,
    /// Light-duty vehicle refuelling
    #[strum(serialize = "transport_ld")]
    TransportLd,
    /// Heavy-duty vehicle refuelling
    #[strum(serialize = "transport_hd")]
    TransportHd,
}

/// The weekly and seasonal shapes for one demand stream
#[derive(Debug, Clone, PartialEq)]
pub struct DemandShape {
    /// How demand varies within a week
    pub weekly: WeeklyShape,
    /// How demand varies within a year
    pub seasonal: SeasonalShape,
}

/// Read-only collection of the shapes used by every demand stream in a run
#[derive(Debug, Default, PartialEq)]
pub struct ShapeLibrary {
    shapes: HashMap<DemandStream, DemandShape>,
}

impl ShapeLibrary {
    /// Add the shape for a demand stream, failing if one is already present
    pub fn insert(&mut self, stream: DemandStream, shape: DemandShape) -> Result<()> {
        ensure!(
            self.shapes.insert(stream, shape).is_none(),
            "Duplicate shape for demand stream {stream}"
        );

        Ok(())
    }

    /// Get the shape for a demand stream
    pub fn get(&self, stream: DemandStream) -> Result<&DemandShape> {
        self.shapes
            .get(&stream)
            .with_context(|| format!("No shape profile loaded for demand stream {stream}"))
    }
}
