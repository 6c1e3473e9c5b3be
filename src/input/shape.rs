//! Code for reading the weekly and seasonal shapes of each demand stream.
use super::*;
use crate::shape::{
    DemandShape, DemandStream, HOURS_PER_DAY, HOURS_PER_WEEK, SeasonalShape, ShapeLibrary,
    WeeklyShape,
};
use chrono::Weekday;
use serde::Deserialize;

const INDUSTRY_WEEKLY_FILE_NAME: &str = "industry_weekly_shape.csv";
const TRANSPORT_WEEKLY_FILE_NAME: &str = "transport_weekly_shapes.csv";
const TRANSPORT_SEASONAL_FILE_NAME: &str = "transport_seasonal_shapes.csv";

#[derive(Debug, Deserialize, PartialEq)]
struct DailyShapeRaw {
    hour: usize,
    #[serde(deserialize_with = "deserialise_non_negative")]
    weekday: f64,
    #[serde(deserialize_with = "deserialise_non_negative")]
    weekend: f64,
}

/// A row of a shape table with one weight per vehicle class
#[derive(Debug, Deserialize, PartialEq)]
struct VehicleShapeRaw {
    #[serde(alias = "hour")]
    period: usize,
    #[serde(deserialize_with = "deserialise_non_negative")]
    ld: f64,
    #[serde(deserialize_with = "deserialise_non_negative")]
    hd: f64,
}

/// Read the shapes needed by the sectors being modelled.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `parameters` - Model parameters
pub fn read_shape_library(model_dir: &Path, parameters: &ModelParameters) -> Result<ShapeLibrary> {
    let mut library = ShapeLibrary::default();

    if parameters.models_industry() {
        let file_path = model_dir.join(INDUSTRY_WEEKLY_FILE_NAME);
        let weekly = read_daily_shapes_from_iter(read_csv(&file_path)?)
            .with_context(|| input_err_msg(&file_path))?;
        library.insert(
            DemandStream::Industry,
            DemandShape {
                weekly,
                seasonal: SeasonalShape::uniform_monthly(),
            },
        )?;
    }

    if parameters.models_transport() {
        let file_path = model_dir.join(TRANSPORT_WEEKLY_FILE_NAME);
        let (ld_weekly, hd_weekly) = read_weekly_shapes_from_iter(
            read_csv(&file_path)?,
            parameters.reference_weekday.into(),
        )
        .with_context(|| input_err_msg(&file_path))?;

        let file_path = model_dir.join(TRANSPORT_SEASONAL_FILE_NAME);
        let (ld_seasonal, hd_seasonal) = read_seasonal_shapes_from_iter(read_csv(&file_path)?)
            .with_context(|| input_err_msg(&file_path))?;

        library.insert(
            DemandStream::TransportLd,
            DemandShape {
                weekly: ld_weekly,
                seasonal: ld_seasonal,
            },
        )?;
        library.insert(
            DemandStream::TransportHd,
            DemandShape {
                weekly: hd_weekly,
                seasonal: hd_seasonal,
            },
        )?;
    }

    Ok(library)
}

/// Check that rows are numbered consecutively from `first`
fn check_periods<I>(periods: I, first: usize) -> Result<()>
where
    I: IntoIterator<Item = usize>,
{
    for (expected, period) in (first..).zip(periods) {
        ensure!(
            period == expected,
            "Rows must be numbered consecutively from {first} (expected {expected}, found {period})"
        );
    }

    Ok(())
}

fn read_daily_shapes_from_iter<I>(iter: I) -> Result<WeeklyShape>
where
    I: Iterator<Item = DailyShapeRaw>,
{
    let rows: Vec<_> = iter.collect();
    ensure!(
        rows.len() == HOURS_PER_DAY,
        "Daily shape must have {HOURS_PER_DAY} rows (found {})",
        rows.len()
    );
    check_periods(rows.iter().map(|row| row.hour), 0)?;

    let weekday: Vec<_> = rows.iter().map(|row| row.weekday).collect();
    let weekend: Vec<_> = rows.iter().map(|row| row.weekend).collect();
    WeeklyShape::from_day_profiles(&weekday, &weekend)
}

fn split_vehicle_shapes(rows: &[VehicleShapeRaw]) -> (Vec<f64>, Vec<f64>) {
    rows.iter().map(|row| (row.ld, row.hd)).unzip()
}

fn read_weekly_shapes_from_iter<I>(
    iter: I,
    reference: Weekday,
) -> Result<(WeeklyShape, WeeklyShape)>
where
    I: Iterator<Item = VehicleShapeRaw>,
{
    let rows: Vec<_> = iter.collect();
    ensure!(
        rows.len() == HOURS_PER_WEEK,
        "Weekly shapes must have {HOURS_PER_WEEK} rows (found {})",
        rows.len()
    );
    check_periods(rows.iter().map(|row| row.period), 0)?;

    let (ld, hd) = split_vehicle_shapes(&rows);
    Ok((
        WeeklyShape::new(ld, reference).context("Invalid light-duty weekly shape")?,
        WeeklyShape::new(hd, reference).context("Invalid heavy-duty weekly shape")?,
    ))
}

fn read_seasonal_shapes_from_iter<I>(iter: I) -> Result<(SeasonalShape, SeasonalShape)>
where
    I: Iterator<Item = VehicleShapeRaw>,
{
    let rows: Vec<_> = iter.collect();
    check_periods(rows.iter().map(|row| row.period), 1)?;

    let (ld, hd) = split_vehicle_shapes(&rows);
    Ok((
        SeasonalShape::from_weights(ld).context("Invalid light-duty seasonal shape")?,
        SeasonalShape::from_weights(hd).context("Invalid heavy-duty seasonal shape")?,
    ))
}
