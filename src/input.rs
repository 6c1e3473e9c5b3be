//! Common routines for handling input data.
use crate::model::Model;
use crate::model::parameters::ModelParameters;
use anyhow::{Context, Result, bail, ensure};
use geo::{Geometry, MultiPolygon};
use geojson::{Feature, GeoJson, JsonValue};
use itertools::Itertools;
use log::debug;
use serde::de::{Deserialize, DeserializeOwned, Deserializer};
use std::fs;
use std::path::Path;

pub mod grid;
use grid::read_grid_cells;
pub mod industry;
use industry::read_industry_inputs;
pub mod shape;
use shape::read_shape_library;
pub mod transport;
use transport::read_transport_inputs;
pub mod zone;
use zone::read_zones;

/// Read a series of type `T`s from a CSV file.
///
/// Will raise an error if the file is empty.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
pub fn read_csv<T: DeserializeOwned>(file_path: &Path) -> Result<impl Iterator<Item = T>> {
    let vec = read_csv_internal(file_path)?;
    ensure!(!vec.is_empty(), "CSV file {} cannot be empty", file_path.display());

    Ok(vec.into_iter())
}

/// Read a series of type `T`s from a CSV file, returning an empty iterator if the file is absent.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
pub fn read_csv_optional<T: DeserializeOwned>(
    file_path: &Path,
) -> Result<impl Iterator<Item = T>> {
    if !file_path.exists() {
        debug!("Optional file {} not found", file_path.display());
        return Ok(Vec::new().into_iter());
    }

    Ok(read_csv_internal(file_path)?.into_iter())
}

fn read_csv_internal<T: DeserializeOwned>(file_path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(file_path)
        .with_context(|| input_err_msg(file_path))?;

    let vec = reader
        .deserialize()
        .process_results(|iter| iter.collect_vec())
        .with_context(|| input_err_msg(file_path))?;

    Ok(vec)
}

/// Parse a TOML file at the specified path.
///
/// # Arguments
///
/// * `file_path` - Path to the TOML file
///
/// # Returns
///
/// * The deserialised TOML data or an error if the file could not be read or parsed.
pub fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let toml_str = fs::read_to_string(file_path).with_context(|| input_err_msg(file_path))?;
    let toml_data = toml::from_str(&toml_str).with_context(|| input_err_msg(file_path))?;
    Ok(toml_data)
}

/// Format an error message to include the file path. To be used with `anyhow::Context`.
pub fn input_err_msg<P: AsRef<Path>>(file_path: P) -> String {
    format!("Error reading {}", file_path.as_ref().display())
}

/// Read an f64, checking that it is between 0 and 1
pub fn deserialise_proportion<'de, D>(deserialiser: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Deserialize::deserialize(deserialiser)?;
    if !(0.0..=1.0).contains(&value) {
        Err(serde::de::Error::custom("Value must be between 0 and 1"))?;
    }

    Ok(value)
}

/// Read an f64, checking that it is a percentage between 0 and 100
pub fn deserialise_percentage<'de, D>(deserialiser: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Deserialize::deserialize(deserialiser)?;
    if !(0.0..=100.0).contains(&value) {
        Err(serde::de::Error::custom("Value must be a percentage between 0 and 100"))?;
    }

    Ok(value)
}

/// Read an f64, checking that it is finite and not negative
pub fn deserialise_non_negative<'de, D>(deserialiser: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value: f64 = Deserialize::deserialize(deserialiser)?;
    if !value.is_finite() || value < 0.0 {
        Err(serde::de::Error::custom("Value must be a finite number >= 0"))?;
    }

    Ok(value)
}

/// Read an optional string, treating empty cells as missing
pub fn deserialise_optional_str<'de, D>(deserialiser: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Deserialize::deserialize(deserialiser)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// Indicates whether the slice is sorted in strictly ascending order
pub fn is_sorted_and_unique<T: PartialOrd>(values: &[T]) -> bool {
    values.windows(2).all(|w| w[0] < w[1])
}

/// Read the features of a GeoJSON `FeatureCollection`
pub fn read_geojson_features(file_path: &Path) -> Result<Vec<Feature>> {
    let raw = fs::read_to_string(file_path).with_context(|| input_err_msg(file_path))?;
    let geojson: GeoJson = raw.parse().with_context(|| input_err_msg(file_path))?;
    let GeoJson::FeatureCollection(collection) = geojson else {
        bail!(
            "{}: expected a GeoJSON FeatureCollection",
            input_err_msg(file_path)
        );
    };
    ensure!(
        !collection.features.is_empty(),
        "GeoJSON file {} contains no features",
        file_path.display()
    );

    Ok(collection.features)
}

/// Get a string property of a GeoJSON feature
pub fn feature_str_property(feature: &Feature, name: &str) -> Result<String> {
    match feature.property(name) {
        Some(JsonValue::String(s)) => Ok(s.trim().to_string()),
        Some(JsonValue::Number(n)) => Ok(n.to_string()),
        Some(_) => bail!("Property '{name}' must be a string"),
        None => bail!("Feature is missing the '{name}' property"),
    }
}

/// Get a non-negative numeric property of a GeoJSON feature
pub fn feature_f64_property(feature: &Feature, name: &str) -> Result<f64> {
    let value = feature
        .property(name)
        .and_then(JsonValue::as_f64)
        .with_context(|| format!("Feature is missing the numeric '{name}' property"))?;
    ensure!(
        value.is_finite() && value >= 0.0,
        "Property '{name}' must be a finite number >= 0 (actual: {value})"
    );

    Ok(value)
}

/// Get the geometry of a GeoJSON feature as a [`MultiPolygon`]
pub fn feature_multi_polygon(feature: &Feature) -> Result<MultiPolygon<f64>> {
    let geometry = feature
        .geometry
        .clone()
        .context("Feature has no geometry")?;
    let geometry: Geometry<f64> = geometry
        .try_into()
        .context("Could not convert feature geometry")?;
    match geometry {
        Geometry::MultiPolygon(mp) => Ok(mp),
        Geometry::Polygon(p) => Ok(MultiPolygon(vec![p])),
        _ => bail!("Feature geometry must be a Polygon or MultiPolygon"),
    }
}

/// Read a model from the specified directory.
///
/// All reference tables are loaded and validated here, before any model year is run.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
///
/// # Returns
///
/// The loaded model or an error.
pub fn load_model<P: AsRef<Path>>(model_dir: P) -> Result<Model> {
    let model_dir = model_dir.as_ref();
    let parameters = ModelParameters::from_path(model_dir)?;

    let zones = read_zones(model_dir)?;
    let grid = read_grid_cells(model_dir)?;
    let shapes = read_shape_library(model_dir, &parameters)?;

    let industry = if parameters.models_industry() {
        Some(read_industry_inputs(model_dir, &parameters)?)
    } else {
        None
    };
    let transport = if parameters.models_transport() {
        Some(read_transport_inputs(model_dir, &parameters)?)
    } else {
        None
    };

    Ok(Model::new(
        model_dir.to_path_buf(),
        parameters,
        zones,
        grid,
        shapes,
        industry,
        transport,
    ))
}
