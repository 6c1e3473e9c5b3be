//! Code for reading the reference data used by the industry sector.
use super::*;
use crate::conversion::industry::DecarbonisationMap;
use crate::facility::{
    CategoryID, CategoryMap, ExistingHydrogenFacility, Facility, FacilityID, FacilityMap,
    FacilitySite, IndustryCategory, Unit,
};
use crate::fuel::{Fuel, FuelID, FuelMap, FuelTable};
use crate::id::IDCollection;
use crate::reconcile::SurveyTotal;
use crate::units::{Dimensionless, Emissions, EmissionsPerEnergy, Energy, Hydrogen, KG_PER_TONNE};
use float_cmp::approx_eq;
use geo::Point;
use log::warn;
use serde::Deserialize;
use std::collections::HashMap;

const FUELS_FILE_NAME: &str = "fuels.csv";
const FUEL_ALIASES_FILE_NAME: &str = "fuel_aliases.csv";
const FUEL_GROWTH_FILE_NAME: &str = "fuel_growth.csv";
const CATEGORIES_FILE_NAME: &str = "industry_categories.csv";
const DECARBONISATION_FILE_NAME: &str = "industry_decarbonisation.csv";
const FACILITY_UNITS_FILE_NAME: &str = "facility_units.csv";
const SURVEY_TOTALS_FILE_NAME: &str = "survey_totals.csv";
const EXTRA_FACILITIES_FILE_NAME: &str = "extra_facilities.csv";
const EXISTING_H2_FILE_NAME: &str = "existing_h2_facilities.csv";

/// Reference data for the industry sector
#[derive(Debug, Clone, PartialEq)]
pub struct IndustryInputs {
    /// Fuels, aliases and growth projections
    pub fuels: FuelTable,
    /// Industry categories
    pub categories: CategoryMap,
    /// Decarbonisation fraction for each category and milestone year
    pub decarbonisation: DecarbonisationMap,
    /// Facilities and their combustion units
    pub facilities: FacilityMap,
    /// Top-down survey totals
    pub surveys: Vec<SurveyTotal>,
    /// Facilities known to be missing from the bottom-up data
    pub extra_facilities: Vec<FacilitySite>,
    /// Facilities which already consume hydrogen
    pub existing_hydrogen: Vec<ExistingHydrogenFacility>,
    /// The fuel assumed for units without a reported fuel
    pub default_fuel: FuelID,
}

#[derive(Debug, Deserialize, PartialEq)]
struct FuelRaw {
    fuel_type: String,
    kg_co2_per_mmbtu: f64,
    is_biofuel: bool,
    #[serde(default, deserialize_with = "deserialise_optional_str")]
    growth_category: Option<String>,
}

#[derive(Debug, Deserialize, PartialEq)]
struct FuelAliasRaw {
    alias: String,
    fuel_type: String,
}

#[derive(Debug, Deserialize, PartialEq)]
struct FuelGrowthRaw {
    growth_category: String,
    year: u32,
    #[serde(deserialize_with = "deserialise_non_negative")]
    factor: f64,
}

#[derive(Debug, Deserialize, PartialEq)]
struct CategoryRaw {
    category: String,
    description: String,
    #[serde(deserialize_with = "deserialise_proportion")]
    high_temp_heat_ratio: f64,
}

#[derive(Debug, Deserialize, PartialEq)]
struct DecarbonisationRaw {
    category: String,
    year: u32,
    #[serde(deserialize_with = "deserialise_percentage")]
    percent: f64,
}

#[derive(Debug, Deserialize, PartialEq)]
struct FacilityUnitRaw {
    facility_id: String,
    facility_name: String,
    category: String,
    latitude: f64,
    longitude: f64,
    state: String,
    unit_name: String,
    #[serde(default, deserialize_with = "deserialise_optional_str")]
    fuel_type: Option<String>,
    #[serde(deserialize_with = "deserialise_non_negative")]
    unit_co2_emissions: f64,
}

#[derive(Debug, Deserialize, PartialEq)]
struct SurveyTotalRaw {
    category: String,
    region: String,
    #[serde(deserialize_with = "deserialise_non_negative")]
    energy_mmbtu: f64,
}

#[derive(Debug, Deserialize, PartialEq)]
struct ExtraFacilityRaw {
    facility_id: String,
    facility_name: String,
    category: String,
    region: String,
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize, PartialEq)]
struct ExistingHydrogenRaw {
    facility_id: String,
    facility_name: String,
    category: String,
    state: String,
    latitude: f64,
    longitude: f64,
    #[serde(deserialize_with = "deserialise_non_negative")]
    h2_consumption_kg: f64,
}

/// Read all reference data for the industry sector.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `parameters` - Model parameters
pub fn read_industry_inputs(
    model_dir: &Path,
    parameters: &ModelParameters,
) -> Result<IndustryInputs> {
    let fuels = read_fuel_table(model_dir)?;
    let default_fuel = fuels
        .resolve_required(&parameters.default_fuel)
        .context("Invalid default_fuel parameter")?
        .id
        .clone();

    let categories = read_categories(model_dir)?;
    let decarbonisation =
        read_decarbonisation(model_dir, &categories, &parameters.milestone_years)?;
    let facilities = read_facilities(model_dir, &categories)?;
    let surveys = read_survey_totals(model_dir, &categories)?;
    let extra_facilities = read_extra_facilities(model_dir, &categories)?;
    for site in &extra_facilities {
        ensure!(
            !facilities.contains_key(&site.id),
            "Extra facility {} is already listed in {FACILITY_UNITS_FILE_NAME}",
            site.id
        );
    }

    let existing_hydrogen = read_existing_hydrogen(model_dir, &categories)?;
    for existing in &existing_hydrogen {
        let id = &existing.site.id;
        ensure!(
            !facilities.contains_key(id) && !extra_facilities.iter().any(|site| site.id == *id),
            "Existing hydrogen facility {id} is also listed as an emitting or extra facility"
        );
    }
    if !existing_hydrogen.is_empty() && parameters.existing_h2_percent.is_empty() {
        warn!(
            "{EXISTING_H2_FILE_NAME} was provided but existing_h2_percent is not set: \
             existing hydrogen consumption will contribute no demand"
        );
    }

    Ok(IndustryInputs {
        fuels,
        categories,
        decarbonisation,
        facilities,
        surveys,
        extra_facilities,
        existing_hydrogen,
        default_fuel,
    })
}

/// Read fuels together with their aliases and growth projections
fn read_fuel_table(model_dir: &Path) -> Result<FuelTable> {
    let file_path = model_dir.join(FUELS_FILE_NAME);
    let fuels =
        read_fuels_from_iter(read_csv(&file_path)?).with_context(|| input_err_msg(&file_path))?;

    let file_path = model_dir.join(FUEL_ALIASES_FILE_NAME);
    let aliases = read_fuel_aliases_from_iter(read_csv_optional(&file_path)?)
        .with_context(|| input_err_msg(&file_path))?;

    let file_path = model_dir.join(FUEL_GROWTH_FILE_NAME);
    let growth = read_fuel_growth_from_iter(read_csv_optional(&file_path)?)
        .with_context(|| input_err_msg(&file_path))?;

    FuelTable::new(fuels, aliases, growth)
}

fn read_fuels_from_iter<I>(iter: I) -> Result<FuelMap>
where
    I: Iterator<Item = FuelRaw>,
{
    let mut fuels = FuelMap::new();
    for raw in iter {
        ensure!(
            raw.kg_co2_per_mmbtu.is_finite() && raw.kg_co2_per_mmbtu > 0.0,
            "Emission factor for {} must be greater than zero",
            raw.fuel_type
        );

        let fuel = Fuel {
            id: raw.fuel_type.trim().into(),
            emission_factor: EmissionsPerEnergy(raw.kg_co2_per_mmbtu),
            is_biofuel: raw.is_biofuel,
            growth_category: raw.growth_category,
        };
        ensure!(
            !fuels.contains_key(&fuel.id),
            "Duplicate fuel type {}",
            fuel.id
        );
        fuels.insert(fuel.id.clone(), fuel);
    }

    Ok(fuels)
}

fn read_fuel_aliases_from_iter<I>(iter: I) -> Result<HashMap<String, FuelID>>
where
    I: Iterator<Item = FuelAliasRaw>,
{
    let mut aliases = HashMap::new();
    for raw in iter {
        let alias = raw.alias.trim().to_string();
        ensure!(
            aliases
                .insert(alias.clone(), FuelID::from(raw.fuel_type.trim()))
                .is_none(),
            "Duplicate fuel alias '{alias}'"
        );
    }

    Ok(aliases)
}

fn read_fuel_growth_from_iter<I>(iter: I) -> Result<HashMap<(String, u32), Dimensionless>>
where
    I: Iterator<Item = FuelGrowthRaw>,
{
    let mut growth = HashMap::new();
    for raw in iter {
        ensure!(
            growth
                .insert((raw.growth_category.clone(), raw.year), Dimensionless(raw.factor))
                .is_none(),
            "Duplicate growth factor for category {} in {}",
            raw.growth_category,
            raw.year
        );
    }

    Ok(growth)
}

fn read_categories(model_dir: &Path) -> Result<CategoryMap> {
    let file_path = model_dir.join(CATEGORIES_FILE_NAME);
    read_categories_from_iter(read_csv(&file_path)?).with_context(|| input_err_msg(&file_path))
}

fn read_categories_from_iter<I>(iter: I) -> Result<CategoryMap>
where
    I: Iterator<Item = CategoryRaw>,
{
    let mut categories = CategoryMap::new();
    for raw in iter {
        let category = IndustryCategory {
            id: raw.category.trim().into(),
            description: raw.description,
            high_temp_heat_ratio: Dimensionless(raw.high_temp_heat_ratio),
        };
        ensure!(
            !categories.contains_key(&category.id),
            "Duplicate industry category {}",
            category.id
        );
        categories.insert(category.id.clone(), category);
    }

    Ok(categories)
}

fn read_decarbonisation(
    model_dir: &Path,
    categories: &CategoryMap,
    milestone_years: &[u32],
) -> Result<DecarbonisationMap> {
    let file_path = model_dir.join(DECARBONISATION_FILE_NAME);
    read_decarbonisation_from_iter(read_csv(&file_path)?, categories, milestone_years)
        .with_context(|| input_err_msg(&file_path))
}

fn read_decarbonisation_from_iter<I>(
    iter: I,
    categories: &CategoryMap,
    milestone_years: &[u32],
) -> Result<DecarbonisationMap>
where
    I: Iterator<Item = DecarbonisationRaw>,
{
    let mut map = DecarbonisationMap::new();
    for raw in iter {
        if !milestone_years.contains(&raw.year) {
            debug!(
                "Ignoring decarbonisation percentage for {} in non-milestone year {}",
                raw.category, raw.year
            );
            continue;
        }

        let category_id = categories.get_id_by_str(raw.category.trim())?;
        ensure!(
            map.insert(
                (category_id.clone(), raw.year),
                Dimensionless(raw.percent / 100.0)
            )
            .is_none(),
            "Duplicate decarbonisation percentage for category {category_id} in {}",
            raw.year
        );
    }

    for category_id in categories.keys() {
        for year in milestone_years {
            ensure!(
                map.contains_key(&(category_id.clone(), *year)),
                "Missing decarbonisation percentage for category {category_id} in {year}"
            );
        }
    }

    Ok(map)
}

/// Check that a latitude and longitude pair is valid and build a point from it
fn location(latitude: f64, longitude: f64) -> Result<Point<f64>> {
    ensure!(
        (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude),
        "Invalid location (latitude: {latitude}, longitude: {longitude})"
    );

    Ok(Point::new(longitude, latitude))
}

fn read_facilities(model_dir: &Path, categories: &CategoryMap) -> Result<FacilityMap> {
    let file_path = model_dir.join(FACILITY_UNITS_FILE_NAME);
    read_facilities_from_iter(read_csv(&file_path)?, categories)
        .with_context(|| input_err_msg(&file_path))
}

/// Group facility rows (one per unit and fuel) into facilities and units.
///
/// Every row of a facility must agree on its site details, and every row of a unit on its
/// emissions.
fn read_facilities_from_iter<I>(iter: I, categories: &CategoryMap) -> Result<FacilityMap>
where
    I: Iterator<Item = FacilityUnitRaw>,
{
    let mut facilities = FacilityMap::new();
    for raw in iter {
        let site = FacilitySite {
            id: raw.facility_id.trim().into(),
            name: raw.facility_name,
            category: categories.get_id_by_str(raw.category.trim())?,
            region: raw.state.trim().into(),
            location: location(raw.latitude, raw.longitude)?,
        };
        let facility = facilities
            .entry(site.id.clone())
            .or_insert_with(|| Facility {
                site: site.clone(),
                units: Vec::new(),
            });
        ensure!(
            facility.site == site,
            "Inconsistent site details for facility {}",
            site.id
        );

        let emissions = Emissions(raw.unit_co2_emissions * KG_PER_TONNE);
        let unit_name = raw.unit_name.trim();
        match facility.units.iter_mut().find(|unit| unit.name == unit_name) {
            Some(unit) => {
                ensure!(
                    approx_eq!(f64, unit.emissions.value(), emissions.value()),
                    "Inconsistent emissions for unit '{unit_name}' of facility {}",
                    site.id
                );
                unit.fuels.push(raw.fuel_type);
            }
            None => facility.units.push(Unit {
                name: unit_name.to_string(),
                emissions,
                fuels: vec![raw.fuel_type],
            }),
        }
    }

    Ok(facilities)
}

fn read_survey_totals(model_dir: &Path, categories: &CategoryMap) -> Result<Vec<SurveyTotal>> {
    let file_path = model_dir.join(SURVEY_TOTALS_FILE_NAME);
    read_survey_totals_from_iter(read_csv_optional(&file_path)?, categories)
        .with_context(|| input_err_msg(&file_path))
}

fn read_survey_totals_from_iter<I>(iter: I, categories: &CategoryMap) -> Result<Vec<SurveyTotal>>
where
    I: Iterator<Item = SurveyTotalRaw>,
{
    let mut surveys: Vec<SurveyTotal> = Vec::new();
    for raw in iter {
        let survey = SurveyTotal {
            category: categories.get_id_by_str(raw.category.trim())?,
            region: raw.region.trim().into(),
            energy: Energy(raw.energy_mmbtu),
        };
        ensure!(
            !surveys
                .iter()
                .any(|s| s.category == survey.category && s.region == survey.region),
            "Duplicate survey total for category {} in {}",
            survey.category,
            survey.region
        );
        surveys.push(survey);
    }

    Ok(surveys)
}

fn read_extra_facilities(
    model_dir: &Path,
    categories: &CategoryMap,
) -> Result<Vec<FacilitySite>> {
    let file_path = model_dir.join(EXTRA_FACILITIES_FILE_NAME);
    read_extra_facilities_from_iter(read_csv_optional(&file_path)?, categories)
        .with_context(|| input_err_msg(&file_path))
}

fn read_extra_facilities_from_iter<I>(
    iter: I,
    categories: &CategoryMap,
) -> Result<Vec<FacilitySite>>
where
    I: Iterator<Item = ExtraFacilityRaw>,
{
    let mut sites: Vec<FacilitySite> = Vec::new();
    for raw in iter {
        let id: FacilityID = raw.facility_id.trim().into();
        ensure!(
            !sites.iter().any(|site| site.id == id),
            "Duplicate extra facility {id}"
        );
        let category: CategoryID = categories.get_id_by_str(raw.category.trim())?;
        sites.push(FacilitySite {
            id,
            name: raw.facility_name,
            category,
            region: raw.region.trim().into(),
            location: location(raw.latitude, raw.longitude)?,
        });
    }

    Ok(sites)
}

fn read_existing_hydrogen(
    model_dir: &Path,
    categories: &CategoryMap,
) -> Result<Vec<ExistingHydrogenFacility>> {
    let file_path = model_dir.join(EXISTING_H2_FILE_NAME);
    read_existing_hydrogen_from_iter(read_csv_optional(&file_path)?, categories)
        .with_context(|| input_err_msg(&file_path))
}

fn read_existing_hydrogen_from_iter<I>(
    iter: I,
    categories: &CategoryMap,
) -> Result<Vec<ExistingHydrogenFacility>>
where
    I: Iterator<Item = ExistingHydrogenRaw>,
{
    let mut existing: Vec<ExistingHydrogenFacility> = Vec::new();
    for raw in iter {
        let id: FacilityID = raw.facility_id.trim().into();
        ensure!(
            !existing.iter().any(|facility| facility.site.id == id),
            "Duplicate existing hydrogen facility {id}"
        );
        let site = FacilitySite {
            id,
            name: raw.facility_name,
            category: categories.get_id_by_str(raw.category.trim())?,
            region: raw.state.trim().into(),
            location: location(raw.latitude, raw.longitude)?,
        };
        existing.push(ExistingHydrogenFacility {
            site,
            consumption: Hydrogen(raw.h2_consumption_kg),
        });
    }

    Ok(existing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, categories};
    use rstest::rstest;

    fn unit_row(
        facility_id: &str,
        unit_name: &str,
        fuel: Option<&str>,
        co2: f64,
    ) -> FacilityUnitRaw {
        FacilityUnitRaw {
            facility_id: facility_id.into(),
            facility_name: "Steel Works".into(),
            category: "331".into(),
            latitude: 37.0,
            longitude: -120.0,
            state: "CA".into(),
            unit_name: unit_name.into(),
            fuel_type: fuel.map(String::from),
            unit_co2_emissions: co2,
        }
    }

    #[rstest]
    fn test_read_facilities_groups_units(categories: CategoryMap) {
        let rows = [
            unit_row("F1", "U1", Some("Natural Gas"), 100.0),
            unit_row("F1", "U1", Some("Propane"), 100.0),
            unit_row("F1", "U2", None, 50.0),
            unit_row("F2", "U1", Some("Natural Gas"), 10.0),
        ];
        let facilities = read_facilities_from_iter(rows.into_iter(), &categories).unwrap();

        assert_eq!(facilities.len(), 2);
        let f1 = &facilities["F1"];
        assert_eq!(f1.site.location, Point::new(-120.0, 37.0));
        assert_eq!(f1.units.len(), 2);
        assert_eq!(
            f1.units[0].fuels,
            [Some("Natural Gas".to_string()), Some("Propane".to_string())]
        );
        assert_eq!(f1.units[0].emissions, Emissions(100_000.0));
        assert_eq!(f1.units[1].fuels, [None]);
    }

    #[rstest]
    fn test_read_facilities_inconsistent_emissions(categories: CategoryMap) {
        let rows = [
            unit_row("F1", "U1", Some("Natural Gas"), 100.0),
            unit_row("F1", "U1", Some("Propane"), 90.0),
        ];
        assert_error!(
            read_facilities_from_iter(rows.into_iter(), &categories),
            "Inconsistent emissions for unit 'U1' of facility F1"
        );
    }

    #[rstest]
    fn test_read_facilities_unknown_category(categories: CategoryMap) {
        let mut row = unit_row("F1", "U1", Some("Natural Gas"), 100.0);
        row.category = "999".into();
        assert_error!(
            read_facilities_from_iter([row].into_iter(), &categories),
            "Unknown ID 999 found"
        );
    }

    #[rstest]
    fn test_read_decarbonisation(categories: CategoryMap) {
        let row = |year, percent| DecarbonisationRaw {
            category: "331".into(),
            year,
            percent,
        };

        let map = read_decarbonisation_from_iter(
            [row(2030, 50.0), row(2035, 10.0), row(2040, 100.0)].into_iter(),
            &categories,
            &[2030, 2040],
        )
        .unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map[&(CategoryID::new("331"), 2030)], Dimensionless(0.5));

        assert_error!(
            read_decarbonisation_from_iter(
                [row(2030, 50.0)].into_iter(),
                &categories,
                &[2030, 2040]
            ),
            "Missing decarbonisation percentage for category 331 in 2040"
        );
    }

    #[test]
    fn test_read_fuels_bad_emission_factor() {
        let raw = FuelRaw {
            fuel_type: "Natural Gas".into(),
            kg_co2_per_mmbtu: 0.0,
            is_biofuel: false,
            growth_category: None,
        };
        assert_error!(
            read_fuels_from_iter([raw].into_iter()),
            "Emission factor for Natural Gas must be greater than zero"
        );
    }

    #[rstest]
    fn test_read_survey_totals_duplicate(categories: CategoryMap) {
        let row = || SurveyTotalRaw {
            category: "331".into(),
            region: "R1".into(),
            energy_mmbtu: 10.0,
        };
        assert_eq!(
            read_survey_totals_from_iter([row()].into_iter(), &categories)
                .unwrap()
                .len(),
            1
        );
        assert_error!(
            read_survey_totals_from_iter([row(), row()].into_iter(), &categories),
            "Duplicate survey total for category 331 in R1"
        );
    }

    #[rstest]
    fn test_read_existing_hydrogen(categories: CategoryMap) {
        let row = |id: &str, consumption| ExistingHydrogenRaw {
            facility_id: id.into(),
            facility_name: "Hydrogen Plant".into(),
            category: "331".into(),
            state: "CA".into(),
            latitude: 34.0,
            longitude: -118.0,
            h2_consumption_kg: consumption,
        };

        let existing =
            read_existing_hydrogen_from_iter([row("H1", 1000.0)].into_iter(), &categories)
                .unwrap();
        assert_eq!(existing.len(), 1);
        assert_eq!(existing[0].site.location, Point::new(-118.0, 34.0));
        assert_eq!(existing[0].consumption, Hydrogen(1000.0));

        assert_error!(
            read_existing_hydrogen_from_iter(
                [row("H1", 1000.0), row("H1", 5.0)].into_iter(),
                &categories
            ),
            "Duplicate existing hydrogen facility H1"
        );
    }

    #[test]
    fn test_location() {
        assert_eq!(location(37.0, -120.0).unwrap(), Point::new(-120.0, 37.0));
        assert!(location(120.0, 0.0).is_err());
    }
}
