//! Converts facility emissions into per-fuel energy use and projects hydrogen demand.
use crate::facility::{
    ActivityRecord, CategoryID, CategoryMap, ExistingHydrogenFacility, Facility, FacilityMap,
    FacilitySite, Unit,
};
use crate::fuel::{Fuel, FuelTable};
use crate::model::parameters::HeatingValue;
use crate::units::{Dimensionless, EmissionsPerEnergy, Hydrogen};
use crate::warning::{StageWarning, WarningLog};
use anyhow::{Context, Result};
use indexmap::IndexMap;

/// Decarbonisation fraction (0-1) for each category and year
pub type DecarbonisationMap = IndexMap<(CategoryID, u32), Dimensionless>;

/// Derive activity records for every unit of every facility.
///
/// Each unit's emissions are converted into energy using the mean emission factor of its
/// recognised fuels, then split evenly between those fuels. Biofuels take part in both the mean
/// and the split but their records are marked as excluded.
pub fn derive_activity(
    facilities: &FacilityMap,
    fuels: &FuelTable,
    default_fuel: &Fuel,
    warnings: &mut WarningLog,
) -> Vec<ActivityRecord> {
    let mut records = Vec::new();
    for facility in facilities.values() {
        for unit in &facility.units {
            records.extend(unit_activity(facility, unit, fuels, default_fuel, warnings));
        }
    }

    records
}

/// Resolve the distinct recognised fuels reported for a unit
fn resolve_unit_fuels<'a>(
    facility: &Facility,
    unit: &Unit,
    fuels: &'a FuelTable,
    default_fuel: &'a Fuel,
    warnings: &mut WarningLog,
) -> Vec<&'a Fuel> {
    let mut resolved: Vec<&Fuel> = Vec::new();
    for name in &unit.fuels {
        let fuel = match name {
            None => {
                warnings.push(StageWarning::DefaultFuelAssumed {
                    facility: facility.site.id.clone(),
                    unit: unit.name.clone(),
                    fuel: default_fuel.id.to_string(),
                });
                Some(default_fuel)
            }
            Some(name) => {
                let fuel = fuels.resolve(name);
                if fuel.is_none() {
                    warnings.push(StageWarning::UnknownFuel {
                        facility: facility.site.id.clone(),
                        unit: unit.name.clone(),
                        fuel: name.clone(),
                    });
                }
                fuel
            }
        };

        if let Some(fuel) = fuel {
            if !resolved.iter().any(|f| f.id == fuel.id) {
                resolved.push(fuel);
            }
        }
    }

    resolved
}

fn unit_activity(
    facility: &Facility,
    unit: &Unit,
    fuels: &FuelTable,
    default_fuel: &Fuel,
    warnings: &mut WarningLog,
) -> Vec<ActivityRecord> {
    let unit_fuels = resolve_unit_fuels(facility, unit, fuels, default_fuel, warnings);
    if unit_fuels.is_empty() {
        warnings.push(StageWarning::NoRecognisedFuel {
            facility: facility.site.id.clone(),
            unit: unit.name.clone(),
        });
        return Vec::new();
    }

    let num_fuels = Dimensionless(unit_fuels.len() as f64);
    let mean_factor = EmissionsPerEnergy(
        unit_fuels
            .iter()
            .map(|fuel| fuel.emission_factor.value())
            .sum::<f64>()
            / num_fuels.0,
    );
    let energy_per_fuel = unit.emissions / mean_factor / num_fuels;

    unit_fuels
        .into_iter()
        .map(|fuel| ActivityRecord {
            facility_id: facility.site.id.clone(),
            unit: unit.name.clone(),
            category: facility.site.category.clone(),
            region: facility.site.region.clone(),
            fuel: fuel.id.clone(),
            energy: energy_per_fuel,
            excluded: fuel.is_biofuel,
            synthetic: false,
        })
        .collect()
}

/// Demand from facilities which already consume hydrogen.
///
/// Only `fraction` of each facility's current consumption is counted, i.e. the share of existing
/// supply assumed to be replaced by the modelled hydrogen.
pub fn existing_hydrogen_demand(
    facilities: &[ExistingHydrogenFacility],
    fraction: Dimensionless,
) -> impl Iterator<Item = (&FacilitySite, Hydrogen)> {
    facilities
        .iter()
        .map(move |facility| (&facility.site, facility.consumption * fraction))
}

/// Projects the energy of activity records onto hydrogen demand for a model year
pub struct IndustryProjection<'a> {
    /// Industry categories
    pub categories: &'a CategoryMap,
    /// Decarbonisation fractions by category and year
    pub decarbonisation: &'a DecarbonisationMap,
    /// Fuels and their growth projections
    pub fuels: &'a FuelTable,
    /// The heating value of hydrogen
    pub heating_value: HeatingValue,
}

impl IndustryProjection<'_> {
    /// Get the hydrogen demand for an activity record in the given year.
    ///
    /// Excluded records always have zero demand.
    pub fn hydrogen(&self, record: &ActivityRecord, year: u32) -> Result<Hydrogen> {
        if record.excluded {
            return Ok(Hydrogen(0.0));
        }

        let category = self
            .categories
            .get(&record.category)
            .with_context(|| format!("Unknown industry category {}", record.category))?;
        let decarbonisation = self
            .decarbonisation
            .get(&(record.category.clone(), year))
            .with_context(|| {
                format!(
                    "No decarbonisation percentage for category {} in {year}",
                    record.category
                )
            })?;
        let fuel = self
            .fuels
            .get(&record.fuel)
            .with_context(|| format!("Unknown fuel type '{}'", record.fuel))?;
        let growth = self.fuels.growth_factor(fuel, year);

        let energy =
            record.energy * *decarbonisation * category.high_temp_heat_ratio * growth;
        Ok(energy / self.heating_value.energy_per_kg())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{categories, decarbonisation, facility, fuel_table};
    use crate::units::{Emissions, Energy, KG_PER_TONNE};
    use float_cmp::assert_approx_eq;
    use indexmap::indexmap;
    use rstest::rstest;

    fn single_unit_facility(site: &FacilitySite, fuels: &[Option<&str>]) -> FacilityMap {
        let facility = Facility {
            site: site.clone(),
            units: vec![Unit {
                name: "U1".into(),
                emissions: Emissions(100.0 * KG_PER_TONNE),
                fuels: fuels.iter().map(|f| f.map(String::from)).collect(),
            }],
        };
        indexmap! {facility.site.id.clone() => facility}
    }

    #[rstest]
    fn test_derive_activity_single_fuel(facility: Facility, fuel_table: FuelTable) {
        let facilities = single_unit_facility(&facility.site, &[Some("Natural Gas")]);
        let default_fuel = fuel_table.resolve("Natural Gas").unwrap();
        let mut warnings = WarningLog::default();

        let records = derive_activity(&facilities, &fuel_table, default_fuel, &mut warnings);
        assert!(warnings.is_empty());
        assert_eq!(records.len(), 1);
        assert_approx_eq!(f64, records[0].energy.value(), 100_000.0 / 53.06);
        assert!(!records[0].excluded);
    }

    #[rstest]
    fn test_derive_activity_even_split(facility: Facility, fuel_table: FuelTable) {
        let facilities = single_unit_facility(
            &facility.site,
            &[Some("Natural Gas"), Some("Propane"), Some("Natural Gas")],
        );
        let default_fuel = fuel_table.resolve("Natural Gas").unwrap();
        let mut warnings = WarningLog::default();

        let records = derive_activity(&facilities, &fuel_table, default_fuel, &mut warnings);
        assert_eq!(records.len(), 2);
        let total = 100_000.0 / ((53.06 + 62.87) / 2.0);
        for record in &records {
            assert_approx_eq!(f64, record.energy.value(), total / 2.0);
        }
        assert_eq!(records[1].fuel, "Propane Gas".into());
    }

    #[rstest]
    fn test_derive_activity_biofuel_keeps_denominator(facility: Facility, fuel_table: FuelTable) {
        let facilities = single_unit_facility(
            &facility.site,
            &[Some("Natural Gas"), Some("Wood and Wood Residuals")],
        );
        let default_fuel = fuel_table.resolve("Natural Gas").unwrap();
        let mut warnings = WarningLog::default();

        let records = derive_activity(&facilities, &fuel_table, default_fuel, &mut warnings);
        let total = 100_000.0 / ((53.06 + 93.8) / 2.0);
        assert_eq!(records.len(), 2);
        assert_approx_eq!(f64, records[0].energy.value(), total / 2.0);
        assert!(!records[0].excluded);
        assert!(records[1].excluded);
    }

    #[rstest]
    fn test_derive_activity_unknown_and_missing_fuels(facility: Facility, fuel_table: FuelTable) {
        let facilities =
            single_unit_facility(&facility.site, &[Some("Kryptonite"), None]);
        let default_fuel = fuel_table.resolve("Natural Gas").unwrap();
        let mut warnings = WarningLog::default();

        let records = derive_activity(&facilities, &fuel_table, default_fuel, &mut warnings);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].fuel, "Natural Gas".into());
        assert_approx_eq!(f64, records[0].energy.value(), 100_000.0 / 53.06);
        assert_eq!(warnings.len(), 2);
    }

    #[rstest]
    fn test_derive_activity_no_recognised_fuel(facility: Facility, fuel_table: FuelTable) {
        let facilities = single_unit_facility(&facility.site, &[Some("Kryptonite")]);
        let default_fuel = fuel_table.resolve("Natural Gas").unwrap();
        let mut warnings = WarningLog::default();

        let records = derive_activity(&facilities, &fuel_table, default_fuel, &mut warnings);
        assert!(records.is_empty());
        assert!(matches!(
            warnings.iter().last(),
            Some(StageWarning::NoRecognisedFuel { .. })
        ));
    }

    #[rstest]
    fn test_existing_hydrogen_demand(facility: Facility) {
        let existing = [
            ExistingHydrogenFacility {
                site: facility.site.clone(),
                consumption: Hydrogen(2_000_000.0),
            },
            ExistingHydrogenFacility {
                site: FacilitySite {
                    id: "F2".into(),
                    ..facility.site
                },
                consumption: Hydrogen(0.0),
            },
        ];

        let demand: Vec<_> = existing_hydrogen_demand(&existing, Dimensionless(0.2)).collect();
        assert_eq!(demand.len(), 2);
        assert_eq!(demand[0].0.id, "F1".into());
        assert_approx_eq!(f64, demand[0].1.value(), 400_000.0);
        assert_eq!(demand[1].1, Hydrogen(0.0));

        assert!(
            existing_hydrogen_demand(&existing, Dimensionless(0.0))
                .all(|(_, demand)| demand == Hydrogen(0.0))
        );
    }

    #[rstest]
    fn test_projection(
        facility: Facility,
        fuel_table: FuelTable,
        categories: CategoryMap,
        decarbonisation: DecarbonisationMap,
    ) {
        let projection = IndustryProjection {
            categories: &categories,
            decarbonisation: &decarbonisation,
            fuels: &fuel_table,
            heating_value: HeatingValue::Higher,
        };
        let mut record = ActivityRecord {
            facility_id: facility.site.id.clone(),
            unit: "U1".into(),
            category: facility.site.category.clone(),
            region: facility.site.region.clone(),
            fuel: "Natural Gas".into(),
            energy: Energy(1000.0),
            excluded: false,
            synthetic: false,
        };

        // 1000 mmBtu x 50% decarbonised x 0.8 high-temperature share x 1.5 growth
        let expected = 600.0 * 1e6 / 61_013.0 * 0.453_592;
        assert_approx_eq!(
            f64,
            projection.hydrogen(&record, 2030).unwrap().value(),
            expected,
            epsilon = 1e-9
        );

        record.excluded = true;
        assert_eq!(projection.hydrogen(&record, 2030).unwrap(), Hydrogen(0.0));

        record.excluded = false;
        assert!(projection.hydrogen(&record, 2049).is_err());
    }
}
