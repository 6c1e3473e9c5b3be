//! The industry stage: from facility emissions to hydrogen demand by zone, grid cell and hour.
use super::SectorOutput;
use crate::allocation::{attribute_points, sum_points};
use crate::conversion::industry::{IndustryProjection, derive_activity, existing_hydrogen_demand};
use crate::demand::AnnualDemandTable;
use crate::facility::{ActivityRecord, FacilityID, FacilitySite};
use crate::grid::DemandGrid;
use crate::input::industry::IndustryInputs;
use crate::model::Model;
use crate::reconcile::{DiscrepancyResult, Reconciler, synthetic_facilities};
use crate::shape::DemandStream;
use crate::temporal::disaggregate_table;
use crate::units::Hydrogen;
use crate::warning::{StageWarning, WarningLog};
use crate::zone::ZoneID;
use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::debug;
use std::collections::HashSet;

/// Hydrogen demand of a single (facility, unit, fuel) record
#[derive(Debug, Clone, PartialEq)]
pub struct UnitFuelDemand {
    /// The reconciled activity record
    pub record: ActivityRecord,
    /// Hydrogen demand in the model year
    pub demand: Hydrogen,
}

/// Where a facility's demand comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum FacilitySource {
    /// Reported combustion emissions
    #[strum(serialize = "reported")]
    Reported,
    /// Demand injected to make up a shortfall against survey totals
    #[strum(serialize = "synthetic")]
    Synthetic,
    /// Existing hydrogen consumption
    #[strum(serialize = "existing_h2")]
    ExistingHydrogen,
}

/// Hydrogen demand of a facility with its location
#[derive(Debug, Clone, PartialEq)]
pub struct FacilityDemand {
    /// The facility's site
    pub site: FacilitySite,
    /// Where the facility's demand comes from
    pub source: FacilitySource,
    /// The load zone containing the facility, if any
    pub zone: Option<ZoneID>,
    /// Hydrogen demand in the model year
    pub demand: Hydrogen,
}

/// Everything produced by the industry stage for one year
#[derive(Debug, Clone, PartialEq)]
pub struct IndustryOutput {
    /// Demand by zone, hour and grid cell
    pub demand: SectorOutput,
    /// Activity records before reconciliation
    pub activity: Vec<ActivityRecord>,
    /// Demand of each reconciled activity record
    pub unit_fuels: Vec<UnitFuelDemand>,
    /// Demand of each facility
    pub facilities: Vec<FacilityDemand>,
    /// Survey discrepancies before correction
    pub discrepancies_before: Vec<DiscrepancyResult>,
    /// Survey discrepancies after correction
    pub discrepancies_after: Vec<DiscrepancyResult>,
    /// Warnings raised by the stage
    pub warnings: WarningLog,
}

/// Look up the site of every facility, reported or extra
fn facility_sites(inputs: &IndustryInputs) -> IndexMap<&FacilityID, &FacilitySite> {
    inputs
        .facilities
        .values()
        .map(|facility| &facility.site)
        .chain(&inputs.extra_facilities)
        .chain(inputs.existing_hydrogen.iter().map(|existing| &existing.site))
        .map(|site| (&site.id, site))
        .collect()
}

/// Run the industry stage for a model year.
///
/// # Arguments
///
/// * `model` - The model being run
/// * `year` - The model year
pub fn run_industry(model: &Model, year: u32) -> Result<IndustryOutput> {
    let inputs = model
        .industry
        .as_ref()
        .context("Industry reference data has not been loaded")?;
    let mut warnings = WarningLog::default();

    let default_fuel = inputs
        .fuels
        .get(&inputs.default_fuel)
        .with_context(|| format!("Unknown default fuel '{}'", inputs.default_fuel))?;
    let activity = derive_activity(&inputs.facilities, &inputs.fuels, default_fuel, &mut warnings);
    debug!("Derived {} activity records", activity.len());

    let reconciler = Reconciler::new(
        &inputs.surveys,
        &inputs.extra_facilities,
        &inputs.default_fuel,
    );
    let reconciliation = reconciler.reconcile(activity.clone(), &mut warnings);
    let synthetic: HashSet<FacilityID> = synthetic_facilities(&reconciliation.records)
        .cloned()
        .collect();

    let projection = IndustryProjection {
        categories: &inputs.categories,
        decarbonisation: &inputs.decarbonisation,
        fuels: &inputs.fuels,
        heating_value: model.parameters.heating_value,
    };
    let unit_fuels = reconciliation
        .records
        .into_iter()
        .map(|record| {
            let demand = projection.hydrogen(&record, year).with_context(|| {
                format!(
                    "Failed to project demand for unit '{}' of facility {}",
                    record.unit, record.facility_id
                )
            })?;
            Ok(UnitFuelDemand { record, demand })
        })
        .collect::<Result<Vec<_>>>()?;

    // Existing consumers are not covered by the combustion surveys so skip reconciliation
    let existing_fraction = model.parameters.existing_h2_fraction(year)?;
    let existing: Vec<_> =
        existing_hydrogen_demand(&inputs.existing_hydrogen, existing_fraction).collect();
    debug!(
        "Including {:.0}% of existing hydrogen consumption at {} facilities",
        existing_fraction.0 * 100.0,
        existing.len()
    );
    let existing_ids: HashSet<&FacilityID> = existing.iter().map(|(site, _)| &site.id).collect();

    let facility_totals = AnnualDemandTable::from_records(
        year,
        unit_fuels
            .iter()
            .map(|unit_fuel| (unit_fuel.record.facility_id.clone(), unit_fuel.demand))
            .chain(existing.iter().map(|(site, demand)| (site.id.clone(), *demand))),
    )?;

    let sites = facility_sites(inputs);
    let located = facility_totals
        .iter()
        .map(|(id, demand)| {
            let site = sites
                .get(id)
                .with_context(|| format!("No site found for facility {id}"))?;
            Ok((*site, demand))
        })
        .collect::<Result<Vec<_>>>()?;

    // Zones
    let zone_index = model.zone_index();
    let zone_of = attribute_points(
        &zone_index,
        located.iter().map(|(site, _)| (&site.id, site.location)),
    );
    let (zone_totals, outside) = sum_points(
        year,
        located
            .iter()
            .map(|(site, demand)| (&site.id, *demand, zone_of[&site.id])),
    )?;
    for (facility, demand) in outside {
        warnings.push(StageWarning::OutsideZones {
            facility: facility.clone(),
            demand: demand.value(),
        });
    }

    let facilities = located
        .iter()
        .map(|(site, demand)| FacilityDemand {
            site: (*site).clone(),
            source: if existing_ids.contains(&site.id) {
                FacilitySource::ExistingHydrogen
            } else if synthetic.contains(&site.id) {
                FacilitySource::Synthetic
            } else {
                FacilitySource::Reported
            },
            zone: zone_of[&site.id].cloned(),
            demand: *demand,
        })
        .collect();

    // Grid cells
    let grid = match (&model.grid, model.grid_index()) {
        (Some(cells), Some(grid_index)) => {
            let cell_of = attribute_points(
                &grid_index,
                located.iter().map(|(site, _)| (&site.id, site.location)),
            );
            let (cell_totals, outside) = sum_points(
                year,
                located
                    .iter()
                    .map(|(site, demand)| (&site.id, *demand, cell_of[&site.id])),
            )?;
            for (facility, demand) in outside {
                warnings.push(StageWarning::OutsideGrid {
                    facility: facility.clone(),
                    demand: demand.value(),
                });
            }
            Some(DemandGrid::from_totals(cells, &cell_totals)?)
        }
        _ => None,
    };

    let shape = model.shapes.get(DemandStream::Industry)?;
    let zone_profiles = disaggregate_table(&zone_totals, shape)?;

    Ok(IndustryOutput {
        demand: SectorOutput {
            year,
            zone_totals,
            zone_profiles,
            grid,
        },
        activity,
        unit_fuels,
        facilities,
        discrepancies_before: reconciliation.before,
        discrepancies_after: reconciliation.after,
        warnings,
    })
}
