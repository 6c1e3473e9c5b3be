//! The transport stage: from state fuel use to hydrogen demand by zone, grid cell and hour.
use super::SectorOutput;
use crate::allocation::{FineUnit, redistribute};
use crate::conversion::projections::TransportParameters;
use crate::conversion::transport::{StateDemand, VehicleClass, state_demand};
use crate::demand::AnnualDemandTable;
use crate::grid::{CellID, DemandGrid};
use crate::input::transport::TransportInputs;
use crate::model::Model;
use crate::region::RegionID;
use crate::temporal::disaggregate_table;
use crate::warning::{StageWarning, WarningLog};
use crate::zone::ZoneID;
use anyhow::{Context, Result};
use log::info;

/// Annual demand per zone for each vehicle class
#[derive(Debug, Clone, PartialEq)]
pub struct ClassZoneTotals {
    /// Light-duty demand
    pub ld: AnnualDemandTable<ZoneID>,
    /// Heavy-duty demand
    pub hd: AnnualDemandTable<ZoneID>,
}

/// Everything produced by the transport stage for one year
#[derive(Debug, Clone, PartialEq)]
pub struct TransportOutput {
    /// Demand by zone, hour and grid cell
    pub demand: SectorOutput,
    /// Zone demand split by vehicle class
    pub class_zone_totals: ClassZoneTotals,
    /// Demand of each state
    pub states: Vec<StateDemand>,
    /// The assumptions used for the year
    pub parameters: TransportParameters,
    /// Warnings raised by the stage
    pub warnings: WarningLog,
}

/// Allocate the state demand of one vehicle class to zones, hours and grid cells
fn class_demand(
    model: &Model,
    inputs: &TransportInputs,
    state_totals: &AnnualDemandTable<RegionID>,
    class: VehicleClass,
    warnings: &mut WarningLog,
) -> Result<SectorOutput> {
    let fine: Vec<FineUnit<ZoneID>> = inputs
        .zone_vmt
        .iter()
        .map(|row| FineUnit {
            region: row.state.clone(),
            target: row.zone.clone(),
            weight: row.vmt(class),
        })
        .collect();
    let (zone_totals, unknown) = redistribute(state_totals, &fine, warnings)?
        .partition(|zone| model.zones.contains_key(zone));
    for (zone, demand) in unknown.iter() {
        warnings.push(StageWarning::UnknownZone {
            zone: zone.to_string(),
            demand: demand.value(),
        });
    }

    let grid = match &model.grid {
        Some(cells) => {
            let fine: Vec<FineUnit<CellID>> = cells
                .values()
                .map(|cell| FineUnit {
                    region: cell.state.clone(),
                    target: cell.id.clone(),
                    weight: cell.vmt(class),
                })
                .collect();
            let cell_totals = redistribute(state_totals, &fine, warnings)?;
            Some(DemandGrid::from_totals(cells, &cell_totals)?)
        }
        None => None,
    };

    let shape = model.shapes.get(class.demand_stream())?;
    let zone_profiles = disaggregate_table(&zone_totals, shape)?;

    Ok(SectorOutput {
        year: state_totals.year(),
        zone_totals,
        zone_profiles,
        grid,
    })
}

/// Run the transport stage for a model year.
///
/// # Arguments
///
/// * `model` - The model being run
/// * `year` - The model year
pub fn run_transport(model: &Model, year: u32) -> Result<TransportOutput> {
    let inputs = model
        .transport
        .as_ref()
        .context("Transport reference data has not been loaded")?;
    let parameters = TransportParameters::for_year(year)?;
    info!(
        "Change in vehicle-miles travelled since base year: ld {:+.1}%, hd {:+.1}%",
        parameters.ld_vmt_change * 100.0,
        parameters.hd_vmt_change * 100.0
    );

    let states = inputs
        .state_fuel_use
        .iter()
        .map(|fuel_use| {
            state_demand(fuel_use, &parameters, &inputs.penetration, year)
                .with_context(|| format!("Failed to calculate demand for {}", fuel_use.state))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut warnings = WarningLog::default();
    let mut class_outputs = Vec::new();
    for class in [VehicleClass::LightDuty, VehicleClass::HeavyDuty] {
        let state_totals = AnnualDemandTable::from_rows(
            year,
            states
                .iter()
                .map(|state| (state.state.clone(), state.demand(class))),
        )?;
        let output = class_demand(model, inputs, &state_totals, class, &mut warnings)
            .with_context(|| format!("Failed to allocate {class} demand"))?;
        class_outputs.push(output);
    }
    let demand = class_outputs[0].combine(&class_outputs[1])?;
    let class_zone_totals = ClassZoneTotals {
        ld: class_outputs[0].zone_totals.clone(),
        hd: class_outputs[1].zone_totals.clone(),
    };

    Ok(TransportOutput {
        demand,
        class_zone_totals,
        states,
        parameters,
        warnings,
    })
}
