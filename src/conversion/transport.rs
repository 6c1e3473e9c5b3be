//! Converts on-road fuel use into hydrogen demand from fuel-cell vehicles.
use super::projections::TransportParameters;
use crate::region::RegionID;
use crate::shape::DemandStream;
use crate::units::{Dimensionless, GALLONS_PER_BARREL, Hydrogen, HydrogenPerVolume, Volume};
use anyhow::{Context, Result};
use serde_string_enum::DeserializeLabeledStringEnum;
use std::collections::HashMap;

/// Hydrogen with the same energy content as one gallon of gasoline (kg)
const H2_PER_GALLON_GASOLINE: HydrogenPerVolume = HydrogenPerVolume(1.0);

/// Hydrogen with the same energy content as one gallon of diesel (kg)
const H2_PER_GALLON_DIESEL: HydrogenPerVolume = HydrogenPerVolume(1.0 / 0.9);

/// Fuel-cell penetration (fraction 0-1) for each vehicle class and year
pub type PenetrationMap = HashMap<(VehicleClass, u32), Dimensionless>;

/// A class of on-road vehicle
#[derive(
    DeserializeLabeledStringEnum,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumIter,
)]
pub enum VehicleClass {
    /// Light-duty vehicles, which burn gasoline
    #[string = "ld"]
    #[strum(serialize = "ld")]
    LightDuty,
    /// Heavy-duty vehicles, which burn diesel
    #[string = "hd"]
    #[strum(serialize = "hd")]
    HeavyDuty,
}

impl VehicleClass {
    /// The demand stream whose temporal shape applies to this class
    pub fn demand_stream(self) -> DemandStream {
        match self {
            Self::LightDuty => DemandStream::TransportLd,
            Self::HeavyDuty => DemandStream::TransportHd,
        }
    }
}

/// Base-year on-road fuel use in a state
#[derive(Debug, Clone, PartialEq)]
pub struct StateFuelUse {
    /// The state
    pub state: RegionID,
    /// Gasoline used by on-road vehicles (gallons)
    pub gasoline: Volume,
    /// Diesel used by on-road vehicles (gallons)
    pub diesel: Volume,
}

impl StateFuelUse {
    /// Create from fuel use in thousands of barrels
    pub fn from_kbbl(state: RegionID, gasoline_kbbl: f64, diesel_kbbl: f64) -> Self {
        let to_gallons = |kbbl: f64| Volume(kbbl * 1000.0 * GALLONS_PER_BARREL);
        Self {
            state,
            gasoline: to_gallons(gasoline_kbbl),
            diesel: to_gallons(diesel_kbbl),
        }
    }
}

/// Hydrogen demand of a state's fuel-cell vehicles in one year
#[derive(Debug, Clone, PartialEq)]
pub struct StateDemand {
    /// The state
    pub state: RegionID,
    /// Demand from light-duty vehicles
    pub ld: Hydrogen,
    /// Demand from heavy-duty vehicles
    pub hd: Hydrogen,
}

impl StateDemand {
    /// Demand from all vehicle classes
    pub fn total(&self) -> Hydrogen {
        self.ld + self.hd
    }

    /// Demand from the given vehicle class
    pub fn demand(&self, class: VehicleClass) -> Hydrogen {
        match class {
            VehicleClass::LightDuty => self.ld,
            VehicleClass::HeavyDuty => self.hd,
        }
    }
}

/// Get the fuel-cell penetration for a vehicle class in a year
fn penetration(
    penetration: &PenetrationMap,
    class: VehicleClass,
    year: u32,
) -> Result<Dimensionless> {
    penetration
        .get(&(class, year))
        .copied()
        .with_context(|| format!("No {class} penetration rate for {year}"))
}

/// Calculate the hydrogen demand of a state in `year`.
///
/// Base-year fuel use is projected with the change in fuel economy, the share displaced by
/// fuel-cell vehicles is converted to its energy-equivalent mass of hydrogen and divided by the
/// fuel-cell vehicles' relative efficiency.
pub fn state_demand(
    fuel_use: &StateFuelUse,
    parameters: &TransportParameters,
    penetrations: &PenetrationMap,
    year: u32,
) -> Result<StateDemand> {
    let ld_penetration = penetration(penetrations, VehicleClass::LightDuty, year)?;
    let hd_penetration = penetration(penetrations, VehicleClass::HeavyDuty, year)?;

    let gasoline = fuel_use.gasoline * Dimensionless(1.0 + parameters.ld_mpg_change);
    let diesel = fuel_use.diesel * Dimensionless(1.0 + parameters.hd_mpg_change);

    let ld = (gasoline * ld_penetration) * H2_PER_GALLON_GASOLINE
        / Dimensionless(parameters.ld_relative_efficiency);
    let hd = (diesel * hd_penetration) * H2_PER_GALLON_DIESEL
        / Dimensionless(parameters.hd_relative_efficiency);

    Ok(StateDemand {
        state: fuel_use.state.clone(),
        ld,
        hd,
    })
}
