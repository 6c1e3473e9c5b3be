//! Industrial facilities, their combustion units and the activity records derived from them.
use crate::fuel::FuelID;
use crate::id::define_id_type;
use crate::region::RegionID;
use crate::units::{Dimensionless, Emissions, Energy, Hydrogen};
use geo::Point;
use indexmap::IndexMap;

define_id_type! {FacilityID}
define_id_type! {CategoryID}

/// A map of [`IndustryCategory`]s, keyed by category ID
pub type CategoryMap = IndexMap<CategoryID, IndustryCategory>;

/// A map of [`Facility`]s, keyed by facility ID
pub type FacilityMap = IndexMap<FacilityID, Facility>;

/// An industry classification (e.g. an industry sub-sector code)
#[derive(Debug, Clone, PartialEq)]
pub struct IndustryCategory {
    /// Unique category code
    pub id: CategoryID,
    /// Human-readable description
    pub description: String,
    /// The share of combustion which provides high-temperature heat and can be displaced
    pub high_temp_heat_ratio: Dimensionless,
}

/// Where a facility is and what it does
#[derive(Debug, Clone, PartialEq)]
pub struct FacilitySite {
    /// Unique facility identifier
    pub id: FacilityID,
    /// Facility name
    pub name: String,
    /// Industry category of the facility
    pub category: CategoryID,
    /// The coarse region (state) containing the facility
    pub region: RegionID,
    /// Facility location (longitude, latitude)
    pub location: Point<f64>,
}

/// A combustion unit within a facility
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    /// Unit name, unique within a facility
    pub name: String,
    /// Annual non-biogenic CO2 emissions of the unit (kg)
    pub emissions: Emissions,
    /// Fuel names reported for the unit, in the order reported. `None` if none was reported.
    pub fuels: Vec<Option<String>>,
}

/// A facility reporting emissions from one or more units
#[derive(Debug, Clone, PartialEq)]
pub struct Facility {
    /// Location and classification
    pub site: FacilitySite,
    /// Combustion units
    pub units: Vec<Unit>,
}

/// A facility which already consumes hydrogen, such as a hydrogen production plant
#[derive(Debug, Clone, PartialEq)]
pub struct ExistingHydrogenFacility {
    /// Location and classification
    pub site: FacilitySite,
    /// Hydrogen consumed annually at present (kg)
    pub consumption: Hydrogen,
}

/// The energy attributed to one fuel burned by one unit
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityRecord {
    /// The facility burning the fuel
    pub facility_id: FacilityID,
    /// The unit burning the fuel
    pub unit: String,
    /// The facility's industry category
    pub category: CategoryID,
    /// The coarse region containing the facility
    pub region: RegionID,
    /// The fuel burned
    pub fuel: FuelID,
    /// Energy consumed (mmBtu)
    pub energy: Energy,
    /// Excluded records (biofuels) are kept for reporting but carry no hydrogen demand
    pub excluded: bool,
    /// Whether the record was injected to make up a shortfall against survey totals
    pub synthetic: bool,
}
