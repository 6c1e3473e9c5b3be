//! Fixtures for tests

use crate::conversion::industry::DecarbonisationMap;
use crate::conversion::transport::{PenetrationMap, StateFuelUse, VehicleClass};
use crate::facility::{ActivityRecord, CategoryMap, Facility, FacilitySite, IndustryCategory, Unit};
use crate::fuel::{Fuel, FuelID, FuelMap, FuelTable};
use crate::grid::{GridCell, GridCellMap};
use crate::input::industry::IndustryInputs;
use crate::input::transport::{TransportInputs, ZoneVmt};
use crate::shape::{DemandShape, DemandStream, SeasonalShape, ShapeLibrary, WeeklyShape};
use crate::units::{Dimensionless, Emissions, EmissionsPerEnergy, Energy, KG_PER_TONNE};
use crate::zone::{GeoZone, ZoneMap};
use geo::{MultiPolygon, Point, Rect};
use indexmap::indexmap;
use rstest::fixture;
use std::collections::HashMap;
use strum::IntoEnumIterator;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

/// A unit square with its lower-left corner at `(x, 0)`
pub fn unit_square(x: f64) -> MultiPolygon<f64> {
    MultiPolygon(vec![Rect::new((x, 0.0), (x + 1.0, 1.0)).to_polygon()])
}

#[fixture]
pub fn zones() -> ZoneMap {
    ["west", "east"]
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            let zone = GeoZone {
                id: name.into(),
                geometry: unit_square(i as f64),
            };
            (zone.id.clone(), zone)
        })
        .collect()
}

#[fixture]
pub fn grid_cells() -> GridCellMap {
    [("c1", 100.0, 10.0), ("c2", 300.0, 0.0)]
        .into_iter()
        .enumerate()
        .map(|(i, (id, ld_vmt, hd_vmt))| {
            let cell = GridCell {
                id: id.into(),
                state: "S1".into(),
                geometry: unit_square(i as f64),
                ld_vmt,
                hd_vmt,
            };
            (cell.id.clone(), cell)
        })
        .collect()
}

#[fixture]
pub fn fuel_table() -> FuelTable {
    let fuel = |name: &str, factor: f64, is_biofuel: bool, growth: Option<&str>| Fuel {
        id: name.into(),
        emission_factor: EmissionsPerEnergy(factor),
        is_biofuel,
        growth_category: growth.map(String::from),
    };
    let fuels: FuelMap = [
        fuel("Natural Gas", 53.06, false, Some("gas")),
        fuel("Propane Gas", 62.87, false, None),
        fuel("Distillate Fuel Oil No. 2", 73.96, false, None),
        fuel("Wood and Wood Residuals", 93.8, true, None),
    ]
    .into_iter()
    .map(|fuel| (fuel.id.clone(), fuel))
    .collect();
    let aliases = HashMap::from_iter([("Propane".to_string(), FuelID::new("Propane Gas"))]);
    let growth = HashMap::from_iter([(("gas".to_string(), 2030), Dimensionless(1.5))]);

    FuelTable::new(fuels, aliases, growth).unwrap()
}

#[fixture]
pub fn categories() -> CategoryMap {
    indexmap! {
        "331".into() => IndustryCategory {
            id: "331".into(),
            description: "Primary metal manufacturing".into(),
            high_temp_heat_ratio: Dimensionless(0.8),
        }
    }
}

#[fixture]
pub fn decarbonisation() -> DecarbonisationMap {
    indexmap! {("331".into(), 2030) => Dimensionless(0.5)}
}

#[fixture]
pub fn facility() -> Facility {
    Facility {
        site: FacilitySite {
            id: "F1".into(),
            name: "Steel Works".into(),
            category: "331".into(),
            region: "R1".into(),
            location: Point::new(0.5, 0.5),
        },
        units: vec![Unit {
            name: "U1".into(),
            emissions: Emissions(100.0 * KG_PER_TONNE),
            fuels: vec![Some("Natural Gas".into())],
        }],
    }
}

#[fixture]
pub fn activity_record(facility: Facility) -> ActivityRecord {
    ActivityRecord {
        facility_id: facility.site.id.clone(),
        unit: "U1".into(),
        category: facility.site.category.clone(),
        region: facility.site.region.clone(),
        fuel: "Natural Gas".into(),
        energy: Energy(1000.0),
        excluded: false,
        synthetic: false,
    }
}

#[fixture]
pub fn extra_facilities() -> Vec<FacilitySite> {
    let site = |id: &str, category: &str, region: &str, x: f64| FacilitySite {
        id: id.into(),
        name: format!("Extra {id}"),
        category: category.into(),
        region: region.into(),
        location: Point::new(x, 0.5),
    };
    vec![
        site("X1", "331", "R1", 0.25),
        site("X2", "331", "R1", 1.5),
        site("X3", "327", "R1", 0.75),
    ]
}

#[fixture]
pub fn industry_inputs(
    fuel_table: FuelTable,
    categories: CategoryMap,
    decarbonisation: DecarbonisationMap,
    facility: Facility,
    extra_facilities: Vec<FacilitySite>,
) -> IndustryInputs {
    IndustryInputs {
        fuels: fuel_table,
        categories,
        decarbonisation,
        facilities: indexmap! {facility.site.id.clone() => facility},
        surveys: Vec::new(),
        extra_facilities,
        existing_hydrogen: Vec::new(),
        default_fuel: "Natural Gas".into(),
    }
}

/// Transport data for one state ("S1") split between both fixture zones and one unknown zone
#[fixture]
pub fn transport_inputs() -> TransportInputs {
    let zone_vmt = |zone: &str, ld_vmt: f64, hd_vmt: f64| ZoneVmt {
        state: "S1".into(),
        zone: zone.into(),
        ld_vmt,
        hd_vmt,
    };
    TransportInputs {
        state_fuel_use: vec![StateFuelUse::from_kbbl("S1".into(), 100.0, 50.0)],
        penetration: PenetrationMap::from_iter([
            ((VehicleClass::LightDuty, 2030), Dimensionless(0.1)),
            ((VehicleClass::HeavyDuty, 2030), Dimensionless(0.05)),
        ]),
        zone_vmt: vec![
            zone_vmt("west", 1.0, 3.0),
            zone_vmt("east", 3.0, 1.0),
            zone_vmt("offshore", 4.0, 0.0),
        ],
    }
}

/// Uniform shapes for every demand stream
#[fixture]
pub fn shape_library() -> ShapeLibrary {
    let mut library = ShapeLibrary::default();
    for stream in DemandStream::iter() {
        let shape = DemandShape {
            weekly: WeeklyShape::uniform(),
            seasonal: SeasonalShape::uniform_monthly(),
        };
        library.insert(stream, shape).unwrap();
    }

    library
}
