//! Code for reading the reference data used by the transport sector.
use super::*;
use crate::conversion::transport::{PenetrationMap, StateFuelUse, VehicleClass};
use crate::region::RegionID;
use crate::units::Dimensionless;
use crate::zone::ZoneID;
use serde::Deserialize;
use std::collections::HashSet;
use strum::IntoEnumIterator;

const STATE_FUEL_USE_FILE_NAME: &str = "state_fuel_use.csv";
const PENETRATION_FILE_NAME: &str = "transport_penetration.csv";
const VMT_FILE_NAME: &str = "vmt_by_zone.csv";

/// Vehicle-miles travelled within the part of a state lying in one zone
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ZoneVmt {
    /// The state
    pub state: RegionID,
    /// The zone. May name a zone outside the modelled zone set.
    pub zone: ZoneID,
    /// Light-duty vehicle-miles travelled
    #[serde(deserialize_with = "deserialise_non_negative")]
    pub ld_vmt: f64,
    /// Heavy-duty vehicle-miles travelled
    #[serde(deserialize_with = "deserialise_non_negative")]
    pub hd_vmt: f64,
}

impl ZoneVmt {
    /// The VMT of the given vehicle class
    pub fn vmt(&self, class: VehicleClass) -> f64 {
        match class {
            VehicleClass::LightDuty => self.ld_vmt,
            VehicleClass::HeavyDuty => self.hd_vmt,
        }
    }
}

/// Reference data for the transport sector
#[derive(Debug, Clone, PartialEq)]
pub struct TransportInputs {
    /// Base-year on-road fuel use for each state
    pub state_fuel_use: Vec<StateFuelUse>,
    /// Fuel-cell vehicle penetration by vehicle class and year
    pub penetration: PenetrationMap,
    /// VMT of the fine units within each state
    pub zone_vmt: Vec<ZoneVmt>,
}

#[derive(Debug, Deserialize, PartialEq)]
struct StateFuelUseRaw {
    state: String,
    #[serde(deserialize_with = "deserialise_non_negative")]
    gasoline_kbbl: f64,
    #[serde(deserialize_with = "deserialise_non_negative")]
    diesel_kbbl: f64,
}

#[derive(Debug, Deserialize, PartialEq)]
struct PenetrationRaw {
    vehicle_class: VehicleClass,
    year: u32,
    #[serde(deserialize_with = "deserialise_percentage")]
    percent: f64,
}

/// Read all reference data for the transport sector.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `parameters` - Model parameters
pub fn read_transport_inputs(
    model_dir: &Path,
    parameters: &ModelParameters,
) -> Result<TransportInputs> {
    let file_path = model_dir.join(STATE_FUEL_USE_FILE_NAME);
    let state_fuel_use = read_state_fuel_use_from_iter(read_csv(&file_path)?)
        .with_context(|| input_err_msg(&file_path))?;

    let file_path = model_dir.join(PENETRATION_FILE_NAME);
    let penetration =
        read_penetration_from_iter(read_csv(&file_path)?, &parameters.milestone_years)
            .with_context(|| input_err_msg(&file_path))?;

    let file_path = model_dir.join(VMT_FILE_NAME);
    let zone_vmt = read_zone_vmt_from_iter(read_csv(&file_path)?)
        .with_context(|| input_err_msg(&file_path))?;

    Ok(TransportInputs {
        state_fuel_use,
        penetration,
        zone_vmt,
    })
}

fn read_state_fuel_use_from_iter<I>(iter: I) -> Result<Vec<StateFuelUse>>
where
    I: Iterator<Item = StateFuelUseRaw>,
{
    let mut states = HashSet::new();
    iter.map(|raw| {
        let state: RegionID = raw.state.trim().into();
        ensure!(
            states.insert(state.clone()),
            "Duplicate fuel use for state {state}"
        );
        Ok(StateFuelUse::from_kbbl(state, raw.gasoline_kbbl, raw.diesel_kbbl))
    })
    .collect()
}

fn read_penetration_from_iter<I>(iter: I, milestone_years: &[u32]) -> Result<PenetrationMap>
where
    I: Iterator<Item = PenetrationRaw>,
{
    let mut map = PenetrationMap::new();
    for raw in iter {
        ensure!(
            map.insert((raw.vehicle_class, raw.year), Dimensionless(raw.percent / 100.0))
                .is_none(),
            "Duplicate {} penetration rate for {}",
            raw.vehicle_class,
            raw.year
        );
    }

    for class in VehicleClass::iter() {
        for year in milestone_years {
            ensure!(
                map.contains_key(&(class, *year)),
                "Missing {class} penetration rate for {year}"
            );
        }
    }

    Ok(map)
}

fn read_zone_vmt_from_iter<I>(iter: I) -> Result<Vec<ZoneVmt>>
where
    I: Iterator<Item = ZoneVmt>,
{
    let mut keys = HashSet::new();
    iter.map(|row| {
        ensure!(
            keys.insert((row.state.clone(), row.zone.clone())),
            "Duplicate VMT for zone {} in {}",
            row.zone,
            row.state
        );
        Ok(row)
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_read_penetration() {
        let rows = [
            PenetrationRaw {
                vehicle_class: VehicleClass::LightDuty,
                year: 2030,
                percent: 20.0,
            },
            PenetrationRaw {
                vehicle_class: VehicleClass::HeavyDuty,
                year: 2030,
                percent: 5.0,
            },
        ];
        let map = read_penetration_from_iter(rows.into_iter(), &[2030]).unwrap();
        assert_eq!(map[&(VehicleClass::LightDuty, 2030)], Dimensionless(0.2));
        assert_eq!(map[&(VehicleClass::HeavyDuty, 2030)], Dimensionless(0.05));
    }

    #[test]
    fn test_read_penetration_missing_year() {
        let rows = [PenetrationRaw {
            vehicle_class: VehicleClass::LightDuty,
            year: 2030,
            percent: 20.0,
        }];
        assert_error!(
            read_penetration_from_iter(rows.into_iter(), &[2030]),
            "Missing hd penetration rate for 2030"
        );
    }

    #[test]
    fn test_read_state_fuel_use_duplicate() {
        let row = || StateFuelUseRaw {
            state: "CA".into(),
            gasoline_kbbl: 1.0,
            diesel_kbbl: 1.0,
        };
        assert_error!(
            read_state_fuel_use_from_iter([row(), row()].into_iter()),
            "Duplicate fuel use for state CA"
        );
    }

    #[test]
    fn test_read_zone_vmt_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join(VMT_FILE_NAME);
        {
            let mut file = File::create(&file_path).unwrap();
            writeln!(
                file,
                "state,zone,ld_vmt,hd_vmt\nCA,CA_NORTH,10,1\nCA,MEX_BAJA,2,0"
            )
            .unwrap();
        }

        let rows = read_zone_vmt_from_iter(read_csv(&file_path).unwrap()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].zone, "MEX_BAJA".into());
        assert_eq!(rows[0].vmt(VehicleClass::LightDuty), 10.0);
        assert_eq!(rows[0].vmt(VehicleClass::HeavyDuty), 1.0);
    }
}
