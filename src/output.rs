//! The module responsible for writing output data to disk.
use crate::demand::AnnualDemandTable;
use crate::facility::{ActivityRecord, CategoryID, FacilityID};
use crate::fuel::FuelID;
use crate::grid::DemandGrid;
use crate::model::parameters::Sector;
use crate::pipeline::SectorOutput;
use crate::pipeline::industry::IndustryOutput;
use crate::pipeline::transport::{ClassZoneTotals, TransportOutput};
use crate::reconcile::DiscrepancyResult;
use crate::region::RegionID;
use crate::temporal::HourlyProfile;
use crate::warning::{WarningKind, WarningLog};
use crate::zone::ZoneID;
use anyhow::{Context, Result, bail};
use geojson::{Feature, FeatureCollection, GeoJson, Geometry};
use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::{Deserialize, Serialize};
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};

pub mod metadata;

/// The root folder in which model-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "h2demand_results";

/// The name of the folder for outputs which combine both sectors
const COMBINED_DIRECTORY_NAME: &str = "combined";

/// The name of the folder for hourly demand profiles within a sector folder
const PROFILES_DIRECTORY_NAME: &str = "demand_profiles";

/// The output file name for annual demand by load zone
const ZONE_RESULTS_FILE_NAME: &str = "load_zone_results.csv";

/// The output file name for industry demand by facility
const FACILITY_DEMAND_FILE_NAME: &str = "demand_by_facility.csv";

/// The output file name for industry demand by unit and fuel
const UNIT_FUEL_DEMAND_FILE_NAME: &str = "demand_by_unit_fuel.csv";

/// The output file name for the discrepancy audit
const DISCREPANCY_AUDIT_FILE_NAME: &str = "discrepancy_audit.csv";

/// The output file name for activity records before reconciliation
const ACTIVITY_FILE_NAME: &str = "debug_activity_records.csv";

/// The output file name for transport demand by state
const STATE_DEMAND_FILE_NAME: &str = "demand_by_state.csv";

/// The output file name for warnings
const WARNINGS_FILE_NAME: &str = "warnings.csv";

/// Format of the timestamps in hourly profile files
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H";

/// Get the model name from the specified directory path
pub fn get_output_dir(model_dir: &Path) -> Result<PathBuf> {
    // Get the model name from the dir path. This ends up being convoluted because we need to check
    // for all possible errors. Ugh.
    let model_dir = model_dir
        .canonicalize() // canonicalise in case the user has specified "."
        .context("Could not resolve path to model")?;

    let model_name = model_dir
        .file_name()
        .context("Model cannot be in root folder")?
        .to_str()
        .context("Invalid chars in model dir name")?;

    // Construct path
    Ok([OUTPUT_DIRECTORY_ROOT, model_name].iter().collect())
}

/// Create a new output directory, clearing out an existing one if `overwrite` is set.
///
/// Returns whether an existing directory was overwritten.
pub fn create_output_directory(output_dir: &Path, overwrite: bool) -> Result<bool> {
    let existing = output_dir.is_dir();
    if existing {
        let is_empty = fs::read_dir(output_dir)?.next().is_none();
        if is_empty {
            return Ok(false);
        }
        if !overwrite {
            bail!(
                "Output folder already exists and is not empty. \
                 Please specify a different folder or use --overwrite."
            );
        }
        fs::remove_dir_all(output_dir)?;
    }

    // Try to create the directory, with parents
    fs::create_dir_all(output_dir)?;

    Ok(existing)
}

/// Represents a row in a load zone results CSV file.
///
/// The vehicle class columns are only filled in for the transport sector.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct ZoneResultRow {
    year: u32,
    zone: ZoneID,
    ld_h2_demand_kg: Option<f64>,
    hd_h2_demand_kg: Option<f64>,
    h2_demand_kg: f64,
}

/// Represents a row in an hourly profile CSV file (SWITCH timescale format)
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct ProfileRow {
    timepoint_id: usize,
    timeseries: String,
    timestamp: String,
    h2_demand_kg: f64,
}

/// Represents a row in the facility demand CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct FacilityRow {
    year: u32,
    facility_id: FacilityID,
    facility_name: String,
    category: CategoryID,
    region: RegionID,
    latitude: f64,
    longitude: f64,
    zone: Option<ZoneID>,
    source: String,
    h2_demand_kg: f64,
}

/// Represents an activity record in output files.
///
/// In the unit/fuel demand file it is written along with a [`DemandColumn`].
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct ActivityRow {
    year: u32,
    facility_id: FacilityID,
    unit: String,
    category: CategoryID,
    region: RegionID,
    fuel: FuelID,
    energy_mmbtu: f64,
    excluded: bool,
    synthetic: bool,
}

impl ActivityRow {
    /// Create a new [`ActivityRow`]
    fn new(year: u32, record: &ActivityRecord) -> Self {
        Self {
            year,
            facility_id: record.facility_id.clone(),
            unit: record.unit.clone(),
            category: record.category.clone(),
            region: record.region.clone(),
            fuel: record.fuel.clone(),
            energy_mmbtu: record.energy.value(),
            excluded: record.excluded,
            synthetic: record.synthetic,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct DemandColumn {
    h2_demand_kg: f64,
}

/// Represents a row in the discrepancy audit CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct AuditRow {
    year: u32,
    stage: String,
    category: CategoryID,
    region: RegionID,
    bottom_up_mmbtu: f64,
    top_down_mmbtu: f64,
    difference_mmbtu: f64,
    correction_factor: Option<f64>,
    correction: String,
}

impl AuditRow {
    fn new(year: u32, stage: &str, result: &DiscrepancyResult) -> Self {
        Self {
            year,
            stage: stage.into(),
            category: result.category.clone(),
            region: result.region.clone(),
            bottom_up_mmbtu: result.bottom_up.value(),
            top_down_mmbtu: result.top_down.value(),
            difference_mmbtu: result.difference().value(),
            correction_factor: result.correction_factor().map(f64::from),
            correction: result.correction.to_string(),
        }
    }
}

/// Represents a row in the state demand CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct StateDemandRow {
    year: u32,
    state: RegionID,
    ld_h2_demand_kg: f64,
    hd_h2_demand_kg: f64,
    h2_demand_kg: f64,
}

/// Represents a row in the warnings CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct WarningRow {
    year: u32,
    sector: String,
    kind: String,
    message: String,
}

/// Writes hourly profiles to one file per zone, numbering timepoints consecutively across years
struct ProfileWriter {
    dir_path: PathBuf,
    writers: IndexMap<ZoneID, (csv::Writer<File>, usize)>,
}

impl ProfileWriter {
    fn new(dir_path: PathBuf) -> Self {
        Self {
            dir_path,
            writers: IndexMap::new(),
        }
    }

    /// Get the writer and next timepoint ID for a zone, creating its file if needed
    fn writer_for(&mut self, zone: &ZoneID) -> Result<&mut (csv::Writer<File>, usize)> {
        match self.writers.entry(zone.clone()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                fs::create_dir_all(&self.dir_path)?;
                let file_path = self.dir_path.join(format!("{zone}_profile.csv"));
                let writer = csv::Writer::from_path(&file_path)
                    .with_context(|| format!("Failed to create {}", file_path.display()))?;
                Ok(entry.insert((writer, 0)))
            }
        }
    }

    /// Append one year of hourly demand for each zone
    fn write(&mut self, profiles: &IndexMap<ZoneID, HourlyProfile>) -> Result<()> {
        for (zone, profile) in profiles {
            let timeseries = format!("{}_all", profile.year());
            let (writer, next_timepoint) = self.writer_for(zone)?;
            for (datetime, value) in profile.iter()? {
                let row = ProfileRow {
                    timepoint_id: *next_timepoint,
                    timeseries: timeseries.clone(),
                    timestamp: datetime.format(TIMESTAMP_FORMAT).to_string(),
                    h2_demand_kg: value,
                };
                writer.serialize(row)?;
                *next_timepoint += 1;
            }
        }

        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        for (writer, _) in self.writers.values_mut() {
            writer.flush()?;
        }

        Ok(())
    }
}

/// Write the annual demand of each grid cell as a GeoJSON feature collection
fn write_grid(file_path: &Path, grid: &DemandGrid) -> Result<()> {
    let features = grid
        .iter()
        .map(|(id, cell)| {
            let mut feature = Feature::from(Geometry::new(geojson::Value::from(&cell.geometry)));
            feature.set_property("cell_id", id.to_string());
            feature.set_property("h2_demand_kg", cell.demand.value());
            feature
        })
        .collect();
    let collection = FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    };
    fs::write(file_path, GeoJson::from(collection).to_string())
        .with_context(|| format!("Failed to write {}", file_path.display()))?;

    Ok(())
}

/// For writing the zone, hourly and grid demand of one sector (or of the combined sectors)
struct DemandWriter {
    dir_path: PathBuf,
    zone_results_writer: csv::Writer<File>,
    profile_writer: ProfileWriter,
}

impl DemandWriter {
    /// Create the output folder and open files to write to
    ///
    /// # Arguments
    ///
    /// * `dir_path` - Folder where files will be saved
    fn create(dir_path: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir_path)?;
        Ok(Self {
            zone_results_writer: csv::Writer::from_path(dir_path.join(ZONE_RESULTS_FILE_NAME))?,
            profile_writer: ProfileWriter::new(dir_path.join(PROFILES_DIRECTORY_NAME)),
            dir_path,
        })
    }

    fn write(&mut self, output: &SectorOutput, by_class: Option<&ClassZoneTotals>) -> Result<()> {
        for (zone, demand) in output.zone_totals.iter() {
            let class_demand =
                |table: &AnnualDemandTable<ZoneID>| table.get(zone).unwrap_or_default().value();
            let row = ZoneResultRow {
                year: output.year,
                zone: zone.clone(),
                ld_h2_demand_kg: by_class.map(|totals| class_demand(&totals.ld)),
                hd_h2_demand_kg: by_class.map(|totals| class_demand(&totals.hd)),
                h2_demand_kg: demand.value(),
            };
            self.zone_results_writer.serialize(row)?;
        }

        self.profile_writer.write(&output.zone_profiles)?;

        if let Some(grid) = &output.grid {
            let file_path = self
                .dir_path
                .join(format!("{}_demand_grid.geojson", output.year));
            write_grid(&file_path, grid)?;
        }

        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.zone_results_writer.flush()?;
        self.profile_writer.flush()
    }
}

/// For writing the outputs specific to the industry sector
struct IndustryWriter {
    demand_writer: DemandWriter,
    facilities_writer: csv::Writer<File>,
    unit_fuels_writer: csv::Writer<File>,
    audit_writer: csv::Writer<File>,
    activity_writer: Option<csv::Writer<File>>,
}

impl IndustryWriter {
    fn create(dir_path: PathBuf, save_debug_info: bool) -> Result<Self> {
        let demand_writer = DemandWriter::create(dir_path.clone())?;
        let new_writer = |file_name| csv::Writer::from_path(dir_path.join(file_name));
        let activity_writer = if save_debug_info {
            Some(new_writer(ACTIVITY_FILE_NAME)?)
        } else {
            None
        };

        Ok(Self {
            demand_writer,
            facilities_writer: new_writer(FACILITY_DEMAND_FILE_NAME)?,
            unit_fuels_writer: new_writer(UNIT_FUEL_DEMAND_FILE_NAME)?,
            audit_writer: new_writer(DISCREPANCY_AUDIT_FILE_NAME)?,
            activity_writer,
        })
    }

    fn write(&mut self, output: &IndustryOutput) -> Result<()> {
        let year = output.demand.year;
        self.demand_writer.write(&output.demand, None)?;

        for facility in &output.facilities {
            let row = FacilityRow {
                year,
                facility_id: facility.site.id.clone(),
                facility_name: facility.site.name.clone(),
                category: facility.site.category.clone(),
                region: facility.site.region.clone(),
                latitude: facility.site.location.y(),
                longitude: facility.site.location.x(),
                zone: facility.zone.clone(),
                source: facility.source.to_string(),
                h2_demand_kg: facility.demand.value(),
            };
            self.facilities_writer.serialize(row)?;
        }

        for unit_fuel in &output.unit_fuels {
            let demand = DemandColumn {
                h2_demand_kg: unit_fuel.demand.value(),
            };
            self.unit_fuels_writer
                .serialize((ActivityRow::new(year, &unit_fuel.record), demand))?;
        }

        let before = output
            .discrepancies_before
            .iter()
            .map(|result| AuditRow::new(year, "before", result));
        let after = output
            .discrepancies_after
            .iter()
            .map(|result| AuditRow::new(year, "after", result));
        for row in before.chain(after) {
            self.audit_writer.serialize(row)?;
        }

        if let Some(wtr) = &mut self.activity_writer {
            for record in &output.activity {
                wtr.serialize(ActivityRow::new(year, record))?;
            }
        }

        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.demand_writer.flush()?;
        self.facilities_writer.flush()?;
        self.unit_fuels_writer.flush()?;
        self.audit_writer.flush()?;
        if let Some(wtr) = &mut self.activity_writer {
            wtr.flush()?;
        }

        Ok(())
    }
}

/// For writing the outputs specific to the transport sector
struct TransportWriter {
    demand_writer: DemandWriter,
    states_writer: csv::Writer<File>,
}

impl TransportWriter {
    fn create(dir_path: PathBuf) -> Result<Self> {
        let demand_writer = DemandWriter::create(dir_path.clone())?;
        Ok(Self {
            demand_writer,
            states_writer: csv::Writer::from_path(dir_path.join(STATE_DEMAND_FILE_NAME))?,
        })
    }

    fn write(&mut self, output: &TransportOutput) -> Result<()> {
        self.demand_writer.write(&output.demand, Some(&output.class_zone_totals))?;
        for state in &output.states {
            let row = StateDemandRow {
                year: output.demand.year,
                state: state.state.clone(),
                ld_h2_demand_kg: state.ld.value(),
                hd_h2_demand_kg: state.hd.value(),
                h2_demand_kg: state.total().value(),
            };
            self.states_writer.serialize(row)?;
        }

        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.demand_writer.flush()?;
        self.states_writer.flush()?;

        Ok(())
    }
}

/// An object for writing model results to file
pub struct DataWriter {
    industry_writer: Option<IndustryWriter>,
    transport_writer: Option<TransportWriter>,
    combined_writer: Option<DemandWriter>,
    warnings_writer: csv::Writer<File>,
}

impl DataWriter {
    /// Open CSV files to write output data to
    ///
    /// # Arguments
    ///
    /// * `output_path` - Folder where files will be saved
    /// * `sectors` - The sectors being modelled. Each gets its own subfolder.
    /// * `save_debug_info` - Whether to include extra CSV files for debugging model
    pub fn create(output_path: &Path, sectors: &[Sector], save_debug_info: bool) -> Result<Self> {
        let sector_dir = |sector: Sector| output_path.join(sector.to_string());

        let industry_writer = if sectors.contains(&Sector::Industry) {
            Some(IndustryWriter::create(
                sector_dir(Sector::Industry),
                save_debug_info,
            )?)
        } else {
            None
        };
        let transport_writer = if sectors.contains(&Sector::Transport) {
            Some(TransportWriter::create(sector_dir(Sector::Transport))?)
        } else {
            None
        };
        let combined_writer = if sectors.len() > 1 {
            Some(DemandWriter::create(
                output_path.join(COMBINED_DIRECTORY_NAME),
            )?)
        } else {
            None
        };

        Ok(Self {
            industry_writer,
            transport_writer,
            combined_writer,
            warnings_writer: csv::Writer::from_path(output_path.join(WARNINGS_FILE_NAME))?,
        })
    }

    /// Write the results of the industry stage
    pub fn write_industry(&mut self, output: &IndustryOutput) -> Result<()> {
        let wtr = self
            .industry_writer
            .as_mut()
            .context("Industry sector is not being modelled")?;
        wtr.write(output)
    }

    /// Write the results of the transport stage
    pub fn write_transport(&mut self, output: &TransportOutput) -> Result<()> {
        let wtr = self
            .transport_writer
            .as_mut()
            .context("Transport sector is not being modelled")?;
        wtr.write(output)
    }

    /// Write demand combined across sectors
    pub fn write_combined(&mut self, output: &SectorOutput) -> Result<()> {
        let wtr = self
            .combined_writer
            .as_mut()
            .context("Only one sector is being modelled")?;
        wtr.write(output, None)
    }

    /// Write the warnings raised by a stage
    pub fn write_warnings(
        &mut self,
        year: u32,
        sector: Sector,
        warnings: &WarningLog,
    ) -> Result<()> {
        for warning in warnings.iter() {
            let row = WarningRow {
                year,
                sector: sector.to_string(),
                kind: WarningKind::from(warning).to_string(),
                message: warning.to_string(),
            };
            self.warnings_writer.serialize(row)?;
        }

        Ok(())
    }

    /// Flush the underlying streams
    pub fn flush(&mut self) -> Result<()> {
        if let Some(wtr) = &mut self.industry_writer {
            wtr.flush()?;
        }
        if let Some(wtr) = &mut self.transport_writer {
            wtr.flush()?;
        }
        if let Some(wtr) = &mut self.combined_writer {
            wtr.flush()?;
        }
        self.warnings_writer.flush()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::grid_cells;
    use crate::grid::{CellID, GridCellMap};
    use crate::input::read_geojson_features;
    use crate::units::Hydrogen;
    use crate::warning::StageWarning;
    use itertools::{Itertools, assert_equal};
    use rstest::rstest;
    use std::iter;
    use tempfile::tempdir;

    fn read_rows<T: serde::de::DeserializeOwned>(file_path: &Path) -> Vec<T> {
        csv::Reader::from_path(file_path)
            .unwrap()
            .into_deserialize()
            .try_collect()
            .unwrap()
    }

    fn sector_output(year: u32, demand: f64) -> SectorOutput {
        let zone = ZoneID::new("west");
        let hours = if year % 4 == 0 { 8784 } else { 8760 };
        SectorOutput {
            year,
            zone_totals: AnnualDemandTable::from_rows(year, [(zone.clone(), Hydrogen(demand))])
                .unwrap(),
            zone_profiles: IndexMap::from_iter([(
                zone,
                HourlyProfile::new(year, vec![demand / hours as f64; hours]).unwrap(),
            )]),
            grid: None,
        }
    }

    #[test]
    fn test_create_output_directory() {
        let dir = tempdir().unwrap();
        let output_dir = dir.path().join("results");

        // New folder
        assert!(!create_output_directory(&output_dir, false).unwrap());
        assert!(output_dir.is_dir());

        // Existing empty folder
        assert!(!create_output_directory(&output_dir, false).unwrap());

        // Existing non-empty folder
        fs::write(output_dir.join("old.csv"), "a,b").unwrap();
        assert!(create_output_directory(&output_dir, false).is_err());
        assert!(create_output_directory(&output_dir, true).unwrap());
        assert!(!output_dir.join("old.csv").exists());
    }

    #[test]
    fn test_write_combined_profiles_stack_years() {
        let dir = tempdir().unwrap();
        {
            let sectors = [Sector::Transport, Sector::Industry];
            let mut writer = DataWriter::create(dir.path(), &sectors, false).unwrap();
            writer.write_combined(&sector_output(2030, 8760.0)).unwrap();
            writer.write_combined(&sector_output(2032, 8784.0)).unwrap();
            writer.flush().unwrap();
        }

        let combined = dir.path().join(COMBINED_DIRECTORY_NAME);
        let zone_rows: Vec<ZoneResultRow> = read_rows(&combined.join(ZONE_RESULTS_FILE_NAME));
        assert_eq!(zone_rows.len(), 2);
        assert_eq!(zone_rows[1].year, 2032);

        let profile_rows: Vec<ProfileRow> =
            read_rows(&combined.join(PROFILES_DIRECTORY_NAME).join("west_profile.csv"));
        assert_eq!(profile_rows.len(), 8760 + 8784);
        assert_eq!(
            profile_rows[0],
            ProfileRow {
                timepoint_id: 0,
                timeseries: "2030_all".into(),
                timestamp: "2030-01-01-00".into(),
                h2_demand_kg: 1.0,
            }
        );
        let first_2032 = &profile_rows[8760];
        assert_eq!(first_2032.timepoint_id, 8760);
        assert_eq!(first_2032.timeseries, "2032_all");
        assert_eq!(first_2032.timestamp, "2032-01-01-00");
        assert_eq!(profile_rows.last().unwrap().timestamp, "2032-12-31-23");
    }

    #[test]
    fn test_write_zone_results_by_class() {
        let dir = tempdir().unwrap();
        let output = sector_output(2030, 10.0);
        let by_class = ClassZoneTotals {
            ld: AnnualDemandTable::from_rows(2030, [("west".into(), Hydrogen(4.0))]).unwrap(),
            hd: AnnualDemandTable::from_rows(2030, [("west".into(), Hydrogen(6.0))]).unwrap(),
        };
        {
            let mut writer = DemandWriter::create(dir.path().join("transport")).unwrap();
            writer.write(&output, Some(&by_class)).unwrap();
            writer.flush().unwrap();
            let mut writer = DemandWriter::create(dir.path().join("combined")).unwrap();
            writer.write(&output, None).unwrap();
            writer.flush().unwrap();
        }

        let rows: Vec<ZoneResultRow> =
            read_rows(&dir.path().join("transport").join(ZONE_RESULTS_FILE_NAME));
        assert_equal(
            rows,
            iter::once(ZoneResultRow {
                year: 2030,
                zone: "west".into(),
                ld_h2_demand_kg: Some(4.0),
                hd_h2_demand_kg: Some(6.0),
                h2_demand_kg: 10.0,
            }),
        );

        let rows: Vec<ZoneResultRow> =
            read_rows(&dir.path().join("combined").join(ZONE_RESULTS_FILE_NAME));
        assert_eq!(rows[0].ld_h2_demand_kg, None);
        assert_eq!(rows[0].hd_h2_demand_kg, None);
    }

    #[rstest]
    fn test_write_grid(grid_cells: GridCellMap) {
        let totals = AnnualDemandTable::<CellID>::from_rows(2030, [("c2".into(), Hydrogen(7.5))])
            .unwrap();
        let grid = DemandGrid::from_totals(&grid_cells, &totals).unwrap();
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("2030_demand_grid.geojson");
        write_grid(&file_path, &grid).unwrap();

        let features = read_geojson_features(&file_path).unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(
            features[1].property("cell_id").and_then(|v| v.as_str()),
            Some("c2")
        );
        assert_eq!(
            features[1].property("h2_demand_kg").and_then(|v| v.as_f64()),
            Some(7.5)
        );
        assert!(features[0].geometry.is_some());
    }

    #[test]
    fn test_write_warnings() {
        let mut warnings = WarningLog::default();
        warnings.push(StageWarning::UnknownZone {
            zone: "CAN_BC".into(),
            demand: 2.0,
        });
        let dir = tempdir().unwrap();
        {
            let mut writer = DataWriter::create(dir.path(), &[Sector::Transport], false).unwrap();
            writer
                .write_warnings(2030, Sector::Transport, &warnings)
                .unwrap();
            writer.flush().unwrap();
        }

        let expected = WarningRow {
            year: 2030,
            sector: "transport".into(),
            kind: "UnknownZone".into(),
            message: "Demand allocated to unknown zone 'CAN_BC' dropped (2.000 kg)".into(),
        };
        let rows: Vec<WarningRow> = read_rows(&dir.path().join(WARNINGS_FILE_NAME));
        assert_equal(rows, iter::once(expected));
        assert!(!dir.path().join(COMBINED_DIRECTORY_NAME).exists());
        assert!(!dir.path().join("industry").exists());
    }
}
