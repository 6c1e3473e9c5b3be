//! The model represents all reference data loaded for a run.
use crate::allocation::SpatialIndex;
use crate::grid::{CellID, GridCellMap};
use crate::input::industry::IndustryInputs;
use crate::input::transport::TransportInputs;
use crate::shape::ShapeLibrary;
use crate::zone::{ZoneID, ZoneMap};
use std::path::PathBuf;

pub mod parameters;
use parameters::ModelParameters;

/// Reference data for a model run.
///
/// A model is read-only once loaded and is shared by every model year and sector.
pub struct Model {
    /// Path to model folder
    pub model_path: PathBuf,
    /// Parameters from the model parameters file
    pub parameters: ModelParameters,
    /// Load zones
    pub zones: ZoneMap,
    /// Grid cells, if a demand grid is modelled
    pub grid: Option<GridCellMap>,
    /// Temporal shapes for each demand stream
    pub shapes: ShapeLibrary,
    /// Industry reference data, if the sector is modelled
    pub industry: Option<IndustryInputs>,
    /// Transport reference data, if the sector is modelled
    pub transport: Option<TransportInputs>,
}

impl Model {
    /// Create a new [`Model`]
    pub fn new(
        model_path: PathBuf,
        parameters: ModelParameters,
        zones: ZoneMap,
        grid: Option<GridCellMap>,
        shapes: ShapeLibrary,
        industry: Option<IndustryInputs>,
        transport: Option<TransportInputs>,
    ) -> Self {
        Self {
            model_path,
            parameters,
            zones,
            grid,
            shapes,
            industry,
            transport,
        }
    }

    /// Iterate over the model's milestone years.
    pub fn iter_years(&self) -> impl Iterator<Item = u32> + '_ {
        self.parameters.milestone_years.iter().copied()
    }

    /// Build a spatial index of the load zones
    pub fn zone_index(&self) -> SpatialIndex<ZoneID> {
        SpatialIndex::new(
            self.zones
                .values()
                .map(|zone| (zone.id.clone(), zone.geometry.clone())),
            self.parameters.zone_boundary_tolerance,
        )
    }

    /// Build a spatial index of the grid cells, if there is a grid
    pub fn grid_index(&self) -> Option<SpatialIndex<CellID>> {
        let grid = self.grid.as_ref()?;
        Some(SpatialIndex::new(
            grid.values()
                .map(|cell| (cell.id.clone(), cell.geometry.clone())),
            self.parameters.zone_boundary_tolerance,
        ))
    }
}
