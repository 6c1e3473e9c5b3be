//! A uniform grid of cells (e.g. 5x5 km) used as an alternative fine partition for demand.
use crate::conversion::transport::VehicleClass;
use crate::demand::AnnualDemandTable;
use crate::id::define_id_type;
use crate::region::RegionID;
use crate::units::Hydrogen;
use anyhow::{Result, ensure};
use geo::{CoordsIter, MultiPolygon};
use indexmap::IndexMap;

define_id_type! {CellID}

/// A map of [`GridCell`]s, keyed by cell ID
pub type GridCellMap = IndexMap<CellID, GridCell>;

/// A single grid cell with its reference activity
#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    /// Unique cell identifier
    pub id: CellID,
    /// The state containing the cell
    pub state: RegionID,
    /// Cell boundary
    pub geometry: MultiPolygon<f64>,
    /// Light-duty vehicle-miles travelled within the cell
    pub ld_vmt: f64,
    /// Heavy-duty vehicle-miles travelled within the cell
    pub hd_vmt: f64,
}

impl GridCell {
    /// The VMT of the given vehicle class
    pub fn vmt(&self, class: VehicleClass) -> f64 {
        match class {
            VehicleClass::LightDuty => self.ld_vmt,
            VehicleClass::HeavyDuty => self.hd_vmt,
        }
    }
}

/// Annual demand in one grid cell
#[derive(Debug, Clone, PartialEq)]
pub struct GridDemand {
    /// Cell boundary
    pub geometry: MultiPolygon<f64>,
    /// Annual hydrogen demand
    pub demand: Hydrogen,
}

/// Annual demand for every cell of the grid in one year
#[derive(Debug, Clone, PartialEq)]
pub struct DemandGrid {
    year: u32,
    cells: IndexMap<CellID, GridDemand>,
}

impl DemandGrid {
    /// Create a grid from per-cell totals.
    ///
    /// Every cell of `cells` appears in the result; cells without a total have zero demand.
    pub fn from_totals(cells: &GridCellMap, totals: &AnnualDemandTable<CellID>) -> Result<Self> {
        for (id, _) in totals.iter() {
            ensure!(cells.contains_key(id), "Demand allocated to unknown cell {id}");
        }

        let cells = cells
            .values()
            .map(|cell| {
                let demand = totals.get(&cell.id).unwrap_or_default();
                let cell_demand = GridDemand {
                    geometry: cell.geometry.clone(),
                    demand,
                };
                (cell.id.clone(), cell_demand)
            })
            .collect();

        Ok(Self {
            year: totals.year(),
            cells,
        })
    }

    /// Create a grid directly from cell rows
    pub fn from_cells(year: u32, cells: IndexMap<CellID, GridDemand>) -> Self {
        Self { year, cells }
    }

    /// The year this grid describes
    pub fn year(&self) -> u32 {
        self.year
    }

    /// Iterate over cells in order
    pub fn iter(&self) -> impl Iterator<Item = (&CellID, &GridDemand)> {
        self.cells.iter()
    }

    /// The number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the grid has no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Total demand over all cells
    pub fn total(&self) -> Hydrogen {
        self.cells.values().map(|cell| cell.demand).sum()
    }
}

/// A key identifying a geometry by the exact bit patterns of its coordinates
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GeometryKey(Vec<u64>);

impl From<&MultiPolygon<f64>> for GeometryKey {
    fn from(geometry: &MultiPolygon<f64>) -> Self {
        Self(
            geometry
                .coords_iter()
                .flat_map(|coord| [coord.x.to_bits(), coord.y.to_bits()])
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, grid_cells};
    use rstest::rstest;

    #[rstest]
    fn test_demand_grid_zero_fill(grid_cells: GridCellMap) {
        let totals =
            AnnualDemandTable::from_rows(2030, [("c1".into(), Hydrogen(5.0))]).unwrap();
        let grid = DemandGrid::from_totals(&grid_cells, &totals).unwrap();

        assert_eq!(grid.year(), 2030);
        assert_eq!(grid.len(), grid_cells.len());
        let demands: Vec<_> = grid.iter().map(|(_, cell)| cell.demand.value()).collect();
        assert_eq!(demands, [5.0, 0.0]);
        assert_eq!(grid.total(), Hydrogen(5.0));
    }

    #[rstest]
    fn test_demand_grid_unknown_cell(grid_cells: GridCellMap) {
        let totals =
            AnnualDemandTable::from_rows(2030, [("c9".into(), Hydrogen(5.0))]).unwrap();
        assert_error!(
            DemandGrid::from_totals(&grid_cells, &totals),
            "Demand allocated to unknown cell c9"
        );
    }

    #[rstest]
    fn test_geometry_key(grid_cells: GridCellMap) {
        let c1 = &grid_cells["c1"].geometry;
        let c2 = &grid_cells["c2"].geometry;
        assert_eq!(GeometryKey::from(c1), GeometryKey::from(&c1.clone()));
        assert_ne!(GeometryKey::from(c1), GeometryKey::from(c2));
    }
}
