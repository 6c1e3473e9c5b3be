//! Code for reading the optional demand grid.
use super::*;
use crate::grid::{CellID, GridCell, GridCellMap};
use geojson::Feature;

const GRID_FILE_NAME: &str = "grid_cells.geojson";

/// Read grid cells from the model directory.
///
/// The grid is optional: if the file is absent no grid outputs are produced.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
pub fn read_grid_cells(model_dir: &Path) -> Result<Option<GridCellMap>> {
    let file_path = model_dir.join(GRID_FILE_NAME);
    if !file_path.exists() {
        debug!("No grid file found; grid outputs disabled");
        return Ok(None);
    }

    let features = read_geojson_features(&file_path)?;
    let cells =
        read_grid_cells_from_features(&features).with_context(|| input_err_msg(&file_path))?;
    Ok(Some(cells))
}

fn read_grid_cell(feature: &Feature) -> Result<GridCell> {
    let id = feature_str_property(feature, "cell_id")?;
    let state = feature_str_property(feature, "state")?;
    let geometry =
        feature_multi_polygon(feature).with_context(|| format!("Invalid geometry for cell {id}"))?;

    Ok(GridCell {
        id: id.into(),
        state: state.into(),
        geometry,
        ld_vmt: feature_f64_property(feature, "ld_vmt")?,
        hd_vmt: feature_f64_property(feature, "hd_vmt")?,
    })
}

fn read_grid_cells_from_features(features: &[Feature]) -> Result<GridCellMap> {
    let mut cells = GridCellMap::new();
    for (i, feature) in features.iter().enumerate() {
        let cell = read_grid_cell(feature)
            .with_context(|| format!("Invalid grid cell at feature {i}"))?;
        let id: CellID = cell.id.clone();
        ensure!(cells.insert(id.clone(), cell).is_none(), "Duplicate grid cell {id}");
    }

    Ok(cells)
}
