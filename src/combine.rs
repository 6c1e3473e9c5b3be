//! Combination of per-sector outputs into totals per zone and per grid cell.
//!
//! All combinations are outer joins: an entry present for only one sector is kept, with the
//! other sector contributing zero.
use crate::demand::{AnnualDemandTable, DemandKey};
use crate::grid::{DemandGrid, GeometryKey, GridDemand};
use crate::temporal::HourlyProfile;
use crate::units::Hydrogen;
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;

/// Outer join two annual demand tables on their keys, summing demand
pub fn combine_annual<K: DemandKey>(
    a: &AnnualDemandTable<K>,
    b: &AnnualDemandTable<K>,
) -> Result<AnnualDemandTable<K>> {
    ensure!(
        a.year() == b.year(),
        "Cannot combine demand tables for different years ({} and {})",
        a.year(),
        b.year()
    );

    AnnualDemandTable::from_records(a.year(), a.iter().chain(b.iter()).map(|(k, v)| (k.clone(), v)))
}

/// Outer join two sets of hourly profiles on their keys, summing hour by hour
pub fn combine_hourly<K: DemandKey>(
    a: &IndexMap<K, HourlyProfile>,
    b: &IndexMap<K, HourlyProfile>,
) -> Result<IndexMap<K, HourlyProfile>> {
    let mut combined = a.clone();
    for (key, profile) in b {
        let entry = match combined.get(key) {
            Some(existing) => existing
                .try_add(profile)
                .with_context(|| format!("Failed to combine hourly profiles for {key}"))?,
            None => profile.clone(),
        };
        combined.insert(key.clone(), entry);
    }
    combined.sort_keys();

    Ok(combined)
}

/// Join two demand grids on cell geometry, summing demand.
///
/// Both grids must cover exactly the same set of geometries: a cell present in only one grid
/// indicates the grids were built from different cell sets.
pub fn combine_grids(a: &DemandGrid, b: &DemandGrid) -> Result<DemandGrid> {
    ensure!(
        a.year() == b.year(),
        "Cannot combine demand grids for different years ({} and {})",
        a.year(),
        b.year()
    );

    let mut by_geometry: IndexMap<GeometryKey, f64> = IndexMap::new();
    for (id, cell) in b.iter() {
        ensure!(
            by_geometry
                .insert(GeometryKey::from(&cell.geometry), cell.demand.value())
                .is_none(),
            "Duplicate geometry for cell {id}"
        );
    }

    let mut cells = IndexMap::new();
    for (id, cell) in a.iter() {
        let other = by_geometry
            .swap_remove(&GeometryKey::from(&cell.geometry))
            .with_context(|| format!("Grid cell {id} has no matching geometry in other grid"))?;
        let combined = GridDemand {
            geometry: cell.geometry.clone(),
            demand: cell.demand + Hydrogen(other),
        };
        ensure!(
            cells.insert(id.clone(), combined).is_none(),
            "Duplicate cell {id}"
        );
    }
    ensure!(
        by_geometry.is_empty(),
        "{} grid cell(s) have no matching geometry in other grid",
        by_geometry.len()
    );

    Ok(DemandGrid::from_cells(a.year(), cells))
}
