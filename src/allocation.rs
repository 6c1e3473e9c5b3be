//! Spatial allocation of demand onto a fine geographic partition (load zones or grid cells).
//!
//! Two modes are supported: attribution of points to the polygon containing them, and
//! proportional redistribution of a coarse-unit total across fine units by a reference weight.
use crate::demand::{AnnualDemandTable, DemandKey};
use crate::region::RegionID;
use crate::units::{Dimensionless, Hydrogen};
use crate::warning::{StageWarning, WarningLog};
use anyhow::Result;
use geo::{BoundingRect, Contains, Intersects, MultiPolygon, Point};
use indexmap::IndexMap;
use rstar::{AABB, RTree, RTreeObject};

/// A polygon stored in a [`SpatialIndex`]
struct IndexedShape<K> {
    key: K,
    order: usize,
    envelope: AABB<[f64; 2]>,
    geometry: MultiPolygon<f64>,
}

impl<K> RTreeObject for IndexedShape<K> {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Compute the bounding box envelope for a [`MultiPolygon`]
fn compute_envelope(geometry: &MultiPolygon<f64>) -> AABB<[f64; 2]> {
    geometry.bounding_rect().map_or_else(
        || AABB::from_point([f64::NAN, f64::NAN]),
        |rect| AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
    )
}

/// An R-tree of polygons for point lookups
pub struct SpatialIndex<K> {
    tree: RTree<IndexedShape<K>>,
    include_boundary: bool,
}

impl<K> SpatialIndex<K> {
    /// Build an index over the given polygons.
    ///
    /// # Arguments
    ///
    /// * `shapes` - Keys and polygons. Earlier polygons take precedence where polygons overlap.
    /// * `include_boundary` - Whether points lying exactly on a boundary are inside the polygon
    pub fn new<I>(shapes: I, include_boundary: bool) -> Self
    where
        I: IntoIterator<Item = (K, MultiPolygon<f64>)>,
    {
        let entries = shapes
            .into_iter()
            .enumerate()
            .map(|(order, (key, geometry))| IndexedShape {
                key,
                order,
                envelope: compute_envelope(&geometry),
                geometry,
            })
            .collect();

        Self {
            tree: RTree::bulk_load(entries),
            include_boundary,
        }
    }

    /// Find the polygon containing `point`, if any
    pub fn locate(&self, point: Point<f64>) -> Option<&K> {
        let query = AABB::from_point([point.x(), point.y()]);
        self.tree
            .locate_in_envelope_intersecting(&query)
            .filter(|entry| {
                if self.include_boundary {
                    entry.geometry.intersects(&point)
                } else {
                    entry.geometry.contains(&point)
                }
            })
            .min_by_key(|entry| entry.order)
            .map(|entry| &entry.key)
    }

    /// The number of polygons in the index
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Whether the index is empty
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

/// Attribute each point to the polygon containing it.
///
/// Points outside every polygon map to `None`; callers decide how to report them.
pub fn attribute_points<'a, P, K, I>(
    index: &'a SpatialIndex<K>,
    points: I,
) -> IndexMap<P, Option<&'a K>>
where
    P: std::hash::Hash + Eq,
    I: IntoIterator<Item = (P, Point<f64>)>,
{
    points
        .into_iter()
        .map(|(id, point)| (id, index.locate(point)))
        .collect()
}

/// A fine unit within a coarse unit, carrying a reference weight (e.g. VMT)
#[derive(Debug, Clone, PartialEq)]
pub struct FineUnit<K> {
    /// The coarse unit containing this fine unit
    pub region: RegionID,
    /// The key the unit's allocation is aggregated to
    pub target: K,
    /// Reference activity of the unit
    pub weight: f64,
}

/// Redistribute coarse-unit totals across fine units in proportion to their weights.
///
/// Each fine unit receives `weight / sum(weights in its coarse unit) * coarse total` and
/// allocations are then summed per target. Fine units with zero weight receive nothing. Demand in
/// a coarse unit with no weighted fine units cannot be allocated and is reported as a warning.
pub fn redistribute<K: DemandKey>(
    coarse: &AnnualDemandTable<RegionID>,
    fine: &[FineUnit<K>],
    warnings: &mut WarningLog,
) -> Result<AnnualDemandTable<K>> {
    let mut by_region: IndexMap<&RegionID, Vec<&FineUnit<K>>> = IndexMap::new();
    for unit in fine {
        by_region.entry(&unit.region).or_default().push(unit);
    }

    let mut allocations = Vec::new();
    for (region, demand) in coarse.iter() {
        let units = by_region.get(region).map_or(&[][..], Vec::as_slice);
        let total_weight: f64 = units.iter().map(|unit| unit.weight).sum();

        let zero_weight = units.iter().filter(|unit| unit.weight <= 0.0).count();
        if zero_weight > 0 {
            warnings.push(StageWarning::ZeroWeightUnits {
                region: region.clone(),
                count: zero_weight,
            });
        }

        if total_weight <= 0.0 {
            if demand.value() > 0.0 {
                warnings.push(StageWarning::NoWeightForRegion {
                    region: region.clone(),
                    demand: demand.value(),
                });
            }
            continue;
        }

        allocations.extend(
            units
                .iter()
                .filter(|unit| unit.weight > 0.0)
                .map(|unit| {
                    let share = Dimensionless(unit.weight / total_weight);
                    (unit.target.clone(), demand * share)
                }),
        );
    }

    AnnualDemandTable::from_records(coarse.year(), allocations)
}

/// Sum point demands per polygon.
///
/// Points outside every polygon are returned separately with their demand.
pub fn sum_points<'a, P, K>(
    year: u32,
    demands: impl IntoIterator<Item = (P, Hydrogen, Option<&'a K>)>,
) -> Result<(AnnualDemandTable<K>, Vec<(P, Hydrogen)>)>
where
    K: DemandKey + 'a,
{
    let mut inside = Vec::new();
    let mut outside = Vec::new();
    for (point_id, demand, key) in demands {
        match key {
            Some(key) => inside.push((key.clone(), demand)),
            None => outside.push((point_id, demand)),
        }
    }

    Ok((AnnualDemandTable::from_records(year, inside)?, outside))
}
