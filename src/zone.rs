//! Load zones are the named polygons used as the finest reporting geography for demand totals.
use crate::id::define_id_type;
use geo::MultiPolygon;
use indexmap::IndexMap;

define_id_type! {ZoneID}

/// A map of [`GeoZone`]s, keyed by zone ID
pub type ZoneMap = IndexMap<ZoneID, GeoZone>;

/// A load zone: a name and its boundary
#[derive(Debug, Clone, PartialEq)]
pub struct GeoZone {
    /// Unique name of the zone
    pub id: ZoneID,
    /// Zone boundary
    pub geometry: MultiPolygon<f64>,
}
