//! Regions are the coarse geographical units (e.g. states) for which source data is reported.
use crate::id::define_id_type;

define_id_type! {RegionID}
