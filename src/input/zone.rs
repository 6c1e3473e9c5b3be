//! Code for reading load zones from a GeoJSON file.
use crate::input::{feature_multi_polygon, feature_str_property, input_err_msg, read_geojson_features};
use crate::zone::{GeoZone, ZoneID, ZoneMap};
use anyhow::{Context, Result, ensure};
use std::path::Path;

const ZONES_FILE_NAME: &str = "load_zones.geojson";

/// The feature property holding the zone name
const ZONE_NAME_PROPERTY: &str = "zone";

/// Read load zones from the model directory.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
///
/// # Returns
///
/// A map of zones keyed by name, in file order
pub fn read_zones(model_dir: &Path) -> Result<ZoneMap> {
    let file_path = model_dir.join(ZONES_FILE_NAME);
    read_zones_from_path(&file_path).with_context(|| input_err_msg(&file_path))
}

fn read_zones_from_path(file_path: &Path) -> Result<ZoneMap> {
    let mut zones = ZoneMap::new();
    for (i, feature) in read_geojson_features(file_path)?.iter().enumerate() {
        let name = feature_str_property(feature, ZONE_NAME_PROPERTY)
            .with_context(|| format!("Invalid zone at feature {i}"))?;
        ensure!(!name.is_empty(), "Zone name at feature {i} is empty");
        let geometry = feature_multi_polygon(feature)
            .with_context(|| format!("Invalid geometry for zone {name}"))?;

        let id = ZoneID::from(name);
        ensure!(!zones.contains_key(&id), "Duplicate zone {id}");
        zones.insert(id.clone(), GeoZone { id, geometry });
    }

    Ok(zones)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn square(x: f64) -> String {
        format!(
            r#"{{"type": "Polygon", "coordinates": [[[{x},0],[{x1},0],[{x1},1],[{x},1],[{x},0]]]}}"#,
            x1 = x + 1.0
        )
    }

    #[test]
    fn test_read_zones() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(ZONES_FILE_NAME),
            format!(
                r#"{{"type": "FeatureCollection", "features": [
                    {{"type": "Feature", "properties": {{"zone": "west"}}, "geometry": {}}},
                    {{"type": "Feature", "properties": {{"zone": "east"}}, "geometry": {}}}
                ]}}"#,
                square(0.0),
                square(1.0)
            ),
        )
        .unwrap();

        let zones = read_zones(dir.path()).unwrap();
        let names: Vec<_> = zones.keys().map(ToString::to_string).collect();
        assert_eq!(names, ["west", "east"]);
    }

    #[test]
    fn test_read_zones_duplicate() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(ZONES_FILE_NAME),
            format!(
                r#"{{"type": "FeatureCollection", "features": [
                    {{"type": "Feature", "properties": {{"zone": "west"}}, "geometry": {}}},
                    {{"type": "Feature", "properties": {{"zone": "west"}}, "geometry": {}}}
                ]}}"#,
                square(0.0),
                square(1.0)
            ),
        )
        .unwrap();

        let err = read_zones(dir.path()).unwrap_err();
        assert_eq!(err.root_cause().to_string(), "Duplicate zone west");
    }
}
