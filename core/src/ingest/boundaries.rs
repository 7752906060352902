use crate::geo::{Borough, GeoPoint};
use crate::prelude::{DataError, DataResult};
use geojson::{Feature, GeoJson, PolygonType, Value};
use log::{info, warn};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Property keys tried, in order, for a feature's display name.
const NAME_PROPERTIES: [&str; 3] = ["name", "BoroName", "boro_name"];

/// Reads the borough boundary file: a GeoJSON feature collection of
/// Polygon/MultiPolygon features, one per borough, in palette order.
///
/// Features without usable geometry are skipped with a warning rather than
/// failing the whole load.
pub fn read_boundaries<R: Read>(reader: R) -> DataResult<Vec<Borough>> {
    let geojson = GeoJson::from_reader(reader).map_err(geojson::Error::from)?;
    let features = match geojson {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(_) => {
            return Err(DataError::UnsupportedGeometry(
                "bare geometry without feature metadata".to_string(),
            ))
        }
    };

    let mut boroughs = Vec::with_capacity(features.len());
    for (index, feature) in features.into_iter().enumerate() {
        let name = feature_name(&feature, index);
        let Some(geometry) = feature.geometry else {
            warn!("boundary feature {name:?} has no geometry, skipping");
            continue;
        };
        let rings = match geometry.value {
            Value::Polygon(polygon) => convert_rings(polygon),
            Value::MultiPolygon(polygons) => {
                polygons.into_iter().flat_map(convert_rings).collect()
            }
            _ => {
                warn!("boundary feature {name:?} is not a polygon, skipping");
                continue;
            }
        };
        boroughs.push(Borough { name, rings });
    }

    info!("loaded {} borough boundaries", boroughs.len());
    Ok(boroughs)
}

pub fn load_boundaries<P: AsRef<Path>>(path: P) -> DataResult<Vec<Borough>> {
    let file = File::open(path)?;
    read_boundaries(BufReader::new(file))
}

fn feature_name(feature: &Feature, index: usize) -> String {
    for key in NAME_PROPERTIES {
        if let Some(text) = feature.property(key).and_then(|value| value.as_str()) {
            return text.to_string();
        }
    }
    format!("Borough {}", index + 1)
}

fn convert_rings(polygon: PolygonType) -> Vec<Vec<GeoPoint>> {
    polygon
        .into_iter()
        .map(|ring| {
            ring.into_iter()
                .filter_map(|position| match (position.first(), position.get(1)) {
                    (Some(&lon), Some(&lat)) => Some(GeoPoint { lon, lat }),
                    _ => None,
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_BOROUGHS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "BoroName": "Manhattan" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[-74.0, 40.7], [-73.9, 40.7], [-73.9, 40.8], [-74.0, 40.7]]]
                }
            },
            {
                "type": "Feature",
                "properties": {},
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[-73.9, 40.6], [-73.8, 40.6], [-73.8, 40.7], [-73.9, 40.6]]],
                        [[[-73.7, 40.6], [-73.6, 40.6], [-73.6, 40.7], [-73.7, 40.6]]]
                    ]
                }
            }
        ]
    }"#;

    #[test]
    fn reads_named_polygons_in_feature_order() {
        let boroughs = read_boundaries(TWO_BOROUGHS.as_bytes()).unwrap();
        assert_eq!(boroughs.len(), 2);
        assert_eq!(boroughs[0].name, "Manhattan");
        assert_eq!(boroughs[0].rings.len(), 1);
        assert_eq!(boroughs[0].rings[0].len(), 4);
        // Unnamed features get a positional fallback name.
        assert_eq!(boroughs[1].name, "Borough 2");
        // MultiPolygon rings are flattened.
        assert_eq!(boroughs[1].rings.len(), 2);
    }

    #[test]
    fn bare_geometry_is_rejected() {
        let geometry = r#"{ "type": "Point", "coordinates": [-73.9, 40.7] }"#;
        assert!(matches!(
            read_boundaries(geometry.as_bytes()),
            Err(DataError::UnsupportedGeometry(_))
        ));
    }

    #[test]
    fn non_polygon_features_are_skipped() {
        let collection = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": { "name": "pin" },
                "geometry": { "type": "Point", "coordinates": [-73.9, 40.7] }
            }]
        }"#;
        let boroughs = read_boundaries(collection.as_bytes()).unwrap();
        assert!(boroughs.is_empty());
    }
}
