//! GeoJSON export: a boundary-only adapter, not a core algorithm.
//!
//! Every polyline becomes a `LineString` feature carrying its level as a
//! property; closed polylines are exported as `LineString`s too (ring vs.
//! polygon classification is explicitly out of scope — see spec
//! non-goals), since deciding inside/outside orientation needs more
//! context than a single polyline carries.

use serde::Serialize;
use serde_json::{json, Value};

use crate::polyline::Polyline;

#[derive(Serialize)]
struct Geometry {
    #[serde(rename = "type")]
    kind: &'static str,
    coordinates: Vec<[f64; 2]>,
}

#[derive(Serialize)]
struct Feature {
    #[serde(rename = "type")]
    kind: &'static str,
    properties: Value,
    geometry: Geometry,
}

#[derive(Serialize)]
struct FeatureCollection {
    #[serde(rename = "type")]
    kind: &'static str,
    features: Vec<Feature>,
}

/// Renders a set of polylines as a GeoJSON `FeatureCollection` value.
pub fn to_geojson(polylines: &[Polyline]) -> Value {
    let features = polylines
        .iter()
        .map(|pl| Feature {
            kind: "Feature",
            properties: json!({ "level": pl.level }),
            geometry: Geometry {
                kind: "LineString",
                coordinates: pl.points.iter().map(|p| [p.x, p.y]).collect(),
            },
        })
        .collect();

    let collection = FeatureCollection {
        kind: "FeatureCollection",
        features,
    };
    serde_json::to_value(collection).expect("FeatureCollection serializes without error")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::Point;

    #[test]
    fn empty_input_yields_empty_feature_collection() {
        let value = to_geojson(&[]);
        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["features"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn polyline_becomes_linestring_with_level_property() {
        let pl = Polyline::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)], 42.0);
        let value = to_geojson(&[pl]);
        let feature = &value["features"][0];
        assert_eq!(feature["geometry"]["type"], "LineString");
        assert_eq!(feature["properties"]["level"], 42.0);
        assert_eq!(
            feature["geometry"]["coordinates"],
            json!([[0.0, 0.0], [1.0, 1.0]])
        );
    }
}
