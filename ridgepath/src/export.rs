//! GeoJSON output.

use geo::geometry::{LineString, MultiLineString};
use geojson::{feature::Id, Feature, FeatureCollection, Geometry, Value};

/// Returns one multi-line feature per part of `path`, numbered from 1.
pub fn feature_collection(path: &MultiLineString) -> FeatureCollection {
    let features = path
        .0
        .iter()
        .enumerate()
        .map(|(idx, part)| {
            let part = MultiLineString::new(vec![part.clone()]);
            Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::from(&part))),
                id: Some(Id::Number((idx + 1).into())),
                properties: None,
                foreign_members: None,
            }
        })
        .collect();
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

pub fn line_feature(line: &LineString) -> Feature {
    Feature::from(Geometry::new(Value::from(line)))
}

#[cfg(test)]
mod tests {
    use super::{feature_collection, line_feature};
    use geo::{line_string, MultiLineString};
    use geojson::{feature::Id, Value};

    #[test]
    fn test_feature_ids_start_at_one() {
        let path = MultiLineString::new(vec![
            line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)],
            line_string![(x: 1.0, y: 1.0), (x: 2.0, y: 1.0), (x: 3.0, y: 0.0)],
        ]);
        let fc = feature_collection(&path);
        assert_eq!(fc.features.len(), 2);
        assert_eq!(fc.features[0].id, Some(Id::Number(1.into())));
        assert_eq!(fc.features[1].id, Some(Id::Number(2.into())));
        match &fc.features[1].geometry.as_ref().unwrap().value {
            Value::MultiLineString(parts) => {
                assert_eq!(parts.len(), 1);
                assert_eq!(parts[0], vec![vec![1.0, 1.0], vec![2.0, 1.0], vec![3.0, 0.0]]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_empty_path() {
        let fc = feature_collection(&MultiLineString::new(vec![]));
        assert!(fc.features.is_empty());
        let json = serde_json::to_value(&fc).unwrap();
        assert_eq!(json["type"], "FeatureCollection");
    }

    #[test]
    fn test_line_feature() {
        let feature = line_feature(&line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)]);
        assert!(matches!(
            feature.geometry.map(|g| g.value),
            Some(Value::LineString(_))
        ));
    }
}
