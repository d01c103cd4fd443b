//! # Special Sorts
//!
//! Named orderings applied ahead of the regular criteria, which then break
//! ties. The only strategy is `distance`: great-circle distance from a
//! caller-supplied point to each document's coordinates.

use std::cmp::Ordering;

use serde_json::Value as JsonValue;
use tracing::warn;

use crate::path::{self, FieldPath};
use crate::value::{Document, Value};

use super::compare::SortKey;
use super::errors::SortParseError;
use super::geo::{haversine_km, Coordinates};
use super::sorter::{compare_key_lists, sort_by_criteria, sort_keys, SortCriteria, SortOrder};

/// Field the computed distance is written to
pub const DISTANCE_FIELD: &str = "_distance";

const DEFAULT_LAT_FIELD: &str = "address.latitude";
const DEFAULT_LON_FIELD: &str = "address.longitude";

#[derive(Debug, Clone, PartialEq)]
pub enum SpecialSort {
    Distance {
        origin: Coordinates,
        lat_field: FieldPath,
        lon_field: FieldPath,
        order: SortOrder,
    },
}

impl SpecialSort {
    pub fn distance(lat: f64, lon: f64) -> Option<Self> {
        Some(SpecialSort::Distance {
            origin: Coordinates::new(lat, lon)?,
            lat_field: FieldPath::parse(DEFAULT_LAT_FIELD),
            lon_field: FieldPath::parse(DEFAULT_LON_FIELD),
            order: SortOrder::Asc,
        })
    }

    /// Decode `{type: "distance", lat, lon, latField?, lonField?, order?}`.
    /// `latitude`, `lng` and `longitude` are accepted as aliases.
    ///
    /// Unknown types are skipped with a warning.
    pub fn from_json(json: &JsonValue) -> Result<Option<Self>, SortParseError> {
        let Some(kind) = json.get("type").and_then(JsonValue::as_str) else {
            return Err(SortParseError::InvalidSpecialSort(
                "special sort requires a type".to_string(),
            ));
        };
        if kind != "distance" {
            warn!(special_sort = kind, "ignoring unknown special sort");
            return Ok(None);
        }

        let number = |keys: &[&str]| {
            keys.iter()
                .find_map(|k| json.get(*k))
                .map(|v| Value::from(v.clone()))
                .and_then(|v| v.to_number())
        };
        let lat = number(&["lat", "latitude"]);
        let lon = number(&["lon", "lng", "longitude"]);
        let origin = lat
            .zip(lon)
            .and_then(|(lat, lon)| Coordinates::new(lat, lon))
            .ok_or_else(|| {
                SortParseError::InvalidSpecialSort(
                    "distance sort requires a valid lat and lon".to_string(),
                )
            })?;

        let field = |key: &str, default: &str| {
            FieldPath::parse(json.get(key).and_then(JsonValue::as_str).unwrap_or(default))
        };
        let order = match json.get("order").and_then(JsonValue::as_str) {
            Some(raw) => SortOrder::parse(raw)?,
            None => SortOrder::Asc,
        };

        Ok(Some(SpecialSort::Distance {
            origin,
            lat_field: field("latField", DEFAULT_LAT_FIELD),
            lon_field: field("lonField", DEFAULT_LON_FIELD),
            order,
        }))
    }

    /// Distance from the origin to `doc`, when it has usable coordinates.
    pub fn distance_of(&self, doc: &Document) -> Option<f64> {
        match self {
            SpecialSort::Distance {
                origin,
                lat_field,
                lon_field,
                ..
            } => {
                let coordinate = |p: &FieldPath| path::get(doc, p).and_then(|v| v.to_number());
                let point = Coordinates::new(coordinate(lat_field)?, coordinate(lon_field)?)?;
                Some(haversine_km(*origin, point))
            }
        }
    }

    fn order(&self) -> SortOrder {
        match self {
            SpecialSort::Distance { order, .. } => *order,
        }
    }
}

/// Bucketed distance; buckets are `epsilon` wide so near-equal distances
/// tie and fall through to the regular criteria.
fn bucket(distance: Option<f64>, epsilon: f64) -> Option<i64> {
    let d = distance?;
    if epsilon > 0.0 {
        Some((d / epsilon).round() as i64)
    } else {
        Some((d * 1e9).round() as i64)
    }
}

fn compare_buckets(a: Option<i64>, b: Option<i64>, order: SortOrder) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => match order {
            SortOrder::Asc => x.cmp(&y),
            SortOrder::Desc => y.cmp(&x),
        },
    }
}

/// Position of a document in the combined order: its distance bucket
/// under the special sort, then its regular sort keys.
#[derive(Debug, Clone, PartialEq)]
pub struct RankKey {
    distance: Option<i64>,
    keys: Vec<SortKey>,
}

impl RankKey {
    pub fn of(
        doc: &Document,
        special: Option<&SpecialSort>,
        criteria: &[SortCriteria],
        epsilon_km: f64,
    ) -> Self {
        let distance = special.and_then(|s| s.distance_of(doc));
        Self::with_distance(doc, distance, criteria, epsilon_km)
    }

    fn with_distance(
        doc: &Document,
        distance: Option<f64>,
        criteria: &[SortCriteria],
        epsilon_km: f64,
    ) -> Self {
        Self {
            distance: bucket(distance, epsilon_km),
            keys: sort_keys(doc, criteria),
        }
    }

    /// Compare under the same special sort and criteria the keys were built
    /// with.
    pub fn compare(
        &self,
        other: &Self,
        special: Option<&SpecialSort>,
        criteria: &[SortCriteria],
    ) -> Ordering {
        let by_distance = match special {
            Some(special) => compare_buckets(self.distance, other.distance, special.order()),
            None => Ordering::Equal,
        };
        by_distance.then_with(|| compare_key_lists(&self.keys, &other.keys, criteria))
    }
}

/// Apply the special sort (if any) with `criteria` as tie-breakers.
///
/// The distance sort writes `_distance` into every document: kilometres, or
/// null when the document has no usable coordinates. Those documents sort
/// last whatever the order.
pub fn sort_combined(
    docs: Vec<Document>,
    special: Option<&SpecialSort>,
    criteria: &[SortCriteria],
    epsilon_km: f64,
) -> Vec<Document> {
    let Some(special) = special else {
        return sort_by_criteria(docs, criteria);
    };

    let mut keyed: Vec<(RankKey, Document)> = docs
        .into_iter()
        .map(|mut doc| {
            let distance = special.distance_of(&doc);
            doc.insert(
                DISTANCE_FIELD.to_string(),
                distance.map(Value::Number).unwrap_or(Value::Null),
            );
            (RankKey::with_distance(&doc, distance, criteria, epsilon_km), doc)
        })
        .collect();

    keyed.sort_by(|(a, _), (b, _)| a.compare(b, Some(special), criteria));
    keyed.into_iter().map(|(_, doc)| doc).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::to_document;
    use serde_json::json;

    fn places() -> Vec<Document> {
        vec![
            to_document(json!({"id": "far", "address": {"latitude": -2.17, "longitude": -79.92}})),
            to_document(json!({"id": "broken", "address": {"latitude": "n/a", "longitude": -78.5}})),
            to_document(json!({"id": "near", "address": {"latitude": -0.19, "longitude": -78.48}})),
            to_document(json!({"id": "none"})),
        ]
    }

    fn ids(docs: &[Document]) -> Vec<String> {
        docs.iter().map(|d| d["id"].to_text()).collect()
    }

    #[test]
    fn test_distance_ascending() {
        let special = SpecialSort::from_json(&json!({"type": "distance", "lat": -0.18, "lng": -78.47}))
            .unwrap()
            .unwrap();
        let sorted = sort_combined(places(), Some(&special), &[], 1e-4);
        assert_eq!(&ids(&sorted)[..2], &["near".to_string(), "far".to_string()]);
        assert!(sorted[0][DISTANCE_FIELD].as_f64().is_some());
        assert_eq!(sorted[3][DISTANCE_FIELD], Value::Null);
    }

    #[test]
    fn test_invalid_coordinates_last_when_descending() {
        let special = SpecialSort::from_json(&json!({
            "type": "distance", "latitude": "-0.18", "longitude": "-78.47", "order": "desc"
        }))
        .unwrap()
        .unwrap();
        let sorted = sort_combined(places(), Some(&special), &[], 1e-4);
        let order = ids(&sorted);
        assert_eq!(&order[..2], &["far".to_string(), "near".to_string()]);
        assert!(order[2..].contains(&"broken".to_string()));
        assert!(order[2..].contains(&"none".to_string()));
    }

    #[test]
    fn test_ties_fall_through_to_criteria() {
        let docs = vec![
            to_document(json!({"id": "b", "name": "Zed", "address": {"latitude": 1.0, "longitude": 1.0}})),
            to_document(json!({"id": "a", "name": "Amy", "address": {"latitude": 1.0, "longitude": 1.0}})),
        ];
        let special = SpecialSort::distance(0.0, 0.0).unwrap();
        let sorted = sort_combined(docs, Some(&special), &[SortCriteria::asc("name")], 1e-4);
        assert_eq!(ids(&sorted), vec!["a", "b"]);
    }

    #[test]
    fn test_rank_key_orders_like_sort_combined() {
        let special = SpecialSort::distance(0.0, 0.0).unwrap();
        let near = to_document(json!({"id": "n", "address": {"latitude": 0.1, "longitude": 0.0}}));
        let far = to_document(json!({"id": "f", "address": {"latitude": 2.0, "longitude": 0.0}}));
        let lost = to_document(json!({"id": "l"}));

        let key = |d: &Document| RankKey::of(d, Some(&special), &[], 1e-4);
        assert_eq!(key(&near).compare(&key(&far), Some(&special), &[]), Ordering::Less);
        assert_eq!(key(&lost).compare(&key(&far), Some(&special), &[]), Ordering::Greater);
    }

    #[test]
    fn test_custom_fields() {
        let special = SpecialSort::from_json(&json!({
            "type": "distance", "lat": 0, "lon": 0, "latField": "geo.lat", "lonField": "geo.lon"
        }))
        .unwrap()
        .unwrap();
        let doc = to_document(json!({"geo": {"lat": 0, "lon": 1}}));
        let d = special.distance_of(&doc).unwrap();
        assert!((d - 111.19).abs() < 0.1);
    }

    #[test]
    fn test_missing_origin_is_an_error() {
        assert!(SpecialSort::from_json(&json!({"type": "distance", "lat": 1})).is_err());
        assert_eq!(SpecialSort::from_json(&json!({"type": "rating"})).unwrap(), None);
    }
}
