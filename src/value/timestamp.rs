//! Store timestamps.
//!
//! The document store encodes timestamps as a two-field object
//! (`seconds`/`_seconds` plus `nanoseconds`/`_nanoseconds`). They are lifted
//! into their own type on ingest so that nothing downstream mistakes them for
//! a nested map.

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value as JsonValue};

/// A point in time as stored by the document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanoseconds: i64,
}

impl Timestamp {
    pub fn new(seconds: i64, nanoseconds: i64) -> Self {
        Self {
            seconds,
            nanoseconds,
        }
    }

    /// Milliseconds since the Unix epoch.
    pub fn to_millis(&self) -> f64 {
        self.seconds as f64 * 1000.0 + self.nanoseconds as f64 / 1_000_000.0
    }

    /// Detect the store encoding. The object must carry exactly the two
    /// timestamp keys with integer values.
    pub fn from_json_object(object: &Map<String, JsonValue>) -> Option<Self> {
        if object.len() != 2 {
            return None;
        }
        let seconds = object
            .get("seconds")
            .or_else(|| object.get("_seconds"))?
            .as_i64()?;
        let nanoseconds = object
            .get("nanoseconds")
            .or_else(|| object.get("_nanoseconds"))?
            .as_i64()?;
        Some(Self::new(seconds, nanoseconds))
    }

    pub fn to_json(&self) -> JsonValue {
        json!({
            "_seconds": self.seconds,
            "_nanoseconds": self.nanoseconds,
        })
    }

    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        let nanos = u32::try_from(self.nanoseconds).ok()?;
        DateTime::from_timestamp(self.seconds, nanos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_both_key_styles() {
        let plain = json!({"seconds": 10, "nanoseconds": 500_000_000});
        let underscored = json!({"_seconds": 10, "_nanoseconds": 500_000_000});

        let a = Timestamp::from_json_object(plain.as_object().unwrap()).unwrap();
        let b = Timestamp::from_json_object(underscored.as_object().unwrap()).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.to_millis(), 10_500.0);
    }

    #[test]
    fn test_rejects_extra_keys() {
        let obj = json!({"seconds": 1, "nanoseconds": 0, "label": "x"});
        assert!(Timestamp::from_json_object(obj.as_object().unwrap()).is_none());
    }

    #[test]
    fn test_rejects_non_integer_parts() {
        let obj = json!({"seconds": "1", "nanoseconds": 0});
        assert!(Timestamp::from_json_object(obj.as_object().unwrap()).is_none());
    }

    #[test]
    fn test_to_datetime() {
        let ts = Timestamp::new(0, 0);
        assert_eq!(ts.to_datetime().unwrap().timestamp(), 0);
    }
}
