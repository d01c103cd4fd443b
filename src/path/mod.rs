//! # Field Paths
//!
//! Dotted addressing into nested documents. A segment may carry a bracketed
//! index (`items[2]`) to pick a single list element. Resolution fans out
//! across lists met at non-terminal segments.

mod accessor;

pub use accessor::{get, get_path, set, set_path};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One step of a field path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment {
    pub name: String,
    pub index: Option<usize>,
}

impl Segment {
    fn parse(raw: &str) -> Self {
        if let Some(open) = raw.find('[') {
            if raw.ends_with(']') {
                if let Ok(index) = raw[open + 1..raw.len() - 1].trim().parse::<usize>() {
                    return Self {
                        name: raw[..open].to_string(),
                        index: Some(index),
                    };
                }
            }
        }
        Self {
            name: raw.to_string(),
            index: None,
        }
    }
}

/// A parsed dotted path such as `address.latitude` or `services[0].name`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    raw: String,
    segments: Vec<Segment>,
}

impl FieldPath {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let segments = if raw.is_empty() {
            Vec::new()
        } else {
            raw.split('.').map(Segment::parse).collect()
        };
        Self {
            raw: raw.to_string(),
            segments,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// First segment name, i.e. the top-level key the path starts from.
    pub fn root(&self) -> Option<&str> {
        self.segments.first().map(|s| s.name.as_str())
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for FieldPath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for FieldPath {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<String> for FieldPath {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(|s| Self::parse(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_and_indexed_segments() {
        let path = FieldPath::parse("services[1].price");
        assert_eq!(path.segments().len(), 2);
        assert_eq!(path.segments()[0].name, "services");
        assert_eq!(path.segments()[0].index, Some(1));
        assert_eq!(path.segments()[1].name, "price");
        assert_eq!(path.segments()[1].index, None);
    }

    #[test]
    fn test_malformed_index_is_part_of_name() {
        let path = FieldPath::parse("tags[x]");
        assert_eq!(path.segments()[0].name, "tags[x]");
        assert_eq!(path.segments()[0].index, None);
    }

    #[test]
    fn test_empty_path() {
        assert!(FieldPath::parse("  ").is_empty());
        assert_eq!(FieldPath::parse("a.b").root(), Some("a"));
    }
}
