//! # Special Filters
//!
//! Named predicates that the criteria grammar cannot express.
//!
//! `workingDayOpen` takes a `MM-DD-YYYY` date, resolves its weekday and keeps
//! documents whose `workingDays` list has an entry for that day with
//! `isOpen: true`. Day names are stored in Spanish (`lunes`, `martes`, ...);
//! English names are accepted too.

use chrono::{Datelike, NaiveDate, Weekday};
use serde_json::Value as JsonValue;
use tracing::warn;

use crate::path;
use crate::value::{fold_text, Document, Value};

use super::errors::FilterParseError;

const DATE_FORMAT: &str = "%m-%d-%Y";
const DEFAULT_DAYS_FIELD: &str = "workingDays";

/// A parsed special filter
#[derive(Debug, Clone, PartialEq)]
pub enum SpecialFilter {
    WorkingDayOpen { weekday: Weekday, field: String },
}

impl SpecialFilter {
    /// Decode `{type, ...params}`.
    ///
    /// Returns `Ok(None)` for unknown types, which are skipped with a warning.
    pub fn from_json(json: &JsonValue) -> Result<Option<Self>, FilterParseError> {
        let Some(kind) = json.get("type").and_then(JsonValue::as_str) else {
            return Err(FilterParseError::InvalidParameter(
                "special filter requires a type".to_string(),
            ));
        };

        match kind {
            "workingDayOpen" => {
                let date = json
                    .get("date")
                    .and_then(JsonValue::as_str)
                    .ok_or_else(|| {
                        FilterParseError::InvalidParameter("workingDayOpen requires a date".to_string())
                    })?;
                let parsed = NaiveDate::parse_from_str(date.trim(), DATE_FORMAT).map_err(|_| {
                    FilterParseError::InvalidParameter(format!(
                        "date must be MM-DD-YYYY, got {}",
                        date
                    ))
                })?;
                let field = json
                    .get("field")
                    .and_then(JsonValue::as_str)
                    .unwrap_or(DEFAULT_DAYS_FIELD)
                    .to_string();
                Ok(Some(SpecialFilter::WorkingDayOpen {
                    weekday: parsed.weekday(),
                    field,
                }))
            }
            other => {
                warn!(special_filter = other, "ignoring unknown special filter");
                Ok(None)
            }
        }
    }

    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            SpecialFilter::WorkingDayOpen { weekday, field } => {
                let Some(Value::List(days)) = path::get_path(doc, field) else {
                    return false;
                };
                days.iter().any(|entry| {
                    let day = entry
                        .as_map()
                        .and_then(|m| m.get("day"))
                        .and_then(Value::as_str)
                        .and_then(weekday_from_name);
                    let open = entry
                        .as_map()
                        .and_then(|m| m.get("isOpen"))
                        .and_then(Value::as_bool)
                        .unwrap_or(false);
                    open && day == Some(*weekday)
                })
            }
        }
    }

    pub fn apply(&self, docs: Vec<Document>) -> Vec<Document> {
        docs.into_iter().filter(|doc| self.matches(doc)).collect()
    }
}

/// Weekday for a stored day name, ignoring case and accents.
pub fn weekday_from_name(name: &str) -> Option<Weekday> {
    let folded = fold_text(name.trim());

    let day = match folded.as_str() {
        "lunes" | "monday" => Weekday::Mon,
        "martes" | "tuesday" => Weekday::Tue,
        "miercoles" | "wednesday" => Weekday::Wed,
        "jueves" | "thursday" => Weekday::Thu,
        "viernes" | "friday" => Weekday::Fri,
        "sabado" | "saturday" => Weekday::Sat,
        "domingo" | "sunday" => Weekday::Sun,
        _ => return None,
    };
    Some(day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::to_document;
    use serde_json::json;

    fn salon(open_on: &str, is_open: bool) -> Document {
        to_document(json!({
            "id": "s1",
            "workingDays": [
                {"day": open_on, "isOpen": is_open, "from": "09:00"},
                {"day": "Domingo", "isOpen": false}
            ]
        }))
    }

    #[test]
    fn test_weekday_names() {
        assert_eq!(weekday_from_name("Miércoles"), Some(Weekday::Wed));
        assert_eq!(weekday_from_name("SABADO"), Some(Weekday::Sat));
        assert_eq!(weekday_from_name("friday"), Some(Weekday::Fri));
        assert_eq!(weekday_from_name("someday"), None);
    }

    #[test]
    fn test_working_day_open() {
        // 2024-03-15 is a Friday
        let filter = SpecialFilter::from_json(&json!({"type": "workingDayOpen", "date": "03-15-2024"}))
            .unwrap()
            .unwrap();

        assert!(filter.matches(&salon("Viernes", true)));
        assert!(!filter.matches(&salon("Viernes", false)));
        assert!(!filter.matches(&salon("Jueves", true)));
        assert!(!filter.matches(&to_document(json!({"id": "x"}))));
    }

    #[test]
    fn test_bad_date_is_rejected() {
        let err = SpecialFilter::from_json(&json!({"type": "workingDayOpen", "date": "2024-03-15"}))
            .unwrap_err();
        assert!(matches!(err, FilterParseError::InvalidParameter(_)));
    }

    #[test]
    fn test_unknown_type_is_skipped() {
        assert_eq!(SpecialFilter::from_json(&json!({"type": "openNow"})).unwrap(), None);
    }
}
