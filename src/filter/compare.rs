//! Typed comparison of a document value against filter operands.
//!
//! The operand kind is decided up front (date, number or text) and the
//! comparison then runs in that domain only.

use crate::value::{parse_date_millis, Value};

use super::operator::FilterOperator;

/// Comparison domain chosen for a pair of values
#[derive(Debug, Clone, PartialEq)]
enum Operands {
    Date(f64, f64),
    Number(f64, f64),
    Text(String, String),
}

/// Compare a resolved document value with a filter operand.
///
/// An absent or null document value sorts below everything: it satisfies
/// `ne`, `lt` and `lte` and nothing else.
pub fn compare(
    doc_value: Option<&Value>,
    operator: FilterOperator,
    filter_value: &Value,
    filter_value2: Option<&Value>,
) -> bool {
    let doc_value = match doc_value {
        None | Some(Value::Null) => {
            return matches!(
                operator,
                FilterOperator::Ne | FilterOperator::Lt | FilterOperator::Lte
            )
        }
        Some(v) => v,
    };

    if operator == FilterOperator::In {
        return in_list(doc_value, filter_value);
    }

    match classify(doc_value, filter_value, operator) {
        Some(Operands::Date(a, b)) => {
            let upper = filter_value2.and_then(date_millis);
            compare_ordered(a, b, upper, operator)
        }
        Some(Operands::Number(a, b)) => {
            let upper = filter_value2.and_then(Value::to_number);
            compare_ordered(a, b, upper, operator)
        }
        Some(Operands::Text(a, b)) => {
            let upper = filter_value2.map(|v| v.to_text().to_lowercase());
            compare_text(&a, &b, upper.as_deref(), operator)
        }
        None => false,
    }
}

fn classify(doc_value: &Value, filter_value: &Value, operator: FilterOperator) -> Option<Operands> {
    if is_date_like(doc_value) || is_date_like(filter_value) {
        if operator.is_textual() {
            return Some(text_operands(doc_value, filter_value));
        }
        let a = date_millis(doc_value)?;
        let b = date_millis(filter_value)?;
        return Some(Operands::Date(a, b));
    }

    if !operator.is_textual() {
        if let (Some(a), Some(b)) = (doc_value.to_number(), filter_value.to_number()) {
            return Some(Operands::Number(a, b));
        }
    }

    match (doc_value, filter_value) {
        (Value::Map(_), _) | (_, Value::Map(_)) | (_, Value::List(_)) => None,
        _ => Some(text_operands(doc_value, filter_value)),
    }
}

fn text_operands(a: &Value, b: &Value) -> Operands {
    Operands::Text(a.to_text().to_lowercase(), b.to_text().to_lowercase())
}

fn is_date_like(value: &Value) -> bool {
    match value {
        Value::Timestamp(_) => true,
        Value::String(s) => parse_date_millis(s).is_some(),
        _ => false,
    }
}

fn date_millis(value: &Value) -> Option<f64> {
    match value {
        Value::Timestamp(ts) => Some(ts.to_millis()),
        Value::String(s) => parse_date_millis(s),
        Value::Number(n) => Some(*n),
        _ => None,
    }
}

fn compare_ordered(a: f64, b: f64, upper: Option<f64>, operator: FilterOperator) -> bool {
    match operator {
        FilterOperator::Eq => a == b,
        FilterOperator::Ne => a != b,
        FilterOperator::Gt => a > b,
        FilterOperator::Gte => a >= b,
        FilterOperator::Lt => a < b,
        FilterOperator::Lte => a <= b,
        FilterOperator::Between => upper.is_some_and(|hi| a >= b && a <= hi),
        _ => false,
    }
}

fn compare_text(a: &str, b: &str, upper: Option<&str>, operator: FilterOperator) -> bool {
    match operator {
        FilterOperator::Eq => a == b,
        FilterOperator::Ne => a != b,
        FilterOperator::Gt => a > b,
        FilterOperator::Gte => a >= b,
        FilterOperator::Lt => a < b,
        FilterOperator::Lte => a <= b,
        FilterOperator::Contains => a.contains(b),
        FilterOperator::StartsWith => a.starts_with(b),
        FilterOperator::EndsWith => a.ends_with(b),
        FilterOperator::Between => upper.is_some_and(|hi| a >= b && a <= hi),
        FilterOperator::In => false,
    }
}

/// Case-insensitive membership of a scalar in a list operand.
fn in_list(doc_value: &Value, filter_value: &Value) -> bool {
    let Some(candidates) = filter_value.as_list() else {
        return false;
    };
    if matches!(doc_value, Value::Map(_) | Value::List(_)) {
        return false;
    }
    let needle = doc_value.to_text().to_lowercase();
    candidates
        .iter()
        .filter(|c| !c.is_null())
        .any(|c| c.to_text().to_lowercase() == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Timestamp;
    use serde_json::json;

    fn v(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    #[test]
    fn test_absent_value_only_matches_ne_lt_lte() {
        let target = v(json!(5));
        assert!(compare(None, FilterOperator::Ne, &target, None));
        assert!(compare(None, FilterOperator::Lt, &target, None));
        assert!(compare(Some(&Value::Null), FilterOperator::Lte, &target, None));
        assert!(!compare(None, FilterOperator::Eq, &target, None));
        assert!(!compare(None, FilterOperator::Gt, &target, None));
        assert!(!compare(None, FilterOperator::Contains, &target, None));
    }

    #[test]
    fn test_numeric_comparison_coerces_strings() {
        assert!(compare(Some(&v(json!("10"))), FilterOperator::Gt, &v(json!(9)), None));
        assert!(compare(Some(&v(json!(10))), FilterOperator::Eq, &v(json!("10.0")), None));
        assert!(compare(
            Some(&v(json!(10))),
            FilterOperator::Between,
            &v(json!(10)),
            Some(&v(json!(20)))
        ));
        assert!(!compare(
            Some(&v(json!(21))),
            FilterOperator::Between,
            &v(json!(10)),
            Some(&v(json!(20)))
        ));
    }

    #[test]
    fn test_between_without_upper_bound_fails() {
        assert!(!compare(Some(&v(json!(15))), FilterOperator::Between, &v(json!(10)), None));
    }

    #[test]
    fn test_string_operators_are_case_insensitive() {
        let name = v(json!("Maria Plumbing"));
        assert!(compare(Some(&name), FilterOperator::Contains, &v(json!("PLUMB")), None));
        assert!(compare(Some(&name), FilterOperator::StartsWith, &v(json!("maria")), None));
        assert!(compare(Some(&name), FilterOperator::EndsWith, &v(json!("ing")), None));
        assert!(compare(Some(&name), FilterOperator::Eq, &v(json!("maria plumbing")), None));
    }

    #[test]
    fn test_contains_on_numeric_text() {
        let phone = v(json!("0991234567"));
        assert!(compare(Some(&phone), FilterOperator::Contains, &v(json!("1234")), None));
    }

    #[test]
    fn test_in_membership() {
        let list = v(json!(["Active", "pending"]));
        assert!(compare(Some(&v(json!("active"))), FilterOperator::In, &list, None));
        assert!(!compare(Some(&v(json!("closed"))), FilterOperator::In, &list, None));
        assert!(!compare(Some(&v(json!("active"))), FilterOperator::In, &v(json!("active")), None));
    }

    #[test]
    fn test_dates_compare_as_instants() {
        let ts = Value::Timestamp(Timestamp::new(1_704_153_600, 0)); // 2024-01-02
        assert!(compare(Some(&ts), FilterOperator::Gt, &v(json!("2024-01-01")), None));
        assert!(compare(Some(&ts), FilterOperator::Eq, &v(json!("2024-01-02T00:00:00Z")), None));
        assert!(compare(
            Some(&v(json!("2024-03-10"))),
            FilterOperator::Between,
            &v(json!("2024-03-01")),
            Some(&v(json!("2024-03-31")))
        ));
    }

    #[test]
    fn test_date_against_non_date_fails() {
        assert!(!compare(
            Some(&v(json!("2024-01-02"))),
            FilterOperator::Gt,
            &v(json!("tomorrow")),
            None
        ));
    }

    #[test]
    fn test_maps_never_match() {
        let map = v(json!({"a": 1}));
        assert!(!compare(Some(&map), FilterOperator::Eq, &v(json!("x")), None));
    }
}
