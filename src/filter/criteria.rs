//! # Filter Trees
//!
//! Criteria and recursive AND/OR groups, plus their decoding from the loose
//! JSON shapes callers send.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::warn;

use crate::path::FieldPath;
use crate::value::Value;

use super::errors::FilterParseError;
use super::operator::FilterOperator;

/// A single field predicate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterCriteria {
    pub field: FieldPath,
    pub operator: FilterOperator,
    pub value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value2: Option<Value>,
}

impl FilterCriteria {
    pub fn new(field: impl Into<FieldPath>, operator: FilterOperator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
            value2: None,
        }
    }

    pub fn between(field: impl Into<FieldPath>, low: impl Into<Value>, high: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator: FilterOperator::Between,
            value: low.into(),
            value2: Some(high.into()),
        }
    }
}

/// How the children of a group combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Logic {
    #[default]
    And,
    Or,
}

/// A child of a group: either a predicate or a nested group
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterNode {
    Criteria(FilterCriteria),
    Group(FilterGroup),
}

/// A recursive predicate tree. An empty group matches every document.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FilterGroup {
    pub logic: Logic,
    pub filters: Vec<FilterNode>,
}

impl FilterGroup {
    pub fn new(logic: Logic) -> Self {
        Self {
            logic,
            filters: Vec::new(),
        }
    }

    pub fn and(filters: Vec<FilterNode>) -> Self {
        Self {
            logic: Logic::And,
            filters,
        }
    }

    pub fn or(filters: Vec<FilterNode>) -> Self {
        Self {
            logic: Logic::Or,
            filters,
        }
    }

    pub fn with(mut self, criteria: FilterCriteria) -> Self {
        self.filters.push(FilterNode::Criteria(criteria));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// True when at least one criteria exists anywhere in the tree.
    pub fn has_criteria(&self) -> bool {
        self.filters.iter().any(|node| match node {
            FilterNode::Criteria(_) => true,
            FilterNode::Group(group) => group.has_criteria(),
        })
    }

    /// Combine two trees so both must hold. Empty sides disappear.
    pub fn and_also(self, other: FilterGroup) -> FilterGroup {
        match (self.is_empty(), other.is_empty()) {
            (_, true) => self,
            (true, false) => other,
            (false, false) => FilterGroup::and(vec![
                FilterNode::Group(self),
                FilterNode::Group(other),
            ]),
        }
    }

    /// Decode the accepted JSON shapes:
    /// - `null` or `[]`: empty group
    /// - array: implicit AND of its entries
    /// - object with `filters`: explicit group (`logic` defaults to AND)
    /// - object with `field`: a single criteria
    ///
    /// Criteria with an unknown operator are dropped with a warning.
    pub fn from_json(json: &JsonValue) -> Result<Self, FilterParseError> {
        match json {
            JsonValue::Null => Ok(Self::default()),
            JsonValue::Array(items) => Ok(Self::and(parse_nodes(items)?)),
            JsonValue::Object(object) if object.contains_key("filters") => parse_group(json),
            JsonValue::Object(_) => Ok(Self::and(parse_node(json)?.into_iter().collect())),
            other => Err(FilterParseError::Invalid(format!(
                "expected an object or array, got {}",
                other
            ))),
        }
    }
}

fn parse_nodes(items: &[JsonValue]) -> Result<Vec<FilterNode>, FilterParseError> {
    let mut nodes = Vec::with_capacity(items.len());
    for item in items {
        if let Some(node) = parse_node(item)? {
            nodes.push(node);
        }
    }
    Ok(nodes)
}

fn parse_node(json: &JsonValue) -> Result<Option<FilterNode>, FilterParseError> {
    let Some(object) = json.as_object() else {
        return Err(FilterParseError::Invalid(format!(
            "filter entries must be objects, got {}",
            json
        )));
    };
    if object.contains_key("filters") {
        return parse_group(json).map(|g| Some(FilterNode::Group(g)));
    }
    parse_criteria(object).map(|c| c.map(FilterNode::Criteria))
}

fn parse_group(json: &JsonValue) -> Result<FilterGroup, FilterParseError> {
    let logic = match json.get("logic").and_then(JsonValue::as_str) {
        None => Logic::And,
        Some(s) if s.eq_ignore_ascii_case("and") => Logic::And,
        Some(s) if s.eq_ignore_ascii_case("or") => Logic::Or,
        Some(other) => {
            return Err(FilterParseError::Invalid(format!("unknown logic: {}", other)));
        }
    };
    let filters = match json.get("filters") {
        Some(JsonValue::Array(items)) => parse_nodes(items)?,
        Some(JsonValue::Null) | None => Vec::new(),
        Some(other) => {
            return Err(FilterParseError::Invalid(format!(
                "filters must be an array, got {}",
                other
            )));
        }
    };
    Ok(FilterGroup { logic, filters })
}

fn parse_criteria(
    object: &serde_json::Map<String, JsonValue>,
) -> Result<Option<FilterCriteria>, FilterParseError> {
    let field = object
        .get("field")
        .and_then(JsonValue::as_str)
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .ok_or(FilterParseError::MissingField)?;

    let operator = match object.get("operator").and_then(JsonValue::as_str) {
        None => FilterOperator::Eq,
        Some(raw) => match raw.parse::<FilterOperator>() {
            Ok(op) => op,
            Err(err) => {
                warn!(field, operator = raw, "dropping filter: {}", err);
                return Ok(None);
            }
        },
    };

    Ok(Some(FilterCriteria {
        field: FieldPath::parse(field),
        operator,
        value: object.get("value").cloned().map(Value::from).unwrap_or(Value::Null),
        value2: object.get("value2").cloned().map(Value::from),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_array_is_and() {
        let group = FilterGroup::from_json(&json!([
            {"field": "status", "operator": "eq", "value": "active"},
            {"field": "rating", "operator": "gte", "value": 4}
        ]))
        .unwrap();

        assert_eq!(group.logic, Logic::And);
        assert_eq!(group.filters.len(), 2);
    }

    #[test]
    fn test_nested_groups() {
        let group = FilterGroup::from_json(&json!({
            "logic": "or",
            "filters": [
                {"field": "city", "value": "Quito"},
                {"logic": "and", "filters": [
                    {"field": "price", "operator": "between", "value": 10, "value2": 20}
                ]}
            ]
        }))
        .unwrap();

        assert_eq!(group.logic, Logic::Or);
        match &group.filters[0] {
            FilterNode::Criteria(c) => assert_eq!(c.operator, FilterOperator::Eq),
            other => panic!("expected criteria, got {:?}", other),
        }
        match &group.filters[1] {
            FilterNode::Group(g) => match &g.filters[0] {
                FilterNode::Criteria(c) => assert_eq!(c.value2, Some(Value::Number(20.0))),
                other => panic!("expected criteria, got {:?}", other),
            },
            other => panic!("expected group, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_operator_is_dropped() {
        let group = FilterGroup::from_json(&json!([
            {"field": "name", "operator": "like", "value": "a%"},
            {"field": "name", "operator": "contains", "value": "a"}
        ]))
        .unwrap();
        assert_eq!(group.filters.len(), 1);
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let err = FilterGroup::from_json(&json!([{"operator": "eq", "value": 1}])).unwrap_err();
        assert_eq!(err, FilterParseError::MissingField);
    }

    #[test]
    fn test_null_is_empty() {
        let group = FilterGroup::from_json(&JsonValue::Null).unwrap();
        assert!(group.is_empty());
        assert!(!group.has_criteria());
    }

    #[test]
    fn test_and_also_drops_empty_sides() {
        let a = FilterGroup::default().with(FilterCriteria::new("a", FilterOperator::Eq, 1_i64));
        let combined = a.clone().and_also(FilterGroup::default());
        assert_eq!(combined, a);

        let b = FilterGroup::or(vec![]).with(FilterCriteria::new("b", FilterOperator::Eq, 2_i64));
        let both = a.and_also(b);
        assert_eq!(both.filters.len(), 2);
        assert!(both.has_criteria());
    }

    #[test]
    fn test_serializes_back_to_wire_shape() {
        let group = FilterGroup::default().with(FilterCriteria::new(
            "address.city",
            FilterOperator::StartsWith,
            "qu",
        ));
        let json = serde_json::to_value(&group).unwrap();
        assert_eq!(
            json,
            json!({"logic": "and", "filters": [
                {"field": "address.city", "operator": "startsWith", "value": "qu"}
            ]})
        );
    }
}
