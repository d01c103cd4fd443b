//! Search expressed as a filter.

use crate::filter::{FilterCriteria, FilterGroup, FilterNode, FilterOperator};

/// OR of `contains` criteria, one per field, each with the whole query.
/// Empty when there are no fields or the query is blank.
pub fn fields_to_filter(fields: &[String], query: &str) -> FilterGroup {
    let query = query.trim();
    if query.is_empty() {
        return FilterGroup::default();
    }
    let filters = fields
        .iter()
        .map(|f| f.trim())
        .filter(|f| !f.is_empty())
        .map(|f| FilterNode::Criteria(FilterCriteria::new(f, FilterOperator::Contains, query)))
        .collect();
    FilterGroup::or(filters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{matches_group, Logic};
    use crate::value::to_document;
    use serde_json::json;

    #[test]
    fn test_builds_or_of_contains() {
        let group = fields_to_filter(&["name".into(), "city".into()], " Quito ");
        assert_eq!(group.logic, Logic::Or);
        assert_eq!(group.filters.len(), 2);

        let doc = to_document(json!({"name": "Ana", "city": "QUITO norte"}));
        assert!(matches_group(&doc, &group));
    }

    #[test]
    fn test_blank_query_is_empty() {
        assert!(fields_to_filter(&["name".into()], "  ").is_empty());
        assert!(fields_to_filter(&[], "ana").is_empty());
    }
}
