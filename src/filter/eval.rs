//! Evaluation of filter trees against a single document.

use crate::path;
use crate::value::{Document, Value};

use super::compare::compare;
use super::criteria::{FilterCriteria, FilterGroup, FilterNode, Logic};

/// Evaluate one criteria.
///
/// List values are flattened (nulls dropped) and the criteria holds when any
/// element satisfies it.
pub fn matches_single(doc: &Document, criteria: &FilterCriteria) -> bool {
    let resolved = path::get(doc, &criteria.field);
    let value2 = criteria.value2.as_ref();

    match resolved {
        Some(list @ Value::List(_)) => {
            let leaves = list.flatten();
            if leaves.is_empty() {
                return compare(None, criteria.operator, &criteria.value, value2);
            }
            leaves
                .into_iter()
                .any(|item| compare(Some(item), criteria.operator, &criteria.value, value2))
        }
        other => compare(other.as_ref(), criteria.operator, &criteria.value, value2),
    }
}

/// Evaluate a group. An empty group matches.
pub fn matches_group(doc: &Document, group: &FilterGroup) -> bool {
    if group.filters.is_empty() {
        return true;
    }
    let mut children = group.filters.iter().map(|node| match node {
        FilterNode::Criteria(criteria) => matches_single(doc, criteria),
        FilterNode::Group(inner) => matches_group(doc, inner),
    });

    match group.logic {
        Logic::And => children.all(|m| m),
        Logic::Or => children.any(|m| m),
    }
}

/// Keep the documents that satisfy `group`.
pub fn apply_filters(docs: Vec<Document>, group: &FilterGroup) -> Vec<Document> {
    if group.is_empty() {
        return docs;
    }
    docs.into_iter()
        .filter(|doc| matches_group(doc, group))
        .collect()
}
