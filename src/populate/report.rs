//! Outcome of a populate pass.
//!
//! Joins are best effort: a failed batch leaves its documents unenriched and
//! is recorded here instead of failing the query.

use serde::Serialize;

/// One failed lookup inside a join
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopulateFailure {
    pub collection: String,
    pub target: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "camelCase")]
pub enum JoinOutcome {
    Complete,
    Partial(Vec<PopulateFailure>),
    Skipped(String),
}

/// Per-join record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinReport {
    pub target: String,
    pub collection: String,
    pub outcome: JoinOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PopulateReport {
    pub joins: Vec<JoinReport>,
}

impl PopulateReport {
    pub fn push(&mut self, target: &str, collection: &str, failures: Vec<PopulateFailure>) {
        let outcome = if failures.is_empty() {
            JoinOutcome::Complete
        } else {
            JoinOutcome::Partial(failures)
        };
        self.joins.push(JoinReport {
            target: target.to_string(),
            collection: collection.to_string(),
            outcome,
        });
    }

    pub fn skip(&mut self, target: &str, collection: &str, reason: String) {
        self.joins.push(JoinReport {
            target: target.to_string(),
            collection: collection.to_string(),
            outcome: JoinOutcome::Skipped(reason),
        });
    }

    /// Append nested join records, qualifying their targets with `parent`.
    pub fn extend_nested(&mut self, parent: &str, nested: PopulateReport) {
        for mut join in nested.joins {
            join.target = format!("{}.{}", parent, join.target);
            self.joins.push(join);
        }
    }

    pub fn merge(&mut self, other: PopulateReport) {
        self.joins.extend(other.joins);
    }

    pub fn failures(&self) -> Vec<&PopulateFailure> {
        self.joins
            .iter()
            .filter_map(|j| match &j.outcome {
                JoinOutcome::Partial(failures) => Some(failures.iter()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// True when every join ran and every lookup succeeded.
    pub fn is_complete(&self) -> bool {
        self.joins
            .iter()
            .all(|j| j.outcome == JoinOutcome::Complete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_tracks_failures() {
        let mut report = PopulateReport::default();
        report.push("vendor", "vendors", vec![]);
        assert!(report.is_complete());

        report.push(
            "services",
            "services",
            vec![PopulateFailure {
                collection: "services".into(),
                target: "services".into(),
                reason: "timeout".into(),
            }],
        );
        assert!(!report.is_complete());
        assert_eq!(report.failures().len(), 1);
    }

    #[test]
    fn test_nested_targets_are_qualified() {
        let mut nested = PopulateReport::default();
        nested.skip("owner", "users", "no field".into());

        let mut report = PopulateReport::default();
        report.extend_nested("vendor", nested);
        assert_eq!(report.joins[0].target, "vendor.owner");
        assert!(!report.is_complete());
    }
}
