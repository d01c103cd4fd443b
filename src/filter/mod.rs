//! # Filtering
//!
//! Predicate trees over documents:
//! - `FilterOperator`: closed operator set
//! - `compare`: typed comparison (date, number, text)
//! - `FilterCriteria` / `FilterGroup`: recursive AND/OR trees
//! - `matches_single` / `matches_group`: evaluation with existential list semantics
//! - `SpecialFilter`: named predicates such as `workingDayOpen`

mod compare;
mod criteria;
mod errors;
mod eval;
mod operator;
mod special;

pub use compare::compare;
pub use criteria::{FilterCriteria, FilterGroup, FilterNode, Logic};
pub use errors::FilterParseError;
pub use eval::{apply_filters, matches_group, matches_single};
pub use operator::FilterOperator;
pub use special::{weekday_from_name, SpecialFilter};
