//! # Search
//!
//! Full-text relevance over document fields.
//!
//! The query is tokenized, the searchable field set is either supplied or
//! discovered, and each document gets a weighted score from exact, prefix,
//! substring and whole-word token matches. Earlier tokens weigh more.

mod fields;
mod scorer;
mod shortcut;
mod tokenize;

pub use fields::{discover, explicit, FieldOptions, RelationField, BASE_WEIGHT, INTERNAL_PREFIX};
pub use scorer::{SearchScorer, SCORE_FIELD};
pub use shortcut::fields_to_filter;
pub use tokenize::{is_match_all, tokenize, MATCH_ALL};
