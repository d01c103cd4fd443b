//! Weighted relevance scoring.

use regex::Regex;

use crate::path::{self, FieldPath};
use crate::value::{Document, Value};

use super::fields::RelationField;
use super::tokenize::tokenize;

/// Field the relevance score is written to
pub const SCORE_FIELD: &str = "_score";

const EXACT: f64 = 100.0;
const PREFIX: f64 = 50.0;
const SUBSTRING: f64 = 25.0;
const WHOLE_WORD: f64 = 15.0;
const POSITION: f64 = 10.0;

struct Token {
    text: String,
    word: Option<Regex>,
    position_bonus: f64,
}

/// Scores documents against one query over a fixed field set
pub struct SearchScorer {
    tokens: Vec<Token>,
    fields: Vec<(FieldPath, f64)>,
}

impl SearchScorer {
    pub fn new(query: &str, fields: &[RelationField]) -> Self {
        let tokens = tokenize(query)
            .into_iter()
            .enumerate()
            .map(|(i, text)| Token {
                word: Regex::new(&format!(r"\b{}\b", regex::escape(&text))).ok(),
                position_bonus: POSITION / (i as f64 + 1.0),
                text,
            })
            .collect();
        let fields = fields
            .iter()
            .map(|f| (FieldPath::parse(&f.path), f.weight))
            .collect();
        Self { tokens, fields }
    }

    pub fn terms(&self) -> Vec<&str> {
        self.tokens.iter().map(|t| t.text.as_str()).collect()
    }

    /// Sum of all token contributions across all fields.
    pub fn score(&self, doc: &Document) -> f64 {
        let mut total = 0.0;
        for (field, weight) in &self.fields {
            let Some(value) = path::get(doc, field) else {
                continue;
            };
            for leaf in value.flatten() {
                if !leaf.is_primitive() {
                    continue;
                }
                let text = leaf.to_text().to_lowercase();
                total += self
                    .tokens
                    .iter()
                    .map(|token| token_score(&text, token) * weight)
                    .sum::<f64>();
            }
        }
        total
    }

    /// Score every document, write `_score`, and keep those scoring above
    /// `min_score`.
    pub fn score_all(&self, docs: Vec<Document>, min_score: f64) -> Vec<Document> {
        docs.into_iter()
            .filter_map(|mut doc| {
                let score = self.score(&doc);
                if score <= min_score {
                    return None;
                }
                doc.insert(SCORE_FIELD.to_string(), Value::Number(score));
                Some(doc)
            })
            .collect()
    }
}

fn token_score(text: &str, token: &Token) -> f64 {
    if !text.contains(token.text.as_str()) {
        return 0.0;
    }
    let mut score = if text == token.text {
        EXACT
    } else if text.starts_with(token.text.as_str()) {
        PREFIX
    } else {
        SUBSTRING
    };
    if token.word.as_ref().is_some_and(|re| re.is_match(text)) {
        score += WHOLE_WORD;
    }
    score + token.position_bonus
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::to_document;
    use serde_json::json;

    fn fields(paths: &[(&str, f64)]) -> Vec<RelationField> {
        paths
            .iter()
            .map(|(p, w)| RelationField {
                path: p.to_string(),
                weight: *w,
            })
            .collect()
    }

    #[test]
    fn test_exact_beats_substring() {
        let scorer = SearchScorer::new("Plumbing", &fields(&[("name", 1.0)]));
        let exact = to_document(json!({"name": "plumbing"}));
        let partial = to_document(json!({"name": "Replumbings"}));
        assert!(scorer.score(&exact) > scorer.score(&partial));
        assert!(scorer.score(&partial) > 0.0);
    }

    #[test]
    fn test_score_components() {
        let scorer = SearchScorer::new("hair", &fields(&[("name", 1.0)]));
        // exact + word + position
        assert_eq!(scorer.score(&to_document(json!({"name": "Hair"}))), 125.0);
        // prefix + word + position
        assert_eq!(scorer.score(&to_document(json!({"name": "hair salon"}))), 75.0);
        // substring only + position
        assert_eq!(scorer.score(&to_document(json!({"name": "chairs"}))), 35.0);
    }

    #[test]
    fn test_weights_and_later_tokens() {
        let scorer = SearchScorer::new("cut dye", &fields(&[("services.name", 0.8)]));
        let doc = to_document(json!({"services": [{"name": "cut"}, {"name": "dye"}]}));
        // cut: (100 + 15 + 10) * 0.8, dye: (100 + 15 + 5) * 0.8
        assert!((scorer.score(&doc) - 196.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_all_filters_by_min_score() {
        let scorer = SearchScorer::new("quito", &fields(&[("city", 1.0)]));
        let docs = vec![
            to_document(json!({"id": "a", "city": "Quito"})),
            to_document(json!({"id": "b", "city": "Cuenca"})),
        ];
        let kept = scorer.score_all(docs, 0.0);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0][SCORE_FIELD], Value::Number(125.0));
    }
}
