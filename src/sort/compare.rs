//! Scalar ordering used by every sort.

use std::cmp::Ordering;

use crate::value::{fold_text, Value};

use super::sorter::SortOrder;

/// Normalized sort key. `Missing` always sorts last.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Number(f64),
    /// Accent-folded text, then the lowercased original to order variants
    /// that fold the same
    Text(String, String),
    Missing,
}

impl SortKey {
    /// Timestamps become epoch milliseconds, strings compare accent-folded
    /// and case-insensitively, lists sort by their first non-null element
    /// and maps by their JSON text.
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => SortKey::Missing,
            Some(Value::Number(n)) => SortKey::Number(*n),
            Some(Value::Timestamp(ts)) => SortKey::Number(ts.to_millis()),
            Some(Value::String(s)) => SortKey::text(s),
            Some(Value::Bool(b)) => SortKey::text(&b.to_string()),
            Some(list @ Value::List(_)) => match list.flatten().first().copied() {
                Some(first) => SortKey::from_value(Some(first)),
                None => SortKey::Missing,
            },
            Some(other) => SortKey::text(&other.to_text()),
        }
    }

    fn text(raw: &str) -> Self {
        SortKey::Text(fold_text(raw), raw.to_lowercase())
    }
}

/// Compare two keys under `order`. Missing keys go last in both directions.
pub fn compare_keys(a: &SortKey, b: &SortKey, order: SortOrder) -> Ordering {
    let ord = match (a, b) {
        (SortKey::Missing, SortKey::Missing) => return Ordering::Equal,
        (SortKey::Missing, _) => return Ordering::Greater,
        (_, SortKey::Missing) => return Ordering::Less,
        (SortKey::Number(x), SortKey::Number(y)) => x.total_cmp(y),
        (SortKey::Text(x, x_raw), SortKey::Text(y, y_raw)) => {
            x.cmp(y).then_with(|| x_raw.cmp(y_raw))
        }
        (SortKey::Number(_), SortKey::Text(..)) => Ordering::Less,
        (SortKey::Text(..), SortKey::Number(_)) => Ordering::Greater,
    };
    match order {
        SortOrder::Asc => ord,
        SortOrder::Desc => ord.reverse(),
    }
}

/// Compare two document values under `order`.
pub fn compare_scalars(a: Option<&Value>, b: Option<&Value>, order: SortOrder) -> Ordering {
    compare_keys(&SortKey::from_value(a), &SortKey::from_value(b), order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Timestamp;

    #[test]
    fn test_null_sorts_last_both_ways() {
        let one = Value::from(1_i64);
        for order in [SortOrder::Asc, SortOrder::Desc] {
            assert_eq!(compare_scalars(None, Some(&one), order), Ordering::Greater);
            assert_eq!(compare_scalars(Some(&one), Some(&Value::Null), order), Ordering::Less);
        }
    }

    #[test]
    fn test_numbers_and_case_insensitive_text() {
        assert_eq!(
            compare_scalars(Some(&Value::from(2_i64)), Some(&Value::from(10_i64)), SortOrder::Asc),
            Ordering::Less
        );
        assert_eq!(
            compare_scalars(Some(&Value::from("apple")), Some(&Value::from("Banana")), SortOrder::Asc),
            Ordering::Less
        );
        assert_eq!(
            compare_scalars(Some(&Value::from("apple")), Some(&Value::from("Banana")), SortOrder::Desc),
            Ordering::Greater
        );
    }

    #[test]
    fn test_accented_text_sorts_by_base_letter() {
        let mut names = vec![Value::from("Zoe"), Value::from("Álvaro"), Value::from("Beto")];
        names.sort_by(|a, b| compare_scalars(Some(a), Some(b), SortOrder::Asc));
        assert_eq!(
            names,
            vec![Value::from("Álvaro"), Value::from("Beto"), Value::from("Zoe")]
        );

        // Same base letters still order deterministically
        assert_eq!(
            compare_scalars(Some(&Value::from("alvaro")), Some(&Value::from("Álvaro")), SortOrder::Asc),
            Ordering::Less
        );
    }

    #[test]
    fn test_timestamps_compare_as_instants() {
        let early = Value::Timestamp(Timestamp::new(100, 0));
        let late = Value::Timestamp(Timestamp::new(100, 5_000_000));
        assert_eq!(compare_scalars(Some(&early), Some(&late), SortOrder::Asc), Ordering::Less);
    }
}
