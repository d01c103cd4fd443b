//! Property tests for path access, filtering and sorting.

use proptest::prelude::*;

use docquery::filter::{matches_group, FilterGroup, Logic};
use docquery::path::{get_path, set_path};
use docquery::sort::{sort_by_criteria, SortCriteria, SortOrder};
use docquery::value::{Document, Value};

fn field_path() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z][a-zA-Z0-9]{0,6}", 1..4).prop_map(|parts| parts.join("."))
}

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        (-1.0e6f64..1.0e6).prop_map(Value::Number),
        "[a-z ]{0,12}".prop_map(Value::String),
    ]
}

fn document() -> impl Strategy<Value = Document> {
    prop::collection::btree_map("[a-z]{1,6}", scalar(), 0..6)
}

proptest! {
    #[test]
    fn prop_set_then_get_round_trips(path in field_path(), value in scalar()) {
        let mut doc = Document::new();
        prop_assert!(set_path(&mut doc, &path, value.clone()));
        let read = get_path(&doc, &path);
        prop_assert_eq!(read.clone(), Some(value));

        let mut copy = Document::new();
        prop_assert!(set_path(&mut copy, &path, read.clone().unwrap_or_default()));
        prop_assert_eq!(get_path(&copy, &path), read);
    }

    #[test]
    fn prop_empty_group_matches_everything(doc in document(), or in any::<bool>()) {
        let logic = if or { Logic::Or } else { Logic::And };
        prop_assert!(matches_group(&doc, &FilterGroup::new(logic)));
    }

    #[test]
    fn prop_sort_is_stable(keys in prop::collection::vec(0u8..4, 0..40), desc in any::<bool>()) {
        let docs: Vec<Document> = keys
            .iter()
            .enumerate()
            .map(|(i, k)| {
                let mut doc = Document::new();
                doc.insert("id".to_string(), Value::from(i as i64));
                doc.insert("k".to_string(), Value::from(*k as i64));
                doc
            })
            .collect();
        let order = if desc { SortOrder::Desc } else { SortOrder::Asc };
        let criteria = vec![SortCriteria::new("k", order)];

        let once = sort_by_criteria(docs, &criteria);
        let twice = sort_by_criteria(once.clone(), &criteria);
        prop_assert_eq!(&once, &twice);

        for pair in once.windows(2) {
            if pair[0]["k"] == pair[1]["k"] {
                prop_assert!(pair[0]["id"].as_f64() < pair[1]["id"].as_f64());
            }
        }
    }
}
