//! Path-based reads and writes on documents.

use crate::value::{Document, Value};

use super::{FieldPath, Segment};

/// Resolve `path` inside `doc`.
///
/// When a non-terminal segment lands on a list, the rest of the path is
/// resolved against every element and the results that exist are collected
/// into a new list. A fan-out that finds nothing is absent.
pub fn get(doc: &Document, path: &FieldPath) -> Option<Value> {
    resolve_in_map(doc, path.segments())
}

/// Parse `path` and resolve it.
pub fn get_path(doc: &Document, path: &str) -> Option<Value> {
    get(doc, &FieldPath::parse(path))
}

fn resolve_in_map(map: &Document, segments: &[Segment]) -> Option<Value> {
    let (first, rest) = segments.split_first()?;
    let mut current = map.get(&first.name)?;
    if let Some(index) = first.index {
        current = current.as_list()?.get(index)?;
    }
    resolve_value(current, rest)
}

fn resolve_value(current: &Value, rest: &[Segment]) -> Option<Value> {
    if rest.is_empty() {
        return Some(current.clone());
    }
    match current {
        Value::Map(map) => resolve_in_map(map, rest),
        Value::List(items) => {
            let collected: Vec<Value> = items
                .iter()
                .filter_map(|item| resolve_value(item, rest))
                .collect();
            if collected.is_empty() {
                None
            } else {
                Some(Value::List(collected))
            }
        }
        _ => None,
    }
}

/// Write `value` at `path`, creating empty maps for missing or null
/// intermediate segments. Returns false when an intermediate segment holds a
/// non-map value or an index is out of range; the document is then left as
/// it was.
pub fn set(doc: &mut Document, path: &FieldPath, value: Value) -> bool {
    let Some((last, parents)) = path.segments().split_last() else {
        return false;
    };
    if !writable(doc, path.segments()) {
        return false;
    }

    let mut current = doc;
    for segment in parents {
        let entry = current
            .entry(segment.name.clone())
            .or_insert(Value::Null);
        let target = match segment.index {
            Some(index) => match entry {
                Value::List(items) => match items.get_mut(index) {
                    Some(item) => item,
                    None => return false,
                },
                _ => return false,
            },
            None => entry,
        };
        if target.is_null() {
            *target = Value::Map(Document::new());
        }
        match target {
            Value::Map(next) => current = next,
            _ => return false,
        }
    }

    match last.index {
        Some(index) => match current.get_mut(&last.name) {
            Some(Value::List(items)) => match items.get_mut(index) {
                Some(slot) => {
                    *slot = value;
                    true
                }
                None => false,
            },
            _ => false,
        },
        None => {
            current.insert(last.name.clone(), value);
            true
        }
    }
}

/// Dry run of `set`: walks the existing structure without touching it.
fn writable(map: &Document, segments: &[Segment]) -> bool {
    let Some((first, rest)) = segments.split_first() else {
        return true;
    };
    let slot = match (map.get(&first.name), first.index) {
        // Fresh maps get created from here on, so no list can be indexed.
        (None, None) | (Some(Value::Null), None) => {
            return rest.iter().all(|s| s.index.is_none());
        }
        (None, Some(_)) => return false,
        (Some(value), None) => value,
        (Some(value), Some(index)) => match value.as_list().and_then(|l| l.get(index)) {
            Some(item) => item,
            None => return false,
        },
    };
    if rest.is_empty() {
        return true;
    }
    match slot {
        Value::Map(next) => writable(next, rest),
        Value::Null => rest.iter().all(|s| s.index.is_none()),
        _ => false,
    }
}

/// Parse `path` and write to it.
pub fn set_path(doc: &mut Document, path: &str, value: Value) -> bool {
    set(doc, &FieldPath::parse(path), value)
}
