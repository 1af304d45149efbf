//! Value matching and document merging for the in-memory store.

use bson::{Bson, Document};

/// Equality the way a document store sees it.
///
/// Integers of either width compare exactly, and compare against doubles by value, so
/// `Int32(1)`, `Int64(1)` and `Double(1.0)` are equal. Documents compare without regard
/// to key order.
pub(crate) fn values_equal(a: &Bson, b: &Bson) -> bool {
    if let (Some(x), Some(y)) = (integer(a), integer(b)) {
        return x == y;
    }

    match (a, b) {
        (Bson::Array(x), Bson::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(x, y)| values_equal(x, y))
        }
        (Bson::Document(x), Bson::Document(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .all(|(key, x)| y.get(key).is_some_and(|y| values_equal(x, y)))
        }
        _ => match (number(a), number(b)) {
            (Some(x), Some(y)) => x == y,
            _ => a == b,
        },
    }
}

fn integer(value: &Bson) -> Option<i64> {
    match value {
        Bson::Int32(v) => Some(i64::from(*v)),
        Bson::Int64(v) => Some(*v),
        _ => None,
    }
}

fn number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Double(v) => Some(*v),
        other => integer(other).map(|v| v as f64),
    }
}

/// Whether `document[field]` equals `value`, or is an array holding an element equal to
/// it. A missing field never matches.
pub(crate) fn field_matches(document: &Document, field: &str, value: &Bson) -> bool {
    document.get(field).is_some_and(|stored| match stored {
        Bson::Array(items) => {
            values_equal(stored, value) || items.iter().any(|item| values_equal(item, value))
        }
        stored => values_equal(stored, value),
    })
}

/// Merges `patch` into `target`, descending into nested documents. Empty nested documents
/// in `patch` are skipped.
///
/// Returns whether `target` changed.
pub(crate) fn merge(target: &mut Document, patch: Document) -> bool {
    let mut changed = false;

    for (key, value) in patch {
        if matches!(&value, Bson::Document(nested) if nested.is_empty()) {
            continue;
        }

        match target.get_mut(&key) {
            Some(Bson::Document(existing)) if value.as_document().is_some() => {
                if let Bson::Document(nested) = value {
                    changed |= merge(existing, nested);
                }
            }
            Some(existing) => {
                if *existing != value {
                    *existing = value;
                    changed = true;
                }
            }
            None => {
                target.insert(key, value);
                changed = true;
            }
        }
    }

    changed
}
