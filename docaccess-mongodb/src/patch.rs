//! Document shaping between the access layer's conventions and MongoDB's.
//!
//! The access layer keys documents by `id`; MongoDB keys them by `_id`. Updates merge
//! nested documents, which MongoDB's `$set` only does for dotted paths, so update
//! payloads are flattened before they are sent.

use bson::{Bson, Document};

use docaccess_core::{
    backend::PRIMARY_KEY,
    error::{StorageError, StorageResult},
};

pub(crate) const MONGO_KEY: &str = "_id";

/// Renames the access-layer primary key to MongoDB's `_id`.
pub(crate) fn to_stored(mut document: Document) -> Document {
    if let Some(id) = document.remove(PRIMARY_KEY) {
        document.insert(MONGO_KEY, id);
    }
    document
}

/// Renames MongoDB's `_id` back to the access-layer primary key.
pub(crate) fn from_stored(mut document: Document) -> Bson {
    if let Some(id) = document.remove(MONGO_KEY) {
        document.insert(PRIMARY_KEY, id);
    }
    Bson::Document(document)
}

/// Flattens nested documents into dotted `$set` paths so nested fields merge instead
/// of replacing the whole sub-document. The primary key is dropped.
///
/// Empty sub-documents produce no path, so they leave the stored field untouched. Arrays
/// are never descended into.
///
/// # Errors
///
/// Keys that contain `.` or start with `$` cannot be expressed as `$set` paths and are
/// rejected as [`StorageError::InvalidDocument`].
pub(crate) fn flatten_update(patch: Document) -> StorageResult<Document> {
    let mut flat = Document::new();

    for (key, value) in patch {
        if key == PRIMARY_KEY || key == MONGO_KEY {
            continue;
        }
        check_key(&key)?;
        flatten_into(&mut flat, key, value)?;
    }

    Ok(flat)
}

fn flatten_into(flat: &mut Document, path: String, value: Bson) -> StorageResult<()> {
    match value {
        Bson::Document(nested) => {
            for (key, value) in nested {
                check_key(&key)?;
                flatten_into(flat, format!("{path}.{key}"), value)?;
            }
        }
        value => {
            flat.insert(path, value);
        }
    }

    Ok(())
}

fn check_key(key: &str) -> StorageResult<()> {
    if key.is_empty() || key.contains('.') || key.starts_with('$') {
        return Err(StorageError::InvalidDocument(format!("field name `{key}` cannot be updated")));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_primary_key_is_renamed_both_ways() {
        let stored = to_stored(doc! { "id": "abc", "name": "foo" });
        assert_eq!(stored, doc! { "name": "foo", "_id": "abc" });

        let restored = from_stored(stored);
        assert_eq!(restored, Bson::Document(doc! { "name": "foo", "id": "abc" }));
    }

    #[test]
    fn test_flatten_nested_documents() {
        let flat = flatten_update(doc! {
            "id": "abc",
            "name": "foo",
            "info": { "updated": 5_i64, "meta": { "by": "ops" } },
            "tags": ["a", { "b": 1 }],
            "empty": {},
        })
        .unwrap();

        assert_eq!(flat, doc! {
            "name": "foo",
            "info.updated": 5_i64,
            "info.meta.by": "ops",
            "tags": ["a", { "b": 1 }],
        });
    }

    #[test]
    fn test_flatten_rejects_unaddressable_keys() {
        let operator = flatten_update(doc! { "info": { "$inc": 1 } });
        let dotted = flatten_update(doc! { "a.b": 1 });

        assert!(matches!(operator, Err(StorageError::InvalidDocument(_))));
        assert!(matches!(dotted, Err(StorageError::InvalidDocument(_))));
    }

    #[test]
    fn test_unset_storable_info_sends_nothing() {
        let info = bson::ser::serialize_to_bson(&docaccess_core::storable::StorableInfo::default()).unwrap();

        let flat = flatten_update(doc! { "name": "acme", "info": info }).unwrap();

        assert_eq!(flat, doc! { "name": "acme" });
        assert!(flatten_update(doc! { "info": {} }).unwrap().is_empty());
    }
}
