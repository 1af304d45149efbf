//! Result cursors returned by backend read operations.

use bson::{Bson, de::deserialize_from_bson};
use serde::de::DeserializeOwned;
use std::collections::VecDeque;

use crate::error::{StorageError, StorageResult};

/// A buffered sequence of documents produced by a single store request.
///
/// Values are kept in the order the store yielded them. Decoding consumes the cursor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cursor {
    values: VecDeque<Bson>,
}

impl Cursor {
    pub fn new(values: impl IntoIterator<Item = Bson>) -> Self {
        Self { values: values.into_iter().collect() }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Decodes every remaining value, preserving order.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Decode`] on the first value that does not fit `T`.
    pub fn all<T: DeserializeOwned>(self) -> StorageResult<Vec<T>> {
        self.values
            .into_iter()
            .map(decode)
            .collect()
    }

    /// Decodes the first value and discards the rest.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Decode`] if the cursor is empty or the value does not fit `T`.
    /// An empty cursor is reported the same way as a malformed value.
    pub fn one<T: DeserializeOwned>(mut self) -> StorageResult<T> {
        match self.values.pop_front() {
            Some(value) => decode(value),
            None => Err(StorageError::Decode("no more rows in the cursor".to_string())),
        }
    }
}

impl FromIterator<Bson> for Cursor {
    fn from_iter<I: IntoIterator<Item = Bson>>(iter: I) -> Self {
        Cursor::new(iter)
    }
}

fn decode<T: DeserializeOwned>(value: Bson) -> StorageResult<T> {
    deserialize_from_bson(value).map_err(|e| StorageError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Widget {
        name: String,
    }

    #[test]
    fn test_all_preserves_order() {
        let cursor = Cursor::new(vec![
            Bson::Document(doc! { "name": "b" }),
            Bson::Document(doc! { "name": "a" }),
        ]);

        let widgets: Vec<Widget> = cursor.all().unwrap();
        assert_eq!(widgets, vec![
            Widget { name: "b".into() },
            Widget { name: "a".into() },
        ]);
    }

    #[test]
    fn test_one_on_empty_cursor_is_decode_error() {
        let result = Cursor::empty().one::<Widget>();
        assert!(matches!(result, Err(StorageError::Decode(_))));
    }

    #[test]
    fn test_one_takes_first_value() {
        let cursor = Cursor::new(vec![
            Bson::Document(doc! { "name": "first" }),
            Bson::Document(doc! { "name": "second" }),
        ]);

        assert_eq!(cursor.one::<Widget>().unwrap().name, "first");
    }

    #[test]
    fn test_shape_mismatch_is_decode_error() {
        let cursor = Cursor::new(vec![Bson::Document(doc! { "label": 3 })]);
        assert!(matches!(cursor.all::<Widget>(), Err(StorageError::Decode(_))));
    }

    #[test]
    fn test_scalar_values_decode() {
        let cursor: Cursor = std::iter::once(Bson::Boolean(true)).collect();
        assert!(cursor.one::<bool>().unwrap());
    }
}
