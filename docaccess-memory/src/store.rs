//! In-memory storage implementation for the access layer.
//!
//! Documents live in ordered vectors per `(database, table)` behind an async-aware
//! read-write lock. Tables are created on first insert.

use std::{collections::HashMap, sync::Arc};
use async_trait::async_trait;
use mea::rwlock::RwLock;
use bson::{Bson, Document};

use docaccess_core::{
    backend::{Connector, PRIMARY_KEY, StoreBackend, WriteResult},
    config::ConnectOpts,
    cursor::Cursor,
    error::{StorageError, StorageResult},
};

use crate::matcher::{field_matches, merge};

type TableRows = Vec<Document>;
type DatabaseMap = HashMap<String, TableRows>;
type StoreMap = HashMap<String, DatabaseMap>;


/// Thread-safe in-memory document store.
///
/// `InMemoryStore` is cloneable and keeps its state behind an `Arc`, so clones share the
/// same documents. Rows keep insertion order, which is the order scans return them in.
///
/// # Performance
///
/// Every lookup scans the table; there are no indexes. Intended for development and
/// tests.
///
/// # Example
///
/// ```ignore
/// use docaccess_memory::InMemoryStore;
/// use docaccess::backend::StoreBackend;
/// use bson::doc;
///
/// let store = InMemoryStore::new();
///
/// let result = store.insert("app", "widgets", doc! { "name": "foo" }).await?;
/// let cursor = store.get("app", "widgets", &result.generated_keys[0]).await?;
/// assert_eq!(cursor.len(), 1);
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    /// database -> table -> rows
    store: Arc<RwLock<StoreMap>>,
}

impl InMemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(StoreMap::new())),
        }
    }

    /// Reads from a table, yielding an empty cursor when it does not exist.
    async fn read_table<F>(&self, db: &str, table: &str, select: F) -> Cursor
    where
        F: Fn(&Document) -> bool,
    {
        self.store
            .read()
            .await
            .get(db)
            .and_then(|tables| tables.get(table))
            .map(|rows| {
                rows.iter()
                    .filter(|row| select(row))
                    .cloned()
                    .map(Bson::Document)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Removes matching rows, returning how many were removed.
    async fn remove_rows<F>(&self, db: &str, table: &str, select: F) -> u64
    where
        F: Fn(&Document) -> bool,
    {
        let mut store = self.store.write().await;

        let Some(rows) = store.get_mut(db).and_then(|tables| tables.get_mut(table)) else {
            return 0;
        };

        let before = rows.len();
        rows.retain(|row| !select(row));

        (before - rows.len()) as u64
    }
}


#[async_trait]
impl StoreBackend for InMemoryStore {
    async fn insert(&self, db: &str, table: &str, mut document: Document) -> StorageResult<WriteResult> {
        let mut result = WriteResult { inserted: 1, ..WriteResult::default() };

        let key = match document.get(PRIMARY_KEY) {
            Some(Bson::String(key)) => key.clone(),
            Some(other) => {
                return Err(StorageError::InvalidDocument(format!(
                    "primary key `{PRIMARY_KEY}` must be a string, got {:?}",
                    other.element_type()
                )));
            }
            None => {
                let key = uuid::Uuid::new_v4().to_string();
                document.insert(PRIMARY_KEY, key.clone());
                result.generated_keys.push(key.clone());
                key
            }
        };

        let mut store = self.store.write().await;
        let rows = store
            .entry(db.to_string())
            .or_default()
            .entry(table.to_string())
            .or_default();

        let id = Bson::String(key.clone());
        if rows.iter().any(|row| field_matches(row, PRIMARY_KEY, &id)) {
            return Err(StorageError::Backend(format!(
                "duplicate primary key `{key}` in table {table}"
            )));
        }

        rows.push(document);

        Ok(result)
    }

    async fn scan(&self, db: &str, table: &str) -> StorageResult<Cursor> {
        Ok(self.read_table(db, table, |_| true).await)
    }

    async fn get(&self, db: &str, table: &str, id: &str) -> StorageResult<Cursor> {
        let id = Bson::String(id.to_string());

        Ok(
            self.read_table(db, table, |row| field_matches(row, PRIMARY_KEY, &id))
                .await
        )
    }

    async fn get_all_by_index(&self, db: &str, table: &str, index: &str, value: Bson) -> StorageResult<Cursor> {
        Ok(
            self.read_table(db, table, |row| field_matches(row, index, &value))
                .await
        )
    }

    async fn update_by_index(
        &self,
        db: &str,
        table: &str,
        index: &str,
        value: Bson,
        mut patch: Document,
    ) -> StorageResult<WriteResult> {
        patch.remove(PRIMARY_KEY);

        let mut result = WriteResult::default();
        let mut store = self.store.write().await;

        let Some(rows) = store.get_mut(db).and_then(|tables| tables.get_mut(table)) else {
            return Ok(result);
        };

        for row in rows.iter_mut().filter(|row| field_matches(row, index, &value)) {
            if merge(row, patch.clone()) {
                result.updated += 1;
            } else {
                result.unchanged += 1;
            }
        }

        Ok(result)
    }

    async fn delete(&self, db: &str, table: &str, id: &str) -> StorageResult<WriteResult> {
        let id = Bson::String(id.to_string());

        Ok(WriteResult {
            deleted: self
                .remove_rows(db, table, |row| field_matches(row, PRIMARY_KEY, &id))
                .await,
            ..WriteResult::default()
        })
    }

    async fn delete_by_index(&self, db: &str, table: &str, index: &str, value: Bson) -> StorageResult<WriteResult> {
        Ok(WriteResult {
            deleted: self
                .remove_rows(db, table, |row| field_matches(row, index, &value))
                .await,
            ..WriteResult::default()
        })
    }

    async fn contains(&self, db: &str, table: &str, field: &str, value: Bson) -> StorageResult<Cursor> {
        let found = !self
            .read_table(db, table, |row| field_matches(row, field, &value))
            .await
            .is_empty();

        Ok(Cursor::new([Bson::Boolean(found)]))
    }
}


/// Connector for [`InMemoryStore`].
///
/// Connection options are accepted for parity with networked stores but only logged.
/// A connector built with [`InMemoryConnector::with_store`] hands out that store, which
/// lets tests keep a handle on the data behind a session.
#[derive(Default, Debug)]
pub struct InMemoryConnector {
    store: Option<InMemoryStore>,
}

impl InMemoryConnector {
    pub fn with_store(store: InMemoryStore) -> Self {
        Self { store: Some(store) }
    }
}

#[async_trait]
impl Connector for InMemoryConnector {
    type Backend = InMemoryStore;

    async fn connect(self, opts: &ConnectOpts) -> StorageResult<Self::Backend> {
        tracing::debug!(
            address = %opts.address,
            database = %opts.database,
            "using in-memory document store"
        );

        Ok(self.store.unwrap_or_default())
    }
}
