//! The storage handle and its CRUD operations.
//!
//! A [`Storage`] wraps one connected backend and exposes the access layer's operations as
//! methods. Every method addresses one `(database, table)` pair and issues exactly one
//! request per table it touches.
//!
//! # Error normalization
//!
//! - `insert`, `update` and `unique_field` log the store failure and return
//!   [`StorageError::Database`].
//! - `delete` and `delete_by_name` pass store failures through and report
//!   [`StorageError::EntityNotFound`] when nothing was deleted.
//! - `get_all`, `get_one` and `get_by_name` pass store and decode failures through.
//!
//! # Example
//!
//! ```ignore
//! use docaccess::{prelude::*, memory::InMemoryConnector};
//!
//! let storage = Storage::open(InMemoryConnector::default(), &[&config::database("app")]).await?;
//!
//! let id = storage.insert("app", "widgets", &Widget { name: "foo".into() }).await?;
//! let widget: Widget = storage.get_one("app", "widgets", &id).await?;
//! ```

use bson::{Bson, Document, ser::serialize_to_bson};
use serde::{Serialize, de::DeserializeOwned};
use std::{fmt::Display, sync::Arc};

use crate::{
    backend::{Connector, NAME_INDEX, PRIMARY_KEY, StoreBackend, WriteResult},
    config::{ConnectOpts, StorageConfig},
    error::{StorageError, StorageResult},
    object::StorageObject,
    table::{Table, TypedTable},
};

/// A shared handle to a connected document store.
///
/// Cloning is cheap; clones share the same backend connection.
#[derive(Debug, Clone)]
pub struct Storage {
    backend: Arc<dyn StoreBackend>,
    opts: ConnectOpts,
}

impl Storage {
    /// Wraps an already connected backend.
    pub fn new(backend: impl StoreBackend + 'static) -> Self {
        Self::with_opts(backend, ConnectOpts::default())
    }

    pub fn with_opts(backend: impl StoreBackend + 'static, opts: ConnectOpts) -> Self {
        Self { backend: Arc::new(backend), opts }
    }

    /// Opens a connection.
    ///
    /// Starts from [`ConnectOpts::default`], applies `settings` in order and connects.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Initialization`] if the store cannot be reached.
    pub async fn open<C: Connector>(
        connector: C,
        settings: &[&dyn StorageConfig],
    ) -> StorageResult<Self> {
        let opts = ConnectOpts::default().apply(settings);

        tracing::debug!(
            address = %opts.address,
            database = %opts.database,
            max_idle = opts.max_idle,
            max_open = opts.max_open,
            timeout = ?opts.timeout,
            "connecting to document store"
        );

        let backend = connector
            .connect(&opts)
            .await
            .map_err(|e| match e {
                StorageError::Initialization(_) => e,
                other => StorageError::Initialization(other.to_string()),
            })?;

        tracing::info!(address = %opts.address, "document store session opened");

        Ok(Self::with_opts(backend, opts))
    }

    /// The configuration the session was opened with.
    pub fn connect_opts(&self) -> &ConnectOpts {
        &self.opts
    }

    pub fn backend(&self) -> &dyn StoreBackend {
        self.backend.as_ref()
    }

    /// Returns a handle bound to one table.
    pub fn table<'a>(&'a self, db: &str, table: &str) -> Table<'a> {
        Table::new(self, db.to_string(), table.to_string())
    }

    /// Returns a typed handle bound to one table.
    pub fn typed_table<'a, O: StorageObject>(&'a self, db: &str, table: &str) -> TypedTable<'a, O> {
        TypedTable::new(self.table(db, table))
    }

    /// Inserts a single document and returns its identifier.
    ///
    /// The identifier is the first key generated by the store, or the payload's own
    /// `id` when it carried one.
    ///
    /// # Errors
    ///
    /// [`StorageError::Serialization`] or [`StorageError::InvalidDocument`] if the payload
    /// is not a document, [`StorageError::Database`] if the store rejects the write.
    pub async fn insert<T>(&self, db: &str, table: &str, data: &T) -> StorageResult<String>
    where
        T: Serialize + ?Sized,
    {
        let document = to_document(data)?;
        let supplied = match document.get(PRIMARY_KEY) {
            Some(Bson::String(id)) => Some(id.clone()),
            _ => None,
        };

        let result = self
            .backend
            .insert(db, table, document)
            .await
            .map_err(|e| database_error("insert", db, table, e))?;

        result
            .generated_keys
            .into_iter()
            .next()
            .or(supplied)
            .ok_or_else(|| database_error("insert", db, table, "store returned no key"))
    }

    /// Reads every document of the table, in store iteration order.
    pub async fn get_all<T>(&self, db: &str, table: &str) -> StorageResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        self.backend
            .scan(db, table)
            .await?
            .all()
    }

    /// Reads the document with the given identifier.
    ///
    /// A missing document surfaces as [`StorageError::Decode`].
    pub async fn get_one<T>(&self, db: &str, table: &str, id: &str) -> StorageResult<T>
    where
        T: DeserializeOwned,
    {
        self.backend
            .get(db, table, id)
            .await?
            .one()
    }

    /// Reads the document whose `name` equals `name`.
    ///
    /// When several documents share the name, the first one is returned. A missing
    /// document surfaces as [`StorageError::Decode`].
    pub async fn get_by_name<T>(&self, db: &str, table: &str, name: &str) -> StorageResult<T>
    where
        T: DeserializeOwned,
    {
        self.backend
            .get_all_by_index(db, table, NAME_INDEX, name.into())
            .await?
            .one()
    }

    /// Merges `data` into every document whose `name` equals `name`.
    ///
    /// A result that did not update exactly one document is logged as a warning but is
    /// not an error.
    pub async fn update<T>(&self, db: &str, table: &str, name: &str, data: &T) -> StorageResult<()>
    where
        T: Serialize + ?Sized,
    {
        let patch = to_document(data)?;

        let result = self
            .backend
            .update_by_index(db, table, NAME_INDEX, name.into(), patch.clone())
            .await
            .map_err(|e| database_error("update", db, table, e))?;

        if result.updated != 1 {
            warn_update_result(db, table, name, &patch, &result);
        }

        Ok(())
    }

    /// Deletes the document with the given identifier.
    ///
    /// # Errors
    ///
    /// [`StorageError::EntityNotFound`] if no document was deleted. Store failures are
    /// returned unchanged.
    pub async fn delete(&self, db: &str, table: &str, id: &str) -> StorageResult<()> {
        let result = self.backend.delete(db, table, id).await?;

        ensure_deleted(&result)
    }

    /// Deletes every document whose `name` equals `name`.
    ///
    /// # Errors
    ///
    /// Same as [`Storage::delete`].
    pub async fn delete_by_name(&self, db: &str, table: &str, name: &str) -> StorageResult<()> {
        let result = self
            .backend
            .delete_by_index(db, table, NAME_INDEX, name.into())
            .await?;

        ensure_deleted(&result)
    }

    /// Returns whether `value` is absent from every listed `(table, field)` location.
    ///
    /// Locations are checked in iteration order and the scan stops at the first table
    /// that already holds the value. The offending table is not reported.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let free = storage
    ///     .unique_field("acme", [("organizations", "name"), ("users", "name")], "app")
    ///     .await?;
    /// ```
    ///
    /// # Errors
    ///
    /// Any failed check aborts the scan with [`StorageError::Database`].
    pub async fn unique_field<I, K, V>(
        &self,
        value: impl Into<Bson>,
        lookups: I,
        db: &str,
    ) -> StorageResult<bool>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let value = value.into();

        for (table, field) in lookups {
            let (table, field) = (table.as_ref(), field.as_ref());

            let exists = self
                .backend
                .contains(db, table, field, value.clone())
                .await
                .and_then(|cursor| cursor.one::<bool>())
                .map_err(|e| database_error("unique_field", db, table, e))?;

            if exists {
                tracing::debug!(db, table, field, value = %value, "value already taken");
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Releases the backend's connections.
    pub async fn shutdown(self) -> StorageResult<()> {
        self.backend.shutdown().await
    }
}

fn to_document<T: Serialize + ?Sized>(data: &T) -> StorageResult<Document> {
    match serialize_to_bson(data)? {
        Bson::Document(document) => Ok(document),
        other => Err(StorageError::InvalidDocument(format!(
            "expected a document, got {:?}",
            other.element_type()
        ))),
    }
}

fn database_error(op: &'static str, db: &str, table: &str, cause: impl Display) -> StorageError {
    tracing::error!(op, db, table, error = %cause, "document store request failed");
    StorageError::Database
}

fn warn_update_result(db: &str, table: &str, name: &str, patch: &Document, result: &WriteResult) {
    tracing::warn!(
        db,
        table,
        name,
        updated = result.updated,
        unchanged = result.unchanged,
        data = %patch,
        response = ?result,
        "unexpected update result"
    );
}

fn ensure_deleted(result: &WriteResult) -> StorageResult<()> {
    if result.deleted == 0 {
        return Err(StorageError::EntityNotFound);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::Cursor;
    use async_trait::async_trait;
    use bson::doc;

    /// A backend whose every request fails.
    #[derive(Debug)]
    struct Unreachable;

    #[async_trait]
    impl StoreBackend for Unreachable {
        async fn insert(&self, _: &str, _: &str, _: Document) -> StorageResult<WriteResult> {
            Err(StorageError::Backend("connection refused".into()))
        }

        async fn scan(&self, _: &str, _: &str) -> StorageResult<Cursor> {
            Err(StorageError::Backend("connection refused".into()))
        }

        async fn get(&self, _: &str, _: &str, _: &str) -> StorageResult<Cursor> {
            Err(StorageError::Backend("connection refused".into()))
        }

        async fn get_all_by_index(&self, _: &str, _: &str, _: &str, _: Bson) -> StorageResult<Cursor> {
            Err(StorageError::Backend("connection refused".into()))
        }

        async fn update_by_index(
            &self,
            _: &str,
            _: &str,
            _: &str,
            _: Bson,
            _: Document,
        ) -> StorageResult<WriteResult> {
            Err(StorageError::Backend("connection refused".into()))
        }

        async fn delete(&self, _: &str, _: &str, _: &str) -> StorageResult<WriteResult> {
            Err(StorageError::Backend("connection refused".into()))
        }

        async fn delete_by_index(&self, _: &str, _: &str, _: &str, _: Bson) -> StorageResult<WriteResult> {
            Err(StorageError::Backend("connection refused".into()))
        }

        async fn contains(&self, _: &str, _: &str, _: &str, _: Bson) -> StorageResult<Cursor> {
            Err(StorageError::Backend("connection refused".into()))
        }
    }

    struct FailingConnector;

    #[async_trait]
    impl Connector for FailingConnector {
        type Backend = Unreachable;

        async fn connect(self, opts: &ConnectOpts) -> StorageResult<Unreachable> {
            Err(StorageError::Backend(format!("no route to {}", opts.address)))
        }
    }

    #[tokio::test]
    async fn test_writes_are_normalized() {
        let storage = Storage::new(Unreachable);

        assert_eq!(
            storage.insert("app", "widgets", &doc! { "name": "foo" }).await,
            Err(StorageError::Database)
        );
        assert_eq!(
            storage.update("app", "widgets", "foo", &doc! { "size": 1 }).await,
            Err(StorageError::Database)
        );
        assert_eq!(
            storage.unique_field("foo", [("widgets", "name")], "app").await,
            Err(StorageError::Database)
        );
    }

    #[tokio::test]
    async fn test_reads_and_deletes_pass_failures_through() {
        let storage = Storage::new(Unreachable);
        let refused = StorageError::Backend("connection refused".into());

        assert_eq!(storage.get_all::<Document>("app", "widgets").await, Err(refused.clone()));
        assert_eq!(storage.get_one::<Document>("app", "widgets", "abc").await, Err(refused.clone()));
        assert_eq!(storage.get_by_name::<Document>("app", "widgets", "foo").await, Err(refused.clone()));
        assert_eq!(storage.delete("app", "widgets", "abc").await, Err(refused.clone()));
        assert_eq!(storage.delete_by_name("app", "widgets", "foo").await, Err(refused));
    }

    #[tokio::test]
    async fn test_open_failure_is_initialization_error() {
        let result = Storage::open(FailingConnector, &[&crate::config::address("nowhere:1")]).await;

        assert_eq!(
            result.err(),
            Some(StorageError::Initialization("Backend error: no route to nowhere:1".into()))
        );
    }

    #[tokio::test]
    async fn test_scalar_payload_is_rejected() {
        let storage = Storage::new(Unreachable);

        assert!(matches!(
            storage.insert("app", "widgets", &42).await,
            Err(StorageError::InvalidDocument(_))
        ));
    }

    #[tokio::test]
    async fn test_unique_field_with_no_lookups_is_true() {
        let storage = Storage::new(Unreachable);
        let lookups: Vec<(String, String)> = Vec::new();

        assert_eq!(storage.unique_field("foo", lookups, "app").await, Ok(true));
    }
}
