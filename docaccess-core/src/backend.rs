//! Storage backend abstraction for the access layer.
//!
//! This module defines the boundary to the underlying document store. A backend exposes
//! one async method per request kind the access layer issues; each call is a single round
//! trip to the store.
//!
//! # Traits
//!
//! - [`StoreBackend`]: The per-table request set of a document store
//! - [`Connector`]: Factory that connects to a store using [`ConnectOpts`]
//!
//! # Document conventions
//!
//! Documents are keyed by the string field [`PRIMARY_KEY`]. Backends generate a key for
//! documents inserted without one and report it in [`WriteResult::generated_keys`].
//! Index lookups match a named field by equality; an array field also matches when one
//! of its elements is equal to the value.
//!
//! # Examples
//!
//! ```ignore
//! use docaccess::backend::StoreBackend;
//! use bson::{doc, Bson};
//!
//! let backend = MyBackendImpl::new();
//!
//! let result = backend.insert("app", "widgets", doc! { "name": "foo" }).await?;
//! let id = &result.generated_keys[0];
//!
//! let widget = backend.get("app", "widgets", id).await?.one::<bson::Document>()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use async_trait::async_trait;
use bson::{Bson, Document};
use std::{fmt::Debug, sync::Arc};

use crate::{config::ConnectOpts, cursor::Cursor, error::StorageResult};

/// Field holding a document's primary identifier.
pub const PRIMARY_KEY: &str = "id";

/// Field used by name lookups, updates and deletes.
pub const NAME_INDEX: &str = "name";

/// Outcome counters of a write request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteResult {
    pub inserted: u64,
    /// Documents whose content changed.
    pub updated: u64,
    /// Documents matched by an update whose content was already equal.
    pub unchanged: u64,
    pub deleted: u64,
    /// Primary keys the store generated for inserted documents, in insertion order.
    pub generated_keys: Vec<String>,
}

/// Abstract interface for document store backends.
///
/// # Thread Safety
///
/// Implementations must be safe to share between tasks. The access layer adds no
/// locking of its own, so any coordination the store needs lives in the backend.
///
/// # Missing tables
///
/// Reads from a table that does not exist yield an empty cursor, and writes that match
/// nothing report zero counts. Whether an insert creates the table is up to the backend.
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// Inserts a single document.
    ///
    /// If the document has no [`PRIMARY_KEY`], the backend generates one and reports it
    /// in `generated_keys`. Inserting a key that already exists is an error.
    async fn insert(&self, db: &str, table: &str, document: Document) -> StorageResult<WriteResult>;

    /// Returns every document of the table, in the store's iteration order.
    async fn scan(&self, db: &str, table: &str) -> StorageResult<Cursor>;

    /// Returns the document with the given primary key, or an empty cursor.
    async fn get(&self, db: &str, table: &str, id: &str) -> StorageResult<Cursor>;

    /// Returns every document whose `index` field equals `value`.
    async fn get_all_by_index(
        &self,
        db: &str,
        table: &str,
        index: &str,
        value: Bson,
    ) -> StorageResult<Cursor>;

    /// Merges `patch` into every document whose `index` field equals `value`.
    ///
    /// Nested documents are merged recursively and an empty nested document leaves the
    /// stored field as it is. The primary key is never rewritten.
    async fn update_by_index(
        &self,
        db: &str,
        table: &str,
        index: &str,
        value: Bson,
        patch: Document,
    ) -> StorageResult<WriteResult>;

    /// Deletes the document with the given primary key, reporting zero if absent.
    async fn delete(&self, db: &str, table: &str, id: &str) -> StorageResult<WriteResult>;

    /// Deletes every document whose `index` field equals `value`.
    async fn delete_by_index(
        &self,
        db: &str,
        table: &str,
        index: &str,
        value: Bson,
    ) -> StorageResult<WriteResult>;

    /// Checks whether any document's `field` equals `value`.
    ///
    /// The answer is returned as a cursor holding a single boolean.
    async fn contains(
        &self,
        db: &str,
        table: &str,
        field: &str,
        value: Bson,
    ) -> StorageResult<Cursor>;

    /// Releases connections held by the backend.
    ///
    /// The default implementation is a no-op.
    async fn shutdown(&self) -> StorageResult<()> {
        Ok(())
    }
}

#[async_trait]
impl<B> StoreBackend for Arc<B>
where
    B: StoreBackend + ?Sized,
{
    async fn insert(&self, db: &str, table: &str, document: Document) -> StorageResult<WriteResult> {
        (**self).insert(db, table, document).await
    }

    async fn scan(&self, db: &str, table: &str) -> StorageResult<Cursor> {
        (**self).scan(db, table).await
    }

    async fn get(&self, db: &str, table: &str, id: &str) -> StorageResult<Cursor> {
        (**self).get(db, table, id).await
    }

    async fn get_all_by_index(
        &self,
        db: &str,
        table: &str,
        index: &str,
        value: Bson,
    ) -> StorageResult<Cursor> {
        (**self)
            .get_all_by_index(db, table, index, value)
            .await
    }

    async fn update_by_index(
        &self,
        db: &str,
        table: &str,
        index: &str,
        value: Bson,
        patch: Document,
    ) -> StorageResult<WriteResult> {
        (**self)
            .update_by_index(db, table, index, value, patch)
            .await
    }

    async fn delete(&self, db: &str, table: &str, id: &str) -> StorageResult<WriteResult> {
        (**self).delete(db, table, id).await
    }

    async fn delete_by_index(
        &self,
        db: &str,
        table: &str,
        index: &str,
        value: Bson,
    ) -> StorageResult<WriteResult> {
        (**self)
            .delete_by_index(db, table, index, value)
            .await
    }

    async fn contains(
        &self,
        db: &str,
        table: &str,
        field: &str,
        value: Bson,
    ) -> StorageResult<Cursor> {
        (**self)
            .contains(db, table, field, value)
            .await
    }

    async fn shutdown(&self) -> StorageResult<()> {
        (**self).shutdown().await
    }
}

/// Factory trait that connects to a store.
///
/// The access layer builds the final [`ConnectOpts`] and hands it to the connector;
/// backends map the fields they understand onto their own client options.
#[async_trait]
pub trait Connector: Send {
    type Backend: StoreBackend + 'static;

    async fn connect(self, opts: &ConnectOpts) -> StorageResult<Self::Backend>;
}
