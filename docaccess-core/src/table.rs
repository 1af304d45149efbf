//! Table handles bound to a database and table name.
//!
//! - [`Table`] - Untyped handle forwarding to the [`Storage`] CRUD methods
//! - [`TypedTable`] - Handle for one [`StorageObject`] type that runs the entity's
//!   lifecycle hooks around each write
//!
//! # Example
//!
//! ```ignore
//! let users = storage.typed_table::<User>("app", "users");
//!
//! let mut user = User::new("alice");
//! let id = users.create(&mut user).await?;
//! assert_eq!(user.id(), Some(id.as_str()));
//! ```

use bson::Bson;
use serde::{Serialize, de::DeserializeOwned};
use std::marker::PhantomData;

use crate::{
    error::{StorageError, StorageResult},
    object::StorageObject,
    storable::now,
    storage::Storage,
};

/// An untyped table handle.
#[derive(Debug, Clone)]
pub struct Table<'a> {
    storage: &'a Storage,
    db: String,
    name: String,
}

impl<'a> Table<'a> {
    pub(crate) fn new(storage: &'a Storage, db: String, name: String) -> Self {
        Self { storage, db, name }
    }

    /// Returns the database this table lives in.
    pub fn db(&self) -> &str {
        &self.db
    }

    /// Returns the name of this table.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn insert<T: Serialize + ?Sized>(&self, data: &T) -> StorageResult<String> {
        self.storage.insert(&self.db, &self.name, data).await
    }

    pub async fn all<T: DeserializeOwned>(&self) -> StorageResult<Vec<T>> {
        self.storage.get_all(&self.db, &self.name).await
    }

    pub async fn get<T: DeserializeOwned>(&self, id: &str) -> StorageResult<T> {
        self.storage.get_one(&self.db, &self.name, id).await
    }

    pub async fn get_by_name<T: DeserializeOwned>(&self, name: &str) -> StorageResult<T> {
        self.storage
            .get_by_name(&self.db, &self.name, name)
            .await
    }

    pub async fn update<T: Serialize + ?Sized>(&self, name: &str, data: &T) -> StorageResult<()> {
        self.storage
            .update(&self.db, &self.name, name, data)
            .await
    }

    pub async fn delete(&self, id: &str) -> StorageResult<()> {
        self.storage.delete(&self.db, &self.name, id).await
    }

    pub async fn delete_by_name(&self, name: &str) -> StorageResult<()> {
        self.storage
            .delete_by_name(&self.db, &self.name, name)
            .await
    }

    /// Returns whether `value` is absent from `field` in this table.
    pub async fn is_unique(&self, field: &str, value: impl Into<Bson>) -> StorageResult<bool> {
        self.storage
            .unique_field(value, [(self.name.as_str(), field)], &self.db)
            .await
    }
}

/// A table handle for one entity type.
#[derive(Debug, Clone)]
pub struct TypedTable<'a, O: StorageObject> {
    table: Table<'a>,
    _marker: PhantomData<O>,
}

impl<'a, O: StorageObject> TypedTable<'a, O> {
    pub(crate) fn new(table: Table<'a>) -> Self {
        Self { table, _marker: PhantomData }
    }

    /// Returns the untyped handle for the same table.
    pub fn untyped(&self) -> &Table<'a> {
        &self.table
    }

    /// Converts this handle to a different entity type over the same table.
    pub fn with_type<T: StorageObject>(&self) -> TypedTable<'a, T> {
        TypedTable::new(self.table.clone())
    }

    /// Runs the entity's `create` hook and validation, inserts it and stores the new
    /// identifier back into the object.
    ///
    /// # Errors
    ///
    /// Hook and validation errors are returned before anything is written.
    pub async fn create(&self, object: &mut O) -> StorageResult<String> {
        object.create()?;
        self.validated(object)?;

        let id = self.table.insert(&*object).await?;
        object.set_id(id.clone());

        tracing::debug!(model = O::model_name(), table = self.table.name(), %id, "created");

        Ok(id)
    }

    pub async fn all(&self) -> StorageResult<Vec<O>> {
        self.table.all().await
    }

    pub async fn get(&self, id: &str) -> StorageResult<O> {
        self.table.get(id).await
    }

    pub async fn get_by_name(&self, name: &str) -> StorageResult<O> {
        self.table.get_by_name(name).await
    }

    /// Validates the object, stamps its `updated` time and merges it into every record
    /// named `name`.
    pub async fn update(&self, name: &str, object: &mut O) -> StorageResult<()> {
        self.validated(object)?;
        object.set_updated(now());

        self.table.update(name, &*object).await
    }

    pub async fn delete(&self, id: &str) -> StorageResult<()> {
        self.table.delete(id).await
    }

    pub async fn delete_by_name(&self, name: &str) -> StorageResult<()> {
        self.table.delete_by_name(name).await
    }

    pub async fn is_unique(&self, field: &str, value: impl Into<Bson>) -> StorageResult<bool> {
        self.table.is_unique(field, value).await
    }

    fn validated(&self, object: &O) -> StorageResult<()> {
        object.validate().inspect_err(|e: &StorageError| {
            tracing::debug!(model = O::model_name(), error = %e, "validation failed");
        })
    }
}
