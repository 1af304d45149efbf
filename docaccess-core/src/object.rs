//! The capability contract an entity implements to be handled by the typed helpers.

use serde::{Serialize, de::DeserializeOwned};

use crate::{error::StorageResult, storable::Storable};

/// Minimal operation set a data model provides to integrate with the storage layer.
///
/// The raw CRUD methods on [`Storage`](crate::storage::Storage) accept any serializable
/// payload; this trait is what [`TypedTable`](crate::table::TypedTable) relies on to run
/// the entity's own lifecycle hooks around those calls.
///
/// # Example
///
/// ```ignore
/// use docaccess::prelude::*;
/// use serde::{Serialize, Deserialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize, Storable)]
/// pub struct User {
///     #[serde(skip_serializing_if = "Option::is_none")]
///     pub id: Option<String>,
///     pub name: String,
///     #[serde(default)]
///     pub info: StorableInfo,
/// }
///
/// impl StorageObject for User {
///     fn create(&mut self) -> StorageResult<()> {
///         self.set_created(now());
///         Ok(())
///     }
///
///     fn validate(&self) -> StorageResult<()> {
///         if self.name.is_empty() {
///             return Err(StorageError::Validation("name is required".into()));
///         }
///         Ok(())
///     }
///
///     fn id(&self) -> Option<&str> { self.id.as_deref() }
///     fn set_id(&mut self, id: String) { self.id = Some(id) }
///     fn model_name() -> &'static str { "User" }
/// }
/// ```
pub trait StorageObject: Storable + Serialize + DeserializeOwned + Send + Sync {
    /// Entity-specific setup run before the object is first inserted.
    fn create(&mut self) -> StorageResult<()>;

    /// Entity-specific field validation.
    fn validate(&self) -> StorageResult<()>;

    /// The store identifier, if the object has been persisted.
    fn id(&self) -> Option<&str>;

    fn set_id(&mut self, id: String);

    /// A stable name for the model, used in diagnostics.
    fn model_name() -> &'static str;
}
