//! Main docaccess crate providing a thin CRUD access layer over a document store.
//!
//! This crate is the primary entry point for users of the docaccess framework.
//! It re-exports the core types and functionality from the sub-crates and provides
//! convenient access to the different storage backends.
//!
//! # Features
//!
//! - **Explicit storage handle** - Open a [`Storage`](storage::Storage) once and pass it around,
//!   or install it as the process-wide [`session`]
//! - **Option-based configuration** - Build connection settings from ordered options
//! - **Storable metadata** - Share created/updated timestamps through `#[derive(Storable)]`
//! - **Multiple backends** - In-memory storage for tests and MongoDB for persistence
//!
//! # Quick Start
//!
//! ```ignore
//! use docaccess::{prelude::*, memory::InMemoryConnector};
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize, Storable)]
//! pub struct Organization {
//!     #[serde(skip_serializing_if = "Option::is_none")]
//!     pub id: Option<String>,
//!     pub name: String,
//!     #[serde(default)]
//!     pub info: StorableInfo,
//! }
//!
//! #[tokio::main]
//! async fn main() -> StorageResult<()> {
//!     let storage = Storage::open(InMemoryConnector::default(), &[
//!         &config::database("app"),
//!     ])
//!     .await?;
//!
//!     let mut org = Organization { id: None, name: "acme".into(), info: StorableInfo::default() };
//!     org.set_created(now());
//!
//!     // Insert and read back
//!     let id = storage.insert("app", "organizations", &org).await?;
//!     let stored: Organization = storage.get_one("app", "organizations", &id).await?;
//!
//!     // Check a name is free before reusing it
//!     let free = storage
//!         .unique_field("acme", [("organizations", "name"), ("users", "name")], "app")
//!         .await?;
//!     assert!(!free);
//!
//!     storage.shutdown().await
//! }
//! ```
//!
//! # Typed tables
//!
//! Entities that implement [`StorageObject`](object::StorageObject) can go through a
//! [`TypedTable`](table::TypedTable), which runs their `create` and `validate` hooks and keeps
//! the `updated` timestamp current.
//!
//! ```ignore
//! let organizations = storage.typed_table::<Organization>("app", "organizations");
//!
//! let id = organizations.create(&mut org).await?;
//! organizations.update("acme", &mut org).await?;
//! organizations.delete(&id).await?;
//! ```
//!
//! # Backends
//!
//! - [`memory`] - In-memory storage for development and testing
//! - `mongodb` - Persistent MongoDB backend (requires the `mongodb` feature)

#[allow(unused_extern_crates)]
extern crate self as docaccess;

pub mod prelude;

pub use docaccess_core::{backend, config, cursor, error, object, session, storable, storage, table};
pub use docaccess_macros::Storable;

// Re-exported for backend implementors and derive users
pub use async_trait::async_trait;
pub use bson;

/// In-memory storage backend implementations.
pub mod memory {
    pub use docaccess_memory::{InMemoryConnector, InMemoryStore};
}

/// MongoDB storage backend implementations.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use docaccess_mongodb::{MongoDbConnector, MongoDbStore};
}
