//! A thin CRUD access layer between application storage objects and a document database.
//!
//! This crate is the core of the docaccess project and provides:
//!
//! - **Storage handle** ([`storage`]) - CRUD operations and cross-table uniqueness checks
//! - **Table handles** ([`table`]) - Handles bound to one table, untyped or per entity type
//! - **Session** ([`session`]) - The optional process-wide storage handle
//! - **Store backend abstraction** ([`backend`]) - Traits implemented by document stores
//! - **Cursors** ([`cursor`]) - Decoding of store results
//! - **Configuration** ([`config`]) - Connection options applied before connecting
//! - **Storable metadata** ([`storable`]) - Created/updated timestamps for any entity
//! - **Storage objects** ([`object`]) - The contract entities implement
//! - **Error handling** ([`error`]) - Error types and result types
//!
//! # Example
//!
//! ```ignore
//! use docaccess::{prelude::*, memory::InMemoryConnector};
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! pub struct Widget {
//!     #[serde(skip_serializing_if = "Option::is_none")]
//!     pub id: Option<String>,
//!     pub name: String,
//! }
//!
//! let storage = Storage::open(InMemoryConnector::default(), &[]).await?;
//! let id = storage.insert("app", "widgets", &Widget { id: None, name: "foo".into() }).await?;
//! let widget: Widget = storage.get_one("app", "widgets", &id).await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as docaccess_core;

pub mod backend;
pub mod config;
pub mod cursor;
pub mod error;
pub mod object;
pub mod session;
pub mod storable;
pub mod storage;
pub mod table;
