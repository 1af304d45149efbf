//! In-memory document store backend for docaccess.
//!
//! This crate provides a thread-safe, in-memory implementation of the `StoreBackend` trait.
//! It uses async-aware read-write locks for concurrent access and is meant for development
//! and testing.
//!
//! # Features
//!
//! - **Thread-safe access** - Concurrent reads and writes using async-aware RwLock
//! - **Multiple databases** - Tables are namespaced by database name like on a server
//! - **Store semantics** - Generated string keys, recursive update merges and numeric
//!   equality across integer widths
//!
//! # Quick Start
//!
//! ```ignore
//! use docaccess::{prelude::*, memory::InMemoryConnector};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let storage = Storage::open(InMemoryConnector::default(), &[]).await?;
//!
//!     let id = storage.insert("app", "widgets", &bson::doc! { "name": "foo" }).await?;
//!     let widget: bson::Document = storage.get_one("app", "widgets", &id).await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docaccess_memory;

pub mod store;
mod matcher;

pub use store::{InMemoryConnector, InMemoryStore};
