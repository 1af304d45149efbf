//! MongoDB backend implementation for docaccess.
//!
//! This crate provides a MongoDB-based implementation of the `StoreBackend` trait.
//!
//! To use this backend, include the `mongodb` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! docaccess = { version = "x.y.z", features = ["mongodb"] }
//! ```
//!
//! # Mapping
//!
//! - **Databases and tables** - map to MongoDB databases and collections
//! - **Primary key** - the `id` field is stored as `_id`
//! - **Name index** - lookups by `name` are plain equality queries; create an index on
//!   `name` for large collections
//! - **Updates** - nested documents are flattened into dotted `$set` paths so they merge
//!
//! # Example
//!
//! ```ignore
//! use docaccess::{prelude::*, mongodb::MongoDbConnector};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let storage = Storage::open(MongoDbConnector, &[
//!         &config::address("localhost:27017"),
//!         &config::max_open(20),
//!     ])
//!     .await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docaccess_mongodb;

pub mod store;
mod patch;

pub use store::{MongoDbConnector, MongoDbStore};
