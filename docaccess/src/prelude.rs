//! Convenient re-exports of commonly used types from docaccess.
//!
//! Import this prelude module to quickly access the most frequently used types
//! and traits without needing to import from multiple sub-modules:
//!
//! ```ignore
//! use docaccess::prelude::*;
//! ```
//!
//! This provides access to:
//! - The storage handle and table handles
//! - Storage object and storable traits, plus the `Storable` derive
//! - Backend and connector traits
//! - Configuration options and error types

pub use docaccess_core::{
    storage::Storage,
    table::{Table, TypedTable},
    object::StorageObject,
    storable::{Storable, StorableInfo, now},
    backend::{Connector, StoreBackend, WriteResult},
    cursor::Cursor,
    config::{self, ConnectOpts, EnvConfig, StorageConfig},
    error::{StorageError, StorageResult},
};
pub use docaccess_macros::Storable;
