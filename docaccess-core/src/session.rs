//! The process-wide storage session.
//!
//! Applications that prefer not to thread a [`Storage`] handle through every call can open
//! one shared session at startup and fetch it wherever it is needed. The session is set
//! once before concurrent traffic starts and is read-only afterwards; opening again
//! replaces it.
//!
//! # Example
//!
//! ```ignore
//! use docaccess::{config, session, memory::InMemoryConnector};
//!
//! #[tokio::main]
//! async fn main() {
//!     session::open_session(InMemoryConnector::default(), &[&config::database("app")]).await;
//!
//!     let storage = session::current().expect("opened above");
//!     storage.insert("app", "widgets", &bson::doc! { "name": "foo" }).await.unwrap();
//! }
//! ```

use std::sync::{PoisonError, RwLock};

use crate::{
    backend::Connector,
    config::StorageConfig,
    error::{StorageError, StorageResult},
    storage::Storage,
};

static SESSION: RwLock<Option<Storage>> = RwLock::new(None);

/// Opens the shared session.
///
/// # Panics
///
/// A connection failure at startup is fatal: it is logged and the call panics, so the
/// process never continues without a session.
pub async fn open_session<C: Connector>(connector: C, settings: &[&dyn StorageConfig]) -> Storage {
    let storage = match Storage::open(connector, settings).await {
        Ok(storage) => storage,
        Err(err) => {
            tracing::error!(error = %err, "unable to open storage session");
            panic!("unable to open storage session: {err}");
        }
    };

    install(storage.clone());
    storage
}

/// Installs an existing handle as the shared session.
pub fn install(storage: Storage) {
    *SESSION.write().unwrap_or_else(PoisonError::into_inner) = Some(storage);
}

/// Returns the shared session, if one has been opened. Never opens one.
pub fn get_session() -> Option<Storage> {
    SESSION
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Returns the shared session.
///
/// # Errors
///
/// [`StorageError::SessionNotOpen`] if no session has been opened.
pub fn current() -> StorageResult<Storage> {
    get_session().ok_or(StorageError::SessionNotOpen)
}
