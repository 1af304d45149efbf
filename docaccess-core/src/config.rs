//! Connection configuration and configuration options.
//!
//! A session is opened from a [`ConnectOpts`] that starts at its defaults and is then
//! mutated by an ordered list of [`StorageConfig`] options. Options are applied in the
//! order given, so a later option overrides whatever an earlier one set.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use docaccess::config::{self, ConnectOpts};
//!
//! let opts = ConnectOpts::default().apply(&[
//!     &config::address("db.internal:28015"),
//!     &config::database("accounts"),
//!     &|opts: &mut ConnectOpts| opts.timeout = Duration::from_secs(3),
//! ]);
//! ```

use serde::{Deserialize, Serialize};
use std::{str::FromStr, time::Duration};

pub const DEFAULT_ADDRESS: &str = "localhost:28015";
pub const DEFAULT_MAX_IDLE: u32 = 10;
pub const DEFAULT_MAX_OPEN: u32 = 10;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Options used to establish the connection to the document store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectOpts {
    /// `host:port` of the store.
    pub address: String,
    /// Default database; empty means "none".
    pub database: String,
    /// Connections kept idle in the pool.
    pub max_idle: u32,
    /// Upper bound on open connections.
    pub max_open: u32,
    /// Connect timeout.
    pub timeout: Duration,
}

impl Default for ConnectOpts {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            database: String::new(),
            max_idle: DEFAULT_MAX_IDLE,
            max_open: DEFAULT_MAX_OPEN,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ConnectOpts {
    /// Applies each option in order and returns the resulting configuration.
    pub fn apply(mut self, settings: &[&dyn StorageConfig]) -> Self {
        for setting in settings {
            setting.configure(&mut self);
        }
        self
    }
}

/// A configuration option that mutates the working [`ConnectOpts`] before connecting.
///
/// Implemented for closures taking `&mut ConnectOpts`, and for `ConnectOpts` itself
/// (which replaces the whole working configuration).
pub trait StorageConfig: Send + Sync {
    fn configure(&self, opts: &mut ConnectOpts);
}

impl<F> StorageConfig for F
where
    F: Fn(&mut ConnectOpts) + Send + Sync,
{
    fn configure(&self, opts: &mut ConnectOpts) {
        self(opts)
    }
}

impl StorageConfig for ConnectOpts {
    fn configure(&self, opts: &mut ConnectOpts) {
        *opts = self.clone();
    }
}

/// Sets the store address.
pub fn address(address: impl Into<String>) -> impl StorageConfig {
    let address = address.into();
    move |opts: &mut ConnectOpts| opts.address = address.clone()
}

/// Sets the default database.
pub fn database(database: impl Into<String>) -> impl StorageConfig {
    let database = database.into();
    move |opts: &mut ConnectOpts| opts.database = database.clone()
}

pub fn max_idle(max_idle: u32) -> impl StorageConfig {
    move |opts: &mut ConnectOpts| opts.max_idle = max_idle
}

pub fn max_open(max_open: u32) -> impl StorageConfig {
    move |opts: &mut ConnectOpts| opts.max_open = max_open
}

pub fn timeout(timeout: Duration) -> impl StorageConfig {
    move |opts: &mut ConnectOpts| opts.timeout = timeout
}

/// Reads connection settings from environment variables.
///
/// With the default prefix `STORAGE` the recognised variables are `STORAGE_ADDRESS`,
/// `STORAGE_DATABASE`, `STORAGE_MAX_IDLE`, `STORAGE_MAX_OPEN` and `STORAGE_TIMEOUT_SECS`.
/// Unset variables leave the working configuration untouched. Values that fail to
/// parse are skipped and logged.
pub struct EnvConfig {
    prefix: String,
    lookup: Box<dyn Fn(&str) -> Option<String> + Send + Sync>,
}

impl EnvConfig {
    pub const DEFAULT_PREFIX: &'static str = "STORAGE";

    pub fn new() -> Self {
        Self::with_prefix(Self::DEFAULT_PREFIX)
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            lookup: Box::new(|key: &str| std::env::var(key).ok()),
        }
    }

    /// Replaces the variable source, e.g. with a fixed map.
    pub fn with_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.lookup = Box::new(lookup);
        self
    }

    fn var(&self, suffix: &str) -> Option<String> {
        (self.lookup)(&format!("{}_{}", self.prefix, suffix))
    }

    fn parsed<T: FromStr>(&self, suffix: &str) -> Option<T> {
        let raw = self.var(suffix)?;

        match raw.trim().parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(
                    variable = %format!("{}_{}", self.prefix, suffix),
                    value = %raw,
                    "ignoring unparsable storage setting"
                );
                None
            }
        }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EnvConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvConfig")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl StorageConfig for EnvConfig {
    fn configure(&self, opts: &mut ConnectOpts) {
        if let Some(address) = self.var("ADDRESS") {
            opts.address = address;
        }
        if let Some(database) = self.var("DATABASE") {
            opts.database = database;
        }
        if let Some(max_idle) = self.parsed("MAX_IDLE") {
            opts.max_idle = max_idle;
        }
        if let Some(max_open) = self.parsed("MAX_OPEN") {
            opts.max_open = max_open;
        }
        if let Some(secs) = self.parsed::<u64>("TIMEOUT_SECS") {
            opts.timeout = Duration::from_secs(secs);
        }
    }
}
