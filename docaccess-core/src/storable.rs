//! Lifecycle metadata shared by storage objects.
//!
//! [`StorableInfo`] holds the `created`/`updated` timestamps. Entities embed it as a
//! regular field and implement [`Storable`] (usually through `#[derive(Storable)]`) to get
//! the timestamp accessors without redeclaring them.
//!
//! # Example
//!
//! ```ignore
//! use docaccess::prelude::*;
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
//! let mut org = Organization { id: None, name: "acme".into(), info: StorableInfo::default() };
//! org.set_created(now());
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Created and updated timestamps, in seconds since the Unix epoch.
///
/// Zero means "unset" and is left out when serializing, so writing a partially
/// populated entity never resets a timestamp already held by the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorableInfo {
    #[serde(default, skip_serializing_if = "is_unset")]
    pub created: i64,
    #[serde(default, skip_serializing_if = "is_unset")]
    pub updated: i64,
}

impl StorableInfo {
    pub fn new(created: i64, updated: i64) -> Self {
        Self { created, updated }
    }
}

fn is_unset(timestamp: &i64) -> bool {
    *timestamp == 0
}

/// Timestamp accessors for any type carrying a [`StorableInfo`].
///
/// Only the two `storable_info` methods need implementing; the getters are pure reads
/// and the setters are pure overwrites.
pub trait Storable {
    fn storable_info(&self) -> &StorableInfo;

    fn storable_info_mut(&mut self) -> &mut StorableInfo;

    fn created(&self) -> i64 {
        self.storable_info().created
    }

    fn set_created(&mut self, timestamp: i64) {
        self.storable_info_mut().created = timestamp;
    }

    fn updated(&self) -> i64 {
        self.storable_info().updated
    }

    fn set_updated(&mut self, timestamp: i64) {
        self.storable_info_mut().updated = timestamp;
    }
}

impl Storable for StorableInfo {
    fn storable_info(&self) -> &StorableInfo {
        self
    }

    fn storable_info_mut(&mut self) -> &mut StorableInfo {
        self
    }
}

/// The current time in seconds since the Unix epoch.
pub fn now() -> i64 {
    Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{doc, ser::serialize_to_bson, Bson};

    #[test]
    fn test_getter_is_idempotent() {
        let info = StorableInfo::new(10, 20);

        assert_eq!(info.created(), info.created());
        assert_eq!(info.updated(), info.updated());
    }

    #[test]
    fn test_setter_overwrites() {
        let mut info = StorableInfo::default();

        info.set_created(1_700_000_000);
        assert_eq!(info.created(), 1_700_000_000);

        info.set_created(5);
        info.set_updated(6);
        assert_eq!(info.created(), 5);
        assert_eq!(info.updated(), 6);
    }

    #[test]
    fn test_unset_timestamps_are_omitted() {
        let bson = serialize_to_bson(&StorableInfo::new(0, 42)).unwrap();
        assert_eq!(bson, Bson::Document(doc! { "updated": 42_i64 }));
    }

    #[test]
    fn test_now_is_after_2020() {
        assert!(now() > 1_577_836_800);
    }
}
