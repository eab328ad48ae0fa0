//! Durable session persistence.
//!
//! The store commits to memory first and writes behind to one of these
//! backings so a restarted process can rehydrate the previous session. Only
//! the subset in [`PersistedSession`] is durable; transient flags such as
//! the in-flight indicator are not.

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::models::{ChildProfile, User};

pub mod file;

pub use file::FileSessionBacking;

/// Storage key under which the single session blob lives.
pub const STORAGE_KEY: &str = "auth-storage";

/// The durable subset of the session state, serialized as one JSON blob.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedSession {
    pub user: Option<User>,
    pub is_authenticated: bool,
    pub child_profiles: Vec<ChildProfile>,
    pub active_child_profile: Option<ChildProfile>,
}

/// Durable key-value backing for the session blob.
///
/// This trait is designed to be mockable using mockall for testing.
/// Use `MockSessionBacking` in tests to mock the behavior.
#[cfg_attr(test, mockall::automock)]
pub trait SessionBacking: Send + Sync {
    /// Loads the persisted blob, or `None` when nothing usable is stored.
    fn load(&self) -> Result<Option<PersistedSession>, StoreError>;

    /// Replaces the persisted blob.
    fn save(&self, session: &PersistedSession) -> Result<(), StoreError>;

    /// Removes the persisted blob. Clearing an empty backing is not an error.
    fn clear(&self) -> Result<(), StoreError>;
}
