//! File-backed session persistence.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::warn;

use super::{PersistedSession, SessionBacking, STORAGE_KEY};
use crate::error::StoreError;

/// Stores the session blob as a JSON file in the app data directory.
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// crash mid-write leaves the previous blob intact.
pub struct FileSessionBacking {
    path: PathBuf,
}

impl FileSessionBacking {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(format!("{}.json", STORAGE_KEY)),
        }
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }
}

impl SessionBacking for FileSessionBacking {
    fn load(&self) -> Result<Option<PersistedSession>, StoreError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StoreError::Persistence(err.to_string())),
        };

        match serde_json::from_str(&data) {
            Ok(session) => Ok(Some(session)),
            Err(err) => {
                // An unreadable blob hydrates as no session.
                warn!(path = %self.path.display(), error = %err, "discarding unreadable session blob");
                Ok(None)
            }
        }
    }

    fn save(&self, session: &PersistedSession) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::Persistence(e.to_string()))?;
        }

        let data = serde_json::to_string_pretty(session)?;
        let temp = self.temp_path();
        fs::write(&temp, data).map_err(|e| StoreError::Persistence(e.to_string()))?;
        fs::rename(&temp, &self.path).map_err(|e| StoreError::Persistence(e.to_string()))
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StoreError::Persistence(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SubscriptionTier, User};
    use tempfile::tempdir;

    fn sample_session() -> PersistedSession {
        PersistedSession {
            user: Some(User {
                id: "u1".to_string(),
                email: "a@b.com".to_string(),
                name: "A".to_string(),
                phone_number: None,
                profile_image: None,
                created_at: "2025-01-02T10:00:00Z".parse().unwrap(),
                updated_at: "2025-01-02T10:00:00Z".parse().unwrap(),
                subscription: SubscriptionTier::Free,
                biometric_enabled: false,
            }),
            is_authenticated: true,
            child_profiles: Vec::new(),
            active_child_profile: None,
        }
    }

    #[test]
    fn save_then_load_roundtrips() {
        let dir = tempdir().unwrap();
        let backing = FileSessionBacking::new(dir.path());

        let session = sample_session();
        backing.save(&session).unwrap();
        assert_eq!(backing.load().unwrap(), Some(session));
    }

    #[test]
    fn load_returns_none_when_file_missing() {
        let dir = tempdir().unwrap();
        let backing = FileSessionBacking::new(dir.path());
        assert_eq!(backing.load().unwrap(), None);
    }

    #[test]
    fn load_discards_corrupt_blob() {
        let dir = tempdir().unwrap();
        let backing = FileSessionBacking::new(dir.path());
        fs::write(
            dir.path().join(format!("{}.json", STORAGE_KEY)),
            "{ not valid json",
        )
        .unwrap();

        assert_eq!(backing.load().unwrap(), None);
    }

    #[test]
    fn save_creates_missing_data_dir() {
        let dir = tempdir().unwrap();
        let backing = FileSessionBacking::new(dir.path().join("nested/data"));
        backing.save(&sample_session()).unwrap();
        assert!(backing.load().unwrap().is_some());
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = tempdir().unwrap();
        let backing = FileSessionBacking::new(dir.path());

        backing.save(&sample_session()).unwrap();
        backing.clear().unwrap();
        backing.clear().unwrap();
        assert_eq!(backing.load().unwrap(), None);
    }
}
