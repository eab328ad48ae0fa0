//! Secure storage for the cached biometric-login credential pair.
//!
//! After a successful password login the pair is written here so a later
//! biometric proof can replay it. Secrets live in the OS keyring; nothing is
//! written to ordinary app storage.

use crate::error::StoreError;
use crate::models::LoginCredentials;

/// Keyring account name under which the pair is stored.
const CREDENTIALS_KEY: &str = "stored_credentials";

/// Device-level secure storage for a single credential pair.
///
/// This trait is designed to be mockable using mockall for testing.
/// Use `MockCredentialCache` in tests to mock the behavior.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialCache: Send + Sync {
    /// Stores the pair, replacing any previous one.
    fn store(&self, credentials: &LoginCredentials) -> Result<(), StoreError>;

    /// Retrieves the cached pair, or `None` when nothing is stored.
    fn retrieve(&self) -> Result<Option<LoginCredentials>, StoreError>;

    /// Removes the cached pair. Clearing an empty cache is not an error.
    fn clear(&self) -> Result<(), StoreError>;
}

/// Credential cache backed by the OS keyring.
pub struct KeyringCredentialCache {
    /// Service name for keyring entries.
    service_name: String,
}

impl KeyringCredentialCache {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    fn entry(&self) -> Result<keyring::Entry, StoreError> {
        keyring::Entry::new(&self.service_name, CREDENTIALS_KEY)
            .map_err(|e| StoreError::Credentials(e.to_string()))
    }

    fn encode(credentials: &LoginCredentials) -> Result<String, StoreError> {
        serde_json::to_string(credentials).map_err(StoreError::from)
    }

    fn decode(data: &str) -> Result<LoginCredentials, StoreError> {
        serde_json::from_str(data).map_err(StoreError::from)
    }
}

impl CredentialCache for KeyringCredentialCache {
    fn store(&self, credentials: &LoginCredentials) -> Result<(), StoreError> {
        let encoded = Self::encode(credentials)?;
        self.entry()?
            .set_password(&encoded)
            .map_err(|e| StoreError::Credentials(e.to_string()))
    }

    fn retrieve(&self) -> Result<Option<LoginCredentials>, StoreError> {
        match self.entry()?.get_password() {
            Ok(data) => Self::decode(&data).map(Some),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(StoreError::Credentials(e.to_string())),
        }
    }

    fn clear(&self) -> Result<(), StoreError> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(StoreError::Credentials(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Keyring tests require a running platform secrets service, so these
    // exercise the encoding layer only.

    #[test]
    fn credential_pair_roundtrips_through_json() {
        let pair = LoginCredentials {
            email: "a@b.com".to_string(),
            password: "secret123".to_string(),
        };

        let encoded = KeyringCredentialCache::encode(&pair).unwrap();
        let decoded = KeyringCredentialCache::decode(&encoded).unwrap();
        assert_eq!(decoded, pair);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(KeyringCredentialCache::decode("not json").is_err());
    }

    #[test]
    fn mock_cache_satisfies_trait_bounds() {
        fn check_send_sync<T: Send + Sync>() {}
        check_send_sync::<MockCredentialCache>();
    }
}
