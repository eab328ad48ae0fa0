//! Platform biometric capability seam.
//!
//! Biometric proof only ever unlocks the cached credential pair; it never
//! authenticates by itself. The sensor integration lives in platform crates
//! outside this repository, behind [`BiometricAuthenticator`].

use async_trait::async_trait;
use thiserror::Error;

/// Failure reasons reported by the platform biometric capability.
///
/// All variants are non-fatal; callers surface the message and fall back to
/// password login.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BiometricError {
    /// The device has no usable biometric sensor.
    #[error("biometric authentication is not available on this device")]
    Unavailable,

    /// The sensor exists but no biometric credentials are enrolled.
    #[error("no biometric credentials are enrolled")]
    NotEnrolled,

    /// The user dismissed the platform prompt.
    #[error("authentication was cancelled")]
    Cancelled,

    /// Too many failed attempts; the platform has locked the sensor.
    #[error("biometric authentication is locked out")]
    LockedOut,

    /// Any other platform-reported failure.
    #[error("biometric authentication failed: {0}")]
    Failed(String),
}

/// Platform biometric capability.
///
/// This trait is designed to be mockable using mockall for testing.
/// Use `MockBiometricAuthenticator` in tests to mock the behavior.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BiometricAuthenticator: Send + Sync {
    /// Whether the device exposes a usable biometric sensor.
    async fn is_available(&self) -> bool;

    /// Prompts the user for biometric proof.
    async fn authenticate(&self) -> Result<(), BiometricError>;

    /// Creates the device key material backing future prompts.
    async fn enroll(&self) -> Result<(), BiometricError>;

    /// Deletes the device key material. Removing keys that were never
    /// created is not an error.
    async fn remove_keys(&self) -> Result<(), BiometricError>;
}

/// Capability stub for platforms without a biometric sensor.
///
/// Every prompt fails with [`BiometricError::Unavailable`]; key removal is a
/// no-op so disabling biometrics stays total.
pub struct UnsupportedBiometrics;

#[async_trait]
impl BiometricAuthenticator for UnsupportedBiometrics {
    async fn is_available(&self) -> bool {
        false
    }

    async fn authenticate(&self) -> Result<(), BiometricError> {
        Err(BiometricError::Unavailable)
    }

    async fn enroll(&self) -> Result<(), BiometricError> {
        Err(BiometricError::Unavailable)
    }

    async fn remove_keys(&self) -> Result<(), BiometricError> {
        Ok(())
    }
}
