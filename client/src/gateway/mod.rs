//! Remote auth gateway seam.
//!
//! The gateway owns every remote concern: credential verification, account
//! and child-profile records, and the provisioning of the downstream
//! filtering configuration that accompanies profile creation. The store only
//! ever sees one aggregate success or failure per call; compensating for
//! partial remote side effects is the gateway's job.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{
    ChildProfile, ChildProfileUpdate, LoginCredentials, NewChildProfile, RegisterCredentials, User,
};

pub mod http;
pub mod types;

pub use http::HttpAuthGateway;

/// Authoritative account payload returned by login and refresh calls.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthPayload {
    pub user: User,
    pub child_profiles: Vec<ChildProfile>,
}

/// Remote authentication and child-profile operations.
///
/// This trait is designed to be mockable using mockall for testing.
/// Use `MockAuthGateway` in tests to mock the behavior.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Verifies credentials and returns the account with its child profiles.
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthPayload, StoreError>;

    /// Creates a new account.
    async fn register(&self, credentials: &RegisterCredentials) -> Result<User, StoreError>;

    /// Invalidates the remote session.
    async fn logout(&self) -> Result<(), StoreError>;

    /// Fetches the latest account payload for an authenticated user.
    async fn get_user_data(&self, user_id: &str) -> Result<AuthPayload, StoreError>;

    /// Creates a child profile (and its filtering configuration) under the
    /// given parent, returning the record with its server-assigned id.
    async fn create_child_profile(
        &self,
        parent_id: &str,
        draft: &NewChildProfile,
    ) -> Result<ChildProfile, StoreError>;

    /// Applies a partial update to an existing child profile.
    async fn update_child_profile(
        &self,
        id: &str,
        update: &ChildProfileUpdate,
    ) -> Result<ChildProfile, StoreError>;

    /// Deletes a child profile and its filtering configuration.
    async fn delete_child_profile(&self, id: &str) -> Result<(), StoreError>;

    /// Checks a child's PIN without mutating anything.
    async fn verify_child_pin(&self, child_id: &str, pin: &str) -> Result<bool, StoreError>;

    /// Starts the email-based password reset flow.
    async fn request_password_reset(&self, email: &str) -> Result<(), StoreError>;

    /// Completes a password reset with the emailed token.
    async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), StoreError>;
}
