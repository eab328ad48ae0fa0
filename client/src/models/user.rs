//! Models for the parent account and the credential payloads it signs in with.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::rules;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// The authenticated parent account as returned by the auth gateway.
pub struct User {
    /// Unique identifier for the account.
    pub id: String,
    /// Email address used for login.
    pub email: String,
    /// Human-readable display name.
    pub name: String,
    /// Optional contact phone number.
    pub phone_number: Option<String>,
    /// Optional avatar image URL.
    pub profile_image: Option<String>,
    /// Creation timestamp for auditing.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp for auditing.
    pub updated_at: DateTime<Utc>,
    /// Subscription tier governing feature access.
    pub subscription: SubscriptionTier,
    /// Whether the account has enrolled biometric unlock on this device.
    pub biometric_enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
/// Supported subscription tiers.
pub enum SubscriptionTier {
    /// Free tier with the base feature set.
    #[default]
    Free,
    /// Paid tier with the full feature set.
    Premium,
}

impl SubscriptionTier {
    /// Returns the canonical snake_case representation of the tier.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionTier::Free => "free",
            SubscriptionTier::Premium => "premium",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Credentials submitted when signing in to an existing account.
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
/// Payload for creating a new parent account.
pub struct RegisterCredentials {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(custom(function = "rules::validate_password"))]
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
}

impl RegisterCredentials {
    /// The login-credential pair embedded in a registration payload.
    ///
    /// Used to seed the secure credential cache after a successful signup so
    /// biometric re-login works without an intervening password login.
    pub fn login_credentials(&self) -> LoginCredentials {
        LoginCredentials {
            email: self.email.clone(),
            password: self.password.clone(),
        }
    }
}
