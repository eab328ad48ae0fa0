//! Wire payloads exchanged with the auth backend.
//!
//! Dates travel as ISO-8601 strings and are converted to date values at this
//! boundary by serde; the domain models on the other side never see strings.

use serde::{Deserialize, Serialize};

use crate::models::{AgeGroup, ChildProfile, ChildSettings, NewChildProfile, User};

/// Error body returned by the backend on any non-success status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

/// Successful login body.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token attached to subsequent requests.
    pub access_token: String,
    pub user: User,
    #[serde(default)]
    pub child_profiles: Vec<ChildProfile>,
}

/// Successful registration body.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub access_token: String,
    pub user: User,
}

/// Account payload returned by the user-data endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserDataResponse {
    pub user: User,
    #[serde(default)]
    pub child_profiles: Vec<ChildProfile>,
}

/// Body for the child-profile creation endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateChildProfileRequest {
    pub parent_id: String,
    pub name: String,
    pub date_of_birth: chrono::NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_token: Option<String>,
    pub age_group: AgeGroup,
    pub settings: ChildSettings,
}

impl CreateChildProfileRequest {
    /// Builds the creation body from a validated draft, resolving default
    /// settings for the draft's age group.
    pub fn from_draft(parent_id: &str, draft: &NewChildProfile) -> Self {
        Self {
            parent_id: parent_id.to_string(),
            name: draft.name.trim().to_string(),
            date_of_birth: draft.date_of_birth,
            profile_image: draft.profile_image.clone(),
            pin: draft.pin.clone(),
            device_token: draft.device_token.clone(),
            age_group: draft.age_group,
            settings: draft.resolved_settings(),
        }
    }
}

/// Body for the child PIN verification endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyChildPinRequest {
    pub child_id: String,
    pub pin: String,
}

/// Result of a child PIN verification.
#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyChildPinResponse {
    pub valid: bool,
}

/// Body for starting a password reset.
#[derive(Debug, Serialize, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Body for completing a password reset.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}
