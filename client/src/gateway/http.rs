//! HTTP implementation of the auth gateway.

use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use tracing::debug;

use super::types::{
    ApiError, CreateChildProfileRequest, ForgotPasswordRequest, LoginResponse, RegisterResponse,
    ResetPasswordRequest, UserDataResponse, VerifyChildPinRequest, VerifyChildPinResponse,
};
use super::{AuthGateway, AuthPayload};
use crate::config::Config;
use crate::error::StoreError;
use crate::models::{
    ChildProfile, ChildProfileUpdate, LoginCredentials, NewChildProfile, RegisterCredentials, User,
};

/// Gateway speaking JSON over HTTPS to the iparental backend.
///
/// Holds the bearer token from the most recent login or registration and
/// attaches it to subsequent requests. The token is process-local; durable
/// session survival comes from the store's persistence, not from here.
pub struct HttpAuthGateway {
    client: Client,
    base_url: String,
    access_token: RwLock<Option<String>>,
}

impl HttpAuthGateway {
    pub fn new(config: &Config) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            access_token: RwLock::new(None),
        })
    }

    /// Gateway pointed at an explicit base URL, mainly for tests.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: RwLock::new(None),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn remember_token(&self, token: &str) {
        *self
            .access_token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
    }

    fn forget_token(&self) {
        *self
            .access_token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let token = self
            .access_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Maps a non-success response to the server's error message, falling
    /// back to the status code when the body is not the expected shape.
    async fn rejection(response: Response) -> StoreError {
        let status = response.status();
        match response.json::<ApiError>().await {
            Ok(body) => StoreError::AuthRejected(body.error),
            Err(_) => StoreError::AuthRejected(format!("request failed with status {}", status)),
        }
    }
}

#[async_trait]
impl AuthGateway for HttpAuthGateway {
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthPayload, StoreError> {
        let response = self
            .client
            .post(self.url("/auth/login"))
            .json(credentials)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let body: LoginResponse = response.json().await?;
        self.remember_token(&body.access_token);
        debug!(user_id = %body.user.id, "login accepted");
        Ok(AuthPayload {
            user: body.user,
            child_profiles: body.child_profiles,
        })
    }

    async fn register(&self, credentials: &RegisterCredentials) -> Result<User, StoreError> {
        let response = self
            .client
            .post(self.url("/auth/register"))
            .json(credentials)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let body: RegisterResponse = response.json().await?;
        self.remember_token(&body.access_token);
        debug!(user_id = %body.user.id, "registration accepted");
        Ok(body.user)
    }

    async fn logout(&self) -> Result<(), StoreError> {
        let response = self
            .authorized(self.client.post(self.url("/auth/logout")))
            .send()
            .await;

        // The local token dies regardless of how the remote call went.
        self.forget_token();

        let response = response?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::rejection(response).await)
        }
    }

    async fn get_user_data(&self, user_id: &str) -> Result<AuthPayload, StoreError> {
        let response = self
            .authorized(self.client.get(self.url(&format!("/auth/user/{}", user_id))))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let body: UserDataResponse = response.json().await?;
        Ok(AuthPayload {
            user: body.user,
            child_profiles: body.child_profiles,
        })
    }

    async fn create_child_profile(
        &self,
        parent_id: &str,
        draft: &NewChildProfile,
    ) -> Result<ChildProfile, StoreError> {
        let request = CreateChildProfileRequest::from_draft(parent_id, draft);
        let response = self
            .authorized(self.client.post(self.url("/auth/child-profiles")))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        Ok(response.json().await?)
    }

    async fn update_child_profile(
        &self,
        id: &str,
        update: &ChildProfileUpdate,
    ) -> Result<ChildProfile, StoreError> {
        let response = self
            .authorized(
                self.client
                    .put(self.url(&format!("/auth/child-profiles/{}", id))),
            )
            .json(update)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        Ok(response.json().await?)
    }

    async fn delete_child_profile(&self, id: &str) -> Result<(), StoreError> {
        let response = self
            .authorized(
                self.client
                    .delete(self.url(&format!("/auth/child-profiles/{}", id))),
            )
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::rejection(response).await)
        }
    }

    async fn verify_child_pin(&self, child_id: &str, pin: &str) -> Result<bool, StoreError> {
        let request = VerifyChildPinRequest {
            child_id: child_id.to_string(),
            pin: pin.to_string(),
        };
        let response = self
            .authorized(self.client.post(self.url("/auth/verify-child-pin")))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let body: VerifyChildPinResponse = response.json().await?;
        Ok(body.valid)
    }

    async fn request_password_reset(&self, email: &str) -> Result<(), StoreError> {
        let request = ForgotPasswordRequest {
            email: email.to_string(),
        };
        let response = self
            .client
            .post(self.url("/auth/forgot-password"))
            .json(&request)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::rejection(response).await)
        }
    }

    async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), StoreError> {
        let request = ResetPasswordRequest {
            token: token.to_string(),
            password: new_password.to_string(),
        };
        let response = self
            .client
            .post(self.url("/auth/reset-password"))
            .json(&request)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::rejection(response).await)
        }
    }
}
