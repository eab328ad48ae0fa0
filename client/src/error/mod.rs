use thiserror::Error;

use crate::biometric::BiometricError;

/// Failure outcome of a session-store action.
///
/// Actions never panic and never let a collaborator error escape unconverted;
/// every failure surfaces as one of these variants, with the pre-action state
/// left intact. Messages are plain strings for the caller to present.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The remote gateway rejected the request (bad credentials, duplicate
    /// account, server-side validation). Carries the server's message.
    #[error("{0}")]
    AuthRejected(String),

    /// The remote call could not complete (timeout, DNS, connection refused).
    #[error("network error: {0}")]
    Network(String),

    /// The action requires an authenticated user and none is present.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The action targets a child profile this session does not know about.
    #[error("child profile not found: {0}")]
    ProfileNotFound(String),

    /// Biometric login was attempted before any credential pair was cached.
    #[error("biometric login is not set up")]
    BiometricNotConfigured,

    /// The platform biometric check failed.
    #[error(transparent)]
    Biometric(#[from] BiometricError),

    /// A local precondition on the payload failed; no collaborator was
    /// contacted.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The secure credential cache could not be read or written.
    #[error("credential storage error: {0}")]
    Credentials(String),

    /// The durable session backing could not be read or written.
    #[error("session persistence error: {0}")]
    Persistence(String),

    /// A payload could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            StoreError::Serialization(err.to_string())
        } else {
            StoreError::Network(err.to_string())
        }
    }
}

impl From<validator::ValidationErrors> for StoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    let code = e.code.as_ref();
                    format!("{}: {}", field, code)
                })
            })
            .collect();
        StoreError::Validation(messages.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn auth_rejection_surfaces_server_message_verbatim() {
        let err = StoreError::AuthRejected("Invalid email or password".to_string());
        assert_eq!(err.to_string(), "Invalid email or password");
    }

    #[test]
    fn biometric_errors_convert_transparently() {
        let err: StoreError = BiometricError::NotEnrolled.into();
        assert_eq!(err.to_string(), "no biometric credentials are enrolled");
    }

    #[test]
    fn validation_errors_join_field_codes() {
        #[derive(Validate)]
        struct Payload {
            #[validate(email)]
            email: String,
        }

        let errors = Payload {
            email: "nope".to_string(),
        }
        .validate()
        .unwrap_err();
        let err: StoreError = errors.into();
        assert!(err.to_string().contains("email"));
    }

    #[test]
    fn serde_errors_map_to_serialization() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: StoreError = err.into();
        assert!(matches!(err, StoreError::Serialization(_)));
    }
}
