//! Error types for the Quantinuum adapter.

use qbench_hal::HalError;
use thiserror::Error;

/// Result type for Quantinuum operations.
pub type QuantinuumResult<T> = Result<T, QuantinuumError>;

/// Errors raised while talking to the Quantinuum cloud API.
#[derive(Debug, Error)]
pub enum QuantinuumError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No email configured.
    #[error("Missing Quantinuum email: set `email` in the backend config or QUANTINUUM_EMAIL")]
    MissingEmail,

    /// No password configured.
    #[error("Missing Quantinuum password: set `token` in the backend config or QUANTINUUM_PASSWORD")]
    MissingPassword,

    /// Login rejected, or a request still unauthorized after re-login.
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    /// Job not found.
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// Job execution failed on the service.
    #[error("Job failed: {0}")]
    JobFailed(String),

    /// Results could not be assembled into counts.
    #[error("Malformed results: {0}")]
    MalformedResults(String),

    /// Non-success API response.
    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },
}

impl From<QuantinuumError> for HalError {
    fn from(e: QuantinuumError) -> Self {
        match e {
            QuantinuumError::MissingEmail
            | QuantinuumError::MissingPassword
            | QuantinuumError::AuthFailed(_) => HalError::AuthenticationFailed(e.to_string()),
            QuantinuumError::JobNotFound(id) => HalError::JobNotFound(id),
            QuantinuumError::JobFailed(msg) | QuantinuumError::MalformedResults(msg) => {
                HalError::JobFailed(msg)
            }
            QuantinuumError::Http(e) => HalError::Network(e),
            QuantinuumError::Json(e) => HalError::Serialization(e),
            QuantinuumError::ApiError { .. } => HalError::Backend(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credentials_display() {
        assert!(QuantinuumError::MissingEmail.to_string().contains("QUANTINUUM_EMAIL"));
        assert!(
            QuantinuumError::MissingPassword
                .to_string()
                .contains("QUANTINUUM_PASSWORD")
        );
    }

    #[test]
    fn test_api_error_display() {
        let err = QuantinuumError::ApiError {
            status: 503,
            message: "Service unavailable".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("503"));
        assert!(msg.contains("Service unavailable"));
    }

    #[test]
    fn test_auth_errors_to_hal() {
        for err in [
            QuantinuumError::MissingEmail,
            QuantinuumError::MissingPassword,
            QuantinuumError::AuthFailed("bad".into()),
        ] {
            let hal: HalError = err.into();
            assert!(matches!(hal, HalError::AuthenticationFailed(_)));
        }
    }

    #[test]
    fn test_job_errors_to_hal() {
        let hal: HalError = QuantinuumError::JobNotFound("j1".into()).into();
        assert!(matches!(hal, HalError::JobNotFound(id) if id == "j1"));

        let hal: HalError = QuantinuumError::JobFailed("too deep".into()).into();
        assert!(matches!(hal, HalError::JobFailed(msg) if msg == "too deep"));

        let hal: HalError = QuantinuumError::MalformedResults("ragged".into()).into();
        assert!(matches!(hal, HalError::JobFailed(msg) if msg == "ragged"));
    }

    #[test]
    fn test_api_error_to_hal() {
        let hal: HalError = QuantinuumError::ApiError {
            status: 500,
            message: "internal".into(),
        }
        .into();
        assert!(matches!(hal, HalError::Backend(msg) if msg.contains("500")));
    }
}
