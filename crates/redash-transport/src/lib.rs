// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Transport layer abstractions for the Redash REST API
//!
//! Redash reports failures inconsistently: sometimes with a proper status code,
//! sometimes with a `{"message": ...}` body, sometimes with an empty or `null`
//! body. This crate decodes every reply exactly once, at the boundary, into a
//! tagged result so callers never inspect raw bodies.
//!
//! # Core Abstractions
//!
//! - **[`Reply`]**: successful reply, either empty or a JSON payload
//! - **[`ApiError`]**: closed set of transport-level failures
//! - **[`ApiClient`] Trait**: common interface for health-checked API clients
//! - **[`HealthStatus`]**: `Up`, `Degraded` and `Down` reporting

use thiserror::Error;

pub mod health;
pub mod reply;

pub use health::*;
pub use reply::*;

/// Generic trait for health-checked API clients
pub trait ApiClient: Send + Sync {
    /// Check the health of the remote service
    ///
    /// # Errors
    ///
    /// Returns an error if the service cannot be reached at all
    fn health_check(&self) -> impl Future<Output = Result<HealthStatus, ApiError>> + Send;

    /// Get the name/identifier of this API client
    fn name(&self) -> &'static str;
}

/// Transport-level failures when talking to Redash
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum ApiError {
    /// The request could not be sent or the body could not be read
    #[error("HTTP request failed: {message}")]
    Http { message: String },

    /// The request did not complete in time
    #[error("Request timeout after {timeout_seconds} seconds")]
    Timeout { timeout_seconds: u64 },

    /// The requested resource does not exist
    #[error("Resource not found: {message}")]
    NotFound { message: String },

    /// The server reported an internal error
    #[error("Internal server error: {message}")]
    ServerError { message: String },

    /// The API key was rejected
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Any other unsuccessful status
    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },

    /// The body did not have the expected shape
    #[error("Invalid response format: {message}")]
    MalformedResponse { message: String },

    /// The request could not be built from the client configuration
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl ApiError {
    /// Whether the server reported the resource as missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    /// Whether Redash answered with a missing resource in either of its two forms
    ///
    /// Redash reports some missing resources (deleted data sources, unknown group
    /// ids) with its literal internal-server-error body instead of a 404. Other
    /// 500 replies are `Status` errors and do not count.
    pub fn is_missing_resource(&self) -> bool {
        matches!(
            self,
            ApiError::NotFound { .. } | ApiError::ServerError { .. }
        )
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        ApiError::MalformedResponse {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_resource_covers_both_shapes() {
        let not_found = ApiError::NotFound {
            message: "gone".to_string(),
        };
        let server_error = ApiError::ServerError {
            message: "Internal Server Error".to_string(),
        };
        let status = ApiError::Status {
            status: 502,
            message: "Bad Gateway".to_string(),
        };

        assert!(not_found.is_not_found());
        assert!(not_found.is_missing_resource());
        assert!(!server_error.is_not_found());
        assert!(server_error.is_missing_resource());
        assert!(!status.is_missing_resource());
    }

    #[test]
    fn error_messages() {
        let error = ApiError::Status {
            status: 503,
            message: "maintenance".to_string(),
        };
        assert_eq!(error.to_string(), "API error: 503 - maintenance");

        let error = ApiError::Timeout { timeout_seconds: 5 };
        assert_eq!(error.to_string(), "Request timeout after 5 seconds");
    }
}
