// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API error types and handling.
//!
//! Every failure in the authorization engine and the task service is one of
//! the kinds below, and each kind maps to exactly one HTTP status.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use taskgate_core::{IdError, StoreError};
use thiserror::Error;

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Public message for every rejected session token.
pub const INVALID_SESSION_MESSAGE: &str = "Invalid or expired token";

/// Public message for every rejected login.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";

// =============================================================================
// ApiError
// =============================================================================

/// API error type with HTTP status code mapping.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, invalid, expired or tampered credentials (401).
    ///
    /// `message` is shown to the caller and never says which check failed.
    #[error("Authentication failed: {message}")]
    Authentication {
        /// Public message.
        message: &'static str,
    },

    /// Valid session without the required permission (403).
    #[error("Permission denied: {permission}")]
    Authorization {
        /// The permission that was required.
        permission: String,
    },

    /// Resource not found (404).
    #[error("Resource not found: {resource}")]
    NotFound {
        /// The resource that was not found.
        resource: String,
    },

    /// Malformed identifier or request body (400).
    #[error("Validation error: {message}")]
    Validation {
        /// Error message.
        message: String,
        /// Field-specific errors.
        #[source]
        errors: Option<ValidationErrors>,
    },

    /// Unique constraint violated (409).
    #[error("Conflict: {message}")]
    Conflict {
        /// Error message.
        message: String,
    },

    /// Server is missing required configuration (500).
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message (for logging, not user-facing).
        message: String,
    },

    /// A dependency is not ready (503).
    #[error("Service unavailable: {message}")]
    ServiceUnavailable {
        /// Error message.
        message: String,
    },

    /// Store or infrastructure failure (500).
    #[error("Internal error: {message}")]
    Internal {
        /// Error message (for logging, not user-facing).
        message: String,
    },
}

impl ApiError {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Rejected session token.
    pub fn invalid_session() -> Self {
        Self::Authentication {
            message: INVALID_SESSION_MESSAGE,
        }
    }

    /// Rejected email/password pair.
    pub fn invalid_credentials() -> Self {
        Self::Authentication {
            message: INVALID_CREDENTIALS_MESSAGE,
        }
    }

    /// Creates an authorization error for `permission`.
    pub fn forbidden(permission: impl Into<String>) -> Self {
        Self::Authorization {
            permission: permission.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            errors: None,
        }
    }

    /// Creates a validation error with field errors.
    pub fn validation_with_errors(message: impl Into<String>, errors: ValidationErrors) -> Self {
        Self::Validation {
            message: message.into(),
            errors: Some(errors),
        }
    }

    /// Creates a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a service unavailable error.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Authentication { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Authorization { .. } => StatusCode::FORBIDDEN,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code for categorization.
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Authentication { .. } => "UNAUTHORIZED",
            ApiError::Authorization { .. } => "FORBIDDEN",
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::Conflict { .. } => "CONFLICT",
            ApiError::Configuration { .. } => "CONFIGURATION_ERROR",
            ApiError::ServiceUnavailable { .. } => "SERVICE_UNAVAILABLE",
            ApiError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Returns a message that is safe to show to callers.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Authentication { message } => (*message).to_string(),
            ApiError::Authorization { .. } => "Permission denied".to_string(),
            ApiError::NotFound { resource } => format!("{} not found", capitalize(resource)),
            ApiError::Validation { message, .. } => message.clone(),
            ApiError::Conflict { message } => message.clone(),
            ApiError::Configuration { .. } | ApiError::Internal { .. } => {
                "Internal server error".to_string()
            }
            ApiError::ServiceUnavailable { .. } => "Service temporarily unavailable".to_string(),
        }
    }

    /// Returns `true` if this error should be logged at error level.
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            ApiError::Validation {
                errors: Some(errors),
                ..
            } => serde_json::to_value(errors).ok(),
            ApiError::Authorization { permission } => {
                Some(serde_json::json!({ "required_permission": permission }))
            }
            _ => None,
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// =============================================================================
// IntoResponse Implementation
// =============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        if self.is_server_error() {
            tracing::error!(
                error = %self,
                error_code = error_code,
                status = %status,
                "Server error occurred"
            );
        } else {
            tracing::debug!(
                error = %self,
                error_code = error_code,
                status = %status,
                "Client error occurred"
            );
        }

        let body = ErrorResponseBody {
            error: ErrorDetails {
                code: error_code.to_string(),
                message: self.user_message(),
                details: self.error_details(),
            },
        };

        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Error Response Body
// =============================================================================

/// Error response body structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponseBody {
    /// Error details.
    pub error: ErrorDetails,
}

/// Error details within the response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional error details (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Collection of field validation errors.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ValidationErrors {
    /// Field-specific errors.
    pub fields: Vec<FieldError>,
}

impl ValidationErrors {
    /// Creates a new validation errors collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field error.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Returns `true` if there are no errors.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Converts to an ApiError if there are errors.
    pub fn into_result<T>(self, success: T) -> ApiResult<T> {
        if self.is_empty() {
            Ok(success)
        } else {
            Err(ApiError::validation_with_errors("Validation failed", self))
        }
    }
}

impl std::error::Error for ValidationErrors {}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} validation errors", self.fields.len())
    }
}

/// A single field validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldError {
    /// Field name.
    pub field: String,
    /// Error message.
    pub message: String,
}

// =============================================================================
// From Implementations
// =============================================================================

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateKey { collection, field } => {
                ApiError::conflict(format!("A record in {} with this {} already exists", collection, field))
            }
            other => ApiError::internal(other.to_string()),
        }
    }
}

impl From<IdError> for ApiError {
    fn from(err: IdError) -> Self {
        ApiError::validation(format!("Invalid ID: {}", err))
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::validation(format!("Invalid JSON: {}", err))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(ApiError::invalid_session().status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::invalid_credentials().status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::forbidden("create_task").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::not_found("task").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::validation("bad").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::conflict("dup").status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::configuration("no key").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::internal("crash").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_server_errors_hide_details() {
        let err = ApiError::internal("connection reset by peer");
        assert_eq!(err.user_message(), "Internal server error");
        assert!(err.is_server_error());

        let err = ApiError::configuration("JWT_SECRET_KEY is not set");
        assert!(!err.user_message().contains("JWT_SECRET_KEY"));
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(ApiError::not_found("task").user_message(), "Task not found");
    }

    #[test]
    fn test_duplicate_key_maps_to_conflict() {
        let err: ApiError = StoreError::duplicate_key("users", "email").into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);

        let err: ApiError = StoreError::NotConnected.into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_invalid_id_maps_to_validation() {
        let err: ApiError = IdError::InvalidLength(3).into();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_validation_errors() {
        let mut errors = ValidationErrors::new();
        assert!(errors.is_empty());
        assert!(errors.clone().into_result(()).is_ok());

        errors.add("email", "must contain '@'");
        errors.add("password", "is required");
        assert_eq!(errors.fields.len(), 2);

        let err = errors.into_result(()).unwrap_err();
        let details = err.error_details().unwrap();
        assert_eq!(details["fields"][0]["field"], "email");
    }
}
