// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication handlers.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::auth::NewAccount;
use crate::error::{ApiError, ApiResult, ValidationErrors};
use crate::extractors::{SessionToken, ValidatedJson};
use crate::response::{LoginResponse, MessageResponse, UserResponse};
use crate::state::AppState;

// =============================================================================
// Register
// =============================================================================

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Login email.
    #[serde(default)]
    pub email: String,
    /// Plaintext password.
    #[serde(default)]
    pub password: String,
}

/// POST /api/register
///
/// Creates an account with the default role.
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .credentials
        .register(NewAccount {
            name: &request.name,
            email: &request.email,
            password: &request.password,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

// =============================================================================
// Login
// =============================================================================

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email or user id.
    #[serde(default)]
    pub email: String,
    /// Plaintext password.
    #[serde(default)]
    pub password: String,
}

impl LoginRequest {
    /// Both fields must be present before credentials are checked.
    pub fn validate(&self) -> ApiResult<()> {
        let mut errors = ValidationErrors::new();
        if self.email.trim().is_empty() {
            errors.add("email", "is required");
        }
        if self.password.is_empty() {
            errors.add("password", "is required");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_with_errors(
                "Email and password are required",
                errors,
            ))
        }
    }
}

/// POST /api/login
///
/// Verifies credentials, issues a session token and sets the session cookie.
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    request.validate()?;

    let user = match state.credentials.verify(&request.email, &request.password).await {
        Ok(user) => user,
        Err(e) => {
            if matches!(e, ApiError::Authentication { .. }) {
                tracing::warn!("Login failed");
            }
            return Err(e);
        }
    };

    let issued = state.tokens().issue(user.id, user.role_id.to_hex())?;
    let cookie = state.cookie.session(&issued.token, issued.expires_at())?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse::new(&issued)),
    ))
}

// =============================================================================
// Current User
// =============================================================================

/// GET /api/user
///
/// Returns the account named by the session token.
pub async fn current_user(
    State(state): State<AppState>,
    SessionToken(token): SessionToken,
) -> ApiResult<impl IntoResponse> {
    let (_, user) = state.resolver.authenticate(&token).await?;
    Ok(Json(UserResponse::from(&user)))
}

// =============================================================================
// Logout
// =============================================================================

/// POST /api/logout
///
/// Clears the session cookie. The token itself stays valid until it expires.
pub async fn logout(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let cookie = state.cookie.cleared()?;
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(MessageResponse::new("success")),
    ))
}

// =============================================================================
// Tests
// =============================================================================
