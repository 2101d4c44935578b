// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Custom extractors for API handlers.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
    Json,
};
use serde::de::DeserializeOwned;

use crate::auth::{AuthContext, SessionCookie};
use crate::error::ApiError;

// =============================================================================
// Session token lookup
// =============================================================================

/// Returns the session token carried by `headers`.
///
/// The session cookie wins; an `Authorization: Bearer` header is the
/// fallback.
pub fn session_token(headers: &HeaderMap, cookie: &SessionCookie) -> Option<String> {
    cookie.extract(headers).or_else(|| bearer_token(headers))
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_string())
}

/// Extractor for the raw session token.
///
/// Rejects with the uniform 401 when the request carries none.
pub struct SessionToken(pub String);

impl<S> FromRequestParts<S> for SessionToken
where
    SessionCookie: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let cookie = SessionCookie::from_ref(state);
        session_token(&parts.headers, &cookie)
            .map(SessionToken)
            .ok_or_else(ApiError::invalid_session)
    }
}

// =============================================================================
// Auth Extractor
// =============================================================================

/// Extractor for requests that passed the authorization guard.
///
/// Reads the [`AuthContext`] the guard stored in the request extensions.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(Auth(ctx): Auth) -> impl IntoResponse {
///     format!("Hello, {}", ctx.user_name)
/// }
/// ```
pub struct Auth(pub AuthContext);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .map(Auth)
            .ok_or_else(ApiError::invalid_session)
    }
}

// =============================================================================
// Validated JSON Extractor
// =============================================================================

/// Extractor for JSON payloads.
///
/// Malformed bodies and missing fields become a 400 validation error
/// instead of axum's plain-text rejection.
pub struct ValidatedJson<T>(pub T);

impl<S, T> axum::extract::FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(
        req: axum::http::Request<axum::body::Body>,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::validation(format!("Invalid JSON: {}", e.body_text())))?;

        Ok(ValidatedJson(value))
    }
}
