// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The session cookie.

use axum::http::{header, HeaderMap, HeaderValue};
use chrono::{DateTime, Duration, Utc};

use crate::error::{ApiError, ApiResult};

/// Default cookie name.
pub const DEFAULT_COOKIE_NAME: &str = "jwt";

/// `Expires` date format (RFC 7231 IMF-fixdate).
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// `SameSite` attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SameSite {
    /// `SameSite=Strict`
    Strict,
    /// `SameSite=Lax`
    #[default]
    Lax,
    /// `SameSite=None`
    None,
}

impl SameSite {
    fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// Renders and reads the HTTP-only cookie that carries the session token.
#[derive(Debug, Clone)]
pub struct SessionCookie {
    name: String,
    secure: bool,
    same_site: SameSite,
}

impl SessionCookie {
    /// Creates a cookie named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            secure: false,
            same_site: SameSite::Lax,
        }
    }

    /// Sets the `Secure` attribute.
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Sets the `SameSite` attribute.
    pub fn with_same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = same_site;
        self
    }

    /// Returns the cookie name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `Set-Cookie` value carrying `token` until `expires`.
    pub fn session(&self, token: &str, expires: DateTime<Utc>) -> ApiResult<HeaderValue> {
        self.render(token, expires)
    }

    /// `Set-Cookie` value that removes the cookie.
    pub fn cleared(&self) -> ApiResult<HeaderValue> {
        self.render("", Utc::now() - Duration::hours(1))
    }

    fn render(&self, value: &str, expires: DateTime<Utc>) -> ApiResult<HeaderValue> {
        let mut cookie = format!(
            "{}={}; Path=/; Expires={}; HttpOnly; SameSite={}",
            self.name,
            value,
            expires.format(HTTP_DATE_FORMAT),
            self.same_site.as_str()
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie)
            .map_err(|e| ApiError::internal(format!("Invalid cookie value: {}", e)))
    }

    /// Reads this cookie from request headers.
    ///
    /// Empty values are treated as absent.
    pub fn extract(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, value)| *name == self.name && !value.is_empty())
            .map(|(_, value)| value.to_string())
    }
}

impl Default for SessionCookie {
    fn default() -> Self {
        Self::new(DEFAULT_COOKIE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_session_cookie_attributes() {
        let expires = Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap();
        let value = SessionCookie::default().session("abc.def.ghi", expires).unwrap();
        let value = value.to_str().unwrap();

        assert!(value.starts_with("jwt=abc.def.ghi;"));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("Path=/"));
        assert!(value.contains("SameSite=Lax"));
        assert!(value.contains("Expires=Wed, 02 Jan 2030 03:04:05 GMT"));
        assert!(!value.contains("Secure"));
    }

    #[test]
    fn test_secure_flag() {
        let cookie = SessionCookie::new("sid")
            .with_secure(true)
            .with_same_site(SameSite::Strict);
        let value = cookie.session("t", Utc::now()).unwrap();
        let value = value.to_str().unwrap();

        assert!(value.starts_with("sid=t;"));
        assert!(value.ends_with("; Secure"));
        assert!(value.contains("SameSite=Strict"));
    }

    #[test]
    fn test_cleared_cookie_is_expired() {
        let value = SessionCookie::default().cleared().unwrap();
        let value = value.to_str().unwrap();
        assert!(value.starts_with("jwt=;"));

        let expires = value
            .split("; ")
            .find_map(|attr| attr.strip_prefix("Expires="))
            .unwrap();
        let parsed = chrono::NaiveDateTime::parse_from_str(expires, HTTP_DATE_FORMAT)
            .unwrap()
            .and_utc();
        assert!(parsed < Utc::now() - Duration::minutes(59));
    }

    #[test]
    fn test_extract() {
        let cookie = SessionCookie::default();
        let mut headers = HeaderMap::new();
        assert_eq!(cookie.extract(&headers), None);

        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; jwt=tok.en.value; other=1"),
        );
        assert_eq!(cookie.extract(&headers).as_deref(), Some("tok.en.value"));

        headers.insert(header::COOKIE, HeaderValue::from_static("jwt="));
        assert_eq!(cookie.extract(&headers), None);

        headers.insert(header::COOKIE, HeaderValue::from_static("notjwt=x"));
        assert_eq!(cookie.extract(&headers), None);
    }
}
