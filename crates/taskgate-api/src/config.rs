// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API server configuration.
//!
//! This is the runtime view the server needs; the binary maps the file-level
//! configuration onto it.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::auth::{PasswordParams, SessionCookie, TokenConfig, USER_ROLE};

/// Origin of the bundled web client.
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:5173";

// =============================================================================
// ApiConfig
// =============================================================================

/// Configuration for the API server.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host address.
    pub host: IpAddr,
    /// Server port.
    pub port: u16,
    /// Request deadline.
    pub request_timeout: Duration,
    /// CORS configuration.
    pub cors: CorsConfig,
    /// Session token settings.
    pub token: TokenConfig,
    /// Password hashing cost.
    pub password: PasswordParams,
    /// Session cookie attributes.
    pub cookie: SessionCookie,
    /// Role assigned at registration.
    pub default_role: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 8080,
            request_timeout: Duration::from_secs(30),
            cors: CorsConfig::default(),
            token: TokenConfig::default(),
            password: PasswordParams::default(),
            cookie: SessionCookie::default(),
            default_role: USER_ROLE.to_string(),
        }
    }
}

impl ApiConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Sets the host address.
    pub fn with_host(mut self, host: IpAddr) -> Self {
        self.host = host;
        self
    }

    /// Sets the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the request deadline.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the CORS configuration.
    pub fn with_cors(mut self, cors: CorsConfig) -> Self {
        self.cors = cors;
        self
    }

    /// Sets the session token configuration.
    pub fn with_token(mut self, token: TokenConfig) -> Self {
        self.token = token;
        self
    }

    /// Sets the password hashing parameters.
    pub fn with_password(mut self, password: PasswordParams) -> Self {
        self.password = password;
        self
    }

    /// Sets the session cookie attributes.
    pub fn with_cookie(mut self, cookie: SessionCookie) -> Self {
        self.cookie = cookie;
        self
    }

    /// Sets the role assigned at registration.
    pub fn with_default_role(mut self, role: impl Into<String>) -> Self {
        self.default_role = role.into();
        self
    }
}

// =============================================================================
// CorsConfig
// =============================================================================

/// CORS (Cross-Origin Resource Sharing) configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsConfig {
    /// Allowed origins; `*` allows any.
    pub allowed_origins: Vec<String>,
    /// Allowed methods.
    pub allowed_methods: Vec<String>,
    /// Whether to allow credentials. Ignored for wildcard origins.
    pub allow_credentials: bool,
    /// Max age for preflight cache.
    pub max_age: Duration,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![DEFAULT_ALLOWED_ORIGIN.to_string()],
            allowed_methods: ["GET", "POST", "PUT", "DELETE"]
                .into_iter()
                .map(String::from)
                .collect(),
            allow_credentials: true,
            max_age: Duration::from_secs(3600),
        }
    }
}

impl CorsConfig {
    /// Creates a permissive configuration for development.
    pub fn permissive() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            allow_credentials: false,
            ..Self::default()
        }
    }

    /// Returns `true` if any origin is allowed.
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.default_role, "user");
        assert_eq!(config.cors.allowed_origins, vec![DEFAULT_ALLOWED_ORIGIN]);
    }

    #[test]
    fn test_socket_addr() {
        let config = ApiConfig::default()
            .with_host(IpAddr::V4(Ipv4Addr::LOCALHOST))
            .with_port(9000);
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:9000");
    }

    #[test]
    fn test_cors_wildcard() {
        assert!(!CorsConfig::default().allows_any_origin());
        let permissive = CorsConfig::permissive();
        assert!(permissive.allows_any_origin());
        assert!(!permissive.allow_credentials);
    }
}
