// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration schema definitions for taskgate.
//!
//! # Schema Structure
//!
//! ```text
//! TaskgateConfig
//! ├── server: ServerConfig
//! │   └── cors: CorsConfig
//! ├── database: DatabaseConfig
//! ├── security: SecurityConfig
//! │   ├── jwt: JwtConfig
//! │   ├── password: PasswordConfig
//! │   └── cookie: CookieConfig
//! └── logging: LoggingConfig
//! ```

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

// =============================================================================
// Constants
// =============================================================================

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default session lifetime in seconds (1 hour).
pub const DEFAULT_JWT_EXPIRATION_SECS: u64 = 3600;

/// Longest accepted session lifetime in seconds (365 days).
pub const MAX_JWT_EXPIRATION_SECS: u64 = 365 * 24 * 60 * 60;

/// Environment variable holding the session signing key.
pub const DEFAULT_JWT_SECRET_ENV: &str = "JWT_SECRET_KEY";

/// Default session cookie name.
pub const DEFAULT_COOKIE_NAME: &str = "jwt";

/// Role assigned to newly registered users.
pub const DEFAULT_ROLE: &str = "user";

/// Default front-end origin allowed by CORS.
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:5173";

/// Argon2 memory cost in KiB (64 MiB).
pub const DEFAULT_PASSWORD_MEMORY_KIB: u32 = 65_536;

/// Argon2 iteration count.
pub const DEFAULT_PASSWORD_ITERATIONS: u32 = 3;

/// Argon2 lane count.
pub const DEFAULT_PASSWORD_PARALLELISM: u32 = 1;

// =============================================================================
// Root Configuration
// =============================================================================

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskgateConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Document store settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Authentication settings.
    #[serde(default)]
    pub security: SecurityConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TaskgateConfig {
    /// Validates the entire configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.server.validate()?;
        self.database.validate()?;
        self.security.validate()?;
        Ok(())
    }
}

// =============================================================================
// Server Configuration
// =============================================================================

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_bind_address")]
    pub bind_address: IpAddr,

    /// Listen port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Per-request deadline in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// CORS settings.
    #[serde(default)]
    pub cors: CorsConfig,
}

fn default_bind_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0))
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl ServerConfig {
    /// Returns the socket address to listen on.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }

    /// Returns the request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validates the server configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::validation(
                "server.request_timeout_secs",
                "must be greater than 0",
            ));
        }
        self.cors.validate()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
            cors: CorsConfig::default(),
        }
    }
}

/// CORS settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins. `"*"` allows any origin.
    #[serde(default = "default_origins")]
    pub allowed_origins: Vec<String>,

    /// Allowed methods.
    #[serde(default = "default_methods")]
    pub allowed_methods: Vec<String>,

    /// Whether browsers may send cookies.
    #[serde(default = "default_true")]
    pub allow_credentials: bool,

    /// Preflight cache lifetime in seconds.
    #[serde(default = "default_max_age")]
    pub max_age_secs: u64,
}

fn default_origins() -> Vec<String> {
    vec![DEFAULT_ALLOWED_ORIGIN.to_string()]
}

fn default_methods() -> Vec<String> {
    ["GET", "POST", "PUT", "DELETE"]
        .iter()
        .map(|m| m.to_string())
        .collect()
}

fn default_true() -> bool {
    true
}

fn default_max_age() -> u64 {
    3600
}

impl CorsConfig {
    /// Returns `true` when any origin is allowed.
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }

    /// Validates the CORS configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.allows_any_origin() && self.allow_credentials {
            return Err(ConfigError::validation(
                "server.cors",
                "allow_credentials cannot be combined with a wildcard origin",
            ));
        }
        Ok(())
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_origins(),
            allowed_methods: default_methods(),
            allow_credentials: true,
            max_age_secs: default_max_age(),
        }
    }
}

// =============================================================================
// Database Configuration
// =============================================================================

/// Storage backend selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    /// In-process store; data is lost on exit.
    #[default]
    Memory,
    /// RocksDB store at `database.path`.
    Rocksdb,
}

impl DatabaseBackend {
    /// Returns the backend name.
    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseBackend::Memory => "memory",
            DatabaseBackend::Rocksdb => "rocksdb",
        }
    }
}

impl std::str::FromStr for DatabaseBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(DatabaseBackend::Memory),
            "rocksdb" => Ok(DatabaseBackend::Rocksdb),
            other => Err(ConfigError::validation(
                "database.backend",
                format!("unknown backend '{}'", other),
            )),
        }
    }
}

/// Document store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Backend to use.
    #[serde(default)]
    pub backend: DatabaseBackend,

    /// Data directory for persistent backends.
    #[serde(default = "default_database_path")]
    pub path: PathBuf,

    /// Logical database name.
    #[serde(default = "default_database_name")]
    pub name: String,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("./data")
}

fn default_database_name() -> String {
    "taskgate".to_string()
}

impl DatabaseConfig {
    /// Returns the on-disk location of this database.
    pub fn data_dir(&self) -> PathBuf {
        self.path.join(&self.name)
    }

    /// Validates the database configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::missing_field("database.name"));
        }
        Ok(())
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: DatabaseBackend::default(),
            path: default_database_path(),
            name: default_database_name(),
        }
    }
}

// =============================================================================
// Security Configuration
// =============================================================================

/// Authentication settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Session token settings.
    #[serde(default)]
    pub jwt: JwtConfig,

    /// Password hashing cost.
    #[serde(default)]
    pub password: PasswordConfig,

    /// Session cookie attributes.
    #[serde(default)]
    pub cookie: CookieConfig,

    /// Role given to newly registered users.
    #[serde(default = "default_role")]
    pub default_role: String,
}

fn default_role() -> String {
    DEFAULT_ROLE.to_string()
}

impl SecurityConfig {
    /// Validates the security configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.jwt.validate()?;
        self.password.validate()?;
        self.cookie.validate()?;
        if self.default_role.trim().is_empty() {
            return Err(ConfigError::missing_field("security.default_role"));
        }
        Ok(())
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt: JwtConfig::default(),
            password: PasswordConfig::default(),
            cookie: CookieConfig::default(),
            default_role: default_role(),
        }
    }
}

/// Session token settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Signing key. Usually left unset and read from `secret_env`.
    #[serde(default, skip_serializing)]
    pub secret: Option<SecretValue>,

    /// Environment variable consulted when `secret` is unset.
    #[serde(default = "default_secret_env")]
    pub secret_env: String,

    /// Token lifetime in seconds.
    #[serde(default = "default_jwt_expiration")]
    pub expiration_secs: u64,

    /// Clock skew tolerance in seconds.
    #[serde(default)]
    pub leeway_secs: u64,
}

fn default_secret_env() -> String {
    DEFAULT_JWT_SECRET_ENV.to_string()
}

fn default_jwt_expiration() -> u64 {
    DEFAULT_JWT_EXPIRATION_SECS
}

impl JwtConfig {
    /// Returns `true` if a non-empty signing key is present.
    pub fn has_secret(&self) -> bool {
        self.secret.as_ref().is_some_and(|s| !s.is_empty())
    }

    /// Validates the token configuration.
    ///
    /// A missing key is not an error here; the commands that sign tokens
    /// check for it.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.expiration_secs == 0 {
            return Err(ConfigError::validation(
                "security.jwt.expiration_secs",
                "must be greater than 0",
            ));
        }
        if self.expiration_secs > MAX_JWT_EXPIRATION_SECS {
            return Err(ConfigError::validation(
                "security.jwt.expiration_secs",
                format!("must be at most {MAX_JWT_EXPIRATION_SECS}"),
            ));
        }
        if self.secret_env.trim().is_empty() {
            return Err(ConfigError::missing_field("security.jwt.secret_env"));
        }
        Ok(())
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: None,
            secret_env: default_secret_env(),
            expiration_secs: default_jwt_expiration(),
            leeway_secs: 0,
        }
    }
}

/// Argon2 cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordConfig {
    /// Memory cost in KiB.
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,

    /// Number of passes.
    #[serde(default = "default_iterations")]
    pub iterations: u32,

    /// Degree of parallelism.
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

fn default_memory_kib() -> u32 {
    DEFAULT_PASSWORD_MEMORY_KIB
}

fn default_iterations() -> u32 {
    DEFAULT_PASSWORD_ITERATIONS
}

fn default_parallelism() -> u32 {
    DEFAULT_PASSWORD_PARALLELISM
}

impl PasswordConfig {
    /// Validates the hashing parameters.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.memory_kib < 8 * self.parallelism.max(1) {
            return Err(ConfigError::out_of_range(
                "security.password.memory_kib",
                self.memory_kib,
                8 * self.parallelism.max(1),
                u32::MAX,
            ));
        }
        if self.iterations == 0 {
            return Err(ConfigError::out_of_range(
                "security.password.iterations",
                self.iterations,
                1,
                u32::MAX,
            ));
        }
        if self.parallelism == 0 {
            return Err(ConfigError::out_of_range(
                "security.password.parallelism",
                self.parallelism,
                1,
                u32::MAX,
            ));
        }
        Ok(())
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

/// `SameSite` cookie attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    /// `SameSite=Strict`
    Strict,
    /// `SameSite=Lax`
    #[default]
    Lax,
    /// `SameSite=None` (requires `secure`).
    None,
}

/// Session cookie attributes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieConfig {
    /// Cookie name.
    #[serde(default = "default_cookie_name")]
    pub name: String,

    /// Whether to set the `Secure` attribute.
    #[serde(default)]
    pub secure: bool,

    /// `SameSite` attribute.
    #[serde(default)]
    pub same_site: SameSite,
}

fn default_cookie_name() -> String {
    DEFAULT_COOKIE_NAME.to_string()
}

impl CookieConfig {
    /// Validates the cookie configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        let valid_name = !self.name.is_empty()
            && self
                .name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid_name {
            return Err(ConfigError::validation(
                "security.cookie.name",
                "must be non-empty and contain only letters, digits, '_' or '-'",
            ));
        }
        if self.same_site == SameSite::None && !self.secure {
            return Err(ConfigError::validation(
                "security.cookie.same_site",
                "SameSite=None requires secure = true",
            ));
        }
        Ok(())
    }
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: default_cookie_name(),
            secure: false,
            same_site: SameSite::default(),
        }
    }
}

// =============================================================================
// Logging Configuration
// =============================================================================

/// Log level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Returns the level as a filter directive.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(ConfigError::validation(
                "logging.level",
                format!("unknown level '{}'", other),
            )),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
    /// Condensed text.
    Compact,
}

/// Logging settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

// =============================================================================
// Secret Value
// =============================================================================

/// A secret string that never appears in logs or `Debug` output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretValue(String);

impl SecretValue {
    /// Creates a new secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the secret.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the secret is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretValue(***)")
    }
}

impl fmt::Display for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}
