// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # taskgate-config
//!
//! Configuration management for the taskgate service.
//!
//! ## Quick Start
//!
//! ```no_run
//! use taskgate_config::loader::load_config;
//!
//! let config = load_config("taskgate.yaml").unwrap();
//! println!("Listening on {}", config.server.socket_addr());
//! ```
//!
//! ## Configuration Schema
//!
//! - `server` - Listen address, request timeout and CORS
//! - `database` - Document store backend
//! - `security` - Session tokens, password hashing, cookie, default role
//! - `logging` - Level and output format
//!
//! ## Environment Variables
//!
//! ```text
//! TASKGATE_PORT=9090
//! TASKGATE_DATABASE_BACKEND=rocksdb
//! TASKGATE_LOG_LEVEL=debug
//! JWT_SECRET_KEY=change-me
//! ```
//!
//! Values in config files can reference environment variables:
//!
//! ```yaml
//! database:
//!   path: "${DATA_DIR:./data}"
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod error;
pub mod loader;
pub mod schema;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_config, load_config_str, ConfigFormat, ConfigLoader, EnvSource};
pub use schema::{
    CookieConfig, CorsConfig, DatabaseBackend, DatabaseConfig, JwtConfig, LogFormat, LogLevel,
    LoggingConfig, PasswordConfig, SameSite, SecretValue, SecurityConfig, ServerConfig,
    TaskgateConfig,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name() {
        assert_eq!(NAME, "taskgate-config");
    }
}
