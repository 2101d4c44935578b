// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Config Integration Tests
//!
//! Loading configuration files from disk through the full pipeline.
//!
//! ## Test Categories
//!
//! - `test_config_file_*`: YAML, TOML and JSON files
//! - `test_config_env_*`: placeholders, overrides and the signing key
//! - `test_config_invalid_*`: rejected configurations

use std::fs;
use std::path::PathBuf;

use taskgate_config::{
    ConfigError, ConfigLoader, DatabaseBackend, EnvSource, LogFormat, LogLevel, SameSite,
};
use taskgate_tests::prelude::*;

const FULL_YAML: &str = r#"
server:
  bind_address: "127.0.0.1"
  port: 9000
  request_timeout_secs: 10
  cors:
    allowed_origins: ["https://app.example.com"]
    allow_credentials: true
database:
  backend: rocksdb
  path: "${DATA_DIR:/var/lib/taskgate}"
  name: tasks
security:
  jwt:
    expiration_secs: 1800
  cookie:
    name: session
    secure: true
    same_site: strict
  default_role: user
logging:
  level: debug
  format: json
"#;

fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn loader(vars: &[(&str, &str)]) -> ConfigLoader {
    ConfigLoader::new().with_env(vars.iter().copied().collect::<EnvSource>())
}

// =============================================================================
// File Tests
// =============================================================================

#[test]
fn test_config_file_yaml() {
    let dir = temp_test_dir("taskgate-config");
    let path = write(&dir, "taskgate.yaml", FULL_YAML);

    let config = loader(&[]).load(&path).unwrap();

    assert_eq!(config.server.socket_addr().to_string(), "127.0.0.1:9000");
    assert_eq!(config.server.request_timeout().as_secs(), 10);
    assert_eq!(config.server.cors.allowed_origins, vec!["https://app.example.com"]);
    assert_eq!(config.database.backend, DatabaseBackend::Rocksdb);
    assert_eq!(config.database.data_dir(), PathBuf::from("/var/lib/taskgate/tasks"));
    assert_eq!(config.security.jwt.expiration_secs, 1800);
    assert_eq!(config.security.cookie.name, "session");
    assert_eq!(config.security.cookie.same_site, SameSite::Strict);
    assert_eq!(config.logging.level, LogLevel::Debug);
    assert_eq!(config.logging.format, LogFormat::Json);
    assert!(!config.security.jwt.has_secret());
}

#[test]
fn test_config_file_toml() {
    let dir = temp_test_dir("taskgate-config");
    let path = write(
        &dir,
        "taskgate.toml",
        r#"
[server]
port = 8181

[security.jwt]
secret = "toml-secret"
leeway_secs = 5
"#,
    );

    let config = loader(&[]).load(&path).unwrap();
    assert_eq!(config.server.port, 8181);
    assert_eq!(config.security.jwt.leeway_secs, 5);
    assert_eq!(
        config.security.jwt.secret.as_ref().map(|s| s.expose()),
        Some("toml-secret")
    );
    assert_eq!(config.security.default_role, "user");
}

#[test]
fn test_config_file_json() {
    let dir = temp_test_dir("taskgate-config");
    let path = write(
        &dir,
        "taskgate.json",
        r#"{ "database": { "backend": "memory", "name": "scratch" } }"#,
    );

    let config = loader(&[]).load(&path).unwrap();
    assert_eq!(config.database.backend, DatabaseBackend::Memory);
    assert_eq!(config.database.name, "scratch");
    assert_eq!(config.server.port, 8080);
}

#[test]
fn test_config_file_missing_uses_defaults() {
    let dir = temp_test_dir("taskgate-config");
    let path = dir.path().join("absent.yaml");

    assert!(matches!(
        loader(&[]).load(&path),
        Err(ConfigError::FileNotFound { .. })
    ));

    let config = loader(&[("TASKGATE_PORT", "7070")])
        .load_or_default(Some(&path))
        .unwrap();
    assert_eq!(config.server.port, 7070);
}

// =============================================================================
// Environment Tests
// =============================================================================

#[test]
fn test_config_env_placeholders_and_overrides() {
    let dir = temp_test_dir("taskgate-config");
    let path = write(&dir, "taskgate.yml", FULL_YAML);

    let config = loader(&[
        ("DATA_DIR", "/srv/data"),
        ("TASKGATE_PORT", "9999"),
        ("TASKGATE_DATABASE_BACKEND", "memory"),
        ("TASKGATE_LOG_LEVEL", "warn"),
    ])
    .load(&path)
    .unwrap();

    assert_eq!(config.database.data_dir(), PathBuf::from("/srv/data/tasks"));
    assert_eq!(config.server.port, 9999);
    assert_eq!(config.database.backend, DatabaseBackend::Memory);
    assert_eq!(config.logging.level, LogLevel::Warn);
}

#[test]
fn test_config_env_signing_key() {
    let dir = temp_test_dir("taskgate-config");
    let path = write(&dir, "taskgate.yaml", FULL_YAML);

    let config = loader(&[("JWT_SECRET_KEY", "from-env")]).load(&path).unwrap();
    assert_eq!(
        config.security.jwt.secret.as_ref().map(|s| s.expose()),
        Some("from-env")
    );

    // The key never appears in serialized output.
    let dumped = serde_json::to_string(&config).unwrap();
    assert!(!dumped.contains("from-env"));
}

#[test]
fn test_config_env_invalid_override() {
    let err = loader(&[("TASKGATE_PORT", "eighty")])
        .load_or_default(None)
        .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref name, .. } if name == "TASKGATE_PORT"));
}

// =============================================================================
// Invalid Configuration Tests
// =============================================================================

#[test]
fn test_config_invalid_wildcard_with_credentials() {
    let dir = temp_test_dir("taskgate-config");
    let path = write(
        &dir,
        "taskgate.yaml",
        "server:\n  cors:\n    allowed_origins: [\"*\"]\n    allow_credentials: true\n",
    );

    assert!(matches!(
        loader(&[]).load(&path),
        Err(ConfigError::Validation { .. })
    ));
}

#[test]
fn test_config_invalid_same_site_none_without_secure() {
    let dir = temp_test_dir("taskgate-config");
    let path = write(
        &dir,
        "taskgate.yaml",
        "security:\n  cookie:\n    same_site: none\n",
    );

    let err = loader(&[]).load(&path).unwrap_err();
    assert!(err.to_string().contains("security.cookie.same_site"));
}

#[test]
fn test_config_invalid_syntax_names_file() {
    let dir = temp_test_dir("taskgate-config");
    let path = write(&dir, "broken.yaml", "server: [unclosed");

    let err = loader(&[]).load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("broken.yaml"));
}

#[test]
fn test_config_invalid_extension() {
    let dir = temp_test_dir("taskgate-config");
    let path = write(&dir, "taskgate.ini", "port=1");

    assert!(matches!(
        loader(&[]).load(&path),
        Err(ConfigError::UnsupportedFormat { .. })
    ));
}
