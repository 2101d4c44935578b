// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration loading and processing for taskgate.
//!
//! # Loading Pipeline
//!
//! 1. Read the file (a missing file is allowed through [`ConfigLoader::load_or_default`])
//! 2. Resolve `${VAR}` / `${VAR:default}` placeholders
//! 3. Parse YAML/TOML/JSON by extension
//! 4. Apply environment overrides
//! 5. Resolve the session signing key from `security.jwt.secret_env`
//! 6. Validate
//!
//! # Environment Variable Override
//!
//! ```text
//! TASKGATE_PORT=9090          (PORT is honoured when TASKGATE_PORT is unset)
//! TASKGATE_BIND_ADDRESS=127.0.0.1
//! TASKGATE_DATABASE_BACKEND=rocksdb
//! TASKGATE_DATABASE_PATH=/var/lib/taskgate
//! TASKGATE_LOG_LEVEL=debug
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::error::{ConfigError, ConfigResult};
use crate::schema::{DatabaseBackend, LogLevel, SecretValue, TaskgateConfig};

/// Default environment variable prefix.
pub const DEFAULT_ENV_PREFIX: &str = "TASKGATE";

// =============================================================================
// EnvSource
// =============================================================================

/// Where environment lookups are answered from.
#[derive(Debug, Clone, Default)]
pub enum EnvSource {
    /// The process environment.
    #[default]
    Process,
    /// A fixed map, used by tests and embedders.
    Map(HashMap<String, String>),
}

impl EnvSource {
    /// Looks up a variable. Empty values count as unset.
    pub fn get(&self, name: &str) -> Option<String> {
        let value = match self {
            EnvSource::Process => std::env::var(name).ok(),
            EnvSource::Map(map) => map.get(name).cloned(),
        };
        value.filter(|v| !v.is_empty())
    }
}

impl<K, V> FromIterator<(K, V)> for EnvSource
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        EnvSource::Map(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

// =============================================================================
// ConfigLoader
// =============================================================================

/// Configuration loader for taskgate.
///
/// # Examples
///
/// ```no_run
/// use taskgate_config::loader::ConfigLoader;
///
/// let config = ConfigLoader::new().load("taskgate.yaml").unwrap();
/// println!("listening on {}", config.server.socket_addr());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    env_prefix: String,
    env: EnvSource,
    resolve_env_vars: bool,
}

impl ConfigLoader {
    /// Creates a loader reading the process environment.
    pub fn new() -> Self {
        Self {
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
            env: EnvSource::Process,
            resolve_env_vars: true,
        }
    }

    /// Sets the environment variable prefix.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Replaces the environment source.
    pub fn with_env(mut self, env: EnvSource) -> Self {
        self.env = env;
        self
    }

    /// Enables or disables placeholders and environment overrides.
    ///
    /// The signing key is still read from `secret_env`.
    pub fn with_env_vars(mut self, enabled: bool) -> Self {
        self.resolve_env_vars = enabled;
        self
    }

    /// Loads configuration from a file.
    ///
    /// The format is chosen by extension: `.yaml`/`.yml`, `.toml` or `.json`.
    pub fn load(&self, path: impl AsRef<Path>) -> ConfigResult<TaskgateConfig> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading configuration");

        let content = self.read_file(path)?;
        let format = ConfigFormat::from_path(path)?;
        let config = self.parse_content(&content, format, path)?;
        self.finish(config)
    }

    /// Loads configuration from `path`, falling back to defaults when the
    /// file does not exist.
    pub fn load_or_default(&self, path: Option<&Path>) -> ConfigResult<TaskgateConfig> {
        match path {
            Some(path) if path.exists() => self.load(path),
            Some(path) => {
                warn!(
                    path = %path.display(),
                    "Config file not found, using defaults and environment"
                );
                self.finish(TaskgateConfig::default())
            }
            None => {
                debug!("No config file given, using defaults and environment");
                self.finish(TaskgateConfig::default())
            }
        }
    }

    /// Loads configuration from a string.
    pub fn load_from_str(
        &self,
        content: &str,
        format: ConfigFormat,
    ) -> ConfigResult<TaskgateConfig> {
        let content = self.maybe_resolve_placeholders(content);
        let config = parse_str(&content, format)?;
        self.finish(config)
    }

    fn finish(&self, mut config: TaskgateConfig) -> ConfigResult<TaskgateConfig> {
        if self.resolve_env_vars {
            self.apply_env_overrides(&mut config)?;
        }
        self.resolve_signing_key(&mut config);
        config.validate()?;

        debug!(
            port = config.server.port,
            backend = config.database.backend.as_str(),
            signing_key = config.security.jwt.has_secret(),
            "Configuration loaded"
        );
        Ok(config)
    }

    fn read_file(&self, path: &Path) -> ConfigResult<String> {
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }
        fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))
    }

    fn parse_content(
        &self,
        content: &str,
        format: ConfigFormat,
        path: &Path,
    ) -> ConfigResult<TaskgateConfig> {
        let content = self.maybe_resolve_placeholders(content);
        parse_str(&content, format).map_err(|e| match e {
            ConfigError::Serialization { message } => ConfigError::parse(path, message),
            other => other,
        })
    }

    fn maybe_resolve_placeholders(&self, content: &str) -> String {
        if self.resolve_env_vars {
            self.resolve_env_placeholders(content)
        } else {
            content.to_string()
        }
    }

    /// Resolves `${VAR_NAME}` and `${VAR_NAME:default}` placeholders.
    ///
    /// Unknown variables without a default are left untouched.
    fn resolve_env_placeholders(&self, content: &str) -> String {
        let mut result = String::with_capacity(content.len());
        let mut chars = content.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '$' || chars.peek() != Some(&'{') {
                result.push(c);
                continue;
            }
            chars.next();

            let mut var_content = String::new();
            let mut found_close = false;
            for c in chars.by_ref() {
                if c == '}' {
                    found_close = true;
                    break;
                }
                var_content.push(c);
            }

            if !found_close {
                result.push_str("${");
                result.push_str(&var_content);
                continue;
            }

            let (var_name, default_value) = match var_content.split_once(':') {
                Some((name, default)) => (name, Some(default)),
                None => (var_content.as_str(), None),
            };

            match (self.env.get(var_name), default_value) {
                (Some(value), _) => result.push_str(&value),
                (None, Some(default)) => result.push_str(default),
                (None, None) => {
                    warn!(variable = var_name, "Environment variable not found");
                    result.push_str(&format!("${{{}}}", var_name));
                }
            }
        }

        result
    }

    fn apply_env_overrides(&self, config: &mut TaskgateConfig) -> ConfigResult<()> {
        let prefixed = |suffix: &str| format!("{}_{}", self.env_prefix, suffix);

        let port_var = [prefixed("PORT"), "PORT".to_string()]
            .into_iter()
            .find_map(|name| self.env.get(&name).map(|value| (name, value)));
        if let Some((name, value)) = port_var {
            config.server.port = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid_env_var(name, "expected valid port number"))?;
        }

        let name = prefixed("BIND_ADDRESS");
        if let Some(value) = self.env.get(&name) {
            config.server.bind_address = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid_env_var(name, "expected IP address"))?;
        }

        let name = prefixed("DATABASE_BACKEND");
        if let Some(value) = self.env.get(&name) {
            config.database.backend = value
                .parse::<DatabaseBackend>()
                .map_err(|_| ConfigError::invalid_env_var(name, "expected 'memory' or 'rocksdb'"))?;
        }

        if let Some(value) = self.env.get(&prefixed("DATABASE_PATH")) {
            config.database.path = PathBuf::from(value);
        }

        let name = prefixed("LOG_LEVEL");
        if let Some(value) = self.env.get(&name) {
            config.logging.level = value
                .parse::<LogLevel>()
                .map_err(|_| ConfigError::invalid_env_var(name, "expected trace|debug|info|warn|error"))?;
        }

        Ok(())
    }

    /// Fills `security.jwt.secret` from the variable named by `secret_env`.
    fn resolve_signing_key(&self, config: &mut TaskgateConfig) {
        let jwt = &mut config.security.jwt;
        if jwt.has_secret() {
            return;
        }
        match self.env.get(&jwt.secret_env) {
            Some(value) => jwt.secret = Some(SecretValue::new(value)),
            None => debug!(variable = %jwt.secret_env, "No session signing key configured"),
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// ConfigFormat
// =============================================================================

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML format.
    Yaml,
    /// TOML format.
    Toml,
    /// JSON format.
    Json,
}

impl ConfigFormat {
    /// Determines the format from a file path.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("json") => Ok(ConfigFormat::Json),
            Some(other) => Err(ConfigError::unsupported_format(other)),
            None => Err(ConfigError::unsupported_format("(no extension)")),
        }
    }

    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Yaml => "yaml",
            ConfigFormat::Toml => "toml",
            ConfigFormat::Json => "json",
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn parse_str<T: DeserializeOwned>(content: &str, format: ConfigFormat) -> ConfigResult<T> {
    match format {
        ConfigFormat::Yaml => yaml_parse(content),
        ConfigFormat::Toml => {
            toml::from_str(content).map_err(|e| ConfigError::serialization(e.to_string()))
        }
        ConfigFormat::Json => {
            serde_json::from_str(content).map_err(|e| ConfigError::serialization(e.to_string()))
        }
    }
}

/// YAML parsing through the `config` crate.
fn yaml_parse<T: DeserializeOwned>(content: &str) -> ConfigResult<T> {
    let config = config::Config::builder()
        .add_source(config::File::from_str(content, config::FileFormat::Yaml))
        .build()
        .map_err(|e| ConfigError::serialization(e.to_string()))?;

    config
        .try_deserialize()
        .map_err(|e| ConfigError::serialization(e.to_string()))
}

// =============================================================================
// Convenience Functions
// =============================================================================

/// Loads configuration from a file with default settings.
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<TaskgateConfig> {
    ConfigLoader::new().load(path)
}

/// Loads configuration from a string with the specified format.
pub fn load_config_str(content: &str, format: ConfigFormat) -> ConfigResult<TaskgateConfig> {
    ConfigLoader::new().load_from_str(content, format)
}

// =============================================================================
// Tests
// =============================================================================
