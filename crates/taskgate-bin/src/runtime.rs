// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Server runtime orchestration.
//!
//! Startup order: check the signing key, open and connect the store, declare
//! unique indexes, seed the catalog, then serve until shutdown and close the
//! store. A failed seed aborts startup.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use taskgate_api::{
    ApiConfig, ApiServer, AppState, BootstrapReport, BootstrapSeeder, Catalog, CorsConfig,
    PasswordParams, SameSite, SessionCookie, TokenConfig,
};
use taskgate_config::{ConfigLoader, DatabaseBackend, DatabaseConfig, TaskgateConfig};
use taskgate_core::{DocumentStore, MemoryStore};

use crate::error::{BinError, BinResult};
use crate::shutdown::ShutdownCoordinator;

// =============================================================================
// TaskgateRuntime
// =============================================================================

/// Owns the configuration and drives the server lifecycle.
pub struct TaskgateRuntime {
    config: Arc<TaskgateConfig>,
    shutdown: ShutdownCoordinator,
}

impl TaskgateRuntime {
    /// Creates a runtime for `config`.
    pub fn new(config: TaskgateConfig) -> Self {
        Self {
            config: Arc::new(config),
            shutdown: ShutdownCoordinator::new(),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &TaskgateConfig {
        &self.config
    }

    /// Returns a handle that can stop the server.
    pub fn shutdown_handle(&self) -> ShutdownCoordinator {
        self.shutdown.clone()
    }

    /// Runs the server until a shutdown signal arrives.
    pub async fn run(self) -> BinResult<()> {
        info!(version = crate::VERSION, "Starting taskgate");

        let api_config = api_config(&self.config)?;
        let store = open_store(&self.config.database).await?;

        let result = self.serve(store.clone(), api_config).await;

        match store.close().await {
            Ok(()) => info!(backend = store.backend(), "Store closed"),
            Err(e) => warn!(error = %e, "Failed to close store"),
        }

        info!("taskgate shutdown complete");
        result
    }

    async fn serve(&self, store: Arc<dyn DocumentStore>, api_config: ApiConfig) -> BinResult<()> {
        let state = AppState::builder()
            .config(api_config)
            .store(store)
            .build()
            .map_err(|e| BinError::init(e.to_string()))?;

        state
            .ensure_indexes()
            .await
            .map_err(|e| BinError::init(format!("Failed to declare indexes: {e}")))?;

        let report = state
            .seeder()
            .run()
            .await
            .map_err(|e| BinError::init(format!("Bootstrap failed: {e}")))?;
        log_report(&report);

        tokio::spawn(self.shutdown.clone().listen_for_signals());

        ApiServer::new(state)
            .run_with_shutdown(self.shutdown.shutdown_signal())
            .await
            .map_err(|e| BinError::runtime(e.to_string()))
    }
}

// =============================================================================
// Seeding
// =============================================================================

/// Connects the store, seeds the catalog once and closes the store.
pub async fn seed_catalog(config: &TaskgateConfig) -> BinResult<BootstrapReport> {
    let store = open_store(&config.database).await?;

    let result = seed(Catalog::new(store.clone())).await;

    if let Err(e) = store.close().await {
        warn!(error = %e, "Failed to close store");
    }

    result.map_err(|e| BinError::init(format!("Bootstrap failed: {e}")))
}

async fn seed(catalog: Catalog) -> taskgate_api::ApiResult<BootstrapReport> {
    catalog.ensure_indexes().await?;
    BootstrapSeeder::new(catalog).run().await
}

fn log_report(report: &BootstrapReport) {
    if report.is_noop() {
        info!(
            permissions = report.permissions_total,
            roles = report.roles_total,
            "Catalog already seeded"
        );
    } else {
        info!(
            permissions_created = ?report.permissions_created,
            roles_created = ?report.roles_created,
            "Catalog seeded"
        );
    }
}

// =============================================================================
// Wiring
// =============================================================================

/// Creates and connects the configured store.
pub async fn open_store(config: &DatabaseConfig) -> BinResult<Arc<dyn DocumentStore>> {
    let store = build_store(config)?;
    store.connect().await?;
    info!(backend = store.backend(), "Store connected");
    Ok(store)
}

fn build_store(config: &DatabaseConfig) -> BinResult<Arc<dyn DocumentStore>> {
    match config.backend {
        DatabaseBackend::Memory => {
            warn!("Using the in-memory store; data is lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
        #[cfg(feature = "rocksdb-backend")]
        DatabaseBackend::Rocksdb => Ok(Arc::new(taskgate_core::RocksDbStore::new(
            config.data_dir(),
        ))),
        #[cfg(not(feature = "rocksdb-backend"))]
        DatabaseBackend::Rocksdb => Err(BinError::config(
            "database.backend = rocksdb requires the rocksdb-backend feature",
        )),
    }
}

/// Maps the file configuration onto the server configuration.
///
/// Fails when no signing key is available.
pub fn api_config(config: &TaskgateConfig) -> BinResult<ApiConfig> {
    let jwt = &config.security.jwt;
    let secret = jwt
        .secret
        .as_ref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            BinError::init(format!(
                "No signing key: set security.jwt.secret or ${}",
                jwt.secret_env
            ))
        })?;

    let password = &config.security.password;
    let cookie = &config.security.cookie;
    let cors = &config.server.cors;

    Ok(ApiConfig::new()
        .with_host(config.server.bind_address)
        .with_port(config.server.port)
        .with_request_timeout(config.server.request_timeout())
        .with_cors(CorsConfig {
            allowed_origins: cors.allowed_origins.clone(),
            allowed_methods: cors.allowed_methods.clone(),
            allow_credentials: cors.allow_credentials,
            max_age: Duration::from_secs(cors.max_age_secs),
        })
        .with_token(
            TokenConfig::new(secret.expose())
                .with_expiration_secs(jwt.expiration_secs)
                .with_leeway_secs(jwt.leeway_secs),
        )
        .with_password(PasswordParams {
            memory_kib: password.memory_kib,
            iterations: password.iterations,
            parallelism: password.parallelism,
        })
        .with_cookie(
            SessionCookie::new(cookie.name.clone())
                .with_secure(cookie.secure)
                .with_same_site(match cookie.same_site {
                    taskgate_config::SameSite::Strict => SameSite::Strict,
                    taskgate_config::SameSite::Lax => SameSite::Lax,
                    taskgate_config::SameSite::None => SameSite::None,
                }),
        )
        .with_default_role(config.security.default_role.clone()))
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for constructing the runtime.
#[derive(Default)]
pub struct RuntimeBuilder {
    config_path: Option<PathBuf>,
    config: Option<TaskgateConfig>,
    loader: Option<ConfigLoader>,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration file path. A missing file means defaults.
    pub fn config_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the configuration directly.
    pub fn config(mut self, config: TaskgateConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Uses a custom loader instead of the process environment.
    pub fn loader(mut self, loader: ConfigLoader) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Builds the runtime.
    pub fn build(self) -> BinResult<TaskgateRuntime> {
        let config = match self.config {
            Some(config) => config,
            None => {
                let loader = self.loader.unwrap_or_default();
                loader.load_or_default(self.config_path.as_deref())?
            }
        };

        Ok(TaskgateRuntime::new(config))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use taskgate_config::{EnvSource, SecretValue};

    fn config_with_secret() -> TaskgateConfig {
        let mut config = TaskgateConfig::default();
        config.security.jwt.secret = Some(SecretValue::new("runtime-test-secret"));
        config
    }

    #[test]
    fn test_api_config_requires_key() {
        let err = api_config(&TaskgateConfig::default()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("JWT_SECRET_KEY"));
    }

    #[test]
    fn test_api_config_mapping() {
        let mut config = config_with_secret();
        config.server.port = 9090;
        config.security.cookie.name = "session".to_string();
        config.security.jwt.expiration_secs = 600;

        let api = api_config(&config).unwrap();
        assert_eq!(api.port, 9090);
        assert_eq!(api.cookie.name(), "session");
        assert_eq!(api.token.expiration_secs, 600);
        assert_eq!(api.default_role, "user");
        assert_eq!(api.cors.allowed_origins, vec!["http://localhost:5173"]);
    }

    #[test]
    fn test_builder_uses_loader_environment() {
        let loader = ConfigLoader::new().with_env(EnvSource::from_iter([
            ("JWT_SECRET_KEY", "from-env"),
            ("TASKGATE_PORT", "7000"),
        ]));

        let runtime = RuntimeBuilder::new()
            .config_path("/nonexistent/taskgate.yaml")
            .loader(loader)
            .build()
            .unwrap();

        assert_eq!(runtime.config().server.port, 7000);
        assert!(runtime.config().security.jwt.has_secret());
    }

    #[tokio::test]
    async fn test_seed_catalog_on_memory_store() {
        let report = seed_catalog(&TaskgateConfig::default()).await.unwrap();
        assert_eq!(report.permissions_created.len(), 4);
        assert_eq!(report.roles_created.len(), 2);
    }

    #[cfg(not(feature = "rocksdb-backend"))]
    #[test]
    fn test_rocksdb_requires_feature() {
        let config = DatabaseConfig {
            backend: DatabaseBackend::Rocksdb,
            ..Default::default()
        };
        assert_eq!(build_store(&config).unwrap_err().exit_code(), 1);
    }
}
