// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Application state shared across handlers.

use std::sync::Arc;

use axum::extract::FromRef;
use taskgate_core::DocumentStore;

use crate::auth::{
    BootstrapSeeder, Catalog, CredentialStore, PasswordHasher, RbacResolver, SessionCookie,
    SessionTokenService,
};
use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::tasks::TaskService;

// =============================================================================
// AppState
// =============================================================================

/// Application state shared across all handlers.
///
/// Every component reads the same injected document store.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: Arc<ApiConfig>,
    /// The document store.
    pub store: Arc<dyn DocumentStore>,
    /// Account registration and verification.
    pub credentials: CredentialStore,
    /// Permission and role lookups.
    pub catalog: Catalog,
    /// Authorization pipeline, owning the token service.
    pub resolver: RbacResolver,
    /// Task operations.
    pub tasks: TaskService,
    /// Session cookie attributes.
    pub cookie: SessionCookie,
}

impl AppState {
    /// Creates a new app state builder.
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::new()
    }

    /// Returns the session token service.
    pub fn tokens(&self) -> &SessionTokenService {
        self.resolver.tokens()
    }

    /// Returns a seeder over this state's catalog.
    pub fn seeder(&self) -> BootstrapSeeder {
        BootstrapSeeder::new(self.catalog.clone())
    }

    /// Declares the unique fields every collection relies on.
    pub async fn ensure_indexes(&self) -> ApiResult<()> {
        self.catalog.ensure_indexes().await?;
        self.credentials.ensure_indexes().await
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("store", &self.store.backend())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// AppStateBuilder
// =============================================================================

/// Builder for constructing AppState.
#[derive(Default)]
pub struct AppStateBuilder {
    config: Option<ApiConfig>,
    store: Option<Arc<dyn DocumentStore>>,
    hasher: Option<PasswordHasher>,
}

impl AppStateBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the document store.
    pub fn store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Overrides the password hasher built from the configuration.
    pub fn password_hasher(mut self, hasher: PasswordHasher) -> Self {
        self.hasher = Some(hasher);
        self
    }

    /// Builds the AppState.
    ///
    /// Fails if no store was given or the password parameters are invalid.
    pub fn build(self) -> ApiResult<AppState> {
        let config = self.config.unwrap_or_default();
        let store = self
            .store
            .ok_or_else(|| ApiError::configuration("A document store is required"))?;

        let hasher = match self.hasher {
            Some(hasher) => hasher,
            None => PasswordHasher::new(config.password)?,
        };

        let credentials = CredentialStore::new(store.clone(), hasher)
            .with_default_role(config.default_role.clone());
        let tokens = SessionTokenService::new(config.token.clone());

        Ok(AppState {
            catalog: Catalog::new(store.clone()),
            resolver: RbacResolver::new(store.clone(), tokens),
            tasks: TaskService::new(store.clone()),
            cookie: config.cookie.clone(),
            config: Arc::new(config),
            credentials,
            store,
        })
    }
}

// =============================================================================
// FromRef implementations for extracting parts of state
// =============================================================================

impl FromRef<AppState> for SessionCookie {
    fn from_ref(state: &AppState) -> Self {
        state.cookie.clone()
    }
}

impl FromRef<AppState> for RbacResolver {
    fn from_ref(state: &AppState) -> Self {
        state.resolver.clone()
    }
}

impl FromRef<AppState> for Arc<ApiConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

// =============================================================================
// Tests
// =============================================================================
