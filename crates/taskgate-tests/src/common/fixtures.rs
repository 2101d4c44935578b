// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Fixtures
//!
//! Signing keys, accounts and stores in known states.

use std::sync::Arc;

use chrono::{Duration, Utc};
use taskgate_api::auth::{ADMIN_ROLE, SessionClaims};
use taskgate_api::{
    ApiConfig, BootstrapSeeder, Catalog, CredentialStore, NewAccount, PasswordHasher,
    SessionTokenService, TokenConfig,
};
use taskgate_core::{DocumentStore, MemoryStore, ObjectId, User};

// =============================================================================
// Keys
// =============================================================================

/// Signing key used by every fixture.
pub const TEST_SECRET: &str = "integration-test-signing-key-0123456789";

/// A different key, for signature mismatch tests.
pub const OTHER_SECRET: &str = "some-other-signing-key-9876543210abcdef";

/// Token service signing with [`TEST_SECRET`].
pub fn token_service() -> SessionTokenService {
    SessionTokenService::new(TokenConfig::new(TEST_SECRET))
}

/// Token service signing with [`OTHER_SECRET`].
pub fn foreign_token_service() -> SessionTokenService {
    SessionTokenService::new(TokenConfig::new(OTHER_SECRET))
}

/// Signs a token that expired an hour ago.
pub fn expired_token(service: &SessionTokenService, user_id: ObjectId, role: &str) -> String {
    let claims = SessionClaims::issued_at(user_id, role, Utc::now() - Duration::hours(2), 3600);
    service.sign(&claims).expect("signing with a configured key")
}

/// Server configuration with [`TEST_SECRET`].
pub fn api_config() -> ApiConfig {
    ApiConfig::default().with_token(TokenConfig::new(TEST_SECRET))
}

// =============================================================================
// Accounts
// =============================================================================

/// A registration input.
#[derive(Debug, Clone, Copy)]
pub struct Account {
    /// Display name.
    pub name: &'static str,
    /// Email.
    pub email: &'static str,
    /// Raw password.
    pub password: &'static str,
}

impl Account {
    /// Borrows this account as registration input.
    pub fn as_new(&self) -> NewAccount<'static> {
        NewAccount {
            name: self.name,
            email: self.email,
            password: self.password,
        }
    }

    /// JSON body for `/api/register`.
    pub fn register_body(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name,
            "email": self.email,
            "password": self.password,
        })
    }

    /// JSON body for `/api/login`.
    pub fn login_body(&self) -> serde_json::Value {
        serde_json::json!({
            "email": self.email,
            "password": self.password,
        })
    }
}

/// The account from the end-to-end scenario.
pub const ALICE: Account = Account {
    name: "Alice",
    email: "a@x.com",
    password: "pw123",
};

/// A second ordinary account.
pub const BOB: Account = Account {
    name: "Bob",
    email: "bob@example.com",
    password: "hunter2-hunter2",
};

/// An account registered with the admin role.
pub const ROOT: Account = Account {
    name: "Root",
    email: "root@example.com",
    password: "correct horse battery staple",
};

// =============================================================================
// Stores
// =============================================================================

/// A connected, empty in-memory store.
pub async fn connected_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store.connect().await.expect("memory store connects");
    store
}

/// A connected store with indexes declared and the catalog seeded.
pub async fn seeded_store() -> Arc<dyn DocumentStore> {
    let store: Arc<dyn DocumentStore> = connected_store().await;
    let catalog = Catalog::new(store.clone());
    catalog.ensure_indexes().await.expect("catalog indexes");
    BootstrapSeeder::new(catalog).run().await.expect("bootstrap");
    credentials(store.clone())
        .ensure_indexes()
        .await
        .expect("user indexes");
    store
}

/// Credential store with fast hashing.
pub fn credentials(store: Arc<dyn DocumentStore>) -> CredentialStore {
    CredentialStore::new(store, PasswordHasher::for_testing())
}

/// Registers [`ROOT`] with the admin role.
pub async fn register_admin(store: Arc<dyn DocumentStore>) -> User {
    credentials(store)
        .with_default_role(ADMIN_ROLE)
        .register(ROOT.as_new())
        .await
        .expect("admin registration")
}
