// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Account registration and password verification.

use std::sync::Arc;

use taskgate_core::{Collection, DocumentStore, Filter, ObjectId, User};
use tracing::{debug, info};

use super::bootstrap::USER_ROLE;
use super::catalog::Catalog;
use super::password::PasswordHasher;
use crate::error::{ApiError, ApiResult, ValidationErrors};

/// Input for [`CredentialStore::register`].
#[derive(Debug, Clone)]
pub struct NewAccount<'a> {
    /// Display name.
    pub name: &'a str,
    /// Login email.
    pub email: &'a str,
    /// Raw password.
    pub password: &'a str,
}

/// Stores users and checks their passwords.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    users: Collection<User>,
    catalog: Catalog,
    hasher: PasswordHasher,
    default_role: String,
}

impl CredentialStore {
    /// Creates a credential store over `store`.
    pub fn new(store: Arc<dyn DocumentStore>, hasher: PasswordHasher) -> Self {
        Self {
            users: Collection::new(store.clone()),
            catalog: Catalog::new(store),
            hasher,
            default_role: USER_ROLE.to_string(),
        }
    }

    /// Sets the role assigned to new accounts.
    pub fn with_default_role(mut self, role: impl Into<String>) -> Self {
        self.default_role = role.into();
        self
    }

    /// Declares `users.email` unique.
    pub async fn ensure_indexes(&self) -> ApiResult<()> {
        self.users.ensure_unique("email").await?;
        Ok(())
    }

    /// Creates an account holding the default role.
    ///
    /// Fails with a conflict if the email is taken and with
    /// `NotFound("role")` if the default role has not been seeded.
    pub async fn register(&self, account: NewAccount<'_>) -> ApiResult<User> {
        let (name, email) = validate_account(&account)?;

        if self.find_by_email(&email).await?.is_some() {
            debug!(email = %email, "Registration rejected: email taken");
            return Err(ApiError::conflict("Email is already registered"));
        }

        let role = self
            .catalog
            .find_role_by_name(&self.default_role)
            .await?
            .ok_or_else(|| ApiError::not_found("role"))?;

        let hash = self.hasher.hash(account.password).await?;
        let mut user = User::new(name, email, hash, role.id);
        // The unique index turns a concurrent duplicate into a conflict here.
        let id = self.users.insert(&mut user).await?;

        info!(user_id = %id, role = %role.name, "User registered");
        Ok(user)
    }

    /// Returns the user if `password` matches.
    ///
    /// `login` is an email or a hex user id. An unknown account and a wrong
    /// password produce the same error after comparable work.
    pub async fn verify(&self, login: &str, password: &str) -> ApiResult<User> {
        let user = match ObjectId::parse_str(login.trim()) {
            Ok(id) => self.users.find_by_id(id).await?,
            Err(_) => self.find_by_email(&normalize_email(login)).await?,
        };

        let Some(user) = user else {
            self.hasher.verify_dummy(password).await?;
            debug!(reason = "unknown_account", "Credential verification failed");
            return Err(ApiError::invalid_credentials());
        };

        if !self.hasher.verify(password, &user.password).await? {
            debug!(user_id = %user.id, reason = "password_mismatch", "Credential verification failed");
            return Err(ApiError::invalid_credentials());
        }

        Ok(user)
    }

    /// Finds a user by identifier.
    pub async fn find_by_id(&self, id: ObjectId) -> ApiResult<Option<User>> {
        Ok(self.users.find_by_id(id).await?)
    }

    /// Finds a user by normalized email.
    pub async fn find_by_email(&self, email: &str) -> ApiResult<Option<User>> {
        Ok(self.users.find_one(&Filter::eq("email", email)).await?)
    }
}

/// Trims and lowercases an email address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_account(account: &NewAccount<'_>) -> ApiResult<(String, String)> {
    let mut errors = ValidationErrors::new();

    let name = account.name.trim();
    if name.is_empty() {
        errors.add("name", "is required");
    }

    let email = normalize_email(account.email);
    if email.is_empty() {
        errors.add("email", "is required");
    } else if !email.contains('@') {
        errors.add("email", "must be a valid email address");
    }

    if account.password.trim().is_empty() {
        errors.add("password", "is required");
    }

    errors.into_result((name.to_string(), email))
}
