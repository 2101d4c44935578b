// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Slow, salted password hashing with Argon2id.
//!
//! Hashes are stored as PHC strings, so the cost parameters travel with each
//! hash and verification keeps working after the defaults change. All work
//! runs on the blocking pool.

use std::sync::Arc;

use argon2::password_hash::{self, PasswordHash as PhcString, PasswordHasher as _, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordVerifier, Version};
use taskgate_core::PasswordHash;
use tokio::sync::OnceCell;

use crate::error::{ApiError, ApiResult};

/// Default memory cost in KiB (64 MiB).
pub const DEFAULT_MEMORY_KIB: u32 = 65_536;
/// Default number of passes.
pub const DEFAULT_ITERATIONS: u32 = 3;
/// Default lane count.
pub const DEFAULT_PARALLELISM: u32 = 1;

const SALT_LEN: usize = 16;
const DUMMY_PASSWORD: &str = "taskgate-timing-equalizer";

/// Argon2 cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordParams {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl Default for PasswordParams {
    fn default() -> Self {
        Self {
            memory_kib: DEFAULT_MEMORY_KIB,
            iterations: DEFAULT_ITERATIONS,
            parallelism: DEFAULT_PARALLELISM,
        }
    }
}

// =============================================================================
// PasswordHasher
// =============================================================================

/// Hashes and verifies passwords.
#[derive(Clone)]
pub struct PasswordHasher {
    params: Params,
    dummy_hash: Arc<OnceCell<String>>,
}

impl PasswordHasher {
    /// Creates a hasher with the given cost parameters.
    pub fn new(params: PasswordParams) -> ApiResult<Self> {
        let params = Params::new(params.memory_kib, params.iterations, params.parallelism, None)
            .map_err(|e| ApiError::configuration(format!("Invalid password hashing parameters: {}", e)))?;

        Ok(Self {
            params,
            dummy_hash: Arc::new(OnceCell::new()),
        })
    }

    /// Creates a hasher with the minimum cost. Only for tests.
    pub fn for_testing() -> Self {
        Self {
            params: Params::new(Params::MIN_M_COST, Params::MIN_T_COST, Params::MIN_P_COST, None)
                .unwrap_or_default(),
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    /// Hashes `password` with a fresh random salt.
    pub async fn hash(&self, password: &str) -> ApiResult<PasswordHash> {
        let params = self.params.clone();
        let password = password.to_owned();
        let encoded = run_blocking(move || hash_blocking(params, &password)).await?;
        Ok(PasswordHash::new(encoded))
    }

    /// Returns `true` if `password` matches `hash`.
    pub async fn verify(&self, password: &str, hash: &PasswordHash) -> ApiResult<bool> {
        let password = password.to_owned();
        let encoded = hash.as_str().to_owned();
        run_blocking(move || verify_blocking(&password, &encoded)).await
    }

    /// Performs one verification against a fixed hash and discards the result.
    ///
    /// Called when no account matches, so unknown and known accounts take
    /// the same time to reject.
    pub async fn verify_dummy(&self, password: &str) -> ApiResult<()> {
        let params = self.params.clone();
        let dummy = self
            .dummy_hash
            .get_or_try_init(|| run_blocking(move || hash_blocking(params, DUMMY_PASSWORD)))
            .await?
            .clone();

        let password = password.to_owned();
        run_blocking(move || verify_blocking(&password, &dummy)).await?;
        Ok(())
    }
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("algorithm", &"argon2id")
            .field("memory_kib", &self.params.m_cost())
            .field("iterations", &self.params.t_cost())
            .field("parallelism", &self.params.p_cost())
            .finish()
    }
}

// =============================================================================
// Helpers
// =============================================================================

async fn run_blocking<T, F>(f: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> ApiResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::internal(format!("Password hashing task failed: {}", e)))?
}

fn hash_blocking(params: Params, password: &str) -> ApiResult<String> {
    let salt_bytes: [u8; SALT_LEN] = rand::random();
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| ApiError::internal(format!("Failed to encode salt: {}", e)))?;

    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::internal(format!("Failed to hash password: {}", e)))
}

fn verify_blocking(password: &str, encoded: &str) -> ApiResult<bool> {
    let parsed = PhcString::new(encoded)
        .map_err(|e| ApiError::internal(format!("Stored password hash is malformed: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(ApiError::internal(format!("Failed to verify password: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hasher = PasswordHasher::for_testing();
        let hash = hasher.hash("pw123").await.unwrap();

        assert!(!hash.is_empty());
        assert_ne!(hash.as_str(), "pw123");
        assert!(hash.as_str().starts_with("$argon2id$"));
        assert!(hasher.verify("pw123", &hash).await.unwrap());
        assert!(!hasher.verify("pw124", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_salt_is_random() {
        let hasher = PasswordHasher::for_testing();
        let a = hasher.hash("same").await.unwrap();
        let b = hasher.hash("same").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_params_are_read_from_hash() {
        let strong = PasswordHasher::new(PasswordParams {
            memory_kib: 64,
            iterations: 2,
            parallelism: 1,
        })
        .unwrap();
        let hash = strong.hash("secret").await.unwrap();
        assert!(hash.as_str().contains("m=64,t=2,p=1"));

        let weak = PasswordHasher::for_testing();
        assert!(weak.verify("secret", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_hash_is_internal_error() {
        let hasher = PasswordHasher::for_testing();
        let err = hasher
            .verify("pw", &PasswordHash::new("not-a-phc-string"))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "INTERNAL_ERROR");
    }

    #[tokio::test]
    async fn test_verify_dummy() {
        let hasher = PasswordHasher::for_testing();
        hasher.verify_dummy("anything").await.unwrap();
        hasher.verify_dummy("again").await.unwrap();
    }

    #[test]
    fn test_invalid_params() {
        let result = PasswordHasher::new(PasswordParams {
            memory_kib: 1,
            iterations: 1,
            parallelism: 1,
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_debug_has_no_secrets() {
        let debug = format!("{:?}", PasswordHasher::for_testing());
        assert!(debug.contains("argon2id"));
    }
}
