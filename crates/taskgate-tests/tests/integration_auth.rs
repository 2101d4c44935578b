// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Authorization Engine Integration Tests
//!
//! Bootstrap, credentials, session tokens and RBAC decisions, exercised
//! together over a shared in-memory store.
//!
//! ## Test Categories
//!
//! - `test_bootstrap_*`: catalog seeding
//! - `test_credentials_*`: registration and verification
//! - `test_token_*`: signing, expiry and key mismatch
//! - `test_rbac_*`: authorization decisions

use std::collections::HashSet;
use std::sync::Arc;

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use taskgate_api::auth::{SessionClaims, ADMIN_ROLE, USER_ROLE};
use taskgate_api::{
    ApiError, BootstrapSeeder, Catalog, RbacResolver, SessionTokenService, TaskOperation,
    TokenConfig,
};
use taskgate_core::{Collection, DocumentStore, Filter, ObjectId, Permission, Role, User};
use taskgate_tests::prelude::*;

const CATALOG_NAMES: [&str; 4] = ["view_task", "create_task", "update_task", "delete_task"];

async fn permission_names(catalog: &Catalog, role: &Role) -> HashSet<String> {
    catalog
        .list_permissions_by_ids(&role.permissions)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect()
}

fn resolver(store: &Arc<dyn DocumentStore>) -> RbacResolver {
    RbacResolver::new(store.clone(), token_service())
}

/// Registers `account` with `role` and returns the user and a fresh token.
async fn session(store: &Arc<dyn DocumentStore>, account: Account, role: &str) -> (User, String) {
    let user = credentials(store.clone())
        .with_default_role(role)
        .register(account.as_new())
        .await
        .unwrap();
    let token = token_service()
        .issue(user.id, user.role_id.to_hex())
        .unwrap()
        .token;
    (user, token)
}

// =============================================================================
// Bootstrap Tests
// =============================================================================

#[tokio::test]
async fn test_bootstrap_fresh_store_catalog() {
    let store = seeded_store().await;
    let catalog = Catalog::new(store);

    let names: HashSet<_> = catalog
        .list_permissions()
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(
        names,
        CATALOG_NAMES.iter().map(|s| s.to_string()).collect::<HashSet<_>>()
    );

    let admin = catalog.find_role_by_name(ADMIN_ROLE).await.unwrap().unwrap();
    let user = catalog.find_role_by_name(USER_ROLE).await.unwrap().unwrap();
    assert_eq!(admin.permissions.len(), 4);
    assert_eq!(permission_names(&catalog, &admin).await, names);
    assert_eq!(user.permissions.len(), 1);
    assert_eq!(
        permission_names(&catalog, &user).await,
        HashSet::from(["view_task".to_string()])
    );
}

#[tokio::test]
async fn test_bootstrap_is_idempotent() {
    let store: Arc<dyn DocumentStore> = connected_store().await;
    let catalog = Catalog::new(store.clone());
    catalog.ensure_indexes().await.unwrap();
    let seeder = BootstrapSeeder::new(catalog.clone());

    let first = seeder.run().await.unwrap();
    assert_eq!(first.permissions_created.len(), 4);
    assert_eq!(first.roles_created.len(), 2);
    let admin_after_first = catalog.find_role_by_name(ADMIN_ROLE).await.unwrap().unwrap();

    for _ in 0..5 {
        let report = seeder.run().await.unwrap();
        assert!(report.is_noop());
        assert_eq!(report.permissions_total, 4);
        assert_eq!(report.roles_total, 2);
    }

    assert_eq!(catalog.list_permissions().await.unwrap().len(), 4);
    assert_eq!(catalog.list_roles().await.unwrap().len(), 2);
    assert_eq!(
        catalog.find_role_by_name(ADMIN_ROLE).await.unwrap().unwrap(),
        admin_after_first
    );
}

#[tokio::test]
async fn test_bootstrap_concurrent_runs_converge() {
    let store: Arc<dyn DocumentStore> = connected_store().await;
    let catalog = Catalog::new(store.clone());
    catalog.ensure_indexes().await.unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let seeder = BootstrapSeeder::new(catalog.clone());
            tokio::spawn(async move { seeder.run().await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(catalog.list_permissions().await.unwrap().len(), 4);
    assert_eq!(catalog.list_roles().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_bootstrap_keeps_existing_role_membership() {
    let store: Arc<dyn DocumentStore> = connected_store().await;
    let catalog = Catalog::new(store.clone());
    catalog.ensure_indexes().await.unwrap();

    // A pre-existing `user` role with no permissions at all.
    let roles: Collection<Role> = Collection::new(store.clone());
    roles.insert(&mut Role::new(USER_ROLE, vec![])).await.unwrap();

    let report = BootstrapSeeder::new(catalog.clone()).run().await.unwrap();
    assert_eq!(report.roles_created, vec![ADMIN_ROLE.to_string()]);

    let user = catalog.find_role_by_name(USER_ROLE).await.unwrap().unwrap();
    assert!(user.permissions.is_empty());

    // A permission added later is not granted to the existing admin role.
    let permissions: Collection<Permission> = Collection::new(store);
    permissions
        .insert(&mut Permission::new("archive_task", "Allows archiving tasks"))
        .await
        .unwrap();
    BootstrapSeeder::new(catalog.clone()).run().await.unwrap();

    let admin = catalog.find_role_by_name(ADMIN_ROLE).await.unwrap().unwrap();
    assert_eq!(admin.permissions.len(), 4);
    assert!(!permission_names(&catalog, &admin).await.contains("archive_task"));
}

// =============================================================================
// Credential Tests
// =============================================================================

#[tokio::test]
async fn test_credentials_register_hashes_password() {
    let store = seeded_store().await;
    let user = credentials(store.clone()).register(ALICE.as_new()).await.unwrap();

    assert!(!user.id.is_nil());
    assert_eq!(user.name, "Alice");
    assert_eq!(user.email, "a@x.com");
    assert!(!user.password.is_empty());
    assert_ne!(user.password.as_str(), "pw123");
    assert!(!user.password.as_str().contains("pw123"));

    let raw = store
        .find_one("users", &Filter::by_id(user.id))
        .await
        .unwrap()
        .unwrap();
    assert_ne!(raw["password"], "pw123");

    let role = Catalog::new(store)
        .find_role_by_id(user.role_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(role.name, USER_ROLE);
}

#[tokio::test]
async fn test_credentials_duplicate_email_conflicts() {
    let store = seeded_store().await;
    let creds = credentials(store);
    creds.register(ALICE.as_new()).await.unwrap();

    let mut shouting = ALICE.as_new();
    shouting.email = "  A@X.COM ";
    let err = creds.register(shouting).await.unwrap_err();

    assert!(matches!(err, ApiError::Conflict { .. }));
    assert_eq!(err.status_code(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_credentials_register_validates_input() {
    let store = seeded_store().await;
    let creds = credentials(store.clone());

    let mut bad = ALICE.as_new();
    bad.email = "not-an-email";
    bad.name = "   ";
    let err = creds.register(bad).await.unwrap_err();
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

    assert_eq!(store.count("users", &Filter::all()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_credentials_register_requires_seeded_role() {
    let store: Arc<dyn DocumentStore> = connected_store().await;
    let err = credentials(store).register(ALICE.as_new()).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound { ref resource } if resource == "role"));
}

#[tokio::test]
async fn test_credentials_verify_by_email_or_id() {
    let store = seeded_store().await;
    let creds = credentials(store);
    let user = creds.register(ALICE.as_new()).await.unwrap();

    let by_email = creds.verify(" A@x.com", "pw123").await.unwrap();
    assert_eq!(by_email.id, user.id);

    let by_id = creds.verify(&user.id.to_hex(), "pw123").await.unwrap();
    assert_eq!(by_id.id, user.id);
}

#[tokio::test]
async fn test_credentials_verify_failures_are_uniform() {
    let store = seeded_store().await;
    let creds = credentials(store);
    creds.register(ALICE.as_new()).await.unwrap();

    let wrong_password = creds.verify("a@x.com", "wrong").await.unwrap_err();
    let unknown_email = creds.verify("nobody@x.com", "pw123").await.unwrap_err();
    let unknown_id = creds
        .verify(&ObjectId::new().to_hex(), "pw123")
        .await
        .unwrap_err();

    for err in [&wrong_password, &unknown_email, &unknown_id] {
        assert!(matches!(err, ApiError::Authentication { .. }));
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    assert_eq!(wrong_password.user_message(), unknown_id.user_message());
}

// =============================================================================
// Token Tests
// =============================================================================

#[tokio::test]
async fn test_token_lifetime_is_one_hour() {
    let service = token_service();
    let issued = service.issue(ObjectId::new(), "role").unwrap();

    assert_eq!(issued.claims.exp - issued.claims.iat, 3600);
    assert_eq!(
        (issued.expires_at() - issued.claims.issued_at_time().unwrap()).num_seconds(),
        3600
    );
    assert!(!issued.claims.jti.is_empty());
}

#[tokio::test]
async fn test_token_identifiers_are_unique() {
    let service = token_service();
    let user_id = ObjectId::new();
    let a = service.issue(user_id, "role").unwrap();
    let b = service.issue(user_id, "role").unwrap();
    assert_ne!(a.claims.jti, b.claims.jti);
}

#[tokio::test]
async fn test_token_signed_with_other_key_rejected() {
    let foreign = foreign_token_service().issue(ObjectId::new(), "role").unwrap();
    let err = token_service().validate(&foreign.token).unwrap_err();
    assert!(matches!(err, ApiError::Authentication { .. }));

    let claims = SessionClaims::new(ObjectId::new(), "role", 3600);
    let hs512 = encode(
        &Header::new(Algorithm::HS512),
        &claims,
        &EncodingKey::from_secret(OTHER_SECRET.as_bytes()),
    )
    .unwrap();
    assert!(token_service().validate(&hs512).is_err());
}

#[tokio::test]
async fn test_token_expired_rejected() {
    let service = token_service();
    let token = expired_token(&service, ObjectId::new(), "role");

    let err = service.validate(&token).unwrap_err();
    assert!(matches!(err, ApiError::Authentication { .. }));
}

#[tokio::test]
async fn test_token_rejections_share_one_message() {
    let service = token_service();
    let expired = expired_token(&service, ObjectId::new(), "role");
    let foreign = foreign_token_service().issue(ObjectId::new(), "role").unwrap().token;
    let mut tampered = service.issue(ObjectId::new(), "role").unwrap().token;
    tampered.push('x');

    let messages: HashSet<String> = [expired.as_str(), foreign.as_str(), tampered.as_str(), "garbage"]
        .into_iter()
        .map(|t| service.validate(t).unwrap_err().user_message())
        .collect();
    assert_eq!(messages.len(), 1);
}

#[tokio::test]
async fn test_token_hmac_family_accepted() {
    let claims = SessionClaims::new(ObjectId::new(), "role", 3600);
    let token = encode(
        &Header::new(Algorithm::HS384),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap();

    assert_eq!(token_service().validate(&token).unwrap(), claims);
}

#[tokio::test]
async fn test_token_without_key_is_configuration_error() {
    let service = SessionTokenService::new(TokenConfig::default());
    assert!(!service.has_key());

    let err = service.issue(ObjectId::new(), "role").unwrap_err();
    assert!(matches!(err, ApiError::Configuration { .. }));
    assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
}

// =============================================================================
// RBAC Tests
// =============================================================================

#[tokio::test]
async fn test_rbac_decisions_match_seeded_roles() {
    let store = seeded_store().await;
    let resolver = resolver(&store);
    let (_, admin_token) = session(&store, ROOT, ADMIN_ROLE).await;
    let (_, user_token) = session(&store, ALICE, USER_ROLE).await;

    for op in TaskOperation::all() {
        let permission = op.required_permission();

        let ctx = resolver.authorize(&admin_token, permission).await.unwrap();
        assert_eq!(ctx.role_name, ADMIN_ROLE);

        let user_decision = resolver.authorize(&user_token, permission).await;
        if permission == "view_task" {
            assert!(user_decision.is_ok());
        } else {
            let err = user_decision.unwrap_err();
            assert!(matches!(err, ApiError::Authorization { .. }), "{op}: {err}");
            assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        }
    }
}

#[tokio::test]
async fn test_rbac_follows_stored_references() {
    let store = seeded_store().await;
    let catalog = Catalog::new(store.clone());
    let view = catalog.find_permission_by_name("view_task").await.unwrap().unwrap();
    let update = catalog.find_permission_by_name("update_task").await.unwrap().unwrap();

    let roles: Collection<Role> = Collection::new(store.clone());
    roles
        .insert(&mut Role::new("editor", vec![view.id, update.id, ObjectId::new()]))
        .await
        .unwrap();

    let resolver = resolver(&store);
    let (_, token) = session(&store, BOB, "editor").await;

    let reachable: HashSet<&str> = ["view_task", "update_task"].into();
    for name in CATALOG_NAMES.iter().chain(["update_task_status", "VIEW_TASK", "*"].iter()) {
        let allowed = resolver.authorize(&token, name).await.is_ok();
        assert_eq!(allowed, reachable.contains(name), "permission {name}");
    }
}

#[tokio::test]
async fn test_rbac_reads_current_role_state() {
    let store = seeded_store().await;
    let resolver = resolver(&store);
    let (user, token) = session(&store, ALICE, USER_ROLE).await;

    assert!(resolver.authorize(&token, "create_task").await.is_err());

    let create = Catalog::new(store.clone())
        .find_permission_by_name("create_task")
        .await
        .unwrap()
        .unwrap();
    let roles: Collection<Role> = Collection::new(store.clone());
    let mut role = roles.find_by_id(user.role_id).await.unwrap().unwrap();
    role.permissions.push(create.id);
    let set = serde_json::json!({ "permissions": role.permissions });
    let serde_json::Value::Object(set) = set else {
        unreachable!()
    };
    assert!(roles.update_by_id(role.id, set).await.unwrap());

    // Same token, new decision.
    let ctx = resolver.authorize(&token, "create_task").await.unwrap();
    assert!(ctx.has_permission("create_task"));
    assert!(ctx.has_permission("view_task"));
}

#[tokio::test]
async fn test_rbac_ignores_role_label_in_token() {
    let store = seeded_store().await;
    let resolver = resolver(&store);
    let (user, _) = session(&store, ALICE, USER_ROLE).await;

    let forged_label = token_service().issue(user.id, ADMIN_ROLE).unwrap().token;
    let err = resolver.authorize(&forged_label, "delete_task").await.unwrap_err();
    assert!(matches!(err, ApiError::Authorization { .. }));
}

#[tokio::test]
async fn test_rbac_missing_user_and_role() {
    let store = seeded_store().await;
    let resolver = resolver(&store);

    let ghost = token_service().issue(ObjectId::new(), USER_ROLE).unwrap().token;
    let err = resolver.authorize(&ghost, "view_task").await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound { ref resource } if resource == "user"));

    let (user, token) = session(&store, ALICE, USER_ROLE).await;
    store
        .delete_one("roles", &Filter::by_id(user.role_id))
        .await
        .unwrap();
    let err = resolver.authorize(&token, "view_task").await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound { ref resource } if resource == "role"));
}

#[tokio::test]
async fn test_rbac_expired_token_denied_even_for_admin() {
    let store = seeded_store().await;
    let resolver = resolver(&store);
    let (admin, _) = session(&store, ROOT, ADMIN_ROLE).await;

    let token = expired_token(&token_service(), admin.id, &admin.role_id.to_hex());
    for op in TaskOperation::all() {
        let err = resolver
            .authorize(&token, op.required_permission())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }
}
