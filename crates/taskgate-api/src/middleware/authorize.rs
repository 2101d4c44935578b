// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Per-route authorization guard.
//!
//! Runs the RBAC pipeline before the handler. On allow, the resulting
//! [`AuthContext`] is stored in the request extensions for the
//! [`Auth`](crate::extractors::Auth) extractor; on deny, the error response is
//! returned and the handler never runs.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::Request,
    response::{IntoResponse, Response},
};
use tower::{Layer, Service};

use crate::auth::{RbacResolver, SessionCookie, TaskOperation};
use crate::error::ApiError;
use crate::extractors::session_token;

// =============================================================================
// AuthorizeLayer
// =============================================================================

/// Layer requiring one permission on the routes it wraps.
#[derive(Clone)]
pub struct AuthorizeLayer {
    resolver: Arc<RbacResolver>,
    cookie: Arc<SessionCookie>,
    permission: &'static str,
}

impl AuthorizeLayer {
    /// Creates a layer requiring `permission`.
    pub fn require(resolver: RbacResolver, permission: &'static str) -> Self {
        Self {
            resolver: Arc::new(resolver),
            cookie: Arc::new(SessionCookie::default()),
            permission,
        }
    }

    /// Creates a layer requiring the permission mapped to `operation`.
    pub fn for_operation(resolver: RbacResolver, operation: TaskOperation) -> Self {
        Self::require(resolver, operation.required_permission())
    }

    /// Reads the session cookie under the given settings.
    pub fn with_cookie(mut self, cookie: SessionCookie) -> Self {
        self.cookie = Arc::new(cookie);
        self
    }

    /// Returns the required permission name.
    pub fn permission(&self) -> &'static str {
        self.permission
    }
}

impl std::fmt::Debug for AuthorizeLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizeLayer")
            .field("permission", &self.permission)
            .field("cookie", &self.cookie.name())
            .finish()
    }
}

impl<S> Layer<S> for AuthorizeLayer {
    type Service = AuthorizeMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthorizeMiddleware {
            inner,
            resolver: self.resolver.clone(),
            cookie: self.cookie.clone(),
            permission: self.permission,
        }
    }
}

// =============================================================================
// AuthorizeMiddleware
// =============================================================================

/// Service produced by [`AuthorizeLayer`].
#[derive(Clone)]
pub struct AuthorizeMiddleware<S> {
    inner: S,
    resolver: Arc<RbacResolver>,
    cookie: Arc<SessionCookie>,
    permission: &'static str,
}

impl<S> Service<Request<Body>> for AuthorizeMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        // The clone is not guaranteed ready; keep the polled one for this call.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let resolver = self.resolver.clone();
        let permission = self.permission;
        let token = session_token(req.headers(), &self.cookie);

        Box::pin(async move {
            let Some(token) = token else {
                tracing::debug!(permission = permission, "Request carries no session token");
                return Ok(ApiError::invalid_session().into_response());
            };

            match resolver.authorize(&token, permission).await {
                Ok(ctx) => {
                    req.extensions_mut().insert(ctx);
                    inner.call(req).await
                }
                Err(e) => Ok(e.into_response()),
            }
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{
        AuthContext, BootstrapSeeder, Catalog, CredentialStore, NewAccount, PasswordHasher,
        SessionTokenService, TokenConfig,
    };
    use axum::http::{header, StatusCode};
    use std::convert::Infallible;
    use taskgate_core::{DocumentStore, MemoryStore};
    use tower::ServiceExt;

    fn echo_role() -> impl Service<
        Request<Body>,
        Response = Response,
        Error = Infallible,
        Future = impl Future<Output = Result<Response, Infallible>> + Send,
    > + Clone
           + Send {
        tower::service_fn(|req: Request<Body>| async move {
            let role = req
                .extensions()
                .get::<AuthContext>()
                .map(|ctx| ctx.role_name.clone())
                .unwrap_or_default();
            Ok::<_, Infallible>(Response::new(Body::from(role)))
        })
    }

    async fn setup() -> (RbacResolver, CredentialStore) {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        store.connect().await.unwrap();
        let catalog = Catalog::new(store.clone());
        catalog.ensure_indexes().await.unwrap();
        BootstrapSeeder::new(catalog).run().await.unwrap();

        let tokens = SessionTokenService::new(TokenConfig::new("guard-test-secret-0123456789abcdef"));
        (
            RbacResolver::new(store.clone(), tokens),
            CredentialStore::new(store, PasswordHasher::for_testing()),
        )
    }

    async fn token_for(resolver: &RbacResolver, credentials: &CredentialStore, role: &str) -> String {
        let user = credentials
            .clone()
            .with_default_role(role)
            .register(NewAccount {
                name: "Guard",
                email: &format!("{role}@guard.test"),
                password: "pw",
            })
            .await
            .unwrap();
        resolver
            .tokens()
            .issue(user.id, user.role_id.to_hex())
            .unwrap()
            .token
    }

    fn request(cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/api/tasks");
        if let Some(token) = cookie {
            builder = builder.header(header::COOKIE, format!("jwt={token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_guard_allows_and_stores_context() {
        let (resolver, credentials) = setup().await;
        let token = token_for(&resolver, &credentials, "user").await;

        let mut service =
            AuthorizeLayer::for_operation(resolver, TaskOperation::List).layer(echo_role());
        let response = service
            .ready()
            .await
            .unwrap()
            .call(request(Some(&token)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"user");
    }

    #[tokio::test]
    async fn test_guard_denies_missing_permission() {
        let (resolver, credentials) = setup().await;
        let token = token_for(&resolver, &credentials, "user").await;

        let mut service = AuthorizeLayer::require(resolver, "delete_task").layer(echo_role());
        let response = service
            .ready()
            .await
            .unwrap()
            .call(request(Some(&token)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_guard_rejects_missing_and_bad_tokens() {
        let (resolver, _) = setup().await;
        let mut service = AuthorizeLayer::require(resolver, "view_task").layer(echo_role());

        let response = service
            .ready()
            .await
            .unwrap()
            .call(request(None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = service
            .ready()
            .await
            .unwrap()
            .call(request(Some("garbage")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_guard_uses_configured_cookie_name() {
        let (resolver, credentials) = setup().await;
        let token = token_for(&resolver, &credentials, "admin").await;

        let mut service = AuthorizeLayer::require(resolver, "delete_task")
            .with_cookie(SessionCookie::new("session"))
            .layer(echo_role());

        let req = Request::builder()
            .uri("/api/tasks")
            .header(header::COOKIE, format!("session={token}"))
            .body(Body::empty())
            .unwrap();
        let response = service.ready().await.unwrap().call(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
