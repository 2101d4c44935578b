// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Harness
//!
//! [`TestApp`] runs the full router in process over a seeded
//! [`MemoryStore`](taskgate_core::MemoryStore). Requests go through
//! `tower::ServiceExt::oneshot`, so no socket is bound.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use taskgate_api::{ApiConfig, ApiServer, AppState, PasswordHasher};
use taskgate_core::DocumentStore;

use super::fixtures::{self, Account};

// =============================================================================
// TestResponse
// =============================================================================

/// A buffered response.
#[derive(Debug)]
pub struct TestResponse {
    /// Status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Parsed JSON body, or `Null` when empty.
    pub body: Value,
}

impl TestResponse {
    /// Returns the `Set-Cookie` header as a string.
    pub fn set_cookie(&self) -> Option<&str> {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
    }

    /// Returns `name=value` from `Set-Cookie`, ready for a `Cookie` header.
    pub fn cookie_pair(&self) -> Option<String> {
        self.set_cookie()
            .and_then(|c| c.split(';').next())
            .map(|pair| pair.trim().to_string())
    }

    /// Returns `error.code` from an error body.
    pub fn error_code(&self) -> Option<&str> {
        self.body["error"]["code"].as_str()
    }

    /// Returns `error.message` from an error body.
    pub fn error_message(&self) -> Option<&str> {
        self.body["error"]["message"].as_str()
    }
}

// =============================================================================
// TestApp
// =============================================================================

/// An in-process server over a seeded store.
pub struct TestApp {
    /// Shared application state.
    pub state: AppState,
    router: Router,
}

impl TestApp {
    /// Builds an app with the default test configuration.
    pub async fn spawn() -> Self {
        Self::with_config(fixtures::api_config()).await
    }

    /// Builds an app with `config` over a freshly seeded store.
    pub async fn with_config(config: ApiConfig) -> Self {
        super::init_test_logging();
        let store = fixtures::seeded_store().await;
        Self::with_store(config, store)
    }

    /// Builds an app over an existing store.
    pub fn with_store(config: ApiConfig, store: Arc<dyn DocumentStore>) -> Self {
        let state = AppState::builder()
            .config(config)
            .store(store)
            .password_hasher(PasswordHasher::for_testing())
            .build()
            .expect("app state");
        let router = ApiServer::new(state.clone()).router();
        Self { state, router }
    }

    /// Returns the document store.
    pub fn store(&self) -> Arc<dyn DocumentStore> {
        self.state.store.clone()
    }

    /// Sends a request and buffers the response.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Sends a request without a body.
    pub async fn call(&self, method: Method, path: &str, cookie: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).expect("valid request"))
            .await
    }

    /// Sends a JSON body.
    pub async fn call_json(
        &self,
        method: Method,
        path: &str,
        body: &Value,
        cookie: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(
            builder
                .body(Body::from(body.to_string()))
                .expect("valid request"),
        )
        .await
    }

    /// `GET path`.
    pub async fn get(&self, path: &str, cookie: Option<&str>) -> TestResponse {
        self.call(Method::GET, path, cookie).await
    }

    /// `POST path` with a JSON body.
    pub async fn post(&self, path: &str, body: &Value, cookie: Option<&str>) -> TestResponse {
        self.call_json(Method::POST, path, body, cookie).await
    }

    /// `PUT path` with a JSON body.
    pub async fn put(&self, path: &str, body: &Value, cookie: Option<&str>) -> TestResponse {
        self.call_json(Method::PUT, path, body, cookie).await
    }

    /// `DELETE path`.
    pub async fn delete(&self, path: &str, cookie: Option<&str>) -> TestResponse {
        self.call(Method::DELETE, path, cookie).await
    }

    // =========================================================================
    // Session helpers
    // =========================================================================

    /// Registers `account` over HTTP.
    pub async fn register(&self, account: &Account) -> TestResponse {
        self.post("/api/register", &account.register_body(), None)
            .await
    }

    /// Logs in over HTTP.
    pub async fn login(&self, account: &Account) -> TestResponse {
        self.post("/api/login", &account.login_body(), None).await
    }

    /// Registers and logs in, returning the `Cookie` header value.
    pub async fn signup_and_login(&self, account: &Account) -> String {
        let registered = self.register(account).await;
        assert_eq!(registered.status, StatusCode::CREATED, "{:?}", registered.body);
        self.login_cookie(account).await
    }

    /// Logs in an existing account, returning the `Cookie` header value.
    pub async fn login_cookie(&self, account: &Account) -> String {
        let response = self.login(account).await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.cookie_pair().expect("login sets a cookie")
    }

    /// Registers [`fixtures::ROOT`] as an admin and logs in.
    pub async fn admin_cookie(&self) -> String {
        fixtures::register_admin(self.store()).await;
        self.login_cookie(&fixtures::ROOT).await
    }
}
