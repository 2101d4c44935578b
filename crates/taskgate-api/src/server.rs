// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API server implementation.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    handler::Handler,
    http::{header, HeaderValue, Method, StatusCode},
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::auth::TaskOperation;
use crate::config::{ApiConfig, CorsConfig};
use crate::error::{ApiError, ApiResult};
use crate::handlers;
use crate::middleware::AuthorizeLayer;
use crate::state::AppState;

// =============================================================================
// ApiServer
// =============================================================================

/// The API server.
///
/// This is the main entry point for creating and running the HTTP server.
pub struct ApiServer {
    state: AppState,
    config: Arc<ApiConfig>,
}

impl ApiServer {
    /// Creates a new API server with the given state.
    pub fn new(state: AppState) -> Self {
        let config = state.config.clone();
        Self { state, config }
    }

    /// Returns the shared state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    fn guard(&self, operation: TaskOperation) -> AuthorizeLayer {
        AuthorizeLayer::for_operation(self.state.resolver.clone(), operation)
            .with_cookie(self.state.cookie.clone())
    }

    /// Creates the router with all routes and middleware.
    pub fn router(&self) -> Router {
        let middleware_stack = ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                self.config.request_timeout,
            ))
            .layer(create_cors_layer(&self.config.cors));

        Router::new()
            // Health endpoints
            .route("/health", get(handlers::health))
            .route("/ready", get(handlers::ready))
            // Account and session endpoints
            .route("/api/register", post(handlers::register))
            .route("/api/login", post(handlers::login))
            .route("/api/user", get(handlers::current_user))
            .route("/api/logout", post(handlers::logout))
            // Task endpoints, one guard per operation
            .route(
                "/api/tasks",
                get(handlers::list_tasks.layer(self.guard(TaskOperation::List)))
                    .post(handlers::create_task.layer(self.guard(TaskOperation::Create))),
            )
            .route(
                "/api/tasks/{id}",
                put(handlers::update_task.layer(self.guard(TaskOperation::Update)))
                    .delete(handlers::delete_task.layer(self.guard(TaskOperation::Delete))),
            )
            .layer(middleware_stack)
            .with_state(self.state.clone())
    }

    /// Runs the server.
    pub async fn run(self) -> ApiResult<()> {
        self.run_with_shutdown(std::future::pending()).await
    }

    /// Runs the server with graceful shutdown.
    pub async fn run_with_shutdown(
        self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> ApiResult<()> {
        let addr = self.config.socket_addr();
        let router = self.router();

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ApiError::internal(format!("Failed to bind {addr}: {e}")))?;

        info!(addr = %addr, "Starting API server");

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| ApiError::internal(format!("Server error: {e}")))?;

        info!("API server shutdown complete");

        Ok(())
    }

    /// Returns the server address.
    pub fn addr(&self) -> SocketAddr {
        self.config.socket_addr()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Creates the CORS layer from configuration.
///
/// Credentials are only allowed together with an explicit origin list.
fn create_cors_layer(cors: &CorsConfig) -> CorsLayer {
    let methods: Vec<Method> = cors
        .allowed_methods
        .iter()
        .filter_map(|m| m.parse().ok())
        .collect();

    let layer = CorsLayer::new()
        .max_age(cors.max_age)
        .allow_methods(methods)
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT]);

    if cors.allows_any_origin() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = cors
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(cors.allow_credentials)
}

// =============================================================================
// Tests
// =============================================================================
