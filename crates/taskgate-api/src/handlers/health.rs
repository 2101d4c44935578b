// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Health check handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::response::{ComponentStatus, HealthResponse, ReadinessResponse};
use crate::state::AppState;

/// GET /health
///
/// Simple liveness check. Returns 200 OK if the service is running.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse::healthy())
}

/// GET /ready
///
/// Pings the document store; 503 when it does not answer.
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let store = match state.store.ping().await {
        Ok(()) => ComponentStatus::up(state.store.backend()),
        Err(e) => {
            tracing::warn!(error = %e, backend = state.store.backend(), "Store ping failed");
            ComponentStatus::down(state.store.backend(), e.to_string())
        }
    };

    let ready = store.healthy;
    let response = ReadinessResponse {
        ready,
        components: vec![store],
    };

    if ready {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}
