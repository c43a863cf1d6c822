// ABOUTME: Availability route handlers for publishing and browsing booking windows
// ABOUTME: Provides REST endpoints over the availability ledger
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trimbook Contributors

//! Availability routes
//!
//! A provider publishes windows under its own account; the per-provider
//! window listing is public so clients can find bookable times. Role
//! enforcement for publication lives here, above the ledger.

use crate::constants::routes as route_paths;
use crate::errors::AppError;
use crate::server::ServerResources;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

/// Request body for window publication
#[derive(Debug, Deserialize)]
pub struct PublishWindowRequest {
    /// Inclusive start of the window
    pub start_time: DateTime<Utc>,
    /// Exclusive end of the window
    pub end_time: DateTime<Utc>,
}

/// Availability routes
pub struct AvailabilityRoutes;

impl AvailabilityRoutes {
    /// Create all availability routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(route_paths::AVAILABILITY, post(Self::handle_publish))
            .route("/api/availability/:provider_id", get(Self::handle_list))
            .with_state(resources)
    }

    /// Handle POST /api/availability - Publish a window for the caller
    async fn handle_publish(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<PublishWindowRequest>,
    ) -> Result<Response, AppError> {
        let account = super::authenticate(&headers, &resources).await?;
        if !account.role.is_provider() {
            return Err(AppError::NotAProvider);
        }

        let window = resources
            .ledger
            .publish(account.id, body.start_time, body.end_time)
            .await?;

        Ok((StatusCode::CREATED, Json(window)).into_response())
    }

    /// Handle GET /api/availability/:provider_id - List a provider's windows
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        Path(provider_id): Path<String>,
    ) -> Result<Response, AppError> {
        let provider_id = Uuid::parse_str(&provider_id)
            .map_err(|_| AppError::invalid_input("Invalid provider id"))?;

        let windows = resources.ledger.windows_for(provider_id).await?;

        Ok((StatusCode::OK, Json(windows)).into_response())
    }
}
