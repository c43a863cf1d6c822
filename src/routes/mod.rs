// ABOUTME: HTTP route modules for the Trimbook booking API
// ABOUTME: Hosts the shared bearer-auth helper and the health endpoint
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trimbook Contributors

//! # HTTP Routes
//!
//! One module per resource; each exposes a `routes(resources)` constructor
//! returning an axum `Router` with its state applied. Authenticated
//! handlers all go through [`authenticate`], which resolves the bearer
//! token to an [`Account`] or fails as unauthenticated.

pub mod appointments;
pub mod auth;
pub mod availability;
pub mod providers;
pub mod services;

pub use appointments::AppointmentRoutes;
pub use auth::AuthRoutes;
pub use availability::AvailabilityRoutes;
pub use providers::ProviderRoutes;
pub use services::ServiceRoutes;

use crate::errors::AppError;
use crate::models::Account;
use crate::server::ServerResources;
use axum::http::HeaderMap;
use std::sync::Arc;

/// Extract and authenticate the calling account from the authorization header
///
/// # Errors
///
/// Returns an error if the header is missing, is not a bearer token, or the
/// token does not resolve to a live account
pub(crate) async fn authenticate(
    headers: &HeaderMap,
    resources: &Arc<ServerResources>,
) -> Result<Account, AppError> {
    let auth_header = headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::auth_required("Missing authorization header"))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::auth_required("Authorization header is not a bearer token"))?;

    resources
        .auth_manager
        .resolve_account(token, &resources.database)
        .await
}

/// Health check routes
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create the liveness route
    #[must_use]
    pub fn routes() -> axum::Router {
        use axum::{routing::get, Json, Router};

        async fn health_handler() -> Json<serde_json::Value> {
            Json(serde_json::json!({
                "status": "healthy",
                "timestamp": chrono::Utc::now().to_rfc3339()
            }))
        }

        Router::new().route(crate::constants::routes::HEALTH, get(health_handler))
    }
}
