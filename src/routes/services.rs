// ABOUTME: Service catalog route handlers for publishing and browsing offerings
// ABOUTME: Provides REST endpoints for provider service creation and public listing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trimbook Contributors

//! Service catalog routes
//!
//! Providers publish offerings under their own account; anyone may browse
//! the catalog, optionally filtered to one provider.

use crate::constants::routes as route_paths;
use crate::errors::AppError;
use crate::models::ServiceOffering;
use crate::server::ServerResources;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

/// Request body for service creation
#[derive(Debug, Deserialize)]
pub struct CreateServiceRequest {
    /// Service name shown to clients
    pub name: String,
    /// Optional longer description
    #[serde(default)]
    pub description: Option<String>,
    /// Price in the provider's currency
    pub price: f64,
    /// Appointment length in minutes
    pub duration_minutes: i64,
}

/// Query parameters for the service listing
#[derive(Debug, Deserialize, Default)]
pub struct ServicesQuery {
    /// Restrict the listing to one provider
    #[serde(default)]
    pub provider_id: Option<Uuid>,
}

/// Service catalog routes
pub struct ServiceRoutes;

impl ServiceRoutes {
    /// Create all service catalog routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(route_paths::SERVICES, post(Self::handle_create))
            .route(route_paths::SERVICES, get(Self::handle_list))
            .with_state(resources)
    }

    /// Handle POST /api/services - Publish a service under the caller's account
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<CreateServiceRequest>,
    ) -> Result<Response, AppError> {
        let account = super::authenticate(&headers, &resources).await?;
        if !account.role.is_provider() {
            return Err(AppError::NotAProvider);
        }

        let name = body.name.trim();
        if name.is_empty() {
            return Err(AppError::invalid_input("Service name must not be empty"));
        }
        if body.price < 0.0 {
            return Err(AppError::invalid_input("Price must not be negative"));
        }
        if body.duration_minutes <= 0 {
            return Err(AppError::invalid_input("Duration must be positive"));
        }

        let service = ServiceOffering::new(
            account.id,
            name.to_owned(),
            body.description,
            body.price,
            body.duration_minutes,
        );
        resources.database.create_service(&service).await?;

        tracing::info!(
            "Service {} ('{}') published by provider {}",
            service.id,
            service.name,
            account.id
        );

        Ok((StatusCode::CREATED, Json(service)).into_response())
    }

    /// Handle GET /api/services - List services, optionally for one provider
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        Query(query): Query<ServicesQuery>,
    ) -> Result<Response, AppError> {
        let services = match query.provider_id {
            Some(provider_id) => {
                resources
                    .database
                    .list_services_for_provider(provider_id)
                    .await?
            }
            None => resources.database.list_services().await?,
        };

        Ok((StatusCode::OK, Json(services)).into_response())
    }
}
