// ABOUTME: Appointment route handlers for booking, listing and status changes
// ABOUTME: Provides REST endpoints over the appointment lifecycle manager
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trimbook Contributors

//! Appointment routes
//!
//! All endpoints require a bearer token. The caller of a booking becomes
//! its client; status changes go through the lifecycle manager, which
//! enforces who may move an appointment along which edge.

use crate::constants::routes as route_paths;
use crate::errors::AppError;
use crate::models::AppointmentStatus;
use crate::server::ServerResources;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

/// Request body for booking creation
#[derive(Debug, Deserialize)]
pub struct CreateAppointmentRequest {
    /// Provider to book with
    pub provider_id: Uuid,
    /// One of the provider's services
    pub service_id: Uuid,
    /// Requested start instant
    pub appointment_time: DateTime<Utc>,
}

/// Request body for a status change
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    /// Requested target status
    pub status: String,
}

/// Appointment routes
pub struct AppointmentRoutes;

impl AppointmentRoutes {
    /// Create all appointment routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(route_paths::APPOINTMENTS, post(Self::handle_create))
            .route(route_paths::APPOINTMENTS, get(Self::handle_list))
            .route(
                "/api/appointments/:id/status",
                patch(Self::handle_update_status),
            )
            .with_state(resources)
    }

    /// Handle POST /api/appointments - Book a service with a provider
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<CreateAppointmentRequest>,
    ) -> Result<Response, AppError> {
        let account = super::authenticate(&headers, &resources).await?;

        let appointment = resources
            .lifecycle
            .create(
                &account,
                body.provider_id,
                body.service_id,
                body.appointment_time,
            )
            .await?;

        Ok((StatusCode::CREATED, Json(appointment)).into_response())
    }

    /// Handle GET /api/appointments - List the caller's appointments
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let account = super::authenticate(&headers, &resources).await?;

        let appointments = resources.lifecycle.list_for(&account).await?;

        Ok((StatusCode::OK, Json(appointments)).into_response())
    }

    /// Handle PATCH /api/appointments/:id/status - Confirm or decline a booking
    async fn handle_update_status(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(body): Json<UpdateStatusRequest>,
    ) -> Result<Response, AppError> {
        let account = super::authenticate(&headers, &resources).await?;

        let appointment_id = Uuid::parse_str(&id)
            .map_err(|_| AppError::invalid_input("Invalid appointment id"))?;
        let target: AppointmentStatus = body.status.parse().map_err(|_| {
            AppError::invalid_input(
                "Status must be one of 'pending', 'confirmed', 'declined', 'completed'",
            )
        })?;

        let appointment = resources
            .lifecycle
            .transition(&account, appointment_id, target)
            .await?;

        Ok((StatusCode::OK, Json(appointment)).into_response())
    }
}
