// ABOUTME: Server resource container, router assembly and HTTP run loop
// ABOUTME: Wires the database, managers and route modules into one axum service
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trimbook Contributors

//! # Server Assembly
//!
//! [`ServerResources`] is the dependency container built once at startup
//! and shared behind an `Arc`; every route module takes it as axum state.
//! [`BookingServer`] assembles the router and drives the accept loop.

use crate::auth::AuthManager;
use crate::config::ServerConfig;
use crate::credentials::CredentialStore;
use crate::database::Database;
use crate::ratings::RatingAggregator;
use crate::routes::{
    AppointmentRoutes, AuthRoutes, AvailabilityRoutes, HealthRoutes, ProviderRoutes, ServiceRoutes,
};
use crate::scheduling::{AppointmentLifecycle, AvailabilityLedger};
use anyhow::Result;
use axum::Router;
use http::{header::HeaderName, Method};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Centralized resource container for dependency injection
///
/// Built once at startup so expensive shared resources (database pool,
/// auth manager, domain managers) exist exactly once behind `Arc`s.
#[derive(Clone)]
pub struct ServerResources {
    /// Shared database handle
    pub database: Arc<Database>,
    /// Session token issuer and validator
    pub auth_manager: Arc<AuthManager>,
    /// Registration and password verification
    pub credentials: Arc<CredentialStore>,
    /// Availability windows and slot checks
    pub ledger: Arc<AvailabilityLedger>,
    /// Appointment creation and state machine
    pub lifecycle: Arc<AppointmentLifecycle>,
    /// Review intake and rating reads
    pub ratings: Arc<RatingAggregator>,
    /// Resolved server configuration
    pub config: Arc<ServerConfig>,
}

impl ServerResources {
    /// Create new server resources with proper Arc sharing
    #[must_use]
    pub fn new(database: Database, config: ServerConfig) -> Self {
        let database = Arc::new(database);
        let auth_manager = Arc::new(AuthManager::new(
            config.jwt_secret.clone(),
            config.token_expiry_minutes,
        ));

        let credentials = Arc::new(CredentialStore::new(database.clone())); // Safe: Arc clone for shared handle
        let ledger = Arc::new(AvailabilityLedger::new(database.clone())); // Safe: Arc clone for shared handle
        let lifecycle = Arc::new(AppointmentLifecycle::new(database.clone(), ledger.clone())); // Safe: Arc clones for shared handles
        let ratings = Arc::new(RatingAggregator::new(database.clone())); // Safe: Arc clone for shared handle

        Self {
            database,
            auth_manager,
            credentials,
            ledger,
            lifecycle,
            ratings,
            config: Arc::new(config),
        }
    }
}

/// Permissive CORS for browser clients, as the API is public
fn setup_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_headers([
            HeaderName::from_static("content-type"),
            HeaderName::from_static("authorization"),
            HeaderName::from_static("x-requested-with"),
            HeaderName::from_static("accept"),
            HeaderName::from_static("origin"),
            HeaderName::from_static("access-control-request-method"),
            HeaderName::from_static("access-control-request-headers"),
        ])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
            Method::PATCH,
        ])
}

/// The HTTP server for the booking API
pub struct BookingServer {
    resources: Arc<ServerResources>,
}

impl BookingServer {
    /// Create a new server over shared resources
    #[must_use]
    pub const fn new(resources: Arc<ServerResources>) -> Self {
        Self { resources }
    }

    /// Access the shared resources
    #[must_use]
    pub const fn resources(&self) -> &Arc<ServerResources> {
        &self.resources
    }

    /// Assemble the full application router
    ///
    /// Exposed separately from [`Self::run`] so tests can drive the router
    /// without binding a socket.
    #[must_use]
    pub fn router(&self) -> Router {
        let resources = &self.resources;

        Router::new()
            .merge(HealthRoutes::routes())
            .merge(AuthRoutes::routes(resources.clone())) // Safe: Arc clone for route state
            .merge(ProviderRoutes::routes(resources.clone())) // Safe: Arc clone for route state
            .merge(ServiceRoutes::routes(resources.clone())) // Safe: Arc clone for route state
            .merge(AvailabilityRoutes::routes(resources.clone())) // Safe: Arc clone for route state
            .merge(AppointmentRoutes::routes(resources.clone())) // Safe: Arc clone for route state
            .layer(TraceLayer::new_for_http())
            .layer(setup_cors())
    }

    /// Bind the configured port and serve until shutdown
    ///
    /// # Errors
    ///
    /// Returns an error if the port cannot be bound or the accept loop
    /// fails
    pub async fn run(&self) -> Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.resources.config.http_port));
        let listener = TcpListener::bind(addr).await?;

        tracing::info!(
            "Booking API listening on {} ({})",
            addr,
            self.resources.config.environment
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

/// Resolve when the process receives a shutdown request
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received, stopping server"),
        Err(e) => tracing::error!("Failed to listen for shutdown signal: {e}"),
    }
}
