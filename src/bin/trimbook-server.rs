// ABOUTME: Server binary for the Trimbook booking API
// ABOUTME: Loads configuration, opens the database and serves the REST surface
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trimbook Contributors

//! # Trimbook Server Binary
//!
//! This binary starts the booking API with account authentication, the
//! availability ledger and the appointment lifecycle over one HTTP port.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use trimbook::{
    config::ServerConfig,
    database::Database,
    logging,
    server::{BookingServer, ServerResources},
};

#[derive(Parser)]
#[command(name = "trimbook-server")]
#[command(about = "Trimbook - booking and identity API for barber shops")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override database URL
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Handle container environments where clap may not work properly
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Argument parsing failed: {e}");
            eprintln!("Using environment configuration");
            Args {
                http_port: None,
                database_url: None,
            }
        }
    };

    // Initialize logging before config load so its warnings are visible
    logging::init_from_env()?;

    // Load configuration from environment
    let mut config = ServerConfig::from_env()?;

    // Apply command-line overrides
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(database_url) = args.database_url {
        config.database_url = database_url;
    }

    info!("Starting Trimbook booking API ({})", config.environment);
    info!("Database URL: {}", config.database_url);

    let database = Database::new(&config.database_url).await?;
    let account_count = database.get_account_count().await?;
    info!("Database initialized successfully ({account_count} accounts on record)");

    let resources = Arc::new(ServerResources::new(database, config.clone()));
    let server = BookingServer::new(resources);

    display_available_endpoints(&config);

    info!("Ready to take bookings");

    if let Err(e) = server.run().await {
        error!("Server error: {e}");
        return Err(e);
    }

    Ok(())
}

/// Display all available API endpoints with their ports
fn display_available_endpoints(config: &ServerConfig) {
    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

    info!("=== Available API Endpoints ===");
    display_auth_endpoints(&host, config.http_port);
    display_catalog_endpoints(&host, config.http_port);
    display_booking_endpoints(&host, config.http_port);
    display_review_endpoints(&host, config.http_port);
    info!("=== End of Endpoint List ===");
}

#[allow(clippy::cognitive_complexity)]
fn display_auth_endpoints(host: &str, port: u16) {
    info!("Authentication:");
    info!("   Health Check:      GET  http://{host}:{port}/api/health");
    info!("   Registration:      POST http://{host}:{port}/api/auth/register");
    info!("   Login:             POST http://{host}:{port}/api/auth/login");
    info!("   Current Account:   GET  http://{host}:{port}/api/auth/me");
}

#[allow(clippy::cognitive_complexity)]
fn display_catalog_endpoints(host: &str, port: u16) {
    info!("Provider Catalog:");
    info!("   List Providers:    GET  http://{host}:{port}/api/providers");
    info!("   Provider Rating:   GET  http://{host}:{port}/api/providers/{{id}}/rating");
    info!("   Provider Reviews:  GET  http://{host}:{port}/api/providers/{{id}}/reviews");
    info!("   Create Service:    POST http://{host}:{port}/api/services");
    info!("   List Services:     GET  http://{host}:{port}/api/services");
}

#[allow(clippy::cognitive_complexity)]
fn display_booking_endpoints(host: &str, port: u16) {
    info!("Booking:");
    info!("   Publish Window:    POST http://{host}:{port}/api/availability");
    info!("   List Windows:      GET  http://{host}:{port}/api/availability/{{provider_id}}");
    info!("   Book Appointment:  POST http://{host}:{port}/api/appointments");
    info!("   My Appointments:   GET  http://{host}:{port}/api/appointments");
    info!("   Update Status:     PATCH http://{host}:{port}/api/appointments/{{id}}/status");
}

#[allow(clippy::cognitive_complexity)]
fn display_review_endpoints(host: &str, port: u16) {
    info!("Reviews:");
    info!("   Submit Review:     POST http://{host}:{port}/api/reviews");
}
