// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides common database, resource and account creation helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trimbook Contributors
#![allow(
    dead_code,
    clippy::wildcard_in_or_patterns,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions
)]
//! Shared test utilities for `trimbook`
//!
//! This module provides common test setup functions to reduce duplication
//! across integration tests.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Once};
use trimbook::{
    auth::{generate_jwt_secret, AuthManager},
    config::{Environment, ServerConfig},
    database::Database,
    models::{Account, AccountRole, ServiceOffering},
    server::ServerResources,
};
use uuid::Uuid;

/// Password accepted by the registration length rule, shared by all test accounts
pub const TEST_PASSWORD: &str = "correct-horse-battery";

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        // Check for TEST_LOG environment variable to control test logging level
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            Ok("WARN" | "ERROR") | _ => tracing::Level::WARN, // Default to WARN for quiet tests
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Standard test database setup
pub async fn create_test_database() -> Result<Arc<Database>> {
    init_test_logging();
    let database = Arc::new(Database::new("sqlite::memory:").await?);
    Ok(database)
}

/// Create a test authentication manager with a fresh random secret
pub fn create_test_auth_manager() -> Result<Arc<AuthManager>> {
    let jwt_secret = generate_jwt_secret()?.to_vec();
    Ok(Arc::new(AuthManager::new(jwt_secret, 30)))
}

/// Server configuration pointing at an isolated in-memory database
pub fn test_server_config() -> Result<ServerConfig> {
    Ok(ServerConfig {
        http_port: 8081,
        database_url: "sqlite::memory:".into(),
        jwt_secret: generate_jwt_secret()?.to_vec(),
        token_expiry_minutes: 30,
        environment: Environment::Testing,
    })
}

/// Full resource bundle backed by a fresh in-memory database
pub async fn create_test_resources() -> Result<Arc<ServerResources>> {
    init_test_logging();
    let database = Database::new("sqlite::memory:").await?;
    Ok(Arc::new(ServerResources::new(database, test_server_config()?)))
}

/// Resource bundle over an existing database (used by file-backed tests)
pub fn create_resources_for(database: Database) -> Result<Arc<ServerResources>> {
    init_test_logging();
    Ok(Arc::new(ServerResources::new(database, test_server_config()?)))
}

/// Register a client account through the credential store
pub async fn register_test_client(
    resources: &Arc<ServerResources>,
    email: &str,
) -> Result<Account> {
    let account = resources
        .credentials
        .register(
            email,
            TEST_PASSWORD,
            AccountRole::Client,
            "Test Client".into(),
            None,
        )
        .await?;
    Ok(account)
}

/// Register a provider account through the credential store
pub async fn register_test_provider(
    resources: &Arc<ServerResources>,
    email: &str,
) -> Result<Account> {
    let account = resources
        .credentials
        .register(
            email,
            TEST_PASSWORD,
            AccountRole::Provider,
            "Test Provider".into(),
            Some("Cuts and shaves".into()),
        )
        .await?;
    Ok(account)
}

/// Insert a service offering for a provider directly
pub async fn create_test_service(
    resources: &Arc<ServerResources>,
    provider_id: Uuid,
    name: &str,
    duration_minutes: i64,
) -> Result<ServiceOffering> {
    let service = ServiceOffering::new(provider_id, name.to_owned(), None, 30.0, duration_minutes);
    resources.database.create_service(&service).await?;
    Ok(service)
}

/// An instant a fixed number of minutes from now; negative values go backwards
pub fn minutes_from_now(minutes: i64) -> DateTime<Utc> {
    Utc::now() + Duration::minutes(minutes)
}

/// Bearer token for an account, minted by the resource bundle's auth manager
pub fn bearer_token(resources: &Arc<ServerResources>, account: &Account) -> Result<String> {
    Ok(resources.auth_manager.generate_token(account)?.token)
}

/// Provider with one 30-minute service and one eight-hour window
///
/// The window opens at `window_start_minutes` from now; negative offsets
/// produce a window entirely in the past, which is how completed
/// appointments are staged.
pub async fn setup_bookable_provider(
    resources: &Arc<ServerResources>,
    email: &str,
    window_start_minutes: i64,
) -> Result<(Account, ServiceOffering, DateTime<Utc>)> {
    let provider = register_test_provider(resources, email).await?;
    let service = create_test_service(resources, provider.id, "Classic Cut", 30).await?;
    let window_start = minutes_from_now(window_start_minutes);
    resources
        .ledger
        .publish(provider.id, window_start, window_start + Duration::hours(8))
        .await?;
    Ok((provider, service, window_start))
}
