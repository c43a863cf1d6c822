// ABOUTME: Database management for the Trimbook booking API
// ABOUTME: Owns the SQLite pool, runs migrations and hosts per-entity query modules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trimbook Contributors

//! # Database Management
//!
//! SQLite-backed storage for accounts, services, availability windows,
//! appointments and reviews. Each entity keeps its queries in its own
//! submodule; all of them hang off the shared [`Database`] handle.

mod accounts;
mod appointments;
mod availability;
mod reviews;
mod services;

pub use appointments::BookedSlot;

use anyhow::Result;
use sqlx::{Pool, Sqlite, SqlitePool};

/// Database manager for booking and identity storage
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Create a new database connection and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or a
    /// migration fails
    pub async fn new(database_url: &str) -> Result<Self> {
        // Ensure SQLite creates the database file if it doesn't exist
        let connection_options = if database_url.starts_with("sqlite:") {
            format!("{database_url}?mode=rwc")
        } else {
            database_url.to_string()
        };

        let pool = SqlitePool::connect(&connection_options).await?;

        let db = Self { pool };

        // Run migrations
        db.migrate().await?;

        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if any table or index creation fails
    pub async fn migrate(&self) -> Result<()> {
        // Account tables
        self.migrate_accounts().await?;

        // Service catalog tables
        self.migrate_services().await?;

        // Availability tables
        self.migrate_availability().await?;

        // Appointment tables
        self.migrate_appointments().await?;

        // Review tables
        self.migrate_reviews().await?;

        Ok(())
    }
}
