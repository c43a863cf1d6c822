// ABOUTME: Availability window database operations
// ABOUTME: Handles storage and retrieval of provider booking windows
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trimbook Contributors

use super::Database;
use crate::models::AvailabilityWindow;
use anyhow::Result;
use sqlx::Row;
use uuid::Uuid;

impl Database {
    /// Create availability windows table
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The database schema migration fails
    /// - Table creation fails
    /// - Index creation fails
    pub(super) async fn migrate_availability(&self) -> Result<()> {
        // Create availability_windows table
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS availability_windows (
                id TEXT PRIMARY KEY,
                provider_id TEXT NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
                start_time DATETIME NOT NULL,
                end_time DATETIME NOT NULL,
                CHECK (end_time > start_time)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        // Create indexes
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_availability_provider ON availability_windows(provider_id)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a new availability window
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create_availability_window(&self, window: &AvailabilityWindow) -> Result<Uuid> {
        sqlx::query(
            r"
            INSERT INTO availability_windows (id, provider_id, start_time, end_time)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(window.id.to_string())
        .bind(window.provider_id.to_string())
        .bind(window.start_time)
        .bind(window.end_time)
        .execute(&self.pool)
        .await?;

        Ok(window.id)
    }

    /// List a provider's availability windows, ordered by start time
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_windows_for_provider(
        &self,
        provider_id: Uuid,
    ) -> Result<Vec<AvailabilityWindow>> {
        let rows = sqlx::query(
            r"
            SELECT id, provider_id, start_time, end_time
            FROM availability_windows WHERE provider_id = $1
            ORDER BY start_time
            ",
        )
        .bind(provider_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_window).collect()
    }

    /// Convert a database row to an AvailabilityWindow struct
    fn row_to_window(row: &sqlx::sqlite::SqliteRow) -> Result<AvailabilityWindow> {
        let id: String = row.get("id");
        let provider_id: String = row.get("provider_id");
        let start_time: chrono::DateTime<chrono::Utc> = row.get("start_time");
        let end_time: chrono::DateTime<chrono::Utc> = row.get("end_time");

        Ok(AvailabilityWindow {
            id: Uuid::parse_str(&id)?,
            provider_id: Uuid::parse_str(&provider_id)?,
            start_time,
            end_time,
        })
    }
}
