// ABOUTME: Service catalog database operations
// ABOUTME: Handles storage and lookup of bookable services published by providers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trimbook Contributors

use super::Database;
use crate::models::ServiceOffering;
use anyhow::Result;
use sqlx::Row;
use uuid::Uuid;

impl Database {
    /// Create services table
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The database schema migration fails
    /// - Table creation fails
    /// - Index creation fails
    pub(super) async fn migrate_services(&self) -> Result<()> {
        // Create services table
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS services (
                id TEXT PRIMARY KEY,
                provider_id TEXT NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                description TEXT,
                price REAL NOT NULL CHECK (price >= 0.0),
                duration_minutes INTEGER NOT NULL CHECK (duration_minutes > 0)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        // Create indexes
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_services_provider ON services(provider_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Insert a new service offering
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create_service(&self, service: &ServiceOffering) -> Result<Uuid> {
        sqlx::query(
            r"
            INSERT INTO services (id, provider_id, name, description, price, duration_minutes)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(service.id.to_string())
        .bind(service.provider_id.to_string())
        .bind(&service.name)
        .bind(&service.description)
        .bind(service.price)
        .bind(service.duration_minutes)
        .execute(&self.pool)
        .await?;

        Ok(service.id)
    }

    /// Get a service by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_service(&self, service_id: Uuid) -> Result<Option<ServiceOffering>> {
        let row = sqlx::query(
            r"
            SELECT id, provider_id, name, description, price, duration_minutes
            FROM services WHERE id = $1
            ",
        )
        .bind(service_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = row {
            let service = Self::row_to_service(&row)?;
            Ok(Some(service))
        } else {
            Ok(None)
        }
    }

    /// List all services, ordered by name
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_services(&self) -> Result<Vec<ServiceOffering>> {
        let rows = sqlx::query(
            r"
            SELECT id, provider_id, name, description, price, duration_minutes
            FROM services
            ORDER BY name
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_service).collect()
    }

    /// List the services published by one provider, ordered by name
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_services_for_provider(
        &self,
        provider_id: Uuid,
    ) -> Result<Vec<ServiceOffering>> {
        let rows = sqlx::query(
            r"
            SELECT id, provider_id, name, description, price, duration_minutes
            FROM services WHERE provider_id = $1
            ORDER BY name
            ",
        )
        .bind(provider_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_service).collect()
    }

    /// Convert a database row to a ServiceOffering struct
    fn row_to_service(row: &sqlx::sqlite::SqliteRow) -> Result<ServiceOffering> {
        let id: String = row.get("id");
        let provider_id: String = row.get("provider_id");
        let name: String = row.get("name");
        let description: Option<String> = row.get("description");
        let price: f64 = row.get("price");
        let duration_minutes: i64 = row.get("duration_minutes");

        Ok(ServiceOffering {
            id: Uuid::parse_str(&id)?,
            provider_id: Uuid::parse_str(&provider_id)?,
            name,
            description,
            price,
            duration_minutes,
        })
    }
}
