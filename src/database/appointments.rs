// ABOUTME: Appointment database operations
// ABOUTME: Handles booking storage, status updates, listings and the elapsed-completion sweep
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trimbook Contributors

use super::Database;
use crate::models::{Appointment, AppointmentDetails, AppointmentStatus};
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

/// Start and length of a booking that holds a provider's time
///
/// Read-side projection used for slot collision checks; any non-declined
/// appointment blocks the interval it covers.
#[derive(Debug, Clone, Copy)]
pub struct BookedSlot {
    /// Appointment holding the slot
    pub appointment_id: Uuid,
    /// Scheduled start instant
    pub start_time: DateTime<Utc>,
    /// Service duration in minutes
    pub duration_minutes: i64,
}

impl BookedSlot {
    /// Instant at which the booked interval ends
    #[must_use]
    pub fn end_time(&self) -> DateTime<Utc> {
        self.start_time + chrono::Duration::minutes(self.duration_minutes)
    }
}

impl Database {
    /// Create appointments table
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The database schema migration fails
    /// - Table creation fails
    /// - Index creation fails
    pub(super) async fn migrate_appointments(&self) -> Result<()> {
        // Create appointments table
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS appointments (
                id TEXT PRIMARY KEY,
                client_id TEXT NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
                provider_id TEXT NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
                service_id TEXT NOT NULL REFERENCES services(id) ON DELETE CASCADE,
                appointment_time DATETIME NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending' CHECK (status IN ('pending', 'confirmed', 'declined', 'completed')),
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        // Create indexes
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_appointments_provider_time ON appointments(provider_id, appointment_time)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_appointments_client ON appointments(client_id)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_appointments_status ON appointments(status)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Insert a new appointment
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create_appointment(&self, appointment: &Appointment) -> Result<Uuid> {
        sqlx::query(
            r"
            INSERT INTO appointments (
                id, client_id, provider_id, service_id, appointment_time, status, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(appointment.id.to_string())
        .bind(appointment.client_id.to_string())
        .bind(appointment.provider_id.to_string())
        .bind(appointment.service_id.to_string())
        .bind(appointment.appointment_time)
        .bind(appointment.status.as_str())
        .bind(appointment.created_at)
        .execute(&self.pool)
        .await?;

        Ok(appointment.id)
    }

    /// Get an appointment by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_appointment(&self, appointment_id: Uuid) -> Result<Option<Appointment>> {
        let row = sqlx::query(
            r"
            SELECT id, client_id, provider_id, service_id, appointment_time, status, created_at
            FROM appointments WHERE id = $1
            ",
        )
        .bind(appointment_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = row {
            let appointment = Self::row_to_appointment(&row)?;
            Ok(Some(appointment))
        } else {
            Ok(None)
        }
    }

    /// Set an appointment's status
    ///
    /// Pure storage write; transition legality is enforced by the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn update_appointment_status(
        &self,
        appointment_id: Uuid,
        status: AppointmentStatus,
    ) -> Result<()> {
        sqlx::query("UPDATE appointments SET status = $2 WHERE id = $1")
            .bind(appointment_id.to_string())
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// List the appointments an account participates in, as client or
    /// provider, ordered by appointment time
    ///
    /// Each row is joined with the provider's display name and the service
    /// name and duration at read time.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_appointments_for_account(
        &self,
        account_id: Uuid,
    ) -> Result<Vec<AppointmentDetails>> {
        let rows = sqlx::query(
            r"
            SELECT a.id, a.client_id, a.provider_id, a.service_id,
                   a.appointment_time, a.status, a.created_at,
                   p.display_name AS provider_name,
                   s.name AS service_name, s.duration_minutes
            FROM appointments a
            JOIN accounts p ON p.id = a.provider_id
            JOIN services s ON s.id = a.service_id
            WHERE a.client_id = $1 OR a.provider_id = $1
            ORDER BY a.appointment_time
            ",
        )
        .bind(account_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let appointment = Self::row_to_appointment(row)?;
                Ok(AppointmentDetails {
                    appointment,
                    provider_name: row.get("provider_name"),
                    service_name: row.get("service_name"),
                    duration_minutes: row.get("duration_minutes"),
                })
            })
            .collect()
    }

    /// List the intervals held by a provider's non-declined appointments,
    /// ordered by start time
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_booked_slots(&self, provider_id: Uuid) -> Result<Vec<BookedSlot>> {
        let rows = sqlx::query(
            r"
            SELECT a.id, a.appointment_time, s.duration_minutes
            FROM appointments a
            JOIN services s ON s.id = a.service_id
            WHERE a.provider_id = $1 AND a.status != 'declined'
            ORDER BY a.appointment_time
            ",
        )
        .bind(provider_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let id: String = row.get("id");
                Ok(BookedSlot {
                    appointment_id: Uuid::parse_str(&id)?,
                    start_time: row.get("appointment_time"),
                    duration_minutes: row.get("duration_minutes"),
                })
            })
            .collect()
    }

    /// Mark every confirmed appointment whose service interval has fully
    /// elapsed by `now` as completed
    ///
    /// Returns the number of appointments that changed state.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn complete_elapsed_appointments(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query(
            r"
            UPDATE appointments SET status = 'completed'
            WHERE status = 'confirmed'
              AND id IN (
                  SELECT a.id
                  FROM appointments a
                  JOIN services s ON s.id = a.service_id
                  WHERE a.status = 'confirmed'
                    AND datetime(a.appointment_time, '+' || s.duration_minutes || ' minutes') <= datetime($1)
              )
            ",
        )
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Convert a database row to an Appointment struct
    fn row_to_appointment(row: &sqlx::sqlite::SqliteRow) -> Result<Appointment> {
        let id: String = row.get("id");
        let client_id: String = row.get("client_id");
        let provider_id: String = row.get("provider_id");
        let service_id: String = row.get("service_id");
        let appointment_time: DateTime<Utc> = row.get("appointment_time");
        let status: String = row.get("status");
        let created_at: DateTime<Utc> = row.get("created_at");

        Ok(Appointment {
            id: Uuid::parse_str(&id)?,
            client_id: Uuid::parse_str(&client_id)?,
            provider_id: Uuid::parse_str(&provider_id)?,
            service_id: Uuid::parse_str(&service_id)?,
            appointment_time,
            status: status.parse()?,
            created_at,
        })
    }
}
