// ABOUTME: Review database operations
// ABOUTME: Handles review storage, per-appointment lookup and provider rating aggregates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trimbook Contributors

use super::Database;
use crate::models::Review;
use anyhow::Result;
use sqlx::Row;
use uuid::Uuid;

impl Database {
    /// Create reviews table
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The database schema migration fails
    /// - Table creation fails
    /// - Index creation fails
    pub(super) async fn migrate_reviews(&self) -> Result<()> {
        // Create reviews table
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS reviews (
                id TEXT PRIMARY KEY,
                appointment_id TEXT NOT NULL UNIQUE REFERENCES appointments(id) ON DELETE CASCADE,
                client_id TEXT NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
                provider_id TEXT NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
                rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
                comment TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        // Create indexes
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_reviews_provider ON reviews(provider_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Insert a new review
    ///
    /// The UNIQUE constraint on `appointment_id` backs the one-review-per-
    /// appointment rule against concurrent submissions.
    ///
    /// # Errors
    ///
    /// Returns an error if the appointment already has a review or the
    /// insert fails
    pub async fn create_review(&self, review: &Review) -> Result<Uuid> {
        sqlx::query(
            r"
            INSERT INTO reviews (
                id, appointment_id, client_id, provider_id, rating, comment, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(review.id.to_string())
        .bind(review.appointment_id.to_string())
        .bind(review.client_id.to_string())
        .bind(review.provider_id.to_string())
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.created_at)
        .execute(&self.pool)
        .await?;

        Ok(review.id)
    }

    /// Get the review attached to an appointment, if any
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_review_for_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<Option<Review>> {
        let row = sqlx::query(
            r"
            SELECT id, appointment_id, client_id, provider_id, rating, comment, created_at
            FROM reviews WHERE appointment_id = $1
            ",
        )
        .bind(appointment_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = row {
            let review = Self::row_to_review(&row)?;
            Ok(Some(review))
        } else {
            Ok(None)
        }
    }

    /// List a provider's reviews, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_reviews_for_provider(&self, provider_id: Uuid) -> Result<Vec<Review>> {
        let rows = sqlx::query(
            r"
            SELECT id, appointment_id, client_id, provider_id, rating, comment, created_at
            FROM reviews WHERE provider_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(provider_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_review).collect()
    }

    /// Get the raw rating aggregate for a provider
    ///
    /// Returns the unrounded mean (None when the provider has no reviews)
    /// and the review count.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_rating_aggregate(&self, provider_id: Uuid) -> Result<(Option<f64>, i64)> {
        let row = sqlx::query(
            r"
            SELECT AVG(rating) AS average, COUNT(*) AS review_count
            FROM reviews WHERE provider_id = $1
            ",
        )
        .bind(provider_id.to_string())
        .fetch_one(&self.pool)
        .await?;

        let average: Option<f64> = row.get("average");
        let review_count: i64 = row.get("review_count");

        Ok((average, review_count))
    }

    /// Convert a database row to a Review struct
    fn row_to_review(row: &sqlx::sqlite::SqliteRow) -> Result<Review> {
        let id: String = row.get("id");
        let appointment_id: String = row.get("appointment_id");
        let client_id: String = row.get("client_id");
        let provider_id: String = row.get("provider_id");
        let rating: i64 = row.get("rating");
        let comment: Option<String> = row.get("comment");
        let created_at: chrono::DateTime<chrono::Utc> = row.get("created_at");

        Ok(Review {
            id: Uuid::parse_str(&id)?,
            appointment_id: Uuid::parse_str(&appointment_id)?,
            client_id: Uuid::parse_str(&client_id)?,
            provider_id: Uuid::parse_str(&provider_id)?,
            rating,
            comment,
            created_at,
        })
    }
}
