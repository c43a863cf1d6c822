// ABOUTME: Rating aggregator deriving provider scores from completed-appointment reviews
// ABOUTME: Handles review submission rules and the fresh average-rating computation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trimbook Contributors

//! # Rating Aggregator
//!
//! One review per completed appointment, written by the appointment's
//! client. A provider's public rating is the arithmetic mean of all their
//! review scores, rounded to one decimal and computed fresh on every read;
//! review volume per provider is low enough that caching would only add an
//! invalidation problem.

use crate::constants::limits::{MAX_RATING, MIN_RATING};
use crate::database::Database;
use crate::errors::{retry_transient, AppError, AppResult};
use crate::models::{Account, AppointmentStatus, ProviderRating, Review};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Round a raw mean to the one-decimal precision shown to clients
fn rounded_mean(mean: f64) -> f64 {
    (mean * 10.0).round() / 10.0
}

/// Review intake and provider rating reads
#[derive(Clone)]
pub struct RatingAggregator {
    database: Arc<Database>,
}

impl RatingAggregator {
    /// Create a new aggregator over the shared database handle
    #[must_use]
    pub const fn new(database: Arc<Database>) -> Self {
        Self { database }
    }

    /// Submit a review for a completed appointment
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The rating falls outside the accepted range
    /// - The appointment does not exist
    /// - The actor is not the appointment's client
    /// - The appointment has not completed yet
    /// - The appointment already has its one permitted review
    /// - Storage fails past the transient retry budget
    pub async fn submit_review(
        &self,
        client: &Account,
        appointment_id: Uuid,
        rating: i64,
        comment: Option<String>,
    ) -> AppResult<Review> {
        retry_transient(|| self.submit_attempt(client, appointment_id, rating, comment.clone()))
            .await
    }

    async fn submit_attempt(
        &self,
        client: &Account,
        appointment_id: Uuid,
        rating: i64,
        comment: Option<String>,
    ) -> AppResult<Review> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(AppError::InvalidRating { rating });
        }

        // Sweep first so a confirmed appointment whose interval just elapsed
        // is reviewable without waiting for another listing call
        self.database
            .complete_elapsed_appointments(Utc::now())
            .await?;

        let appointment = self
            .database
            .get_appointment(appointment_id)
            .await?
            .ok_or_else(|| AppError::not_found("Appointment"))?;

        if client.id != appointment.client_id {
            return Err(AppError::unauthorized(
                "Only the appointment's client may review it",
            ));
        }
        if appointment.status != AppointmentStatus::Completed {
            return Err(AppError::NotCompleted);
        }
        if self
            .database
            .get_review_for_appointment(appointment_id)
            .await?
            .is_some()
        {
            return Err(AppError::AlreadyReviewed);
        }

        let review = Review::new(
            appointment_id,
            client.id,
            appointment.provider_id,
            rating,
            comment,
        );

        // A concurrent submission for the same appointment loses the race at
        // the UNIQUE constraint
        self.database.create_review(&review).await.map_err(|e| {
            if format!("{e:?}").contains("UNIQUE constraint failed: reviews.appointment_id") {
                AppError::AlreadyReviewed
            } else {
                AppError::Database(e)
            }
        })?;

        tracing::info!(
            "Review {} submitted: client {} rated appointment {} as {}",
            review.id,
            client.id,
            appointment_id,
            rating
        );

        Ok(review)
    }

    /// Compute a provider's public rating, fresh on every call
    ///
    /// Providers with no reviews read as `{0.0, 0}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the aggregate query fails
    pub async fn rating_for(&self, provider_id: Uuid) -> AppResult<ProviderRating> {
        let (average, count) = self.database.get_rating_aggregate(provider_id).await?;

        if count == 0 {
            return Ok(ProviderRating::EMPTY);
        }

        Ok(ProviderRating {
            average: average.map_or(0.0, rounded_mean),
            count,
        })
    }

    /// List a provider's reviews, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn reviews_for(&self, provider_id: Uuid) -> AppResult<Vec<Review>> {
        Ok(self.database.list_reviews_for_provider(provider_id).await?)
    }
}
