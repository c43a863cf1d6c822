// ABOUTME: Availability ledger answering whether a provider's time slot is open
// ABOUTME: Handles window publication and the slot-availability predicate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trimbook Contributors

//! # Availability Ledger
//!
//! Providers publish open windows; [`AvailabilityLedger::find_slot`] is the
//! single authority on whether a candidate interval can be booked. A slot is
//! available when it fits entirely inside one published window and collides
//! with no non-declined appointment of that provider.

use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::AvailabilityWindow;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Half-open interval overlap: `[a_start, a_end)` against `[b_start, b_end)`
///
/// Two intervals overlap iff each starts before the other ends. Touching
/// endpoints do not overlap, so back-to-back bookings are legal.
#[must_use]
pub fn intervals_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// Published booking windows and the slot-availability predicate
#[derive(Clone)]
pub struct AvailabilityLedger {
    database: Arc<Database>,
}

impl AvailabilityLedger {
    /// Create a new ledger over the shared database handle
    #[must_use]
    pub const fn new(database: Arc<Database>) -> Self {
        Self { database }
    }

    /// Publish an availability window for a provider
    ///
    /// Role enforcement (the caller must be the provider itself) happens in
    /// the layer above; this component only validates the window's shape.
    /// Windows may overlap previously published ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the window is inverted or zero-length, or if the
    /// insert fails
    pub async fn publish(
        &self,
        provider_id: Uuid,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> AppResult<AvailabilityWindow> {
        if end_time <= start_time {
            return Err(AppError::invalid_window(
                "end_time must be strictly after start_time",
            ));
        }

        let window = AvailabilityWindow::new(provider_id, start_time, end_time);
        self.database.create_availability_window(&window).await?;

        tracing::info!(
            "Published availability window {} for provider {} ({} - {})",
            window.id,
            provider_id,
            start_time.to_rfc3339(),
            end_time.to_rfc3339()
        );

        Ok(window)
    }

    /// List a provider's published windows, earliest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn windows_for(&self, provider_id: Uuid) -> AppResult<Vec<AvailabilityWindow>> {
        Ok(self.database.list_windows_for_provider(provider_id).await?)
    }

    /// Check whether `[start, start + duration)` can be booked with a provider
    ///
    /// True iff the interval lies fully inside some published window for the
    /// provider and overlaps none of the provider's non-declined
    /// appointments. `exclude_appointment` removes one appointment from the
    /// collision scan, so a booking being re-validated at confirm time does
    /// not collide with itself.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails
    pub async fn find_slot(
        &self,
        provider_id: Uuid,
        start: DateTime<Utc>,
        duration: chrono::Duration,
        exclude_appointment: Option<Uuid>,
    ) -> AppResult<bool> {
        let end = start + duration;

        let windows = self.database.list_windows_for_provider(provider_id).await?;
        if !windows.iter().any(|window| window.contains(start, end)) {
            tracing::debug!(
                "Slot {} - {} falls outside every published window for provider {}",
                start.to_rfc3339(),
                end.to_rfc3339(),
                provider_id
            );
            return Ok(false);
        }

        let booked = self.database.list_booked_slots(provider_id).await?;
        let collision = booked
            .iter()
            .filter(|slot| exclude_appointment != Some(slot.appointment_id))
            .any(|slot| intervals_overlap(start, end, slot.start_time, slot.end_time()));

        if collision {
            tracing::debug!(
                "Slot {} - {} collides with an existing booking for provider {}",
                start.to_rfc3339(),
                end.to_rfc3339(),
                provider_id
            );
        }

        Ok(!collision)
    }
}
