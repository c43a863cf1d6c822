// ABOUTME: Appointment lifecycle manager enforcing the booking state machine
// ABOUTME: Handles creation, provider transitions, the elapsed sweep and listings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trimbook Contributors

//! # Appointment Lifecycle
//!
//! Bookings start `pending`, the provider moves them to `confirmed` or
//! `declined`, and the system completes confirmed bookings once their
//! service interval has elapsed. `declined` and `completed` are terminal.
//!
//! Creation and confirmation run the slot check and the write under a
//! per-provider advisory lock, so two concurrent bookings for overlapping
//! slots with the same provider cannot both land.

use crate::database::Database;
use crate::errors::{retry_transient, AppError, AppResult};
use crate::models::{Account, Appointment, AppointmentDetails, AppointmentStatus};
use crate::scheduling::AvailabilityLedger;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Appointment creation, state transitions and listings
pub struct AppointmentLifecycle {
    database: Arc<Database>,
    ledger: Arc<AvailabilityLedger>,
    /// Per-provider advisory locks: slot check plus insert must be atomic
    /// with respect to other bookings for the same provider.
    /// `DashMap` provides sharded access so unrelated providers never contend
    provider_locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl AppointmentLifecycle {
    /// Create a new lifecycle manager
    #[must_use]
    pub fn new(database: Arc<Database>, ledger: Arc<AvailabilityLedger>) -> Self {
        Self {
            database,
            ledger,
            provider_locks: DashMap::new(),
        }
    }

    /// Acquire the advisory lock for one provider
    ///
    /// The map entry guard is dropped before the lock is awaited; only the
    /// provider's own mutex is held across the slot check and write.
    async fn lock_provider(&self, provider_id: Uuid) -> tokio::sync::OwnedMutexGuard<()> {
        let lock = self
            .provider_locks
            .entry(provider_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// Book a service with a provider at the given instant
    ///
    /// The booking starts `pending`; the slot is checked here and again at
    /// confirm time. Any authenticated account may book, so the actor
    /// becomes the appointment's client.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The provider does not exist or is not a provider-role account
    /// - The service does not exist or belongs to a different provider
    /// - The slot is outside every published window or collides with an
    ///   existing non-declined booking
    /// - Storage fails past the transient retry budget
    pub async fn create(
        &self,
        client: &Account,
        provider_id: Uuid,
        service_id: Uuid,
        appointment_time: DateTime<Utc>,
    ) -> AppResult<Appointment> {
        retry_transient(|| self.create_attempt(client, provider_id, service_id, appointment_time))
            .await
    }

    async fn create_attempt(
        &self,
        client: &Account,
        provider_id: Uuid,
        service_id: Uuid,
        appointment_time: DateTime<Utc>,
    ) -> AppResult<Appointment> {
        let provider = self
            .database
            .get_account(provider_id)
            .await?
            .ok_or_else(|| AppError::not_found("Provider"))?;
        if !provider.role.is_provider() {
            return Err(AppError::NotAProvider);
        }

        let service = self
            .database
            .get_service(service_id)
            .await?
            .ok_or_else(|| AppError::not_found("Service"))?;
        if service.provider_id != provider.id {
            return Err(AppError::ServiceNotOwnedByProvider);
        }

        // Slot check and insert are atomic per provider
        let _guard = self.lock_provider(provider_id).await;

        let available = self
            .ledger
            .find_slot(provider_id, appointment_time, service.duration(), None)
            .await?;
        if !available {
            return Err(AppError::SlotUnavailable);
        }

        let appointment = Appointment::new(client.id, provider_id, service_id, appointment_time);
        self.database.create_appointment(&appointment).await?;

        tracing::info!(
            "Appointment {} created: client {} booked service {} with provider {} at {}",
            appointment.id,
            client.id,
            service_id,
            provider_id,
            appointment_time.to_rfc3339()
        );

        Ok(appointment)
    }

    /// Move an appointment to a new status on behalf of a user
    ///
    /// Only the appointment's provider may confirm or decline it, and only
    /// along a legal state-machine edge. `completed` is never accepted here;
    /// the system applies it through [`Self::complete_elapsed`].
    /// Confirmation re-validates the slot, which catches bookings that raced
    /// past the optimistic check at creation.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The appointment does not exist
    /// - The actor is not the appointment's provider, or requested the
    ///   system-only `completed` status
    /// - The requested edge is not in the transition table
    /// - The slot is no longer available at confirm time
    /// - Storage fails past the transient retry budget
    pub async fn transition(
        &self,
        actor: &Account,
        appointment_id: Uuid,
        target: AppointmentStatus,
    ) -> AppResult<Appointment> {
        retry_transient(|| self.transition_attempt(actor, appointment_id, target)).await
    }

    async fn transition_attempt(
        &self,
        actor: &Account,
        appointment_id: Uuid,
        target: AppointmentStatus,
    ) -> AppResult<Appointment> {
        let mut appointment = self
            .database
            .get_appointment(appointment_id)
            .await?
            .ok_or_else(|| AppError::not_found("Appointment"))?;

        if target == AppointmentStatus::Completed {
            return Err(AppError::unauthorized(
                "Appointments complete automatically once the service interval elapses",
            ));
        }
        if actor.id != appointment.provider_id {
            return Err(AppError::unauthorized(
                "Only the appointment's provider may change its status",
            ));
        }
        if !appointment.status.can_transition_to(target) {
            return Err(AppError::InvalidTransition {
                from: appointment.status.to_string(),
                to: target.to_string(),
            });
        }

        if target == AppointmentStatus::Confirmed {
            let _guard = self.lock_provider(appointment.provider_id).await;

            let service = self
                .database
                .get_service(appointment.service_id)
                .await?
                .ok_or_else(|| AppError::not_found("Service"))?;

            // Re-validate against every other booking; the appointment must
            // not collide with itself
            let available = self
                .ledger
                .find_slot(
                    appointment.provider_id,
                    appointment.appointment_time,
                    service.duration(),
                    Some(appointment.id),
                )
                .await?;
            if !available {
                return Err(AppError::SlotUnavailable);
            }

            self.database
                .update_appointment_status(appointment_id, target)
                .await?;
        } else {
            self.database
                .update_appointment_status(appointment_id, target)
                .await?;
        }

        appointment.status = target;

        tracing::info!(
            "Appointment {} transitioned to {} by provider {}",
            appointment.id,
            target,
            actor.id
        );

        Ok(appointment)
    }

    /// Complete every confirmed appointment whose service interval has
    /// elapsed
    ///
    /// Applied lazily before listings and review submission instead of from
    /// a background task; repeated sweeps are harmless.
    ///
    /// # Errors
    ///
    /// Returns an error if the sweep update fails
    pub async fn complete_elapsed(&self) -> AppResult<u64> {
        let completed = self
            .database
            .complete_elapsed_appointments(Utc::now())
            .await?;
        if completed > 0 {
            tracing::info!("Auto-completed {} elapsed appointments", completed);
        }
        Ok(completed)
    }

    /// List every appointment an account participates in, as client or
    /// provider, annotated with provider and service names for display
    ///
    /// Runs the elapsed-completion sweep first so callers never see a
    /// confirmed appointment whose interval is already over.
    ///
    /// # Errors
    ///
    /// Returns an error if the sweep or the listing query fails
    pub async fn list_for(&self, account: &Account) -> AppResult<Vec<AppointmentDetails>> {
        self.complete_elapsed().await?;
        Ok(self
            .database
            .list_appointments_for_account(account.id)
            .await?)
    }

    /// Fetch one appointment by id
    ///
    /// # Errors
    ///
    /// Returns an error if the appointment does not exist or the query fails
    pub async fn get(&self, appointment_id: Uuid) -> AppResult<Appointment> {
        self.database
            .get_appointment(appointment_id)
            .await?
            .ok_or_else(|| AppError::not_found("Appointment"))
    }
}
