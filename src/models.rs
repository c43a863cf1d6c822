// ABOUTME: Core data models for the Trimbook booking API
// ABOUTME: Defines Account, ServiceOffering, AvailabilityWindow, Appointment and Review
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trimbook Contributors

//! # Data Models
//!
//! Domain types shared across the crate. Enumerated fields (`AccountRole`,
//! `AppointmentStatus`) are closed sets with explicit string mappings for
//! database storage; the appointment state machine lives on
//! [`AppointmentStatus::can_transition_to`] so no call site re-implements it.

use crate::errors::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Role names as stored in the database
pub mod roles {
    /// Client role string
    pub const CLIENT: &str = "client";
    /// Provider role string
    pub const PROVIDER: &str = "provider";
}

/// Appointment status names as stored in the database
pub mod statuses {
    /// Awaiting provider action
    pub const PENDING: &str = "pending";
    /// Accepted by the provider
    pub const CONFIRMED: &str = "confirmed";
    /// Rejected by the provider
    pub const DECLINED: &str = "declined";
    /// Finished; eligible for review
    pub const COMPLETED: &str = "completed";
}

/// Account role distinguishing booking clients from service providers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AccountRole {
    /// Books appointments with providers
    Client,
    /// Publishes services and availability; receives bookings
    Provider,
}

impl AccountRole {
    /// Convert to string for database storage
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Client => roles::CLIENT,
            Self::Provider => roles::PROVIDER,
        }
    }

    /// Check whether this role may publish services and availability
    #[must_use]
    pub const fn is_provider(&self) -> bool {
        matches!(self, Self::Provider)
    }
}

impl Display for AccountRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AccountRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            roles::CLIENT => Ok(Self::Client),
            roles::PROVIDER => Ok(Self::Provider),
            _ => Err(AppError::invalid_input(format!("Invalid account role: {s}")).into()),
        }
    }
}

/// A registered account, either client or provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique account identifier
    pub id: uuid::Uuid,
    /// Email address, stored lowercased and unique across accounts
    pub email: String,
    /// Bcrypt hash of the account password; never serialized
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Role fixed at registration
    pub role: AccountRole,
    /// Public display name
    pub display_name: String,
    /// Optional profile blurb
    pub bio: Option<String>,
    /// When the account was created
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account with the given credentials and role
    ///
    /// The email is lowercased here so uniqueness checks and lookups are
    /// case-insensitive everywhere downstream.
    #[must_use]
    pub fn new(
        email: &str,
        password_hash: String,
        role: AccountRole,
        display_name: String,
        bio: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            email: email.to_lowercase(),
            password_hash,
            role,
            display_name,
            bio,
            created_at: Utc::now(),
        }
    }
}

/// A bookable service published by a provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceOffering {
    /// Unique service identifier
    pub id: uuid::Uuid,
    /// Owning provider account
    pub provider_id: uuid::Uuid,
    /// Service name shown to clients
    pub name: String,
    /// Optional longer description
    pub description: Option<String>,
    /// Price in the provider's currency; non-negative
    pub price: f64,
    /// Appointment length in minutes; positive
    pub duration_minutes: i64,
}

impl ServiceOffering {
    /// Create a new service offering for a provider
    #[must_use]
    pub fn new(
        provider_id: uuid::Uuid,
        name: String,
        description: Option<String>,
        price: f64,
        duration_minutes: i64,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            provider_id,
            name,
            description,
            price,
            duration_minutes,
        }
    }

    /// Service duration as a chrono interval
    #[must_use]
    pub const fn duration(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.duration_minutes)
    }
}

/// An open booking window published by a provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    /// Unique window identifier
    pub id: uuid::Uuid,
    /// Owning provider account
    pub provider_id: uuid::Uuid,
    /// Inclusive start of the window
    pub start_time: DateTime<Utc>,
    /// Exclusive end of the window; strictly after `start_time`
    pub end_time: DateTime<Utc>,
}

impl AvailabilityWindow {
    /// Create a new availability window for a provider
    #[must_use]
    pub fn new(
        provider_id: uuid::Uuid,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            provider_id,
            start_time,
            end_time,
        }
    }

    /// Check whether `[start, end)` lies fully inside this window
    #[must_use]
    pub fn contains(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start >= self.start_time && end <= self.end_time
    }
}

/// Appointment lifecycle state
///
/// `Declined` and `Completed` are terminal; every legal edge is encoded in
/// [`Self::can_transition_to`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    /// Created by a client, awaiting provider action
    Pending,
    /// Accepted by the provider; slot is held
    Confirmed,
    /// Rejected by the provider (terminal)
    Declined,
    /// Service delivered; review becomes possible (terminal)
    Completed,
}

impl AppointmentStatus {
    /// Convert to string for database storage
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => statuses::PENDING,
            Self::Confirmed => statuses::CONFIRMED,
            Self::Declined => statuses::DECLINED,
            Self::Completed => statuses::COMPLETED,
        }
    }

    /// Check whether no further transition is permitted from this state
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Declined | Self::Completed)
    }

    /// The appointment state machine: `pending -> {confirmed, declined}`,
    /// `confirmed -> {completed, declined}`, terminals go nowhere.
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Confirmed | Self::Declined)
                | (Self::Confirmed, Self::Completed | Self::Declined)
        )
    }
}

impl Display for AppointmentStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            statuses::PENDING => Ok(Self::Pending),
            statuses::CONFIRMED => Ok(Self::Confirmed),
            statuses::DECLINED => Ok(Self::Declined),
            statuses::COMPLETED => Ok(Self::Completed),
            _ => Err(AppError::invalid_input(format!("Invalid appointment status: {s}")).into()),
        }
    }
}

/// A booking linking a client, a provider and one of the provider's services
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    /// Unique appointment identifier
    pub id: uuid::Uuid,
    /// Booking client account
    pub client_id: uuid::Uuid,
    /// Provider account delivering the service
    pub provider_id: uuid::Uuid,
    /// Booked service; must belong to `provider_id`
    pub service_id: uuid::Uuid,
    /// Scheduled start instant
    pub appointment_time: DateTime<Utc>,
    /// Current lifecycle state
    pub status: AppointmentStatus,
    /// When the booking was created
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    /// Create a new pending appointment
    #[must_use]
    pub fn new(
        client_id: uuid::Uuid,
        provider_id: uuid::Uuid,
        service_id: uuid::Uuid,
        appointment_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            client_id,
            provider_id,
            service_id,
            appointment_time,
            status: AppointmentStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

/// An appointment annotated with display names for listing
///
/// The names are a read-side join, not stored fields; a provider rename
/// shows up on the next listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentDetails {
    /// The underlying appointment
    #[serde(flatten)]
    pub appointment: Appointment,
    /// Provider display name at read time
    pub provider_name: String,
    /// Service name at read time
    pub service_name: String,
    /// Service duration in minutes at read time
    pub duration_minutes: i64,
}

/// A one-time review of a completed appointment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    /// Unique review identifier
    pub id: uuid::Uuid,
    /// Reviewed appointment; at most one review each
    pub appointment_id: uuid::Uuid,
    /// Author, always the appointment's client
    pub client_id: uuid::Uuid,
    /// Reviewed provider
    pub provider_id: uuid::Uuid,
    /// Star rating, 1 through 5 inclusive
    pub rating: i64,
    /// Optional free-text comment
    pub comment: Option<String>,
    /// When the review was submitted
    pub created_at: DateTime<Utc>,
}

impl Review {
    /// Create a new review for a completed appointment
    #[must_use]
    pub fn new(
        appointment_id: uuid::Uuid,
        client_id: uuid::Uuid,
        provider_id: uuid::Uuid,
        rating: i64,
        comment: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            appointment_id,
            client_id,
            provider_id,
            rating,
            comment,
            created_at: Utc::now(),
        }
    }
}

/// Aggregated public rating for a provider
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ProviderRating {
    /// Mean of all review ratings, rounded to one decimal; 0.0 when empty
    pub average: f64,
    /// Number of reviews backing the average
    pub count: i64,
}

impl ProviderRating {
    /// Rating shown for a provider with no reviews yet
    pub const EMPTY: Self = Self {
        average: 0.0,
        count: 0,
    };
}

/// A minted session token with its expiry instant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionToken {
    /// Signed bearer token
    pub token: String,
    /// When the token stops validating
    pub expires_at: DateTime<Utc>,
}
