// ABOUTME: Scheduling core for the Trimbook booking API
// ABOUTME: Groups the availability ledger and the appointment lifecycle manager
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trimbook Contributors

//! # Scheduling
//!
//! The two halves of booking: [`AvailabilityLedger`] answers whether a time
//! slot is open, [`AppointmentLifecycle`] creates bookings and walks them
//! through their state machine. Slot checks and inserts for one provider are
//! serialized behind a per-provider lock so concurrent bookings cannot both
//! claim the same interval.

pub mod appointments;
pub mod availability;

pub use appointments::AppointmentLifecycle;
pub use availability::{intervals_overlap, AvailabilityLedger};
