// ABOUTME: Main library entry point for the Trimbook booking platform
// ABOUTME: Provides identity, availability, appointment and review services over REST
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trimbook Contributors

// Crate-level attributes:
// - deny(unsafe_code): zero-tolerance unsafe policy; the crate is pure safe Rust
#![deny(unsafe_code)]

//! # Trimbook
//!
//! Booking and identity backend for a barber-shop marketplace. Clients
//! register, browse providers and their services, book appointments inside
//! published availability windows, and review completed visits.
//!
//! ## Features
//!
//! - **Credential store**: bcrypt-hashed passwords, duplicate-email detection
//! - **Session issuer**: short-lived signed JWT session tokens
//! - **Availability ledger**: per-provider windows with overlap-free booking
//! - **Appointment lifecycle**: pending → confirmed/declined → completed,
//!   with completion driven by elapsed time rather than user action
//! - **Rating aggregator**: one review per completed appointment, averaged
//!   per provider
//!
//! ## Quick Start
//!
//! 1. Start the API with the `trimbook-server` binary
//! 2. Optionally load demo accounts with `seed-demo-data`
//! 3. Register an account via `POST /api/auth/register` and go
//!
//! ## Architecture
//!
//! The server follows a modular architecture:
//! - **Credentials**: registration and password verification
//! - **Auth**: session token issue and validation
//! - **Scheduling**: availability windows and the appointment state machine
//! - **Ratings**: review intake and per-provider aggregates
//! - **Routes**: the axum REST surface over all of the above
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use trimbook::config::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Load configuration
//!     let config = ServerConfig::from_env()?;
//!
//!     // Start the booking API with loaded configuration
//!     println!("Trimbook configured with port: HTTP={}", config.http_port);
//!
//!     Ok(())
//! }
//! ```

// ── Public API ──────────────────────────────────────────────────────────
// These modules are used by binary crates (src/bin/) and integration tests
// (tests/). They must remain `pub` so external consumers can access them.

/// Session token generation and validation
pub mod auth;

/// Configuration management from the environment
pub mod config;

/// Application constants grouped by domain
pub mod constants;

/// Account registration and password verification
pub mod credentials;

/// Database access layer over `SQLite`
pub mod database;

/// Unified error type and HTTP error responses
pub mod errors;

/// Structured logging initialization
pub mod logging;

/// Core domain data structures
pub mod models;

/// Review intake and provider rating aggregation
pub mod ratings;

/// `HTTP` route modules for the REST API
pub mod routes;

/// Availability windows and the appointment lifecycle
pub mod scheduling;

/// Server resource wiring and the HTTP run loop
pub mod server;
