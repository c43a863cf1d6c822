// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Groups limits, timeouts, defaults, and route paths by domain
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trimbook Contributors

//! Constants module
//!
//! Application constants grouped by domain rather than scattered across
//! call sites.

/// Domain limits and validation bounds
pub mod limits {
    /// Minimum accepted plaintext password length
    pub const MIN_PASSWORD_LENGTH: usize = 8;
    /// Lowest accepted review rating
    pub const MIN_RATING: i64 = 1;
    /// Highest accepted review rating
    pub const MAX_RATING: i64 = 5;
    /// Maximum attempts for transient store failures before giving up
    pub const MAX_TRANSIENT_RETRIES: u32 = 3;
}

/// Timeouts and backoff schedules
pub mod timeouts {
    /// Base delay for exponential backoff between transient-failure retries
    pub const RETRY_BACKOFF_BASE_MS: u64 = 10;
}

/// Startup defaults, overridable through the environment
pub mod defaults {
    /// Default HTTP listen port
    pub const HTTP_PORT: u16 = 8081;
    /// Default SQLite database URL
    pub const DATABASE_URL: &str = "sqlite:./data/trimbook.db";
    /// Default session token lifetime in minutes
    pub const TOKEN_EXPIRY_MINUTES: i64 = 30;
}

/// Environment variable names read by configuration
pub mod env_keys {
    /// HTTP listen port
    pub const HTTP_PORT: &str = "HTTP_PORT";
    /// Database connection URL
    pub const DATABASE_URL: &str = "DATABASE_URL";
    /// JWT signing secret (required in production)
    pub const JWT_SECRET: &str = "JWT_SECRET";
    /// Session token lifetime in minutes
    pub const TOKEN_EXPIRY_MINUTES: &str = "TOKEN_EXPIRY_MINUTES";
    /// Deployment environment (development, production, testing)
    pub const ENVIRONMENT: &str = "ENVIRONMENT";
    /// Log output format (pretty, json, compact)
    pub const LOG_FORMAT: &str = "LOG_FORMAT";
}

/// Route paths served by the HTTP layer
pub mod routes {
    /// Liveness probe
    pub const HEALTH: &str = "/api/health";
    /// Account registration
    pub const REGISTER: &str = "/api/auth/register";
    /// Credential login
    pub const LOGIN: &str = "/api/auth/login";
    /// Authenticated identity echo
    pub const ME: &str = "/api/auth/me";
    /// Provider listing
    pub const PROVIDERS: &str = "/api/providers";
    /// Service collection
    pub const SERVICES: &str = "/api/services";
    /// Availability collection
    pub const AVAILABILITY: &str = "/api/availability";
    /// Appointment collection
    pub const APPOINTMENTS: &str = "/api/appointments";
    /// Review collection
    pub const REVIEWS: &str = "/api/reviews";
}

/// Cryptography parameters
pub mod crypto {
    /// JWT signing algorithm for session tokens
    pub const JWT_ALGORITHM: &str = "HS256";
    /// Length of a generated JWT signing secret in bytes
    pub const JWT_SECRET_LENGTH: usize = 64;
}
