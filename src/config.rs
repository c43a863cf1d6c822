// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Parses ports, database URL, JWT secret and token lifetime from the environment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trimbook Contributors

//! Environment-based configuration management
//!
//! Everything the server needs at startup comes from environment variables;
//! invalid values fail startup instead of being silently defaulted.

use crate::constants::{defaults, env_keys};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use tracing::warn;

/// Environment type for security and logging decisions
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development; permissive defaults
    #[default]
    Development,
    /// Production deployment; secrets must be provided explicitly
    Production,
    /// Automated test runs
    Testing,
}

impl Environment {
    /// Parse from string with fallback to development
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Check if this is a development environment
    #[must_use]
    pub const fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Server configuration loaded once at startup
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,
    /// Database connection URL
    pub database_url: String,
    /// JWT signing secret for session tokens
    pub jwt_secret: Vec<u8>,
    /// Session token lifetime in minutes
    pub token_expiry_minutes: i64,
    /// Deployment environment
    pub environment: Environment,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// A missing `JWT_SECRET` is fatal in production. In development and
    /// testing a random secret is generated, which means sessions do not
    /// survive a restart there.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but unparseable, or if
    /// `JWT_SECRET` is absent in production.
    pub fn from_env() -> Result<Self> {
        let environment = Environment::from_str_or_default(
            &env::var(env_keys::ENVIRONMENT).unwrap_or_default(),
        );

        let http_port = match env::var(env_keys::HTTP_PORT) {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("Invalid {} value: {raw}", env_keys::HTTP_PORT))?,
            Err(_) => defaults::HTTP_PORT,
        };

        let database_url = env::var(env_keys::DATABASE_URL)
            .unwrap_or_else(|_| defaults::DATABASE_URL.to_owned());

        let token_expiry_minutes = match env::var(env_keys::TOKEN_EXPIRY_MINUTES) {
            Ok(raw) => {
                let minutes: i64 = raw.parse().with_context(|| {
                    format!("Invalid {} value: {raw}", env_keys::TOKEN_EXPIRY_MINUTES)
                })?;
                if minutes <= 0 {
                    return Err(anyhow!(
                        "{} must be positive, got {minutes}",
                        env_keys::TOKEN_EXPIRY_MINUTES
                    ));
                }
                minutes
            }
            Err(_) => defaults::TOKEN_EXPIRY_MINUTES,
        };

        let jwt_secret = match env::var(env_keys::JWT_SECRET) {
            Ok(secret) if !secret.is_empty() => secret.into_bytes(),
            _ if environment.is_production() => {
                return Err(anyhow!(
                    "{} must be set in production",
                    env_keys::JWT_SECRET
                ));
            }
            _ => {
                warn!(
                    "{} not set; generating a random secret (sessions will not survive restart)",
                    env_keys::JWT_SECRET
                );
                crate::auth::generate_jwt_secret()?.to_vec()
            }
        };

        Ok(Self {
            http_port,
            database_url,
            jwt_secret,
            token_expiry_minutes,
            environment,
        })
    }

    /// Session token lifetime as a chrono interval
    #[must_use]
    pub const fn token_expiry(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.token_expiry_minutes)
    }
}
