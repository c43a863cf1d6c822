// ABOUTME: JWT-based session issuance and validation for booking accounts
// ABOUTME: Handles token minting, stateless validation and bearer resolution to accounts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trimbook Contributors

//! # Authentication and Session Management
//!
//! Signed HS256 session tokens for registered accounts. Validation is a
//! pure function of the token, the shared secret and the clock; no session
//! state is kept server-side, so a minted token stays valid until its
//! expiry instant regardless of later logins.

use crate::constants::crypto;
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{Account, SessionToken};
use anyhow::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// `JWT` claims for account sessions
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Account `ID`
    pub sub: String,
    /// Account email
    pub email: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

/// Session token issuer and validator
pub struct AuthManager {
    secret: Vec<u8>,
    token_expiry_minutes: i64,
    token_counter: AtomicU64,
}

impl AuthManager {
    /// Create a new authentication manager
    #[must_use]
    pub const fn new(secret: Vec<u8>, token_expiry_minutes: i64) -> Self {
        Self {
            secret,
            token_expiry_minutes,
            token_counter: AtomicU64::new(0),
        }
    }

    /// Generate a session token for an account
    ///
    /// # Errors
    ///
    /// Returns an error if `JWT` encoding fails
    pub fn generate_token(&self, account: &Account) -> AppResult<SessionToken> {
        let now = Utc::now();
        let expiry = now + Duration::minutes(self.token_expiry_minutes);

        // Use atomic counter to ensure unique issued-at times, so two logins
        // in the same second still mint distinct tokens
        let counter = self.token_counter.fetch_add(1, Ordering::Relaxed);
        let unique_iat =
            now.timestamp() * 1000 + i64::from(u32::try_from(counter % 1000).unwrap_or(0));

        let claims = Claims {
            sub: account.id.to_string(),
            email: account.email.clone(),
            iat: unique_iat,
            exp: expiry.timestamp(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.secret),
        )
        .map_err(|e| AppError::internal(format!("Failed to sign session token: {e}")))?;

        Ok(SessionToken {
            token,
            expires_at: expiry,
        })
    }

    /// Validate a session token and return its claims
    ///
    /// Pure check against the shared secret and the current instant; the
    /// database is not consulted.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The token has expired
    /// - The token signature is invalid
    /// - The token is malformed or not valid `JWT` format
    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        // Expiry is exact; the default 60s leeway would accept stale tokens
        validation.leeway = 0;

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(&self.secret),
            &validation,
        )
        .map_err(|e| Self::convert_jwt_error(&e))?;

        Ok(token_data.claims)
    }

    /// Resolve a bearer token to the account it was issued for
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The token fails validation
    /// - The token subject is not a well-formed account id
    /// - No account with that id exists anymore
    pub async fn resolve_account(&self, token: &str, database: &Database) -> AppResult<Account> {
        let claims = self.validate_token(token)?;

        let account_id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::InvalidToken {
            reason: "Token subject is not a valid account id".into(),
        })?;

        let account = database
            .get_account(account_id)
            .await?
            .ok_or(AppError::UnknownSubject)?;

        tracing::debug!("Resolved session token for account: {}", account.id);

        Ok(account)
    }

    /// Convert `JWT` library errors to typed application errors
    fn convert_jwt_error(e: &jsonwebtoken::errors::Error) -> AppError {
        use jsonwebtoken::errors::ErrorKind;
        tracing::warn!("JWT token validation failed: {:?}", e);

        match e.kind() {
            ErrorKind::ExpiredSignature => AppError::ExpiredToken,
            ErrorKind::InvalidSignature => AppError::InvalidToken {
                reason: "Token signature verification failed".into(),
            },
            ErrorKind::InvalidToken => AppError::InvalidToken {
                reason: "Token format is invalid".into(),
            },
            ErrorKind::Base64(base64_err) => AppError::InvalidToken {
                reason: format!("Token contains invalid base64: {base64_err}"),
            },
            ErrorKind::Json(json_err) => AppError::InvalidToken {
                reason: format!("Token contains invalid JSON: {json_err}"),
            },
            ErrorKind::Utf8(utf8_err) => AppError::InvalidToken {
                reason: format!("Token contains invalid UTF-8: {utf8_err}"),
            },
            _ => AppError::InvalidToken {
                reason: format!("Token validation failed: {e}"),
            },
        }
    }
}

/// Generate a random `JWT` secret
///
/// # Errors
/// Returns an error if system RNG fails - this is a critical security failure
/// and the server cannot operate securely without working RNG
pub fn generate_jwt_secret() -> Result<[u8; crypto::JWT_SECRET_LENGTH]> {
    use ring::rand::{SecureRandom, SystemRandom};

    let rng = SystemRandom::new();
    let mut secret = [0u8; crypto::JWT_SECRET_LENGTH];

    rng.fill(&mut secret).map_err(|e| {
        tracing::error!(
            "CRITICAL: Failed to generate cryptographically secure JWT secret: {}",
            e
        );
        anyhow::anyhow!("System RNG failure - cannot generate secure JWT secret")
    })?;

    Ok(secret)
}
