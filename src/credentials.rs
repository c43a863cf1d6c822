// ABOUTME: Credential storage and verification for booking accounts
// ABOUTME: Handles registration with bcrypt hashing and login password checks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trimbook Contributors

//! # Credential Store
//!
//! Registration and password verification for client and provider accounts.
//! Passwords are bcrypt-hashed before they reach storage; the plaintext is
//! never persisted or logged. Unknown email and wrong password both come
//! back as [`AppError::InvalidCredentials`] so a caller cannot probe which
//! addresses are registered.

use crate::constants::limits::MIN_PASSWORD_LENGTH;
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{Account, AccountRole};
use std::sync::Arc;

/// Account registration and password verification
#[derive(Clone)]
pub struct CredentialStore {
    database: Arc<Database>,
}

impl CredentialStore {
    /// Create a new credential store over the shared database handle
    #[must_use]
    pub const fn new(database: Arc<Database>) -> Self {
        Self { database }
    }

    /// Register a new account
    ///
    /// The email is lowercased before the uniqueness check and storage, so
    /// addresses differing only in case collide.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The email is malformed
    /// - The password is shorter than the minimum length
    /// - The email is already registered
    /// - Hashing or the database insert fails
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        role: AccountRole,
        display_name: String,
        bio: Option<String>,
    ) -> AppResult<Account> {
        tracing::info!("Account registration attempt for email: {}", email);

        // Validate email format
        if !Self::is_valid_email(email) {
            return Err(AppError::invalid_input("Invalid email format"));
        }

        // Validate password strength
        if !Self::is_valid_password(password) {
            return Err(AppError::WeakPassword);
        }

        // Check if the address is already registered
        if self.database.get_account_by_email(email).await?.is_some() {
            return Err(AppError::DuplicateEmail {
                email: email.to_lowercase(),
            });
        }

        // Hash password
        let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

        let account = Account::new(email, password_hash, role, display_name, bio);

        // Save the account; a concurrent registration for the same address
        // loses the race at the UNIQUE constraint
        let account_id = self.database.create_account(&account).await.map_err(|e| {
            if format!("{e:?}").contains("UNIQUE constraint failed: accounts.email") {
                AppError::DuplicateEmail {
                    email: account.email.clone(),
                }
            } else {
                AppError::Database(e)
            }
        })?;

        tracing::info!(
            "Account registered successfully: {} ({})",
            account.email,
            account_id
        );

        Ok(account)
    }

    /// Verify an email and password pair
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidCredentials`] when the email is unknown or
    /// the password does not match; the two cases are indistinguishable to
    /// the caller. Other errors indicate a hashing or database failure.
    pub async fn verify(&self, email: &str, password: &str) -> AppResult<Account> {
        tracing::info!("Login attempt for email: {}", email);

        let Some(account) = self.database.get_account_by_email(email).await? else {
            tracing::warn!("Login rejected for unknown email: {}", email);
            return Err(AppError::InvalidCredentials);
        };

        // Verify password using spawn_blocking to avoid blocking async executor
        let password = password.to_owned();
        let password_hash = account.password_hash.clone();
        let is_valid =
            tokio::task::spawn_blocking(move || bcrypt::verify(&password, &password_hash))
                .await
                .map_err(|e| AppError::internal(format!("Password verification task failed: {e}")))?
                .map_err(|e| AppError::internal(format!("Password verification error: {e}")))?;

        if !is_valid {
            tracing::warn!("Invalid password for account: {}", account.email);
            return Err(AppError::InvalidCredentials);
        }

        tracing::info!(
            "Credentials verified for account: {} ({})",
            account.email,
            account.id
        );

        Ok(account)
    }

    /// Basic email format validation
    #[must_use]
    pub fn is_valid_email(email: &str) -> bool {
        // Simple email validation
        if email.len() <= 5 {
            return false;
        }
        let Some(at_pos) = email.find('@') else {
            return false;
        };
        if at_pos == 0 || at_pos == email.len() - 1 {
            return false; // @ at start or end
        }
        let domain_part = &email[at_pos + 1..];
        domain_part.contains('.')
    }

    /// Password strength validation
    #[must_use]
    pub const fn is_valid_password(password: &str) -> bool {
        password.len() >= MIN_PASSWORD_LENGTH
    }
}
