// ABOUTME: Account management database operations
// ABOUTME: Handles account storage, lookup by id or email and provider listing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trimbook Contributors

use super::Database;
use crate::models::Account;
use anyhow::Result;
use sqlx::Row;
use uuid::Uuid;

impl Database {
    /// Create accounts table
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The database schema migration fails
    /// - Table creation fails
    /// - Index creation fails
    pub(super) async fn migrate_accounts(&self) -> Result<()> {
        // Create accounts table
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS accounts (
                id TEXT PRIMARY KEY,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL CHECK (role IN ('client', 'provider')),
                display_name TEXT NOT NULL,
                bio TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        // Create indexes
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_accounts_email ON accounts(email)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_accounts_role ON accounts(role)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Insert a new account
    ///
    /// The caller is responsible for checking email uniqueness first; a
    /// concurrent duplicate still trips the UNIQUE constraint and surfaces
    /// as a database error.
    ///
    /// # Errors
    ///
    /// Returns an error if the email is already in use or the insert fails
    pub async fn create_account(&self, account: &Account) -> Result<Uuid> {
        sqlx::query(
            r"
            INSERT INTO accounts (id, email, password_hash, role, display_name, bio, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(account.id.to_string())
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.role.as_str())
        .bind(&account.display_name)
        .bind(&account.bio)
        .bind(account.created_at)
        .execute(&self.pool)
        .await?;

        Ok(account.id)
    }

    /// Get an account by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_account(&self, account_id: Uuid) -> Result<Option<Account>> {
        self.get_account_impl("id", &account_id.to_string()).await
    }

    /// Get an account by email
    ///
    /// The lookup is case-insensitive; emails are stored lowercased.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        self.get_account_impl("email", &email.to_lowercase()).await
    }

    /// Internal implementation for getting an account
    async fn get_account_impl(&self, field: &str, value: &str) -> Result<Option<Account>> {
        let query = format!(
            r"
            SELECT id, email, password_hash, role, display_name, bio, created_at
            FROM accounts WHERE {field} = $1
            "
        );

        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(row) = row {
            let account = Self::row_to_account(&row)?;
            Ok(Some(account))
        } else {
            Ok(None)
        }
    }

    /// List all provider accounts, ordered by display name
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_providers(&self) -> Result<Vec<Account>> {
        let rows = sqlx::query(
            r"
            SELECT id, email, password_hash, role, display_name, bio, created_at
            FROM accounts WHERE role = 'provider'
            ORDER BY display_name
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_account).collect()
    }

    /// Get total account count
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_account_count(&self) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Convert a database row to an Account struct
    fn row_to_account(row: &sqlx::sqlite::SqliteRow) -> Result<Account> {
        let id: String = row.get("id");
        let email: String = row.get("email");
        let password_hash: String = row.get("password_hash");
        let role: String = row.get("role");
        let display_name: String = row.get("display_name");
        let bio: Option<String> = row.get("bio");
        let created_at: chrono::DateTime<chrono::Utc> = row.get("created_at");

        Ok(Account {
            id: Uuid::parse_str(&id)?,
            email,
            password_hash,
            role: role.parse()?,
            display_name,
            bio,
            created_at,
        })
    }
}
