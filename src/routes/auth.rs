// ABOUTME: Authentication route handlers for registration, login and session introspection
// ABOUTME: Provides REST endpoints mapping credentials and tokens to booking accounts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trimbook Contributors

//! Authentication routes
//!
//! Registration and login are the only unauthenticated write endpoints;
//! `/api/auth/me` echoes the account a bearer token resolves to and doubles
//! as a token-validity probe for clients.

use crate::constants::routes as route_paths;
use crate::errors::AppError;
use crate::models::{Account, AccountRole};
use crate::server::ServerResources;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Request body for account registration
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Email address; unique, case-insensitive
    pub email: String,
    /// Plaintext password, hashed before storage
    pub password: String,
    /// Either `client` or `provider`
    pub role: String,
    /// Public display name
    pub display_name: String,
    /// Optional profile blurb
    #[serde(default)]
    pub bio: Option<String>,
}

/// Request body for login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Registered email address
    pub email: String,
    /// Plaintext password to verify
    pub password: String,
}

/// Account fields echoed to authenticated callers
#[derive(Debug, Serialize, Deserialize)]
pub struct AccountInfo {
    /// Account id
    pub account_id: String,
    /// Email address
    pub email: String,
    /// Account role
    pub role: String,
    /// Display name
    pub display_name: String,
}

impl From<&Account> for AccountInfo {
    fn from(account: &Account) -> Self {
        Self {
            account_id: account.id.to_string(),
            email: account.email.clone(),
            role: account.role.to_string(),
            display_name: account.display_name.clone(),
        }
    }
}

/// Response for a successful login
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Signed bearer token
    pub token: String,
    /// Token expiry as RFC 3339
    pub expires_at: String,
    /// The authenticated account
    pub account: AccountInfo,
}

/// Authentication routes
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all authentication routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(route_paths::REGISTER, post(Self::handle_register))
            .route(route_paths::LOGIN, post(Self::handle_login))
            .route(route_paths::ME, get(Self::handle_me))
            .with_state(resources)
    }

    /// Handle POST /api/auth/register - Create a new account
    async fn handle_register(
        State(resources): State<Arc<ServerResources>>,
        Json(body): Json<RegisterRequest>,
    ) -> Result<Response, AppError> {
        let role: AccountRole = body
            .role
            .parse()
            .map_err(|_| AppError::invalid_input("Role must be 'client' or 'provider'"))?;

        let display_name = body.display_name.trim();
        if display_name.is_empty() {
            return Err(AppError::invalid_input("Display name must not be empty"));
        }

        let account = resources
            .credentials
            .register(
                &body.email,
                &body.password,
                role,
                display_name.to_owned(),
                body.bio,
            )
            .await?;

        Ok((StatusCode::CREATED, Json(account)).into_response())
    }

    /// Handle POST /api/auth/login - Verify credentials and mint a session token
    async fn handle_login(
        State(resources): State<Arc<ServerResources>>,
        Json(body): Json<LoginRequest>,
    ) -> Result<Response, AppError> {
        let account = resources
            .credentials
            .verify(&body.email, &body.password)
            .await?;

        let session = resources.auth_manager.generate_token(&account)?;

        let response = LoginResponse {
            token: session.token,
            expires_at: session.expires_at.to_rfc3339(),
            account: AccountInfo::from(&account),
        };

        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle GET /api/auth/me - Resolve the bearer token to its account
    async fn handle_me(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let account = super::authenticate(&headers, &resources).await?;

        Ok((StatusCode::OK, Json(account)).into_response())
    }
}
