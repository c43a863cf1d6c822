// ABOUTME: Provider directory route handlers for listings, ratings and reviews
// ABOUTME: Provides public REST endpoints backed by the rating aggregator
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trimbook Contributors

//! Provider directory routes
//!
//! The browse surface for clients: list providers, read a provider's
//! aggregate rating and reviews, and submit a review for one's own
//! completed appointment. Reads are public; review submission requires a
//! bearer token.

use crate::constants::routes as route_paths;
use crate::errors::AppError;
use crate::models::Account;
use crate::server::ServerResources;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Request body for review submission
#[derive(Debug, Deserialize)]
pub struct SubmitReviewRequest {
    /// The completed appointment being reviewed
    pub appointment_id: Uuid,
    /// Star rating, 1 through 5
    pub rating: i64,
    /// Optional free-text comment
    #[serde(default)]
    pub comment: Option<String>,
}

/// Public listing entry for one provider
#[derive(Debug, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Provider account id
    pub id: String,
    /// Display name
    pub display_name: String,
    /// Profile blurb
    pub bio: Option<String>,
}

impl From<&Account> for ProviderInfo {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.to_string(),
            display_name: account.display_name.clone(),
            bio: account.bio.clone(),
        }
    }
}

/// Provider directory routes
pub struct ProviderRoutes;

impl ProviderRoutes {
    /// Create all provider directory routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(route_paths::PROVIDERS, get(Self::handle_list))
            .route("/api/providers/:id/rating", get(Self::handle_rating))
            .route("/api/providers/:id/reviews", get(Self::handle_reviews))
            .route(route_paths::REVIEWS, post(Self::handle_submit_review))
            .with_state(resources)
    }

    /// Parse a path segment as a provider id and check the account exists
    async fn lookup_provider(
        resources: &Arc<ServerResources>,
        id: &str,
    ) -> Result<Account, AppError> {
        let provider_id = Uuid::parse_str(id)
            .map_err(|_| AppError::invalid_input("Invalid provider id"))?;

        resources
            .database
            .get_account(provider_id)
            .await?
            .ok_or_else(|| AppError::not_found("Provider"))
    }

    /// Handle GET /api/providers - List all provider accounts
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        let providers = resources.database.list_providers().await?;
        let listing: Vec<ProviderInfo> = providers.iter().map(ProviderInfo::from).collect();

        Ok((StatusCode::OK, Json(listing)).into_response())
    }

    /// Handle GET /api/providers/:id/rating - Aggregate rating for a provider
    async fn handle_rating(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let provider = Self::lookup_provider(&resources, &id).await?;
        let rating = resources.ratings.rating_for(provider.id).await?;

        Ok((StatusCode::OK, Json(rating)).into_response())
    }

    /// Handle GET /api/providers/:id/reviews - List a provider's reviews
    async fn handle_reviews(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let provider = Self::lookup_provider(&resources, &id).await?;
        let reviews = resources.ratings.reviews_for(provider.id).await?;

        Ok((StatusCode::OK, Json(reviews)).into_response())
    }

    /// Handle POST /api/reviews - Submit a review for a completed appointment
    async fn handle_submit_review(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<SubmitReviewRequest>,
    ) -> Result<Response, AppError> {
        let account = super::authenticate(&headers, &resources).await?;

        let review = resources
            .ratings
            .submit_review(&account, body.appointment_id, body.rating, body.comment)
            .await?;

        Ok((StatusCode::CREATED, Json(review)).into_response())
    }
}
