// ABOUTME: Integration tests for review submission and provider rating aggregation
// ABOUTME: Covers completion gating, authorship rules and the rounded average
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trimbook Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use anyhow::Result;
use chrono::Duration;
use std::sync::Arc;
use trimbook::{
    errors::AppError,
    models::{Account, AppointmentStatus},
    server::ServerResources,
};
use uuid::Uuid;

use common::{register_test_client, setup_bookable_provider};

/// Stage a completed appointment: past window, booked, confirmed, swept
async fn completed_appointment(
    resources: &Arc<ServerResources>,
    provider_email: &str,
    client_email: &str,
) -> Result<(Account, Account, Uuid)> {
    let (provider, service, window_start) =
        setup_bookable_provider(resources, provider_email, -600).await?;
    let client = register_test_client(resources, client_email).await?;

    let appointment = resources
        .lifecycle
        .create(
            &client,
            provider.id,
            service.id,
            window_start + Duration::hours(1),
        )
        .await?;
    resources
        .lifecycle
        .transition(&provider, appointment.id, AppointmentStatus::Confirmed)
        .await?;
    resources.lifecycle.complete_elapsed().await?;

    Ok((client, provider, appointment.id))
}

// ============================================================================
// Submission rules
// ============================================================================

#[tokio::test]
async fn review_requires_a_completed_appointment() -> Result<()> {
    let resources = common::create_test_resources().await?;
    let (provider, service, window_start) =
        setup_bookable_provider(&resources, "future@example.com", 60).await?;
    let client = register_test_client(&resources, "client@example.com").await?;

    let appointment = resources
        .lifecycle
        .create(&client, provider.id, service.id, window_start)
        .await?;

    // Pending
    let pending = resources
        .ratings
        .submit_review(&client, appointment.id, 5, None)
        .await;
    assert!(matches!(pending, Err(AppError::NotCompleted)));

    // Confirmed but not yet elapsed
    resources
        .lifecycle
        .transition(&provider, appointment.id, AppointmentStatus::Confirmed)
        .await?;
    let confirmed = resources
        .ratings
        .submit_review(&client, appointment.id, 5, None)
        .await;
    assert!(matches!(confirmed, Err(AppError::NotCompleted)));
    Ok(())
}

#[tokio::test]
async fn only_the_appointments_client_may_review() -> Result<()> {
    let resources = common::create_test_resources().await?;
    let (_, provider, appointment_id) =
        completed_appointment(&resources, "barber@example.com", "visitor@example.com").await?;
    let stranger = register_test_client(&resources, "stranger@example.com").await?;

    let by_provider = resources
        .ratings
        .submit_review(&provider, appointment_id, 5, None)
        .await;
    assert!(matches!(by_provider, Err(AppError::Unauthorized { .. })));

    let by_stranger = resources
        .ratings
        .submit_review(&stranger, appointment_id, 5, None)
        .await;
    assert!(matches!(by_stranger, Err(AppError::Unauthorized { .. })));
    Ok(())
}

#[tokio::test]
async fn rating_must_be_one_through_five() -> Result<()> {
    let resources = common::create_test_resources().await?;
    let (client, _, appointment_id) =
        completed_appointment(&resources, "barber@example.com", "visitor@example.com").await?;

    let too_low = resources
        .ratings
        .submit_review(&client, appointment_id, 0, None)
        .await;
    match too_low {
        Err(AppError::InvalidRating { rating }) => assert_eq!(rating, 0),
        other => panic!("expected InvalidRating, got {other:?}"),
    }

    let too_high = resources
        .ratings
        .submit_review(&client, appointment_id, 6, None)
        .await;
    assert!(matches!(too_high, Err(AppError::InvalidRating { .. })));

    // Boundary values are accepted
    resources
        .ratings
        .submit_review(&client, appointment_id, 1, None)
        .await?;
    Ok(())
}

#[tokio::test]
async fn each_appointment_gets_at_most_one_review() -> Result<()> {
    let resources = common::create_test_resources().await?;
    let (client, _, appointment_id) =
        completed_appointment(&resources, "barber@example.com", "visitor@example.com").await?;

    resources
        .ratings
        .submit_review(&client, appointment_id, 4, Some("Solid trim".into()))
        .await?;

    let again = resources
        .ratings
        .submit_review(&client, appointment_id, 5, None)
        .await;
    assert!(matches!(again, Err(AppError::AlreadyReviewed)));
    Ok(())
}

#[tokio::test]
async fn review_of_unknown_appointment_is_not_found() -> Result<()> {
    let resources = common::create_test_resources().await?;
    let client = register_test_client(&resources, "client@example.com").await?;

    let result = resources
        .ratings
        .submit_review(&client, Uuid::new_v4(), 5, None)
        .await;
    assert!(matches!(result, Err(AppError::NotFound { .. })));
    Ok(())
}

#[tokio::test]
async fn confirmed_elapsed_appointment_is_reviewable_without_prior_sweep() -> Result<()> {
    let resources = common::create_test_resources().await?;
    let (provider, service, window_start) =
        setup_bookable_provider(&resources, "elapsed@example.com", -600).await?;
    let client = register_test_client(&resources, "client@example.com").await?;

    let appointment = resources
        .lifecycle
        .create(
            &client,
            provider.id,
            service.id,
            window_start + Duration::hours(1),
        )
        .await?;
    resources
        .lifecycle
        .transition(&provider, appointment.id, AppointmentStatus::Confirmed)
        .await?;

    // No explicit complete_elapsed call; submission sweeps before checking
    let review = resources
        .ratings
        .submit_review(&client, appointment.id, 5, Some("Best fade in town".into()))
        .await?;

    assert_eq!(review.appointment_id, appointment.id);
    assert_eq!(review.client_id, client.id);
    assert_eq!(review.provider_id, provider.id);
    assert_eq!(review.rating, 5);
    assert_eq!(review.comment.as_deref(), Some("Best fade in town"));
    Ok(())
}

// ============================================================================
// Aggregation
// ============================================================================

#[tokio::test]
async fn average_is_rounded_to_one_decimal() -> Result<()> {
    let resources = common::create_test_resources().await?;
    let (provider, service, window_start) =
        setup_bookable_provider(&resources, "avg@example.com", -600).await?;

    for (i, (email, rating)) in [
        ("first@example.com", 5),
        ("second@example.com", 4),
        ("third@example.com", 4),
    ]
    .into_iter()
    .enumerate()
    {
        let client = register_test_client(&resources, email).await?;
        let slot = window_start + Duration::hours(i64::try_from(i)?);
        let appointment = resources
            .lifecycle
            .create(&client, provider.id, service.id, slot)
            .await?;
        resources
            .lifecycle
            .transition(&provider, appointment.id, AppointmentStatus::Confirmed)
            .await?;
        resources.lifecycle.complete_elapsed().await?;
        resources
            .ratings
            .submit_review(&client, appointment.id, rating, None)
            .await?;
    }

    // (5 + 4 + 4) / 3 = 4.333..., shown as 4.3
    let rating = resources.ratings.rating_for(provider.id).await?;
    assert!((rating.average - 4.3).abs() < f64::EPSILON);
    assert_eq!(rating.count, 3);
    Ok(())
}

#[tokio::test]
async fn provider_without_reviews_reads_as_empty() -> Result<()> {
    let resources = common::create_test_resources().await?;
    let (provider, _, _) = setup_bookable_provider(&resources, "fresh@example.com", 60).await?;

    let rating = resources.ratings.rating_for(provider.id).await?;
    assert!(rating.average.abs() < f64::EPSILON);
    assert_eq!(rating.count, 0);
    Ok(())
}

#[tokio::test]
async fn reviews_listing_returns_newest_first() -> Result<()> {
    let resources = common::create_test_resources().await?;
    let (provider, service, window_start) =
        setup_bookable_provider(&resources, "list@example.com", -600).await?;

    let mut review_ids = Vec::new();
    for (i, email) in ["early@example.com", "late@example.com"].into_iter().enumerate() {
        let client = register_test_client(&resources, email).await?;
        let slot = window_start + Duration::hours(i64::try_from(i)?);
        let appointment = resources
            .lifecycle
            .create(&client, provider.id, service.id, slot)
            .await?;
        resources
            .lifecycle
            .transition(&provider, appointment.id, AppointmentStatus::Confirmed)
            .await?;
        resources.lifecycle.complete_elapsed().await?;
        let review = resources
            .ratings
            .submit_review(&client, appointment.id, 5, None)
            .await?;
        review_ids.push(review.id);
    }

    let reviews = resources.ratings.reviews_for(provider.id).await?;
    assert_eq!(reviews.len(), 2);
    assert!(reviews[0].created_at >= reviews[1].created_at);
    assert!(review_ids.contains(&reviews[0].id));
    assert!(review_ids.contains(&reviews[1].id));
    Ok(())
}
