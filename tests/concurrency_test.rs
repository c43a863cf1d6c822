// ABOUTME: Concurrency tests for booking and registration races
// ABOUTME: Uses a file-backed database so tasks share state across pool connections
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
    database::Database,
    errors::AppError,
    models::{Account, AccountRole},
    server::ServerResources,
};

use common::{create_resources_for, register_test_client, setup_bookable_provider, TEST_PASSWORD};

/// Resources over a tempdir-backed database
///
/// `sqlite::memory:` hands every pooled connection its own empty database,
/// so cross-task tests must go through a real file.
async fn file_backed_resources(dir: &tempfile::TempDir) -> Result<Arc<ServerResources>> {
    let url = format!("sqlite:{}/bookings.db", dir.path().display());
    let database = Database::new(&url).await?;
    create_resources_for(database)
}

#[tokio::test(flavor = "multi_thread")]
async fn simultaneous_bookings_for_one_slot_admit_exactly_one() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let resources = file_backed_resources(&dir).await?;
    let (provider, service, window_start) =
        setup_bookable_provider(&resources, "contended@example.com", 60).await?;
    let first = register_test_client(&resources, "first@example.com").await?;
    let second = register_test_client(&resources, "second@example.com").await?;

    let book = |client: Account| {
        let resources = resources.clone();
        let provider_id = provider.id;
        let service_id = service.id;
        tokio::spawn(async move {
            resources
                .lifecycle
                .create(&client, provider_id, service_id, window_start)
                .await
        })
    };

    let (a, b) = tokio::join!(book(first), book(second));
    let results = [a?, b?];

    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one booking may win the slot");

    let loser = results.iter().find(|r| r.is_err()).expect("one must lose");
    assert!(matches!(loser, Err(AppError::SlotUnavailable)));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn adjacent_slots_book_concurrently_without_false_conflicts() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let resources = file_backed_resources(&dir).await?;
    let (provider, service, window_start) =
        setup_bookable_provider(&resources, "busy@example.com", 60).await?;
    let first = register_test_client(&resources, "first@example.com").await?;
    let second = register_test_client(&resources, "second@example.com").await?;

    let book = |client: Account, offset_minutes: i64| {
        let resources = resources.clone();
        let provider_id = provider.id;
        let service_id = service.id;
        tokio::spawn(async move {
            resources
                .lifecycle
                .create(
                    &client,
                    provider_id,
                    service_id,
                    window_start + Duration::minutes(offset_minutes),
                )
                .await
        })
    };

    let (a, b) = tokio::join!(book(first, 0), book(second, 30));
    a??;
    b??;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_registration_of_one_address_admits_exactly_one() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let resources = file_backed_resources(&dir).await?;

    let register = |display_name: &'static str| {
        let credentials = resources.credentials.clone();
        tokio::spawn(async move {
            credentials
                .register(
                    "race@example.com",
                    TEST_PASSWORD,
                    AccountRole::Client,
                    display_name.into(),
                    None,
                )
                .await
        })
    };

    let (a, b) = tokio::join!(register("First"), register("Second"));
    let results = [a?, b?];

    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "the address may only register once");

    let loser = results.iter().find(|r| r.is_err()).expect("one must lose");
    assert!(matches!(loser, Err(AppError::DuplicateEmail { .. })));
    Ok(())
}
