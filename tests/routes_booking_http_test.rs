// ABOUTME: HTTP integration tests for the booking surface of the full router
// ABOUTME: Covers catalog, availability, appointment and review endpoints end to end
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trimbook Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

//! HTTP integration tests for the booking routes
//!
//! Uses the complete server router, so requests cross the same merge of
//! route modules and layers that production traffic does.

mod common;
mod helpers;

use chrono::Duration;
use helpers::axum_test::AxumTestRequest;
use serde_json::{json, Value};
use std::sync::Arc;
use trimbook::{
    models::{Account, AppointmentStatus},
    server::{BookingServer, ServerResources},
};

use common::{
    bearer_token, minutes_from_now, register_test_client, register_test_provider,
    setup_bookable_provider,
};

/// Test setup helper driving the assembled router
struct BookingTestSetup {
    resources: Arc<ServerResources>,
}

impl BookingTestSetup {
    async fn new() -> anyhow::Result<Self> {
        let resources = common::create_test_resources().await?;
        Ok(Self { resources })
    }

    fn app(&self) -> axum::Router {
        BookingServer::new(self.resources.clone()).router()
    }

    async fn provider_with_token(&self, email: &str) -> anyhow::Result<(Account, String)> {
        let account = register_test_provider(&self.resources, email).await?;
        let token = bearer_token(&self.resources, &account)?;
        Ok((account, token))
    }

    async fn client_with_token(&self, email: &str) -> anyhow::Result<(Account, String)> {
        let account = register_test_client(&self.resources, email).await?;
        let token = bearer_token(&self.resources, &account)?;
        Ok((account, token))
    }

    /// Past-window appointment already confirmed and swept to completed
    async fn completed_appointment(&self) -> anyhow::Result<(Account, String, Account, String)> {
        let (provider, service, window_start) =
            setup_bookable_provider(&self.resources, "done@example.com", -600).await?;
        let client = register_test_client(&self.resources, "visitor@example.com").await?;

        let appointment = self
            .resources
            .lifecycle
            .create(
                &client,
                provider.id,
                service.id,
                window_start + Duration::hours(1),
            )
            .await?;
        self.resources
            .lifecycle
            .transition(&provider, appointment.id, AppointmentStatus::Confirmed)
            .await?;
        self.resources.lifecycle.complete_elapsed().await?;

        let client_token = bearer_token(&self.resources, &client)?;
        let appointment_id = appointment.id.to_string();
        Ok((client, client_token, provider, appointment_id))
    }
}

// ============================================================================
// GET /api/health
// ============================================================================

#[tokio::test]
async fn test_health_endpoint() -> anyhow::Result<()> {
    let setup = BookingTestSetup::new().await?;

    let response = AxumTestRequest::get("/api/health").send(setup.app()).await;

    assert_eq!(response.status(), 200);
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].is_string());
    Ok(())
}

// ============================================================================
// GET /api/providers
// ============================================================================

#[tokio::test]
async fn test_provider_directory_lists_only_providers() -> anyhow::Result<()> {
    let setup = BookingTestSetup::new().await?;
    setup.provider_with_token("marco@example.com").await?;
    setup.provider_with_token("jade@example.com").await?;
    setup.client_with_token("walkin@example.com").await?;

    let response = AxumTestRequest::get("/api/providers").send(setup.app()).await;

    assert_eq!(response.status(), 200);
    let body: Value = response.json();
    let listing = body.as_array().expect("directory must be an array");
    assert_eq!(listing.len(), 2);
    for entry in listing {
        assert!(entry["id"].is_string());
        assert_eq!(entry["display_name"], "Test Provider");
        // The public directory carries no contact or credential fields
        assert!(entry.get("email").is_none());
        assert!(entry.get("password_hash").is_none());
    }
    Ok(())
}

// ============================================================================
// POST /api/services + GET /api/services
// ============================================================================

#[tokio::test]
async fn test_create_service_as_provider() -> anyhow::Result<()> {
    let setup = BookingTestSetup::new().await?;
    let (provider, token) = setup.provider_with_token("barber@example.com").await?;

    let response = AxumTestRequest::post("/api/services")
        .header("authorization", &format!("Bearer {token}"))
        .json(&json!({
            "name": "Hot Towel Shave",
            "description": "Straight razor with a hot towel finish",
            "price": 40.0,
            "duration_minutes": 45
        }))
        .send(setup.app())
        .await;

    assert_eq!(response.status(), 201);
    let body: Value = response.json();
    assert_eq!(body["name"], "Hot Towel Shave");
    assert_eq!(body["provider_id"], provider.id.to_string());
    assert_eq!(body["duration_minutes"], 45);
    Ok(())
}

#[tokio::test]
async fn test_create_service_requires_provider_role() -> anyhow::Result<()> {
    let setup = BookingTestSetup::new().await?;
    let (_, token) = setup.client_with_token("walkin@example.com").await?;

    let body = json!({"name": "Cut", "price": 20.0, "duration_minutes": 30});

    let as_client = AxumTestRequest::post("/api/services")
        .header("authorization", &format!("Bearer {token}"))
        .json(&body)
        .send(setup.app())
        .await;
    assert_eq!(as_client.status(), 403);
    let error: Value = as_client.json();
    assert_eq!(error["error"]["code"], "NOT_A_PROVIDER");

    let anonymous = AxumTestRequest::post("/api/services")
        .json(&body)
        .send(setup.app())
        .await;
    assert_eq!(anonymous.status(), 401);
    Ok(())
}

#[tokio::test]
async fn test_create_service_validates_shape() -> anyhow::Result<()> {
    let setup = BookingTestSetup::new().await?;
    let (_, token) = setup.provider_with_token("barber@example.com").await?;

    for bad in [
        json!({"name": "  ", "price": 20.0, "duration_minutes": 30}),
        json!({"name": "Cut", "price": -1.0, "duration_minutes": 30}),
        json!({"name": "Cut", "price": 20.0, "duration_minutes": 0}),
    ] {
        let response = AxumTestRequest::post("/api/services")
            .header("authorization", &format!("Bearer {token}"))
            .json(&bad)
            .send(setup.app())
            .await;
        assert_eq!(response.status(), 400, "offending body: {bad}");
    }
    Ok(())
}

#[tokio::test]
async fn test_list_services_filters_by_provider() -> anyhow::Result<()> {
    let setup = BookingTestSetup::new().await?;
    let (marco, _) = setup.provider_with_token("marco@example.com").await?;
    let (jade, _) = setup.provider_with_token("jade@example.com").await?;
    common::create_test_service(&setup.resources, marco.id, "Classic Cut", 30).await?;
    common::create_test_service(&setup.resources, marco.id, "Beard Trim", 15).await?;
    common::create_test_service(&setup.resources, jade.id, "Skin Fade", 45).await?;

    let all: Value = AxumTestRequest::get("/api/services")
        .send(setup.app())
        .await
        .json();
    assert_eq!(all.as_array().map(Vec::len), Some(3));

    let filtered: Value = AxumTestRequest::get(&format!("/api/services?provider_id={}", marco.id))
        .send(setup.app())
        .await
        .json();
    assert_eq!(filtered.as_array().map(Vec::len), Some(2));
    Ok(())
}

// ============================================================================
// POST /api/availability + GET /api/availability/:provider_id
// ============================================================================

#[tokio::test]
async fn test_publish_and_list_windows() -> anyhow::Result<()> {
    let setup = BookingTestSetup::new().await?;
    let (provider, token) = setup.provider_with_token("barber@example.com").await?;
    let start = minutes_from_now(60);

    let response = AxumTestRequest::post("/api/availability")
        .header("authorization", &format!("Bearer {token}"))
        .json(&json!({
            "start_time": start.to_rfc3339(),
            "end_time": (start + Duration::hours(8)).to_rfc3339()
        }))
        .send(setup.app())
        .await;

    assert_eq!(response.status(), 201);
    let body: Value = response.json();
    assert_eq!(body["provider_id"], provider.id.to_string());

    let listed: Value = AxumTestRequest::get(&format!("/api/availability/{}", provider.id))
        .send(setup.app())
        .await
        .json();
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn test_publish_rejects_inverted_window_and_clients() -> anyhow::Result<()> {
    let setup = BookingTestSetup::new().await?;
    let (_, provider_token) = setup.provider_with_token("barber@example.com").await?;
    let (_, client_token) = setup.client_with_token("walkin@example.com").await?;
    let start = minutes_from_now(60);

    let inverted = AxumTestRequest::post("/api/availability")
        .header("authorization", &format!("Bearer {provider_token}"))
        .json(&json!({
            "start_time": start.to_rfc3339(),
            "end_time": (start - Duration::hours(1)).to_rfc3339()
        }))
        .send(setup.app())
        .await;
    assert_eq!(inverted.status(), 400);
    let error: Value = inverted.json();
    assert_eq!(error["error"]["code"], "INVALID_WINDOW");

    let as_client = AxumTestRequest::post("/api/availability")
        .header("authorization", &format!("Bearer {client_token}"))
        .json(&json!({
            "start_time": start.to_rfc3339(),
            "end_time": (start + Duration::hours(8)).to_rfc3339()
        }))
        .send(setup.app())
        .await;
    assert_eq!(as_client.status(), 403);
    Ok(())
}

#[tokio::test]
async fn test_list_windows_rejects_malformed_provider_id() -> anyhow::Result<()> {
    let setup = BookingTestSetup::new().await?;

    let response = AxumTestRequest::get("/api/availability/not-a-uuid")
        .send(setup.app())
        .await;

    assert_eq!(response.status(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
    Ok(())
}

// ============================================================================
// POST /api/appointments + GET /api/appointments
// ============================================================================

#[tokio::test]
async fn test_book_and_list_appointments() -> anyhow::Result<()> {
    let setup = BookingTestSetup::new().await?;
    let (provider, service, window_start) =
        setup_bookable_provider(&setup.resources, "barber@example.com", 60).await?;
    let (_, client_token) = setup.client_with_token("walkin@example.com").await?;

    let response = AxumTestRequest::post("/api/appointments")
        .header("authorization", &format!("Bearer {client_token}"))
        .json(&json!({
            "provider_id": provider.id,
            "service_id": service.id,
            "appointment_time": window_start.to_rfc3339()
        }))
        .send(setup.app())
        .await;

    assert_eq!(response.status(), 201);
    let body: Value = response.json();
    assert_eq!(body["status"], "pending");
    assert_eq!(body["provider_id"], provider.id.to_string());

    let listed: Value = AxumTestRequest::get("/api/appointments")
        .header("authorization", &format!("Bearer {client_token}"))
        .send(setup.app())
        .await
        .json();
    let appointments = listed.as_array().expect("listing must be an array");
    assert_eq!(appointments.len(), 1);
    assert_eq!(appointments[0]["provider_name"], "Test Provider");
    assert_eq!(appointments[0]["service_name"], "Classic Cut");
    assert_eq!(appointments[0]["duration_minutes"], 30);
    Ok(())
}

#[tokio::test]
async fn test_booking_a_taken_slot_conflicts() -> anyhow::Result<()> {
    let setup = BookingTestSetup::new().await?;
    let (provider, service, window_start) =
        setup_bookable_provider(&setup.resources, "barber@example.com", 60).await?;
    let (_, first_token) = setup.client_with_token("first@example.com").await?;
    let (_, second_token) = setup.client_with_token("second@example.com").await?;

    let body = json!({
        "provider_id": provider.id,
        "service_id": service.id,
        "appointment_time": window_start.to_rfc3339()
    });

    AxumTestRequest::post("/api/appointments")
        .header("authorization", &format!("Bearer {first_token}"))
        .json(&body)
        .send(setup.app())
        .await
        .assert_status(axum::http::StatusCode::CREATED);

    let response = AxumTestRequest::post("/api/appointments")
        .header("authorization", &format!("Bearer {second_token}"))
        .json(&body)
        .send(setup.app())
        .await;

    assert_eq!(response.status(), 409);
    let error: Value = response.json();
    assert_eq!(error["error"]["code"], "SLOT_UNAVAILABLE");
    assert_eq!(error["error"]["category"], "state");
    Ok(())
}

#[tokio::test]
async fn test_appointments_require_authentication() -> anyhow::Result<()> {
    let setup = BookingTestSetup::new().await?;

    let create = AxumTestRequest::post("/api/appointments")
        .json(&json!({}))
        .send(setup.app())
        .await;
    assert_eq!(create.status(), 401);

    let list = AxumTestRequest::get("/api/appointments").send(setup.app()).await;
    assert_eq!(list.status(), 401);
    Ok(())
}

// ============================================================================
// PATCH /api/appointments/:id/status
// ============================================================================

#[tokio::test]
async fn test_provider_confirms_and_declines_over_http() -> anyhow::Result<()> {
    let setup = BookingTestSetup::new().await?;
    let (provider, service, window_start) =
        setup_bookable_provider(&setup.resources, "barber@example.com", 60).await?;
    let provider_token = bearer_token(&setup.resources, &provider)?;
    let (client, client_token) = setup.client_with_token("walkin@example.com").await?;

    let appointment = setup
        .resources
        .lifecycle
        .create(&client, provider.id, service.id, window_start)
        .await?;

    // The client may not drive the status
    let by_client = AxumTestRequest::patch(&format!("/api/appointments/{}/status", appointment.id))
        .header("authorization", &format!("Bearer {client_token}"))
        .json(&json!({"status": "confirmed"}))
        .send(setup.app())
        .await;
    assert_eq!(by_client.status(), 403);
    let error: Value = by_client.json();
    assert_eq!(error["error"]["code"], "PERMISSION_DENIED");

    // Completion is reserved for the elapsed sweep
    let manual_complete =
        AxumTestRequest::patch(&format!("/api/appointments/{}/status", appointment.id))
            .header("authorization", &format!("Bearer {provider_token}"))
            .json(&json!({"status": "completed"}))
            .send(setup.app())
            .await;
    assert_eq!(manual_complete.status(), 403);

    // The provider confirms
    let confirmed = AxumTestRequest::patch(&format!("/api/appointments/{}/status", appointment.id))
        .header("authorization", &format!("Bearer {provider_token}"))
        .json(&json!({"status": "confirmed"}))
        .send(setup.app())
        .await;
    assert_eq!(confirmed.status(), 200);
    let body: Value = confirmed.json();
    assert_eq!(body["status"], "confirmed");

    // Confirmed -> declined is a legal cancellation
    let declined = AxumTestRequest::patch(&format!("/api/appointments/{}/status", appointment.id))
        .header("authorization", &format!("Bearer {provider_token}"))
        .json(&json!({"status": "declined"}))
        .send(setup.app())
        .await;
    assert_eq!(declined.status(), 200);

    // Declined is terminal
    let revived = AxumTestRequest::patch(&format!("/api/appointments/{}/status", appointment.id))
        .header("authorization", &format!("Bearer {provider_token}"))
        .json(&json!({"status": "confirmed"}))
        .send(setup.app())
        .await;
    assert_eq!(revived.status(), 409);
    let error: Value = revived.json();
    assert_eq!(error["error"]["code"], "INVALID_TRANSITION");
    Ok(())
}

#[tokio::test]
async fn test_status_update_validates_path_and_body() -> anyhow::Result<()> {
    let setup = BookingTestSetup::new().await?;
    let (_, token) = setup.provider_with_token("barber@example.com").await?;

    let bad_id = AxumTestRequest::patch("/api/appointments/not-a-uuid/status")
        .header("authorization", &format!("Bearer {token}"))
        .json(&json!({"status": "confirmed"}))
        .send(setup.app())
        .await;
    assert_eq!(bad_id.status(), 400);

    let bad_status = AxumTestRequest::patch(&format!(
        "/api/appointments/{}/status",
        uuid::Uuid::new_v4()
    ))
    .header("authorization", &format!("Bearer {token}"))
    .json(&json!({"status": "cancelled"}))
    .send(setup.app())
    .await;
    assert_eq!(bad_status.status(), 400);

    let missing = AxumTestRequest::patch(&format!(
        "/api/appointments/{}/status",
        uuid::Uuid::new_v4()
    ))
    .header("authorization", &format!("Bearer {token}"))
    .json(&json!({"status": "confirmed"}))
    .send(setup.app())
    .await;
    assert_eq!(missing.status(), 404);
    Ok(())
}

// ============================================================================
// POST /api/reviews + rating reads
// ============================================================================

#[tokio::test]
async fn test_review_flow_over_http() -> anyhow::Result<()> {
    let setup = BookingTestSetup::new().await?;
    let (_, client_token, provider, appointment_id) = setup.completed_appointment().await?;

    let response = AxumTestRequest::post("/api/reviews")
        .header("authorization", &format!("Bearer {client_token}"))
        .json(&json!({
            "appointment_id": appointment_id,
            "rating": 5,
            "comment": "Sharpest lineup in town"
        }))
        .send(setup.app())
        .await;

    assert_eq!(response.status(), 201);
    let body: Value = response.json();
    assert_eq!(body["rating"], 5);
    assert_eq!(body["provider_id"], provider.id.to_string());

    // One review per appointment
    let duplicate = AxumTestRequest::post("/api/reviews")
        .header("authorization", &format!("Bearer {client_token}"))
        .json(&json!({"appointment_id": appointment_id, "rating": 4}))
        .send(setup.app())
        .await;
    assert_eq!(duplicate.status(), 409);
    let error: Value = duplicate.json();
    assert_eq!(error["error"]["code"], "ALREADY_REVIEWED");

    // The aggregate and the listing both reflect it
    let rating: Value = AxumTestRequest::get(&format!("/api/providers/{}/rating", provider.id))
        .send(setup.app())
        .await
        .json();
    assert_eq!(rating["count"], 1);
    assert!((rating["average"].as_f64().unwrap_or_default() - 5.0).abs() < f64::EPSILON);

    let reviews: Value = AxumTestRequest::get(&format!("/api/providers/{}/reviews", provider.id))
        .send(setup.app())
        .await
        .json();
    assert_eq!(reviews.as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn test_review_of_unfinished_appointment_conflicts() -> anyhow::Result<()> {
    let setup = BookingTestSetup::new().await?;
    let (provider, service, window_start) =
        setup_bookable_provider(&setup.resources, "barber@example.com", 60).await?;
    let (client, client_token) = setup.client_with_token("walkin@example.com").await?;

    let appointment = setup
        .resources
        .lifecycle
        .create(&client, provider.id, service.id, window_start)
        .await?;

    let response = AxumTestRequest::post("/api/reviews")
        .header("authorization", &format!("Bearer {client_token}"))
        .json(&json!({"appointment_id": appointment.id, "rating": 5}))
        .send(setup.app())
        .await;

    assert_eq!(response.status(), 409);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "NOT_COMPLETED");
    Ok(())
}

#[tokio::test]
async fn test_rating_read_for_unknown_provider() -> anyhow::Result<()> {
    let setup = BookingTestSetup::new().await?;

    let unknown = AxumTestRequest::get(&format!(
        "/api/providers/{}/rating",
        uuid::Uuid::new_v4()
    ))
    .send(setup.app())
    .await;
    assert_eq!(unknown.status(), 404);

    let malformed = AxumTestRequest::get("/api/providers/not-a-uuid/rating")
        .send(setup.app())
        .await;
    assert_eq!(malformed.status(), 400);
    Ok(())
}

// ============================================================================
// Route registration
// ============================================================================

#[tokio::test]
async fn test_all_booking_endpoints_registered() -> anyhow::Result<()> {
    let setup = BookingTestSetup::new().await?;
    // A real provider id, so provider-scoped reads miss the not-found path
    let (provider, _) = setup.provider_with_token("registered@example.com").await?;
    let id = provider.id;

    let endpoints = [
        ("GET", "/api/health".to_string()),
        ("POST", "/api/auth/register".to_string()),
        ("POST", "/api/auth/login".to_string()),
        ("GET", "/api/auth/me".to_string()),
        ("GET", "/api/providers".to_string()),
        ("GET", format!("/api/providers/{id}/rating")),
        ("GET", format!("/api/providers/{id}/reviews")),
        ("POST", "/api/services".to_string()),
        ("GET", "/api/services".to_string()),
        ("POST", "/api/availability".to_string()),
        ("GET", format!("/api/availability/{id}")),
        ("POST", "/api/appointments".to_string()),
        ("GET", "/api/appointments".to_string()),
        ("PATCH", format!("/api/appointments/{id}/status")),
        ("POST", "/api/reviews".to_string()),
    ];

    for (method, path) in endpoints {
        let request = match method {
            "POST" => AxumTestRequest::post(&path).json(&json!({})),
            "PATCH" => AxumTestRequest::patch(&path).json(&json!({})),
            _ => AxumTestRequest::get(&path),
        };
        let response = request.send(setup.app()).await;
        assert_ne!(
            response.status(),
            404,
            "{method} {path} should be registered"
        );
        assert_ne!(
            response.status(),
            405,
            "{method} {path} should accept the method"
        );
    }
    Ok(())
}
