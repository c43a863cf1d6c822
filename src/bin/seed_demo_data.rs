// ABOUTME: Demo data seeder for local Trimbook testing
// ABOUTME: Creates barbers, clients, windows and appointments in every lifecycle state
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trimbook Contributors

//! Demo data seeder for Trimbook.
//!
//! This binary populates the database with realistic demo data for testing
//! the booking flow end to end: providers with services and availability,
//! clients, and appointments in every lifecycle state including reviewed
//! completed visits.
//!
//! Usage:
//! ```bash
//! # Seed with default settings
//! cargo run --bin seed-demo-data
//!
//! # Seed a specific database
//! cargo run --bin seed-demo-data -- --database-url sqlite:./data/demo.db
//!
//! # Verbose output
//! cargo run --bin seed-demo-data -- -v
//! ```

use anyhow::Result;
use chrono::{DateTime, Duration, Timelike, Utc};
use clap::Parser;
use std::env;
use std::sync::Arc;
use tracing::info;
use trimbook::constants::defaults;
use trimbook::credentials::CredentialStore;
use trimbook::database::Database;
use trimbook::models::{Account, AccountRole, Appointment, AppointmentStatus, ServiceOffering};
use trimbook::ratings::RatingAggregator;
use trimbook::scheduling::{AppointmentLifecycle, AvailabilityLedger};

/// Default password for all demo accounts - allows login for testing.
/// Password: `DemoUser123!`
const DEMO_PASSWORD: &str = "DemoUser123!";

/// How many days ago the "history" day with completed visits sits
const PAST_DAY_OFFSET: i64 = 7;

/// How many future days get an open availability window per provider
const FUTURE_WINDOW_DAYS: i64 = 7;

#[derive(Parser)]
#[command(
    name = "seed-demo-data",
    about = "Trimbook Demo Data Seeder",
    long_about = "Populate the database with realistic demo bookings for local testing"
)]
struct SeedArgs {
    /// Database URL override
    #[arg(long)]
    database_url: Option<String>,

    /// Enable verbose logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// Demo provider configuration
struct DemoProvider {
    email: &'static str,
    display_name: &'static str,
    bio: &'static str,
    services: &'static [DemoService],
}

/// Demo service configuration
struct DemoService {
    name: &'static str,
    description: Option<&'static str>,
    price: f64,
    duration_minutes: i64,
}

/// Demo client configuration
struct DemoClient {
    email: &'static str,
    display_name: &'static str,
}

/// A past visit: booked, confirmed, completed by the sweep, then reviewed
struct PastVisit {
    client: usize,
    provider: usize,
    service: &'static str,
    hour: u32,
    rating: i64,
    comment: Option<&'static str>,
}

/// How an upcoming booking is left after seeding
enum BookingOutcome {
    /// Awaiting provider action
    Pending,
    /// Accepted by the provider
    Confirmed,
    /// Rejected by the provider
    Declined,
}

/// An upcoming booking inside a future availability window
struct UpcomingBooking {
    client: usize,
    provider: usize,
    service: &'static str,
    day_offset: i64,
    hour: u32,
    outcome: BookingOutcome,
}

/// Get demo provider definitions
fn get_demo_providers() -> Vec<DemoProvider> {
    vec![
        DemoProvider {
            email: "marco@trimbook.dev",
            display_name: "Marco Benedetti",
            bio: "Third-generation barber. Classic cuts, straight-razor shaves and a strong espresso while you wait.",
            services: &[
                DemoService {
                    name: "Classic Cut",
                    description: Some("Scissor cut with hot towel finish"),
                    price: 35.0,
                    duration_minutes: 30,
                },
                DemoService {
                    name: "Beard Trim",
                    description: None,
                    price: 20.0,
                    duration_minutes: 15,
                },
                DemoService {
                    name: "Hot Towel Shave",
                    description: Some("Straight razor shave with hot towel prep"),
                    price: 40.0,
                    duration_minutes: 45,
                },
            ],
        },
        DemoProvider {
            email: "jade@trimbook.dev",
            display_name: "Jade Okafor",
            bio: "Fades, designs and textured hair. Ten years behind the chair.",
            services: &[
                DemoService {
                    name: "Skin Fade",
                    description: Some("Zero fade with styled top"),
                    price: 38.0,
                    duration_minutes: 45,
                },
                DemoService {
                    name: "Line Up",
                    description: None,
                    price: 15.0,
                    duration_minutes: 15,
                },
            ],
        },
        DemoProvider {
            email: "omar@trimbook.dev",
            display_name: "Omar Haddad",
            bio: "Neighborhood shop, no fuss. Kids welcome.",
            services: &[
                DemoService {
                    name: "Buzz Cut",
                    description: None,
                    price: 22.0,
                    duration_minutes: 15,
                },
                DemoService {
                    name: "Kids Cut",
                    description: Some("Under twelve"),
                    price: 25.0,
                    duration_minutes: 30,
                },
            ],
        },
    ]
}

/// Get demo client definitions
fn get_demo_clients() -> Vec<DemoClient> {
    vec![
        DemoClient {
            email: "alice@example.com",
            display_name: "Alice Nguyen",
        },
        DemoClient {
            email: "ben@example.com",
            display_name: "Ben Castillo",
        },
        DemoClient {
            email: "chloe@example.com",
            display_name: "Chloe Laurent",
        },
        DemoClient {
            email: "dana@example.com",
            display_name: "Dana Whitfield",
        },
    ]
}

/// Past visits that end up completed and reviewed
const PAST_VISITS: &[PastVisit] = &[
    PastVisit {
        client: 0,
        provider: 0,
        service: "Classic Cut",
        hour: 10,
        rating: 5,
        comment: Some("Best classic cut I've had in years. The hot towel finish alone is worth it."),
    },
    PastVisit {
        client: 1,
        provider: 0,
        service: "Beard Trim",
        hour: 12,
        rating: 4,
        comment: Some("Quick and tidy, though the chair was running twenty minutes late."),
    },
    PastVisit {
        client: 2,
        provider: 1,
        service: "Skin Fade",
        hour: 10,
        rating: 5,
        comment: None,
    },
];

/// Upcoming bookings left pending, confirmed or declined
const UPCOMING_BOOKINGS: &[UpcomingBooking] = &[
    UpcomingBooking {
        client: 0,
        provider: 0,
        service: "Classic Cut",
        day_offset: 1,
        hour: 10,
        outcome: BookingOutcome::Pending,
    },
    UpcomingBooking {
        client: 1,
        provider: 1,
        service: "Skin Fade",
        day_offset: 2,
        hour: 11,
        outcome: BookingOutcome::Confirmed,
    },
    UpcomingBooking {
        client: 3,
        provider: 0,
        service: "Classic Cut",
        day_offset: 1,
        hour: 14,
        outcome: BookingOutcome::Declined,
    },
];

/// Pin an instant to a whole hour of its day
fn at_hour(day: DateTime<Utc>, hour: u32) -> DateTime<Utc> {
    day.with_hour(hour)
        .unwrap_or(day)
        .with_minute(0)
        .unwrap_or(day)
        .with_second(0)
        .unwrap_or(day)
        .with_nanosecond(0)
        .unwrap_or(day)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = SeedArgs::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    info!("=== Trimbook Demo Data Seeder ===");

    // Load database URL
    let database_url = args
        .database_url
        .or_else(|| env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| defaults::DATABASE_URL.to_owned());

    info!("Connecting to database: {}", database_url);
    let database = Arc::new(Database::new(&database_url).await?);

    let credentials = CredentialStore::new(database.clone());
    let ledger = Arc::new(AvailabilityLedger::new(database.clone()));
    let lifecycle = AppointmentLifecycle::new(database.clone(), ledger.clone());
    let ratings = RatingAggregator::new(database.clone());

    info!("Step 1: Creating demo providers and services...");
    let providers = seed_providers(&credentials, &database).await?;
    info!("  Created/found {} providers", providers.len());

    info!("Step 2: Creating demo clients...");
    let clients = seed_clients(&credentials, &database).await?;
    info!("  Created/found {} clients", clients.len());

    info!("Step 3: Publishing availability windows...");
    seed_windows(&ledger, &database, &providers).await?;

    // Snapshot which clients already have bookings so re-runs do not
    // double-book their slots
    let mut client_is_fresh = Vec::with_capacity(clients.len());
    for client in &clients {
        let bookings = database.list_appointments_for_account(client.id).await?;
        client_is_fresh.push(bookings.is_empty());
    }

    info!("Step 4: Booking past visits...");
    let past =
        seed_past_visits(&lifecycle, &database, &providers, &clients, &client_is_fresh).await?;
    info!("  Booked and confirmed {} past visits", past.len());

    info!("Step 5: Completing elapsed appointments...");
    let completed = lifecycle.complete_elapsed().await?;
    info!("  Completed {} appointments", completed);

    info!("Step 6: Submitting reviews for completed visits...");
    let review_count = seed_reviews(&ratings, &database, &past).await?;
    info!("  Submitted {} reviews", review_count);

    info!("Step 7: Booking upcoming appointments...");
    seed_upcoming(&lifecycle, &database, &providers, &clients, &client_is_fresh).await?;

    info!("");
    info!("=== Seeding Complete ===");
    print_summary(&database).await?;

    Ok(())
}

/// Seed provider accounts and their service catalogs
async fn seed_providers(
    credentials: &CredentialStore,
    database: &Database,
) -> Result<Vec<Account>> {
    let mut providers = Vec::new();

    for demo in get_demo_providers() {
        let account = match database.get_account_by_email(demo.email).await? {
            Some(existing) => {
                info!("  Found existing provider: {}", demo.email);
                existing
            }
            None => {
                let account = credentials
                    .register(
                        demo.email,
                        DEMO_PASSWORD,
                        AccountRole::Provider,
                        demo.display_name.to_owned(),
                        Some(demo.bio.to_owned()),
                    )
                    .await?;
                info!("  Created provider: {}", demo.email);
                account
            }
        };

        let existing_services = database.list_services_for_provider(account.id).await?;
        if existing_services.is_empty() {
            for service in demo.services {
                let offering = ServiceOffering::new(
                    account.id,
                    service.name.to_owned(),
                    service.description.map(str::to_owned),
                    service.price,
                    service.duration_minutes,
                );
                database.create_service(&offering).await?;
            }
            info!(
                "  Added {} services for {}",
                demo.services.len(),
                demo.display_name
            );
        }

        providers.push(account);
    }

    Ok(providers)
}

/// Seed client accounts
async fn seed_clients(credentials: &CredentialStore, database: &Database) -> Result<Vec<Account>> {
    let mut clients = Vec::new();

    for demo in get_demo_clients() {
        let account = match database.get_account_by_email(demo.email).await? {
            Some(existing) => {
                info!("  Found existing client: {}", demo.email);
                existing
            }
            None => {
                let account = credentials
                    .register(
                        demo.email,
                        DEMO_PASSWORD,
                        AccountRole::Client,
                        demo.display_name.to_owned(),
                        None,
                    )
                    .await?;
                info!("  Created client: {}", demo.email);
                account
            }
        };

        clients.push(account);
    }

    Ok(clients)
}

/// Publish one past window plus a week of future windows per provider
async fn seed_windows(
    ledger: &AvailabilityLedger,
    database: &Database,
    providers: &[Account],
) -> Result<()> {
    for provider in providers {
        let existing = database.list_windows_for_provider(provider.id).await?;
        if !existing.is_empty() {
            info!("  Found existing windows for {}", provider.display_name);
            continue;
        }

        let past_day = Utc::now() - Duration::days(PAST_DAY_OFFSET);
        ledger
            .publish(provider.id, at_hour(past_day, 9), at_hour(past_day, 17))
            .await?;

        for day_offset in 1..=FUTURE_WINDOW_DAYS {
            let day = Utc::now() + Duration::days(day_offset);
            ledger
                .publish(provider.id, at_hour(day, 9), at_hour(day, 17))
                .await?;
        }

        info!(
            "  Published {} windows for {}",
            FUTURE_WINDOW_DAYS + 1,
            provider.display_name
        );
    }

    Ok(())
}

/// Book and confirm last week's visits; the elapsed sweep completes them
async fn seed_past_visits(
    lifecycle: &AppointmentLifecycle,
    database: &Database,
    providers: &[Account],
    clients: &[Account],
    client_is_fresh: &[bool],
) -> Result<Vec<(Account, Appointment, i64, Option<String>)>> {
    let mut seeded = Vec::new();
    let past_day = Utc::now() - Duration::days(PAST_DAY_OFFSET);

    for visit in PAST_VISITS {
        if client_is_fresh.get(visit.client) != Some(&true) {
            continue;
        }
        let (Some(client), Some(provider)) =
            (clients.get(visit.client), providers.get(visit.provider))
        else {
            continue;
        };

        let services = database.list_services_for_provider(provider.id).await?;
        let Some(service) = services.iter().find(|s| s.name == visit.service) else {
            continue;
        };

        let appointment = lifecycle
            .create(
                client,
                provider.id,
                service.id,
                at_hour(past_day, visit.hour),
            )
            .await?;
        lifecycle
            .transition(provider, appointment.id, AppointmentStatus::Confirmed)
            .await?;

        info!(
            "  {} visited {} for a {}",
            client.display_name, provider.display_name, visit.service
        );

        seeded.push((
            client.clone(),
            appointment,
            visit.rating,
            visit.comment.map(str::to_owned),
        ));
    }

    Ok(seeded)
}

/// Submit reviews for freshly completed visits
async fn seed_reviews(
    ratings: &RatingAggregator,
    database: &Database,
    past: &[(Account, Appointment, i64, Option<String>)],
) -> Result<usize> {
    let mut count = 0;

    for (client, appointment, rating, comment) in past {
        if database
            .get_review_for_appointment(appointment.id)
            .await?
            .is_some()
        {
            continue;
        }

        ratings
            .submit_review(client, appointment.id, *rating, comment.clone())
            .await?;
        count += 1;
    }

    Ok(count)
}

/// Book upcoming appointments and leave each in its planned state
async fn seed_upcoming(
    lifecycle: &AppointmentLifecycle,
    database: &Database,
    providers: &[Account],
    clients: &[Account],
    client_is_fresh: &[bool],
) -> Result<()> {
    for booking in UPCOMING_BOOKINGS {
        if client_is_fresh.get(booking.client) != Some(&true) {
            continue;
        }
        let (Some(client), Some(provider)) = (
            clients.get(booking.client),
            providers.get(booking.provider),
        ) else {
            continue;
        };

        let services = database.list_services_for_provider(provider.id).await?;
        let Some(service) = services.iter().find(|s| s.name == booking.service) else {
            continue;
        };

        let day = Utc::now() + Duration::days(booking.day_offset);
        let appointment = lifecycle
            .create(client, provider.id, service.id, at_hour(day, booking.hour))
            .await?;

        let status = match booking.outcome {
            BookingOutcome::Pending => {
                info!(
                    "  {} has a pending {} with {}",
                    client.display_name, booking.service, provider.display_name
                );
                continue;
            }
            BookingOutcome::Confirmed => AppointmentStatus::Confirmed,
            BookingOutcome::Declined => AppointmentStatus::Declined,
        };

        lifecycle
            .transition(provider, appointment.id, status)
            .await?;
        info!(
            "  {} has a {} {} with {}",
            client.display_name, status, booking.service, provider.display_name
        );
    }

    Ok(())
}

/// Print demo login credentials
fn print_demo_credentials() {
    info!(
        "\n\
         === Demo Credentials ===\n\
         Providers: marco@trimbook.dev, jade@trimbook.dev, omar@trimbook.dev\n\
         Clients:   alice@example.com, ben@example.com, chloe@example.com, dana@example.com\n\
         Password:  DemoUser123! (all accounts)\n\
         \n\
         Done! Start the server and log in with any of the accounts above."
    );
}

/// Print summary statistics
async fn print_summary(database: &Database) -> Result<()> {
    print_count(database, "Accounts", "SELECT COUNT(*) FROM accounts").await?;
    print_count(database, "Services", "SELECT COUNT(*) FROM services").await?;
    print_count(
        database,
        "Availability Windows",
        "SELECT COUNT(*) FROM availability_windows",
    )
    .await?;
    print_count(database, "Appointments", "SELECT COUNT(*) FROM appointments").await?;
    print_count(database, "Reviews", "SELECT COUNT(*) FROM reviews").await?;

    print_demo_credentials();
    Ok(())
}

/// Helper to print a single count query result
async fn print_count(database: &Database, label: &str, query: &str) -> Result<()> {
    let row: (i64,) = sqlx::query_as(query).fetch_one(database.pool()).await?;
    info!("{}: {}", label, row.0);
    Ok(())
}
