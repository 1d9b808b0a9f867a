//! # Seed
//!
//! Populates a development database with a couple of demo accounts, an
//! upcoming event with items, and one earmark. Safe to run repeatedly only
//! against a throwaway database.

use chrono::{Duration, Utc};
use configs::AppConfig;
use domains::ports::{EarmarkRepo, EventItemRepo, EventRepo, UserRepo};
use secrecy::ExposeSecret;
use storage_adapters::{PgEarmarkRepo, PgEventItemRepo, PgEventRepo, PgStore, PgUserRepo};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let config = AppConfig::load()?;

    let store = PgStore::connect(config.database_url.expose_secret()).await?;
    store.migrate().await?;

    let users = PgUserRepo::new(store.clone());
    let events = PgEventRepo::new(store.clone());
    let items = PgEventItemRepo::new(store.clone());
    let earmarks = PgEarmarkRepo::new(store.clone());

    let host = users
        .create("host@example.com", "Harriet Host", "$argon2$demo-only")
        .await?;
    let guest = users
        .create("guest@example.com", "Gus Guest", "$argon2$demo-only")
        .await?;

    // Accounts start unverified; flip them directly for demo purposes.
    sqlx::query("UPDATE users SET verified = TRUE WHERE id = ANY($1)")
        .bind(vec![host.id, guest.id])
        .execute(store.pool())
        .await?;

    let event = events
        .create(
            host.id,
            "Housewarming Dinner",
            "Potluck at the new place, bring something to share.",
            Utc::now() + Duration::days(3),
            chrono_tz::America::New_York,
        )
        .await?;

    let salad = items.create(event.id, "a big salad").await?;
    items.create(event.id, "something to drink").await?;
    earmarks
        .create(salad.id, guest.id, "caesar, extra croutons")
        .await?;

    tracing::info!(event_id = %event.id, "seed data written");
    Ok(())
}
