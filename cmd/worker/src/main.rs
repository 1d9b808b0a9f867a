//! # Worker
//!
//! The background process: runs the reminder scheduler and the archival
//! sweep on a fixed interval until interrupted. Which jobs run is
//! configurable, so deployments can split the two across processes.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use configs::AppConfig;
use domains::ports::SystemClock;
use mail_adapters::{SmtpConfig, SmtpMailer};
use secrecy::ExposeSecret;
use services::{Archiver, ReminderScheduler};
use storage_adapters::{
    PgEarmarkRepo, PgEventItemRepo, PgEventRepo, PgReminderRepo, PgStore, PgUserRepo,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobList {
    Notifier,
    Archiver,
    All,
}

impl JobList {
    fn runs_notifier(self) -> bool {
        matches!(self, JobList::Notifier | JobList::All)
    }

    fn runs_archiver(self) -> bool {
        matches!(self, JobList::Archiver | JobList::All)
    }
}

impl FromStr for JobList {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "notifier" => Ok(JobList::Notifier),
            "archiver" => Ok(JobList::Archiver),
            "all" => Ok(JobList::All),
            other => anyhow::bail!("unknown job list {other:?}"),
        }
    }
}

fn init_tracing(format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if format == "json" {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("loading configuration")?;
    init_tracing(&config.log.format);

    let jobs: JobList = config.worker.jobs.parse()?;
    let interval = Duration::from_secs(config.worker.interval_secs);

    let store = PgStore::connect(config.database_url.expose_secret())
        .await
        .context("connecting to database")?;
    store.migrate().await.context("running migrations")?;

    let users = Arc::new(PgUserRepo::new(store.clone()));
    let events = Arc::new(PgEventRepo::new(store.clone()));
    let items = Arc::new(PgEventItemRepo::new(store.clone()));
    let earmarks = Arc::new(PgEarmarkRepo::new(store.clone()));
    let reminders = Arc::new(PgReminderRepo::new(store.clone()));
    let clock = Arc::new(SystemClock);

    let mailer = Arc::new(SmtpMailer::new(&SmtpConfig {
        host: config.smtp.host.clone(),
        port: config.smtp.port,
        username: config.smtp.username.clone(),
        password: config.smtp.password.clone(),
        default_from: config.smtp.from.clone(),
    })?);

    let scheduler = ReminderScheduler::new(
        reminders,
        users,
        events.clone(),
        items,
        earmarks,
        mailer,
        clock.clone(),
        config.base_url.clone(),
    );
    let archiver = Archiver::new(events, clock);

    tracing::info!(?jobs, interval_secs = config.worker.interval_secs, "worker started");

    // The first tick fires immediately, so jobs run once at startup.
    let mut ticker = tokio::time::interval(interval);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if jobs.runs_notifier() {
                    match scheduler.run().await {
                        Ok(sent) if sent > 0 => tracing::info!(sent, "reminder cycle finished"),
                        Ok(_) => {}
                        Err(err) => tracing::error!(error = %err, "reminder cycle failed"),
                    }
                }
                if jobs.runs_archiver() {
                    if let Err(err) = archiver.run().await {
                        tracing::error!(error = %err, "archival sweep failed");
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutdown signal received");
                break;
            }
        }
    }
    Ok(())
}
