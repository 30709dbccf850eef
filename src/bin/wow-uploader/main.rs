mod args;

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use args::Args;
use chrono::Utc;
use clap::Parser as _;
use sqlx::PgPool;
use tokio::{
    signal,
    time::{MissedTickBehavior, interval},
};
use tokio_stream::{StreamExt as _, wrappers::IntervalStream};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};
use wow_uploader::{
    db::{get_sensor_states, new_pool},
    wow::{HttpTransport, Session, StatusSnapshot, Uploader},
};

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    if let Err(e) = run().await {
        error!("{e:#}");
        return ExitCode::from(1);
    }

    ExitCode::from(0)
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn run() -> Result<()> {
    let args = Args::parse();
    let config = args.config()?;

    if config.bindings.is_empty() {
        warn!("no sensors configured, every upload will fail until one is bound");
    }

    let pool = new_pool(&args.database_url).await?;

    let transport = HttpTransport::new()?;
    let uploader = Uploader::new(transport)?;

    info!(
        endpoint = %uploader.endpoint(),
        interval_minutes = config.interval.minutes(),
        sensors = config.bindings.len(),
        debug_mode = config.debug_mode,
        "starting WOW uploader"
    );

    let mut ticker = interval(config.interval.as_duration());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut ticks = IntervalStream::new(ticker);

    let mut session = Session::new(config, uploader);

    let shutdown = signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = &mut shutdown => {
                result.context("failed to listen for shutdown signal")?;
                break;
            }
            Some(_) = ticks.next() => {}
        }

        let snapshot = tokio::select! {
            result = &mut shutdown => {
                result.context("failed to listen for shutdown signal")?;
                info!("shutdown requested, abandoning in-flight upload");
                break;
            }
            snapshot = run_cycle(&mut session, &pool) => snapshot,
        };

        publish(&snapshot, args.status_file.as_deref()).await;
    }

    info!(
        upload_count = session.state().upload_count(),
        "WOW uploader stopped"
    );

    Ok(())
}

async fn run_cycle(session: &mut Session<HttpTransport>, pool: &PgPool) -> StatusSnapshot {
    let entity_ids = session.config().bindings.entity_ids();

    match get_sensor_states(pool, &entity_ids).await {
        Ok(states) => session.run_cycle(&states).await,
        Err(e) => session.fail_cycle(format!("{e:#}"), Utc::now()),
    }
}

async fn publish(snapshot: &StatusSnapshot, status_file: Option<&Path>) {
    let json = match serde_json::to_string_pretty(snapshot) {
        Ok(json) => json,
        Err(e) => {
            error!(error = %e, "failed to serialize upload status");
            return;
        }
    };

    info!(status = %snapshot.status, upload_count = snapshot.upload_count, "upload status: {json}");

    let Some(path) = status_file else {
        return;
    };

    if let Err(e) = tokio::fs::write(path, json.as_bytes()).await {
        warn!(path = %path.display(), error = %e, "failed to write status file");
    }
}
