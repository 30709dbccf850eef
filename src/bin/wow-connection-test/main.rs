mod args;

use anyhow::{Context as _, bail};
use args::Args;
use chrono::Utc;
use clap::Parser as _;
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};
use wow_uploader::wow::{Credentials, HttpTransport, Uploader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let credentials = Credentials::new(args.site_id, args.auth_key);

    let transport = HttpTransport::new().context("failed to create HTTP transport")?;
    let uploader = Uploader::with_endpoint(transport, args.endpoint);

    if let Err(e) = uploader.test_connection(&credentials, Utc::now()).await {
        bail!("connection test failed: {e}");
    }

    println!("Connection to {} succeeded", uploader.endpoint());

    Ok(())
}
