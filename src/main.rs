//! API Cache - command line fetcher
//!
//! Fetches each endpoint given on the command line twice through the cache
//! and prints the responses followed by the cache statistics.

use anyhow::{bail, Context};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_cache::{ApiClient, CacheOptions, Config};

/// Main entry point for the caching fetcher.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the client, its file-backed cache and the cleanup task
/// 4. GET every endpoint twice; the second read is served from the cache
/// 5. Print statistics and stop the cleanup task
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" for this crate, can be overridden with RUST_LOG
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let endpoints: Vec<String> = std::env::args().skip(1).collect();
    if endpoints.is_empty() {
        bail!("usage: api_cache <endpoint>...");
    }

    let config = Config::from_env();
    info!(
        "Configuration loaded: base_url={}, timeout={}ms, cache_dir={}, cleanup_interval={}s",
        config.api_base_url,
        config.request_timeout_ms,
        config.cache_dir.display(),
        config.cleanup_interval
    );

    let client = ApiClient::from_config(&config).context("Failed to initialize API client")?;
    let options = CacheOptions::default();

    for endpoint in &endpoints {
        for _ in 0..2 {
            let data: Value = client
                .get(endpoint, None, &options)
                .await
                .with_context(|| format!("GET {endpoint} failed"))?;
            println!("{endpoint}: {}", serde_json::to_string_pretty(&data)?);
        }
    }

    let stats = client.cache_stats().await;
    println!("{}", serde_json::to_string_pretty(&stats)?);

    client.cache().stop_cleanup();
    info!("Done");
    Ok(())
}
