//! Zara Daemon - hardware-aware assistant I/O router
//!
//! Probes the attached hardware once, reports what it found, and serves
//! logical I/O actions with graceful fallbacks until shut down.

use anyhow::Result;
use tracing::{info, Level};

use zarad::config::ZaraConfig;
use zarad::router::ZaraRouter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("Zara Daemon v{} starting", env!("CARGO_PKG_VERSION"));

    let config = ZaraConfig::load();
    let router = ZaraRouter::initialize(config).await;

    println!("{}", router.status_report().await);

    let results = router.self_test().await;
    let healthy = results.iter().filter(|(_, r)| r.success).count();
    info!("Self test: {}/{} actions healthy", healthy, results.len());

    info!("Zara Daemon ready");

    tokio::signal::ctrl_c().await?;
    info!("Shutting down gracefully");
    router.shutdown();

    Ok(())
}
