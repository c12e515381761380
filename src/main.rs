// --- ISMIS schedule generator: HTTP entry point ---

use ismis_scheduler::{run_server, AppConfig};
use ismis_scheduler::catalog::CatalogStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // RUST_LOG may come from .env
    let _ = dotenv::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env();

    if let Err(e) = CatalogStore::new(config.data_dir.clone()).ensure_dir() {
        tracing::warn!(dir = %config.data_dir.display(), error = %e, "cannot create data directory");
    }

    tracing::info!("=== ISMIS Course Scheduler (API) ===");
    run_server(config).await
}
