use anyhow::Result;
use pqscope::{service, ServiceConfig};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = ServiceConfig::from_env()?;

    // ─── 1) init logging ─────────────────────────────────────────────
    fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(cfg.log_level.parse().unwrap_or(Level::INFO.into())),
        )
        .init();

    info!("Starting parquet inspection service");
    info!(
        max_upload_bytes = cfg.max_upload_bytes,
        batch_size = cfg.batch_size,
        "configuration loaded"
    );

    // ─── 2) serve ────────────────────────────────────────────────────
    let port = cfg.port;
    let routes = service::routes(Arc::new(cfg));

    info!("Server starting on port {}", port);
    info!("Health check: http://localhost:{}/health", port);
    info!("Upload endpoint: POST http://localhost:{}/upload_parquet", port);

    warp::serve(routes).run(([0, 0, 0, 0], port)).await;

    Ok(())
}
