use std::net::SocketAddr;

use anyhow::Context;
use hourperf_server::{router, AppState, ServerConfig};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hourperf_server=info,hourperf_pivot=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    let addr = SocketAddr::new(
        config
            .host
            .parse()
            .with_context(|| format!("invalid HOST {:?}", config.host))?,
        config.port,
    );
    if config.run_token.is_none() {
        tracing::warn!("RUN_TOKEN is not set; the trigger is unauthenticated");
    }
    tracing::info!(
        source = %config.source_path.display(),
        target = %config.target_path.display(),
        "Report paths"
    );

    let app = router(AppState::new(config)).layer(TraceLayer::new_for_http());

    tracing::info!("Starting server on {addr}");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await?;
    Ok(())
}
