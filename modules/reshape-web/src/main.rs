use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use reshape_common::Config;
use reshape_web::{app, indexnow, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("reshape_web=info".parse()?)
                .add_directive("reshape_common=info".parse()?),
        )
        .init();

    let config = Config::from_env();
    let addr = format!("{}:{}", config.web_host, config.web_port);

    if config.indexnow_key.is_empty() {
        info!("INDEXNOW_KEY not set, IndexNow submission disabled");
    } else if !indexnow::is_valid_key(&config.indexnow_key) {
        warn!("INDEXNOW_KEY is malformed, IndexNow submission disabled");
    }

    let locales: Vec<&str> = config.locales.supported().iter().map(|l| l.code()).collect();
    info!(
        locales = %locales.join(","),
        default_locale = %config.locales.default_locale(),
        site_url = %config.site_url,
        "Configuration loaded"
    );

    let state = Arc::new(AppState::new(config)?);
    let router = app(state);

    info!("Reshape web starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
