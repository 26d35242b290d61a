use std::net::SocketAddr;
use std::sync::Arc;

use annotate_api::{app, config::Config, state::AppState};
use anyhow::Result;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("annotate_api=info".parse()?)
                .add_directive("annotate_core=info".parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .init();

    info!("Initializing Annotate API...");
    let config = Config::from_env();
    let state = Arc::new(AppState::new(&config).await?);
    let app = app(state, &config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Starting Annotate API on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
