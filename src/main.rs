// Filmorate server

use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

use filmorate::{app_state::AppState, config::Config, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("filmorate=info")),
        )
        .init();

    let config = Config::from_env()?;
    let app_state = AppState::new(&config).await?;

    let app = create_router(app_state).layer(ServiceBuilder::new().layer(CorsLayer::permissive()));

    let addr = config.server_address();
    let listener = TcpListener::bind(addr.as_str()).await?;
    tracing::info!("Filmorate listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
