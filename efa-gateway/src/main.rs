use std::error::Error;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use efa_gateway::cache::CachedEfaClient;
use efa_gateway::config::GatewayConfig;
use efa_gateway::efa::{EfaApi, EfaClient, MockEfaClient};
use efa_gateway::web::{AppState, create_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "efa_gateway=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = GatewayConfig::from_env()?;

    match &config.mock_dir {
        Some(dir) => {
            let client = MockEfaClient::from_dir(dir)?;
            info!(
                dir = %dir.display(),
                stops = client.available_stops().await.len(),
                "using mock EFA data"
            );
            serve(client, &config).await
        }
        None => {
            info!(base_url = %config.efa.base_url, "using live EFA provider");
            let client = EfaClient::new(config.efa.clone())?;
            serve(client, &config).await
        }
    }
}

async fn serve<C: EfaApi + 'static>(
    client: C,
    config: &GatewayConfig,
) -> Result<(), Box<dyn Error>> {
    let cached = CachedEfaClient::new(client, &config.cache);
    let app = create_router(AppState::new(cached));

    let addr = config.addr;
    info!("EFA gateway listening on http://{addr}");
    info!("  GET /health");
    info!("  GET /api/stops/search?q=<text>&city=<text>&location=<bool>");
    info!("  GET /api/stops/<stopId>?detailed=<bool>&delay=<bool>&track=<token>");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
