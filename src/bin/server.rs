use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ludex_proxy::server::{router, AppState};
use ludex_proxy::{Config, Enricher, HttpIgdbTransport, HttpSparqlClient, IgdbClient, TokenCache};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "proxy_server=debug,ludex_proxy=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    tracing::info!("starting game metadata proxy");
    tracing::info!("IGDB base: {}", config.igdb_base_url);
    tracing::info!("port: {}", config.port);

    let tokens = Arc::new(TokenCache::new(&config)?);
    let igdb = Arc::new(IgdbClient::new(Arc::new(HttpIgdbTransport::new(
        &config,
        tokens,
    )?)));
    let enricher = Arc::new(Enricher::new(Arc::new(HttpSparqlClient::new(&config)?)));

    let state = AppState { igdb, enricher };

    // the browser frontend runs on a separate origin
    let app = router(state).layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
