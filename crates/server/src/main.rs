use std::sync::Arc;

use opening_classifier::{Catalogue, OpeningEngine};
use server::clients::callback::CallbackClient;
use server::config::Config;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env();

    // Catalogue is indexed once, before anything is served
    tracing::info!("Loading opening catalogue from {}...", config.catalogue_path);
    let engine = Arc::new(OpeningEngine::new(Catalogue::load_or_empty(&config.catalogue_path)));

    let callback = CallbackClient::from_config(&config);
    match &callback {
        Some(client) => tracing::info!("Forwarding results to {}", client.url()),
        None => tracing::info!("CALLBACK_URL not set - results are not forwarded"),
    }

    let addr = format!("{}:{}", config.host, config.port);
    let app = server::app(engine, config, callback);

    tracing::info!("Starting server on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
