use tracing::info;

use ollama_relay::config::RelayConfig;
use ollama_relay::create_router;
use ollama_relay::upstream::OllamaClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (development convenience)
    dotenvy::dotenv().ok();

    // Initialise tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ollama_relay=debug,tower_http=debug".into()),
        )
        .init();

    let config = RelayConfig::from_env();
    info!(
        "relaying to {} (model '{}', keep_alive {})",
        config.ollama_base_url, config.model, config.keep_alive
    );

    let client = OllamaClient::new(&config);
    let app = create_router(client);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{addr}/");

    axum::serve(listener, app).await?;
    Ok(())
}
