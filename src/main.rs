use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod error;
mod tts;

use api::routes::{create_router, AppState};
use config::Config;
use tts::CommandSynthesizer;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Configuration from environment, read once
    let config = Config::from_env().expect("Invalid configuration");

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Invalid address");

    tracing::info!("IndexTTS Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Starting server on http://{}", addr);

    let synthesizer = CommandSynthesizer::new(config.synthesizer);
    let synth_config = synthesizer.config();
    tracing::info!("Working directory: {}", synth_config.workdir.display());
    tracing::info!("Command template: {}", synth_config.template.as_str());
    tracing::info!(
        "Template placeholders: {}",
        synth_config.template.placeholders().join(", ")
    );

    // Create app state
    let state = Arc::new(AppState {
        synthesizer: Arc::new(synthesizer),
    });

    // Create router
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
