// src/main.rs

use content_widget::config::Config;
use content_widget::models::kind::ItemKind;
use content_widget::routes;
use content_widget::state::AppState;
use dotenvy::dotenv;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "widget.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    tracing::info!("Content API: {}", config.api_base_url);
    if config.api_key.is_empty() {
        tracing::warn!("CONTENT_API_KEY is not set; every widget request will fail to initialize");
    }
    for kind in ItemKind::ALL {
        tracing::info!("Serving {} widget at /widgets/{}", kind.widget_name(), kind);
    }

    let addr = config.listen_addr.clone();

    // Create AppState
    let state = AppState { config };

    // Create the Axum application router
    let app = routes::create_router(state);

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind listen address");

    // Start the server
    axum::serve(listener, app).await.expect("Server error");
}
