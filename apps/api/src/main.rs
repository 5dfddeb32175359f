mod completion;
mod config;
mod errors;
mod export;
mod layout;
mod models;
mod normalize;
mod render;
mod routes;
mod session;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::completion::ChatCompletionClient;
use crate::config::Config;
use crate::layout::A4;
use crate::routes::build_router;
use crate::session::SessionStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting onepage API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize text-completion client
    let completion = ChatCompletionClient::new(&config)?;
    if completion.has_credential() {
        info!("Completion client initialized (model: {})", completion.model());
    } else {
        warn!("COMPLETION_API_KEY is not set; suggestion requests will fail");
    }

    info!("Page: A4 {}x{}pt", A4.width, A4.height);

    let sessions = SessionStore::default();
    if config.session_idle_secs > 0 {
        sessions.spawn_idle_sweeper(chrono::Duration::seconds(i64::from(config.session_idle_secs)));
        info!("Idle sessions expire after {}s", config.session_idle_secs);
    }

    let state = AppState {
        config: config.clone(),
        sessions,
        completion: Arc::new(completion),
        page: A4,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
