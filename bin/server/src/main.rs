use std::sync::Arc;
use std::time::Duration;

use gatehouse_identity::CallbackOrchestrator;
use gatehouse_server::{
    app,
    auth::{self, AppState, GithubOAuthClient},
    backend::{self, HttpIdentitySync, HttpUserDirectory},
    config::ServerConfig,
    error::StartupError,
    pages::PageRenderer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> gatehouse_core::Result<(), StartupError> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = ServerConfig::from_env().map_err(|e| StartupError::Config {
        details: e.to_string(),
    })?;
    tracing::info!(
        backend = %config.backend.base_url,
        profile_lookup = ?config.backend.profile_lookup,
        protected_prefix = %config.gate.protected_prefix,
        "Loaded configuration"
    );

    config.session.validate()?;
    let cookie_key = config.session.signing_key()?;
    let timeout = Duration::from_secs(config.backend.timeout_seconds);

    // Backend identity service
    let backend_client = backend::http_client(timeout)?;
    let sync = HttpIdentitySync::new(backend_client.clone(), &config.backend.base_url);
    let directory = HttpUserDirectory::new(
        backend_client,
        &config.backend.base_url,
        config.backend.profile_lookup,
    );

    let provider = GithubOAuthClient::new(&config.github, timeout)?;

    let state = AppState {
        provider: Arc::new(provider),
        orchestrator: Arc::new(CallbackOrchestrator::new(Arc::new(sync))),
        directory: Arc::new(directory),
        gate: Arc::new(auth::build_gate(&config.gate)),
        session_config: Arc::new(config.session),
        cookie_key,
        pages: Arc::new(PageRenderer::new()?),
    };

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .map_err(|e| StartupError::Serve {
            details: format!("failed to bind to {}: {}", config.bind_addr, e),
        })?;

    tracing::info!("listening on http://{}", config.bind_addr);

    axum::serve(listener, app::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| StartupError::Serve {
            details: e.to_string(),
        })?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
