//! Control Point API - Change Governance Gate
//!
//! Maintains atomic policy claims, matches them to proposed change scopes,
//! detects contradictions, and gates changes behind explicit human
//! arbitration. The claim registry is process-local and in-memory by design;
//! state is lost on restart.

use control_point::config::Settings;
use control_point::routes::create_router;
use control_point::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber for structured logging
    init_tracing();

    info!("🚀 Starting Control Point - Change Governance Gate...");

    // Load configuration
    let settings = Settings::load()?;
    info!("📋 Configuration loaded successfully");

    // The registry starts empty: claims arrive via registration or import.
    let state = Arc::new(AppState::new());

    // Build the router
    let app = create_router(state, &settings);

    // Create socket address
    let addr = SocketAddr::from((settings.server.host, settings.server.port));

    info!("🌐 Gate listening on http://{}", addr);
    info!("");
    info!("📚 API Endpoints:");
    info!("   ─── Claim Registry ───");
    info!("   POST /claims/register   - Register a claim");
    info!("   GET  /claims            - List all claims");
    info!("   GET  /claims/:claim_id  - Get one claim");
    info!("   POST /claims/import     - Import claims from text");
    info!("");
    info!("   ─── Gate ───");
    info!("   POST /gate/check        - Evaluate a change scope");
    info!("   POST /gate/arbitrate    - Submit a human arbitration");
    info!("   GET  /gate/contract     - Exit-code and version contract");
    info!("");

    // Create TCP listener and serve
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Gate shutdown complete");
    Ok(())
}

/// Initialize tracing with structured logging
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,control_point=debug,tower_http=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .compact(),
        )
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("📴 Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("📴 Received terminate signal, initiating graceful shutdown...");
        },
    }
}
