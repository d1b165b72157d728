// Main entry point - Dependency injection and client startup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{sync::Arc, time::Duration};
use axum::{routing::{get, post}, Router};
use tokio::sync::{mpsc, watch};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::ingestion_service::IngestionController;
use crate::application::push_channel::PushChannel;
use crate::infrastructure::alarm::TerminalBell;
use crate::infrastructure::config::{load_settings, SourceMode};
use crate::infrastructure::memory_surface::MemorySurface;
use crate::infrastructure::simulated_channel::SimulatedPushChannel;
use crate::infrastructure::sse_channel::SsePushChannel;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{clear_log, get_dashboard, health_check, resubscribe, test_alarm};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let settings = load_settings()?;

    // Push channel (infrastructure layer)
    let channel: Arc<dyn PushChannel> = match settings.source.mode {
        SourceMode::Sse => Arc::new(SsePushChannel::new(&settings.source.base_url)),
        SourceMode::Simulated => Arc::new(SimulatedPushChannel::new(
            Duration::from_millis(settings.source.tick_ms),
            settings.thresholds,
        )),
    };

    // Ingestion controller owns all dashboard state (application layer)
    let controller = IngestionController::new(
        settings.thresholds,
        MemorySurface::new(settings.sparkline.width, settings.sparkline.height),
        Box::new(TerminalBell),
    );
    let (view_tx, view_rx) = watch::channel(controller.surface().clone());
    let (command_tx, command_rx) = mpsc::channel(32);

    let ingestion = tokio::spawn(controller.run(channel, command_rx, move |surface| {
        view_tx.send_replace(surface.clone());
    }));

    // Create application state
    let state = Arc::new(AppState {
        dashboard: view_rx,
        commands: command_tx,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/dashboard", get(get_dashboard))
        .route("/log/clear", post(clear_log))
        .route("/alarm/test", post(test_alarm))
        .route("/subscription", post(resubscribe))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = settings.server.listen_addr;
    tracing::info!("Starting sensor-dashboard control API on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    ingestion.abort();
    Ok(())
}
