// HTTP request handlers
use crate::application::ingestion_service::UserCommand;
use crate::infrastructure::memory_surface::MemorySurface;
use crate::presentation::app_state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Current rendered dashboard
pub async fn get_dashboard(State(state): State<Arc<AppState>>) -> Json<MemorySurface> {
    Json(state.dashboard.borrow().clone())
}

pub async fn clear_log(State(state): State<Arc<AppState>>) -> StatusCode {
    send_command(&state, UserCommand::ClearLog).await
}

pub async fn test_alarm(State(state): State<Arc<AppState>>) -> StatusCode {
    send_command(&state, UserCommand::TestAlarm).await
}

/// Drop the current push-channel subscription and open a fresh one
pub async fn resubscribe(State(state): State<Arc<AppState>>) -> StatusCode {
    send_command(&state, UserCommand::Resubscribe).await
}

async fn send_command(state: &AppState, command: UserCommand) -> StatusCode {
    match state.commands.send(command).await {
        Ok(()) => StatusCode::ACCEPTED,
        Err(e) => {
            tracing::warn!("Ingestion controller is gone; dropping {:?}", e.0);
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
