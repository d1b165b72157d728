// Application state for HTTP handlers
use crate::application::ingestion_service::UserCommand;
use crate::infrastructure::memory_surface::MemorySurface;
use tokio::sync::{mpsc, watch};

#[derive(Clone)]
pub struct AppState {
    /// Latest surface published by the ingestion controller.
    pub dashboard: watch::Receiver<MemorySurface>,
    pub commands: mpsc::Sender<UserCommand>,
}
