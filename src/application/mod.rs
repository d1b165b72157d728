// Application layer - Ingestion pipeline and the seams it drives
pub mod ingestion_service;
pub mod push_channel;
pub mod render_surface;
pub mod sparkline;
