// Infrastructure layer - External dependencies and adapters
pub mod alarm;
pub mod config;
pub mod memory_surface;
pub mod simulated_channel;
pub mod sse_channel;
