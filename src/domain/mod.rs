// Domain layer - Telemetry state and pure computations
pub mod alert;
pub mod channel;
pub mod connection;
pub mod dashboard;
pub mod event_log;
pub mod message;
pub mod series;
pub mod thresholds;
pub mod trend;
