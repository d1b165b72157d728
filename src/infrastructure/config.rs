use crate::domain::thresholds::ThresholdTable;
use config::builder::{ConfigBuilder, DefaultState};
use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub source: SourceSettings,
    pub thresholds: ThresholdTable,
    pub sparkline: SparklineSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub listen_addr: SocketAddr,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    Sse,
    Simulated,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceSettings {
    pub mode: SourceMode,
    pub base_url: String,
    pub tick_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SparklineSettings {
    pub width: f64,
    pub height: f64,
}

/// Defaults, then `config/dashboard.*` if present, then `DASHBOARD__SECTION__KEY` variables.
pub fn load_settings() -> anyhow::Result<Settings> {
    let builder = with_defaults(config::Config::builder())?
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(
            config::Environment::with_prefix("DASHBOARD")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

    finish(builder)
}

fn with_defaults(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
    let thresholds = ThresholdTable::default();
    builder
        .set_default("server.listen_addr", "0.0.0.0:8080")?
        .set_default("source.mode", "sse")?
        .set_default("source.base_url", "http://127.0.0.1:8081")?
        .set_default("source.tick_ms", 400)?
        .set_default("thresholds.flow_high", thresholds.flow_high)?
        .set_default("thresholds.flow_low", thresholds.flow_low)?
        .set_default("thresholds.humidity", thresholds.humidity)?
        .set_default("thresholds.temp", thresholds.temp)?
        .set_default("thresholds.pressure", thresholds.pressure)?
        .set_default("sparkline.width", 160.0)?
        .set_default("sparkline.height", 40.0)
}

fn finish(builder: ConfigBuilder<DefaultState>) -> anyhow::Result<Settings> {
    let settings: Settings = builder.build()?.try_deserialize()?;
    settings.thresholds.validate()?;
    anyhow::ensure!(settings.source.tick_ms > 0, "source.tick_ms must be greater than zero");
    for (key, value) in [
        ("sparkline.width", settings.sparkline.width),
        ("sparkline.height", settings.sparkline.height),
    ] {
        anyhow::ensure!(
            value.is_finite() && value > 0.0,
            "{} must be a positive number, got {}",
            key,
            value
        );
    }
    Ok(settings)
}
