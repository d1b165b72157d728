// Inbound push-channel payload
use super::channel::Channel;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("malformed telemetry payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("telemetry payload is not a JSON object")]
    NotAnObject,
}

/// One JSON object per push event. Numeric fields are optional; `null` and
/// absence both mean "no reading this cycle". Wrong JSON types are rejected.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TelemetryMessage {
    #[serde(default)]
    pub flow_lpm: Option<f64>,
    #[serde(default)]
    pub humidity_pct: Option<f64>,
    #[serde(default)]
    pub temperature_c: Option<f64>,
    #[serde(default)]
    pub pressure_kpa: Option<f64>,
    #[serde(default)]
    pub connection: Option<String>,
    #[serde(default)]
    pub via: Option<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub alerts: Vec<String>,
    #[serde(default)]
    pub seq: Option<u64>,
    /// Gateway-side prose for the alert list. Informational only.
    #[serde(default)]
    pub alert_summary: Option<String>,
}

fn nullable_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl TelemetryMessage {
    pub fn parse(text: &str) -> Result<Self, MessageError> {
        // Derived structs also accept positional arrays.
        match serde_json::from_str::<serde_json::Value>(text)? {
            value @ serde_json::Value::Object(_) => Ok(serde_json::from_value(value)?),
            _ => Err(MessageError::NotAnObject),
        }
    }

    pub fn reading(&self, channel: Channel) -> Option<f64> {
        match channel {
            Channel::Flow => self.flow_lpm,
            Channel::Humidity => self.humidity_pct,
            Channel::Temperature => self.temperature_c,
            Channel::Pressure => self.pressure_kpa,
        }
    }

    /// `None` when the payload carries no connection field.
    pub fn is_connected(&self) -> Option<bool> {
        self.connection.as_deref().map(|c| c == "CONNECTED")
    }
}
