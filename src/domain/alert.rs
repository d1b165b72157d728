// Alert codes reported by the sensor gateway
use super::channel::{Channel, ChannelMap};
use super::thresholds::ThresholdTable;
use serde::{Serialize, Serializer};

pub const BANNER_TITLE: &str = "EMERGENCY — CHECK SENSORS";
pub const EMERGENCY_CTA: &str = "Call emergency";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AlertCode {
    HighFlow,
    LowFlow,
    HighHumidity,
    HighTemp,
    HighPressure,
    /// Any code outside the known vocabulary, kept verbatim.
    Other(String),
}

impl AlertCode {
    pub fn parse(code: &str) -> Self {
        match code {
            "HIGH_FLOW" => AlertCode::HighFlow,
            "LOW_FLOW" => AlertCode::LowFlow,
            "HIGH_HUMIDITY" => AlertCode::HighHumidity,
            "HIGH_TEMP" => AlertCode::HighTemp,
            "HIGH_PRESSURE" => AlertCode::HighPressure,
            other => AlertCode::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            AlertCode::HighFlow => "HIGH_FLOW",
            AlertCode::LowFlow => "LOW_FLOW",
            AlertCode::HighHumidity => "HIGH_HUMIDITY",
            AlertCode::HighTemp => "HIGH_TEMP",
            AlertCode::HighPressure => "HIGH_PRESSURE",
            AlertCode::Other(raw) => raw.as_str(),
        }
    }

    pub fn description(&self) -> &str {
        match self {
            AlertCode::HighFlow => "High flow",
            AlertCode::LowFlow => "Low flow",
            AlertCode::HighHumidity => "High humidity",
            AlertCode::HighTemp => "High temperature",
            AlertCode::HighPressure => "High pressure",
            AlertCode::Other(raw) => raw.as_str(),
        }
    }
}

impl Serialize for AlertCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Active alert codes in the order the message listed them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AlertSet {
    codes: Vec<AlertCode>,
}

impl AlertSet {
    pub fn from_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            codes: codes.into_iter().map(|c| AlertCode::parse(c.as_ref())).collect(),
        }
    }

    /// Codes a gateway would raise for these readings. Missing readings raise nothing.
    pub fn from_readings(readings: &ChannelMap<Option<f64>>, thresholds: &ThresholdTable) -> Self {
        let mut codes = Vec::new();
        for (channel, value) in readings.iter() {
            let Some(v) = *value else { continue };
            match channel {
                Channel::Flow if v > thresholds.flow_high => codes.push(AlertCode::HighFlow),
                Channel::Flow if v < thresholds.flow_low => codes.push(AlertCode::LowFlow),
                Channel::Humidity if v > thresholds.humidity => codes.push(AlertCode::HighHumidity),
                Channel::Temperature if v > thresholds.temp => codes.push(AlertCode::HighTemp),
                Channel::Pressure if v > thresholds.pressure => codes.push(AlertCode::HighPressure),
                _ => {}
            }
        }
        Self { codes }
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn codes(&self) -> &[AlertCode] {
        &self.codes
    }

    pub fn descriptions(&self) -> Vec<&str> {
        self.codes.iter().map(AlertCode::description).collect()
    }

    /// Body text of the emergency banner.
    pub fn banner_text(&self) -> String {
        self.descriptions().join(", ")
    }

    /// Call-to-action label while the banner is showing.
    pub fn call_to_action(&self) -> String {
        if self.is_empty() {
            return EMERGENCY_CTA.to_string();
        }
        format!("{} — {}", EMERGENCY_CTA, self.descriptions().join(" + "))
    }

    /// Event-log line summarising the raw codes.
    pub fn log_summary(&self) -> String {
        let raw: Vec<&str> = self.codes.iter().map(AlertCode::as_str).collect();
        format!("Alerts: {}", raw.join(", "))
    }
}
