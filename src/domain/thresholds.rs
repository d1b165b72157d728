// Static alert thresholds
use super::channel::Channel;
use serde::Deserialize;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ThresholdError {
    #[error("threshold {0} must be a finite number")]
    NotFinite(&'static str),
    #[error("flow_low ({low}) must be below flow_high ({high})")]
    InvertedFlowBand { low: f64, high: f64 },
}

/// Emergency limits per channel. Loaded once at startup and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ThresholdTable {
    pub flow_high: f64,
    pub flow_low: f64,
    pub humidity: f64,
    pub temp: f64,
    pub pressure: f64,
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self {
            flow_high: 45.0,
            flow_low: 0.3,
            humidity: 80.0,
            temp: 50.0,
            pressure: 120.0,
        }
    }
}

impl ThresholdTable {
    pub fn validate(&self) -> Result<(), ThresholdError> {
        let fields = [
            ("flow_high", self.flow_high),
            ("flow_low", self.flow_low),
            ("humidity", self.humidity),
            ("temp", self.temp),
            ("pressure", self.pressure),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ThresholdError::NotFinite(name));
        }
        if self.flow_low >= self.flow_high {
            return Err(ThresholdError::InvertedFlowBand {
                low: self.flow_low,
                high: self.flow_high,
            });
        }
        Ok(())
    }

    /// Whether `value` is out of range for `channel`.
    /// Flow is the only channel with a low-end limit.
    pub fn is_alerting(&self, channel: Channel, value: f64) -> bool {
        match channel {
            Channel::Flow => value > self.flow_high || value < self.flow_low,
            Channel::Humidity => value > self.humidity,
            Channel::Temperature => value > self.temp,
            Channel::Pressure => value > self.pressure,
        }
    }
}
