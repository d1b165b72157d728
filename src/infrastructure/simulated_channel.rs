// Simulated gateway - local readings when no sensor gateway is reachable
use crate::application::push_channel::{PushChannel, PushEvent};
use crate::domain::alert::AlertSet;
use crate::domain::channel::{Channel, ChannelMap};
use crate::domain::thresholds::ThresholdTable;
use futures::stream::{self, BoxStream};
use futures::StreamExt;
use serde_json::json;
use std::time::Duration;
use tokio_stream::wrappers::IntervalStream;

#[derive(Debug, Clone)]
pub struct SimulatedPushChannel {
    tick: Duration,
    thresholds: ThresholdTable,
}

impl SimulatedPushChannel {
    pub fn new(tick: Duration, thresholds: ThresholdTable) -> Self {
        Self { tick, thresholds }
    }

    /// Deterministic reading for `tick`, wandering inside believable bounds.
    pub fn readings(tick: u64) -> ChannelMap<Option<f64>> {
        let t = tick as f64;
        ChannelMap::from_fn(|channel| {
            let value = match channel {
                Channel::Flow => {
                    (2.0 + 1.5 * (t * 0.07).sin() + 0.4 * (t * 0.31).sin()).clamp(0.0, 50.0)
                }
                Channel::Humidity => {
                    (40.0 + 8.0 * (t * 0.05).sin() + (t * 0.23).cos()).clamp(10.0, 90.0)
                }
                Channel::Temperature => {
                    (22.0 + 4.0 * (t * 0.03).sin() + 0.5 * (t * 0.17).sin()).clamp(-10.0, 60.0)
                }
                Channel::Pressure => {
                    (101.3 + 3.0 * (t * 0.04).sin() + 0.3 * (t * 0.29).cos()).clamp(90.0, 130.0)
                }
            };
            Some((value * 100.0).round() / 100.0)
        })
    }

    /// The gateway payload the simulator emits for `tick`.
    pub fn sample(&self, tick: u64) -> serde_json::Value {
        let readings = Self::readings(tick);
        let alerts = AlertSet::from_readings(&readings, &self.thresholds);
        let summary = if alerts.is_empty() {
            "None".to_string()
        } else {
            alerts.banner_text()
        };
        json!({
            "flow_lpm": readings.get(Channel::Flow),
            "humidity_pct": readings.get(Channel::Humidity),
            "temperature_c": readings.get(Channel::Temperature),
            "pressure_kpa": readings.get(Channel::Pressure),
            "alerts": alerts,
            "alert_summary": summary,
            "connection": "CONNECTED",
            "via": "SIM",
            "seq": tick + 1,
        })
    }
}

impl PushChannel for SimulatedPushChannel {
    fn subscribe(&self) -> BoxStream<'static, PushEvent> {
        let simulator = self.clone();
        let period = self.tick;
        // The interval is created on first poll, inside the consumer's runtime.
        let ticks = stream::once(async move { IntervalStream::new(tokio::time::interval(period)) })
            .flatten();

        stream::once(async { PushEvent::Open })
            .chain(ticks.zip(stream::iter(0u64..)).map(move |(_, tick)| {
                PushEvent::Message(simulator.sample(tick).to_string())
            }))
            .boxed()
    }
}
