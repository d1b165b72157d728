// Dashboard state owned by the ingestion controller
use super::alert::AlertSet;
use super::channel::{Channel, ChannelMap};
use super::connection::ConnectionState;
use super::event_log::EventLog;
use super::series::RollingSeries;
use super::thresholds::ThresholdTable;
use super::trend::{compute_trend, TrendResult};
use chrono::NaiveTime;

/// Readings are clamped to this magnitude before entering the history so a
/// wild sample cannot wreck the sparkline scale.
pub const RENDER_CLAMP: f64 = 1e6;

#[derive(Debug, Clone, Default)]
pub struct ChannelState {
    pub last_value: Option<f64>,
    pub history: RollingSeries,
    pub trend: TrendResult,
    pub alert_active: bool,
}

impl ChannelState {
    /// Accept a finite reading: trend against the previous value, record it,
    /// extend the history and re-evaluate the highlight.
    pub fn accept(&mut self, channel: Channel, value: f64, thresholds: &ThresholdTable) {
        self.trend = compute_trend(self.last_value, Some(value), channel.precision());
        self.last_value = Some(value);
        self.history.push(value.clamp(-RENDER_CLAMP, RENDER_CLAMP));
        self.alert_active = thresholds.is_alerting(channel, value);
    }
}

#[derive(Debug, Clone)]
pub struct DashboardState {
    pub thresholds: ThresholdTable,
    pub channels: ChannelMap<ChannelState>,
    pub connection: ConnectionState,
    pub alerts: AlertSet,
    pub log: EventLog,
    pub last_updated: Option<NaiveTime>,
    pub last_seq: Option<u64>,
}

impl DashboardState {
    pub fn new(thresholds: ThresholdTable) -> Self {
        Self {
            thresholds,
            channels: ChannelMap::default(),
            connection: ConnectionState::default(),
            alerts: AlertSet::default(),
            log: EventLog::default(),
            last_updated: None,
            last_seq: None,
        }
    }

    pub fn channel(&self, channel: Channel) -> &ChannelState {
        self.channels.get(channel)
    }
}
