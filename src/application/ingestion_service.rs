// Ingestion controller - consumes push events and drives the rendered dashboard
use crate::application::push_channel::{PushChannel, PushEvent};
use crate::application::render_surface::{AlarmSink, RenderSurface, Rgba};
use crate::application::sparkline;
use crate::domain::alert::{AlertSet, BANNER_TITLE, EMERGENCY_CTA};
use crate::domain::channel::Channel;
use crate::domain::dashboard::DashboardState;
use crate::domain::event_log::Severity;
use crate::domain::message::TelemetryMessage;
use crate::domain::thresholds::ThresholdTable;
use chrono::NaiveTime;
use futures::stream::BoxStream;
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;

const VALUE_ALERT_CLASS: &str = "value-alert";
const TREND_CLASSES: [&str; 3] = ["up", "down", "equal"];
const FALLBACK_SPARK_COLOR: Rgba = Rgba { r: 0x4c, g: 0xc9, b: 0xf0, a: 0xff };

/// User gestures routed into the same loop as push events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCommand {
    ClearLog,
    TestAlarm,
    /// Drop the current subscription and open a fresh one.
    Resubscribe,
}

pub struct IngestionController<S> {
    state: DashboardState,
    surface: S,
    alarm: Box<dyn AlarmSink>,
}

impl<S: RenderSurface> IngestionController<S> {
    pub fn new(thresholds: ThresholdTable, surface: S, alarm: Box<dyn AlarmSink>) -> Self {
        let mut controller = Self {
            state: DashboardState::new(thresholds),
            surface,
            alarm,
        };
        controller.render_initial();
        controller
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn handle_event(&mut self, event: PushEvent) {
        match event {
            PushEvent::Open => self.on_open(),
            PushEvent::Message(text) => self.on_message(&text),
            PushEvent::Error(reason) => self.on_error(&reason),
        }
    }

    pub fn handle_command(&mut self, command: UserCommand) {
        match command {
            UserCommand::ClearLog => {
                self.state.log.clear();
                self.surface.render_log(&self.state.log);
            }
            UserCommand::TestAlarm => self.sound_alarm(),
            UserCommand::Resubscribe => {
                self.log("Resubscribing to push channel", Severity::Info);
            }
        }
    }

    /// Consume push events and user commands until the command channel closes.
    /// `publish` sees the surface after every handled event or command.
    pub async fn run(
        mut self,
        channel: Arc<dyn PushChannel>,
        mut commands: mpsc::Receiver<UserCommand>,
        mut publish: impl FnMut(&S) + Send,
    ) -> Self {
        let mut subscription = Some(channel.subscribe());
        publish(&self.surface);

        loop {
            // Commands before push events; a busy stream must not starve gestures.
            tokio::select! {
                biased;
                command = commands.recv() => match command {
                    Some(command) => {
                        if command == UserCommand::Resubscribe {
                            subscription = Some(channel.subscribe());
                        }
                        self.handle_command(command);
                    }
                    None => break,
                },
                event = next_event(&mut subscription) => match event {
                    Some(event) => self.handle_event(event),
                    None => {
                        tracing::info!("Push channel subscription ended");
                        subscription = None;
                        continue;
                    }
                },
            }
            publish(&self.surface);
        }

        tracing::info!("Command channel closed; ingestion stopped");
        self
    }

    fn on_open(&mut self) {
        tracing::info!("Push channel open");
        self.state.connection.set(true, "");
        self.render_connection();
        self.log("Push channel connected", Severity::Info);
    }

    fn on_error(&mut self, reason: &str) {
        tracing::warn!("Push channel error: {}", reason);
        self.state.connection.set(false, "");
        self.render_connection();
        self.log("Push channel error / disconnected", Severity::Warn);
    }

    fn on_message(&mut self, text: &str) {
        let message = match TelemetryMessage::parse(text) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!("Discarding push message: {}", e);
                self.log("Malformed data received", Severity::Warn);
                return;
            }
        };

        for channel in Channel::ALL {
            match message.reading(channel) {
                Some(value) if value.is_finite() => {
                    self.state
                        .channels
                        .get_mut(channel)
                        .accept(channel, value, &self.state.thresholds);
                    self.render_channel(channel);
                }
                _ => {}
            }
        }

        if let Some(connected) = message.is_connected() {
            let via = message.via.clone().unwrap_or_default();
            self.state.connection.set(connected, via);
            self.render_connection();
        }

        self.state.alerts = AlertSet::from_codes(&message.alerts);
        self.render_banner();

        if message.seq.is_some() {
            self.state.last_seq = message.seq;
        }
        self.state.last_updated = Some(now());
        self.render_freshness();

        if !self.state.alerts.is_empty() {
            if let Some(summary) = &message.alert_summary {
                tracing::debug!("Gateway alert summary: {}", summary);
            }
            let line = self.state.alerts.log_summary();
            self.log(line, Severity::Err);
        }
    }

    fn log(&mut self, text: impl Into<String>, severity: Severity) {
        self.state.log.append(now(), text, severity);
        self.surface.render_log(&self.state.log);
    }

    fn sound_alarm(&mut self) {
        if let Err(e) = self.alarm.play() {
            tracing::debug!("Alarm playback failed: {}", e);
        }
    }

    fn render_initial(&mut self) {
        for channel in Channel::ALL {
            self.surface.set_text(channel.trend_target(), "—");
            self.surface.canvas(channel).clear();
        }
        self.render_connection();
        self.render_banner();
        self.surface.render_log(&self.state.log);
    }

    fn render_channel(&mut self, channel: Channel) {
        let state = self.state.channels.get_mut(channel);
        let Some(value) = state.last_value else {
            return;
        };

        let value_target = channel.value_target();
        self.surface
            .set_text(value_target, &channel.format_value(value));
        self.surface
            .set_class(value_target, VALUE_ALERT_CLASS, state.alert_active);

        let trend_target = channel.trend_target();
        for class in TREND_CLASSES {
            self.surface.set_class(trend_target, class, false);
        }
        if let Some(class) = state.trend.class() {
            self.surface.set_class(trend_target, class, true);
        }
        self.surface.set_text(trend_target, &state.trend.label());

        let color = Rgba::from_hex(channel.color()).unwrap_or(FALLBACK_SPARK_COLOR);
        sparkline::render(state.history.as_slice(), color, self.surface.canvas(channel));
    }

    fn render_connection(&mut self) {
        let conn = &self.state.connection;
        self.surface.set_class("conn-dot", "ok", conn.connected);
        self.surface.set_class("conn-dot", "err", !conn.connected);
        self.surface.set_text("conn-text", conn.status_text());
        self.surface.set_text("via", &conn.via_text());
        self.surface.set_text("mode", conn.mode_text());
        self.surface
            .set_attribute("conn-pill", "title", conn.tooltip());
    }

    fn render_freshness(&mut self) {
        if let Some(updated) = self.state.last_updated {
            self.surface
                .set_text("last-updated", &updated.format("%H:%M:%S").to_string());
        }
        if let Some(seq) = self.state.last_seq {
            self.surface.set_text("seq", &seq.to_string());
        }
    }

    fn render_banner(&mut self) {
        if self.state.alerts.is_empty() {
            self.surface.set_class("banner", "hidden", true);
            self.surface.set_text("emergency-link", EMERGENCY_CTA);
            return;
        }

        self.surface.set_class("banner", "hidden", false);
        self.surface.set_text("banner-title", BANNER_TITLE);
        self.surface
            .set_text("banner-text", &self.state.alerts.banner_text());
        self.surface
            .set_text("emergency-link", &self.state.alerts.call_to_action());
        self.sound_alarm();
    }
}

async fn next_event(subscription: &mut Option<BoxStream<'static, PushEvent>>) -> Option<PushEvent> {
    match subscription {
        Some(stream) => stream.next().await,
        None => futures::future::pending().await,
    }
}

fn now() -> NaiveTime {
    chrono::Local::now().time()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::render_surface::AlarmError;
    use crate::domain::trend::TrendDirection;
    use crate::infrastructure::memory_surface::MemorySurface;
    use futures::stream;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio_stream::wrappers::ReceiverStream;

    #[derive(Clone, Default)]
    struct CountingAlarm {
        plays: Arc<AtomicUsize>,
        reject: bool,
    }

    impl AlarmSink for CountingAlarm {
        fn play(&mut self) -> Result<(), AlarmError> {
            self.plays.fetch_add(1, Ordering::SeqCst);
            if self.reject {
                return Err(AlarmError::Rejected("no user gesture yet".to_string()));
            }
            Ok(())
        }
    }

    struct QueueChannel {
        subscriptions: Mutex<VecDeque<BoxStream<'static, PushEvent>>>,
    }

    impl QueueChannel {
        fn new(subscriptions: Vec<BoxStream<'static, PushEvent>>) -> Arc<Self> {
            Arc::new(Self {
                subscriptions: Mutex::new(subscriptions.into()),
            })
        }
    }

    impl PushChannel for QueueChannel {
        fn subscribe(&self) -> BoxStream<'static, PushEvent> {
            self.subscriptions
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| stream::empty().boxed())
        }
    }

    fn controller() -> (IngestionController<MemorySurface>, CountingAlarm) {
        let alarm = CountingAlarm::default();
        let controller = IngestionController::new(
            ThresholdTable::default(),
            MemorySurface::new(160.0, 40.0),
            Box::new(alarm.clone()),
        );
        (controller, alarm)
    }

    fn message(json: &str) -> PushEvent {
        PushEvent::Message(json.to_string())
    }

    fn valid(i: usize) -> PushEvent {
        message(&format!(
            r#"{{ "flow_lpm": {}, "humidity_pct": 40.0, "temperature_c": 21.5,
                "pressure_kpa": 101.3, "connection": "CONNECTED", "via": "TCP", "alerts": [] }}"#,
            2.0 + i as f64
        ))
    }

    fn history_lengths(c: &IngestionController<MemorySurface>) -> Vec<usize> {
        c.state().channels.iter().map(|(_, s)| s.history.len()).collect()
    }

    #[test]
    fn test_initial_render_is_disconnected_with_hidden_banner() {
        let (c, _) = controller();
        let surface = c.surface();
        assert_eq!(surface.text("conn-text"), Some("Disconnected"));
        assert!(surface.has_class("conn-dot", "err"));
        assert!(surface.has_class("banner", "hidden"));
        assert_eq!(surface.text("emergency-link"), Some("Call emergency"));
        assert_eq!(surface.text("flow-trend"), Some("—"));
    }

    #[test]
    fn test_alert_list_drives_banner() {
        let (mut c, alarm) = controller();
        c.handle_event(message(r#"{ "alerts": ["HIGH_FLOW", "HIGH_TEMP"] }"#));

        let surface = c.surface();
        assert!(!surface.has_class("banner", "hidden"));
        assert_eq!(surface.text("banner-title"), Some(BANNER_TITLE));
        assert_eq!(surface.text("banner-text"), Some("High flow, High temperature"));
        assert_eq!(
            surface.text("emergency-link"),
            Some("Call emergency — High flow + High temperature")
        );
        assert_eq!(alarm.plays.load(Ordering::SeqCst), 1);

        let newest = &c.state().log.entries().next().unwrap();
        assert_eq!(newest.severity, Severity::Err);
        assert_eq!(newest.text, "Alerts: HIGH_FLOW, HIGH_TEMP");

        c.handle_event(message(r#"{ "alerts": [] }"#));
        assert!(c.surface().has_class("banner", "hidden"));
        assert_eq!(c.surface().text("emergency-link"), Some("Call emergency"));
        assert_eq!(c.state().log.len(), 1);
    }

    #[test]
    fn test_banner_ignores_threshold_state() {
        let (mut c, alarm) = controller();
        c.handle_event(message(r#"{ "flow_lpm": 50, "alerts": [] }"#));

        assert!(c.surface().has_class("flow", VALUE_ALERT_CLASS));
        assert!(c.surface().has_class("banner", "hidden"));
        assert_eq!(alarm.plays.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_flow_highlight_follows_threshold() {
        let (mut c, _) = controller();
        c.handle_event(message(r#"{ "flow_lpm": 50 }"#));
        assert!(c.state().channel(Channel::Flow).alert_active);
        assert!(c.surface().has_class("flow", VALUE_ALERT_CLASS));
        assert_eq!(c.surface().text("flow"), Some("50.00"));

        c.handle_event(message(r#"{ "flow_lpm": 10 }"#));
        assert!(!c.state().channel(Channel::Flow).alert_active);
        assert!(!c.surface().has_class("flow", VALUE_ALERT_CLASS));
        assert_eq!(c.surface().text("flow-trend"), Some("down 40.00"));
        assert!(c.surface().has_class("flow-trend", "down"));
    }

    #[test]
    fn test_malformed_message_mutates_nothing_but_the_log() {
        let (mut c, _) = controller();
        for i in 0..5 {
            c.handle_event(valid(i));
        }
        let before = history_lengths(&c);
        let log_before = c.state().log.len();
        let flow_before = c.surface().text("flow").map(str::to_string);

        c.handle_event(message(r#"{ "flow_lpm": "NaN-ish", "#));

        assert_eq!(history_lengths(&c), before);
        assert_eq!(before, vec![5, 5, 5, 5]);
        assert_eq!(c.state().log.len(), log_before + 1);
        let newest = c.state().log.entries().next().unwrap();
        assert_eq!(newest.severity, Severity::Warn);
        assert_eq!(newest.text, "Malformed data received");
        assert_eq!(c.surface().text("flow").map(str::to_string), flow_before);
    }

    #[test]
    fn test_missing_fields_skip_only_their_channel() {
        let (mut c, _) = controller();
        c.handle_event(message(r#"{ "flow_lpm": 3.0, "humidity_pct": 41.0 }"#));
        c.handle_event(message(r#"{ "humidity_pct": 42.5, "pressure_kpa": null }"#));

        assert_eq!(history_lengths(&c), vec![1, 2, 0, 0]);
        assert_eq!(c.surface().text("humidity"), Some("42.5"));
        assert_eq!(c.surface().text("hum-trend"), Some("up 1.5"));
        assert_eq!(c.surface().text("flow"), Some("3.00"));
        assert_eq!(c.surface().text("pressure"), None);
    }

    #[test]
    fn test_sparkline_needs_two_points() {
        let (mut c, _) = controller();
        c.handle_event(message(r#"{ "temperature_c": 20.0 }"#));
        assert!(!c.surface().sparkline(Channel::Temperature).unwrap().has_line());

        c.handle_event(message(r#"{ "temperature_c": 20.0 }"#));
        assert!(c.surface().sparkline(Channel::Temperature).unwrap().has_line());
        assert_eq!(
            c.state().channel(Channel::Temperature).trend.direction,
            TrendDirection::Steady
        );
    }

    #[test]
    fn test_transport_error_then_open() {
        let (mut c, _) = controller();
        c.handle_event(PushEvent::Error("connection refused".to_string()));
        assert!(!c.state().connection.connected);

        c.handle_event(PushEvent::Open);
        assert!(c.state().connection.connected);
        assert_eq!(c.surface().text("conn-text"), Some("Connected"));

        let entries: Vec<(&str, Severity)> = c
            .state()
            .log
            .entries()
            .map(|e| (e.text.as_str(), e.severity))
            .collect();
        assert_eq!(
            entries,
            vec![
                ("Push channel connected", Severity::Info),
                ("Push channel error / disconnected", Severity::Warn),
            ]
        );
    }

    #[test]
    fn test_payload_connection_field_wins() {
        let (mut c, _) = controller();
        c.handle_event(PushEvent::Open);
        c.handle_event(message(r#"{ "connection": "DISCONNECTED", "via": "TCP" }"#));
        assert!(!c.state().connection.connected);
        assert_eq!(c.surface().text("via"), Some("via TCP"));

        c.handle_event(message(r#"{ "connection": "CONNECTED", "via": "SIM", "seq": 9 }"#));
        assert!(c.state().connection.connected);
        assert_eq!(c.surface().text("mode"), Some("SIM"));
        assert_eq!(c.state().last_seq, Some(9));
        assert_eq!(c.surface().text("seq"), Some("9"));
        assert_eq!(c.surface().attribute("conn-pill", "title"), Some("Gateway connected"));

        c.handle_event(message(r#"{ "humidity_pct": 50 }"#));
        assert!(c.state().connection.connected);
        assert!(c.state().last_updated.is_some());
        assert!(c.surface().text("last-updated").is_some());
        assert_eq!(c.surface().text("seq"), Some("9"));

        let snapshot = serde_json::to_value(c.surface()).unwrap();
        assert_eq!(snapshot["texts"]["seq"], "9");
    }

    #[test]
    fn test_array_payload_is_malformed() {
        let (mut c, alarm) = controller();
        c.handle_event(message("[50, 90, 60, 130]"));

        assert_eq!(history_lengths(&c), vec![0, 0, 0, 0]);
        assert!(!c.surface().has_class("flow", VALUE_ALERT_CLASS));
        assert_eq!(alarm.plays.load(Ordering::SeqCst), 0);
        let newest = c.state().log.entries().next().unwrap();
        assert_eq!(newest.severity, Severity::Warn);
        assert_eq!(newest.text, "Malformed data received");
    }

    #[test]
    fn test_rejected_alarm_is_swallowed() {
        let alarm = CountingAlarm {
            reject: true,
            ..CountingAlarm::default()
        };
        let mut c = IngestionController::new(
            ThresholdTable::default(),
            MemorySurface::new(160.0, 40.0),
            Box::new(alarm.clone()),
        );
        c.handle_event(message(r#"{ "alerts": ["LOW_FLOW"] }"#));
        c.handle_command(UserCommand::TestAlarm);

        assert_eq!(alarm.plays.load(Ordering::SeqCst), 2);
        assert!(!c.surface().has_class("banner", "hidden"));
    }

    #[test]
    fn test_user_commands() {
        let (mut c, alarm) = controller();
        c.handle_event(PushEvent::Open);
        c.handle_event(PushEvent::Error("reset".to_string()));

        c.handle_command(UserCommand::TestAlarm);
        assert_eq!(alarm.plays.load(Ordering::SeqCst), 1);
        assert_eq!(c.state().log.len(), 2);

        c.handle_command(UserCommand::ClearLog);
        assert!(c.state().log.is_empty());
        assert!(c.surface().log_entries().is_empty());
    }

    #[tokio::test]
    async fn test_run_processes_events_in_order() {
        let events = stream::iter(vec![
            PushEvent::Open,
            valid(0),
            valid(1),
            message("garbage"),
            PushEvent::Error("eof".to_string()),
        ])
        .boxed();
        let channel = QueueChannel::new(vec![events]);
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let mut cmd_tx = Some(cmd_tx);

        let (c, _) = controller();
        let mut published = 0;
        let c = c
            .run(channel, cmd_rx, |_| {
                published += 1;
                // Initial render plus one per event; then let the loop stop.
                if published == 6 {
                    cmd_tx.take();
                }
            })
            .await;

        assert_eq!(published, 6);
        assert_eq!(history_lengths(&c), vec![2, 2, 2, 2]);
        assert!(!c.state().connection.connected);
        let texts: Vec<&str> = c.state().log.entries().map(|e| e.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "Push channel error / disconnected",
                "Malformed data received",
                "Push channel connected",
            ]
        );
    }

    #[tokio::test]
    async fn test_gestures_are_not_starved_by_a_busy_stream() {
        let endless = stream::iter(0..).map(valid).boxed();
        let channel = QueueChannel::new(vec![endless]);
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        cmd_tx.send(UserCommand::ClearLog).await.unwrap();
        let mut cmd_tx = Some(cmd_tx);

        let (c, alarm) = controller();
        let mut published = 0;
        let c = c
            .run(channel, cmd_rx, |_| {
                published += 1;
                if published == 3 {
                    if let Some(tx) = &cmd_tx {
                        tx.try_send(UserCommand::TestAlarm).unwrap();
                    }
                } else if published == 5 {
                    cmd_tx.take();
                }
            })
            .await;

        assert_eq!(alarm.plays.load(Ordering::SeqCst), 1);
        assert_eq!(history_lengths(&c), vec![2, 2, 2, 2]);
    }

    #[tokio::test]
    async fn test_resubscribe_replaces_subscription() {
        let (live_tx, live_rx) = mpsc::channel(8);
        live_tx.send(PushEvent::Open).await.unwrap();
        live_tx.send(valid(10)).await.unwrap();

        let first = ReceiverStream::new(live_rx).boxed();
        let second = stream::iter(vec![PushEvent::Open, valid(12)]).boxed();
        let channel = QueueChannel::new(vec![first, second]);

        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let mut cmd_tx = Some(cmd_tx);
        let mut resubscribed = false;

        let (c, _) = controller();
        let mut last_flow = None;
        let c = c
            .run(channel, cmd_rx, |s| {
                last_flow = s.text("flow").map(str::to_string);
                match last_flow.as_deref() {
                    Some("12.00") if !resubscribed => {
                        resubscribed = true;
                        if let Some(tx) = &cmd_tx {
                            tx.try_send(UserCommand::Resubscribe).unwrap();
                        }
                    }
                    Some("14.00") => {
                        cmd_tx.take();
                    }
                    _ => {}
                }
            })
            .await;

        assert!(live_tx.is_closed());
        assert_eq!(last_flow.as_deref(), Some("14.00"));
        assert_eq!(c.state().channel(Channel::Flow).history.len(), 2);
        assert_eq!(c.surface().text("flow-trend"), Some("up 2.00"));
        let texts: Vec<&str> = c.state().log.entries().map(|e| e.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "Push channel connected",
                "Resubscribing to push channel",
                "Push channel connected",
            ]
        );
    }
}
