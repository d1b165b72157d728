// Gateway connectivity as seen by the client

pub const NO_TRANSPORT: &str = "—";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionState {
    pub connected: bool,
    /// Transport the gateway reports, e.g. `TCP` or `SIM`. Empty when unknown.
    pub transport_label: String,
}

impl ConnectionState {
    pub fn set(&mut self, connected: bool, transport_label: impl Into<String>) {
        self.connected = connected;
        self.transport_label = transport_label.into();
    }

    pub fn status_text(&self) -> &'static str {
        if self.connected { "Connected" } else { "Disconnected" }
    }

    pub fn status_class(&self) -> &'static str {
        if self.connected { "ok" } else { "err" }
    }

    pub fn tooltip(&self) -> &'static str {
        if self.connected {
            "Gateway connected"
        } else {
            "Gateway disconnected"
        }
    }

    pub fn mode_text(&self) -> &str {
        if self.transport_label.is_empty() {
            NO_TRANSPORT
        } else {
            &self.transport_label
        }
    }

    pub fn via_text(&self) -> String {
        format!("via {}", self.mode_text())
    }
}
