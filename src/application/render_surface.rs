// Rendering capabilities the dashboard draws through
use crate::domain::channel::Channel;
use crate::domain::event_log::EventLog;
use serde::{Serialize, Serializer};

pub type Point = (f64, f64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba { r: 0, g: 0, b: 0, a: 0 };

    /// Parse `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if !matches!(digits.len(), 6 | 8) || !digits.is_ascii() {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self {
            r: byte(0)?,
            g: byte(2)?,
            b: byte(4)?,
            a: if digits.len() == 8 { byte(6)? } else { 0xff },
        })
    }

    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

impl Serialize for Rgba {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&format_args!(
            "#{:02x}{:02x}{:02x}{:02x}",
            self.r, self.g, self.b, self.a
        ))
    }
}

/// Top-to-bottom linear gradient spanning the canvas height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VerticalGradient {
    pub top: Rgba,
    pub bottom: Rgba,
}

/// A fixed-size drawing surface.
pub trait Canvas {
    fn width(&self) -> f64;
    fn height(&self) -> f64;
    fn clear(&mut self);
    fn stroke_polyline(&mut self, points: &[Point], color: Rgba, line_width: f64);
    /// Fill the closed polygon through `points`.
    fn fill_polygon(&mut self, points: &[Point], fill: VerticalGradient);
}

/// Element-level capabilities: text, classes, attributes, canvases and the log list.
pub trait RenderSurface {
    fn set_text(&mut self, target: &str, text: &str);
    fn set_class(&mut self, target: &str, class: &str, enabled: bool);
    fn set_attribute(&mut self, target: &str, name: &str, value: &str);
    fn canvas(&mut self, channel: Channel) -> &mut dyn Canvas;
    /// Redraw the log list from scratch, newest entry first.
    fn render_log(&mut self, log: &EventLog);
}

#[derive(Debug, thiserror::Error)]
pub enum AlarmError {
    #[error("alarm playback rejected: {0}")]
    Rejected(String),
    #[error("alarm device unavailable: {0}")]
    Io(#[from] std::io::Error),
}

/// Audible alert output. Playback is fire-and-forget.
pub trait AlarmSink: Send {
    fn play(&mut self) -> Result<(), AlarmError>;
}
