// In-memory rendering surface; its snapshot is what the control API serves
use crate::application::render_surface::{Canvas, Point, RenderSurface, Rgba, VerticalGradient};
use crate::domain::channel::Channel;
use crate::domain::event_log::{EventLog, LogEntry};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Clear,
    Stroke {
        points: Vec<Point>,
        color: Rgba,
        line_width: f64,
    },
    Fill {
        points: Vec<Point>,
        fill: VerticalGradient,
    },
}

/// Canvas that keeps the display list of its latest redraw.
#[derive(Debug, Clone, Serialize)]
pub struct RecordingCanvas {
    width: f64,
    height: f64,
    commands: Vec<DrawCommand>,
}

impl RecordingCanvas {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn has_line(&self) -> bool {
        self.commands
            .iter()
            .any(|c| matches!(c, DrawCommand::Stroke { .. }))
    }
}

impl Canvas for RecordingCanvas {
    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear);
    }

    fn stroke_polyline(&mut self, points: &[Point], color: Rgba, line_width: f64) {
        self.commands.push(DrawCommand::Stroke {
            points: points.to_vec(),
            color,
            line_width,
        });
    }

    fn fill_polygon(&mut self, points: &[Point], fill: VerticalGradient) {
        self.commands.push(DrawCommand::Fill {
            points: points.to_vec(),
            fill,
        });
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MemorySurface {
    texts: BTreeMap<String, String>,
    classes: BTreeMap<String, BTreeSet<String>>,
    attributes: BTreeMap<String, BTreeMap<String, String>>,
    canvases: BTreeMap<Channel, RecordingCanvas>,
    log: Vec<LogEntry>,
}

impl MemorySurface {
    pub fn new(spark_width: f64, spark_height: f64) -> Self {
        let canvases = Channel::ALL
            .into_iter()
            .map(|c| (c, RecordingCanvas::new(spark_width, spark_height)))
            .collect();
        Self {
            texts: BTreeMap::new(),
            classes: BTreeMap::new(),
            attributes: BTreeMap::new(),
            canvases,
            log: Vec::new(),
        }
    }

    pub fn text(&self, target: &str) -> Option<&str> {
        self.texts.get(target).map(String::as_str)
    }

    pub fn has_class(&self, target: &str, class: &str) -> bool {
        self.classes
            .get(target)
            .is_some_and(|set| set.contains(class))
    }

    pub fn attribute(&self, target: &str, name: &str) -> Option<&str> {
        self.attributes
            .get(target)
            .and_then(|attrs| attrs.get(name))
            .map(String::as_str)
    }

    pub fn sparkline(&self, channel: Channel) -> Option<&RecordingCanvas> {
        self.canvases.get(&channel)
    }

    pub fn log_entries(&self) -> &[LogEntry] {
        &self.log
    }
}

impl RenderSurface for MemorySurface {
    fn set_text(&mut self, target: &str, text: &str) {
        self.texts.insert(target.to_string(), text.to_string());
    }

    fn set_class(&mut self, target: &str, class: &str, enabled: bool) {
        let set = self.classes.entry(target.to_string()).or_default();
        if enabled {
            set.insert(class.to_string());
        } else {
            set.remove(class);
        }
    }

    fn set_attribute(&mut self, target: &str, name: &str, value: &str) {
        self.attributes
            .entry(target.to_string())
            .or_default()
            .insert(name.to_string(), value.to_string());
    }

    fn canvas(&mut self, channel: Channel) -> &mut dyn Canvas {
        let (w, h) = self
            .canvases
            .values()
            .next()
            .map(|c| (c.width, c.height))
            .unwrap_or((0.0, 0.0));
        self.canvases
            .entry(channel)
            .or_insert_with(|| RecordingCanvas::new(w, h))
    }

    fn render_log(&mut self, log: &EventLog) {
        self.log = log.entries().cloned().collect();
    }
}
