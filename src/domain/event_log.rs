// Capped, newest-first event log
use chrono::NaiveTime;
use serde::Serialize;
use std::collections::VecDeque;

pub const LOG_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warn,
    Err,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    #[serde(serialize_with = "serialize_time_of_day")]
    pub timestamp: NaiveTime,
    pub text: String,
    pub severity: Severity,
}

fn serialize_time_of_day<S: serde::Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(&t.format("%H:%M:%S"))
}

#[derive(Debug, Clone)]
pub struct EventLog {
    max: usize,
    entries: VecDeque<LogEntry>,
}

impl EventLog {
    pub fn new(max: usize) -> Self {
        Self {
            max,
            entries: VecDeque::with_capacity(max + 1),
        }
    }

    /// Insert at the head and drop from the tail beyond capacity.
    pub fn append(&mut self, timestamp: NaiveTime, text: impl Into<String>, severity: Severity) {
        self.entries.push_front(LogEntry {
            timestamp,
            text: text.into(),
            severity,
        });
        self.entries.truncate(self.max);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Newest first.
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(LOG_CAPACITY)
    }
}
