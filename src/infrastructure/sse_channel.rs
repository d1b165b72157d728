// Server-Sent Events push channel over reqwest
use crate::application::push_channel::{PushChannel, PushEvent};
use bytes::{Buf, BytesMut};
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::header::ACCEPT;

/// Longest unterminated line the decoder will buffer.
pub const MAX_LINE_BYTES: usize = 64 * 1024;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SseError {
    #[error("event stream line exceeds {limit} bytes without a terminator")]
    LineTooLong { limit: usize },
}

/// Incremental `text/event-stream` framer. Chunk boundaries may fall anywhere.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: BytesMut,
    data: String,
    event_type: String,
}

impl SseDecoder {
    /// Feed raw bytes, returning the data of every `message` event completed by them.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<String>, SseError> {
        self.buf.extend_from_slice(chunk);
        let mut dispatched = Vec::new();
        while let Some(line) = self.next_line() {
            if let Some(data) = self.process_line(&line) {
                dispatched.push(data);
            }
        }
        if self.buf.len() > MAX_LINE_BYTES {
            self.buf.clear();
            return Err(SseError::LineTooLong { limit: MAX_LINE_BYTES });
        }
        Ok(dispatched)
    }

    fn next_line(&mut self) -> Option<String> {
        let pos = self.buf.iter().position(|b| *b == b'\n' || *b == b'\r')?;
        let terminator = if self.buf[pos] == b'\r' {
            match self.buf.get(pos + 1) {
                Some(b'\n') => 2,
                Some(_) => 1,
                // A trailing CR may be the first half of CRLF.
                None => return None,
            }
        } else {
            1
        };
        let line = self.buf.split_to(pos);
        self.buf.advance(terminator);
        Some(String::from_utf8_lossy(&line).into_owned())
    }

    fn process_line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "data" => {
                self.data.push_str(value);
                self.data.push('\n');
            }
            "event" => self.event_type = value.to_string(),
            // id, retry and unknown fields carry nothing the dashboard uses
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<String> {
        let event_type = std::mem::take(&mut self.event_type);
        let mut data = std::mem::take(&mut self.data);
        if data.is_empty() {
            return None;
        }
        data.pop();
        if event_type.is_empty() || event_type == "message" {
            Some(data)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct SsePushChannel {
    client: reqwest::Client,
    url: String,
}

impl SsePushChannel {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: format!("{}/events", base_url.trim_end_matches('/')),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl PushChannel for SsePushChannel {
    fn subscribe(&self) -> BoxStream<'static, PushEvent> {
        let client = self.client.clone();
        let url = self.url.clone();

        async_stream::stream! {
            tracing::info!("Subscribing to {}", url);
            let response = match client.get(&url).header(ACCEPT, "text/event-stream").send().await {
                Ok(response) => response,
                Err(e) => {
                    yield PushEvent::Error(format!("Failed to connect to {}: {}", url, e));
                    return;
                }
            };

            if !response.status().is_success() {
                yield PushEvent::Error(format!("{} answered with status {}", url, response.status()));
                return;
            }

            yield PushEvent::Open;

            let mut decoder = SseDecoder::default();
            let mut body = response.bytes_stream();
            while let Some(chunk) = body.next().await {
                match chunk {
                    Ok(bytes) => match decoder.feed(&bytes) {
                        Ok(messages) => {
                            for data in messages {
                                yield PushEvent::Message(data);
                            }
                        }
                        Err(e) => {
                            yield PushEvent::Error(e.to_string());
                            return;
                        }
                    },
                    Err(e) => {
                        yield PushEvent::Error(format!("Event stream read failed: {}", e));
                        return;
                    }
                }
            }

            yield PushEvent::Error("Event stream closed by server".to_string());
        }
        .boxed()
    }
}
