// Push channel abstraction - one-way server-to-client event stream
use futures::stream::BoxStream;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushEvent {
    /// The transport opened.
    Open,
    /// One discrete text frame.
    Message(String),
    /// The transport failed or closed.
    Error(String),
}

pub trait PushChannel: Send + Sync {
    /// Start a fresh subscription. The returned stream is lazy and cannot be
    /// restarted; dropping it cancels the subscription.
    fn subscribe(&self) -> BoxStream<'static, PushEvent>;
}
