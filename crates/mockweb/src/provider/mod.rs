//! Response providers: decide which response a recorded request gets.
//!
//! A server resolves responses in exactly one of two ways, fixed when it is
//! created:
//! - `Queue`: scripted responses served in FIFO order, with an optional default
//! - `Custom`: a caller-supplied [`ResponseProvider`] computing each response

mod queue;

pub use queue::QueueProvider;

use crate::recording::RecordedRequest;
use crate::response::MockResponse;
use std::fmt;

/// Computes the response for a recorded request.
///
/// `Ok(None)` leaves the request unanswered. An `Err` fails that one request
/// only. Closures of the matching signature implement this trait.
pub trait ResponseProvider: Send + Sync {
    fn provide(&self, request: &RecordedRequest) -> anyhow::Result<Option<MockResponse>>;
}

impl<F> ResponseProvider for F
where
    F: Fn(&RecordedRequest) -> anyhow::Result<Option<MockResponse>> + Send + Sync,
{
    fn provide(&self, request: &RecordedRequest) -> anyhow::Result<Option<MockResponse>> {
        self(request)
    }
}

pub enum ResponseSource {
    Queue(QueueProvider),
    Custom(Box<dyn ResponseProvider>),
}

impl ResponseSource {
    pub fn queue() -> Self {
        ResponseSource::Queue(QueueProvider::new())
    }

    pub fn custom(provider: impl ResponseProvider + 'static) -> Self {
        ResponseSource::Custom(Box::new(provider))
    }

    /// Custom source backed by a closure.
    pub fn from_fn<F>(provider: F) -> Self
    where
        F: Fn(&RecordedRequest) -> anyhow::Result<Option<MockResponse>> + Send + Sync + 'static,
    {
        ResponseSource::Custom(Box::new(provider))
    }

    /// The queue, if this source is queue-backed.
    pub fn as_queue(&self) -> Option<&QueueProvider> {
        match self {
            ResponseSource::Queue(queue) => Some(queue),
            ResponseSource::Custom(_) => None,
        }
    }

    pub fn resolve(&self, request: &RecordedRequest) -> anyhow::Result<Option<MockResponse>> {
        match self {
            ResponseSource::Queue(queue) => Ok(queue.resolve()),
            ResponseSource::Custom(provider) => provider.provide(request),
        }
    }
}

impl Default for ResponseSource {
    fn default() -> Self {
        Self::queue()
    }
}

impl fmt::Debug for ResponseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseSource::Queue(queue) => f
                .debug_struct("Queue")
                .field("pending", &queue.pending())
                .finish(),
            ResponseSource::Custom(_) => f.write_str("Custom"),
        }
    }
}
