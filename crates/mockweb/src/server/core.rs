//! The dispatcher: records each request and decides what, if anything, to send back.

use super::types::DispatchError;
use crate::provider::{QueueProvider, ResponseSource};
use crate::recording::{IncomingRequest, RecordedRequest, RequestLog};
use crate::response::MockResponse;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, warn};

/// Per-server dispatch state, shared by every connection.
#[derive(Debug, Default)]
pub struct Dispatcher {
    source: ResponseSource,
    requests: RequestLog,
}

impl Dispatcher {
    pub fn new(source: ResponseSource) -> Self {
        Self {
            source,
            requests: RequestLog::new(),
        }
    }

    /// Handle one request.
    ///
    /// The request is always recorded first. `deliver` is called once if a
    /// response was resolved, after its body delay, and never otherwise.
    pub async fn handle<D>(&self, incoming: IncomingRequest, deliver: D) -> Result<(), DispatchError>
    where
        D: FnOnce(MockResponse) + Send,
    {
        let sequence = self.requests.next_sequence();
        let recorded = RecordedRequest::new(incoming, sequence);
        debug!(
            "Recorded request #{}: {} {}",
            sequence,
            recorded.method(),
            recorded.path()
        );
        self.requests.append(recorded.clone());

        let Some(response) = self.resolve(&recorded)? else {
            debug!("No response for request #{}, leaving it unanswered", sequence);
            return Ok(());
        };

        if let Some(delay) = response.body_delay() {
            debug!("Delaying response to request #{} by {:?}", sequence, delay);
            tokio::time::sleep(delay).await;
        }

        debug!("Delivering {} for request #{}", response.status(), sequence);
        deliver(response);
        Ok(())
    }

    fn resolve(&self, request: &RecordedRequest) -> Result<Option<MockResponse>, DispatchError> {
        match catch_unwind(AssertUnwindSafe(|| self.source.resolve(request))) {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => {
                warn!(
                    "Response provider failed for request #{}: {:#}",
                    request.sequence_number(),
                    e
                );
                Err(DispatchError::Provider(e))
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                warn!(
                    "Response provider panicked for request #{}: {}",
                    request.sequence_number(),
                    message
                );
                Err(DispatchError::ProviderPanicked(message))
            }
        }
    }

    pub fn queue(&self) -> Option<&QueueProvider> {
        self.source.as_queue()
    }

    pub fn requests(&self) -> &RequestLog {
        &self.requests
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
