//! FIFO response queue with an optional fallback response.

use crate::response::{MockResponse, MockStatus};
use parking_lot::Mutex;
use std::collections::VecDeque;
use tracing::debug;

#[derive(Default)]
struct QueueState {
    pending: VecDeque<MockResponse>,
    default: Option<MockResponse>,
}

/// Serves enqueued responses in order, then the default response (if any) forever.
#[derive(Default)]
pub struct QueueProvider {
    state: Mutex<QueueState>,
}

impl QueueProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&self, response: MockResponse) {
        let mut state = self.state.lock();
        state.pending.push_back(response);
        debug!("Enqueued response ({} pending)", state.pending.len());
    }

    /// Response returned whenever the queue is empty. Never consumed.
    pub fn set_default(&self, response: MockResponse) {
        self.state.lock().default = Some(response);
    }

    /// Default to `501 Not Implemented` so unscripted requests fail loudly.
    pub fn fail_fast(&self) {
        self.set_default(
            MockResponse::builder()
                .status(MockStatus::NOT_IMPLEMENTED)
                .build(),
        );
    }

    /// Drop every pending response. The default response is kept.
    pub fn clear(&self) -> usize {
        let mut state = self.state.lock();
        let removed = state.pending.len();
        state.pending.clear();
        removed
    }

    pub fn pending(&self) -> usize {
        self.state.lock().pending.len()
    }

    pub fn resolve(&self) -> Option<MockResponse> {
        let mut state = self.state.lock();
        match state.pending.pop_front() {
            Some(response) => Some(response),
            None => state.default.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_status(code: u16) -> MockResponse {
        MockResponse::builder().status_code(code).build()
    }

    #[test]
    fn test_resolve_in_enqueue_order() {
        let queue = QueueProvider::new();
        queue.enqueue(with_status(200));
        queue.enqueue(with_status(201));
        queue.enqueue(with_status(202));

        assert_eq!(queue.resolve().unwrap().status().code(), 200);
        assert_eq!(queue.resolve().unwrap().status().code(), 201);
        assert_eq!(queue.resolve().unwrap().status().code(), 202);
        assert!(queue.resolve().is_none());
    }

    #[test]
    fn test_default_used_only_when_queue_empty() {
        let queue = QueueProvider::new();
        queue.set_default(with_status(404));
        queue.enqueue(with_status(200));

        assert_eq!(queue.resolve().unwrap().status().code(), 200);
        for _ in 0..5 {
            assert_eq!(queue.resolve().unwrap().status().code(), 404);
        }

        queue.enqueue(with_status(201));
        assert_eq!(queue.resolve().unwrap().status().code(), 201);
        assert_eq!(queue.resolve().unwrap().status().code(), 404);
    }

    #[test]
    fn test_clear_keeps_default() {
        let queue = QueueProvider::new();
        queue.fail_fast();
        queue.enqueue(with_status(200));
        queue.enqueue(with_status(204));

        assert_eq!(queue.clear(), 2);
        assert_eq!(queue.pending(), 0);
        assert_eq!(queue.resolve().unwrap().status(), &MockStatus::NOT_IMPLEMENTED);
    }

    #[test]
    fn test_fail_fast_response_is_empty() {
        let queue = QueueProvider::new();
        queue.fail_fast();

        let response = queue.resolve().unwrap();
        assert_eq!(response.status().code(), 501);
        assert!(response.body().is_empty());
        assert_eq!(response.header("Content-Length"), Some("0"));
    }
}
