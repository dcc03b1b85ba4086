//! Request log: the queue of recorded requests waiting to be taken by the test.

use super::types::RecordedRequest;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::pin::pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::Notify;
use tracing::debug;

/// Unbounded FIFO of recorded requests, shared between the dispatcher and test code.
///
/// Blocking takers park on a condvar, async takers on a [`Notify`]; every
/// append wakes both. The all-time counter lives next to the queue but is
/// never touched by [`clear`](Self::clear).
#[derive(Debug, Default)]
pub struct RequestLog {
    entries: Mutex<VecDeque<RecordedRequest>>,
    available: Condvar,
    arrived: Notify,
    received: AtomicU64,
}

impl RequestLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a new inbound request and return its zero-based sequence number.
    pub fn next_sequence(&self) -> u64 {
        self.received.fetch_add(1, Ordering::SeqCst)
    }

    /// Number of requests received since the server was created.
    pub fn count(&self) -> u64 {
        self.received.load(Ordering::SeqCst)
    }

    pub fn append(&self, request: RecordedRequest) {
        {
            let mut entries = self.entries.lock();
            entries.push_back(request);
        }
        self.available.notify_all();
        self.arrived.notify_waiters();
    }

    /// Remove and return the oldest request, without waiting.
    pub fn poll_now(&self) -> Option<RecordedRequest> {
        self.entries.lock().pop_front()
    }

    /// Remove and return the oldest request, blocking the calling thread for
    /// at most `timeout` until one arrives.
    pub fn poll_within(&self, timeout: Duration) -> Option<RecordedRequest> {
        if timeout.is_zero() {
            return self.poll_now();
        }

        let deadline = Instant::now().checked_add(timeout);
        let mut entries = self.entries.lock();
        loop {
            if let Some(request) = entries.pop_front() {
                return Some(request);
            }
            match deadline {
                Some(deadline) => {
                    if self.available.wait_until(&mut entries, deadline).timed_out() {
                        return entries.pop_front();
                    }
                }
                None => self.available.wait(&mut entries),
            }
        }
    }

    /// Async flavour of [`poll_within`](Self::poll_within): suspends the task, not the thread.
    pub async fn next(&self, timeout: Duration) -> Option<RecordedRequest> {
        if timeout.is_zero() {
            return self.poll_now();
        }

        let wait = async {
            loop {
                let mut notified = pin!(self.arrived.notified());
                // Register before checking so an append in between is not missed.
                notified.as_mut().enable();
                if let Some(request) = self.poll_now() {
                    return request;
                }
                notified.await;
            }
        };

        tokio::time::timeout(timeout, wait).await.ok()
    }

    /// Drop every queued request. Returns how many were removed.
    pub fn clear(&self) -> usize {
        let removed = self.entries.lock().drain(..).count();
        debug!("Cleared {} recorded requests", removed);
        removed
    }

    /// Number of requests currently queued.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::IncomingRequest;
    use std::sync::Arc;
    use std::thread;

    fn record(log: &RequestLog, path: &str) {
        let sequence = log.next_sequence();
        log.append(RecordedRequest::new(
            IncomingRequest::new("GET", path),
            sequence,
        ));
    }

    #[test]
    fn test_poll_now_is_fifo() {
        let log = RequestLog::new();
        record(&log, "/first");
        record(&log, "/second");

        assert_eq!(log.poll_now().unwrap().path(), "/first");
        assert_eq!(log.poll_now().unwrap().path(), "/second");
        assert!(log.poll_now().is_none());
    }

    #[test]
    fn test_poll_now_on_empty_returns_immediately() {
        let log = RequestLog::new();
        let start = Instant::now();
        assert!(log.poll_now().is_none());
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[test]
    fn test_poll_within_times_out() {
        let log = RequestLog::new();
        let start = Instant::now();
        assert!(log.poll_within(Duration::from_millis(200)).is_none());
        assert!(start.elapsed() >= Duration::from_millis(200));
    }

    #[test]
    fn test_poll_within_zero_is_poll_now() {
        let log = RequestLog::new();
        assert!(log.poll_within(Duration::ZERO).is_none());
        record(&log, "/ready");
        assert_eq!(log.poll_within(Duration::ZERO).unwrap().path(), "/ready");
    }

    #[test]
    fn test_poll_within_wakes_on_append() {
        let log = Arc::new(RequestLog::new());
        let producer = {
            let log = Arc::clone(&log);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(50));
                record(&log, "/late");
            })
        };

        let start = Instant::now();
        let request = log.poll_within(Duration::from_secs(5));
        assert_eq!(request.unwrap().path(), "/late");
        assert!(start.elapsed() < Duration::from_secs(5));
        producer.join().unwrap();
    }

    #[test]
    fn test_clear_keeps_count() {
        let log = RequestLog::new();
        record(&log, "/a");
        record(&log, "/b");
        assert_eq!(log.len(), 2);

        assert_eq!(log.clear(), 2);
        assert!(log.is_empty());
        assert_eq!(log.count(), 2);

        record(&log, "/c");
        assert_eq!(log.count(), 3);
        assert_eq!(log.poll_now().unwrap().sequence_number(), 2);
    }

    #[test]
    fn test_concurrent_appends_are_neither_lost_nor_duplicated() {
        let log = Arc::new(RequestLog::new());
        let producers: Vec<_> = (0..8)
            .map(|worker| {
                let log = Arc::clone(&log);
                thread::spawn(move || {
                    for i in 0..100 {
                        record(&log, &format!("/{worker}/{i}"));
                    }
                })
            })
            .collect();

        let mut seen = Vec::new();
        while seen.len() < 800 {
            if let Some(request) = log.poll_within(Duration::from_secs(5)) {
                seen.push(request.sequence_number());
            } else {
                break;
            }
        }
        for producer in producers {
            producer.join().unwrap();
        }

        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), 800);
        assert_eq!(log.count(), 800);
        assert!(log.poll_now().is_none());
    }

    #[tokio::test]
    async fn test_next_times_out() {
        let log = RequestLog::new();
        let start = Instant::now();
        assert!(log.next(Duration::from_millis(150)).await.is_none());
        assert!(start.elapsed() >= Duration::from_millis(150));
    }

    #[tokio::test]
    async fn test_next_wakes_on_append() {
        let log = Arc::new(RequestLog::new());
        let producer = {
            let log = Arc::clone(&log);
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                record(&log, "/async");
            })
        };

        let request = log.next(Duration::from_secs(5)).await;
        assert_eq!(request.unwrap().path(), "/async");
        producer.await.unwrap();
    }
}
