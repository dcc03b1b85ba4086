//! MockWebServer - lifecycle and test-facing API.
//!
//! Binds a listener, serves every connection on its own task, and exposes
//! the dispatcher's queue and request log to test code.

use super::core::Dispatcher;
use super::handler::handle_mock_request;
use super::types::{MockServerError, QueueOperation};
use crate::config::ServerConfig;
use crate::provider::{QueueProvider, ResponseProvider, ResponseSource};
use crate::recording::RecordedRequest;
use crate::response::MockResponse;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

struct RunningServer {
    addr: SocketAddr,
    shutdown_tx: broadcast::Sender<()>,
    accept_task: JoinHandle<()>,
}

/// A mock HTTP server for testing HTTP clients.
///
/// Responses come either from a FIFO queue (see [`enqueue`](Self::enqueue))
/// or from a custom [`ResponseProvider`]; every request received is recorded
/// and can be taken back with [`take_request`](Self::take_request).
pub struct MockWebServer {
    config: ServerConfig,
    dispatcher: Arc<Dispatcher>,
    running: Mutex<Option<RunningServer>>,
}

impl MockWebServer {
    /// Server with a queue-backed response provider.
    pub fn new() -> Self {
        Self::with_config(ServerConfig::default(), ResponseSource::queue())
    }

    /// Server with a custom response provider. Queue operations on it fail.
    pub fn with_provider(provider: impl ResponseProvider + 'static) -> Self {
        Self::with_config(ServerConfig::default(), ResponseSource::custom(provider))
    }

    /// Server whose responses are computed by a closure.
    pub fn with_fn<F>(provider: F) -> Self
    where
        F: Fn(&RecordedRequest) -> anyhow::Result<Option<MockResponse>> + Send + Sync + 'static,
    {
        Self::with_config(ServerConfig::default(), ResponseSource::from_fn(provider))
    }

    pub fn with_config(config: ServerConfig, source: ResponseSource) -> Self {
        Self {
            config,
            dispatcher: Arc::new(Dispatcher::new(source)),
            running: Mutex::new(None),
        }
    }

    /// Start on the configured port (0 picks a free one). No-op when already running.
    pub async fn start(&self) -> Result<(), MockServerError> {
        self.start_on(self.config.port).await
    }

    /// Start on the given port. No-op when already running.
    pub async fn start_on(&self, port: u16) -> Result<(), MockServerError> {
        if self.running.lock().is_some() {
            return Ok(());
        }

        let bind_addr = format!("{}:{}", self.config.host, port);
        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|source| MockServerError::Bind {
                addr: bind_addr.clone(),
                source,
            })?;
        let addr = listener.local_addr().map_err(|source| MockServerError::Bind {
            addr: bind_addr,
            source,
        })?;

        let mut running = self.running.lock();
        if running.is_some() {
            debug!("Server started concurrently, releasing {}", addr);
            return Ok(());
        }

        // Subscribe before spawning so a shutdown sent right after start is not lost.
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let accept_task = tokio::spawn(accept_loop(
            listener,
            Arc::clone(&self.dispatcher),
            shutdown_tx.clone(),
            shutdown_rx,
        ));

        info!("Mock web server listening on {}", addr);
        *running = Some(RunningServer {
            addr,
            shutdown_tx,
            accept_task,
        });
        Ok(())
    }

    /// Stop accepting connections and close open ones. No-op when not running.
    pub async fn shutdown(&self) {
        let running = self.running.lock().take();
        let Some(running) = running else {
            return;
        };

        let _ = running.shutdown_tx.send(());
        if let Err(e) = running.accept_task.await {
            error!("Accept loop on {} ended abnormally: {}", running.addr, e);
        }
        info!("Mock web server on {} shut down", running.addr);
    }

    pub fn is_running(&self) -> bool {
        self.running.lock().is_some()
    }

    /// Port the server listens on, `None` before start.
    pub fn port(&self) -> Option<u16> {
        self.running.lock().as_ref().map(|r| r.addr.port())
    }

    /// `http://<host>:<port>/`
    pub fn url(&self) -> Result<String, MockServerError> {
        self.url_for("/")
    }

    /// `http://<host>:<port><path>`, adding a leading `/` to `path` if missing.
    pub fn url_for(&self, path: &str) -> Result<String, MockServerError> {
        let port = self.port().ok_or(MockServerError::NotStarted)?;
        let separator = if path.starts_with('/') { "" } else { "/" };
        Ok(format!(
            "http://{}:{}{}{}",
            self.config.host, port, separator, path
        ))
    }

    fn queue(&self, operation: QueueOperation) -> Result<&QueueProvider, MockServerError> {
        self.dispatcher
            .queue()
            .ok_or(MockServerError::CustomResponseProvider(operation))
    }

    /// Queue a response; queued responses are served in order.
    pub fn enqueue(&self, response: impl Into<MockResponse>) -> Result<(), MockServerError> {
        self.queue(QueueOperation::Enqueue)?.enqueue(response.into());
        Ok(())
    }

    /// Response served whenever the queue is empty.
    pub fn set_default_response(
        &self,
        response: impl Into<MockResponse>,
    ) -> Result<(), MockServerError> {
        self.queue(QueueOperation::SetDefault)?
            .set_default(response.into());
        Ok(())
    }

    /// Answer unscripted requests with `501 Not Implemented`.
    pub fn fail_fast(&self) -> Result<(), MockServerError> {
        self.queue(QueueOperation::SetDefault)?.fail_fast();
        Ok(())
    }

    /// Next recorded request, or `None` immediately if there is none.
    pub fn take_request(&self) -> Option<RecordedRequest> {
        self.dispatcher.requests().poll_now()
    }

    /// Next recorded request, blocking the current thread up to `timeout`.
    pub fn take_request_timeout(&self, timeout: Duration) -> Option<RecordedRequest> {
        self.dispatcher.requests().poll_within(timeout)
    }

    /// Next recorded request, waiting asynchronously up to `timeout`.
    pub async fn next_request(&self, timeout: Duration) -> Option<RecordedRequest> {
        self.dispatcher.requests().next(timeout).await
    }

    /// Requests received since the server was created. Not reset by clearing.
    pub fn request_count(&self) -> u64 {
        self.dispatcher.requests().count()
    }

    /// Drop recorded requests and queued responses. The default response stays.
    pub fn clear_requests_and_responses(&self) {
        let requests = self.dispatcher.requests().clear();
        let responses = self.dispatcher.queue().map_or(0, QueueProvider::clear);
        debug!(
            "Cleared {} recorded requests and {} queued responses",
            requests, responses
        );
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }
}

impl Default for MockWebServer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MockWebServer {
    fn drop(&mut self) {
        if let Some(running) = self.running.get_mut().take() {
            let _ = running.shutdown_tx.send(());
        }
    }
}

async fn accept_loop(
    listener: TcpListener,
    dispatcher: Arc<Dispatcher>,
    shutdown_tx: broadcast::Sender<()>,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            result = listener.accept() => {
                match result {
                    Ok((stream, addr)) => {
                        debug!("Accepted connection from {}", addr);
                        let dispatcher = Arc::clone(&dispatcher);
                        let mut conn_shutdown_rx = shutdown_tx.subscribe();
                        tokio::spawn(async move {
                            let io = TokioIo::new(stream);
                            let service = service_fn(move |req| {
                                handle_mock_request(req, Arc::clone(&dispatcher))
                            });
                            let conn = http1::Builder::new().serve_connection(io, service);
                            tokio::select! {
                                result = conn => {
                                    if let Err(e) = result {
                                        debug!("Connection error from {}: {}", addr, e);
                                    }
                                }
                                _ = conn_shutdown_rx.recv() => {
                                    debug!("Closing connection from {} on shutdown", addr);
                                }
                            }
                        });
                    }
                    Err(e) => {
                        error!("Accept error: {}", e);
                    }
                }
            }
            _ = shutdown_rx.recv() => {
                debug!("Accept loop shutting down");
                break;
            }
        }
    }
}
