//! Error types for the mock server.

use crate::config::ScriptError;
use std::fmt;
use thiserror::Error;

/// Queue-only operations, named in [`MockServerError::CustomResponseProvider`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueOperation {
    Enqueue,
    SetDefault,
}

impl fmt::Display for QueueOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueOperation::Enqueue => f.write_str("enqueue response"),
            QueueOperation::SetDefault => f.write_str("set default response"),
        }
    }
}

/// Configuration and lifecycle errors, reported to the caller immediately.
#[derive(Debug, Error)]
pub enum MockServerError {
    #[error("Cannot {0} when using a custom response provider")]
    CustomResponseProvider(QueueOperation),
    #[error("Server not started")]
    NotStarted,
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Script(#[from] ScriptError),
}

/// Failure resolving the response for one request.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Response provider failed: {0:#}")]
    Provider(anyhow::Error),
    #[error("Response provider panicked: {0}")]
    ProviderPanicked(String),
}

/// Failure turning one request into a written response.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Failed to read request body: {0}")]
    Body(#[source] hyper::Error),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error("Status code {0} cannot be sent over HTTP/1.1")]
    InvalidStatus(u16),
    #[error("Failed to build response: {0}")]
    Build(#[from] hyper::http::Error),
}
