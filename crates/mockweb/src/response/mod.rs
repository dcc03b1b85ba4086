//! Mock responses: what the server sends back for a request.

mod builder;
mod status;

pub use builder::MockResponseBuilder;
pub use status::MockStatus;

use bytes::Bytes;
use std::time::Duration;
use thiserror::Error;

/// Invalid input given to [`MockResponseBuilder`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResponseError {
    #[error("delay must be positive")]
    NonPositiveDelay,
}

/// A scripted response. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockResponse {
    status: MockStatus,
    headers: Vec<(String, String)>,
    body: Bytes,
    body_delay: Option<Duration>,
}

impl MockResponse {
    pub fn builder() -> MockResponseBuilder {
        MockResponseBuilder::new()
    }

    pub fn status(&self) -> &MockStatus {
        &self.status
    }

    /// Headers in the order they will be written, repeats included.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First value of the header with the given name, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// How long delivery is held back after the request is recorded.
    pub fn body_delay(&self) -> Option<Duration> {
        self.body_delay
    }
}

impl Default for MockResponse {
    fn default() -> Self {
        MockResponseBuilder::new().build()
    }
}
