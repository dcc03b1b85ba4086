use super::status::MockStatus;
use super::{MockResponse, ResponseError};
use bytes::Bytes;
use std::time::Duration;

const CONTENT_LENGTH: &str = "Content-Length";
const CONTENT_TYPE: &str = "Content-Type";

/// Fluent builder for [`MockResponse`].
///
/// Starts out as `200 OK` with an empty body and `Content-Length: 0`.
#[derive(Debug, Clone)]
pub struct MockResponseBuilder {
    status: MockStatus,
    headers: Vec<(String, String)>,
    body: Bytes,
    body_delay: Option<Duration>,
}

impl MockResponseBuilder {
    pub fn new() -> Self {
        MockResponseBuilder {
            status: MockStatus::OK,
            headers: Vec::new(),
            body: Bytes::new(),
            body_delay: None,
        }
        .header(CONTENT_LENGTH, "0")
    }

    pub fn ok(self) -> Self {
        self.status(MockStatus::OK)
    }

    pub fn not_found(self) -> Self {
        self.status(MockStatus::NOT_FOUND)
    }

    pub fn status(mut self, status: MockStatus) -> Self {
        self.status = status;
        self
    }

    /// Status with the reason phrase looked up from the code.
    pub fn status_code(self, code: u16) -> Self {
        self.status(MockStatus::from_code(code))
    }

    pub fn status_with_reason(self, code: u16, reason: impl Into<String>) -> Self {
        self.status(MockStatus::new(code, reason))
    }

    /// Set a header, replacing any existing header with the same name (ignoring case).
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    /// Add a header, keeping existing headers with the same name.
    pub fn add_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the body and update `Content-Length` to match.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        let length = self.body.len().to_string();
        self.header(CONTENT_LENGTH, length)
    }

    /// Set a UTF-8 body and `Content-Type: application/json`.
    pub fn json_body(self, body: impl Into<String>) -> Self {
        let body: String = body.into();
        self.body(body).header(CONTENT_TYPE, "application/json")
    }

    /// Delay delivery of the response by `delay`, which must be positive.
    pub fn body_delay(mut self, delay: Duration) -> Result<Self, ResponseError> {
        if delay.is_zero() {
            return Err(ResponseError::NonPositiveDelay);
        }
        self.body_delay = Some(delay);
        Ok(self)
    }

    pub fn body_delay_millis(self, millis: u64) -> Result<Self, ResponseError> {
        self.body_delay(Duration::from_millis(millis))
    }

    pub fn build(self) -> MockResponse {
        MockResponse {
            status: self.status,
            headers: self.headers,
            body: self.body,
            body_delay: self.body_delay,
        }
    }
}

impl Default for MockResponseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl From<MockResponseBuilder> for MockResponse {
    fn from(builder: MockResponseBuilder) -> Self {
        builder.build()
    }
}
