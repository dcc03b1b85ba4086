//! Status codes and reason phrases for mock responses.

use hyper::StatusCode;
use std::borrow::Cow;
use std::fmt;

/// An HTTP status code paired with the reason phrase sent on the status line.
///
/// Any code/reason pair is accepted, including non-standard ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MockStatus {
    code: u16,
    reason: Cow<'static, str>,
}

macro_rules! known_statuses {
    ($($name:ident => ($code:expr, $reason:expr);)+) => {
        impl MockStatus {
            $(pub const $name: MockStatus = MockStatus::from_static($code, $reason);)+
        }
    };
}

known_statuses! {
    OK => (200, "OK");
    CREATED => (201, "Created");
    ACCEPTED => (202, "Accepted");
    NO_CONTENT => (204, "No Content");
    MOVED_PERMANENTLY => (301, "Moved Permanently");
    FOUND => (302, "Found");
    SEE_OTHER => (303, "See Other");
    NOT_MODIFIED => (304, "Not Modified");
    TEMPORARY_REDIRECT => (307, "Temporary Redirect");
    PERMANENT_REDIRECT => (308, "Permanent Redirect");
    BAD_REQUEST => (400, "Bad Request");
    UNAUTHORIZED => (401, "Unauthorized");
    FORBIDDEN => (403, "Forbidden");
    NOT_FOUND => (404, "Not Found");
    METHOD_NOT_ALLOWED => (405, "Method Not Allowed");
    CONFLICT => (409, "Conflict");
    UNSUPPORTED_MEDIA_TYPE => (415, "Unsupported Media Type");
    I_AM_A_TEAPOT => (418, "I'm a teapot");
    TOO_MANY_REQUESTS => (429, "Too Many Requests");
    INTERNAL_SERVER_ERROR => (500, "Internal Server Error");
    NOT_IMPLEMENTED => (501, "Not Implemented");
    BAD_GATEWAY => (502, "Bad Gateway");
    SERVICE_UNAVAILABLE => (503, "Service Unavailable");
    GATEWAY_TIMEOUT => (504, "Gateway Timeout");
}

impl MockStatus {
    const fn from_static(code: u16, reason: &'static str) -> Self {
        Self {
            code,
            reason: Cow::Borrowed(reason),
        }
    }

    /// A status with an explicit reason phrase.
    pub fn new(code: u16, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: Cow::Owned(reason.into()),
        }
    }

    /// A status whose reason phrase is looked up from the code.
    ///
    /// Registered codes get their canonical phrase; anything else gets the
    /// name of its class, or `Mock Response` outside 100-599.
    pub fn from_code(code: u16) -> Self {
        let canonical = StatusCode::from_u16(code)
            .ok()
            .and_then(|status| status.canonical_reason());
        match canonical {
            Some(reason) => Self::from_static(code, reason),
            None => Self::from_static(code, class_reason(code)),
        }
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

fn class_reason(code: u16) -> &'static str {
    match code {
        100..=199 => "Informational",
        200..=299 => "OK",
        300..=399 => "Redirection",
        400..=499 => "Client Error",
        500..=599 => "Server Error",
        _ => "Mock Response",
    }
}

impl Default for MockStatus {
    fn default() -> Self {
        Self::OK
    }
}

impl From<u16> for MockStatus {
    fn from(code: u16) -> Self {
        Self::from_code(code)
    }
}

impl fmt::Display for MockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.reason)
    }
}
