//! Recorded request types.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::borrow::Cow;
use std::collections::HashMap;
use std::str::Utf8Error;

/// A request as handed over by the transport: already parsed, not yet recorded.
#[derive(Debug, Clone, Default)]
pub struct IncomingRequest {
    pub method: String,
    /// Path plus query string, without scheme, host or port.
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl IncomingRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }
}

/// A request received by the mock server.
///
/// Created once per inbound request and never modified afterwards.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    method: String,
    path: String,
    headers: Vec<(String, String)>,
    body: Bytes,
    sequence_number: u64,
    received_at: DateTime<Utc>,
}

impl RecordedRequest {
    pub fn new(incoming: IncomingRequest, sequence_number: u64) -> Self {
        Self {
            method: incoming.method,
            path: incoming.path,
            headers: incoming.headers,
            body: incoming.body,
            sequence_number,
            received_at: Utc::now(),
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// Raw path including the query string, e.g. `/pets?name=Garfield`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Path and query parameters parsed out of [`path`](Self::path).
    pub fn request_url(&self) -> RequestUrl {
        RequestUrl::parse(&self.path)
    }

    /// First value of the header with the given name, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// All values of the header with the given name, ignoring case, in the order received.
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Headers as received, in order, repeats included.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Header values grouped by name as received.
    pub fn header_map(&self) -> HashMap<String, Vec<String>> {
        let mut map: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in &self.headers {
            map.entry(name.clone()).or_default().push(value.clone());
        }
        map
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn body_utf8(&self) -> Result<&str, Utf8Error> {
        std::str::from_utf8(&self.body)
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn body_string(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Zero-based position of this request among all requests the server received.
    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }
}

/// Decoded path and query parameters of a recorded request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestUrl {
    pub path: String,
    pub query_parameters: HashMap<String, String>,
}

impl RequestUrl {
    pub fn parse(raw: &str) -> Self {
        let without_fragment = raw.split_once('#').map_or(raw, |(before, _)| before);
        let (path, query) = match without_fragment.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (without_fragment, None),
        };

        Self {
            path: decode_component(path),
            query_parameters: query.map(parse_query_string).unwrap_or_default(),
        }
    }
}

/// Parse a query string into a map.
///
/// Segments without exactly one `=` are dropped. Repeated keys keep the last value.
pub fn parse_query_string(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|s| !s.is_empty())
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            if value.contains('=') {
                return None;
            }
            Some((decode_component(key), decode_component(value)))
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorded(incoming: IncomingRequest) -> RecordedRequest {
        RecordedRequest::new(incoming, 0)
    }

    #[test]
    fn test_request_url_with_query() {
        let url = RequestUrl::parse("/pets?name=Garfield&type=cat");
        assert_eq!(url.path, "/pets");
        assert_eq!(url.query_parameters.len(), 2);
        assert_eq!(url.query_parameters.get("name"), Some(&"Garfield".to_string()));
        assert_eq!(url.query_parameters.get("type"), Some(&"cat".to_string()));
    }

    #[test]
    fn test_request_url_without_query() {
        let url = RequestUrl::parse("/pets/1");
        assert_eq!(url.path, "/pets/1");
        assert!(url.query_parameters.is_empty());
    }

    #[test]
    fn test_parse_query_string_drops_malformed_segments() {
        let parsed = parse_query_string("a=1&flag&b=2=3&&c=");
        assert_eq!(parsed.get("a"), Some(&"1".to_string()));
        assert_eq!(parsed.get("c"), Some(&String::new()));
        assert!(!parsed.contains_key("flag"));
        assert!(!parsed.contains_key("b"));
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn test_parse_query_string_last_duplicate_wins() {
        let parsed = parse_query_string("name=alice&name=bob");
        assert_eq!(parsed.get("name"), Some(&"bob".to_string()));
    }

    #[test]
    fn test_parse_query_string_decodes() {
        let parsed = parse_query_string("q=hello%20world&tags=a%2Cb");
        assert_eq!(parsed.get("q"), Some(&"hello world".to_string()));
        assert_eq!(parsed.get("tags"), Some(&"a,b".to_string()));
    }

    #[test]
    fn test_header_lookup_ignores_case() {
        let request = recorded(
            IncomingRequest::new("GET", "/pets")
                .header("X-Custom-Header", "custom-value")
                .header("x-custom-header", "custom-value2")
                .header("Accept", "application/json"),
        );

        assert_eq!(request.header("X-CUSTOM-HEADER"), Some("custom-value"));
        assert_eq!(
            request.header_values("x-custom-header"),
            vec!["custom-value", "custom-value2"]
        );
        assert_eq!(request.header("X-Dummy"), None);
        assert!(request.header_values("X-Dummy").is_empty());
        assert_eq!(request.headers().len(), 3);
    }

    #[test]
    fn test_header_map_groups_by_name() {
        let request = recorded(
            IncomingRequest::new("GET", "/")
                .header("X-Custom-Header", "one")
                .header("X-Custom-Header", "two")
                .header("Accept", "*/*"),
        );

        let map = request.header_map();
        assert_eq!(
            map.get("X-Custom-Header"),
            Some(&vec!["one".to_string(), "two".to_string()])
        );
        assert_eq!(map.get("Accept"), Some(&vec!["*/*".to_string()]));
    }

    #[test]
    fn test_body_accessors() {
        let request = recorded(IncomingRequest::new("POST", "/pets").body("Hello World"));
        assert_eq!(request.body().as_ref(), b"Hello World");
        assert_eq!(request.body_utf8().unwrap(), "Hello World");
        assert_eq!(request.body_string(), "Hello World");

        let empty = recorded(IncomingRequest::new("GET", "/pets"));
        assert!(empty.body().is_empty());
        assert_eq!(empty.body_string(), "");

        let binary = recorded(IncomingRequest::new("POST", "/").body(vec![0xff, 0xfe]));
        assert!(binary.body_utf8().is_err());
    }
}
