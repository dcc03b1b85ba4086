//! Request recording: what the server received and the log tests drain it from.

mod store;
mod types;

pub use store::RequestLog;
pub use types::{parse_query_string, IncomingRequest, RecordedRequest, RequestUrl};
