//! Mockweb: a scriptable HTTP server for testing HTTP clients.
//!
//! A [`MockWebServer`] listens on a local port, records every request it
//! receives and answers each one from a FIFO queue of scripted responses or
//! from a custom [`ResponseProvider`]. Tests then inspect what was sent with
//! [`MockWebServer::take_request`].
//!
//! ```no_run
//! use mockweb::{MockResponse, MockWebServer};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let server = MockWebServer::new();
//! server.enqueue(MockResponse::builder().json_body(r#"{"id":1}"#))?;
//! server.start().await?;
//!
//! let url = server.url_for("/pets/1")?;
//! // ... point the client under test at `url` ...
//!
//! let request = server.take_request().expect("request was recorded");
//! assert_eq!(request.path(), "/pets/1");
//! server.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod provider;
pub mod recording;
pub mod response;
pub mod server;

pub use config::{ResponseScript, ResponseSpec, ScriptError, ServerConfig};
pub use provider::{QueueProvider, ResponseProvider, ResponseSource};
pub use recording::{IncomingRequest, RecordedRequest, RequestLog, RequestUrl};
pub use response::{MockResponse, MockResponseBuilder, MockStatus, ResponseError};
pub use server::{
    DeliveryError, DispatchError, Dispatcher, MockServerError, MockWebServer, QueueOperation,
};
