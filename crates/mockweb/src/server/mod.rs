//! The mock web server.
//!
//! ## Module Structure
//!
//! - `types`: error types
//! - `core`: the dispatcher (record, resolve, delay, deliver)
//! - `handler`: hyper request/response conversion
//! - `mock_server`: `MockWebServer`, lifecycle and the test-facing API

mod core;
mod handler;
mod mock_server;
mod types;


pub use self::core::Dispatcher;
pub use handler::handle_mock_request;
pub use mock_server::MockWebServer;
pub use types::{DeliveryError, DispatchError, MockServerError, QueueOperation};
