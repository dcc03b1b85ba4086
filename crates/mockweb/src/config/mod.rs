//! Configuration types for the mock web server.

mod script;

use serde::{Deserialize, Serialize};

pub use script::{ResponseScript, ResponseSpec, ScriptError};

/// Where the server listens.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind; 0 lets the OS pick a free one.
    #[serde(default)]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: 0,
        }
    }
}
