//! Response scripts: queued responses and a default, loaded from YAML.

use super::ServerConfig;
use crate::response::{MockResponse, MockStatus, ResponseError};
use crate::server::{MockServerError, MockWebServer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Failed to read script {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse script: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid response in script: {0}")]
    Response(#[from] ResponseError),
    #[error("Failed to encode body: {0}")]
    Body(#[from] serde_json::Error),
}

/// One scripted response.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseSpec {
    #[serde(default = "default_status_code")]
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// A string is sent as-is; any other value is sent as JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_ms: Option<u64>,
}

fn default_status_code() -> u16 {
    200
}

impl Default for ResponseSpec {
    fn default() -> Self {
        Self {
            status_code: default_status_code(),
            reason: None,
            headers: BTreeMap::new(),
            body: None,
            delay_ms: None,
        }
    }
}

impl ResponseSpec {
    pub fn to_response(&self) -> Result<MockResponse, ScriptError> {
        let status = match &self.reason {
            Some(reason) => MockStatus::new(self.status_code, reason.clone()),
            None => MockStatus::from_code(self.status_code),
        };

        let mut builder = MockResponse::builder().status(status);
        builder = match &self.body {
            None => builder,
            Some(serde_json::Value::String(text)) => builder.body(text.clone()),
            Some(value) => builder.json_body(serde_json::to_string(value)?),
        };
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(delay_ms) = self.delay_ms {
            builder = builder.body_delay_millis(delay_ms)?;
        }

        Ok(builder.build())
    }
}

/// A full script: where to listen and what to answer.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseScript {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub fail_fast: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_response: Option<ResponseSpec>,
    #[serde(default)]
    pub responses: Vec<ResponseSpec>,
}

impl ResponseScript {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScriptError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&contents)
    }

    pub fn parse(yaml: &str) -> Result<Self, ScriptError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Queue every scripted response on `server` and configure its default.
    ///
    /// All responses are built before anything is queued, so an invalid
    /// script leaves the server untouched.
    pub fn apply(&self, server: &MockWebServer) -> Result<(), MockServerError> {
        let responses = self
            .responses
            .iter()
            .map(ResponseSpec::to_response)
            .collect::<Result<Vec<_>, _>>()?;
        let default = self
            .default_response
            .as_ref()
            .map(ResponseSpec::to_response)
            .transpose()?;

        if self.fail_fast {
            server.fail_fast()?;
        }
        if let Some(default) = default {
            server.set_default_response(default)?;
        }
        for response in responses {
            server.enqueue(response)?;
        }

        info!(
            "Applied script: {} queued responses, default configured: {}",
            self.responses.len(),
            self.fail_fast || self.default_response.is_some()
        );
        Ok(())
    }
}
