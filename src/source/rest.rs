//! WordPress REST source.
//!
//! Fetches a `wp-json/wp/v2/posts`-style endpoint over HTTP and validates the
//! JSON array it returns. Transport problems and non-2xx statuses map to
//! [`FetchError::Network`]; a body that is not an array of well-formed posts
//! maps to [`FetchError::Decode`].

use std::time::Duration;

use serde_json::Value;

use super::{DataSource, Item};
use crate::error::FetchError;

/// A JSON posts endpoint reached with a blocking HTTP client.
///
/// The client is built once and reused for every fetch, whatever URL the
/// slideshow is currently pointed at.
pub struct RestSource {
    client: reqwest::blocking::Client,
}

impl RestSource {
    /// Build a source whose requests give up after `timeout` (`None` waits
    /// forever).
    pub fn new(timeout: Option<Duration>) -> reqwest::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    /// Decode a response body into items.
    ///
    /// This is a pure function (no I/O) so that tests can exercise the
    /// schema without a server.
    pub fn parse_posts(body: &[u8]) -> Result<Vec<Item>, FetchError> {
        let value: Value =
            serde_json::from_slice(body).map_err(|e| FetchError::decode(e.to_string()))?;

        let elements = match value {
            Value::Array(elements) => elements,
            other => {
                return Err(FetchError::decode(format!(
                    "expected a JSON array, found {}",
                    json_kind(&other)
                )))
            }
        };

        elements
            .into_iter()
            .enumerate()
            .map(|(index, element)| Item::from_json(index, element))
            .collect()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl DataSource for RestSource {
    fn name(&self) -> &str {
        "wp-json"
    }

    fn fetch(&self, url: &str) -> Result<Vec<Item>, FetchError> {
        let body = self.client.get(url).send()?.error_for_status()?.bytes()?;
        Self::parse_posts(&body)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
