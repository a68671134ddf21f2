//! Error types.
//!
//! [`FetchError`] is the only error a user ever sees: it ends a load and is
//! shown in the status bar. [`CacheError`] stays internal; the store logs it
//! and carries on as if the cache were empty.

use std::path::PathBuf;

use thiserror::Error;

/// Why a fetch produced no items.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The request could not complete (transport failure, timeout, non-2xx).
    #[error("network error: {0}")]
    Network(String),

    /// The body was not a JSON array of posts.
    ///
    /// `index` names the offending array element when the array itself
    /// parsed but one of its entries did not.
    #[error("{}", decode_message(.index, .reason))]
    Decode {
        index: Option<usize>,
        reason: String,
    },
}

fn decode_message(index: &Option<usize>, reason: &str) -> String {
    match index {
        Some(i) => format!("decode error in post #{i}: {reason}"),
        None => format!("decode error: {reason}"),
    }
}

impl FetchError {
    pub fn decode(reason: impl Into<String>) -> Self {
        Self::Decode {
            index: None,
            reason: reason.into(),
        }
    }

    pub fn decode_at(index: usize, reason: impl Into<String>) -> Self {
        Self::Decode {
            index: Some(index),
            reason: reason.into(),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

/// Failures of the on-disk item cache.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("failed to create cache directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read cache file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write cache file '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to remove cache file '{path}': {source}")]
    Remove {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to (de)serialize cached items: {0}")]
    Serde(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_message_mentions_element_index() {
        let err = FetchError::decode_at(2, "missing field `link`");
        assert_eq!(err.to_string(), "decode error in post #2: missing field `link`");
    }

    #[test]
    fn decode_message_without_index() {
        let err = FetchError::decode("expected a JSON array");
        assert_eq!(err.to_string(), "decode error: expected a JSON array");
    }

    #[test]
    fn network_message() {
        let err = FetchError::Network("connection refused".into());
        assert_eq!(err.to_string(), "network error: connection refused");
    }
}
