//! Error types for email resolution.
//!
//! Failures coming back across the JS boundary arrive as opaque `JsValue`s;
//! they are flattened into their debug text here so the resolver can treat
//! them like any other error.

use thiserror::Error;
use wasm_bindgen::JsValue;

/// Errors reading or writing a `chrome.storage` area.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage call failed: {0}")]
    Js(String),

    #[error("could not (de)serialize stored value for '{key}': {reason}")]
    Serialization { key: String, reason: String },
}

impl From<JsValue> for StoreError {
    fn from(value: JsValue) -> Self {
        StoreError::Js(format!("{:?}", value))
    }
}

/// Errors talking to the remote lookup provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("API responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unreadable API response: {0}")]
    InvalidResponse(String),
}

impl From<JsValue> for ProviderError {
    fn from(value: JsValue) -> Self {
        ProviderError::Transport(format!("{:?}", value))
    }
}

/// Failure of a whole resolution attempt.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("email lookup failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("email cache unavailable: {0}")]
    Store(#[from] StoreError),
}
