//! Bridge error type.

use thiserror::Error;

/// Errors the bridge itself can produce.
///
/// Transport-level failures (connection drops, reconnect exhaustion) are
/// owned by the underlying transport and never surface here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// The rendered document carries no CSRF token. Every request depends
    /// on it, so the bridge refuses to connect rather than connect
    /// insecurely.
    #[error("security token missing from document (expected meta[name=\"csrf-token\"])")]
    MissingSecurityToken,

    /// A second connection was requested while one is live. The page holds
    /// at most one.
    #[error("a live connection already exists for this page")]
    AlreadyConnected,

    /// Two hooks were registered under the same name.
    #[error("hook `{0}` is already registered")]
    DuplicateHook(String),

    /// An element asked for a hook name nobody registered. Loud by design:
    /// a typo'd hook name should fail at dispatch, not silently no-op.
    #[error("no hook registered under `{0}`")]
    UnknownHook(String),

    /// A hooked element carries no `id`, so its instance cannot be tracked
    /// across updates.
    #[error("element with hook `{0}` has no id attribute")]
    MissingElementId(String),

    /// The endpoint path or base origin did not form a valid URL.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// The underlying transport refused to open.
    #[error("transport error: {0}")]
    Transport(String),

    /// A required browser API surface was unavailable.
    #[error("browser API unavailable: {0}")]
    Dom(String),
}

#[cfg(target_arch = "wasm32")]
impl From<BridgeError> for wasm_bindgen::JsValue {
    fn from(err: BridgeError) -> Self {
        wasm_bindgen::JsValue::from_str(&err.to_string())
    }
}
