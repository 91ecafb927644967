//! Chain adapter error types.

use thiserror::Error;

/// Failures talking to the RPC or account endpoints.
#[derive(Debug, Clone, Error)]
pub enum ChainError {
    /// Transport-level failure (connection, TLS, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// The endpoint answered with a protocol-level error.
    #[error("RPC response error: {message} (code: {code:?})")]
    RpcResponse { code: Option<i64>, message: String },

    /// The account has no on-chain presence (e.g. unfunded).
    #[error("account not found: {0}")]
    AccountNotFound(String),

    /// The endpoint answered 2xx but the body was not the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for ChainError {
    fn from(err: reqwest::Error) -> Self {
        ChainError::Transport(err.to_string())
    }
}
