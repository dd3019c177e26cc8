use std::time::Duration;
use thiserror::Error;

/// Result type for session operations
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors that can occur on a control session
#[derive(Error, Debug)]
pub enum SessionError {
    /// The connect attempt did not complete within the allowed time
    #[error("connect timed out after {0:?}")]
    ConnectTimeout(Duration),

    /// Socket-level read/write/connect failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An operation that requires a live connection was attempted while disconnected
    #[error("not connected")]
    NotConnected,

    /// The connection was lost; the message carries the underlying cause
    /// (including the deliberate "server closed connection" end-of-stream case)
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// A synchronous wait for a response exceeded the caller's timeout
    #[error("timed out waiting for a response")]
    ResponseTimeout,

    /// A listener callback reported a failure
    #[error("listener error: {0}")]
    Listener(String),
}
