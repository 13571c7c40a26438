//! Error types for overseer-control
//!
//! This module defines the error types used throughout the library. We use
//! `thiserror` for ergonomic error definitions; every failure propagates to
//! the immediate caller, nothing is logged-and-swallowed or retried here.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for control-channel operations
#[derive(Error, Debug)]
pub enum ControlError {
    /// The control socket could not be reached (absent, refused, or
    /// permission denied)
    #[error("failed to connect to control socket {path:?}: {source}")]
    Connection {
        /// Socket path the connection was attempted against
        path: PathBuf,
        /// Underlying connect error
        source: std::io::Error,
    },

    /// The server closed the stream before sending a reply line
    #[error("control server disconnected")]
    Disconnected,

    /// The server answered with a non-success status code
    #[error("error from control server: {code} ({reply:?})")]
    Server {
        /// Numeric status code from the reply line
        code: u16,
        /// Raw reply text following the code (may be empty)
        reply: String,
    },

    /// A success reply carried a payload that was not valid JSON, or a
    /// payload did not match the requested type
    #[error("failed to decode control server payload: {0}")]
    Decode(#[source] serde_json::Error),

    /// The command token would corrupt the line framing
    #[error("invalid command {0:?}: commands must be non-empty and contain no whitespace")]
    InvalidCommand(String),

    /// A command was issued on a connection that has already been closed
    #[error("control connection is closed")]
    ConnectionClosed,

    /// I/O failure on the control socket mid-exchange
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using ControlError
pub type Result<T> = std::result::Result<T, ControlError>;
