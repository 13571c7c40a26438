//! overseer-control: control-channel client for the overseer supervisor
//!
//! This library implements the client side of the overseer control protocol:
//! a line-oriented, JSON-payloaded request/reply exchange over a local Unix
//! domain socket. The supervisor daemon listens on the socket; this crate
//! only speaks the wire contract and does not know what any command means.
//!
//! # Architecture
//!
//! One connection, one outstanding request at a time. The client writes a
//! single request line (`<command> <json-options>\n`), reads a single reply
//! line (`<status-code> <payload>\n`), and interprets the status code: `200`
//! is success, anything else is a server-reported failure.
//!
//! # Modules
//!
//! - `control`: the control client and the wire protocol
//! - `error`: error types and handling

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod control;
pub mod error;

// Re-export commonly used types
pub use control::{BoxFuture, CommandOptions, CommandResult, ControlClient, Reply};
pub use error::{ControlError, Result};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
