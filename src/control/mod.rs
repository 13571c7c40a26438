//! Control channel to the supervisor daemon
//!
//! This module provides the client for the supervisor's control socket: the
//! wire protocol (request framing and reply parsing) and the connection
//! lifecycle around it.

mod client;
mod protocol;

pub use client::{BoxFuture, ControlClient};
pub use protocol::{encode_request, CommandOptions, CommandResult, Reply, STATUS_OK};
