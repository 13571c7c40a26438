//! Example control-channel session
//!
//! Runs one command against a live supervisor socket and prints the reply:
//!
//! ```text
//! cargo run --example run_command -- /run/overseer/control.sock status
//! ```

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use overseer_control::{CommandOptions, CommandResult, ControlClient};

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();

    let mut args = std::env::args().skip(1);
    let usage = "usage: run_command <socket-path> <command>";
    let socket = args.next().context(usage)?;
    let command = args.next().context(usage)?;

    match ControlClient::run_once(&socket, &command, CommandOptions::new()).await? {
        CommandResult::Payload(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        CommandResult::Ok => println!("ok"),
    }

    Ok(())
}
