//! Control client for the supervisor's Unix socket
//!
//! This module implements the connection lifecycle around the wire protocol:
//! connect, the strictly half-duplex request/reply exchange, and disconnect.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufStream};
use tokio::net::UnixStream;
use tracing::debug;

use crate::control::protocol::{self, CommandOptions, CommandResult, Reply};
use crate::error::{ControlError, Result};

/// A type-erased, `Send`-safe, boxed future. Scoped units of work handed to
/// [`ControlClient::with_connection`] must return a concrete boxed future so
/// the closure can borrow the client across an `await`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Client for one control connection to the supervisor.
///
/// A client owns its connection exclusively and supports exactly one
/// outstanding request at a time: [`run`](ControlClient::run) takes
/// `&mut self`, so overlapping calls on one connection cannot compile.
/// Callers that need concurrent commands open one client per caller; the
/// protocol has no multiplexing or request correlation.
#[derive(Debug)]
pub struct ControlClient {
    /// Buffered stream to the supervisor; `None` once closed
    stream: Option<BufStream<UnixStream>>,
    /// Socket path, kept for diagnostics
    path: PathBuf,
}

impl ControlClient {
    /// Connect to the supervisor's control socket.
    ///
    /// Fails with [`ControlError::Connection`] when the socket is absent,
    /// refuses the connection, or permission is denied. There is no retry —
    /// failure is immediate.
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let stream = UnixStream::connect(&path)
            .await
            .map_err(|source| ControlError::Connection {
                path: path.clone(),
                source,
            })?;

        debug!("connected to control socket at {:?}", path);

        Ok(Self {
            stream: Some(BufStream::new(stream)),
            path,
        })
    }

    /// Run one command and interpret the reply.
    ///
    /// Writes exactly one request line and reads exactly one reply line,
    /// suspending the calling task until the full reply arrives or the
    /// server closes the stream. There is deliberately no timeout at this
    /// layer; callers wanting a bounded wait wrap the call in an external
    /// deadline such as `tokio::time::timeout`.
    ///
    /// On success the connection stays open for sequential reuse. A fatal
    /// I/O error or a server disconnect closes it, after which further
    /// calls fail with [`ControlError::ConnectionClosed`].
    pub async fn run(&mut self, command: &str, options: CommandOptions) -> Result<CommandResult> {
        let request = protocol::encode_request(command, options)?;
        let stream = self.stream.as_mut().ok_or(ControlError::ConnectionClosed)?;

        debug!("sending control command: {}", command);

        match Self::exchange(stream, &request).await {
            Ok(Some(line)) => {
                debug!("received control reply: {}", line.trim_end());
                Reply::parse(&line)?.into_command_result()
            }
            Ok(None) => {
                self.stream = None;
                Err(ControlError::Disconnected)
            }
            Err(err) => {
                self.stream = None;
                Err(ControlError::Io(err))
            }
        }
    }

    /// Write the request line, flush, and read one reply line. `None` means
    /// the server closed the stream before sending anything.
    async fn exchange(
        stream: &mut BufStream<UnixStream>,
        request: &str,
    ) -> std::io::Result<Option<String>> {
        stream.write_all(request.as_bytes()).await?;
        stream.flush().await?;

        let mut line = String::new();
        let read = stream.read_line(&mut line).await?;
        Ok((read > 0).then_some(line))
    }

    /// Close the connection.
    ///
    /// Idempotent: closing an already-closed client does nothing, and any
    /// close-time error is suppressed (best-effort resource release).
    pub async fn disconnect(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.shutdown().await;
            debug!("disconnected from control socket at {:?}", self.path);
        }
    }

    /// Whether the connection is still open
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Connect, hand the live client to a unit of work, and disconnect on
    /// every exit path before propagating the work's result or error.
    ///
    /// ```no_run
    /// use overseer_control::{CommandOptions, ControlClient};
    ///
    /// # async fn demo() -> overseer_control::Result<()> {
    /// let status = ControlClient::with_connection("/run/overseer/control.sock", |client| {
    ///     Box::pin(async move { client.run("status", CommandOptions::new()).await })
    /// })
    /// .await?;
    /// println!("{:?}", status);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn with_connection<T>(
        path: impl AsRef<Path>,
        work: impl for<'c> FnOnce(&'c mut ControlClient) -> BoxFuture<'c, Result<T>>,
    ) -> Result<T> {
        let mut client = Self::connect(path).await?;
        let result = work(&mut client).await;
        client.disconnect().await;
        result
    }

    /// Connect, run exactly one command, and disconnect.
    ///
    /// Cleanup never masks the primary result or error.
    pub async fn run_once(
        path: impl AsRef<Path>,
        command: &str,
        options: CommandOptions,
    ) -> Result<CommandResult> {
        let mut client = Self::connect(path).await?;
        let result = client.run(command, options).await;
        client.disconnect().await;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_connect_fails_when_socket_absent() {
        let tmp_dir = TempDir::new().unwrap();
        let path = tmp_dir.path().join("missing.sock");

        let err = ControlClient::connect(&path).await.unwrap_err();
        assert!(matches!(err, ControlError::Connection { .. }));
    }

    #[tokio::test]
    async fn test_run_rejects_malformed_command_before_writing() {
        let tmp_dir = TempDir::new().unwrap();
        let path = tmp_dir.path().join("control.sock");
        let _listener = tokio::net::UnixListener::bind(&path).unwrap();

        let mut client = ControlClient::connect(&path).await.unwrap();
        let err = client
            .run("two words", CommandOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ControlError::InvalidCommand(_)));
        // Nothing was written, so the connection is still usable.
        assert!(client.is_connected());
    }
}
