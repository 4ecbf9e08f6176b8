//! IPC clients.
//!
//! [`IpcClient`] makes one-shot calls over a fresh connection, which is what
//! the CLI needs. [`ClientConnection`] keeps one connection open as a session:
//! calls and pushed events share the socket, so a background task splits the
//! incoming frames by kind.

use std::collections::HashMap;
use std::sync::Arc;

use board_protocol_types::{Event, Frame, Method, Request, Response};
use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::UnixStream;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::{IpcError, IpcResult};

type Pending = Arc<Mutex<HashMap<String, oneshot::Sender<Response>>>>;

/// IPC client for connecting to the server.
pub struct IpcClient {
    socket_path: String,
}

impl IpcClient {
    /// Create a new IPC client.
    pub fn new(socket_path: &str) -> Self {
        Self {
            socket_path: socket_path.to_string(),
        }
    }

    async fn open(&self) -> IpcResult<UnixStream> {
        UnixStream::connect(&self.socket_path)
            .await
            .map_err(|e| IpcError::Socket(format!("Failed to connect: {}", e)))
    }

    /// Send a request on a fresh connection and wait for its response.
    ///
    /// Event frames that arrive first are skipped.
    pub async fn call(&self, request: Request) -> IpcResult<Response> {
        let (reader, mut writer) = self.open().await?.into_split();
        let mut lines = BufReader::new(reader).lines();

        write_request(&mut writer, &request).await?;

        while let Some(line) = lines.next_line().await? {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match Frame::from_json(trimmed)? {
                Frame::Response(response) if response.id == request.id || response.id.is_empty() => {
                    return Ok(response);
                }
                Frame::Response(response) => {
                    return Err(IpcError::Protocol(format!(
                        "Response for unknown request {}",
                        response.id
                    )));
                }
                Frame::Event(_) => continue,
            }
        }

        Err(IpcError::ConnectionClosed)
    }

    /// Send a method call with no parameters.
    pub async fn call_method(&self, method: Method) -> IpcResult<Response> {
        self.call(Request::new(method)).await
    }

    /// Send a method call with parameters.
    pub async fn call_method_with_params(
        &self,
        method: Method,
        params: serde_json::Value,
    ) -> IpcResult<Response> {
        self.call(Request::with_params(method, params)).await
    }

    /// Check if the server is running.
    pub async fn is_server_running(&self) -> bool {
        self.call_method(Method::Health).await.is_ok()
    }

    /// Open a long-lived session.
    pub async fn connect(&self) -> IpcResult<ClientConnection> {
        let (reader, writer) = self.open().await?.into_split();
        let pending: Pending = Arc::new(Mutex::new(HashMap::new()));
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let reader_task = tokio::spawn(read_frames(reader, pending.clone(), events_tx));

        Ok(ClientConnection {
            writer: tokio::sync::Mutex::new(writer),
            pending,
            events: events_rx,
            reader_task,
        })
    }
}

/// A session held open against the server.
///
/// Responses are matched to calls by request id; events queue up until read
/// with [`ClientConnection::next_event`]. Dropping the connection closes the
/// session on the server side.
pub struct ClientConnection {
    writer: tokio::sync::Mutex<OwnedWriteHalf>,
    pending: Pending,
    events: mpsc::UnboundedReceiver<Event>,
    reader_task: JoinHandle<()>,
}

impl ClientConnection {
    /// Send a request and wait for its response.
    pub async fn call(&self, request: Request) -> IpcResult<Response> {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(request.id.clone(), tx);

        let written = {
            let mut writer = self.writer.lock().await;
            write_request(&mut writer, &request).await
        };
        if let Err(e) = written {
            self.pending.lock().remove(&request.id);
            return Err(e);
        }

        rx.await.map_err(|_| IpcError::ConnectionClosed)
    }

    /// Send a method call with no parameters.
    pub async fn call_method(&self, method: Method) -> IpcResult<Response> {
        self.call(Request::new(method)).await
    }

    /// Send a method call with parameters.
    pub async fn call_method_with_params(
        &self,
        method: Method,
        params: serde_json::Value,
    ) -> IpcResult<Response> {
        self.call(Request::with_params(method, params)).await
    }

    /// Wait for the next pushed event.
    ///
    /// Returns `None` once the server closed the connection and every queued
    /// event has been read.
    pub async fn next_event(&mut self) -> Option<Event> {
        self.events.recv().await
    }

    /// Take a queued event without waiting.
    pub fn try_next_event(&mut self) -> Option<Event> {
        self.events.try_recv().ok()
    }
}

impl Drop for ClientConnection {
    fn drop(&mut self) {
        self.reader_task.abort();
    }
}

async fn write_request(writer: &mut OwnedWriteHalf, request: &Request) -> IpcResult<()> {
    let json = request.to_json()?;
    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

async fn read_frames(
    reader: OwnedReadHalf,
    pending: Pending,
    events: mpsc::UnboundedSender<Event>,
) {
    let mut lines = BufReader::new(reader).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "Read error on session connection");
                break;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match Frame::from_json(trimmed) {
            Ok(Frame::Response(response)) => {
                let waiter = pending.lock().remove(&response.id);
                match waiter {
                    Some(tx) => {
                        let _ = tx.send(response);
                    }
                    None => debug!(id = %response.id, "Response with no waiting call"),
                }
            }
            Ok(Frame::Event(event)) => {
                let _ = events.send(event);
            }
            Err(e) => warn!(error = %e, "Failed to parse frame"),
        }
    }

    // Waiting calls see the connection as closed.
    pending.lock().clear();
}
