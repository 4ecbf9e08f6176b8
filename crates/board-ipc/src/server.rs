//! IPC server implementation.
//!
//! Every accepted connection is one session: it is connected to the channel
//! registry on accept and disconnected when the socket closes. The connection
//! task interleaves two things cooperatively:
//!
//! 1. Reading request lines and writing the handler's response frame
//! 2. Forwarding events published to the session's channels as event frames
//!
//! Events that arrive while a handler runs are queued and written afterwards.

use std::collections::HashMap;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;

use board_protocol_types::{error_codes, Frame, Method, Request, Response, SessionId};
use channel_registry::ChannelRegistry;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::unix::OwnedWriteHalf;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, error, info, warn};

use crate::session::SessionContext;
use crate::IpcResult;

/// Handler function type for IPC methods.
pub type HandlerFn = Box<
    dyn Fn(SessionContext, Request) -> Pin<Box<dyn Future<Output = Response> + Send>>
        + Send
        + Sync,
>;

/// Callback run after a session's connection closes.
pub type DisconnectFn =
    Box<dyn Fn(SessionContext) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

type Handlers = Arc<RwLock<HashMap<Method, HandlerFn>>>;
type DisconnectHook = Arc<RwLock<Option<DisconnectFn>>>;

/// IPC server that listens on a Unix domain socket.
pub struct IpcServer {
    socket_path: String,
    registry: ChannelRegistry,
    handlers: Handlers,
    disconnect_fn: DisconnectHook,
    shutdown_tx: broadcast::Sender<()>,
}

impl IpcServer {
    /// Create a new IPC server whose sessions live in `registry`.
    pub fn new(socket_path: &str, registry: ChannelRegistry) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            socket_path: socket_path.to_string(),
            registry,
            handlers: Arc::new(RwLock::new(HashMap::new())),
            disconnect_fn: Arc::new(RwLock::new(None)),
            shutdown_tx,
        }
    }

    /// Register a handler for a method.
    pub async fn register_handler<F, Fut>(&self, method: Method, handler: F)
    where
        F: Fn(SessionContext, Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        let boxed_handler: HandlerFn = Box::new(move |ctx, req| Box::pin(handler(ctx, req)));
        self.handlers.write().await.insert(method, boxed_handler);
    }

    /// Register the callback run when a session disconnects.
    pub async fn register_disconnect_handler<F, Fut>(&self, handler: F)
    where
        F: Fn(SessionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let boxed: DisconnectFn = Box::new(move |ctx| Box::pin(handler(ctx)));
        *self.disconnect_fn.write().await = Some(boxed);
    }

    /// The registry sessions are connected to.
    pub fn registry(&self) -> &ChannelRegistry {
        &self.registry
    }

    /// Get a shutdown receiver.
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Get a shutdown sender (for handlers that need to trigger shutdown).
    pub fn shutdown_sender(&self) -> broadcast::Sender<()> {
        self.shutdown_tx.clone()
    }

    /// Trigger shutdown.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Start the server and listen for connections.
    pub async fn run(&self) -> IpcResult<()> {
        let socket_path = Path::new(&self.socket_path);
        if socket_path.exists() {
            std::fs::remove_file(socket_path)?;
        }
        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let listener = UnixListener::bind(&self.socket_path)?;
        info!(path = %self.socket_path, "IPC server listening");

        let mut shutdown_rx = self.shutdown_tx.subscribe();

        loop {
            tokio::select! {
                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((stream, _)) => {
                            let connection = Connection {
                                registry: self.registry.clone(),
                                handlers: self.handlers.clone(),
                                disconnect_fn: self.disconnect_fn.clone(),
                                shutdown_rx: self.shutdown_tx.subscribe(),
                            };
                            tokio::spawn(async move {
                                if let Err(e) = connection.serve(stream).await {
                                    error!(error = %e, "Connection error");
                                }
                            });
                        }
                        Err(e) => {
                            error!(error = %e, "Accept error");
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("IPC server shutting down");
                    break;
                }
            }
        }

        let _ = std::fs::remove_file(&self.socket_path);

        Ok(())
    }
}

/// Everything a connection task needs from the server.
struct Connection {
    registry: ChannelRegistry,
    handlers: Handlers,
    disconnect_fn: DisconnectHook,
    shutdown_rx: broadcast::Receiver<()>,
}

impl Connection {
    async fn serve(self, stream: UnixStream) -> IpcResult<()> {
        let Connection {
            registry,
            handlers,
            disconnect_fn,
            mut shutdown_rx,
        } = self;

        let session_id = SessionId::new();
        let mut events = registry.connect(session_id.clone())?;
        let ctx = SessionContext::new(session_id.clone(), registry.clone());

        let (reader, mut writer) = stream.into_split();
        let mut lines = BufReader::new(reader).lines();

        debug!(session_id = %session_id, "Client connected");

        let result = loop {
            tokio::select! {
                line = lines.next_line() => {
                    match line {
                        Ok(Some(line)) => {
                            let trimmed = line.trim();
                            if trimmed.is_empty() {
                                continue;
                            }
                            let response = dispatch(&handlers, &ctx, trimmed).await;
                            if let Err(e) = write_frame(&mut writer, &Frame::Response(response)).await {
                                break Err(e);
                            }
                        }
                        Ok(None) => {
                            debug!(session_id = %session_id, "Client disconnected");
                            break Ok(());
                        }
                        Err(e) => break Err(e.into()),
                    }
                }
                event = events.recv() => {
                    match event {
                        Some(event) => {
                            if let Err(e) = write_frame(&mut writer, &Frame::Event(event)).await {
                                debug!(session_id = %session_id, error = %e, "Failed to write event, client gone");
                                break Ok(());
                            }
                        }
                        None => {
                            debug!(session_id = %session_id, "Registry closed the session");
                            break Ok(());
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    debug!(session_id = %session_id, "Closing session for shutdown");
                    break Ok(());
                }
            }
        };

        registry.disconnect(&session_id);
        if let Some(hook) = disconnect_fn.read().await.as_ref() {
            hook(ctx).await;
        }
        info!(session_id = %session_id, "Session ended");

        result
    }
}

async fn dispatch(handlers: &Handlers, ctx: &SessionContext, line: &str) -> Response {
    let request = match Request::from_json(line) {
        Ok(req) => req,
        Err(e) => {
            warn!(error = %e, "Failed to parse request");
            return Response::error("", error_codes::PARSE_ERROR, &format!("Parse error: {}", e));
        }
    };

    debug!(session_id = %ctx.session_id(), method = ?request.method, id = %request.id, "Received request");

    let handlers = handlers.read().await;
    match handlers.get(&request.method) {
        Some(handler) => handler(ctx.clone(), request).await,
        None => Response::error(
            &request.id,
            error_codes::METHOD_NOT_FOUND,
            &format!("Method not found: {:?}", request.method),
        ),
    }
}

async fn write_frame(writer: &mut OwnedWriteHalf, frame: &Frame) -> IpcResult<()> {
    let json = frame.to_json()?;
    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}
