use crate::codec::Frame;
use crate::connection::Connection;
use crate::error::{Result, SessionError};
use crate::listener::{ListenerRegistry, SessionListener};
use crate::{dispatcher, reader};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;

/// Default bound on a connect attempt
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(2000);

/// Depth of the hand-off queue between the reader and dispatcher loops.
/// A full queue blocks the reader (back-pressure), never drops frames.
const FRAME_QUEUE_DEPTH: usize = 32;

/// Everything that exists only while a connection is live
struct Active {
    connection: Connection,
    shutdown: watch::Sender<bool>,
    reader: JoinHandle<()>,
    dispatcher: JoinHandle<()>,
}

/// A persistent line-oriented control session to one device.
///
/// Construction performs no I/O. [`connect`](Session::connect) opens the
/// socket and starts the two worker loops (reader and dispatcher);
/// [`disconnect`](Session::disconnect) stops both and closes the socket.
/// A session may be reconnected any number of times, and calling
/// `connect` while connected tears the old connection down first.
///
/// Responses are pushed to registered [`SessionListener`]s in decode
/// order. The device serializes all interactions on the one physical
/// session, so ordering is FIFO per session, not per caller: with
/// concurrent senders a listener may observe a reply to a command some
/// other caller sent. The protocol carries no correlation IDs to do
/// better.
pub struct Session {
    host: String,
    port: u16,
    listeners: ListenerRegistry,
    connected: Arc<AtomicBool>,
    active: Mutex<Option<Active>>,
}

impl Session {
    /// Create a session for the device at `host:port` without connecting
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            listeners: ListenerRegistry::new(),
            connected: Arc::new(AtomicBool::new(false)),
            active: Mutex::new(None),
        }
    }

    /// Connect with [`DEFAULT_CONNECT_TIMEOUT`]
    pub async fn connect(&self) -> Result<()> {
        self.connect_with_timeout(DEFAULT_CONNECT_TIMEOUT).await
    }

    /// Open the socket and start the reader and dispatcher loops.
    ///
    /// If already connected this disconnects first; frames still queued
    /// from the previous connection are discarded with it.
    pub async fn connect_with_timeout(&self, connect_timeout: Duration) -> Result<()> {
        let mut active = self.active.lock().await;
        if let Some(prior) = active.take() {
            tracing::info!("Reconnect requested, tearing down current connection");
            self.teardown(prior).await;
        }

        let (connection, conn_reader) =
            Connection::open(&self.host, self.port, connect_timeout).await?;

        let (frame_tx, frame_rx) = mpsc::channel::<Frame>(FRAME_QUEUE_DEPTH);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        self.connected.store(true, Ordering::SeqCst);
        let reader = tokio::spawn(reader::run(
            conn_reader,
            frame_tx,
            shutdown_rx.clone(),
            self.connected.clone(),
        ));
        let dispatcher = tokio::spawn(dispatcher::run(
            frame_rx,
            self.listeners.clone(),
            shutdown_rx,
            self.connected.clone(),
        ));

        *active = Some(Active {
            connection,
            shutdown: shutdown_tx,
            reader,
            dispatcher,
        });
        Ok(())
    }

    /// Stop both loops, close the socket, and drop any queued frames.
    ///
    /// Idempotent: disconnecting an already-disconnected session is a
    /// no-op. Returns once both loops have terminated, so no tasks leak
    /// across reconnect cycles.
    pub async fn disconnect(&self) -> Result<()> {
        let mut active = self.active.lock().await;
        if let Some(prior) = active.take() {
            self.teardown(prior).await;
        }
        Ok(())
    }

    async fn teardown(&self, mut active: Active) {
        self.connected.store(false, Ordering::SeqCst);
        // Signal first, close the socket after both loops have stopped;
        // a clean disconnect must not surface as a connection error.
        let _ = active.shutdown.send(true);
        let _ = active.reader.await;
        let _ = active.dispatcher.await;
        active.connection.close().await;
        tracing::info!("Disconnected from {}:{}", self.host, self.port);
    }

    /// Whether the session currently holds a live connection.
    ///
    /// Turns false as soon as the reader observes the connection die,
    /// not only after an explicit [`disconnect`](Session::disconnect).
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Send one command to the device; `\r\n` is appended on the wire.
    ///
    /// Fails with [`SessionError::NotConnected`] when the session is
    /// down; commands are not queued. Any reply arrives later through
    /// the listener path.
    pub async fn send_command(&self, command: &str) -> Result<()> {
        let mut active = self.active.lock().await;
        match active.as_mut() {
            Some(active) if self.connected.load(Ordering::SeqCst) => {
                active.connection.send(command).await
            }
            _ => Err(SessionError::NotConnected),
        }
    }

    /// Register a listener. Listeners survive reconnects; registering
    /// the same handle twice doubles its deliveries.
    pub fn add_listener(&self, listener: Arc<dyn SessionListener>) {
        self.listeners.add(listener);
    }

    /// Remove a previously registered listener; a no-op if absent
    pub fn remove_listener(&self, listener: &Arc<dyn SessionListener>) {
        self.listeners.remove(listener);
    }

    /// Remove all registered listeners
    pub fn clear_listeners(&self) {
        self.listeners.clear();
    }
}
