use crate::codec::Frame;
use crate::error::{Result, SessionError};
use crate::listener::SessionListener;
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::time::timeout;

/// Default wait used by callers of [`ResponseWaiter::response`]. The
/// device works through its command queue strictly in arrival order, so
/// a busy queue can legitimately delay a reply this long.
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(60);

/// Buffer depth between the dispatcher and a blocked caller. Logically
/// one response is outstanding per waiter, but a little slack tolerates
/// loosely-synchronized producers without stalling the dispatcher.
const RESPONSE_BACKLOG: usize = 5;

/// A listener that turns the push-based frame stream into a blocking
/// "send a command, wait for the next response" call.
///
/// Register the waiter, send the command, then call
/// [`response`](ResponseWaiter::response). Intended for one logical
/// caller at a time: sequential reuse is fine, concurrent calls
/// serialize on an internal lock and each consume one frame.
///
/// The returned response is the next frame the session decodes, not a
/// reply correlated to any particular command. With concurrent senders
/// on one session a waiter can receive the reply to a command it did not
/// send; the protocol offers nothing to tell them apart.
///
/// ```no_run
/// use avtelnet::{ResponseWaiter, Session, DEFAULT_RESPONSE_TIMEOUT};
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let session = Session::new("192.168.1.50", 23);
/// session.connect().await?;
///
/// let waiter = Arc::new(ResponseWaiter::new());
/// session.add_listener(waiter.clone());
///
/// session.send_command("Version").await?;
/// let reply = waiter.response(DEFAULT_RESPONSE_TIMEOUT).await?;
/// println!("device says: {}", reply);
/// # Ok(())
/// # }
/// ```
pub struct ResponseWaiter {
    tx: mpsc::Sender<Frame>,
    rx: Mutex<mpsc::Receiver<Frame>>,
}

impl ResponseWaiter {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(RESPONSE_BACKLOG);
        Self {
            tx,
            rx: Mutex::new(rx),
        }
    }

    /// Wait for the next frame: a response's text, the connection error
    /// that killed the session, or [`SessionError::ResponseTimeout`]
    /// once `wait` elapses.
    pub async fn response(&self, wait: Duration) -> Result<String> {
        let mut rx = self.rx.lock().await;
        match timeout(wait, rx.recv()).await {
            Ok(Some(Frame::Response(text))) => Ok(text),
            Ok(Some(Frame::Disconnected(cause))) => Err(SessionError::ConnectionClosed(cause)),
            // we hold a sender, so the channel cannot close under us
            Ok(None) => Err(SessionError::ConnectionClosed("waiter closed".to_string())),
            Err(_) => Err(SessionError::ResponseTimeout),
        }
    }
}

impl Default for ResponseWaiter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionListener for ResponseWaiter {
    async fn on_response(&self, response: &str) -> Result<()> {
        // awaited send: a caller that never drains the buffer eventually
        // back-pressures the dispatcher, and through it the reader
        self.tx
            .send(Frame::Response(response.to_string()))
            .await
            .map_err(|_| SessionError::Listener("waiter dropped".to_string()))
    }

    async fn on_error(&self, error: &SessionError) -> Result<()> {
        let cause = match error {
            SessionError::ConnectionClosed(cause) => cause.clone(),
            other => other.to_string(),
        };
        self.tx
            .send(Frame::Disconnected(cause))
            .await
            .map_err(|_| SessionError::Listener("waiter dropped".to_string()))
    }
}
