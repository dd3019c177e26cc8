use crate::codec::Frame;
use crate::error::SessionError;
use crate::listener::{ListenerRegistry, SessionListener};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep, timeout};

/// How long to idle when no listeners are registered before rechecking
const NO_LISTENER_IDLE: Duration = Duration::from_millis(50);

/// Bound on one queue wait, so the listener snapshot is refreshed
/// regularly even when the device is quiet
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Frame-dispatching loop: drain the hand-off queue and fan each frame
/// out to every registered listener, in registration order.
///
/// With no listeners registered the loop idles without popping, so frames
/// stay queued until a listener appears. A `Disconnected` frame is
/// delivered to every listener's error handler and then ends the loop;
/// nothing more is dispatched until a fresh connect starts a new pair of
/// loops.
pub(crate) async fn run(
    mut frames: mpsc::Receiver<Frame>,
    registry: ListenerRegistry,
    mut shutdown: watch::Receiver<bool>,
    connected: Arc<AtomicBool>,
) {
    loop {
        let listeners = registry.snapshot();
        if listeners.is_empty() {
            tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                _ = sleep(NO_LISTENER_IDLE) => {}
            }
            continue;
        }

        let frame = tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            frame = timeout(POLL_INTERVAL, frames.recv()) => match frame {
                Ok(Some(frame)) => frame,
                // reader gone and queue drained
                Ok(None) => break,
                // nothing queued; take a fresh listener snapshot
                Err(_) => continue,
            },
        };

        // Delivery itself stays interruptible: a listener stalled in its
        // callback (say, a waiter whose buffer is full and is never
        // drained) must not keep teardown from completing. Shutdown
        // abandons the in-flight delivery.
        let disconnected = tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            disconnected = deliver(frame, &listeners, &connected) => disconnected,
        };
        if disconnected {
            break;
        }
    }
}

/// Fan one frame out to the snapshot. Returns true for a terminal
/// `Disconnected` frame.
async fn deliver(
    frame: Frame,
    listeners: &[Arc<dyn SessionListener>],
    connected: &AtomicBool,
) -> bool {
    match frame {
        Frame::Response(text) => {
            for listener in listeners {
                if let Err(e) = listener.on_response(&text).await {
                    tracing::warn!("Listener failed on response {:?}: {}", text, e);
                }
            }
            false
        }
        Frame::Disconnected(cause) => {
            connected.store(false, Ordering::SeqCst);
            let error = SessionError::ConnectionClosed(cause);
            for listener in listeners {
                if let Err(e) = listener.on_error(&error).await {
                    tracing::warn!("Listener failed on error notification: {}", e);
                }
            }
            true
        }
    }
}
