use crate::codec::{Frame, ResponseDecoder};
use crate::connection::ConnectionReader;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Socket-reading loop: pull chunks, decode them, and hand completed
/// frames to the dispatcher.
///
/// A full hand-off queue blocks the send, which in turn stops further
/// reading from the socket. Frames are never dropped; slow consumers
/// back-pressure the device instead.
///
/// The loop ends on the shutdown signal (clean disconnect, nothing
/// emitted) or on a terminal read condition, which is converted into one
/// `Disconnected` frame for the listener path rather than raised here.
pub(crate) async fn run(
    mut reader: ConnectionReader,
    frames: mpsc::Sender<Frame>,
    mut shutdown: watch::Receiver<bool>,
    connected: Arc<AtomicBool>,
) {
    let mut decoder = ResponseDecoder::new();
    loop {
        let chunk = tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            chunk = reader.read_chunk() => chunk,
        };
        match chunk {
            Ok(Some(bytes)) => {
                for text in decoder.feed(&bytes) {
                    tracing::debug!("Received: {}", text);
                    if frames.send(Frame::Response(text)).await.is_err() {
                        // dispatcher is gone; the session is tearing down
                        return;
                    }
                }
            }
            Ok(None) => {
                tracing::info!("Server closed the connection");
                connected.store(false, Ordering::SeqCst);
                let _ = frames
                    .send(Frame::Disconnected("server closed connection".to_string()))
                    .await;
                break;
            }
            Err(e) => {
                tracing::warn!("Read failed: {}", e);
                connected.store(false, Ordering::SeqCst);
                let _ = frames.send(Frame::Disconnected(e.to_string())).await;
                break;
            }
        }
    }
}
