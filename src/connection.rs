use crate::error::{Result, SessionError};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::time::timeout;

const READ_BUFFER_SIZE: usize = 1024;

/// Bound on one command write. A peer that stops reading fills the TCP
/// send buffer and would otherwise stall the writer forever.
const WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Write side of one live socket. Owns the only handle used for sending;
/// the paired [`ConnectionReader`] owns the receive side so reads and
/// writes proceed concurrently.
pub(crate) struct Connection {
    writer: OwnedWriteHalf,
}

/// Read side of one live socket, consumed by the reader loop.
pub(crate) struct ConnectionReader {
    reader: OwnedReadHalf,
    buf: Box<[u8; READ_BUFFER_SIZE]>,
}

impl Connection {
    /// Open a TCP connection to the device, bounded by `connect_timeout`.
    pub async fn open(
        host: &str,
        port: u16,
        connect_timeout: Duration,
    ) -> Result<(Connection, ConnectionReader)> {
        let addr = format!("{}:{}", host, port);
        tracing::info!("Connecting to {}", addr);

        let stream = timeout(connect_timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| SessionError::ConnectTimeout(connect_timeout))??;
        stream.set_nodelay(true)?;

        let (reader, writer) = stream.into_split();
        Ok((
            Connection { writer },
            ConnectionReader {
                reader,
                buf: Box::new([0u8; READ_BUFFER_SIZE]),
            },
        ))
    }

    /// Send one command body; the CRLF terminator is appended here.
    /// The write is bounded by [`WRITE_TIMEOUT`] and reports a timed-out
    /// I/O error if the peer has stopped reading.
    pub async fn send(&mut self, command: &str) -> Result<()> {
        tracing::debug!("Sending: {}", command);
        timeout(WRITE_TIMEOUT, async {
            self.writer.write_all(command.as_bytes()).await?;
            self.writer.write_all(b"\r\n").await?;
            self.writer.flush().await
        })
        .await
        .map_err(|_| {
            SessionError::Io(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "write stalled, peer not reading",
            ))
        })??;
        Ok(())
    }

    /// Half-close the socket. Failures are irrelevant at teardown.
    pub async fn close(&mut self) {
        let _ = self.writer.shutdown().await;
    }
}

impl ConnectionReader {
    /// Block until the device sends something. Returns `None` on a clean
    /// end of stream (server closed the connection).
    pub async fn read_chunk(&mut self) -> std::io::Result<Option<Vec<u8>>> {
        let n = self.reader.read(&mut self.buf[..]).await?;
        if n == 0 {
            Ok(None)
        } else {
            Ok(Some(self.buf[..n].to_vec()))
        }
    }
}
