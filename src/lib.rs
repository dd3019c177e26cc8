//! Rust library for persistent telnet-style control sessions to AV
//! receivers and matrix switchers
//!
//! Legacy AV gear (receivers, HDBaseT matrix switchers, zone amps)
//! exposes a line-oriented console over a raw TCP port: commands go out
//! as CRLF-terminated ASCII, responses come back as CRLF-terminated
//! lines, with the occasional bare `Login: ` / `Password: ` prompt mixed
//! in during authentication. This library keeps one long-lived session
//! per device and takes care of the parts that are easy to get wrong:
//!
//! - A dedicated reader task decodes the raw byte stream into discrete
//!   response frames (including promptless login prompts)
//! - A dedicated dispatcher task fans frames out to registered
//!   listeners, so a slow consumer never blocks the socket directly
//! - Responses are delivered strictly in decode order
//! - Connection loss is surfaced through the same listener path, and a
//!   session can be reconnected any number of times
//! - A blocking call-and-wait adapter ([`ResponseWaiter`]) for callers
//!   that cannot work with callbacks
//!
//! # Quick Start
//!
//! ```no_run
//! use avtelnet::{Session, SessionError, SessionListener};
//! use async_trait::async_trait;
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! #[async_trait]
//! impl SessionListener for Printer {
//!     async fn on_response(&self, response: &str) -> avtelnet::Result<()> {
//!         println!("<- {}", response);
//!         Ok(())
//!     }
//!
//!     async fn on_error(&self, error: &SessionError) -> avtelnet::Result<()> {
//!         eprintln!("connection lost: {}", error);
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = Session::new("192.168.1.50", 23);
//!     session.add_listener(Arc::new(Printer));
//!     session.connect().await?;
//!
//!     session.send_command("PWON").await?;
//!     tokio::time::sleep(std::time::Duration::from_secs(2)).await;
//!
//!     session.disconnect().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Synchronous requests
//!
//! For request/reply-style interaction, register a [`ResponseWaiter`]
//! and block on it after sending. Replies are not correlated to
//! commands: the device answers strictly in arrival order on the one
//! shared session, so what comes back is the *next* response frame,
//! whoever triggered it.
//!
//! # Architecture
//!
//! - **Session**: lifecycle facade: connect/disconnect, command
//!   sending, listener registration
//! - **Connection**: socket ownership and raw read/write
//! - **codec**: framing of the byte stream into response frames
//! - **reader / dispatcher**: the two worker loops, joined by a bounded
//!   hand-off queue
//! - **ResponseWaiter**: blocking adapter over the listener interface
//!
//! Reconnect policy deliberately lives outside this crate: observe the
//! error callback and call [`Session::connect`] again when appropriate.

mod codec;
mod connection;
mod dispatcher;
mod error;
mod listener;
mod reader;
mod session;
mod waiter;

// Public exports
pub use error::{Result, SessionError};
pub use listener::SessionListener;
pub use session::{Session, DEFAULT_CONNECT_TIMEOUT};
pub use waiter::{ResponseWaiter, DEFAULT_RESPONSE_TIMEOUT};
