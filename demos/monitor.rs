//! Interactive session monitor: connect to a device, print every
//! response frame, and forward stdin lines as commands.
//!
//! ```text
//! cargo run --example monitor -- 192.168.1.50 23
//! ```

use async_trait::async_trait;
use avtelnet::{ResponseWaiter, Session, SessionError, SessionListener, DEFAULT_RESPONSE_TIMEOUT};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

struct Printer;

#[async_trait]
impl SessionListener for Printer {
    async fn on_response(&self, response: &str) -> avtelnet::Result<()> {
        println!("<- {:?}", response);
        Ok(())
    }

    async fn on_error(&self, error: &SessionError) -> avtelnet::Result<()> {
        println!("!! {}", error);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "avtelnet=debug".into()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let host = args.next().unwrap_or_else(|| "127.0.0.1".to_string());
    let port: u16 = args.next().as_deref().unwrap_or("23").parse()?;

    let session = Session::new(host, port);
    session.add_listener(Arc::new(Printer));
    session.connect().await?;
    println!("connected; type commands, Ctrl-D to quit");

    // Devices with IP login enabled greet with a "Login: " prompt; it
    // shows up through Printer like any other frame. Answer it by
    // typing the username.
    let waiter = Arc::new(ResponseWaiter::new());
    session.add_listener(waiter.clone());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        session.send_command(line.trim()).await?;
        match waiter.response(DEFAULT_RESPONSE_TIMEOUT).await {
            Ok(reply) => println!("reply: {:?}", reply),
            Err(e) => {
                println!("no reply: {}", e);
                if !session.is_connected() {
                    break;
                }
            }
        }
    }

    session.disconnect().await?;
    Ok(())
}
