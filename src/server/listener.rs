use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tracing::{info, Instrument};

use crate::config::Config;
use crate::http::connection::{Connection, Handler};

/// Pause after a failed accept so a full fd table does not spin the loop.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Accepts connections forever, serving each on its own task.
pub async fn run<H: Handler>(cfg: &Config, handler: Arc<H>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&cfg.listen_addr).await?;
    info!("Listening on {}", cfg.listen_addr);

    loop {
        let Some((socket, peer)) = accepted(listener.accept().await) else {
            tokio::time::sleep(ACCEPT_BACKOFF).await;
            continue;
        };
        info!("Accepted connection from {}", peer);

        let handler = handler.clone();
        let span = tracing::info_span!("conn", %peer);
        tokio::spawn(
            async move {
                let mut conn = Connection::new(socket, handler);
                if let Err(e) = conn.run().await {
                    tracing::error!("Connection error from {}: {:#}", peer, e);
                }
            }
            .instrument(span),
        );
    }
}

/// Unwraps an accept result, logging failures instead of ending the server.
fn accepted(
    result: io::Result<(TcpStream, SocketAddr)>,
) -> Option<(TcpStream, SocketAddr)> {
    match result {
        Ok(conn) => Some(conn),
        Err(e) => {
            tracing::warn!("Failed to accept connection: {}", e);
            None
        }
    }
}
