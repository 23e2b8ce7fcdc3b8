use std::future::Future;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::http::buffer::ByteAccumulator;
use crate::http::error::{ParseError, ReadError};
use crate::http::request::Request;
use crate::http::response::{default_headers, html_page, StatusCode};
use crate::http::writer::{ResponseWriter, WriterState};

/// Application callback invoked once per successfully parsed request.
///
/// All output goes through the writer. One handler value is shared by every
/// connection task, so `handle` may run concurrently from many tasks at once:
/// implementations must be stateless or synchronize their own state.
pub trait Handler: Send + Sync + 'static {
    fn handle<W>(
        &self,
        w: &mut ResponseWriter<W>,
        req: &Request,
    ) -> impl Future<Output = ()> + Send
    where
        W: AsyncWrite + Unpin + Send;
}

pub struct Connection<S, H> {
    stream: S,
    buffer: ByteAccumulator,
    handler: Arc<H>,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Rejecting(ParseError),
    Closed,
}

impl<S, H> Connection<S, H>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
    H: Handler,
{
    pub fn new(stream: S, handler: Arc<H>) -> Self {
        Self {
            stream,
            buffer: ByteAccumulator::new(),
            handler,
            state: ConnectionState::Reading,
        }
    }

    /// Serves a single request, then closes the transport.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => {
                    self.state = match Request::read_from(&mut self.stream, &mut self.buffer).await {
                        Ok(Some(req)) => ConnectionState::Processing(req),
                        Ok(None) => {
                            tracing::debug!("Peer closed before sending a request");
                            ConnectionState::Closed
                        }
                        Err(ReadError::Parse(e)) => ConnectionState::Rejecting(e),
                        Err(ReadError::Io(e)) => return Err(e).context("reading request"),
                    };
                }

                ConnectionState::Processing(req) => {
                    tracing::info!(
                        method = %req.method(),
                        target = %req.target(),
                        body_len = req.body().len(),
                        "Handling request"
                    );
                    self.respond(&req).await?;
                }

                ConnectionState::Rejecting(err) => {
                    tracing::warn!(error = %err, "Rejecting malformed request");
                    self.reject().await?;
                }

                ConnectionState::Closed => break,
            }
        }

        if let Err(e) = self.stream.shutdown().await {
            tracing::debug!(error = %e, "Shutdown after response failed");
        }
        Ok(())
    }

    async fn respond(&mut self, req: &Request) -> anyhow::Result<()> {
        let mut writer = ResponseWriter::new(&mut self.stream);
        self.handler.handle(&mut writer, req).await;

        match writer.state() {
            WriterState::Failed => anyhow::bail!("transport failed while writing response"),
            WriterState::StatusLine => tracing::warn!("Handler wrote no response"),
            _ => {}
        }

        writer.flush().await.context("flushing response")
    }

    async fn reject(&mut self) -> anyhow::Result<()> {
        let body = html_page(StatusCode::BadRequest);
        let mut headers = default_headers(body.len());
        headers.replace("Content-Type", "text/html");

        let mut writer = ResponseWriter::new(&mut self.stream);
        writer
            .write_status_line(StatusCode::BadRequest)
            .await
            .context("writing 400 status line")?;
        writer
            .write_headers(&headers)
            .await
            .context("writing 400 headers")?;
        writer
            .write_body(body)
            .await
            .context("writing 400 body")?;
        writer.flush().await.context("flushing 400 response")
    }
}
