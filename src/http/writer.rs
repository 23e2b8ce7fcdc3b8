use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::error::WriteError;
use crate::http::headers::{Headers, CRLF};
use crate::http::response::StatusCode;

/// Terminal frame of a chunked body.
const LAST_CHUNK: &[u8] = b"0\r\n";

/// Which part of the response the writer expects next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    StatusLine,
    Headers,
    Body,
    /// The terminal chunk was written; only trailers may follow.
    Trailers,
    Done,
    /// A transport write failed; the response is abandoned.
    Failed,
}

/// Streams a response to a transport in order: status line, headers, body.
///
/// Every call renders its bytes and hands them to the transport in a single
/// `write_all`. Calls made out of order fail with
/// [`WriteError::OrderViolation`] before anything is written. Transport errors
/// are returned as they are and leave the writer in [`WriterState::Failed`].
pub struct ResponseWriter<W> {
    writer: W,
    state: WriterState,
    declared_trailers: Vec<String>,
}

impl<W> ResponseWriter<W>
where
    W: AsyncWrite + Unpin,
{
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            state: WriterState::StatusLine,
            declared_trailers: Vec::new(),
        }
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    pub async fn write_status_line(&mut self, status: StatusCode) -> Result<(), WriteError> {
        self.check_order(WriterState::StatusLine, "write status line")?;
        self.send(status.status_line().as_bytes()).await?;
        self.state = WriterState::Headers;
        Ok(())
    }

    /// Writes the status line for a numeric code from the status table.
    pub async fn write_status_code(&mut self, code: u16) -> Result<(), WriteError> {
        self.check_order(WriterState::StatusLine, "write status line")?;
        let status = StatusCode::try_from(code)?;
        self.write_status_line(status).await
    }

    /// Writes the header block and the blank line that ends it.
    ///
    /// Names listed in a `Trailer` header are remembered; only those may be
    /// passed to [`write_trailers`](Self::write_trailers) later.
    pub async fn write_headers(&mut self, headers: &Headers) -> Result<(), WriteError> {
        self.check_order(WriterState::Headers, "write headers")?;

        let mut buf = Vec::new();
        write_fields(&mut buf, headers);
        buf.extend_from_slice(CRLF);
        self.send(&buf).await?;

        self.declared_trailers = headers
            .values("Trailer")
            .map(str::to_ascii_lowercase)
            .collect();
        self.state = WriterState::Body;
        Ok(())
    }

    /// Writes raw body bytes. The caller is responsible for `Content-Length`.
    pub async fn write_body(&mut self, body: &[u8]) -> Result<usize, WriteError> {
        self.check_order(WriterState::Body, "write body")?;
        self.send(body).await?;
        Ok(body.len())
    }

    /// Writes `chunk` as one chunked-encoding frame.
    ///
    /// An empty chunk writes nothing, since a zero-length frame would end
    /// the body.
    pub async fn write_chunked_body(&mut self, chunk: &[u8]) -> Result<usize, WriteError> {
        self.check_order(WriterState::Body, "write chunked body")?;
        if chunk.is_empty() {
            return Ok(0);
        }
        self.send(&encode_chunk(chunk)).await?;
        Ok(chunk.len())
    }

    /// Writes the terminal zero-length chunk.
    pub async fn write_chunked_body_done(&mut self) -> Result<(), WriteError> {
        self.check_order(WriterState::Body, "finish chunked body")?;
        self.send(LAST_CHUNK).await?;
        self.state = WriterState::Trailers;
        Ok(())
    }

    /// Writes trailer fields and the final blank line.
    ///
    /// Every name must have been declared in the `Trailer` header; otherwise
    /// nothing is written.
    pub async fn write_trailers(&mut self, trailers: &Headers) -> Result<(), WriteError> {
        self.check_order(WriterState::Trailers, "write trailers")?;

        if let Some((name, _)) = trailers
            .iter()
            .find(|(name, _)| !self.declared_trailers.contains(&name.to_ascii_lowercase()))
        {
            return Err(WriteError::UndeclaredTrailer(name.to_string()));
        }

        let mut buf = Vec::new();
        write_fields(&mut buf, trailers);
        buf.extend_from_slice(CRLF);
        self.send(&buf).await?;

        self.state = WriterState::Done;
        Ok(())
    }

    /// Flushes the transport once the response is complete.
    pub async fn flush(&mut self) -> Result<(), WriteError> {
        self.writer.flush().await?;
        Ok(())
    }

    fn check_order(&self, expected: WriterState, attempted: &'static str) -> Result<(), WriteError> {
        if self.state != expected {
            return Err(WriteError::OrderViolation {
                state: self.state,
                attempted,
            });
        }
        Ok(())
    }

    async fn send(&mut self, buf: &[u8]) -> Result<(), WriteError> {
        if let Err(e) = self.writer.write_all(buf).await {
            self.state = WriterState::Failed;
            return Err(WriteError::Transport(e));
        }
        Ok(())
    }
}

/// Renders one chunk frame: hex length, CRLF, payload, CRLF.
pub fn encode_chunk(payload: &[u8]) -> Vec<u8> {
    let size = format!("{:x}", payload.len());

    let mut frame = Vec::with_capacity(size.len() + payload.len() + 2 * CRLF.len());
    frame.extend_from_slice(size.as_bytes());
    frame.extend_from_slice(CRLF);
    frame.extend_from_slice(payload);
    frame.extend_from_slice(CRLF);
    frame
}

fn write_fields(buf: &mut Vec<u8>, fields: &Headers) {
    for (name, value) in fields.iter() {
        buf.extend_from_slice(name.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(value.as_bytes());
        buf.extend_from_slice(CRLF);
    }
}
