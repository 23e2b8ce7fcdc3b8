//! Handler served by the `httpwire` binary.
//!
//! - `/yourproblem` answers 400, `/myproblem` answers 500
//! - `/stream/<n>` streams `n` generated lines as a chunked body, with the
//!   SHA-256 and length of the whole body sent as trailers
//! - anything else answers 200

use sha2::{Digest, Sha256};
use tokio::io::AsyncWrite;

use crate::http::connection::Handler;
use crate::http::error::WriteError;
use crate::http::headers::Headers;
use crate::http::request::Request;
use crate::http::response::{default_headers, html_page, StatusCode};
use crate::http::writer::ResponseWriter;

/// Upper bound on `/stream/<n>` so one request cannot stream forever.
pub const MAX_STREAM_LINES: usize = 1000;

pub const TRAILER_SHA256: &str = "X-Content-SHA256";
pub const TRAILER_LENGTH: &str = "X-Content-Length";

#[derive(Debug, Clone, Copy, Default)]
pub struct DemoHandler;

impl Handler for DemoHandler {
    async fn handle<W>(&self, w: &mut ResponseWriter<W>, req: &Request)
    where
        W: AsyncWrite + Unpin + Send,
    {
        let target = req.target();
        let result = match target {
            "/yourproblem" => write_page(w, StatusCode::BadRequest).await,
            "/myproblem" => write_page(w, StatusCode::InternalServerError).await,
            _ => match target.strip_prefix("/stream/") {
                Some(count) => match count.parse::<usize>() {
                    Ok(n) if n <= MAX_STREAM_LINES => write_stream(w, n).await,
                    _ => write_page(w, StatusCode::BadRequest).await,
                },
                None => write_page(w, StatusCode::Ok).await,
            },
        };

        if let Err(e) = result {
            tracing::warn!(error = %e, target = %target, "Failed to write response");
        }
    }
}

async fn write_page<W>(w: &mut ResponseWriter<W>, status: StatusCode) -> Result<(), WriteError>
where
    W: AsyncWrite + Unpin,
{
    let body = html_page(status);
    let mut headers = default_headers(body.len());
    headers.replace("Content-Type", "text/html");

    w.write_status_line(status).await?;
    w.write_headers(&headers).await?;
    w.write_body(body).await?;
    Ok(())
}

async fn write_stream<W>(w: &mut ResponseWriter<W>, lines: usize) -> Result<(), WriteError>
where
    W: AsyncWrite + Unpin,
{
    let mut headers = default_headers(0);
    headers.remove("Content-Length");
    headers.replace("Transfer-Encoding", "chunked");
    headers.replace("Trailer", &format!("{TRAILER_SHA256}, {TRAILER_LENGTH}"));

    w.write_status_line(StatusCode::Ok).await?;
    w.write_headers(&headers).await?;

    let mut hasher = Sha256::new();
    let mut total = 0;
    for i in 0..lines {
        let line = format!("{i} bottles of bytes on the wire\n");
        hasher.update(line.as_bytes());
        total += w.write_chunked_body(line.as_bytes()).await?;
    }
    w.write_chunked_body_done().await?;

    let mut trailers = Headers::new();
    trailers.set(TRAILER_SHA256, &to_hex(hasher.finalize().as_slice()));
    trailers.set(TRAILER_LENGTH, &total.to_string());
    w.write_trailers(&trailers).await
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
