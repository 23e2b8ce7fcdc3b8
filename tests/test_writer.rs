use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use httpwire::http::error::WriteError;
use httpwire::http::headers::Headers;
use httpwire::http::response::StatusCode;
use httpwire::http::writer::{encode_chunk, ResponseWriter, WriterState};
use tokio::io::AsyncWrite;

/// Records every write call it receives.
#[derive(Default)]
struct CountingWriter {
    writes: usize,
    data: Vec<u8>,
}

impl AsyncWrite for CountingWriter {
    fn poll_write(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.writes += 1;
        self.data.extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

/// Fails every write as if the peer had gone away.
struct BrokenPipe;

impl AsyncWrite for BrokenPipe {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, "peer gone")))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

fn chunked_headers(trailers: &str) -> Headers {
    let mut headers = Headers::new();
    headers.set("Transfer-Encoding", "chunked");
    headers.set("Trailer", trailers);
    headers
}

/// Splits a response at the blank line ending the header block.
fn split_head(out: &[u8]) -> (&[u8], &[u8]) {
    let end = out
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("header block terminator");
    (&out[..end + 4], &out[end + 4..])
}

#[tokio::test]
async fn test_chunked_body_exact_bytes() {
    let mut w = ResponseWriter::new(Vec::new());
    w.write_status_line(StatusCode::Ok).await.unwrap();
    w.write_headers(&chunked_headers("X-Len")).await.unwrap();

    w.write_chunked_body(b"abc").await.unwrap();
    w.write_chunked_body(b"de").await.unwrap();
    w.write_chunked_body_done().await.unwrap();

    let mut trailers = Headers::new();
    trailers.set("X-Len", "5");
    w.write_trailers(&trailers).await.unwrap();
    assert_eq!(w.state(), WriterState::Done);

    let out = w.into_inner();
    let (head, body) = split_head(&out);
    assert!(head.starts_with(b"HTTP/1.1 200 OK\r\n"));
    assert_eq!(body, b"3\r\nabc\r\n2\r\nde\r\n0\r\nX-Len: 5\r\n\r\n");
}

#[test]
fn test_chunk_length_is_hex() {
    assert_eq!(encode_chunk(b"abc"), b"3\r\nabc\r\n");
    assert!(encode_chunk(&[0u8; 255]).starts_with(b"ff\r\n"));
    assert!(encode_chunk(&[0u8; 4096]).starts_with(b"1000\r\n"));
}

#[tokio::test]
async fn test_body_before_status_line() {
    let mut w = ResponseWriter::new(CountingWriter::default());

    let err = w.write_body(b"hello").await.unwrap_err();
    assert!(matches!(
        err,
        WriteError::OrderViolation {
            state: WriterState::StatusLine,
            ..
        }
    ));

    let inner = w.into_inner();
    assert_eq!(inner.writes, 0);
    assert!(inner.data.is_empty());
}

#[tokio::test]
async fn test_body_before_headers() {
    let mut w = ResponseWriter::new(CountingWriter::default());
    w.write_status_line(StatusCode::Ok).await.unwrap();

    let err = w.write_chunked_body(b"abc").await.unwrap_err();
    assert!(matches!(
        err,
        WriteError::OrderViolation {
            state: WriterState::Headers,
            ..
        }
    ));
    assert_eq!(w.into_inner().writes, 1);
}

#[tokio::test]
async fn test_status_line_twice() {
    let mut w = ResponseWriter::new(Vec::new());
    w.write_status_line(StatusCode::Ok).await.unwrap();

    let err = w.write_status_line(StatusCode::Ok).await.unwrap_err();
    assert!(matches!(err, WriteError::OrderViolation { .. }));
}

#[tokio::test]
async fn test_one_transport_write_per_call() {
    let mut w = ResponseWriter::new(CountingWriter::default());
    let mut headers = Headers::new();
    headers.set("Content-Length", "5");
    headers.set("Content-Type", "text/plain");

    w.write_status_line(StatusCode::Ok).await.unwrap();
    w.write_headers(&headers).await.unwrap();
    w.write_body(b"hello").await.unwrap();

    assert_eq!(w.into_inner().writes, 3);
}

#[tokio::test]
async fn test_transport_error_passes_through() {
    let mut w = ResponseWriter::new(BrokenPipe);

    let err = w.write_status_line(StatusCode::Ok).await.unwrap_err();
    match err {
        WriteError::Transport(e) => {
            assert_eq!(e.kind(), io::ErrorKind::BrokenPipe);
            assert_eq!(e.to_string(), "peer gone");
        }
        other => panic!("expected transport error, got {other:?}"),
    }
    assert_eq!(w.state(), WriterState::Failed);

    let err = w.write_headers(&Headers::new()).await.unwrap_err();
    assert!(matches!(
        err,
        WriteError::OrderViolation {
            state: WriterState::Failed,
            ..
        }
    ));
}

#[tokio::test]
async fn test_undeclared_trailer_rejected() {
    let mut w = ResponseWriter::new(CountingWriter::default());
    w.write_status_line(StatusCode::Ok).await.unwrap();
    w.write_headers(&chunked_headers("X-Content-SHA256"))
        .await
        .unwrap();
    w.write_chunked_body_done().await.unwrap();

    let mut trailers = Headers::new();
    trailers.set("X-Content-Length", "0");
    let err = w.write_trailers(&trailers).await.unwrap_err();

    assert!(matches!(err, WriteError::UndeclaredTrailer(ref name) if name == "X-Content-Length"));
    assert_eq!(w.state(), WriterState::Trailers);
    assert_eq!(w.into_inner().writes, 3);
}

#[tokio::test]
async fn test_trailer_names_match_ignoring_case() {
    let mut w = ResponseWriter::new(Vec::new());
    w.write_status_line(StatusCode::Ok).await.unwrap();
    w.write_headers(&chunked_headers("x-content-sha256, X-CONTENT-LENGTH"))
        .await
        .unwrap();
    w.write_chunked_body(b"hi").await.unwrap();
    w.write_chunked_body_done().await.unwrap();

    let mut trailers = Headers::new();
    trailers.set("X-Content-Length", "2");
    w.write_trailers(&trailers).await.unwrap();

    let out = w.into_inner();
    let (_, body) = split_head(&out);
    assert_eq!(body, b"2\r\nhi\r\n0\r\nX-Content-Length: 2\r\n\r\n");
}

#[tokio::test]
async fn test_empty_trailers() {
    let mut w = ResponseWriter::new(Vec::new());
    w.write_status_line(StatusCode::Ok).await.unwrap();
    w.write_headers(&chunked_headers("")).await.unwrap();
    w.write_chunked_body(b"x").await.unwrap();
    w.write_chunked_body_done().await.unwrap();
    w.write_trailers(&Headers::new()).await.unwrap();

    let out = w.into_inner();
    let (_, body) = split_head(&out);
    assert_eq!(body, b"1\r\nx\r\n0\r\n\r\n");
}
