//! Error types for request parsing and response writing.

use std::io;

use crate::http::writer::WriterState;

/// Errors produced while parsing a request.
///
/// Running out of input is not an error: the parsers report it by consuming
/// zero bytes, and the caller reads more from the transport.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The request line is not `METHOD SP TARGET SP VERSION`.
    #[error("malformed request line")]
    MalformedRequestLine,

    /// The request line names an HTTP version other than 1.1.
    #[error("unsupported http version: {0}")]
    UnsupportedHttpVersion(String),

    /// A header name contains whitespace before the colon or a non-token byte.
    #[error("malformed header name")]
    MalformedHeaderName,

    /// A field-line has no colon or is not valid UTF-8.
    #[error("malformed header field")]
    MalformedHeaderField,

    /// More body bytes arrived than `Content-Length` declared.
    #[error("body length exceeded: declared {declared}, received {received}")]
    BodyLengthExceeded { declared: usize, received: usize },

    /// The request declared a transfer coding the parser does not decode.
    #[error("unsupported body encoding: {0}")]
    UnsupportedBodyEncoding(String),

    /// `parse` was called again after a previous call failed.
    #[error("request in error state")]
    RequestInErrorState,

    /// The transport closed after part of a request had been received.
    #[error("truncated request: stream ended after {received} bytes")]
    TruncatedRequest { received: usize },
}

/// Errors produced while reading a request from a transport.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Errors produced by [`ResponseWriter`](crate::http::writer::ResponseWriter).
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// A write operation was called out of order.
    #[error("cannot {attempted} while writer is in {state:?} state")]
    OrderViolation {
        state: WriterState,
        attempted: &'static str,
    },

    /// The numeric status code has no entry in the status table.
    #[error("unrecognized status code: {0}")]
    UnrecognizedStatusCode(u16),

    /// A trailer field was not announced in the `Trailer` header.
    #[error("trailer not declared: {0}")]
    UndeclaredTrailer(String),

    /// The underlying transport write failed.
    #[error("transport error: {0}")]
    Transport(#[from] io::Error),
}
