//! HTTP/1.1 protocol implementation.
//!
//! This module parses requests from arbitrarily fragmented byte streams and
//! streams responses back, including chunked bodies with trailers.
//!
//! # Architecture
//!
//! - **`buffer`**: Accumulates transport reads; the parser consumes a prefix at a time
//! - **`headers`**: Case-insensitive, folding header map and field-line parser
//! - **`parser`**: Request-line parser and the re-entrant request state machine
//! - **`body`**: `Content-Length` body framing
//! - **`request`**: Parsed request and parser state
//! - **`response`**: Status code table and default headers
//! - **`writer`**: Ordered response writer and chunk encoder
//! - **`connection`**: Drives one transport through read, handle, write
//! - **`error`**: Parse and write error types
//!
//! # Request Parser State Machine
//!
//! ```text
//!   Init ──► RequestLine ──► Headers ──► Body ──► Done
//!     │           │             │          ▲
//!     │           │             └──────────┼──► Done  (no body declared)
//!     └───────────┴─────────────┴──────────┴──► Error (absorbing)
//! ```
//!
//! `Request::parse` may be called any number of times with the unconsumed
//! bytes; it returns how many it consumed, and the caller discards exactly
//! that prefix before reading more from the transport.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use httpwire::http::connection::Connection;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let listener = TcpListener::bind("127.0.0.1:42069").await?;
//!     let handler = Arc::new(MyHandler);
//!
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         let handler = handler.clone();
//!         tokio::spawn(async move {
//!             let mut conn = Connection::new(socket, handler);
//!             if let Err(e) = conn.run().await {
//!                 eprintln!("Connection error: {}", e);
//!             }
//!         });
//!     }
//! }
//! ```

pub mod body;
pub mod buffer;
pub mod connection;
pub mod error;
pub mod headers;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
