//! httpwire - HTTP/1.1 over raw TCP
//!
//! Incremental request parsing and ordered response writing on top of any
//! byte-stream transport.

pub mod config;
pub mod demo;
pub mod http;
pub mod server;
