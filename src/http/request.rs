use crate::http::body::BodyFraming;
use crate::http::headers::Headers;

/// Progress of a [`Request`] through parsing.
///
/// States only move forward, in declaration order, except that any
/// non-terminal state may jump to `Error`. `Done` and `Error` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ParserState {
    /// No bytes seen yet.
    Init,
    /// Part of the request line is buffered, waiting for its CRLF.
    RequestLine,
    /// Reading field-lines up to the blank line.
    Headers,
    /// Reading a `Content-Length` body.
    Body,
    /// A complete request has been parsed.
    Done,
    /// Parsing failed; no further input is examined.
    Error,
}

impl ParserState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ParserState::Done | ParserState::Error)
    }
}

/// The first line of a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestLine {
    /// Method token, verbatim (e.g. "GET").
    pub method: String,
    /// Request target, verbatim (e.g. "/index.html?x=1").
    pub target: String,
    /// Protocol version without the `HTTP/` prefix; always "1.1".
    pub version: String,
}

/// A request being parsed, or parsed, from one connection.
///
/// Built empty by [`Request::new`] and filled in by repeated calls to
/// [`Request::parse`]. Once the state is terminal the
/// request no longer changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub(crate) request_line: RequestLine,
    pub(crate) headers: Headers,
    pub(crate) body: Vec<u8>,
    pub(crate) framing: BodyFraming,
    state: ParserState,
}

impl Default for Request {
    fn default() -> Self {
        Self::new()
    }
}

impl Request {
    pub fn new() -> Self {
        Self {
            request_line: RequestLine::default(),
            headers: Headers::new(),
            body: Vec::new(),
            framing: BodyFraming::None,
            state: ParserState::Init,
        }
    }

    pub fn request_line(&self) -> &RequestLine {
        &self.request_line
    }

    pub fn method(&self) -> &str {
        &self.request_line.method
    }

    pub fn target(&self) -> &str {
        &self.request_line.target
    }

    pub fn version(&self) -> &str {
        &self.request_line.version
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Retrieves a header value by name, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The declared body length, if the request carries a body.
    pub fn content_length(&self) -> Option<usize> {
        match self.framing {
            BodyFraming::ContentLength(n) => Some(n),
            BodyFraming::None => None,
        }
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == ParserState::Done
    }

    pub fn is_error(&self) -> bool {
        self.state == ParserState::Error
    }

    /// Moves the parser to `next`. The only way the state changes.
    pub(crate) fn transition(&mut self, next: ParserState) {
        debug_assert!(
            !self.state.is_terminal() && (next == ParserState::Error || next > self.state),
            "invalid parser transition {:?} -> {:?}",
            self.state,
            next
        );
        tracing::trace!(from = ?self.state, to = ?next, "request parser transition");
        self.state = next;
    }
}
