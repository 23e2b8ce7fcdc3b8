use tokio::io::AsyncRead;

use crate::http::body::{read_body, BodyFraming};
use crate::http::buffer::ByteAccumulator;
use crate::http::error::{ParseError, ReadError};
use crate::http::headers::{find_crlf, CRLF};
use crate::http::request::{ParserState, Request, RequestLine};

const HTTP_VERSION: &str = "HTTP/1.1";

/// Parses the request line at the start of `data`.
///
/// Returns `Ok(None)` when no CRLF has arrived yet; otherwise the parsed line
/// and the number of bytes consumed, CRLF included.
pub fn parse_request_line(data: &[u8]) -> Result<Option<(RequestLine, usize)>, ParseError> {
    let Some(idx) = find_crlf(data) else {
        return Ok(None);
    };

    let line = std::str::from_utf8(&data[..idx]).map_err(|_| ParseError::MalformedRequestLine)?;

    let parts: Vec<&str> = line.split(' ').collect();
    let [method, target, version] = parts.as_slice() else {
        return Err(ParseError::MalformedRequestLine);
    };

    if method.is_empty() || target.is_empty() {
        return Err(ParseError::MalformedRequestLine);
    }

    if *version != HTTP_VERSION {
        return Err(match version.strip_prefix("HTTP/") {
            Some(other) if !other.is_empty() => {
                ParseError::UnsupportedHttpVersion(other.to_string())
            }
            _ => ParseError::MalformedRequestLine,
        });
    }

    let request_line = RequestLine {
        method: method.to_string(),
        target: target.to_string(),
        version: "1.1".to_string(),
    };

    Ok(Some((request_line, idx + CRLF.len())))
}

impl Request {
    /// Advances parsing as far as `data` allows.
    ///
    /// `data` is the unconsumed input; the return value is how many of its
    /// leading bytes were consumed and must be discarded before the next call.
    /// Calling again after `Done` consumes nothing. Calling again after an
    /// error fails with [`ParseError::RequestInErrorState`].
    pub fn parse(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        if self.is_error() {
            return Err(ParseError::RequestInErrorState);
        }

        let mut read = 0;
        while !self.state().is_terminal() {
            let step = match self.state() {
                ParserState::Init | ParserState::RequestLine => {
                    self.parse_request_line_step(&data[read..])
                }
                ParserState::Headers => self.parse_headers_step(&data[read..]),
                ParserState::Body => self.parse_body_step(&data[read..]),
                ParserState::Done | ParserState::Error => break,
            };

            match step {
                Ok(0) => break,
                Ok(n) => read += n,
                Err(e) => {
                    self.transition(ParserState::Error);
                    return Err(e);
                }
            }
        }

        Ok(read)
    }

    fn parse_request_line_step(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        match parse_request_line(data)? {
            Some((request_line, n)) => {
                self.request_line = request_line;
                self.transition(ParserState::Headers);
                Ok(n)
            }
            None => {
                if !data.is_empty() && self.state() == ParserState::Init {
                    self.transition(ParserState::RequestLine);
                }
                Ok(0)
            }
        }
    }

    fn parse_headers_step(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        let (n, done) = self.headers.parse(data)?;

        if done {
            self.framing = BodyFraming::from_headers(&self.headers)?;
            match self.framing {
                BodyFraming::None => self.transition(ParserState::Done),
                BodyFraming::ContentLength(_) => self.transition(ParserState::Body),
            }
        }

        Ok(n)
    }

    fn parse_body_step(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        let declared = self.content_length().unwrap_or(0);
        let (n, done) = read_body(&mut self.body, declared, data)?;

        if done {
            self.transition(ParserState::Done);
        }

        Ok(n)
    }

    /// Reads one request from `reader`, buffering through `acc`.
    ///
    /// Bytes already in `acc` are parsed before anything is read. Returns
    /// `Ok(None)` if the stream ends before any byte of a request arrived,
    /// and [`ParseError::TruncatedRequest`] if it ends part way through one.
    pub async fn read_from<R>(
        reader: &mut R,
        acc: &mut ByteAccumulator,
    ) -> Result<Option<Request>, ReadError>
    where
        R: AsyncRead + Unpin,
    {
        let mut request = Request::new();
        let mut received = acc.len();

        loop {
            let consumed = request.parse(acc.as_slice())?;
            acc.consume(consumed);

            if request.is_done() {
                return Ok(Some(request));
            }

            let n = acc.read_from(reader).await?;
            if n == 0 {
                if received == 0 {
                    return Ok(None);
                }
                return Err(ParseError::TruncatedRequest { received }.into());
            }
            received += n;
        }
    }
}
