//! Request body framing.
//!
//! Only `Content-Length` framing is decoded. A request that declares a
//! `Transfer-Encoding` is rejected instead of being read as a raw body.

use crate::http::error::ParseError;
use crate::http::headers::Headers;

/// How the body following a header block is delimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFraming {
    /// No body follows the headers.
    None,
    /// Exactly this many bytes follow the headers.
    ContentLength(usize),
}

impl BodyFraming {
    /// Determines the framing from a completed header block.
    ///
    /// A missing, zero or non-numeric `Content-Length` means no body. Only
    /// plain ASCII digits count as numeric, so a sign is never accepted.
    pub fn from_headers(headers: &Headers) -> Result<Self, ParseError> {
        if let Some(coding) = headers.get("Transfer-Encoding") {
            return Err(ParseError::UnsupportedBodyEncoding(coding.to_string()));
        }

        let declared = headers
            .get("Content-Length")
            .filter(|v| !v.is_empty() && v.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(0);

        Ok(match declared {
            0 => BodyFraming::None,
            n => BodyFraming::ContentLength(n),
        })
    }
}

/// Moves body bytes from `data` into `body` until `declared` bytes are held.
///
/// Returns the bytes consumed and whether the body is complete. Input that
/// goes past the declared length is a framing desync and fails the request.
///
/// The overflow check only sees the bytes passed to this call. Excess bytes
/// that arrive after the body already completed are never offered here, so
/// whether an over-long body fails depends on how the reads were split:
/// `abcd` in one read fails, while `abc` then `d` completes with `abc` and
/// leaves `d` unconsumed. Callers that need to detect trailing bytes must
/// inspect what remains buffered after [`Done`](crate::http::request::ParserState::Done).
pub fn read_body(
    body: &mut Vec<u8>,
    declared: usize,
    data: &[u8],
) -> Result<(usize, bool), ParseError> {
    let remaining = declared.saturating_sub(body.len());

    if data.len() > remaining {
        return Err(ParseError::BodyLengthExceeded {
            declared,
            received: body.len() + data.len(),
        });
    }

    body.extend_from_slice(data);
    Ok((data.len(), body.len() == declared))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(fields: &[(&str, &str)]) -> Headers {
        let mut h = Headers::new();
        for (name, value) in fields {
            h.set(name, value);
        }
        h
    }

    #[test]
    fn test_framing_without_content_length() {
        let framing = BodyFraming::from_headers(&headers(&[("Host", "a")])).unwrap();
        assert_eq!(framing, BodyFraming::None);
    }

    #[test]
    fn test_framing_zero_and_invalid_mean_no_body() {
        let zero = BodyFraming::from_headers(&headers(&[("Content-Length", "0")])).unwrap();
        assert_eq!(zero, BodyFraming::None);

        let junk =
            BodyFraming::from_headers(&headers(&[("Content-Length", "ten")])).unwrap();
        assert_eq!(junk, BodyFraming::None);
    }

    #[test]
    fn test_framing_rejects_signed_length() {
        for value in ["+5", "-5", " 5", ""] {
            let framing =
                BodyFraming::from_headers(&headers(&[("Content-Length", value)])).unwrap();
            assert_eq!(framing, BodyFraming::None, "Content-Length: {value:?}");
        }
    }

    #[test]
    fn test_framing_content_length() {
        let framing =
            BodyFraming::from_headers(&headers(&[("content-length", "13")])).unwrap();
        assert_eq!(framing, BodyFraming::ContentLength(13));
    }

    #[test]
    fn test_framing_rejects_chunked() {
        let err = BodyFraming::from_headers(&headers(&[
            ("Transfer-Encoding", "chunked"),
            ("Content-Length", "5"),
        ]))
        .unwrap_err();
        assert_eq!(err, ParseError::UnsupportedBodyEncoding("chunked".into()));
    }

    #[test]
    fn test_read_body_in_pieces() {
        let mut body = Vec::new();

        assert_eq!(read_body(&mut body, 5, b"he").unwrap(), (2, false));
        assert_eq!(read_body(&mut body, 5, b"").unwrap(), (0, false));
        assert_eq!(read_body(&mut body, 5, b"llo").unwrap(), (3, true));
        assert_eq!(body, b"hello");
    }

    #[test]
    fn test_read_body_counts_bytes_not_chars() {
        let text = "h\u{e9}";
        let mut body = Vec::new();

        let (n, done) = read_body(&mut body, 3, text.as_bytes()).unwrap();
        assert_eq!(n, 3);
        assert!(done);
    }

    #[test]
    fn test_read_body_overflow() {
        let mut body = b"ab".to_vec();
        let err = read_body(&mut body, 3, b"cd").unwrap_err();

        assert_eq!(
            err,
            ParseError::BodyLengthExceeded {
                declared: 3,
                received: 4
            }
        );
        assert_eq!(body, b"ab");
    }
}
