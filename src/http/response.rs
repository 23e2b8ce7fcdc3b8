use crate::http::error::WriteError;
use crate::http::headers::Headers;

/// HTTP status codes the writer can emit.
///
/// New codes are added here, together with their reason phrase; the writer
/// never builds a status line from an arbitrary number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 500 Internal Server Error
    InternalServerError,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use httpwire::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::BadRequest.as_u16(), 400);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::InternalServerError => 500,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }

    /// The full status line, CRLF included.
    pub fn status_line(&self) -> String {
        format!("HTTP/1.1 {} {}\r\n", self.as_u16(), self.reason_phrase())
    }
}

impl TryFrom<u16> for StatusCode {
    type Error = WriteError;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        match code {
            200 => Ok(StatusCode::Ok),
            400 => Ok(StatusCode::BadRequest),
            500 => Ok(StatusCode::InternalServerError),
            other => Err(WriteError::UnrecognizedStatusCode(other)),
        }
    }
}

/// Headers every response starts from: a fixed-length plain-text body on a
/// connection that closes after the response.
pub fn default_headers(content_len: usize) -> Headers {
    let mut headers = Headers::new();
    headers.set("Content-Length", &content_len.to_string());
    headers.set("Connection", "close");
    headers.set("Content-Type", "text/plain");
    headers
}

/// Canned HTML page for a status code.
pub fn html_page(status: StatusCode) -> &'static [u8] {
    match status {
        StatusCode::Ok => PAGE_200.as_bytes(),
        StatusCode::BadRequest => PAGE_400.as_bytes(),
        StatusCode::InternalServerError => PAGE_500.as_bytes(),
    }
}

const PAGE_200: &str = "<html>
  <head>
    <title>200 OK</title>
  </head>
  <body>
    <h1>Success!</h1>
    <p>Your request was an absolute banger.</p>
  </body>
</html>
";

const PAGE_400: &str = "<html>
  <head>
    <title>400 Bad Request</title>
  </head>
  <body>
    <h1>Bad Request</h1>
    <p>Your request honestly kinda sucked.</p>
  </body>
</html>
";

const PAGE_500: &str = "<html>
  <head>
    <title>500 Internal Server Error</title>
  </head>
  <body>
    <h1>Internal Server Error</h1>
    <p>Okay, you know what? This one is on me.</p>
  </body>
</html>
";
