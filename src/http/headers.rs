use std::collections::HashMap;

use crate::http::error::ParseError;

pub(crate) const CRLF: &[u8] = b"\r\n";

/// Punctuation allowed in a header name besides ASCII letters and digits.
const TOKEN_PUNCTUATION: &[u8] = b"!#$%&'*+-.^_`|~";

/// Case-insensitive header map that folds repeated names.
///
/// Names are normalized to lower case on every operation, so callers never
/// lower-case themselves. Setting a name that is already present appends the
/// new value after `", "` instead of replacing it. The spelling used the first
/// time a name was inserted is kept for serialization only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    fields: HashMap<String, Field>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Field {
    name: String,
    value: String,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a header value, ignoring the case of `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .get(&name.to_ascii_lowercase())
            .map(|f| f.value.as_str())
    }

    /// Iterates the comma-separated elements of a list-valued header.
    pub fn values<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> + use<'a> {
        self.get(name)
            .into_iter()
            .flat_map(|v| v.split(','))
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(&name.to_ascii_lowercase())
    }

    /// Inserts a value, folding it into an existing one with `", "`.
    pub fn set(&mut self, name: &str, value: &str) {
        self.fields
            .entry(name.to_ascii_lowercase())
            .and_modify(|f| {
                f.value.push_str(", ");
                f.value.push_str(value);
            })
            .or_insert_with(|| Field {
                name: name.to_string(),
                value: value.to_string(),
            });
    }

    /// Inserts a value, overwriting any existing one.
    pub fn replace(&mut self, name: &str, value: &str) {
        self.fields.insert(
            name.to_ascii_lowercase(),
            Field {
                name: name.to_string(),
                value: value.to_string(),
            },
        );
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.fields
            .remove(&name.to_ascii_lowercase())
            .map(|f| f.value)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates `(name, value)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .values()
            .map(|f| (f.name.as_str(), f.value.as_str()))
    }

    /// Parses field-lines from `data` until the blank line or the end of input.
    ///
    /// Returns the bytes consumed and whether the blank line terminating the
    /// header block was reached. A field-line without its CRLF yet is left
    /// unconsumed. On error, lines validated earlier in the call stay in the map.
    pub fn parse(&mut self, data: &[u8]) -> Result<(usize, bool), ParseError> {
        let mut read = 0;

        loop {
            let Some(idx) = find_crlf(&data[read..]) else {
                return Ok((read, false));
            };

            if idx == 0 {
                return Ok((read + CRLF.len(), true));
            }

            let (name, value) = parse_field_line(&data[read..read + idx])?;
            self.set(name, value);
            read += idx + CRLF.len();
        }
    }
}

/// Splits one field-line (without its CRLF) into a validated name and value.
fn parse_field_line(line: &[u8]) -> Result<(&str, &str), ParseError> {
    let colon = line
        .iter()
        .position(|&b| b == b':')
        .ok_or(ParseError::MalformedHeaderField)?;

    // Whitespace on either side of the name fails the token check.
    let name = &line[..colon];
    if name.is_empty() || !is_token(name) {
        return Err(ParseError::MalformedHeaderName);
    }

    let name = std::str::from_utf8(name).map_err(|_| ParseError::MalformedHeaderName)?;
    let value = std::str::from_utf8(line[colon + 1..].trim_ascii())
        .map_err(|_| ParseError::MalformedHeaderField)?;

    Ok((name, value))
}

/// Returns true if every byte is legal in a header name.
pub fn is_token(name: &[u8]) -> bool {
    name.iter()
        .all(|b| b.is_ascii_alphanumeric() || TOKEN_PUNCTUATION.contains(b))
}

pub(crate) fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == CRLF)
}
