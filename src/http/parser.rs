use crate::http::request::{Method, Request};
use std::collections::HashMap;

#[derive(Debug, PartialEq, Eq)]
pub enum ParseError {
    /// Request line is missing a space, or the head is not UTF-8
    InvalidRequest,
    InvalidContentLength,
    /// More bytes are needed before a request can be produced
    Incomplete,
}

const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Parses one HTTP/1.1 request from the front of `buf`.
///
/// Returns the request and the number of bytes it occupied. When the
/// header terminator or the full `Content-Length` body has not arrived yet
/// the result is [`ParseError::Incomplete`] and the caller should read more.
pub fn parse_http_request(buf: &[u8]) -> Result<(Request, usize), ParseError> {
    let headers_end = find_headers_end(buf).ok_or(ParseError::Incomplete)?;
    let header_bytes = &buf[..headers_end];
    let body_bytes = &buf[headers_end + HEADER_TERMINATOR.len()..];

    let headers_str = std::str::from_utf8(header_bytes)
        .map_err(|_| ParseError::InvalidRequest)?;

    let mut lines = headers_str.split("\r\n");

    // METHOD SP PATH SP VERSION, everything after the second space is the version
    let request_line = lines.next().ok_or(ParseError::InvalidRequest)?;
    let mut parts = request_line.splitn(3, ' ');

    let method_str = parts.next().ok_or(ParseError::InvalidRequest)?;
    let path = parts.next().ok_or(ParseError::InvalidRequest)?;
    let version = parts.next().ok_or(ParseError::InvalidRequest)?;

    let method = Method::from_token(method_str);

    let mut headers = HashMap::new();
    let mut content_length = 0usize;

    for line in lines {
        if line.is_empty() {
            break;
        }

        // Lines without a colon carry nothing we can use
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };

        let key = key.to_ascii_lowercase();
        let value = value.trim_start_matches([' ', '\t']).to_string();

        if key == "content-length" {
            content_length = value
                .trim_end()
                .parse::<usize>()
                .map_err(|_| ParseError::InvalidContentLength)?;
        }

        headers.insert(key, value);
    }

    if body_bytes.len() < content_length {
        return Err(ParseError::Incomplete);
    }

    let body = body_bytes[..content_length].to_vec();

    let request = Request {
        method,
        path: path.to_string(),
        version: version.to_string(),
        headers,
        body,
    };

    let total_consumed = headers_end + HEADER_TERMINATOR.len() + content_length;
    Ok((request, total_consumed))
}

fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(HEADER_TERMINATOR.len())
        .position(|w| w == HEADER_TERMINATOR)
}
