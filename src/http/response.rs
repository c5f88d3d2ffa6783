use std::collections::HashMap;

/// Body sent with every 404 response.
pub const NOT_FOUND_BODY: &str = "<html><body><h1>404 Not Found</h1></body></html>";

/// Statuses the server produces.
///
/// Route handlers and VFS hits answer `Ok`, a dispatch miss answers
/// `NotFound`, a failed handler answers `InternalServerError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Ok,
    NotFound,
    InternalServerError,
}

impl StatusCode {
    fn parts(self) -> (u16, &'static str) {
        match self {
            StatusCode::Ok => (200, "OK"),
            StatusCode::NotFound => (404, "Not Found"),
            StatusCode::InternalServerError => (500, "Internal Server Error"),
        }
    }

    /// ```
    /// # use embedhttp::http::response::StatusCode;
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        self.parts().0
    }

    pub fn reason_phrase(&self) -> &'static str {
        self.parts().1
    }
}

/// A response as it will go on the wire.
///
/// Header names keep the case they were set with and are written verbatim.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```
/// # use embedhttp::http::response::{ResponseBuilder, StatusCode};
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .header("Content-Type", "application/json")
///     .body(b"{}".to_vec())
///     .build();
/// assert_eq!(response.header("content-length"), Some("2"));
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

impl ResponseBuilder {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Adds or replaces a header.
    ///
    /// Values are not validated. Callers must not put CR or LF in them.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Adds every header from `headers`, replacing existing keys.
    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Adds a Content-Length header computed from the body unless one was
    /// already set under any capitalization.
    pub fn build(mut self) -> Response {
        let has_length = self
            .headers
            .keys()
            .any(|k| k.eq_ignore_ascii_case("Content-Length"));
        if !has_length {
            self.headers
                .insert("Content-Length".to_string(), self.body.len().to_string());
        }

        Response {
            status: self.status,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl Response {
    /// 200 with `body` and no headers beyond Content-Length.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        ResponseBuilder::new(StatusCode::Ok)
            .body(body.into())
            .build()
    }

    /// Creates the fixed HTML 404 Not Found response.
    pub fn not_found() -> Self {
        ResponseBuilder::new(StatusCode::NotFound)
            .header("Content-Type", "text/html")
            .body(NOT_FOUND_BODY.as_bytes().to_vec())
            .build()
    }

    /// Sent when a route handler panics.
    pub fn internal_error() -> Self {
        ResponseBuilder::new(StatusCode::InternalServerError)
            .body(b"500 Internal Server Error".to_vec())
            .build()
    }

    /// Looks up a header ignoring ASCII case.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}
