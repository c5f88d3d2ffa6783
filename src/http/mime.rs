//! MIME type detection based on file extensions.

/// Fallback for anything the table doesn't know.
pub const DEFAULT_MIME: &str = "application/octet-stream";

const MIME_TABLE: &[(&str, &str)] = &[
    (".html", "text/html"),
    (".css", "text/css"),
    (".js", "application/javascript"),
    (".png", "image/png"),
    (".jpg", "image/jpeg"),
    (".jpeg", "image/jpeg"),
    (".svg", "image/svg+xml"),
    (".json", "application/json"),
    (".wasm", "application/wasm"),
    (".zip", "application/zip"),
];

/// Returns the MIME type for a path, looked up by its extension.
///
/// The match is a plain suffix check against a fixed table. File contents
/// are never inspected.
///
/// # Example
///
/// ```
/// # use embedhttp::http::mime::from_path;
/// assert_eq!(from_path("assets/app.js"), "application/javascript");
/// assert_eq!(from_path("blob.bin"), "application/octet-stream");
/// ```
pub fn from_path(path: &str) -> &'static str {
    MIME_TABLE
        .iter()
        .find(|(ext, _)| path.ends_with(ext))
        .map(|(_, mime)| *mime)
        .unwrap_or(DEFAULT_MIME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions() {
        assert_eq!(from_path("index.html"), "text/html");
        assert_eq!(from_path("photo.jpeg"), "image/jpeg");
        assert_eq!(from_path("bundle.zip"), "application/zip");
    }

    #[test]
    fn suffix_must_include_dot() {
        assert_eq!(from_path("html"), DEFAULT_MIME);
        assert_eq!(from_path("notes.txt"), DEFAULT_MIME);
    }
}
