use embedhttp::http::response::{NOT_FOUND_BODY, Response, ResponseBuilder, StatusCode};
use embedhttp::http::writer::serialize_response;

#[test]
fn test_status_line_parts() {
    let cases = [
        (StatusCode::Ok, 200, "OK"),
        (StatusCode::NotFound, 404, "Not Found"),
        (StatusCode::InternalServerError, 500, "Internal Server Error"),
    ];

    for (status, code, reason) in cases {
        assert_eq!(status.as_u16(), code);
        assert_eq!(status.reason_phrase(), reason);
    }
}

#[test]
fn test_builder_sets_body_and_headers() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .header("Content-Type", "image/png")
        .header("X-Frame-Options", "DENY")
        .body(vec![0x89, b'P', b'N', b'G'])
        .build();

    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(response.body, vec![0x89, b'P', b'N', b'G']);
    assert_eq!(response.header("content-type"), Some("image/png"));
    assert_eq!(response.header("x-frame-options"), Some("DENY"));
}

#[test]
fn test_builder_adds_content_length() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .body(b"sixteen bytes!!!".to_vec())
        .build();

    assert_eq!(response.headers.get("Content-Length").unwrap(), "16");
}

#[test]
fn test_builder_empty_body_has_zero_length() {
    let response = ResponseBuilder::new(StatusCode::NotFound).build();

    assert!(response.body.is_empty());
    assert_eq!(response.header("Content-Length"), Some("0"));
}

#[test]
fn test_builder_keeps_explicit_content_length() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .header("Content-Length", "999")
        .body(b"test".to_vec())
        .build();

    assert_eq!(response.headers.get("Content-Length").unwrap(), "999");
}

#[test]
fn test_builder_content_length_any_case() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .header("content-length", "2")
        .body(b"hi".to_vec())
        .build();

    assert_eq!(response.headers.len(), 1);
    assert_eq!(response.header("Content-Length"), Some("2"));
}

#[test]
fn test_builder_merges_header_maps() {
    let mut extra = std::collections::HashMap::new();
    extra.insert("Cache-Control".to_string(), "no-store".to_string());
    extra.insert("Content-Type".to_string(), "text/css".to_string());

    let response = ResponseBuilder::new(StatusCode::Ok)
        .header("Content-Type", "text/plain")
        .headers(extra)
        .build();

    // 2 merged + Content-Length
    assert_eq!(response.headers.len(), 3);
    assert_eq!(response.header("Content-Type"), Some("text/css"));
}

#[test]
fn test_response_ok_helper() {
    let response = Response::ok("pong");

    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(response.body, b"pong".to_vec());
}

#[test]
fn test_response_not_found_helper() {
    let response = Response::not_found();

    assert_eq!(response.status, StatusCode::NotFound);
    assert_eq!(response.body, NOT_FOUND_BODY.as_bytes().to_vec());
    assert_eq!(response.header("content-type"), Some("text/html"));
    assert!(String::from_utf8_lossy(&response.body).contains("404 Not Found"));
}

#[test]
fn test_response_internal_error_helper() {
    let response = Response::internal_error();

    assert_eq!(response.status, StatusCode::InternalServerError);
    assert_eq!(response.body, b"500 Internal Server Error".to_vec());
}

#[test]
fn test_serialize_response_layout() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .header("Content-Type", "text/plain")
        .body(b"abc".to_vec())
        .build();

    let text = String::from_utf8(serialize_response(&response)).unwrap();

    assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(text.contains("Content-Type: text/plain\r\n"));
    assert!(text.contains("Content-Length: 3\r\n"));
    assert!(text.ends_with("\r\n\r\nabc"));
}
