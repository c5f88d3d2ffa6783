use embedhttp::http::request::{Method, Request, RequestBuilder};
use std::collections::HashMap;

#[test]
fn test_request_header_retrieval() {
    let mut headers = HashMap::new();
    headers.insert("host".to_string(), "example.com".to_string());
    headers.insert("content-type".to_string(), "application/json".to_string());

    let req = Request {
        method: Method::GET,
        path: "/".to_string(),
        version: "HTTP/1.1".to_string(),
        headers,
        body: vec![],
    };

    assert_eq!(req.header("Host"), Some("example.com"));
    assert_eq!(req.header("CONTENT-TYPE"), Some("application/json"));
    assert_eq!(req.header("Missing"), None);
}

#[test]
fn test_request_content_length_parsing() {
    let mut headers = HashMap::new();
    headers.insert("content-length".to_string(), "42".to_string());

    let req = Request {
        method: Method::POST,
        path: "/api".to_string(),
        version: "HTTP/1.1".to_string(),
        headers,
        body: vec![],
    };

    assert_eq!(req.content_length(), 42);
}

#[test]
fn test_request_content_length_missing() {
    let req = Request {
        method: Method::GET,
        path: "/".to_string(),
        version: "HTTP/1.1".to_string(),
        headers: HashMap::new(),
        body: vec![],
    };

    assert_eq!(req.content_length(), 0);
}

#[test]
fn test_request_content_length_invalid() {
    let mut headers = HashMap::new();
    headers.insert("content-length".to_string(), "not-a-number".to_string());

    let req = Request {
        method: Method::POST,
        path: "/api".to_string(),
        version: "HTTP/1.1".to_string(),
        headers,
        body: vec![],
    };

    assert_eq!(req.content_length(), 0);
}

#[test]
fn test_request_method_equality() {
    assert_eq!(Method::GET, Method::GET);
    assert_ne!(Method::GET, Method::POST);
}

#[test]
fn test_request_method_from_token() {
    assert_eq!(Method::from_token("GET"), Method::GET);
    assert_eq!(Method::from_token("POST"), Method::POST);
    assert_eq!(
        Method::from_token("PROPFIND"),
        Method::Other("PROPFIND".to_string())
    );
    // Case-sensitive: lower-case tokens are not the standard methods
    assert_eq!(Method::from_token("get"), Method::Other("get".to_string()));
    assert_eq!(Method::from_token(""), Method::Other(String::new()));
}

#[test]
fn test_request_method_display() {
    assert_eq!(Method::DELETE.to_string(), "DELETE");
    assert_eq!(Method::Other("BREW".to_string()).to_string(), "BREW");
}

#[test]
fn test_request_with_body() {
    let body_content = b"test body content".to_vec();
    let req = Request {
        method: Method::POST,
        path: "/api".to_string(),
        version: "HTTP/1.1".to_string(),
        headers: HashMap::new(),
        body: body_content.clone(),
    };

    assert_eq!(req.body, body_content);
    assert_eq!(req.body_text(), "test body content");
}

#[test]
fn test_request_builder_lowercases_headers() {
    let req = RequestBuilder::new()
        .method(Method::GET)
        .path("/index.html")
        .header("X-Custom-Header", "yes")
        .build()
        .unwrap();

    assert_eq!(req.version, "HTTP/1.1");
    assert!(req.headers.contains_key("x-custom-header"));
    assert_eq!(req.header("X-Custom-Header"), Some("yes"));
}

#[test]
fn test_request_builder_requires_method_and_path() {
    assert!(RequestBuilder::new().path("/").build().is_err());
    assert!(RequestBuilder::new().method(Method::GET).build().is_err());
}
