//! HTTP/1.1 protocol handling.
//!
//! Just enough HTTP for a browser talking to localhost: one request per
//! connection, bodies framed by `Content-Length`, the connection closed after
//! the response.
//!
//! # Architecture
//!
//! - **`connection`**: per-connection state machine
//! - **`parser`**: turns buffered bytes into a [`Request`](request::Request)
//! - **`request`**: request representation
//! - **`response`**: response representation with builder pattern
//! - **`writer`**: serializes and writes responses
//! - **`mime`**: MIME type detection based on file extensions
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Wait for a full request
//!        └──────┬──────┘
//!               │ Request received
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← Route or serve from a VFS
//!        └──────┬───────────┘
//!               │ Response ready
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Send response to client
//!        └──────┬───────────┘
//!               │ Response sent
//!               ▼
//!        ┌──────────────────┐
//!        │     Closed       │
//!        └──────────────────┘
//! ```

pub mod connection;
pub mod mime;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
