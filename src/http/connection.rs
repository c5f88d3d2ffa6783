use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::time::timeout;
use tracing::warn;

use crate::http::parser::{parse_http_request, ParseError};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;
use crate::server::router::{dispatch, Router};

const READ_CHUNK: usize = 4096;

/// One client connection: exactly one request in, one response out.
pub struct Connection<S> {
    stream: S,
    buffer: Vec<u8>,
    state: ConnectionState,
    router: Arc<RwLock<Router>>,
    read_timeout: Duration,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(ResponseWriter),
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, router: Arc<RwLock<Router>>, read_timeout: Duration) -> Self {
        Self {
            stream,
            buffer: Vec::with_capacity(READ_CHUNK),
            state: ConnectionState::Reading,
            router,
            read_timeout,
        }
    }

    /// Drives the connection to completion.
    ///
    /// Returns an error when no well-formed request could be read; in that
    /// case nothing is written back. Failures while writing the response are
    /// logged and swallowed.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            self.state = match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => match self.read_request().await? {
                    Some(req) => ConnectionState::Processing(req),
                    None => ConnectionState::Closed,
                },

                ConnectionState::Processing(req) => {
                    let response = self.handle_request(req).await;
                    ConnectionState::Writing(ResponseWriter::new(&response))
                }

                ConnectionState::Writing(mut writer) => {
                    if let Err(e) = writer.write_to_stream(&mut self.stream).await {
                        warn!(error = %e, "Failed to send response");
                    }
                    // No keep-alive: one request per connection
                    ConnectionState::Closed
                }

                ConnectionState::Closed => break,
            };
        }

        Ok(())
    }

    /// Reads until a full request is buffered.
    ///
    /// `Ok(None)` means the peer closed before sending anything.
    pub async fn read_request(&mut self) -> anyhow::Result<Option<Request>> {
        loop {
            match parse_http_request(&self.buffer) {
                Ok((request, consumed)) => {
                    self.buffer.drain(..consumed);
                    return Ok(Some(request));
                }

                Err(ParseError::Incomplete) => {}

                Err(e) => {
                    return Err(anyhow::anyhow!("HTTP parse error: {:?}", e));
                }
            }

            let mut temp = [0u8; READ_CHUNK];
            let n = timeout(self.read_timeout, self.stream.read(&mut temp))
                .await
                .map_err(|_| anyhow::anyhow!("timed out waiting for request data"))??;

            if n == 0 {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                return Err(anyhow::anyhow!("peer closed mid-request"));
            }

            self.buffer.extend_from_slice(&temp[..n]);
        }
    }

    /// Runs dispatch on the blocking pool, since route handlers are plain
    /// callbacks that may block.
    async fn handle_request(&self, req: Request) -> Response {
        let router = Arc::clone(&self.router);
        let path = req.path.clone();

        let result = tokio::task::spawn_blocking(move || dispatch(&router, &req)).await;

        match result {
            Ok(response) => response,
            Err(e) => {
                warn!(path = %path, error = %e, "Request handler failed");
                Response::internal_error()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::router::RouteReply;
    use tokio::io::AsyncWriteExt;

    fn router() -> Arc<RwLock<Router>> {
        let mut router = Router::new();
        router.register_route("/echo", |req: &Request| {
            RouteReply::new(req.body.clone()).with_header("Content-Type", "text/plain")
        });
        Arc::new(RwLock::new(router))
    }

    #[tokio::test]
    async fn answers_one_request() {
        let (mut client, server) = tokio::io::duplex(1024);
        let mut conn = Connection::new(server, router(), Duration::from_secs(5));

        client
            .write_all(b"POST /echo HTTP/1.1\r\nContent-Length: 3\r\n\r\nabc")
            .await
            .unwrap();

        conn.run().await.unwrap();
        drop(conn);

        let mut out = Vec::new();
        client.read_to_end(&mut out).await.unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.ends_with("\r\n\r\nabc"));
    }

    #[tokio::test]
    async fn malformed_request_line_is_an_error() {
        let (mut client, server) = tokio::io::duplex(1024);
        let mut conn = Connection::new(server, router(), Duration::from_secs(5));

        client.write_all(b"GARBAGE\r\n\r\n").await.unwrap();

        assert!(conn.run().await.is_err());
    }

    #[tokio::test]
    async fn silent_client_times_out() {
        let (_client, server) = tokio::io::duplex(1024);
        let mut conn = Connection::new(server, router(), Duration::from_millis(50));

        assert!(conn.run().await.is_err());
    }
}
