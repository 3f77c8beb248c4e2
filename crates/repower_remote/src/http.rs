//! HTTP client abstraction.
//!
//! The writer only needs one operation: POST a urlencoded form and get the
//! status and body back. The [`HttpClient`] trait keeps the HTTP library
//! out of the writer so tests can script responses.

use std::sync::Arc;
use std::time::Duration;

/// Status and body of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text (empty if unreadable).
    pub body: String,
}

impl HttpResponse {
    /// Creates a response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// HTTP client abstraction.
///
/// `post_form` must return `Ok` for every response the server actually
/// sent, whatever its status. `Err` is reserved for transport failures:
/// DNS, connect, TLS, timeouts, broken connections.
pub trait HttpClient: Send + Sync {
    /// Sends a POST with an `application/x-www-form-urlencoded` body.
    fn post_form(&self, url: &str, fields: &[(&str, &str)]) -> Result<HttpResponse, String>;
}

impl<T: HttpClient + ?Sized> HttpClient for &T {
    fn post_form(&self, url: &str, fields: &[(&str, &str)]) -> Result<HttpResponse, String> {
        (**self).post_form(url, fields)
    }
}

impl<T: HttpClient + ?Sized> HttpClient for Arc<T> {
    fn post_form(&self, url: &str, fields: &[(&str, &str)]) -> Result<HttpResponse, String> {
        (**self).post_form(url, fields)
    }
}

/// Blocking HTTP client backed by `ureq`.
///
/// Without an explicit timeout the agent uses ureq's defaults. Callers that
/// need bounded latency should set one.
#[derive(Debug, Clone)]
pub struct UreqClient {
    agent: ureq::Agent,
}

impl UreqClient {
    /// Creates a client with ureq's default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            agent: ureq::AgentBuilder::new().build(),
        }
    }

    /// Creates a client whose requests time out after `timeout`.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }

    /// Wraps a preconfigured agent (proxies, TLS settings, user agent).
    #[must_use]
    pub fn from_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for UreqClient {
    fn post_form(&self, url: &str, fields: &[(&str, &str)]) -> Result<HttpResponse, String> {
        match self.agent.post(url).send_form(fields) {
            Ok(response) => {
                let status = response.status();
                Ok(HttpResponse::new(status, response.into_string().unwrap_or_default()))
            }
            // ureq reports 4xx/5xx as errors; they are still real responses.
            Err(ureq::Error::Status(status, response)) => {
                Ok(HttpResponse::new(status, response.into_string().unwrap_or_default()))
            }
            Err(ureq::Error::Transport(transport)) => {
                Err(format!("{:?}: {}", transport.kind(), transport))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serves exactly one canned response and returns the request body.
    fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/api/", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if line == "\r\n" || line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap();
                    }
                }
            }
            let mut request_body = vec![0u8; content_length];
            reader.read_exact(&mut request_body).unwrap();

            let mut stream = stream;
            write!(
                stream,
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
            .unwrap();
            stream.flush().unwrap();
            String::from_utf8(request_body).unwrap()
        });

        (url, handle)
    }

    #[test]
    fn success_response() {
        let (url, server) = serve_once("200 OK", r#"{"count": 1}"#);
        let response = UreqClient::new()
            .post_form(&url, &[("content", "record"), ("token", "T")])
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, r#"{"count": 1}"#);
        let sent = server.join().unwrap();
        assert!(sent.contains("content=record"));
        assert!(sent.contains("token=T"));
    }

    #[test]
    fn error_status_is_a_response() {
        let (url, server) = serve_once("422 Unprocessable Entity", r#"{"error":"bad field"}"#);
        let response = UreqClient::with_timeout(Duration::from_secs(5))
            .post_form(&url, &[("data", "[]")])
            .unwrap();

        assert_eq!(response.status, 422);
        assert_eq!(response.body, r#"{"error":"bad field"}"#);
        server.join().unwrap();
    }

    #[test]
    fn unreachable_endpoint_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/api/", listener.local_addr().unwrap());
        drop(listener);

        let result = UreqClient::with_timeout(Duration::from_secs(5)).post_form(&url, &[]);
        assert!(result.is_err());
    }
}
