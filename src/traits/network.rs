//! Network abstraction traits for the HTTP server and captive DNS.
//!
//! The control loop polls both services once per iteration, so every
//! operation here is **non-blocking**: when nothing is pending the call
//! returns immediately.
//!
//! # Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`HttpServer`] | Serve one queued HTTP request per call |
//! | [`DnsResponder`] | Answer one queued DNS query per call |
//!
//! # HTTP Surface
//!
//! ```text
//! GET /                - control panel page
//! GET /LED/on          - LED high
//! GET /LED/off         - LED low
//! GET /stepper/move1   - move to +2000
//! GET /stepper/move2   - move to -2000
//! GET /stepper/stop    - decelerate to a stop
//! GET <anything else>  - control panel page
//! ```

use alloc::string::String;
use alloc::vec::Vec;

// ============================================================================
// HTTP Server Trait (Sync-First Design)
// ============================================================================

/// HTTP server trait for the polling main loop.
///
/// # Implementation Notes
///
/// - `try_recv_request` must never block; return `None` when idle
/// - `send_response` answers the request most recently returned by
///   `try_recv_request`
/// - Callback-based servers (esp-idf-svc, axum) are adapted through
///   [`crate::services::QueuedHttpServer`]
pub trait HttpServer {
    /// Error type for HTTP operations.
    type Error;

    /// Take the next pending request, if any (non-blocking).
    fn try_recv_request(&mut self) -> Option<HttpRequest>;

    /// Send the response for the current request.
    fn send_response(&mut self, response: HttpResponse) -> Result<(), Self::Error>;
}

/// Captive DNS responder.
///
/// Implementations answer at most one query per call.
pub trait DnsResponder {
    /// Error type for socket operations.
    type Error;

    /// Answer the next pending DNS query.
    ///
    /// Returns `Ok(true)` if a datagram was consumed, `Ok(false)` if none was
    /// waiting.
    fn process_next_request(&mut self) -> Result<bool, Self::Error>;
}

/// A disabled responder never has pending queries.
impl<T: DnsResponder> DnsResponder for Option<T> {
    type Error = T::Error;

    fn process_next_request(&mut self) -> Result<bool, Self::Error> {
        match self {
            Some(inner) => inner.process_next_request(),
            None => Ok(false),
        }
    }
}

/// HTTP request methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    /// HTTP GET request.
    Get,
    /// HTTP POST request.
    Post,
    /// HTTP PUT request.
    Put,
    /// HTTP DELETE request.
    Delete,
    /// HTTP HEAD request.
    Head,
    /// Any other method.
    Other,
}

impl HttpMethod {
    /// Parse a method token (case-sensitive, as on the wire).
    pub fn from_token(token: &str) -> Self {
        match token {
            "GET" => HttpMethod::Get,
            "POST" => HttpMethod::Post,
            "PUT" => HttpMethod::Put,
            "DELETE" => HttpMethod::Delete,
            "HEAD" => HttpMethod::Head,
            _ => HttpMethod::Other,
        }
    }
}

/// An HTTP request received by the server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpRequest {
    /// HTTP method (GET, POST, etc.).
    pub method: HttpMethod,
    /// Request path without query string or fragment (e.g., "/LED/on").
    pub path: String,
}

impl HttpRequest {
    /// Create a request, stripping any query string or fragment from `uri`.
    ///
    /// ```
    /// use stepper_portal::{HttpMethod, HttpRequest};
    ///
    /// let req = HttpRequest::new(HttpMethod::Get, "/LED/on?t=123");
    /// assert_eq!(req.path, "/LED/on");
    /// ```
    pub fn new(method: HttpMethod, uri: &str) -> Self {
        let end = uri.find(['?', '#']).unwrap_or(uri.len());
        let path = &uri[..end];
        let path = if path.is_empty() { "/" } else { path };
        Self {
            method,
            path: String::from(path),
        }
    }

    /// Shorthand for a GET request.
    pub fn get(uri: &str) -> Self {
        Self::new(HttpMethod::Get, uri)
    }
}

/// An HTTP response to send to the client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code (e.g., 200, 500).
    pub status: u16,
    /// Content-Type header value.
    pub content_type: &'static str,
    /// Response body as bytes.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a 200 OK response with HTML content.
    pub fn ok_html(body: &str) -> Self {
        Self {
            status: 200,
            content_type: "text/html",
            body: body.as_bytes().to_vec(),
        }
    }

    /// Creates an HTML response with the given status code.
    pub fn error(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "text/html",
            body: body.as_bytes().to_vec(),
        }
    }

    /// Returns the body as a UTF-8 string, if valid.
    pub fn body_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.body).ok()
    }

    /// Check for a 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_strips_query_and_fragment() {
        assert_eq!(HttpRequest::get("/stepper/move1?x=1").path, "/stepper/move1");
        assert_eq!(HttpRequest::get("/LED/off#top").path, "/LED/off");
        assert_eq!(HttpRequest::get("/a?b#c").path, "/a");
    }

    #[test]
    fn request_empty_uri_is_root() {
        assert_eq!(HttpRequest::get("").path, "/");
        assert_eq!(HttpRequest::get("?foo").path, "/");
    }

    #[test]
    fn method_from_token() {
        assert_eq!(HttpMethod::from_token("GET"), HttpMethod::Get);
        assert_eq!(HttpMethod::from_token("POST"), HttpMethod::Post);
        assert_eq!(HttpMethod::from_token("HEAD"), HttpMethod::Head);
        assert_eq!(HttpMethod::from_token("get"), HttpMethod::Other);
        assert_eq!(HttpMethod::from_token("PATCH"), HttpMethod::Other);
    }

    #[test]
    fn response_helpers() {
        let ok = HttpResponse::ok_html("<p>hi</p>");
        assert_eq!(ok.status, 200);
        assert_eq!(ok.content_type, "text/html");
        assert_eq!(ok.body_str(), Some("<p>hi</p>"));
        assert!(ok.is_success());

        let err = HttpResponse::error(500, "<p>bad</p>");
        assert_eq!(err.status, 500);
        assert!(!err.is_success());
    }

    struct CountingDns(u32);

    impl DnsResponder for CountingDns {
        type Error = ();

        fn process_next_request(&mut self) -> Result<bool, ()> {
            if self.0 == 0 {
                return Ok(false);
            }
            self.0 -= 1;
            Ok(true)
        }
    }

    #[test]
    fn optional_dns_responder() {
        let mut none: Option<CountingDns> = None;
        assert_eq!(none.process_next_request(), Ok(false));

        let mut some = Some(CountingDns(1));
        assert_eq!(some.process_next_request(), Ok(true));
        assert_eq!(some.process_next_request(), Ok(false));
    }
}
