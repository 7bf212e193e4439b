//! Request queue between callback-style HTTP servers and the main loop.
//!
//! esp-idf-svc and axum invoke handlers on their own threads, but every
//! handler must run on the main loop, one at a time, in arrival order.
//! Front-ends call [`RequestSender::call`], which enqueues the request and
//! blocks until the loop has answered it. The loop sees the other end as an
//! ordinary [`HttpServer`].
//!
//! # Example
//!
//! ```rust
//! use std::thread;
//! use stepper_portal::services::request_queue;
//! use stepper_portal::traits::{HttpRequest, HttpResponse, HttpServer};
//!
//! let (sender, mut server) = request_queue(4);
//!
//! let client = thread::spawn(move || sender.call(HttpRequest::get("/LED/on")));
//!
//! let request = loop {
//!     if let Some(request) = server.try_recv_request() {
//!         break request;
//!     }
//!     thread::yield_now();
//! };
//! assert_eq!(request.path, "/LED/on");
//! server.send_response(HttpResponse::ok_html("done")).unwrap();
//!
//! let response = client.join().unwrap().unwrap();
//! assert_eq!(response.body_str(), Some("done"));
//! ```

use std::fmt;
use std::sync::mpsc::{self, Receiver, SyncSender, TryRecvError};

use crate::traits::{HttpRequest, HttpResponse, HttpServer};

type ReplySender = SyncSender<HttpResponse>;

/// Create a queue holding up to `capacity` waiting requests (minimum 1).
pub fn request_queue(capacity: usize) -> (RequestSender, QueuedHttpServer) {
    let (tx, rx) = mpsc::sync_channel(capacity.max(1));
    (
        RequestSender { tx },
        QueuedHttpServer {
            rx,
            current: None,
            closed: false,
        },
    )
}

/// The main loop is gone; no more requests will be answered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueueClosed;

impl fmt::Display for QueueClosed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "request queue closed")
    }
}

impl std::error::Error for QueueClosed {}

/// Front-end handle. Cheap to clone, one per server thread or handler.
#[derive(Clone, Debug)]
pub struct RequestSender {
    tx: SyncSender<(HttpRequest, ReplySender)>,
}

impl RequestSender {
    /// Enqueue `request` and block until the loop answers it.
    pub fn call(&self, request: HttpRequest) -> Result<HttpResponse, QueueClosed> {
        let (reply_tx, reply_rx) = mpsc::sync_channel(1);
        self.tx.send((request, reply_tx)).map_err(|_| QueueClosed)?;
        reply_rx.recv().map_err(|_| QueueClosed)
    }
}

/// Errors answering a queued request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueueError {
    /// `send_response` was called without a request in hand.
    NoPendingRequest,
    /// The caller stopped waiting before the reply was ready.
    CallerGone,
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueError::NoPendingRequest => write!(f, "no request awaiting a response"),
            QueueError::CallerGone => write!(f, "caller no longer waiting"),
        }
    }
}

impl std::error::Error for QueueError {}

/// Main-loop end of the queue.
#[derive(Debug)]
pub struct QueuedHttpServer {
    rx: Receiver<(HttpRequest, ReplySender)>,
    current: Option<ReplySender>,
    closed: bool,
}

impl QueuedHttpServer {
    /// Every sender has been dropped.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl HttpServer for QueuedHttpServer {
    type Error = QueueError;

    fn try_recv_request(&mut self) -> Option<HttpRequest> {
        match self.rx.try_recv() {
            Ok((request, reply)) => {
                self.current = Some(reply);
                Some(request)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                if !self.closed {
                    log::warn!("[HTTP] all front-ends disconnected");
                    self.closed = true;
                }
                None
            }
        }
    }

    fn send_response(&mut self, response: HttpResponse) -> Result<(), Self::Error> {
        let reply = self.current.take().ok_or(QueueError::NoPendingRequest)?;
        reply.send(response).map_err(|_| QueueError::CallerGone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn next_request(server: &mut QueuedHttpServer) -> HttpRequest {
        loop {
            if let Some(request) = server.try_recv_request() {
                return request;
            }
            thread::yield_now();
        }
    }

    #[test]
    fn empty_queue_returns_none() {
        let (_sender, mut server) = request_queue(1);
        assert!(server.try_recv_request().is_none());
        assert!(!server.is_closed());
    }

    #[test]
    fn response_without_request_is_error() {
        let (_sender, mut server) = request_queue(1);
        assert_eq!(
            server.send_response(HttpResponse::ok_html("x")),
            Err(QueueError::NoPendingRequest)
        );
    }

    #[test]
    fn requests_arrive_in_order() {
        let (sender, mut server) = request_queue(4);
        let first = {
            let sender = sender.clone();
            thread::spawn(move || sender.call(HttpRequest::get("/LED/on")))
        };
        let request = next_request(&mut server);
        assert_eq!(request.path, "/LED/on");

        let second = thread::spawn(move || sender.call(HttpRequest::get("/LED/off")));
        server.send_response(HttpResponse::ok_html("one")).unwrap();
        assert_eq!(first.join().unwrap().unwrap().body_str(), Some("one"));

        let request = next_request(&mut server);
        assert_eq!(request.path, "/LED/off");
        server.send_response(HttpResponse::ok_html("two")).unwrap();
        assert_eq!(second.join().unwrap().unwrap().body_str(), Some("two"));
    }

    #[test]
    fn call_fails_when_loop_dropped() {
        let (sender, server) = request_queue(1);
        drop(server);
        assert_eq!(sender.call(HttpRequest::get("/")), Err(QueueClosed));
    }

    #[test]
    fn dropped_senders_close_server() {
        let (sender, mut server) = request_queue(1);
        drop(sender);
        assert!(server.try_recv_request().is_none());
        assert!(server.is_closed());
    }

    #[test]
    fn error_display() {
        assert_eq!(QueueClosed.to_string(), "request queue closed");
        assert_eq!(QueueError::CallerGone.to_string(), "caller no longer waiting");
    }
}
