//! Integration tests for the axum front-end.
//!
//! Requests go through the router, the request queue, and a live main loop.

#![cfg(feature = "web")]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;

use accel_stepper::OperatingSystemClock;
use stepper_portal::hal::{MockLed, MockStepper};
use stepper_portal::services::{build_router, request_queue, WebServerConfig};
use stepper_portal::{ControlLoop, DnsResponder, MoveMode, Portal, CONTROL_PAGE};

/// DNS stand-in with nothing ever pending.
struct NoDns;

impl DnsResponder for NoDns {
    type Error = ();

    fn process_next_request(&mut self) -> Result<bool, ()> {
        Ok(false)
    }
}

struct TestApp {
    router: axum::Router,
    stop: Arc<AtomicBool>,
    handle: JoinHandle<Portal<MockStepper, MockLed>>,
}

impl TestApp {
    fn finish(self) -> Portal<MockStepper, MockLed> {
        drop(self.router);
        self.stop.store(true, Ordering::Relaxed);
        self.handle.join().unwrap()
    }
}

fn create_test_app(mode: MoveMode) -> TestApp {
    let (sender, queued) = request_queue(4);
    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = Arc::clone(&stop);
    let handle = thread::spawn(move || {
        let mut portal = Portal::new(MockStepper::new(), MockLed::new()).with_mode(mode);
        let mut main_loop = ControlLoop::new(NoDns, queued, OperatingSystemClock::new());
        while !stop_flag.load(Ordering::Relaxed) {
            main_loop.tick(&mut portal);
        }
        portal
    });
    let router = build_router(sender, &WebServerConfig::default());
    TestApp {
        router,
        stop,
        handle,
    }
}

async fn send(app: &TestApp, method: &str, uri: &str) -> (StatusCode, String, String) {
    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string())
        .unwrap_or_default();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, content_type, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_index_page() {
    let app = create_test_app(MoveMode::NonBlocking);
    let (status, content_type, body) = send(&app, "GET", "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, "text/html");
    assert_eq!(body, CONTROL_PAGE);
    app.finish();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_connectivity_check_urls_get_page() {
    let app = create_test_app(MoveMode::NonBlocking);
    for uri in ["/generate_204", "/hotspot-detect.html", "/stepper/move3?x=1"] {
        let (status, _, body) = send(&app, "GET", uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body, CONTROL_PAGE, "{uri}");
    }
    app.finish();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_led_routes() {
    let app = create_test_app(MoveMode::NonBlocking);
    let (_, _, body) = send(&app, "GET", "/LED/on").await;
    assert_eq!(body, "<p>LED Opened</p><a href=\"/\">return</a>");
    // Method does not matter
    let (_, _, body) = send(&app, "POST", "/LED/off").await;
    assert_eq!(body, "<p>LED Closed</p><a href=\"/\">return</a>");
    let portal = app.finish();
    assert!(!portal.led().is_on());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_blocking_move() {
    let app = create_test_app(MoveMode::Blocking);
    let (status, _, body) = send(&app, "GET", "/stepper/move1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "<p>Moved forward</p><a href=\"/\">return</a>");
    let portal = app.finish();
    assert_eq!(portal.motor().state().position, 2000);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stop_has_body() {
    let app = create_test_app(MoveMode::NonBlocking);
    let (status, _, body) = send(&app, "GET", "/stepper/stop").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "<p>Motor stopped</p><a href=\"/\">return</a>");
    app.finish();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cors_headers() {
    let app = create_test_app(MoveMode::NonBlocking);
    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/")
                .header(header::ORIGIN, "http://example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
    app.finish();
}
