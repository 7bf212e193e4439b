//! End-to-end tests: real request queue and UDP captive DNS driving the
//! main loop on its own thread.

use std::net::{Ipv4Addr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use accel_stepper::OperatingSystemClock;
use stepper_portal::config::{Config, DnsConfig, MotionConfig};
use stepper_portal::hal::{MockLed, MockStepper};
use stepper_portal::services::{request_queue, QueueClosed, RequestSender};
use stepper_portal::{CaptiveDns, ControlLoop, HttpRequest, MoveMode, Portal, CONTROL_PAGE};

struct Harness {
    sender: RequestSender,
    stop: Arc<AtomicBool>,
    handle: JoinHandle<Portal<MockStepper, MockLed>>,
}

impl Harness {
    fn start(config: Config, dns: Option<CaptiveDns>) -> Self {
        let (sender, queued) = request_queue(config.web.queue_depth);
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let handle = thread::spawn(move || {
            let mut portal = Portal::from_config(MockStepper::new(), MockLed::new(), &config);
            let mut main_loop = ControlLoop::new(dns, queued, OperatingSystemClock::new());
            while !stop_flag.load(Ordering::Relaxed) {
                main_loop.tick(&mut portal);
            }
            portal
        });
        Self {
            sender,
            stop,
            handle,
        }
    }

    fn get(&self, path: &str) -> String {
        let response = self.sender.call(HttpRequest::get(path)).unwrap();
        assert_eq!(response.status, 200);
        String::from_utf8(response.body).unwrap()
    }

    fn finish(self) -> Portal<MockStepper, MockLed> {
        self.stop.store(true, Ordering::Relaxed);
        self.handle.join().unwrap()
    }
}

fn blocking_config() -> Config {
    Config::default().with_motion(MotionConfig::default().with_mode(MoveMode::Blocking))
}

#[test]
fn requests_round_trip_through_loop() {
    let harness = Harness::start(Config::default(), None);
    assert_eq!(harness.get("/LED/on"), "<p>LED Opened</p><a href=\"/\">return</a>");
    assert_eq!(harness.get("/anything"), CONTROL_PAGE);
    let portal = harness.finish();
    assert!(portal.led().is_on());
}

#[test]
fn blocking_move_reply_arrives_after_completion() {
    let harness = Harness::start(blocking_config(), None);
    assert_eq!(harness.get("/stepper/move1"), "<p>Moved forward</p><a href=\"/\">return</a>");
    let portal = harness.finish();
    assert_eq!(portal.motor().state().position, 2000);
}

#[test]
fn concurrent_clients_are_serialized() {
    let harness = Harness::start(Config::default(), None);
    let clients: Vec<_> = (0..8)
        .map(|i| {
            let sender = harness.sender.clone();
            thread::spawn(move || {
                let path = if i % 2 == 0 { "/LED/on" } else { "/LED/off" };
                sender.call(HttpRequest::get(path)).unwrap()
            })
        })
        .collect();
    for client in clients {
        assert!(client.join().unwrap().is_success());
    }
    let portal = harness.finish();
    assert_eq!(portal.led().pin().writes, 9);
}

#[test]
fn non_blocking_move_finishes_in_background() {
    let harness = Harness::start(Config::default(), None);
    assert_eq!(harness.get("/stepper/move2"), "<p>Moving backward</p><a href=\"/\">return</a>");
    // Still answering while the motor runs (a full move takes over 2 s)
    assert_eq!(harness.get("/LED/on"), "<p>LED Opened</p><a href=\"/\">return</a>");

    thread::sleep(Duration::from_secs(4));
    let portal = harness.finish();
    assert_eq!(portal.motor().state().position, -2000);
}

#[test]
fn call_after_loop_exit_reports_closed() {
    let harness = Harness::start(Config::default(), None);
    let sender = harness.sender.clone();
    drop(harness.finish());
    assert_eq!(sender.call(HttpRequest::get("/")), Err(QueueClosed));
}

#[test]
fn captive_dns_answers_from_loop() {
    let ap = Ipv4Addr::new(192, 168, 4, 1);
    let dns = CaptiveDns::bind(&DnsConfig::default().with_port(0), ap).unwrap();
    let port = dns.local_addr().unwrap().port();
    let harness = Harness::start(Config::default(), Some(dns));

    let client = UdpSocket::bind("127.0.0.1:0").unwrap();
    client.set_read_timeout(Some(Duration::from_secs(2))).unwrap();

    // id 0xABCD, RD, one question: example.com A IN
    let mut query = vec![0xAB, 0xCD, 0x01, 0x00, 0, 1, 0, 0, 0, 0, 0, 0];
    query.extend_from_slice(b"\x07example\x03com\x00\x00\x01\x00\x01");
    client.send_to(&query, ("127.0.0.1", port)).unwrap();

    let mut buf = [0u8; 512];
    let (len, _) = client.recv_from(&mut buf).unwrap();
    assert_eq!(&buf[0..2], &[0xAB, 0xCD]);
    assert_eq!(&buf[6..8], &[0, 1]);
    assert_eq!(&buf[len - 4..len], &ap.octets());

    harness.finish();
}
