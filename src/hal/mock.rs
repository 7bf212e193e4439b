//! Mock implementations for testing without hardware.
//!
//! This module provides test doubles for all hardware and network traits,
//! enabling development and testing on desktop without physical hardware.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockStepper`] | [`Device`] | Counts pulses, position, and reversals |
//! | [`MockLed`] | [`LedOutput`] | Tracks pin level and writes |
//! | [`MockClock`] | [`SystemClock`] | Controllable, optionally self-advancing time |
//! | [`MockHttp`] | [`HttpServer`] | Queued requests, captured responses |
//! | [`MockDns`] | [`DnsResponder`] | Counts pending and answered queries |
//!
//! # Example
//!
//! ```rust
//! use stepper_portal::hal::{MockClock, MockLed, MockStepper};
//! use stepper_portal::{HttpRequest, Portal};
//!
//! let mut portal = Portal::new(MockStepper::new(), MockLed::new());
//! let clock = MockClock::new();
//!
//! let response = portal.handle(&HttpRequest::get("/LED/on"), &clock);
//! assert_eq!(response.status, 200);
//! assert!(portal.led().is_on());
//! ```
//!
//! [`Device`]: accel_stepper::Device
//! [`LedOutput`]: crate::traits::LedOutput
//! [`SystemClock`]: accel_stepper::SystemClock
//! [`HttpServer`]: crate::traits::HttpServer
//! [`DnsResponder`]: crate::traits::DnsResponder

use core::cell::Cell;
use core::time::Duration;

use accel_stepper::{Device, StepContext, SystemClock};

use crate::traits::{Direction, DnsResponder, HttpRequest, HttpResponse, HttpServer, LedOutput};

use alloc::collections::VecDeque;
use alloc::vec::Vec;

// ============================================================================
// Hardware Mocks
// ============================================================================

/// Mock stepper driver for testing.
///
/// Records every pulse. Use the public fields to inspect state after test
/// operations.
///
/// # Example
///
/// ```rust
/// use stepper_portal::hal::{MockClock, MockStepper};
/// use stepper_portal::motor::{MotorControl, MoveCommand};
/// use stepper_portal::Direction;
///
/// let mut motor = MotorControl::new(MockStepper::new());
/// let clock = MockClock::new().with_auto_advance_us(50);
/// motor.move_blocking(MoveCommand::new(-3, 100.0, 100.0), &clock).unwrap();
///
/// assert_eq!(motor.device().position, -3);
/// assert_eq!(motor.device().pulses, 3);
/// assert_eq!(motor.device().last_direction, Some(Direction::Backward));
/// ```
#[derive(Debug, Default)]
pub struct MockStepper {
    /// Net position in steps.
    pub position: i64,
    /// Total pulses emitted in either direction.
    pub pulses: u64,
    /// Direction of the most recent pulse.
    pub last_direction: Option<Direction>,
    /// Number of direction reversals seen.
    pub reversals: u32,
    /// When set, every `step` call fails.
    pub fail: bool,
}

impl MockStepper {
    /// Creates a new mock stepper at position 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock whose `step` always returns an error.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

impl Device for MockStepper {
    type Error = ();

    fn step(&mut self, ctx: &StepContext) -> Result<(), ()> {
        if self.fail {
            return Err(());
        }
        let Some(dir) = Direction::between(self.position, ctx.position) else {
            return Ok(());
        };
        if matches!(self.last_direction, Some(last) if last != dir) {
            self.reversals += 1;
        }
        self.position = ctx.position;
        self.pulses += 1;
        self.last_direction = Some(dir);
        Ok(())
    }
}

/// Mock LED pin for testing.
///
/// # Example
///
/// ```rust
/// use stepper_portal::hal::MockLed;
/// use stepper_portal::traits::LedOutput;
///
/// let mut led = MockLed::new();
/// led.set_level(true).unwrap();
/// led.set_level(true).unwrap();
///
/// assert!(led.level);
/// assert_eq!(led.writes, 2);
/// ```
#[derive(Debug, Default)]
pub struct MockLed {
    /// Current pin level.
    pub level: bool,
    /// Number of `set_level` calls.
    pub writes: usize,
    /// When set, every write fails.
    pub fail: bool,
}

impl MockLed {
    /// Creates a new mock LED, initially low.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock whose writes always fail.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

impl LedOutput for MockLed {
    type Error = ();

    fn set_level(&mut self, on: bool) -> Result<(), ()> {
        if self.fail {
            return Err(());
        }
        self.level = on;
        self.writes += 1;
        Ok(())
    }
}

/// Mock clock for testing.
///
/// Time only moves when told to, or, with
/// [`with_auto_advance_us`](Self::with_auto_advance_us), by a fixed amount on
/// every read. Auto-advance lets blocking loops such as
/// [`MotorControl::move_blocking`](crate::motor::MotorControl::move_blocking)
/// make progress in tests.
///
/// # Example
///
/// ```rust
/// use core::time::Duration;
/// use accel_stepper::SystemClock;
/// use stepper_portal::hal::MockClock;
///
/// let clock = MockClock::new().with_auto_advance_us(10);
/// assert_eq!(clock.elapsed(), Duration::from_micros(0));
/// assert_eq!(clock.elapsed(), Duration::from_micros(10));
///
/// clock.set_us(1_000);
/// assert_eq!(clock.elapsed(), Duration::from_millis(1));
/// ```
#[derive(Debug, Default)]
pub struct MockClock {
    current_us: Cell<u64>,
    auto_advance_us: u64,
    reads: Cell<u64>,
}

impl MockClock {
    /// Creates a new mock clock starting at 0µs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance time by `us` after every read.
    pub fn with_auto_advance_us(mut self, us: u64) -> Self {
        self.auto_advance_us = us;
        self
    }

    /// Sets the current time in microseconds.
    pub fn set_us(&self, us: u64) {
        self.current_us.set(us);
    }

    /// Advances the clock by the given duration.
    pub fn advance_us(&self, us: u64) {
        self.current_us.set(self.current_us.get() + us);
    }

    /// Advances the clock by whole milliseconds.
    pub fn advance_ms(&self, ms: u64) {
        self.advance_us(ms * 1000);
    }

    /// Number of times the clock has been read.
    pub fn reads(&self) -> u64 {
        self.reads.get()
    }
}

impl SystemClock for MockClock {
    fn elapsed(&self) -> Duration {
        let now = self.current_us.get();
        self.current_us.set(now + self.auto_advance_us);
        self.reads.set(self.reads.get() + 1);
        Duration::from_micros(now)
    }
}

// ============================================================================
// Network Mocks
// ============================================================================

/// Mock HTTP server for testing.
///
/// Queue requests with [`queue_request`](Self::queue_request); responses sent
/// by the control loop are collected in [`responses`](Self::responses),
/// paired with the request path they answered.
#[derive(Debug, Default)]
pub struct MockHttp {
    /// Requests waiting to be served, in arrival order.
    pub incoming: VecDeque<HttpRequest>,
    /// Served requests and their responses.
    pub responses: Vec<(HttpRequest, HttpResponse)>,
    current: Option<HttpRequest>,
}

impl MockHttp {
    /// Creates an idle mock server.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a request to be returned by `try_recv_request`.
    pub fn queue_request(&mut self, request: HttpRequest) {
        self.incoming.push_back(request);
    }

    /// Queue a GET for `path`.
    pub fn queue_get(&mut self, path: &str) {
        self.queue_request(HttpRequest::get(path));
    }

    /// Response sent for the `index`-th served request.
    pub fn response(&self, index: usize) -> Option<&HttpResponse> {
        self.responses.get(index).map(|(_, resp)| resp)
    }
}

impl HttpServer for MockHttp {
    type Error = ();

    fn try_recv_request(&mut self) -> Option<HttpRequest> {
        let request = self.incoming.pop_front()?;
        self.current = Some(request.clone());
        Some(request)
    }

    fn send_response(&mut self, response: HttpResponse) -> Result<(), ()> {
        let request = self.current.take().ok_or(())?;
        self.responses.push((request, response));
        Ok(())
    }
}

/// Mock captive DNS responder.
///
/// `pending` queries are answered one per call.
#[derive(Debug, Default)]
pub struct MockDns {
    /// Queries waiting for an answer.
    pub pending: u32,
    /// Queries answered so far.
    pub answered: u32,
}

impl MockDns {
    /// Creates a responder with nothing pending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate `count` queries arriving.
    pub fn queue_queries(&mut self, count: u32) {
        self.pending += count;
    }
}

impl DnsResponder for MockDns {
    type Error = ();

    fn process_next_request(&mut self) -> Result<bool, ()> {
        if self.pending == 0 {
            return Ok(false);
        }
        self.pending -= 1;
        self.answered += 1;
        Ok(true)
    }
}
