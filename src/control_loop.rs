//! The main loop.
//!
//! Each [`tick`](ControlLoop::tick) does, in order:
//!
//! 1. answer at most one pending DNS query
//! 2. serve at most one pending HTTP request, running its handler to
//!    completion (a blocking move holds the loop here until it finishes)
//! 3. if a move is outstanding, make one step-if-due call
//!
//! There are no sleeps; [`run`](ControlLoop::run) free-runs until reset.
//! DNS and HTTP transport errors are logged and the loop carries on.
//!
//! # Example
//!
//! ```rust
//! use stepper_portal::control_loop::ControlLoop;
//! use stepper_portal::hal::{MockClock, MockDns, MockHttp, MockLed, MockStepper};
//! use stepper_portal::portal::Portal;
//! use stepper_portal::routes::Route;
//!
//! let mut portal = Portal::new(MockStepper::new(), MockLed::new());
//! let mut http = MockHttp::new();
//! http.queue_get("/LED/on");
//!
//! let mut main_loop = ControlLoop::new(MockDns::new(), http, MockClock::new());
//! let tick = main_loop.tick(&mut portal);
//!
//! assert_eq!(tick.served, Some(Route::LedOn));
//! assert!(portal.led().is_on());
//! ```

use core::fmt::Debug;

use crate::portal::Portal;
use crate::routes::Route;
use accel_stepper::{Device, SystemClock};

use crate::traits::{DnsResponder, HttpServer, LedOutput};

/// What one iteration did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tick {
    /// A DNS query was consumed.
    pub dns_answered: bool,
    /// Route of the HTTP request served, if any.
    pub served: Option<Route>,
    /// The stepper driver was polled for an outstanding move.
    pub stepped: bool,
}

impl Tick {
    /// Nothing happened this iteration.
    pub fn is_idle(&self) -> bool {
        !self.dns_answered && self.served.is_none() && !self.stepped
    }
}

/// Single-threaded polling scheduler.
pub struct ControlLoop<D, H, C> {
    dns: D,
    http: H,
    clock: C,
    ticks: u64,
}

impl<D, H, C> ControlLoop<D, H, C>
where
    D: DnsResponder,
    D::Error: Debug,
    H: HttpServer,
    H::Error: Debug,
    C: SystemClock,
{
    /// Assemble the loop from its DNS responder, HTTP server and clock.
    pub fn new(dns: D, http: H, clock: C) -> Self {
        Self {
            dns,
            http,
            clock,
            ticks: 0,
        }
    }

    /// One iteration.
    pub fn tick<M, L>(&mut self, portal: &mut Portal<M, L>) -> Tick
    where
        M: Device,
        M::Error: Debug,
        L: LedOutput,
        L::Error: Debug,
    {
        self.ticks = self.ticks.wrapping_add(1);

        let dns_answered = match self.dns.process_next_request() {
            Ok(answered) => answered,
            Err(e) => {
                log::warn!("[DNS] {:?}", e);
                false
            }
        };

        let served = self.http.try_recv_request().map(|request| {
            let route = portal.routes().resolve(&request.path);
            log::debug!("[HTTP] {:?} {} -> {}", request.method, request.path, route.as_str());
            let response = portal.dispatch(route, &self.clock);
            if let Err(e) = self.http.send_response(response) {
                log::warn!("[HTTP] failed to send response: {:?}", e);
            }
            route
        });

        let stepped = match portal.poll_motion(&self.clock) {
            Ok(stepped) => stepped,
            Err(e) => {
                log::error!("[Motor] step failed: {:?}", e);
                false
            }
        };

        Tick {
            dns_answered,
            served,
            stepped,
        }
    }

    /// Loop forever.
    pub fn run<M, L>(&mut self, portal: &mut Portal<M, L>) -> !
    where
        M: Device,
        M::Error: Debug,
        L: LedOutput,
        L::Error: Debug,
    {
        self.run_with(portal, |_| {})
    }

    /// Loop forever, calling `after_tick` after every iteration.
    ///
    /// Firmware uses this to yield to the RTOS on idle iterations.
    pub fn run_with<M, L, F>(&mut self, portal: &mut Portal<M, L>, mut after_tick: F) -> !
    where
        M: Device,
        M::Error: Debug,
        L: LedOutput,
        L::Error: Debug,
        F: FnMut(&Tick),
    {
        log::info!("[Loop] running");
        loop {
            let tick = self.tick(portal);
            after_tick(&tick);
        }
    }

    /// Iterations so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// The DNS responder.
    pub fn dns(&self) -> &D {
        &self.dns
    }

    /// The HTTP server.
    pub fn http(&self) -> &H {
        &self.http
    }

    /// Mutable HTTP server access.
    pub fn http_mut(&mut self) -> &mut H {
        &mut self.http
    }

    /// The clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }
}
