//! Application state and request handlers.
//!
//! [`Portal`] is constructed once at startup and owns everything a handler
//! touches: the motor, the LED, the route table, and the move settings. The
//! main loop passes requests in one at a time; each one runs exactly one
//! handler to completion and yields exactly one response.
//!
//! # Example
//!
//! ```rust
//! use stepper_portal::portal::{Portal, CONTROL_PAGE};
//! use stepper_portal::hal::{MockClock, MockLed, MockStepper};
//! use stepper_portal::traits::HttpRequest;
//!
//! let mut portal = Portal::new(MockStepper::new(), MockLed::new());
//! let clock = MockClock::new();
//!
//! let page = portal.handle(&HttpRequest::get("/hotspot-detect.html"), &clock);
//! assert_eq!(page.body_str(), Some(CONTROL_PAGE));
//!
//! let resp = portal.handle(&HttpRequest::get("/stepper/move1"), &clock);
//! assert_eq!(resp.body_str(), Some("<p>Moving forward</p><a href=\"/\">return</a>"));
//! assert!(portal.motor().is_moving());
//! ```

use alloc::format;
use alloc::string::String;
use core::fmt::Debug;

use crate::config::{Config, MotionConfig};
use crate::led::LedControl;
use crate::motor::{MotorControl, MoveMode, MovePreset};
use crate::routes::{Route, RouteTable};
use accel_stepper::{Device, SystemClock};

use crate::traits::{HttpRequest, HttpResponse, LedOutput};

/// The control panel served at `/` and for every unmatched path.
pub const CONTROL_PAGE: &str = include_str!("../www/index.html");

/// Wrap a message in the `<p>…</p><a href="/">return</a>` fragment every
/// control route answers with.
pub fn fragment(message: &str) -> String {
    format!("<p>{message}</p><a href=\"/\">return</a>")
}

/// Process-wide application state.
pub struct Portal<M, L> {
    motor: MotorControl<M>,
    led: LedControl<L>,
    routes: RouteTable,
    motion: MotionConfig,
}

impl<M, L: LedOutput> Portal<M, L> {
    /// Default portal: standard routes, ±2000-step presets, non-blocking
    /// moves. The LED is driven low.
    pub fn new(stepper: M, led: L) -> Self {
        Self {
            motor: MotorControl::new(stepper),
            led: LedControl::new(led),
            routes: RouteTable::standard(),
            motion: MotionConfig::default(),
        }
    }

    /// Portal built from the web and motion sections of `config`.
    pub fn from_config(stepper: M, led: L, config: &Config) -> Self {
        Self::new(stepper, led)
            .with_routes(RouteTable::for_config(config.web.register_extra_moves))
            .with_motion(config.motion.clone())
    }

    /// Set how move routes execute.
    pub fn with_mode(mut self, mode: MoveMode) -> Self {
        self.motion.mode = mode;
        self
    }

    /// Replace the route table.
    pub fn with_routes(mut self, routes: RouteTable) -> Self {
        self.routes = routes;
        self
    }

    /// Replace the move presets and mode.
    pub fn with_motion(mut self, motion: MotionConfig) -> Self {
        self.motion = motion;
        self
    }

    /// Current move mode.
    pub fn mode(&self) -> MoveMode {
        self.motion.mode
    }

    /// The route table.
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// The motor orchestrator.
    pub fn motor(&self) -> &MotorControl<M> {
        &self.motor
    }

    /// Mutable motor access, for the main loop and tests.
    pub fn motor_mut(&mut self) -> &mut MotorControl<M> {
        &mut self.motor
    }

    /// The LED orchestrator.
    pub fn led(&self) -> &LedControl<L> {
        &self.led
    }
}

impl<M, L> Portal<M, L>
where
    M: Device,
    M::Error: Debug,
    L: LedOutput,
    L::Error: Debug,
{
    /// Resolve and run the handler for one request.
    pub fn handle<C: SystemClock>(&mut self, request: &HttpRequest, clock: &C) -> HttpResponse {
        let route = self.routes.resolve(&request.path);
        log::debug!("[HTTP] {:?} {} -> {}", request.method, request.path, route.as_str());
        self.dispatch(route, clock)
    }

    /// Run the handler for an already-resolved route.
    pub fn dispatch<C: SystemClock>(&mut self, route: Route, clock: &C) -> HttpResponse {
        match route {
            Route::Index => HttpResponse::ok_html(CONTROL_PAGE),
            Route::LedOn => self.set_led(true),
            Route::LedOff => self.set_led(false),
            Route::StepperMove(preset) => self.run_move(preset, clock),
            Route::StepperStop => {
                self.motor.stop();
                HttpResponse::ok_html(&fragment("Motor stopped"))
            }
        }
    }

    /// Advance an outstanding move; see [`MotorControl::poll`].
    pub fn poll_motion<C: SystemClock>(&mut self, clock: &C) -> Result<bool, M::Error> {
        self.motor.poll(clock)
    }

    fn set_led(&mut self, on: bool) -> HttpResponse {
        match self.led.set(on) {
            Ok(()) => HttpResponse::ok_html(&fragment(if on { "LED Opened" } else { "LED Closed" })),
            Err(e) => {
                log::error!("[LED] write failed: {:?}", e);
                HttpResponse::error(500, &fragment("LED error"))
            }
        }
    }

    fn run_move<C: SystemClock>(&mut self, preset: MovePreset, clock: &C) -> HttpResponse {
        let cmd = self.motion.command(preset);
        match self.motion.mode {
            MoveMode::Blocking => match self.motor.move_blocking(cmd, clock) {
                Ok(()) => HttpResponse::ok_html(&fragment(&format!("Moved {}", preset.as_str()))),
                Err(e) => {
                    log::error!("[Motor] move {} failed: {:?}", preset.as_str(), e);
                    HttpResponse::error(500, &fragment("Motor error"))
                }
            },
            MoveMode::NonBlocking => {
                self.motor.start_move(cmd);
                HttpResponse::ok_html(&fragment(&format!("Moving {}", preset.as_str())))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::{MockClock, MockLed, MockStepper};

    fn portal() -> Portal<MockStepper, MockLed> {
        Portal::new(MockStepper::new(), MockLed::new())
    }

    fn get(portal: &mut Portal<MockStepper, MockLed>, path: &str) -> HttpResponse {
        let clock = MockClock::new().with_auto_advance_us(20);
        portal.handle(&HttpRequest::get(path), &clock)
    }

    #[test]
    fn fragment_format() {
        assert_eq!(fragment("LED Opened"), "<p>LED Opened</p><a href=\"/\">return</a>");
    }

    #[test]
    fn page_has_every_button() {
        for action in [
            "LED/on",
            "LED/off",
            "stepper/move1",
            "stepper/move2",
            "stepper/move3",
            "stepper/move4",
            "stepper/stop",
        ] {
            assert!(CONTROL_PAGE.contains(action), "{action}");
        }
        assert!(CONTROL_PAGE.contains("<title>ESP32 Control Panel</title>"));
        assert!(CONTROL_PAGE.contains("'Error: ' + this.status"));
    }

    #[test]
    fn led_on_off() {
        let mut p = portal();
        let resp = get(&mut p, "/LED/on");
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body_str(), Some("<p>LED Opened</p><a href=\"/\">return</a>"));
        assert!(p.led().is_on());

        let resp = get(&mut p, "/LED/off");
        assert_eq!(resp.body_str(), Some("<p>LED Closed</p><a href=\"/\">return</a>"));
        assert!(!p.led().is_on());
    }

    #[test]
    fn led_failure_is_500() {
        let mut p = Portal::new(MockStepper::new(), MockLed::new().failing());
        let resp = get(&mut p, "/LED/on");
        assert_eq!(resp.status, 500);
        assert_eq!(resp.body_str(), Some("<p>LED error</p><a href=\"/\">return</a>"));
    }

    #[test]
    fn non_blocking_move_returns_before_motion() {
        let mut p = portal();
        let resp = get(&mut p, "/stepper/move2");
        assert_eq!(resp.body_str(), Some("<p>Moving backward</p><a href=\"/\">return</a>"));
        assert_eq!(p.motor().state().position, 0);
        assert_eq!(p.motor().state().target, -2000);

        let clock = MockClock::new().with_auto_advance_us(20);
        while p.poll_motion(&clock).unwrap() {}
        assert_eq!(p.motor().state().position, -2000);
    }

    #[test]
    fn blocking_move_completes_in_handler() {
        let mut p = portal().with_mode(MoveMode::Blocking);
        let resp = get(&mut p, "/stepper/move1");
        assert_eq!(resp.body_str(), Some("<p>Moved forward</p><a href=\"/\">return</a>"));
        assert_eq!(p.motor().state().position, 2000);
        assert!(!p.motor().is_moving());
    }

    #[test]
    fn blocking_move_failure_is_500() {
        let mut p = Portal::new(MockStepper::new().failing(), MockLed::new())
            .with_mode(MoveMode::Blocking);
        let resp = get(&mut p, "/stepper/move1");
        assert_eq!(resp.status, 500);
        assert_eq!(resp.body_str(), Some("<p>Motor error</p><a href=\"/\">return</a>"));
    }

    #[test]
    fn stop_sends_body() {
        let mut p = portal();
        let resp = get(&mut p, "/stepper/stop");
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body_str(), Some("<p>Motor stopped</p><a href=\"/\">return</a>"));
    }

    #[test]
    fn fallback_serves_page() {
        let mut p = portal();
        let root = get(&mut p, "/");
        let other = get(&mut p, "/generate_204");
        assert_eq!(root.body, other.body);
        assert_eq!(other.status, 200);
        assert_eq!(other.content_type, "text/html");
    }

    #[test]
    fn from_config_applies_routes_and_motion() {
        let config = Config::default()
            .with_web(crate::config::WebConfig::default().with_extra_moves(true))
            .with_motion(
                MotionConfig::default()
                    .with_targets(300, -300)
                    .with_mode(MoveMode::Blocking),
            );
        let mut p = Portal::from_config(MockStepper::new(), MockLed::new(), &config);
        let resp = get(&mut p, "/stepper/move3");
        assert_eq!(resp.body_str(), Some("<p>Moved forward</p><a href=\"/\">return</a>"));
        assert_eq!(p.motor().state().position, 300);
    }
}
