//! # stepper-portal
//!
//! Captive-portal controller for a stepper motor and a status LED on an
//! ESP32 running as its own Wi-Fi access point.
//!
//! ## Features
//!
//! - **Captive DNS**: every name resolves to the access point, so any URL a
//!   client opens lands on the control page
//! - **Control routes**: LED on/off, forward/backward moves, decelerating stop
//! - **Trapezoidal ramps**: acceleration-limited stepping with a smooth stop,
//!   scheduled by the `accel-stepper` crate
//! - **Non-blocking moves**: DNS and HTTP keep being served while the motor
//!   runs (blocking moves remain available)
//!
//! ## Architecture
//!
//! The crate is structured to allow testing on desktop without hardware:
//!
//! - `traits` - LED and network abstractions
//! - `motor` / `led` - Orchestrators over the hardware traits
//! - `routes` - Immutable path to handler table with a catch-all
//! - `portal` - Application state and request handlers
//! - `dns` - Captive DNS codec and UDP server
//! - `control_loop` - Single-threaded polling main loop
//! - `services` - Request queue and axum front-end (std/web)
//! - `hal` - Concrete implementations (mock, embedded-hal drivers, esp32)
//!
//! ## Example
//!
//! ```rust
//! use stepper_portal::{
//!     ControlLoop, HttpRequest, Portal, Route,
//!     hal::{MockClock, MockDns, MockHttp, MockLed, MockStepper},
//! };
//!
//! let mut portal = Portal::new(MockStepper::new(), MockLed::new());
//!
//! let mut http = MockHttp::new();
//! http.queue_request(HttpRequest::get("/stepper/move1"));
//! let mut main_loop = ControlLoop::new(MockDns::new(), http, MockClock::new().with_auto_advance_us(50));
//!
//! // First tick serves the request and starts the move
//! let tick = main_loop.tick(&mut portal);
//! assert!(matches!(tick.served, Some(Route::StepperMove(_))));
//!
//! // Later ticks step the motor
//! while main_loop.tick(&mut portal).stepped {}
//! assert_eq!(portal.motor().state().position, 2000);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

/// Shared configuration for firmware and simulator.
pub mod config;
/// Single-threaded polling main loop.
pub mod control_loop;
/// Captive DNS codec, policy, and UDP server.
pub mod dns;
/// Hardware abstraction layer with mock implementations for testing.
pub mod hal;
/// Status LED orchestrator.
pub mod led;
/// Motor orchestrator and move presets.
pub mod motor;
/// Application state, handlers, and the control page.
pub mod portal;
/// Path to handler mapping.
pub mod routes;
/// Core traits for hardware and network abstraction.
pub mod traits;

/// Request queue and HTTP front-ends (std).
#[cfg(feature = "std")]
pub mod services;

// Re-exports for convenience
pub use config::{AccessPointConfig, Config, DnsConfig, MotionConfig, WebConfig};
pub use control_loop::{ControlLoop, Tick};
pub use dns::{CaptiveDnsPolicy, DnsAnswer, DnsQuery};
pub use led::LedControl;
pub use motor::{MotorControl, MotorState, MoveCommand, MoveMode, MovePreset};
pub use portal::{Portal, CONTROL_PAGE};
pub use routes::{Route, RouteTable};
pub use traits::{
    // Hardware
    Direction,
    // Network
    DnsResponder,
    HttpMethod,
    HttpRequest,
    HttpResponse,
    HttpServer,
    LedOutput,
};

// The stepper seam
pub use accel_stepper::{Device, Driver, StepContext, SystemClock};

#[cfg(feature = "std")]
pub use dns::CaptiveDns;
