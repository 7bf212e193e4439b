//! Trait definitions for hardware abstraction and networking.
//!
//! This module defines the core abstractions that allow stepper-portal to:
//! - Run on different hardware (ESP32, desktop mock)
//! - Plug different HTTP front-ends into one polling loop
//!
//! # Submodules
//!
//! - `hardware`: LED output and the mock stepper's direction type
//! - `network`: HTTP server and captive DNS traits
//!
//! Stepper devices and clocks use the `accel-stepper` traits
//! ([`accel_stepper::Device`], [`accel_stepper::SystemClock`]).

pub mod hardware;
pub mod network;

pub use hardware::*;
pub use network::*;
