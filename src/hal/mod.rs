//! Hardware Abstraction Layer implementations.
//!
//! This module contains concrete implementations of the traits
//! defined in [`crate::traits`] for various platforms.
//!
//! # Available Implementations
//!
//! - `mock`: Test implementations for desktop development
//! - `drivers`: Generic `embedded-hal` LED driver
//! - `host`: simulated LED for the desktop simulator
//! - `esp32`: ESP32 pins, soft-AP, and HTTP server (requires `esp32` feature)

pub mod drivers;
pub mod mock;

#[cfg(feature = "std")]
pub mod host;

#[cfg(feature = "esp32")]
pub mod esp32;

pub use drivers::*;
pub use mock::*;

#[cfg(feature = "std")]
pub use host::*;

#[cfg(feature = "esp32")]
pub use esp32::*;
