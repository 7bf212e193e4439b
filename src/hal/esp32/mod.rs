//! ESP32 hardware layer for the stepper portal.
//!
//! # Hardware Configuration
//!
//! - **MCU**: ESP32 (Xtensa dual core) running ESP-IDF
//! - **Stepper driver**: A4988/DRV8825-style step/dir driver, driven through
//!   `accel_stepper::StepAndDirection` over two `PinDriver` outputs
//! - **Status LED**: on-board LED, driven through
//!   [`GpioLed`](crate::hal::GpioLed)
//! - **Clock**: `accel_stepper::OperatingSystemClock`; `std::time::Instant`
//!   is backed by `esp_timer` under ESP-IDF
//!
//! # Pin Assignments
//!
//! See the [`pins`] module.

#[cfg(feature = "wifi")]
mod wifi;
#[cfg(feature = "wifi")]
pub use wifi::Esp32AccessPoint;

#[cfg(feature = "esp32-http")]
mod http;
#[cfg(feature = "esp32-http")]
pub use http::Esp32HttpServer;

/// GPIO assignments.
pub mod pins {
    // =========================================================================
    // Stepper Driver
    // =========================================================================

    /// STEP input of the driver (one pulse per microstep)
    pub const STEP: i32 = 18;

    /// DIR input of the driver
    pub const DIR: i32 = 19;

    /// ENABLE input of the driver. Wired but not driven; the driver's own
    /// pull-down keeps it enabled.
    pub const ENABLE: i32 = 21;

    // =========================================================================
    // Status
    // =========================================================================

    /// On-board status LED (active high)
    pub const LED: i32 = 2;
}
