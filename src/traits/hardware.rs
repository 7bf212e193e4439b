//! Hardware abstraction traits for the status LED, plus the stepper seam.
//!
//! Step timing and the stepper device itself go through the `accel-stepper`
//! crate: a stepper is anything implementing [`accel_stepper::Device`], and
//! time comes from an [`accel_stepper::SystemClock`]. This module adds what
//! that crate does not cover.
//!
//! # Key Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`accel_stepper::Device`] | Emit one step toward a new position |
//! | [`accel_stepper::SystemClock`] | Monotonic elapsed time |
//! | [`LedOutput`] | Drive the status LED pin high or low |
//!
//! # Implementation
//!
//! For testing and desktop development, use the mock implementations
//! from [`crate::hal::mock`]. On the ESP32 the stepper is an
//! `accel_stepper::StepAndDirection` over two GPIO pins and the LED is a
//! [`GpioLed`](crate::hal::GpioLed).

/// Direction of shaft rotation, as observed by the mock stepper.
///
/// `Forward` moves the step counter up (clockwise on a standard A4988/DRV8825
/// wiring), `Backward` moves it down.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Increasing step position.
    Forward,
    /// Decreasing step position.
    Backward,
}

impl Direction {
    /// Direction of travel from `from` to `to`, or `None` if they are equal.
    ///
    /// # Examples
    ///
    /// ```
    /// use stepper_portal::Direction;
    ///
    /// assert_eq!(Direction::between(4, 5), Some(Direction::Forward));
    /// assert_eq!(Direction::between(0, -1), Some(Direction::Backward));
    /// assert_eq!(Direction::between(3, 3), None);
    /// ```
    pub fn between(from: i64, to: i64) -> Option<Self> {
        match to.cmp(&from) {
            core::cmp::Ordering::Greater => Some(Direction::Forward),
            core::cmp::Ordering::Less => Some(Direction::Backward),
            core::cmp::Ordering::Equal => None,
        }
    }
}

/// Digital output driving the status LED.
pub trait LedOutput {
    /// Error type for pin operations.
    type Error;

    /// Drive the pin high (`true`) or low (`false`).
    fn set_level(&mut self, on: bool) -> Result<(), Self::Error>;
}
