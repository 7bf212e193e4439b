//! Generic pin-level drivers built on `embedded-hal` 1.0.
//!
//! The stepper side needs no driver of its own: `accel_stepper::StepAndDirection`
//! (crate feature `hal`) pulses the STEP/DIR pins directly. This module only
//! covers the status LED, which works with any HAL implementing
//! [`OutputPin`], including `esp_idf_hal::gpio::PinDriver`.

use embedded_hal::digital::OutputPin;

use crate::traits::LedOutput;

/// Status LED on a plain GPIO output (active high).
pub struct GpioLed<P> {
    pin: P,
}

impl<P: OutputPin> GpioLed<P> {
    /// Wrap an output pin.
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// Return the pin.
    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> LedOutput for GpioLed<P> {
    type Error = P::Error;

    fn set_level(&mut self, on: bool) -> Result<(), Self::Error> {
        if on {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        }
    }
}
