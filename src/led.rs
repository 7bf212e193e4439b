//! Status LED control.

use crate::traits::LedOutput;

/// Status LED orchestrator.
///
/// Drives the pin low on construction and remembers the last level written.
pub struct LedControl<L> {
    pin: L,
    on: bool,
}

impl<L: LedOutput> LedControl<L> {
    /// Take the pin and drive it low.
    pub fn new(mut pin: L) -> Self {
        if pin.set_level(false).is_err() {
            log::warn!("[LED] failed to drive pin low at startup");
        }
        Self { pin, on: false }
    }

    /// Set the LED on or off. Repeating a level is harmless.
    pub fn set(&mut self, on: bool) -> Result<(), L::Error> {
        self.pin.set_level(on)?;
        self.on = on;
        log::info!("[LED] {}", if on { "on" } else { "off" });
        Ok(())
    }

    /// Last level successfully written.
    pub fn is_on(&self) -> bool {
        self.on
    }

    /// The underlying pin.
    pub fn pin(&self) -> &L {
        &self.pin
    }

    /// Give the pin back.
    pub fn into_pin(self) -> L {
        self.pin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::MockLed;

    #[test]
    fn starts_low() {
        let led = LedControl::new(MockLed::new());
        assert!(!led.is_on());
        assert!(!led.pin().level);
        assert_eq!(led.pin().writes, 1);
    }

    #[test]
    fn on_off_idempotent() {
        let mut led = LedControl::new(MockLed::new());
        led.set(true).unwrap();
        led.set(true).unwrap();
        assert!(led.is_on());
        assert!(led.pin().level);
        led.set(false).unwrap();
        led.set(false).unwrap();
        assert!(!led.is_on());
        assert!(!led.pin().level);
    }

    #[test]
    fn failed_write_keeps_state() {
        let mut led = LedControl::new(MockLed::new().failing());
        assert!(led.set(true).is_err());
        assert!(!led.is_on());
    }
}
