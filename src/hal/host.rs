//! Host (`std`) implementations used by the desktop simulator.
//!
//! Time on the host comes from `accel_stepper::OperatingSystemClock`.

use crate::traits::LedOutput;

/// LED that logs level changes instead of driving a pin.
#[derive(Debug, Default)]
pub struct ConsoleLed {
    level: bool,
}

impl ConsoleLed {
    /// Creates a simulated LED, initially low.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulated level.
    pub fn level(&self) -> bool {
        self.level
    }
}

impl LedOutput for ConsoleLed {
    type Error = core::convert::Infallible;

    fn set_level(&mut self, on: bool) -> Result<(), Self::Error> {
        if self.level != on {
            log::info!("[LED] pin {}", if on { "HIGH" } else { "LOW" });
        }
        self.level = on;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn console_led_tracks_level() {
        let mut led = ConsoleLed::new();
        assert!(!led.level());
        led.set_level(true).unwrap();
        assert!(led.level());
    }
}
