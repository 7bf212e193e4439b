//! Motor control orchestration on top of [`accel_stepper::Driver`].
//!
//! [`MotorControl`] owns the single motion object of the device together
//! with the step device it pulses. Moves are described by a [`MoveCommand`]
//! and can run two ways:
//!
//! - [`move_blocking`](MotorControl::move_blocking): configure, then poll the
//!   driver until the target is reached. Nothing else runs meanwhile.
//! - [`start_move`](MotorControl::start_move): configure and return; the main
//!   loop advances the motion through [`poll`](MotorControl::poll).
//!
//! Targets are **absolute** step positions. Issuing the forward preset twice
//! re-targets +2000 rather than travelling another 2000 steps.
//!
//! # Example
//!
//! ```rust
//! use stepper_portal::motor::{MotorControl, MoveCommand};
//! use stepper_portal::hal::{MockClock, MockStepper};
//!
//! let mut motor = MotorControl::new(MockStepper::new());
//! motor.start_move(MoveCommand::forward());
//!
//! let clock = MockClock::new().with_auto_advance_us(20);
//! while motor.poll(&clock).unwrap() {}
//! assert_eq!(motor.state().position, 2000);
//! ```

use accel_stepper::{Device, Driver, SystemClock};

/// A move-to-target request.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveCommand {
    /// Absolute target position in steps.
    pub target: i64,
    /// Maximum speed in steps/s.
    pub max_speed: f32,
    /// Acceleration in steps/s².
    pub acceleration: f32,
}

impl MoveCommand {
    /// Default travel for the forward/backward presets.
    pub const DEFAULT_TRAVEL: i64 = 2000;
    /// Default maximum speed (steps/s).
    pub const DEFAULT_MAX_SPEED: f32 = 1500.0;
    /// Default acceleration (steps/s²).
    pub const DEFAULT_ACCELERATION: f32 = 1800.0;

    /// Create a move command.
    pub const fn new(target: i64, max_speed: f32, acceleration: f32) -> Self {
        Self {
            target,
            max_speed,
            acceleration,
        }
    }

    /// Move to +2000 at 1500 steps/s, 1800 steps/s².
    pub const fn forward() -> Self {
        Self::new(
            Self::DEFAULT_TRAVEL,
            Self::DEFAULT_MAX_SPEED,
            Self::DEFAULT_ACCELERATION,
        )
    }

    /// Move to −2000 at 1500 steps/s, 1800 steps/s².
    pub const fn backward() -> Self {
        Self::new(
            -Self::DEFAULT_TRAVEL,
            Self::DEFAULT_MAX_SPEED,
            Self::DEFAULT_ACCELERATION,
        )
    }
}

/// The two built-in moves exposed over HTTP.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MovePreset {
    /// Toward the forward target.
    Forward,
    /// Toward the backward target.
    Backward,
}

impl MovePreset {
    /// Direction word used in responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Backward => "backward",
        }
    }

    /// Default command for this preset.
    pub const fn command(&self) -> MoveCommand {
        match self {
            Self::Forward => MoveCommand::forward(),
            Self::Backward => MoveCommand::backward(),
        }
    }
}

/// How a move request is executed.
///
/// The default, [`NonBlocking`](Self::NonBlocking), answers move requests
/// with `Moving forward`/`Moving backward`. Only [`Blocking`](Self::Blocking)
/// answers `Moved forward`/`Moved backward`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MoveMode {
    /// The request handler returns only after the motor reaches its target.
    /// DNS, HTTP, and every other request stall for the duration.
    Blocking,
    /// The handler configures the move and returns; the main loop steps it.
    #[default]
    NonBlocking,
}

/// Snapshot of the motion object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotorState {
    /// Current position in steps.
    pub position: i64,
    /// Target position in steps.
    pub target: i64,
    /// Steps remaining to the target.
    pub distance_to_go: i64,
    /// Signed speed in steps/s.
    pub speed: f32,
    /// Configured maximum speed in steps/s.
    pub max_speed: f32,
    /// Configured acceleration in steps/s².
    pub acceleration: f32,
}

impl MotorState {
    /// True while a move is outstanding or the motor is still decelerating.
    pub fn is_moving(&self) -> bool {
        self.distance_to_go != 0 || self.speed != 0.0
    }
}

/// Motor control orchestrator.
pub struct MotorControl<D> {
    driver: Driver,
    device: D,
}

impl<D> MotorControl<D> {
    /// Pair a step device with a fresh motion object at position 0.
    pub fn new(device: D) -> Self {
        Self {
            driver: Driver::new(),
            device,
        }
    }

    fn configure(&mut self, cmd: MoveCommand) {
        if cmd.max_speed > 0.0 {
            self.driver.set_max_speed(cmd.max_speed);
        }
        if cmd.acceleration > 0.0 {
            self.driver.set_acceleration(cmd.acceleration);
        }
        self.driver.move_to(cmd.target);
        log::info!(
            "[Motor] target {} ({} steps/s, {} steps/s^2)",
            cmd.target,
            cmd.max_speed,
            cmd.acceleration
        );
    }

    /// Configure a move and return immediately.
    ///
    /// If a move is already in flight, the motion object is re-targeted; the
    /// ramp reverses or extends smoothly from the current speed.
    pub fn start_move(&mut self, cmd: MoveCommand) {
        self.configure(cmd);
    }

    /// Request a stop at the configured deceleration.
    pub fn stop(&mut self) {
        self.driver.stop();
        log::info!("[Motor] Motor stopped.");
    }

    /// True while the driver still has a step to take.
    pub fn is_moving(&self) -> bool {
        self.driver.is_running()
    }

    /// Current motion snapshot.
    pub fn state(&self) -> MotorState {
        MotorState {
            position: self.driver.current_position(),
            target: self.driver.target_position(),
            distance_to_go: self.driver.distance_to_go(),
            speed: self.driver.speed(),
            max_speed: self.driver.max_speed(),
            acceleration: self.driver.acceleration(),
        }
    }

    /// The motion object.
    pub fn driver(&self) -> &Driver {
        &self.driver
    }

    /// The step device.
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Mutable access to the step device.
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }
}

impl<D: Device> MotorControl<D> {
    /// Configure a move and block until it completes.
    pub fn move_blocking<C: SystemClock>(&mut self, cmd: MoveCommand, clock: &C) -> Result<(), D::Error> {
        self.configure(cmd);
        while self.driver.is_running() {
            self.driver.poll(&mut self.device, clock)?;
        }
        log::info!("[Motor] reached {}", self.driver.current_position());
        Ok(())
    }

    /// Advance an outstanding move by one step-if-due.
    ///
    /// Returns `Ok(true)` if a move was outstanding and the driver was
    /// polled, `Ok(false)` if idle.
    pub fn poll<C: SystemClock>(&mut self, clock: &C) -> Result<bool, D::Error> {
        if !self.driver.is_running() {
            return Ok(false);
        }
        self.driver.poll(&mut self.device, clock)?;
        if !self.driver.is_running() {
            log::info!("[Motor] reached {}", self.driver.current_position());
        }
        Ok(true)
    }
}
