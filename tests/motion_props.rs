//! Property tests for moves driven through the motor orchestrator.

use proptest::prelude::*;
use stepper_portal::hal::{MockClock, MockStepper};
use stepper_portal::{MotorControl, MoveCommand};

fn clock() -> MockClock {
    MockClock::new().with_auto_advance_us(50)
}

/// Poll until idle, failing the test if the move never ends.
fn settle(motor: &mut MotorControl<MockStepper>, clock: &MockClock) {
    let mut polls = 0u64;
    while motor.poll(clock).unwrap() {
        polls += 1;
        assert!(polls < 5_000_000, "motion did not finish");
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn move_from_rest_lands_on_target(
        target in -2500i64..2500,
        max_speed in 500.0f32..3000.0,
        accel in 500.0f32..4000.0,
    ) {
        let mut motor = MotorControl::new(MockStepper::new());
        let clock = clock();
        motor.start_move(MoveCommand::new(target, max_speed, accel));
        settle(&mut motor, &clock);

        let device = motor.device();
        prop_assert_eq!(device.position, target);
        prop_assert!(device.pulses >= target.unsigned_abs());
        prop_assert!(!motor.state().is_moving());
    }

    #[test]
    fn retarget_mid_move_ends_on_last_target(
        first in -2000i64..2000,
        second in -2000i64..2000,
        polls_before_switch in 1u32..20_000,
    ) {
        let mut motor = MotorControl::new(MockStepper::new());
        let clock = clock();
        motor.start_move(MoveCommand::new(first, 1500.0, 1800.0));
        for _ in 0..polls_before_switch {
            if !motor.poll(&clock).unwrap() {
                break;
            }
        }
        motor.start_move(MoveCommand::new(second, 1500.0, 1800.0));
        settle(&mut motor, &clock);

        prop_assert_eq!(motor.state().position, second);
        prop_assert_eq!(motor.device().position, second);
        prop_assert_eq!(motor.state().speed, 0.0);
    }

    #[test]
    fn stop_comes_to_rest_on_its_own_target(polls_before_stop in 1u32..40_000) {
        let mut motor = MotorControl::new(MockStepper::new());
        let clock = clock();
        motor.start_move(MoveCommand::forward());
        for _ in 0..polls_before_stop {
            if !motor.poll(&clock).unwrap() {
                break;
            }
        }
        motor.stop();
        settle(&mut motor, &clock);

        let state = motor.state();
        prop_assert_eq!(state.distance_to_go, 0);
        prop_assert_eq!(state.speed, 0.0);
        prop_assert_eq!(motor.device().position, state.position);
        prop_assert!(state.position >= 0, "stopped at {}", state.position);
    }
}
