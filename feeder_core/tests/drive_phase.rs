use std::time::Duration;

use feeder_core::mocks::{RecordingMotor, ScriptedOpto, StepClock, last_level, pulses};
use feeder_core::{Comparison, ThresholdPhase, run_drive_phase};
use feeder_traits::OptoSensor;

fn phase(threshold: u16, comparison: Comparison) -> ThresholdPhase {
    ThresholdPhase {
        threshold,
        comparison,
        timeout_ms: 10_000,
        drive_level: 200,
        drive_ms: 15,
        pause_ms: 50,
    }
}

#[test]
fn returns_immediately_when_condition_already_clear() {
    let mut opto = ScriptedOpto::new(vec![950]);
    let mut motor = RecordingMotor::new();
    let log = motor.log();
    let clock = StepClock::new();

    let reached = run_drive_phase(
        &mut opto,
        &mut motor,
        &clock,
        &phase(900, Comparison::AtOrBelow),
        false,
    )
    .expect("drive phase");

    assert!(reached);
    assert_eq!(pulses(&log), 0, "no pulse when already past the threshold");
    assert!(log.borrow().is_empty(), "output untouched");
    assert_eq!(clock.elapsed(), Duration::ZERO);
}

#[test]
fn pulses_at_the_duty_cycle_until_the_threshold_is_crossed() {
    let mut opto = ScriptedOpto::new(vec![600, 700, 920]);
    let mut motor = RecordingMotor::new();
    let log = motor.log();
    let clock = StepClock::new();

    let reached = run_drive_phase(
        &mut opto,
        &mut motor,
        &clock,
        &phase(900, Comparison::AtOrBelow),
        false,
    )
    .expect("drive phase");

    assert!(reached);
    assert_eq!(*log.borrow(), vec![200, 0, 200, 0]);
    // Two full drive/pause cycles of virtual time.
    assert_eq!(clock.elapsed(), Duration::from_millis(2 * (15 + 50)));
    assert_eq!(last_level(&log), 0);
}

#[test]
fn strict_timeout_reports_phase_failure() {
    let mut opto = ScriptedOpto::new(vec![600]);
    let mut motor = RecordingMotor::new();
    let log = motor.log();
    let clock = StepClock::new();

    let reached = run_drive_phase(
        &mut opto,
        &mut motor,
        &clock,
        &phase(900, Comparison::AtOrBelow),
        true,
    )
    .expect("drive phase");

    assert!(!reached);
    assert!(clock.elapsed() >= Duration::from_millis(10_000));
    assert_eq!(last_level(&log), 0, "output at zero even on the fault path");
}

#[test]
fn lenient_timeout_reports_success() {
    let mut opto = ScriptedOpto::new(vec![600]);
    let mut motor = RecordingMotor::new();
    let clock = StepClock::new();

    let reached = run_drive_phase(
        &mut opto,
        &mut motor,
        &clock,
        &phase(900, Comparison::AtOrBelow),
        false,
    )
    .expect("drive phase");

    assert!(reached, "timeout is not a fault in lenient mode");
}

#[test]
fn timeout_is_wall_clock_relative_not_iteration_counted() {
    // Duty cycle of 120 ms against a 100 ms budget: exactly one pulse fits,
    // however many iterations the loop could otherwise run.
    let slow = ThresholdPhase {
        threshold: 900,
        comparison: Comparison::AtOrBelow,
        timeout_ms: 100,
        drive_level: 200,
        drive_ms: 60,
        pause_ms: 60,
    };
    let mut opto = ScriptedOpto::new(vec![600]);
    let mut motor = RecordingMotor::new();
    let log = motor.log();
    let clock = StepClock::new();

    let reached = run_drive_phase(&mut opto, &mut motor, &clock, &slow, false)
        .expect("drive phase");

    assert!(reached);
    assert_eq!(pulses(&log), 1);
}

#[test]
fn sensor_error_propagates_with_context() {
    struct BrokenOpto;
    impl OptoSensor for BrokenOpto {
        fn read(&mut self) -> Result<u16, Box<dyn std::error::Error + Send + Sync>> {
            Err("adc gone".into())
        }
    }

    let mut motor = RecordingMotor::new();
    let clock = StepClock::new();
    let err = run_drive_phase(
        &mut BrokenOpto,
        &mut motor,
        &clock,
        &phase(900, Comparison::AtOrBelow),
        false,
    )
    .expect_err("should propagate sensor error");

    assert!(format!("{err}").contains("opto read"));
}
