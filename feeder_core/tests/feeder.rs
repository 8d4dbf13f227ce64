use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use feeder_core::mocks::{
    FailingMotor, RecordingIndicator, RecordingMotor, ScriptedOpto, ScriptedSwitch, StepClock,
    last_level, pulses,
};
use feeder_core::{
    BoxedFeeder, Comparison, Direction, FeedCfg, FeedResult, Feeder, ThresholdPhase,
};

/// One forward pip against the calibrated profile: cross 900 going up,
/// fall back through 800, land above 850.
const FORWARD_PIP: [u16; 5] = [600, 920, 850, 780, 900];
/// One backward pip: cross 300 going up, fall through 200, land above 250.
const BACKWARD_PIP: [u16; 5] = [250, 350, 260, 180, 300];

struct Logs {
    drive1: Rc<RefCell<Vec<u8>>>,
    drive2: Rc<RefCell<Vec<u8>>>,
    peel1: Rc<RefCell<Vec<u8>>>,
    peel2: Rc<RefCell<Vec<u8>>>,
    led: Rc<RefCell<Vec<bool>>>,
}

fn rig(opto: Vec<u16>, switch: ScriptedSwitch, feed: FeedCfg) -> (BoxedFeeder, Logs, StepClock) {
    let drive1 = RecordingMotor::new();
    let drive2 = RecordingMotor::new();
    let peel1 = RecordingMotor::new();
    let peel2 = RecordingMotor::new();
    let led = RecordingIndicator::new();
    let logs = Logs {
        drive1: drive1.log(),
        drive2: drive2.log(),
        peel1: peel1.log(),
        peel2: peel2.log(),
        led: led.log(),
    };
    let clock = StepClock::new();
    let feeder = BoxedFeeder::builder()
        .with_opto(ScriptedOpto::new(opto))
        .with_tension_switch(switch)
        .with_advance_outputs(drive1, drive2)
        .with_peel_outputs(peel1, peel2)
        .with_indicator(led)
        .with_feed(feed)
        .with_clock(Box::new(clock.clone()))
        .build()
        .expect("build feeder");
    (feeder, logs, clock)
}

fn total_writes(logs: &Logs) -> usize {
    logs.drive1.borrow().len()
        + logs.drive2.borrow().len()
        + logs.peel1.borrow().len()
        + logs.peel2.borrow().len()
        + logs.led.borrow().len()
}

#[test]
fn rejects_non_multiple_distance_without_touching_lines() {
    let (mut feeder, logs, _clock) = rig(vec![], ScriptedSwitch::trips_after(0), FeedCfg::default());

    for d in [39, 41, 100, 7] {
        assert_eq!(
            feeder.feed_distance(d, Direction::Forward),
            FeedResult::InvalidLength
        );
    }
    assert_eq!(total_writes(&logs), 0, "no line may be touched");
}

#[test]
fn zero_distance_is_a_valid_noop() {
    let (mut feeder, logs, _clock) = rig(vec![], ScriptedSwitch::trips_after(0), FeedCfg::default());

    assert_eq!(
        feeder.feed_distance(0, Direction::Forward),
        FeedResult::Success
    );
    assert_eq!(total_writes(&logs), 0);
}

#[test]
fn single_forward_pip_runs_phases_hold_and_tension() {
    let (mut feeder, logs, _clock) = rig(
        FORWARD_PIP.to_vec(),
        ScriptedSwitch::trips_after(2),
        FeedCfg::default(),
    );

    assert_eq!(
        feeder.feed_distance(40, Direction::Forward),
        FeedResult::Success
    );

    // Two of the three phases needed exactly one pulse; the third was already
    // past its threshold.
    assert_eq!(pulses(&logs.drive2), 2);
    assert_eq!(pulses(&logs.drive1), 0, "backward leg stays idle");
    assert_eq!(pulses(&logs.peel1), 0, "release leg stays idle");

    // Tension hold at the constant level, then two winds from the cycle.
    let peel2 = logs.peel2.borrow();
    assert_eq!(peel2.iter().filter(|&&l| l == 130).count(), 3);
    drop(peel2);

    // Indicator: cleared while moving, set once the phases completed.
    assert_eq!(*logs.led.borrow(), vec![false, true]);

    // Every motor output rests at zero.
    for log in [&logs.drive1, &logs.drive2, &logs.peel1, &logs.peel2] {
        assert_eq!(last_level(log), 0);
    }
}

#[test]
fn single_backward_pip_slackens_then_drives_the_opposite_leg() {
    let (mut feeder, logs, _clock) = rig(
        BACKWARD_PIP.to_vec(),
        ScriptedSwitch::trips_after(1),
        FeedCfg::default(),
    );

    assert_eq!(
        feeder.feed_distance(40, Direction::Backward),
        FeedResult::Success
    );

    assert_eq!(pulses(&logs.drive1), 2);
    assert_eq!(pulses(&logs.drive2), 0, "forward leg stays idle");

    // Slack pulse precedes any advance: first nonzero peel2 level is the
    // slack level, not the tension level.
    let first_peel = logs
        .peel2
        .borrow()
        .iter()
        .copied()
        .find(|&l| l > 0)
        .expect("peel2 must be driven");
    assert_eq!(first_peel, 100);

    // Backward moves never touch the indicator.
    assert!(logs.led.borrow().is_empty());

    for log in [&logs.drive1, &logs.drive2, &logs.peel1, &logs.peel2] {
        assert_eq!(last_level(log), 0);
    }
}

#[test]
fn three_pip_feed_aborts_on_second_pip_failure() {
    let mut script = Vec::new();
    for _ in 0..3 {
        script.extend_from_slice(&FORWARD_PIP);
    }
    // Pip 1 tensions on the first poll; the switch then never trips again,
    // so pip 2's tension cycle times out.
    let (mut feeder, logs, clock) = rig(
        script,
        ScriptedSwitch::from_script([true, false]),
        FeedCfg::default(),
    );

    assert_eq!(
        feeder.feed_distance(120, Direction::Forward),
        FeedResult::MotorFault
    );

    // Two pips attempted (one indicator off/on pair each); the third never
    // started.
    assert_eq!(logs.led.borrow().len(), 4);

    // Pip 1 + pip 2 phases plus one 4 s tension timeout; a third pip would
    // have pushed well past this.
    assert!(clock.elapsed() < Duration::from_millis(6000));

    for log in [&logs.drive1, &logs.drive2, &logs.peel1, &logs.peel2] {
        assert_eq!(last_level(log), 0);
    }
}

#[test]
fn tension_timeout_is_a_motor_fault() {
    let (mut feeder, logs, clock) = rig(
        FORWARD_PIP.to_vec(),
        ScriptedSwitch::never_trips(),
        FeedCfg::default(),
    );

    assert_eq!(
        feeder.feed_distance(40, Direction::Forward),
        FeedResult::MotorFault
    );
    assert!(clock.elapsed() >= Duration::from_millis(4000));
    for log in [&logs.drive1, &logs.drive2, &logs.peel1, &logs.peel2] {
        assert_eq!(last_level(log), 0);
    }
}

#[test]
fn strict_timeout_turns_a_stuck_phase_into_a_fault() {
    let feed = FeedCfg {
        strict_timeout: true,
        ..FeedCfg::default()
    };
    // Reading never leaves the first phase's drive side.
    let (mut feeder, logs, clock) = rig(vec![600], ScriptedSwitch::trips_after(0), feed);

    assert_eq!(
        feeder.feed_distance(40, Direction::Forward),
        FeedResult::MotorFault
    );
    assert!(clock.elapsed() >= Duration::from_millis(10_000));
    assert_eq!(last_level(&logs.drive2), 0);
    assert_eq!(last_level(&logs.peel2), 0, "tension hold released on abort");
}

#[test]
fn lenient_timeout_reports_success_by_default() {
    // Same stuck reading, strict_timeout off: phases expire quietly and the
    // move "succeeds" once the film tensions.
    let (mut feeder, _logs, clock) = rig(
        vec![600],
        ScriptedSwitch::trips_after(0),
        FeedCfg::default(),
    );

    assert_eq!(
        feeder.feed_distance(40, Direction::Forward),
        FeedResult::Success
    );
    // Phase 1 and phase 3 both ran to their full timeout.
    assert!(clock.elapsed() >= Duration::from_millis(20_000));
}

#[test]
fn line_failure_maps_to_unknown_error() {
    let clock = StepClock::new();
    let mut feeder = BoxedFeeder::builder()
        .with_opto(ScriptedOpto::new(FORWARD_PIP.to_vec()))
        .with_tension_switch(ScriptedSwitch::trips_after(0))
        .with_advance_outputs(RecordingMotor::new(), FailingMotor)
        .with_peel_outputs(RecordingMotor::new(), RecordingMotor::new())
        .with_indicator(RecordingIndicator::new())
        .with_clock(Box::new(clock))
        .build()
        .expect("build feeder");

    assert_eq!(
        feeder.feed_distance(40, Direction::Forward),
        FeedResult::UnknownError
    );
}

#[test]
fn init_is_idempotent_and_reports_success() {
    let (mut feeder, logs, _clock) = rig(vec![], ScriptedSwitch::trips_after(0), FeedCfg::default());

    assert!(feeder.init());
    let after_once: Vec<u8> = [&logs.drive1, &logs.drive2, &logs.peel1, &logs.peel2]
        .iter()
        .map(|log| last_level(log))
        .collect();
    assert_eq!(after_once, vec![0, 0, 0, 0]);
    assert_eq!(logs.led.borrow().last(), Some(&false));

    assert!(feeder.init());
    let after_twice: Vec<u8> = [&logs.drive1, &logs.drive2, &logs.peel1, &logs.peel2]
        .iter()
        .map(|log| last_level(log))
        .collect();
    assert_eq!(after_twice, after_once);
    assert_eq!(logs.led.borrow().last(), Some(&false));
}

#[test]
fn init_reports_failure_when_a_line_write_fails() {
    let clock = StepClock::new();
    let mut feeder = BoxedFeeder::builder()
        .with_opto(ScriptedOpto::new(vec![]))
        .with_tension_switch(ScriptedSwitch::trips_after(0))
        .with_advance_outputs(FailingMotor, RecordingMotor::new())
        .with_peel_outputs(RecordingMotor::new(), RecordingMotor::new())
        .with_indicator(RecordingIndicator::new())
        .with_clock(Box::new(clock))
        .build()
        .expect("build feeder");

    assert!(!feeder.init());
}

#[test]
fn directions_share_the_phase_algorithm() {
    // Same single-phase profile both ways: the two directions must issue
    // identical drive sequences on their respective legs.
    let profile = vec![ThresholdPhase {
        threshold: 500,
        comparison: Comparison::AtOrBelow,
        timeout_ms: 1000,
        drive_level: 180,
        drive_ms: 10,
        pause_ms: 20,
    }];

    let run = |direction: Direction| -> (Vec<u8>, Vec<u8>) {
        let drive1 = RecordingMotor::new();
        let drive2 = RecordingMotor::new();
        let (log1, log2) = (drive1.log(), drive2.log());
        let mut feeder = BoxedFeeder::builder()
            .with_opto(ScriptedOpto::new(vec![400, 600]))
            .with_tension_switch(ScriptedSwitch::trips_after(0))
            .with_advance_outputs(drive1, drive2)
            .with_peel_outputs(RecordingMotor::new(), RecordingMotor::new())
            .with_indicator(RecordingIndicator::new())
            .with_forward_profile(profile.clone())
            .with_backward_profile(profile.clone())
            .with_clock(Box::new(StepClock::new()))
            .build()
            .expect("build feeder");
        assert_eq!(feeder.feed_distance(40, direction), FeedResult::Success);
        let l1 = log1.borrow().clone();
        let l2 = log2.borrow().clone();
        (l1, l2)
    };

    let (fwd_drive1, fwd_drive2) = run(Direction::Forward);
    let (bwd_drive1, bwd_drive2) = run(Direction::Backward);

    assert_eq!(fwd_drive2, bwd_drive1, "same pulse train, opposite leg");
    assert_eq!(pulses(&Rc::new(RefCell::new(fwd_drive1))), 0);
    assert_eq!(pulses(&Rc::new(RefCell::new(bwd_drive2))), 0);
}
