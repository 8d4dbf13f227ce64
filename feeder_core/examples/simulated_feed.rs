//! Feed two pips of simulated tape and print the result.
//!
//! Run with `cargo run -p feeder_core --example simulated_feed`. The scripted
//! sensor replays one optical pip profile per move and the virtual clock
//! advances only when the drive loop sleeps, so the whole thing finishes
//! instantly.

use feeder_core::mocks::{
    RecordingIndicator, RecordingMotor, ScriptedOpto, ScriptedSwitch, StepClock,
};
use feeder_core::{Direction, FeedCfg, Feeder, TensionCfg, build_feeder};

fn main() -> Result<(), eyre::Report> {
    // One pip's worth of optical readings, twice: approach 900, overshoot
    // back through 800, settle above 850.
    let mut waveform = Vec::new();
    for _ in 0..2 {
        waveform.extend_from_slice(&[600, 920, 850, 780, 900]);
    }

    let drive2 = RecordingMotor::new();
    let pulses = drive2.log();

    let mut feeder = build_feeder(
        ScriptedOpto::new(waveform),
        ScriptedSwitch::trips_after(2),
        RecordingMotor::new(),
        drive2,
        RecordingMotor::new(),
        RecordingMotor::new(),
        RecordingIndicator::new(),
        None,
        None,
        FeedCfg::default(),
        TensionCfg::default(),
        Some(Box::new(StepClock::new())),
    )?;

    assert!(feeder.init());

    // 80 tenths-mm = two pips forward.
    let result = feeder.feed_distance(80, Direction::Forward);
    println!("feed result: {result:?}");
    println!(
        "forward advance pulses issued: {}",
        pulses.borrow().iter().filter(|&&l| l > 0).count()
    );
    Ok(())
}
