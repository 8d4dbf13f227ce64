//! The two bounded feedback loops every move is built from.

use std::time::Duration;

use feeder_traits::{Clock, MotorOutput, OptoSensor, TensionSwitch};

use crate::config::TensionCfg;
use crate::error::Result;
use crate::hw_error::line_err;
use crate::phase::ThresholdPhase;

/// Execute one threshold phase: pulse `motor` at the phase's duty cycle while
/// the phase comparison holds for the sensor reading and wall time remains.
///
/// Returns `Ok(true)` when the comparison stopped holding (the tape reached
/// the phase target) and `Ok(false)` on timeout with `strict_timeout`
/// enabled. With `strict_timeout` disabled a timeout still exits the loop but
/// reports success, which keeps a partially assembled mechanism drivable; the
/// expiry is logged so it stays observable.
///
/// The driven output is always at zero when this returns: every duty cycle
/// ends in the zero-level pause, and a phase whose comparison does not hold
/// at entry issues no pulse at all.
pub fn run_drive_phase<O, M, C>(
    opto: &mut O,
    motor: &mut M,
    clock: &C,
    phase: &ThresholdPhase,
    strict_timeout: bool,
) -> Result<bool>
where
    O: OptoSensor,
    M: MotorOutput,
    C: Clock + ?Sized,
{
    let epoch = clock.now();
    loop {
        let reading = opto.read().map_err(|e| line_err(e, "opto read"))?;
        tracing::trace!(reading, threshold = phase.threshold, "phase sample");
        if !phase.comparison.holds(reading, phase.threshold) {
            return Ok(true);
        }
        if clock.ms_since(epoch) >= phase.timeout_ms {
            break;
        }
        motor.set_level(phase.drive_level).map_err(|e| line_err(e, "drive pulse"))?;
        clock.sleep(Duration::from_millis(phase.drive_ms));
        motor.set_level(0).map_err(|e| line_err(e, "drive pause"))?;
        clock.sleep(Duration::from_millis(phase.pause_ms));
    }

    if strict_timeout {
        return Ok(false);
    }
    tracing::warn!(
        threshold = phase.threshold,
        timeout_ms = phase.timeout_ms,
        "phase timed out; lenient mode reports success"
    );
    Ok(true)
}

/// Wind the cover film at a constant level until the tension switch trips or
/// the timeout elapses. The peel output is zeroed on every exit path; the
/// caller is expected to follow up with a full halt of all motor outputs.
///
/// Unlike the drive phase, the timeout here is a live fault: `Ok(false)`
/// means the film never came taut.
pub fn run_tension_cycle<S, M, C>(
    switch: &mut S,
    peel: &mut M,
    clock: &C,
    cfg: &TensionCfg,
) -> Result<bool>
where
    S: TensionSwitch,
    M: MotorOutput,
    C: Clock + ?Sized,
{
    let epoch = clock.now();
    let wound = loop {
        if switch
            .is_tensioned()
            .map_err(|e| line_err(e, "tension switch read"))?
        {
            break true;
        }
        if clock.ms_since(epoch) >= cfg.timeout_ms {
            break false;
        }
        peel.set_level(cfg.level).map_err(|e| line_err(e, "peel wind"))?;
        clock.sleep(Duration::from_millis(cfg.poll_ms));
    };
    peel.set_level(0).map_err(|e| line_err(e, "peel stop"))?;
    if !wound {
        tracing::warn!(timeout_ms = cfg.timeout_ms, "film never came taut");
    }
    Ok(wound)
}
