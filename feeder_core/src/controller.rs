//! The feed controller: distance validation, per-pip sequencing, tensioning.

use std::sync::Arc;
use std::time::Duration;

use feeder_traits::{Clock, Indicator, MotorOutput, OptoSensor, TensionSwitch};

use crate::config::{FeedCfg, TensionCfg};
use crate::drive::{run_drive_phase, run_tension_cycle};
use crate::error::Result;
use crate::hw_error::line_err;
use crate::phase::ThresholdPhase;
use crate::status::{Direction, FeedResult};
use crate::util::pips_for_distance;

/// The feeder capability consumed by the surrounding process. One concrete
/// implementation exists today; future mechanism variants implement the same
/// pair of operations and are selected by static configuration.
pub trait Feeder {
    /// Re-assert the safe resting state of every owned line. Idempotent;
    /// `false` only when a line write fails.
    fn init(&mut self) -> bool;

    /// Advance the tape by `tenths_mm` in `direction`, one pip at a time.
    /// Fully blocking; runs to a terminal result before returning.
    fn feed_distance(&mut self, tenths_mm: u16, direction: Direction) -> FeedResult;
}

/// Sprocket-and-peeler feeder with an optical index sensor.
///
/// Owns every hardware line it touches for its whole lifetime: the optical
/// sensor, the film tension switch, one advance output per direction, the
/// peel pair, and the move-complete indicator. Execution is single-threaded
/// and blocking, so no line is ever shared or locked.
pub struct IndexFeeder<O, S, M, L> {
    opto: O,
    film_tension: S,
    /// Advance leg for backward motion.
    drive1: M,
    /// Advance leg for forward motion.
    drive2: M,
    /// Peel-release leg; held at zero, reserved by the mechanism.
    peel1: M,
    /// Peel-wind leg: tension hold, slack pulse, and the tension cycle.
    peel2: M,
    led1: L,
    forward: Vec<ThresholdPhase>,
    backward: Vec<ThresholdPhase>,
    feed: FeedCfg,
    tension: TensionCfg,
    clock: Arc<dyn Clock + Send + Sync>,
}

/// Dynamic (boxed) variant assembled by `FeederBuilder`.
pub type BoxedFeeder = IndexFeeder<
    Box<dyn OptoSensor>,
    Box<dyn TensionSwitch>,
    Box<dyn MotorOutput>,
    Box<dyn Indicator>,
>;

impl<O, S, M, L> core::fmt::Debug for IndexFeeder<O, S, M, L> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IndexFeeder")
            .field("pip_tenths_mm", &self.feed.pip_tenths_mm)
            .field("strict_timeout", &self.feed.strict_timeout)
            .field("forward_phases", &self.forward.len())
            .field("backward_phases", &self.backward.len())
            .finish()
    }
}

impl<O, S, M, L> IndexFeeder<O, S, M, L>
where
    O: OptoSensor,
    S: TensionSwitch,
    M: MotorOutput,
    L: Indicator,
{
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        opto: O,
        film_tension: S,
        drive1: M,
        drive2: M,
        peel1: M,
        peel2: M,
        led1: L,
        forward: Vec<ThresholdPhase>,
        backward: Vec<ThresholdPhase>,
        feed: FeedCfg,
        tension: TensionCfg,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self {
            opto,
            film_tension,
            drive1,
            drive2,
            peel1,
            peel2,
            led1,
            forward,
            backward,
            feed,
            tension,
            clock,
        }
    }

    /// Zero every motor output. Safe to call in any state.
    fn halt(&mut self) -> Result<()> {
        self.drive1.set_level(0).map_err(|e| line_err(e, "halt drive1"))?;
        self.drive2.set_level(0).map_err(|e| line_err(e, "halt drive2"))?;
        self.peel1.set_level(0).map_err(|e| line_err(e, "halt peel1"))?;
        self.peel2.set_level(0).map_err(|e| line_err(e, "halt peel2"))?;
        Ok(())
    }

    /// One pip forward: hold film tension while the sprocket works through
    /// the forward profile, then signal completion and re-tension.
    fn move_forward(&mut self) -> Result<bool> {
        self.halt()?;
        self.led1
            .set_active(false)
            .map_err(|e| line_err(e, "indicator off"))?;
        // Constant hold, not pulsed: keeps the film taut while the tape moves
        // under it.
        self.peel2
            .set_level(self.tension.level)
            .map_err(|e| line_err(e, "tension hold"))?;

        for idx in 0..self.forward.len() {
            let ph = self.forward[idx];
            let reached = run_drive_phase(
                &mut self.opto,
                &mut self.drive2,
                self.clock.as_ref(),
                &ph,
                self.feed.strict_timeout,
            )?;
            if !reached {
                return Ok(false);
            }
            tracing::debug!(phase = idx, "forward phase complete");
        }

        self.peel2
            .set_level(0)
            .map_err(|e| line_err(e, "tension hold stop"))?;
        self.led1
            .set_active(true)
            .map_err(|e| line_err(e, "indicator on"))?;
        self.wind_film()
    }

    /// One pip backward: slacken the film first (reverse motion has no
    /// continuous hold to work against), run the backward profile, re-tension.
    fn move_backward(&mut self) -> Result<bool> {
        self.halt()?;

        // One-shot slack pulse; imprecise on purpose, the tension cycle
        // recovers whatever is unspooled here.
        self.peel2
            .set_level(self.tension.slack_level)
            .map_err(|e| line_err(e, "slack pulse"))?;
        self.clock.sleep(Duration::from_millis(self.tension.slack_ms));
        self.peel2
            .set_level(0)
            .map_err(|e| line_err(e, "slack pulse stop"))?;

        for idx in 0..self.backward.len() {
            let ph = self.backward[idx];
            let reached = run_drive_phase(
                &mut self.opto,
                &mut self.drive1,
                self.clock.as_ref(),
                &ph,
                self.feed.strict_timeout,
            )?;
            if !reached {
                return Ok(false);
            }
            tracing::debug!(phase = idx, "backward phase complete");
        }

        self.wind_film()
    }

    /// Run the tension cycle, then unconditionally halt all motor outputs.
    fn wind_film(&mut self) -> Result<bool> {
        let wound = run_tension_cycle(
            &mut self.film_tension,
            &mut self.peel2,
            self.clock.as_ref(),
            &self.tension,
        );
        self.halt()?;
        wound
    }
}

impl<O, S, M, L> Feeder for IndexFeeder<O, S, M, L>
where
    O: OptoSensor,
    S: TensionSwitch,
    M: MotorOutput,
    L: Indicator,
{
    fn init(&mut self) -> bool {
        // Line directions are fixed when the handles are acquired; this
        // re-asserts the resting state so repeated calls converge on the same
        // configuration.
        let settled = self.halt().and_then(|()| {
            self.led1
                .set_active(false)
                .map_err(|e| line_err(e, "indicator reset"))
        });
        match settled {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "init failed to settle lines");
                false
            }
        }
    }

    fn feed_distance(&mut self, tenths_mm: u16, direction: Direction) -> FeedResult {
        let Some(pips) = pips_for_distance(tenths_mm, self.feed.pip_tenths_mm) else {
            tracing::info!(
                tenths_mm,
                pip_tenths_mm = self.feed.pip_tenths_mm,
                "distance is not a whole number of pips"
            );
            return FeedResult::InvalidLength;
        };

        tracing::info!(tenths_mm, pips, ?direction, "feed start");
        for pip_idx in 0..pips {
            let moved = if direction.is_forward() {
                self.move_forward()
            } else {
                self.move_backward()
            };
            match moved {
                Ok(true) => {}
                Ok(false) => {
                    // Prior pips are mechanically irreversible; report the
                    // fault and leave the tape where it is.
                    let _ = self.halt();
                    tracing::error!(pip_idx, ?direction, "pip move gave up before its target");
                    return FeedResult::MotorFault;
                }
                Err(e) => {
                    let _ = self.halt();
                    tracing::error!(error = %e, pip_idx, ?direction, "hardware line failed mid-move");
                    return FeedResult::UnknownError;
                }
            }
        }
        tracing::info!(tenths_mm, pips, ?direction, "feed complete");
        FeedResult::Success
    }
}
