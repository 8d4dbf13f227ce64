//! Assembly and validation of `IndexFeeder` instances.

use std::sync::Arc;

use feeder_traits::{Clock, Indicator, MonotonicClock, MotorOutput, OptoSensor, TensionSwitch};

use crate::config::{FeedCfg, TensionCfg};
use crate::controller::{BoxedFeeder, IndexFeeder};
use crate::error::{BuildError, Result};
use crate::phase::{BACKWARD_PROFILE, FORWARD_PROFILE, ThresholdPhase};

/// Builder for the dynamic (boxed) feeder. All fields are validated on
/// `build()`; missing lines produce a typed `BuildError`.
#[derive(Default)]
pub struct FeederBuilder {
    opto: Option<Box<dyn OptoSensor>>,
    film_tension: Option<Box<dyn TensionSwitch>>,
    drive1: Option<Box<dyn MotorOutput>>,
    drive2: Option<Box<dyn MotorOutput>>,
    peel1: Option<Box<dyn MotorOutput>>,
    peel2: Option<Box<dyn MotorOutput>>,
    led1: Option<Box<dyn Indicator>>,
    forward: Option<Vec<ThresholdPhase>>,
    backward: Option<Vec<ThresholdPhase>>,
    feed: Option<FeedCfg>,
    tension: Option<TensionCfg>,
    clock: Option<Box<dyn Clock + Send + Sync>>,
}

impl BoxedFeeder {
    /// Start building a boxed feeder.
    pub fn builder() -> FeederBuilder {
        FeederBuilder::default()
    }
}

impl FeederBuilder {
    pub fn with_opto(mut self, opto: impl OptoSensor + 'static) -> Self {
        self.opto = Some(Box::new(opto));
        self
    }
    pub fn with_tension_switch(mut self, switch: impl TensionSwitch + 'static) -> Self {
        self.film_tension = Some(Box::new(switch));
        self
    }
    /// Advance pair: `backward` is drive1, `forward` is drive2.
    pub fn with_advance_outputs(
        mut self,
        backward: impl MotorOutput + 'static,
        forward: impl MotorOutput + 'static,
    ) -> Self {
        self.drive1 = Some(Box::new(backward));
        self.drive2 = Some(Box::new(forward));
        self
    }
    /// Peel pair: `release` is peel1, `wind` is peel2.
    pub fn with_peel_outputs(
        mut self,
        release: impl MotorOutput + 'static,
        wind: impl MotorOutput + 'static,
    ) -> Self {
        self.peel1 = Some(Box::new(release));
        self.peel2 = Some(Box::new(wind));
        self
    }
    pub fn with_indicator(mut self, led: impl Indicator + 'static) -> Self {
        self.led1 = Some(Box::new(led));
        self
    }
    /// Override the calibrated forward profile.
    pub fn with_forward_profile(mut self, phases: Vec<ThresholdPhase>) -> Self {
        self.forward = Some(phases);
        self
    }
    /// Override the calibrated backward profile.
    pub fn with_backward_profile(mut self, phases: Vec<ThresholdPhase>) -> Self {
        self.backward = Some(phases);
        self
    }
    pub fn with_feed(mut self, feed: FeedCfg) -> Self {
        self.feed = Some(feed);
        self
    }
    pub fn with_tension(mut self, tension: TensionCfg) -> Self {
        self.tension = Some(tension);
        self
    }
    /// Provide a custom clock; defaults to `MonotonicClock`.
    pub fn with_clock(mut self, clock: Box<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Validate and assemble the feeder.
    pub fn build(self) -> Result<BoxedFeeder> {
        let FeederBuilder {
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
        } = self;

        let opto = opto.ok_or_else(|| eyre::Report::new(BuildError::MissingOptoSensor))?;
        let film_tension =
            film_tension.ok_or_else(|| eyre::Report::new(BuildError::MissingTensionSwitch))?;
        let drive1 =
            drive1.ok_or_else(|| eyre::Report::new(BuildError::MissingAdvanceOutput("backward")))?;
        let drive2 =
            drive2.ok_or_else(|| eyre::Report::new(BuildError::MissingAdvanceOutput("forward")))?;
        let peel1 = peel1.ok_or_else(|| eyre::Report::new(BuildError::MissingPeelOutput("release")))?;
        let peel2 = peel2.ok_or_else(|| eyre::Report::new(BuildError::MissingPeelOutput("wind")))?;
        let led1 = led1.ok_or_else(|| eyre::Report::new(BuildError::MissingIndicator))?;

        let forward = forward.unwrap_or_else(|| FORWARD_PROFILE.to_vec());
        let backward = backward.unwrap_or_else(|| BACKWARD_PROFILE.to_vec());
        let feed = feed.unwrap_or_default();
        let tension = tension.unwrap_or_default();
        let clock: Arc<dyn Clock + Send + Sync> = match clock {
            Some(b) => Arc::from(b),
            None => Arc::new(MonotonicClock::new()),
        };

        validate_parts(&forward, &backward, &feed, &tension)?;

        Ok(IndexFeeder::from_parts(
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
        ))
    }
}

/// Build a statically-dispatched feeder from concrete lines. `None` profiles
/// and configs fall back to the calibrated defaults.
#[allow(clippy::too_many_arguments)]
pub fn build_feeder<O, S, M, L>(
    opto: O,
    film_tension: S,
    drive1: M,
    drive2: M,
    peel1: M,
    peel2: M,
    led1: L,
    forward: Option<Vec<ThresholdPhase>>,
    backward: Option<Vec<ThresholdPhase>>,
    feed: FeedCfg,
    tension: TensionCfg,
    clock: Option<Box<dyn Clock + Send + Sync>>,
) -> Result<IndexFeeder<O, S, M, L>>
where
    O: OptoSensor + 'static,
    S: TensionSwitch + 'static,
    M: MotorOutput + 'static,
    L: Indicator + 'static,
{
    let forward = forward.unwrap_or_else(|| FORWARD_PROFILE.to_vec());
    let backward = backward.unwrap_or_else(|| BACKWARD_PROFILE.to_vec());
    let clock: Arc<dyn Clock + Send + Sync> = match clock {
        Some(b) => Arc::from(b),
        None => Arc::new(MonotonicClock::new()),
    };

    validate_parts(&forward, &backward, &feed, &tension)?;

    Ok(IndexFeeder::from_parts(
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
    ))
}

fn validate_parts(
    forward: &[ThresholdPhase],
    backward: &[ThresholdPhase],
    feed: &FeedCfg,
    tension: &TensionCfg,
) -> Result<()> {
    if feed.pip_tenths_mm == 0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "pip_tenths_mm must be >= 1",
        )));
    }
    if tension.timeout_ms == 0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "tension timeout_ms must be >= 1",
        )));
    }
    if tension.poll_ms == 0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "tension poll_ms must be >= 1",
        )));
    }
    for (name, table) in [("forward", forward), ("backward", backward)] {
        if table.is_empty() {
            return Err(
                eyre::Report::new(BuildError::InvalidConfig("phase table is empty"))
                    .wrap_err(format!("{name} profile")),
            );
        }
        for p in table {
            if p.timeout_ms == 0 || p.drive_ms == 0 {
                return Err(eyre::Report::new(BuildError::InvalidConfig(
                    "phase durations must be >= 1 ms",
                ))
                .wrap_err(format!("{name} profile")));
            }
            if p.drive_level == 0 {
                return Err(eyre::Report::new(BuildError::InvalidConfig(
                    "phase drive_level must be >= 1",
                ))
                .wrap_err(format!("{name} profile")));
            }
        }
    }
    Ok(())
}
