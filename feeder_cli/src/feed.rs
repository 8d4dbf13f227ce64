//! Config mapping, hardware assembly, and feed execution.

use feeder_core::error::Result as CoreResult;
use feeder_core::{BoxedFeeder, Direction, FeedCfg, TensionCfg, ThresholdPhase, conversions};

/// Build the feeder from config: real lines with the `hardware` feature,
/// simulated lines otherwise. `direction` selects the simulated optical
/// waveform; the real sensor does not care.
pub fn assemble(
    cfg: &feeder_config::Config,
    forward_table: Option<Vec<ThresholdPhase>>,
    backward_table: Option<Vec<ThresholdPhase>>,
    strict_timeout_override: bool,
    direction: Direction,
) -> CoreResult<BoxedFeeder> {
    let mut feed: FeedCfg = (&cfg.feed).into();
    if strict_timeout_override {
        feed.strict_timeout = true;
    }
    let tension: TensionCfg = (&cfg.tension).into();

    let (forward_default, backward_default) = conversions::profiles(&cfg.phases);
    let forward = forward_table.unwrap_or(forward_default);
    let backward = backward_table.unwrap_or(backward_default);

    let builder = line_builder(cfg, direction)?;
    builder
        .with_forward_profile(forward)
        .with_backward_profile(backward)
        .with_feed(feed)
        .with_tension(tension)
        .build()
}

#[cfg(feature = "hardware")]
fn line_builder(
    cfg: &feeder_config::Config,
    _direction: Direction,
) -> CoreResult<feeder_core::FeederBuilder> {
    use eyre::WrapErr;
    use feeder_hardware::{AdcOpto, LedLine, SoftPwmLine, SwitchLine};

    let pins = &cfg.pins;
    let hw = &cfg.hardware;
    let opto = AdcOpto::new(hw.spi_bus, hw.spi_cs, pins.opto_channel).wrap_err("open mcp3008")?;
    let switch = SwitchLine::new(pins.film_tension, true).wrap_err("open tension switch")?;
    let drive1 = SoftPwmLine::new(pins.drive1, hw.pwm_hz).wrap_err("open drive1")?;
    let drive2 = SoftPwmLine::new(pins.drive2, hw.pwm_hz).wrap_err("open drive2")?;
    let peel1 = SoftPwmLine::new(pins.peel1, hw.pwm_hz).wrap_err("open peel1")?;
    let peel2 = SoftPwmLine::new(pins.peel2, hw.pwm_hz).wrap_err("open peel2")?;
    let led1 = LedLine::new(pins.led1).wrap_err("open led1")?;

    tracing::info!(
        film_tension = pins.film_tension,
        drive1 = pins.drive1,
        drive2 = pins.drive2,
        peel1 = pins.peel1,
        peel2 = pins.peel2,
        led1 = pins.led1,
        opto_channel = pins.opto_channel,
        "hardware lines open"
    );

    Ok(BoxedFeeder::builder()
        .with_opto(opto)
        .with_tension_switch(switch)
        .with_advance_outputs(drive1, drive2)
        .with_peel_outputs(peel1, peel2)
        .with_indicator(led1))
}

#[cfg(not(feature = "hardware"))]
fn line_builder(
    _cfg: &feeder_config::Config,
    direction: Direction,
) -> CoreResult<feeder_core::FeederBuilder> {
    use feeder_hardware::{SimulatedIndicator, SimulatedMotor, SimulatedOpto, SimulatedTensionSwitch};

    let opto = if direction.is_forward() {
        SimulatedOpto::forward()
    } else {
        SimulatedOpto::backward()
    };
    tracing::info!("running against simulated lines");

    Ok(BoxedFeeder::builder()
        .with_opto(opto)
        .with_tension_switch(SimulatedTensionSwitch::default())
        .with_advance_outputs(SimulatedMotor::new("drive1"), SimulatedMotor::new("drive2"))
        .with_peel_outputs(SimulatedMotor::new("peel1"), SimulatedMotor::new("peel2"))
        .with_indicator(SimulatedIndicator::new()))
}
