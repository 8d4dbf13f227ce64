//! `From` implementations bridging `feeder_config` types to `feeder_core`
//! types, so the CLI never maps fields by hand.

use crate::config::{FeedCfg, TensionCfg};
use crate::phase::{Comparison, ThresholdPhase};

impl From<feeder_config::Comparison> for Comparison {
    fn from(c: feeder_config::Comparison) -> Self {
        match c {
            feeder_config::Comparison::Above => Comparison::Above,
            feeder_config::Comparison::AtOrBelow => Comparison::AtOrBelow,
        }
    }
}

impl From<&feeder_config::Phase> for ThresholdPhase {
    fn from(p: &feeder_config::Phase) -> Self {
        Self {
            threshold: p.threshold,
            comparison: p.comparison.into(),
            timeout_ms: p.timeout_ms,
            drive_level: p.drive_level,
            drive_ms: p.drive_ms,
            pause_ms: p.pause_ms,
        }
    }
}

impl From<&feeder_config::FeedCfg> for FeedCfg {
    fn from(c: &feeder_config::FeedCfg) -> Self {
        Self {
            pip_tenths_mm: c.pip_tenths_mm,
            strict_timeout: c.strict_timeout,
        }
    }
}

impl From<&feeder_config::TensionCfg> for TensionCfg {
    fn from(c: &feeder_config::TensionCfg) -> Self {
        Self {
            level: c.level,
            timeout_ms: c.timeout_ms,
            poll_ms: c.poll_ms,
            slack_level: c.slack_level,
            slack_ms: c.slack_ms,
        }
    }
}

/// Convert both configured phase tables into core profiles.
pub fn profiles(
    cfg: &feeder_config::PhasesCfg,
) -> (Vec<ThresholdPhase>, Vec<ThresholdPhase>) {
    let forward = cfg.forward.iter().map(ThresholdPhase::from).collect();
    let backward = cfg.backward.iter().map(ThresholdPhase::from).collect();
    (forward, backward)
}

/// Convert a CSV-loaded phase list into a core profile.
pub fn profile_from_phases(phases: &[feeder_config::Phase]) -> Vec<ThresholdPhase> {
    phases.iter().map(ThresholdPhase::from).collect()
}
