//! Core-side configuration structs. The TOML-facing schema lives in
//! `feeder_config`; `conversions` bridges the two.

/// Distance bookkeeping and fault policy for feed requests.
#[derive(Debug, Clone)]
pub struct FeedCfg {
    /// Minimum feed increment in tenths of a millimetre (one pip).
    pub pip_tenths_mm: u16,
    /// Propagate drive-phase timeouts as faults. Lenient mode (the default)
    /// reports success on a phase timeout so motors can be exercised on a
    /// partially assembled mechanism.
    pub strict_timeout: bool,
}

impl Default for FeedCfg {
    fn default() -> Self {
        Self {
            pip_tenths_mm: 40,
            strict_timeout: false,
        }
    }
}

/// Film tensioning parameters shared by both directions.
#[derive(Debug, Clone)]
pub struct TensionCfg {
    /// Constant duty level on the peel-wind output while winding.
    pub level: u8,
    /// Give up winding after this long; a live fault path, unlike the
    /// drive-phase timeout.
    pub timeout_ms: u64,
    /// Switch polling interval while winding.
    pub poll_ms: u64,
    /// Duty level of the one-shot slack pulse before a backward move.
    pub slack_level: u8,
    /// Duration of the slack pulse.
    pub slack_ms: u64,
}

impl Default for TensionCfg {
    fn default() -> Self {
        Self {
            level: 130,
            timeout_ms: 4000,
            poll_ms: 5,
            slack_level: 100,
            slack_ms: 400,
        }
    }
}
