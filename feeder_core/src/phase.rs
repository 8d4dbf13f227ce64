//! Threshold phases: the calibrated approach profiles for one pip of motion.

/// Which side of the threshold keeps a phase driving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Drive while the sensor reads above the threshold.
    Above,
    /// Drive while the sensor reads at or below the threshold.
    AtOrBelow,
}

impl Comparison {
    /// Whether the phase should keep driving for this reading.
    #[inline]
    pub fn holds(self, reading: u16, threshold: u16) -> bool {
        match self {
            Comparison::Above => reading > threshold,
            Comparison::AtOrBelow => reading <= threshold,
        }
    }
}

/// One stage of a directional approach profile.
///
/// A move is a fixed sequence of these: drive the advance output at
/// `drive_level` in `drive_ms`/`pause_ms` duty cycles until the sensor
/// reading leaves the side selected by `comparison`, or `timeout_ms` of wall
/// time elapses.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdPhase {
    pub threshold: u16,
    pub comparison: Comparison,
    pub timeout_ms: u64,
    pub drive_level: u8,
    pub drive_ms: u64,
    pub pause_ms: u64,
}

const PHASE_TIMEOUT_MS: u64 = 10_000;
const DRIVE_LEVEL: u8 = 200;
const DRIVE_MS: u64 = 15;
const PAUSE_MS: u64 = 50;

const fn phase(threshold: u16, comparison: Comparison) -> ThresholdPhase {
    ThresholdPhase {
        threshold,
        comparison,
        timeout_ms: PHASE_TIMEOUT_MS,
        drive_level: DRIVE_LEVEL,
        drive_ms: DRIVE_MS,
        pause_ms: PAUSE_MS,
    }
}

/// Calibrated forward profile: approach the coarse boundary, detect the
/// overshoot past the tighter one, then settle back across the middle one.
/// The staged thresholds absorb sensor noise and sprocket backlash without a
/// closed-loop controller.
pub const FORWARD_PROFILE: [ThresholdPhase; 3] = [
    phase(900, Comparison::AtOrBelow),
    phase(800, Comparison::Above),
    phase(850, Comparison::AtOrBelow),
];

/// Calibrated backward profile; same shape as forward on the low end of the
/// sensor range.
pub const BACKWARD_PROFILE: [ThresholdPhase; 3] = [
    phase(300, Comparison::AtOrBelow),
    phase(200, Comparison::Above),
    phase(250, Comparison::AtOrBelow),
];
