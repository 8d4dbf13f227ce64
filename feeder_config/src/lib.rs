#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and phase-table parsing for the tape feeder.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - The phase CSV loader imports recalibrated threshold tables with strict
//!   headers, so a bad export fails loudly instead of feeding garbage
//!   thresholds into the drive loop.
use serde::Deserialize;

/// Upper bound on phases per direction accepted from config or CSV.
pub const MAX_PHASES: usize = 8;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Pins {
    /// MCP3008 channel carrying the optical index sensor (0..=7).
    pub opto_channel: u8,
    /// GPIO input wired to the film tension switch.
    pub film_tension: u8,
    /// H-bridge leg energized for backward advance.
    pub drive1: u8,
    /// H-bridge leg energized for forward advance.
    pub drive2: u8,
    /// Peel-release leg (held at zero; reserved by the mechanism).
    pub peel1: u8,
    /// Peel-wind leg used for film tensioning and the backward slack pulse.
    pub peel2: u8,
    /// Move-complete indicator LED.
    pub led1: u8,
}

impl Default for Pins {
    fn default() -> Self {
        Self {
            opto_channel: 0,
            film_tension: 17,
            drive1: 22,
            drive2: 23,
            peel1: 24,
            peel2: 25,
            led1: 27,
        }
    }
}

/// Which side of the threshold keeps a phase driving.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Above,
    AtOrBelow,
}

/// One stage of a directional approach profile.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct Phase {
    pub threshold: u16,
    pub comparison: Comparison,
    pub timeout_ms: u64,
    pub drive_level: u8,
    pub drive_ms: u64,
    pub pause_ms: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FeedCfg {
    /// Minimum feed increment in tenths of a millimetre (one pip).
    pub pip_tenths_mm: u16,
    /// Propagate drive-phase timeouts as motor faults instead of the
    /// lenient default.
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

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TensionCfg {
    /// Constant duty level on the peel-wind output while tensioning.
    pub level: u8,
    /// Give up winding after this long.
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

/// Directional threshold tables. Defaults carry the calibration constants of
/// the examined mechanism; override per machine in the TOML or via CSV.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PhasesCfg {
    pub forward: Vec<Phase>,
    pub backward: Vec<Phase>,
}

const PHASE_TIMEOUT_MS: u64 = 10_000;
const DRIVE_LEVEL: u8 = 200;
const DRIVE_MS: u64 = 15;
const PAUSE_MS: u64 = 50;

const fn phase(threshold: u16, comparison: Comparison) -> Phase {
    Phase {
        threshold,
        comparison,
        timeout_ms: PHASE_TIMEOUT_MS,
        drive_level: DRIVE_LEVEL,
        drive_ms: DRIVE_MS,
        pause_ms: PAUSE_MS,
    }
}

impl Default for PhasesCfg {
    fn default() -> Self {
        Self {
            forward: vec![
                phase(900, Comparison::AtOrBelow),
                phase(800, Comparison::Above),
                phase(850, Comparison::AtOrBelow),
            ],
            backward: vec![
                phase(300, Comparison::AtOrBelow),
                phase(200, Comparison::Above),
                phase(250, Comparison::AtOrBelow),
            ],
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Hardware {
    /// SPI bus carrying the MCP3008.
    pub spi_bus: u8,
    /// Chip-select line for the MCP3008.
    pub spi_cs: u8,
    /// Software-PWM frequency for motor outputs (Hz).
    pub pwm_hz: f64,
}

impl Default for Hardware {
    fn default() -> Self {
        Self {
            spi_bus: 0,
            spi_cs: 0,
            // duty-cycle carrier the drive electronics were tuned against
            pwm_hz: 490.0,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub pins: Pins,
    #[serde(default)]
    pub feed: FeedCfg,
    #[serde(default)]
    pub tension: TensionCfg,
    #[serde(default)]
    pub phases: PhasesCfg,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub hardware: Hardware,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    /// Reject configs the drive loop cannot run safely. Called by the CLI
    /// after parsing and by the fuzz target.
    pub fn validate(&self) -> eyre::Result<()> {
        if self.pins.opto_channel > 7 {
            eyre::bail!("pins.opto_channel must be 0..=7 (MCP3008)");
        }
        if self.feed.pip_tenths_mm == 0 {
            eyre::bail!("feed.pip_tenths_mm must be >= 1");
        }
        if self.tension.timeout_ms == 0 {
            eyre::bail!("tension.timeout_ms must be >= 1");
        }
        if self.tension.poll_ms == 0 {
            eyre::bail!("tension.poll_ms must be >= 1");
        }
        if self.hardware.pwm_hz.is_sign_negative()
            || !self.hardware.pwm_hz.is_finite()
            || self.hardware.pwm_hz == 0.0
        {
            eyre::bail!("hardware.pwm_hz must be a positive finite frequency");
        }
        validate_table("phases.forward", &self.phases.forward)?;
        validate_table("phases.backward", &self.phases.backward)?;
        Ok(())
    }
}

fn validate_table(name: &str, table: &[Phase]) -> eyre::Result<()> {
    if table.is_empty() {
        eyre::bail!("{name} must contain at least one phase");
    }
    if table.len() > MAX_PHASES {
        eyre::bail!("{name} has {} phases, maximum is {MAX_PHASES}", table.len());
    }
    for (idx, p) in table.iter().enumerate() {
        if p.timeout_ms == 0 {
            eyre::bail!("{name}[{idx}].timeout_ms must be >= 1");
        }
        if p.drive_ms == 0 {
            eyre::bail!("{name}[{idx}].drive_ms must be >= 1");
        }
        if p.drive_level == 0 {
            eyre::bail!("{name}[{idx}].drive_level must be >= 1");
        }
        if p.threshold > 1023 {
            eyre::bail!("{name}[{idx}].threshold exceeds the 10-bit sensor range");
        }
    }
    Ok(())
}

/// Phase CSV schema.
///
/// Expected headers:
/// threshold,comparison,timeout_ms,drive_level,drive_ms,pause_ms
///
/// Example:
/// threshold,comparison,timeout_ms,drive_level,drive_ms,pause_ms
/// 900,at_or_below,10000,200,15,50
/// 800,above,10000,200,15,50
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct PhaseRow {
    pub threshold: u16,
    pub comparison: Comparison,
    pub timeout_ms: u64,
    pub drive_level: u8,
    pub drive_ms: u64,
    pub pause_ms: u64,
}

impl From<PhaseRow> for Phase {
    fn from(r: PhaseRow) -> Self {
        Phase {
            threshold: r.threshold,
            comparison: r.comparison,
            timeout_ms: r.timeout_ms,
            drive_level: r.drive_level,
            drive_ms: r.drive_ms,
            pause_ms: r.pause_ms,
        }
    }
}

pub fn load_phase_csv(path: &std::path::Path) -> eyre::Result<Vec<Phase>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;
    {
        let headers = rdr.headers()?;
        let expected = [
            "threshold",
            "comparison",
            "timeout_ms",
            "drive_level",
            "drive_ms",
            "pause_ms",
        ];
        if headers.iter().ne(expected) {
            eyre::bail!(
                "phase CSV must have headers {}",
                expected.join(",")
            );
        }
    }
    let mut phases = Vec::new();
    for row in rdr.deserialize::<PhaseRow>() {
        let row = row?;
        phases.push(Phase::from(row));
    }
    if phases.is_empty() {
        eyre::bail!("phase CSV contains no rows");
    }
    if phases.len() > MAX_PHASES {
        eyre::bail!("phase CSV has {} rows, maximum is {MAX_PHASES}", phases.len());
    }
    Ok(phases)
}
