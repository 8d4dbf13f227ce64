//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured result output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "feeder", version, about = "Tape feeder CLI")]
pub struct Cli {
    /// Path to config TOML (typed); built-in defaults are used when absent
    #[arg(long, value_name = "FILE", default_value = "etc/feeder_config.toml")]
    pub config: PathBuf,

    /// Recalibrated forward phase table CSV (strict header)
    #[arg(long, value_name = "FILE")]
    pub forward_table: Option<PathBuf>,

    /// Recalibrated backward phase table CSV (strict header)
    #[arg(long, value_name = "FILE")]
    pub backward_table: Option<PathBuf>,

    /// Emit results and logs as JSON lines instead of pretty text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Advance the tape by a distance in tenths of a millimetre
    Feed {
        /// Distance in tenths of a millimetre; must be a whole number of pips
        #[arg(long)]
        tenths_mm: u16,
        /// Feed toward the reel instead of toward the pick window
        #[arg(long, action = ArgAction::SetTrue)]
        backward: bool,
        /// Treat drive-phase timeouts as motor faults (overrides config)
        #[arg(long, action = ArgAction::SetTrue)]
        strict_timeout: bool,
        /// Print total runtime on completion
        #[arg(long, action = ArgAction::SetTrue)]
        print_runtime: bool,
    },
    /// Quick health check (hardware presence / sim ok)
    SelfCheck,
}
