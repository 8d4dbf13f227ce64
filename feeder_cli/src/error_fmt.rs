//! Human-readable result/error descriptions, stable exit codes, and
//! structured JSON output.

use feeder_core::{Direction, FeedResult};

/// Map a feed result to a stable exit code for scripting around the CLI.
pub fn exit_code_for_result(result: FeedResult) -> i32 {
    match result {
        FeedResult::Success => 0,
        FeedResult::InvalidLength => 2,
        FeedResult::MotorFault => 3,
        FeedResult::UnknownError => 4,
    }
}

pub fn result_name(result: FeedResult) -> &'static str {
    match result {
        FeedResult::Success => "Success",
        FeedResult::InvalidLength => "InvalidLength",
        FeedResult::MotorFault => "MotorFault",
        FeedResult::UnknownError => "UnknownError",
    }
}

/// Human explanation with likely causes and fix hints.
pub fn describe(result: FeedResult) -> String {
    match result {
        FeedResult::Success => "Feed complete.".to_string(),
        FeedResult::InvalidLength => {
            "What happened: The distance is not a whole number of pips (4 mm / 40 tenths-mm).\nLikely causes: A host command with an uncalibrated distance.\nHow to fix: Request a multiple of 40 tenths-mm, or change feed.pip_tenths_mm for a different tape pitch.".to_string()
        }
        FeedResult::MotorFault => {
            "What happened: A drive phase or the tension cycle gave up before its target.\nLikely causes: Jammed tape, empty reel, cover film snagged, or thresholds drifted out of calibration.\nHow to fix: Clear the tape path, then check the [phases] tables and tension.timeout_ms against the mechanism.".to_string()
        }
        FeedResult::UnknownError => {
            "What happened: A hardware line failed mid-move; all outputs were halted.\nLikely causes: GPIO/SPI permissions, unwired pins, or a failing driver board.\nHow to fix: Check [pins] in the config and re-run with --log-level=debug for the failing line.".to_string()
        }
    }
}

/// Structured JSON for a feed result when --json is enabled.
pub fn format_result_json(
    result: FeedResult,
    tenths_mm: u16,
    direction: Direction,
    runtime_ms: Option<u64>,
) -> String {
    use serde_json::json;

    let mut obj = json!({
        "result": result_name(result),
        "tenths_mm": tenths_mm,
        "direction": if direction.is_forward() { "forward" } else { "backward" },
        "message": describe(result),
    });
    if let (Some(ms), Some(map)) = (runtime_ms, obj.as_object_mut()) {
        map.insert("runtime_ms".into(), json!(ms));
    }
    obj.to_string()
}

/// Map an eyre::Report from assembly/config to a human-readable explanation.
pub fn humanize(err: &eyre::Report) -> String {
    use feeder_core::BuildError;

    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingOptoSensor
            | BuildError::MissingTensionSwitch
            | BuildError::MissingAdvanceOutput(_)
            | BuildError::MissingPeelOutput(_)
            | BuildError::MissingIndicator => format!(
                "What happened: {be}.\nLikely causes: A hardware line failed to open or was not wired into the builder.\nHow to fix: Check the [pins] values and GPIO/SPI permissions."
            ),
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML or phase CSV.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();
    if lower.contains("open mcp3008") || lower.contains("spi") {
        return "What happened: Failed to open the MCP3008 ADC.\nLikely causes: SPI disabled, wrong bus/chip-select, or insufficient permissions.\nHow to fix: Enable SPI, check [hardware] spi_bus/spi_cs, and verify the process can access /dev/spidev*.".to_string();
    }
    if lower.contains("open") && (lower.contains("drive") || lower.contains("peel") || lower.contains("led") || lower.contains("switch")) {
        return "What happened: Failed to open a GPIO line.\nLikely causes: Incorrect pin numbers or insufficient GPIO permissions.\nHow to fix: Fix the [pins] values in the config; ensure the process may access the GPIO character device.".to_string();
    }
    if lower.contains("phase csv") {
        return format!("Invalid phase table CSV: {msg}");
    }

    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Structured JSON for assembly/config errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;
    json!({ "result": "Error", "message": humanize(err) }).to_string()
}
