//! Mapping of boxed line errors into typed `FeederError`s.

use crate::error::FeederError;

/// Map any error surfaced by a hardware line to a typed `FeederError`, with
/// precise handling for `feeder_hardware` errors when the `hardware-errors`
/// feature is enabled.
pub(crate) fn map_line_error_dyn(e: &(dyn std::error::Error + 'static)) -> FeederError {
    #[cfg(feature = "hardware-errors")]
    if let Some(hw) = e.downcast_ref::<feeder_hardware::error::HwError>() {
        return FeederError::LineFault(hw.to_string());
    }
    FeederError::Line(e.to_string())
}

/// Wrap a boxed line error with call-site context.
pub(crate) fn line_err(
    e: Box<dyn std::error::Error + Send + Sync>,
    what: &'static str,
) -> eyre::Report {
    eyre::Report::new(map_line_error_dyn(&*e)).wrap_err(what)
}
