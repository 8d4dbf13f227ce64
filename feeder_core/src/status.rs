//! Terminal outcomes and direction selection for feed requests.

/// Outcome of a single `feed_distance` call.
///
/// This is a closed set: the surrounding process surfaces it over the host
/// protocol verbatim, so new failure modes must map onto an existing variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedResult {
    /// Every requested pip completed and the film re-tensioned.
    Success,
    /// The distance is not a whole number of pips; no line was touched.
    InvalidLength,
    /// A drive phase or the tension cycle gave up before reaching its target.
    MotorFault,
    /// A hardware line failed mid-move; outputs have been halted.
    UnknownError,
}

/// Which way the tape moves, and therefore which advance output is energized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// Backward moves skip the continuous tension hold and slacken the film
    /// with a one-shot pulse instead.
    #[inline]
    pub fn is_forward(self) -> bool {
        matches!(self, Direction::Forward)
    }
}
