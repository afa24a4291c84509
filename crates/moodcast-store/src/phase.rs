//! Pipeline phase state machine.
//!
//! Decides which commands may start which pipeline runs. Derived from the
//! committed state, never stored separately.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No data and nothing running
    #[default]
    Idle,
    Loading,
    Ready,
    Error,
}

impl Phase {
    /// True if a category or filter change may refresh articles in place.
    pub fn can_refresh_news(self) -> bool {
        matches!(self, Phase::Ready)
    }

    /// True if a unit change re-runs the full pipeline.
    pub fn reruns_on_unit_change(self) -> bool {
        !matches!(self, Phase::Idle)
    }
}
