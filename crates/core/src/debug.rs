/// Diagnostic verbosity of a solver.
///
/// Set once per solver and read during the iteration loop. It controls what
/// the solver logs and whether objective values are tracked for reporting;
/// it never changes the iterates a solver produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DebugLevel {
    /// Silent.
    #[default]
    None,

    /// One summary record per iteration.
    Low,

    /// Per-iteration summaries plus the full iterate.
    High,
}

impl DebugLevel {
    /// Returns `true` if any diagnostics are enabled.
    #[must_use]
    pub fn is_enabled(self) -> bool {
        self > Self::None
    }
}
