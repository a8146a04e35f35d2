/// Why a minimization run stopped, or that it is still going.
///
/// Each tolerance gets its own variant so callers can tell which criterion
/// ended the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Status {
    /// No run has been started on this solver.
    #[default]
    NotStarted,

    /// No stopping criterion is satisfied yet.
    Continue,

    /// Reached the iteration cap.
    IterationLimit,

    /// The iterate stopped moving (sup-norm of the last step).
    XDeltaTolerance,

    /// The gradient sup-norm fell below tolerance.
    GradNormTolerance,

    /// The objective value stopped changing.
    FDeltaTolerance,

    /// Progress measures or the search direction became non-finite.
    NaN,

    /// The line search could not produce an acceptable step.
    LineSearchFailed,
}

impl Status {
    /// Returns `true` if a convergence tolerance ended the run.
    #[must_use]
    pub fn is_converged(self) -> bool {
        matches!(
            self,
            Self::XDeltaTolerance | Self::GradNormTolerance | Self::FDeltaTolerance
        )
    }

    /// Returns `true` for every outcome that ends a run.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::NotStarted | Self::Continue)
    }
}
