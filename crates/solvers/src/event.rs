use ndarray::Array1;

use descent_core::{Criteria, Status};

/// Events emitted by the solvers.
///
/// `Iterated` arrives once per completed iteration. The other variants
/// report that the solver threw away curvature information and fell back to
/// the steepest-descent direction.
#[derive(Debug, Clone, Copy)]
pub enum Event<'a> {
    /// An iteration completed.
    Iterated {
        /// Progress after this iteration.
        criteria: &'a Criteria,

        /// The new iterate.
        x: &'a Array1<f64>,

        /// The gradient at the new iterate.
        gradient: &'a Array1<f64>,

        /// The objective value at the new iterate, if the solver tracks it.
        value: Option<f64>,

        /// Step length returned by the line search, or zero when the search
        /// direction was zero and the iterate could not move.
        rate: f64,

        /// Result of the convergence check for this iteration.
        status: Status,
    },

    /// The search direction was not a descent direction, so the Hessian
    /// approximation was reset to the identity.
    DirectionReset {
        /// Zero-based index of the iteration in progress.
        iteration: usize,

        /// `gradient · direction` before the reset (positive or NaN).
        slope: f64,
    },

    /// The curvature pair was degenerate, so the Hessian approximation was
    /// reset instead of updated.
    CurvatureSkipped {
        /// Zero-based index of the iteration in progress.
        iteration: usize,

        /// `y · s` for the rejected pair.
        ys: f64,
    },
}

impl Event<'_> {
    /// Returns the number of completed iterations when the event was emitted.
    #[must_use]
    pub fn iterations(&self) -> usize {
        match self {
            Self::Iterated { criteria, .. } => criteria.iterations,
            Self::DirectionReset { iteration, .. } | Self::CurvatureSkipped { iteration, .. } => {
                *iteration
            }
        }
    }
}
