use std::error::Error as StdError;

use thiserror::Error;

use crate::line_search::LineSearchError;

/// Errors that can end a minimization run.
///
/// Numerical trouble is not an error. Lost curvature is recovered inside the
/// solver, and non-finite progress or a failed line search is reported
/// through [`Status`](descent_core::Status).
#[derive(Debug, Error)]
pub enum Error {
    #[error("objective error: {0}")]
    Objective(#[source] Box<dyn StdError + Send + Sync>),

    #[error("gradient has length {found}, expected {expected}")]
    DimensionMismatch { expected: usize, found: usize },
}

impl Error {
    pub(crate) fn objective<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        Self::Objective(Box::new(err))
    }

    /// Splits a line search failure into a hard error, or `None` if the run
    /// should end with a status instead.
    pub(crate) fn from_line_search(err: LineSearchError) -> Option<Self> {
        match err {
            LineSearchError::Objective(e) => Some(Self::Objective(e)),
            LineSearchError::DimensionMismatch { expected, found } => {
                Some(Self::DimensionMismatch { expected, found })
            }
            LineSearchError::NotDescent { .. }
            | LineSearchError::NonFinite
            | LineSearchError::MaxIters { .. } => None,
        }
    }
}
