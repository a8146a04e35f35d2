use std::error::Error as StdError;

use thiserror::Error;

/// Errors that can occur during a line search.
#[derive(Debug, Error)]
pub enum LineSearchError {
    #[error("not a descent direction (slope {slope})")]
    NotDescent { slope: f64 },

    #[error("starting value or direction is not finite")]
    NonFinite,

    #[error("no acceptable step after {iters} iterations")]
    MaxIters { iters: usize },

    #[error("vector has length {found}, expected {expected}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("objective error: {0}")]
    Objective(#[source] Box<dyn StdError + Send + Sync>),
}

impl LineSearchError {
    pub(crate) fn objective<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        Self::Objective(Box::new(err))
    }
}
