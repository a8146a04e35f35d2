//! Step-length selection along a search direction.
//!
//! A [`LineSearch`] receives an iterate `x`, a descent direction `d`, and the
//! objective, and returns a step length `t > 0` such that `x + t·d` is an
//! acceptable next iterate. The solvers trust that contract and do not
//! re-check the conditions a line search enforces.
//!
//! # Line searches
//!
//! - [`strong_wolfe`] — bracketing and zoom with cubic interpolation,
//!   satisfying the strong Wolfe conditions (the BFGS default)
//! - [`backtracking`] — Armijo backtracking, sufficient decrease only
//!   (the gradient descent default)

mod error;
mod ray;

pub mod backtracking;
pub mod strong_wolfe;

pub use backtracking::Backtracking;
pub use error::LineSearchError;
pub use strong_wolfe::StrongWolfe;

use ndarray::Array1;

use descent_core::Objective;

use crate::Error;

/// Chooses a step length along a search direction.
pub trait LineSearch {
    /// Returns a step length `t > 0` for the ray `x + t·direction`.
    ///
    /// # Errors
    ///
    /// Returns an error if `direction` is not a descent direction, if the
    /// starting point or direction is not finite, if no acceptable step is
    /// found within the search's iteration budget, or if the objective fails.
    fn search<O: Objective>(
        &self,
        objective: &O,
        x: &Array1<f64>,
        direction: &Array1<f64>,
    ) -> Result<f64, LineSearchError>;
}

/// Runs a line search on behalf of a solver.
///
/// Returns `Ok(None)` when the search fails or returns a step that is not
/// finite and positive, which ends the run with
/// [`Status::LineSearchFailed`](descent_core::Status::LineSearchFailed).
/// Objective failures and dimension mismatches stay hard errors.
pub(crate) fn step_length<L, O>(
    line_search: &L,
    objective: &O,
    x: &Array1<f64>,
    direction: &Array1<f64>,
    solver: &str,
) -> Result<Option<f64>, Error>
where
    L: LineSearch,
    O: Objective,
{
    match line_search.search(objective, x, direction) {
        Ok(rate) if rate.is_finite() && rate > 0.0 => Ok(Some(rate)),
        Ok(rate) => {
            log::warn!("[{solver}] line search returned an unusable step length {rate}");
            Ok(None)
        }
        Err(err) => {
            log::warn!("[{solver}] line search failed: {err}");
            Error::from_line_search(err).map_or(Ok(None), Err)
        }
    }
}
