use ndarray::Array1;

use crate::Criteria;

/// A differentiable scalar function to be minimized.
///
/// Solvers call [`Objective::gradient`] to choose directions, line searches
/// call [`Objective::value`] and [`Objective::value_and_gradient`] to choose
/// step lengths, and [`Objective::callback`] runs once per completed
/// iteration to let the caller end the run.
///
/// Numerical trouble (NaN or infinite values) is not an error: return the
/// value and the solver deals with it. Use [`Self::Error`] for failures
/// where no value can be produced at all.
pub trait Objective {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Computes the objective value at `x`.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the value cannot be computed.
    fn value(&self, x: &Array1<f64>) -> Result<f64, Self::Error>;

    /// Computes the gradient at `x`.
    ///
    /// The returned vector must have the same length as `x`.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the gradient cannot be computed.
    fn gradient(&self, x: &Array1<f64>) -> Result<Array1<f64>, Self::Error>;

    /// Computes the value and gradient at `x` together.
    ///
    /// The default calls [`Self::value`] and [`Self::gradient`]; override it
    /// when both share work.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if either cannot be computed.
    fn value_and_gradient(&self, x: &Array1<f64>) -> Result<(f64, Array1<f64>), Self::Error> {
        Ok((self.value(x)?, self.gradient(x)?))
    }

    /// Decides whether the solver should keep iterating.
    ///
    /// Called once per completed iteration with the run's progress and the
    /// new iterate. Returning `false` ends the run after this iteration.
    fn callback(&mut self, _current: &Criteria, _x: &Array1<f64>) -> bool {
        true
    }
}
