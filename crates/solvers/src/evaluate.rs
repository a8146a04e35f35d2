use ndarray::Array1;

use descent_core::Objective;

use crate::Error;

/// Gradient at an iterate, plus the objective value when it is tracked.
#[derive(Debug, Clone)]
pub(crate) struct Evaluation {
    pub(crate) value: Option<f64>,
    pub(crate) gradient: Array1<f64>,
}

impl Evaluation {
    /// Sup-norm of the gradient.
    ///
    /// Any NaN component makes the norm NaN.
    pub(crate) fn grad_norm(&self) -> f64 {
        sup_norm(&self.gradient)
    }
}

/// Evaluates the objective at `x`.
///
/// With `track_value` the value and gradient are computed together,
/// otherwise only the gradient is requested.
///
/// # Errors
///
/// Returns an error if the objective fails or returns a gradient of the wrong
/// length.
pub(crate) fn evaluate<O: Objective>(
    objective: &O,
    x: &Array1<f64>,
    track_value: bool,
) -> Result<Evaluation, Error> {
    let (value, gradient) = if track_value {
        let (value, gradient) = objective.value_and_gradient(x).map_err(Error::objective)?;
        (Some(value), gradient)
    } else {
        (None, objective.gradient(x).map_err(Error::objective)?)
    };

    if gradient.len() != x.len() {
        return Err(Error::DimensionMismatch {
            expected: x.len(),
            found: gradient.len(),
        });
    }

    Ok(Evaluation { value, gradient })
}

/// Largest absolute component, NaN if any component is NaN.
pub(crate) fn sup_norm(v: &Array1<f64>) -> f64 {
    v.iter().fold(0.0, |acc: f64, &vi| {
        if vi.is_nan() || acc.is_nan() {
            f64::NAN
        } else {
            acc.max(vi.abs())
        }
    })
}
