use ndarray::Array1;

use descent_core::Objective;

use super::LineSearchError;

/// The objective restricted to `t ↦ f(x + t·d)`, evaluated at one `t`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct Sample {
    /// Step length `t`.
    pub(super) alpha: f64,

    /// `f(x + t·d)`.
    pub(super) value: f64,

    /// `∇f(x + t·d) · d`.
    pub(super) slope: f64,
}

impl Sample {
    pub(super) fn is_finite(&self) -> bool {
        self.value.is_finite() && self.slope.is_finite()
    }
}

/// A ray `x + t·d` through the objective.
pub(super) struct Ray<'a, O> {
    objective: &'a O,
    x: &'a Array1<f64>,
    direction: &'a Array1<f64>,
}

impl<'a, O: Objective> Ray<'a, O> {
    /// Creates a ray, checking that the direction is usable.
    pub(super) fn new(
        objective: &'a O,
        x: &'a Array1<f64>,
        direction: &'a Array1<f64>,
    ) -> Result<Self, LineSearchError> {
        if direction.len() != x.len() {
            return Err(LineSearchError::DimensionMismatch {
                expected: x.len(),
                found: direction.len(),
            });
        }
        if direction.iter().any(|d| !d.is_finite()) {
            return Err(LineSearchError::NonFinite);
        }

        Ok(Self {
            objective,
            x,
            direction,
        })
    }

    /// Evaluates the objective at the start of the ray, which must be finite
    /// and sloping downhill.
    pub(super) fn origin(&self) -> Result<Sample, LineSearchError> {
        let origin = self.sample(0.0)?;
        if !origin.value.is_finite() {
            return Err(LineSearchError::NonFinite);
        }
        if origin.slope >= 0.0 || origin.slope.is_nan() {
            return Err(LineSearchError::NotDescent {
                slope: origin.slope,
            });
        }
        Ok(origin)
    }

    /// Evaluates the objective value at step `alpha`.
    pub(super) fn value(&self, alpha: f64) -> Result<f64, LineSearchError> {
        self.objective
            .value(&self.point(alpha))
            .map_err(LineSearchError::objective)
    }

    /// Evaluates the objective value and directional derivative at step `alpha`.
    pub(super) fn sample(&self, alpha: f64) -> Result<Sample, LineSearchError> {
        let (value, gradient) = self
            .objective
            .value_and_gradient(&self.point(alpha))
            .map_err(LineSearchError::objective)?;

        if gradient.len() != self.x.len() {
            return Err(LineSearchError::DimensionMismatch {
                expected: self.x.len(),
                found: gradient.len(),
            });
        }

        Ok(Sample {
            alpha,
            value,
            slope: gradient.dot(self.direction),
        })
    }

    fn point(&self, alpha: f64) -> Array1<f64> {
        let mut point = self.x.clone();
        point.scaled_add(alpha, self.direction);
        point
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::convert::Infallible;

    use approx::assert_relative_eq;
    use ndarray::array;

    /// f(x) = x·x
    struct Bowl;

    impl Objective for Bowl {
        type Error = Infallible;

        fn value(&self, x: &Array1<f64>) -> Result<f64, Self::Error> {
            Ok(x.dot(x))
        }

        fn gradient(&self, x: &Array1<f64>) -> Result<Array1<f64>, Self::Error> {
            Ok(x * 2.0)
        }
    }

    #[test]
    fn samples_value_and_slope_along_the_ray() {
        let x = array![1.0, 2.0];
        let d = array![-1.0, 0.0];
        let ray = Ray::new(&Bowl, &x, &d).unwrap();

        let sample = ray.sample(0.5).unwrap();

        // x + 0.5·d = [0.5, 2.0]
        assert_relative_eq!(sample.value, 4.25);
        assert_relative_eq!(sample.slope, -1.0);
        assert_relative_eq!(ray.value(1.0).unwrap(), 4.0);
    }

    #[test]
    fn origin_must_slope_downhill() {
        let x = array![1.0];
        let uphill = array![1.0];
        let ray = Ray::new(&Bowl, &x, &uphill).unwrap();

        assert!(matches!(
            ray.origin(),
            Err(LineSearchError::NotDescent { slope }) if slope > 0.0
        ));
    }

    #[test]
    fn rejects_non_finite_direction() {
        let x = array![1.0];
        let d = array![f64::NAN];

        assert!(matches!(
            Ray::new(&Bowl, &x, &d),
            Err(LineSearchError::NonFinite)
        ));
    }

    #[test]
    fn rejects_mismatched_direction() {
        let x = array![1.0, 2.0];
        let d = array![-1.0];

        assert!(matches!(
            Ray::new(&Bowl, &x, &d),
            Err(LineSearchError::DimensionMismatch {
                expected: 2,
                found: 1
            })
        ));
    }
}
