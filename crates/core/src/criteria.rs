use crate::Status;

/// Convergence-relevant quantities of a minimization run.
///
/// The same record plays two roles. As a solver's stopping thresholds it
/// holds the limit for each quantity, where a non-positive value (or zero
/// iterations) disables that criterion. As a run's progress it holds the
/// values measured after the most recent iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Criteria {
    /// Completed iterations.
    pub iterations: usize,

    /// Sup-norm of the difference between successive iterates.
    pub x_delta: f64,

    /// Absolute change in objective value over the last iteration.
    pub f_delta: f64,

    /// Sup-norm of the gradient at the current iterate.
    pub grad_norm: f64,
}

impl Criteria {
    /// Default iteration cap.
    pub const DEFAULT_ITERATIONS: usize = 200;

    /// Default step tolerance, also substituted when a solver is asked to run
    /// with a non-positive `x_delta`.
    pub const DEFAULT_X_DELTA: f64 = 1e-7;

    /// Default gradient tolerance.
    pub const DEFAULT_GRAD_NORM: f64 = 1e-6;

    /// Returns the default stopping thresholds.
    ///
    /// The objective-change criterion is disabled by default because it
    /// requires tracking objective values.
    #[must_use]
    pub const fn defaults() -> Self {
        Self {
            iterations: Self::DEFAULT_ITERATIONS,
            x_delta: Self::DEFAULT_X_DELTA,
            f_delta: 0.0,
            grad_norm: Self::DEFAULT_GRAD_NORM,
        }
    }

    /// Returns a record with every quantity zeroed, the state of a run's
    /// progress before its first iteration.
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            iterations: 0,
            x_delta: 0.0,
            f_delta: 0.0,
            grad_norm: 0.0,
        }
    }

    /// Zeroes every quantity in place.
    pub fn reset(&mut self) {
        *self = Self::zero();
    }

    /// Returns these thresholds with the iteration cap replaced.
    #[must_use]
    pub const fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Returns these thresholds with the step tolerance replaced.
    #[must_use]
    pub const fn with_x_delta(mut self, x_delta: f64) -> Self {
        self.x_delta = x_delta;
        self
    }

    /// Returns these thresholds with the objective-change tolerance replaced.
    #[must_use]
    pub const fn with_f_delta(mut self, f_delta: f64) -> Self {
        self.f_delta = f_delta;
        self
    }

    /// Returns these thresholds with the gradient tolerance replaced.
    #[must_use]
    pub const fn with_grad_norm(mut self, grad_norm: f64) -> Self {
        self.grad_norm = grad_norm;
        self
    }
}

impl Default for Criteria {
    fn default() -> Self {
        Self::defaults()
    }
}

/// Classifies a run's progress against stopping thresholds.
///
/// Criteria are checked in a fixed order so that simultaneously satisfied
/// criteria always resolve the same way:
///
/// 1. iteration cap (the safety bound)
/// 2. non-finite progress (`NaN` compares false against every threshold)
/// 3. step size
/// 4. gradient norm
/// 5. objective change (only after at least one iteration)
///
/// A threshold that is non-positive, or an iteration cap of zero, disables
/// its criterion.
#[must_use]
pub fn check_convergence(stop: &Criteria, current: &Criteria) -> Status {
    if stop.iterations > 0 && current.iterations >= stop.iterations {
        return Status::IterationLimit;
    }

    if current.x_delta.is_nan() || current.grad_norm.is_nan() || current.f_delta.is_nan() {
        return Status::NaN;
    }

    if stop.x_delta > 0.0 && current.x_delta <= stop.x_delta {
        return Status::XDeltaTolerance;
    }

    if stop.grad_norm > 0.0 && current.grad_norm <= stop.grad_norm {
        return Status::GradNormTolerance;
    }

    if stop.f_delta > 0.0 && current.iterations > 0 && current.f_delta <= stop.f_delta {
        return Status::FDeltaTolerance;
    }

    Status::Continue
}
