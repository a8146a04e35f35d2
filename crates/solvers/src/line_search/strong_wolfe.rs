//! Line search satisfying the strong Wolfe conditions.
//!
//! # Algorithm
//!
//! Nocedal & Wright, Algorithms 3.5 and 3.6. Starting from a unit step, the
//! bracketing phase doubles the step until it either finds an acceptable
//! step or brackets one: the trial fails sufficient decrease, stops
//! improving, or the slope turns non-negative. The zoom phase then shrinks
//! the bracket with safeguarded cubic interpolation.
//!
//! A step `t` is accepted when
//!
//! ```text
//! f(x + t·d) <= f(x) + c1·t·∇f(x)·d       (sufficient decrease)
//! |∇f(x + t·d)·d| <= c2·|∇f(x)·d|         (strong curvature)
//! ```
//!
//! Both conditions together guarantee `y·s > 0` for the BFGS update, which
//! keeps its inverse-Hessian approximation positive definite.
//!
//! Trial points where the objective is not finite count as "too far" and
//! shrink the bracket.

mod config;
mod interpolate;

pub use config::{Config, ConfigError};

use ndarray::Array1;

use descent_core::Objective;

use super::{
    LineSearch, LineSearchError,
    ray::{Ray, Sample},
};

use interpolate::cubic_step;

/// Strong Wolfe line search.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StrongWolfe {
    config: Config,
}

impl StrongWolfe {
    /// Creates a line search with the given config.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Returns the config.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl LineSearch for StrongWolfe {
    fn search<O: Objective>(
        &self,
        objective: &O,
        x: &Array1<f64>,
        direction: &Array1<f64>,
    ) -> Result<f64, LineSearchError> {
        let ray = Ray::new(objective, x, direction)?;
        let origin = ray.origin()?;
        let conditions = Conditions::new(&self.config, &origin);

        let max_step = self.config.max_step();
        let mut previous = origin;
        let mut alpha = 1.0;

        for iter in 1..=self.config.max_iters() {
            let trial = ray.sample(alpha)?;

            if !trial.is_finite()
                || !conditions.sufficient_decrease(&trial)
                || (iter > 1 && trial.value >= previous.value)
            {
                return zoom(&ray, &conditions, previous, trial, self.config.max_iters());
            }
            if conditions.curvature(&trial) {
                return Ok(trial.alpha);
            }
            if trial.slope >= 0.0 {
                return zoom(&ray, &conditions, trial, previous, self.config.max_iters());
            }
            if alpha >= max_step {
                return Err(LineSearchError::MaxIters { iters: iter });
            }

            previous = trial;
            alpha = (2.0 * alpha).min(max_step);
        }

        Err(LineSearchError::MaxIters {
            iters: self.config.max_iters(),
        })
    }
}

/// Acceptance tests relative to the start of the ray.
struct Conditions {
    value: f64,
    slope: f64,
    c1: f64,
    c2: f64,
}

impl Conditions {
    fn new(config: &Config, origin: &Sample) -> Self {
        Self {
            value: origin.value,
            slope: origin.slope,
            c1: config.c1(),
            c2: config.c2(),
        }
    }

    /// Armijo test; fails for NaN values.
    fn sufficient_decrease(&self, trial: &Sample) -> bool {
        trial.value <= self.value + self.c1 * trial.alpha * self.slope
    }

    fn curvature(&self, trial: &Sample) -> bool {
        trial.slope.abs() <= self.c2 * self.slope.abs()
    }
}

/// Shrinks a bracket known to contain an acceptable step.
///
/// `lo` always satisfies sufficient decrease and has the lowest value seen
/// so far; the slope at `lo` points toward `hi`.
fn zoom<O: Objective>(
    ray: &Ray<'_, O>,
    conditions: &Conditions,
    mut lo: Sample,
    mut hi: Sample,
    max_iters: usize,
) -> Result<f64, LineSearchError> {
    for iter in 1..=max_iters {
        let alpha = cubic_step(&lo, &hi);
        let trial = ray.sample(alpha)?;

        if !trial.is_finite() || !conditions.sufficient_decrease(&trial) || trial.value >= lo.value
        {
            hi = trial;
        } else {
            if conditions.curvature(&trial) {
                return Ok(trial.alpha);
            }
            if trial.slope * (hi.alpha - lo.alpha) >= 0.0 {
                hi = lo;
            }
            lo = trial;
        }

        let width = (hi.alpha - lo.alpha).abs();
        if width <= f64::EPSILON * lo.alpha.abs().max(hi.alpha.abs()) {
            return Err(LineSearchError::MaxIters { iters: iter });
        }
    }

    Err(LineSearchError::MaxIters { iters: max_iters })
}
