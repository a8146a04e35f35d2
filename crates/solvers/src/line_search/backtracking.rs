//! Armijo backtracking line search.
//!
//! Tries `initial_step` and multiplies the step by `shrink` until
//!
//! ```text
//! f(x + t·d) <= f(x) + c1·t·∇f(x)·d
//! ```
//!
//! holds. Only the sufficient decrease condition is enforced, so this search
//! suits steepest descent but gives BFGS no curvature guarantee. Non-finite
//! trial values are rejected like any other failed trial.

mod config;

pub use config::{Config, ConfigError};

use ndarray::Array1;

use descent_core::Objective;

use super::{LineSearch, LineSearchError, ray::Ray};

/// Armijo backtracking line search.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Backtracking {
    config: Config,
}

impl Backtracking {
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

impl LineSearch for Backtracking {
    fn search<O: Objective>(
        &self,
        objective: &O,
        x: &Array1<f64>,
        direction: &Array1<f64>,
    ) -> Result<f64, LineSearchError> {
        let ray = Ray::new(objective, x, direction)?;
        let origin = ray.origin()?;
        let c1 = self.config.c1();

        let mut alpha = self.config.initial_step();
        for _ in 0..self.config.max_iters() {
            let value = ray.value(alpha)?;
            if value <= origin.value + c1 * alpha * origin.slope {
                return Ok(alpha);
            }
            alpha *= self.config.shrink();
        }

        Err(LineSearchError::MaxIters {
            iters: self.config.max_iters(),
        })
    }
}
