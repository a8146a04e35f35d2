use thiserror::Error;

/// Configuration for the strong Wolfe line search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    c1: f64,
    c2: f64,
    max_iters: usize,
    max_step: f64,
}

/// Errors that can occur when validating a strong Wolfe config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("c1 must satisfy 0 < c1 < 1")]
    C1,

    #[error("c2 must satisfy c1 < c2 < 1")]
    C2,

    #[error("max_iters must be at least 1")]
    MaxIters,

    #[error("max_step must be finite and at least 1")]
    MaxStep,
}

impl Default for Config {
    fn default() -> Self {
        // Known-good values, unwrap is safe
        Self::new(1e-4, 0.9, 30, 1e3).unwrap()
    }
}

impl Config {
    /// Creates a new config with validated constants.
    ///
    /// `c1` scales the sufficient decrease condition and `c2` the curvature
    /// condition. The bracketing phase doubles the step from 1 up to
    /// `max_step`; each phase tries at most `max_iters` steps.
    ///
    /// # Errors
    ///
    /// Returns an error if `0 < c1 < c2 < 1` does not hold, if `max_iters` is
    /// zero, or if `max_step` is not finite or is below 1.
    pub fn new(c1: f64, c2: f64, max_iters: usize, max_step: f64) -> Result<Self, ConfigError> {
        if !(c1 > 0.0 && c1 < 1.0) {
            return Err(ConfigError::C1);
        }
        if !(c2 > c1 && c2 < 1.0) {
            return Err(ConfigError::C2);
        }
        if max_iters == 0 {
            return Err(ConfigError::MaxIters);
        }
        if !max_step.is_finite() || max_step < 1.0 {
            return Err(ConfigError::MaxStep);
        }

        Ok(Self {
            c1,
            c2,
            max_iters,
            max_step,
        })
    }

    /// Returns the sufficient decrease constant.
    #[must_use]
    pub fn c1(&self) -> f64 {
        self.c1
    }

    /// Returns the curvature constant.
    #[must_use]
    pub fn c2(&self) -> f64 {
        self.c2
    }

    /// Returns the maximum number of trial steps per phase.
    #[must_use]
    pub fn max_iters(&self) -> usize {
        self.max_iters
    }

    /// Returns the largest step the bracketing phase will try.
    #[must_use]
    pub fn max_step(&self) -> f64 {
        self.max_step
    }
}
