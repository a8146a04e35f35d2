use thiserror::Error;

/// Configuration for the backtracking line search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    initial_step: f64,
    c1: f64,
    shrink: f64,
    max_iters: usize,
}

/// Errors that can occur when validating a backtracking config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("initial_step must be finite and positive")]
    InitialStep,

    #[error("c1 must satisfy 0 < c1 < 1")]
    C1,

    #[error("shrink must satisfy 0 < shrink < 1")]
    Shrink,

    #[error("max_iters must be at least 1")]
    MaxIters,
}

impl Default for Config {
    fn default() -> Self {
        // Known-good values, unwrap is safe
        Self::new(1.0, 1e-4, 0.5, 50).unwrap()
    }
}

impl Config {
    /// Creates a new config with validated constants.
    ///
    /// # Errors
    ///
    /// Returns an error if `initial_step` is not finite and positive, if `c1`
    /// or `shrink` lies outside `(0, 1)`, or if `max_iters` is zero.
    pub fn new(
        initial_step: f64,
        c1: f64,
        shrink: f64,
        max_iters: usize,
    ) -> Result<Self, ConfigError> {
        if !initial_step.is_finite() || initial_step <= 0.0 {
            return Err(ConfigError::InitialStep);
        }
        if !(c1 > 0.0 && c1 < 1.0) {
            return Err(ConfigError::C1);
        }
        if !(shrink > 0.0 && shrink < 1.0) {
            return Err(ConfigError::Shrink);
        }
        if max_iters == 0 {
            return Err(ConfigError::MaxIters);
        }

        Ok(Self {
            initial_step,
            c1,
            shrink,
            max_iters,
        })
    }

    /// Returns the first step tried.
    #[must_use]
    pub fn initial_step(&self) -> f64 {
        self.initial_step
    }

    /// Returns the sufficient decrease constant.
    #[must_use]
    pub fn c1(&self) -> f64 {
        self.c1
    }

    /// Returns the factor applied to a rejected step.
    #[must_use]
    pub fn shrink(&self) -> f64 {
        self.shrink
    }

    /// Returns the maximum number of trial steps.
    #[must_use]
    pub fn max_iters(&self) -> usize {
        self.max_iters
    }
}
