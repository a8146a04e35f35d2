//! BFGS quasi-Newton minimization.
//!
//! # Algorithm
//!
//! BFGS keeps an approximation `H` of the inverse Hessian, starting from the
//! identity. Each iteration:
//!
//! 1. Computes the direction `d = -H·g`.
//! 2. Checks that `d` is a descent direction (`g·d <= 0`). If not, or if the
//!    slope is NaN, `H` is reset to the identity and `d = -g`.
//! 3. Asks the line search for a step length `t` and moves to `x + t·d`.
//! 4. Updates `H` from the step `s = t·d` and gradient change `y`, unless
//!    `y·s` is too small to carry curvature information, in which case `H`
//!    is reset instead.
//! 5. Records progress, checks the stopping criteria, and asks the
//!    objective's callback and the observer whether to continue.
//!
//! With a line search that enforces the curvature condition (the default
//! [`StrongWolfe`]), `y·s > 0` holds at every step and `H` stays positive
//! definite, so resets only happen under numerical trouble.
//!
//! On a strictly convex quadratic with exact line searches, BFGS reaches the
//! minimizer in at most `D` iterations for dimension `D`.
//!
//! # Termination
//!
//! The run ends when [`check_convergence`](descent_core::check_convergence)
//! reports anything other than `Continue`, when the callback or observer
//! asks to stop, when the line search fails ([`Status::LineSearchFailed`]),
//! or when even the steepest-descent direction is not finite
//! ([`Status::NaN`]). A starting point that already meets the gradient
//! tolerance returns immediately with zero iterations. An exactly zero
//! direction completes one iteration without moving, which ends the run on
//! the step tolerance.
//!
//! A disabled step tolerance (`x_delta <= 0`) is replaced by
//! [`Criteria::DEFAULT_X_DELTA`] before the first iteration.
//!
//! # Observer Events
//!
//! - [`Event::Iterated`] after every completed iteration
//! - [`Event::DirectionReset`] when the descent check resets `H`
//! - [`Event::CurvatureSkipped`] when a degenerate pair resets `H`
//!
//! Observers can return [`Action::StopEarly`] to end the run.

mod update;

#[cfg(test)]
mod tests;

use ndarray::{Array1, Array2};

use descent_core::{Criteria, DebugLevel, Objective, Observer, Status};

use crate::{
    Action, Driver, Error, Event, Solution, Solver,
    evaluate::evaluate,
    line_search::{LineSearch, StrongWolfe, step_length},
};

use update::{Direction, Update, search_direction, update_inverse_hessian};

const NAME: &str = "BFGS";

/// BFGS solver, generic over its line search.
#[derive(Debug, Clone, Default)]
pub struct Bfgs<L = StrongWolfe> {
    driver: Driver,
    line_search: L,
}

impl<L: LineSearch> Bfgs<L> {
    /// Creates a solver with default stopping thresholds.
    #[must_use]
    pub fn new(line_search: L) -> Self {
        Self {
            driver: Driver::new(),
            line_search,
        }
    }

    /// Replaces the stopping thresholds.
    #[must_use]
    pub fn with_stop_criteria(mut self, stop: Criteria) -> Self {
        self.driver.set_stop_criteria(stop);
        self
    }

    /// Sets the diagnostic level.
    #[must_use]
    pub fn with_debug(mut self, level: DebugLevel) -> Self {
        self.driver.set_debug(level);
        self
    }

    /// Returns the line search.
    #[must_use]
    pub fn line_search(&self) -> &L {
        &self.line_search
    }
}

impl<L: LineSearch> Solver for Bfgs<L> {
    fn driver(&self) -> &Driver {
        &self.driver
    }

    fn driver_mut(&mut self) -> &mut Driver {
        &mut self.driver
    }

    fn minimize_observed<O, Obs>(
        &mut self,
        objective: &mut O,
        x0: &mut Array1<f64>,
        mut observer: Obs,
    ) -> Result<Status, Error>
    where
        O: Objective,
        Obs: for<'a> Observer<Event<'a>, Action>,
    {
        let mut h = Array2::<f64>::eye(x0.len());
        let mut x_old = x0.clone();
        let track_value = self.driver.start(NAME);

        let mut current = evaluate(objective, x0, track_value)?;
        if let Some(status) = self.driver.stationary_start(&current) {
            return Ok(status);
        }

        loop {
            let iteration = self.driver.criteria().iterations;

            let direction = match search_direction(&mut h, &current.gradient) {
                Direction::QuasiNewton(direction) => direction,
                Direction::Reset { direction, slope } => {
                    let event = Event::DirectionReset { iteration, slope };
                    if !self.driver.discard(NAME, &mut observer, &event) {
                        return Ok(self.driver.status());
                    }
                    direction
                }
            };
            if direction.iter().any(|d| !d.is_finite()) {
                return Ok(self.driver.finish(Status::NaN));
            }
            if direction.iter().all(|&d| d == 0.0) {
                return Ok(self.driver.settle(NAME, objective, &mut observer, x0, &current));
            }

            let Some(rate) = step_length(&self.line_search, objective, x0, &direction, NAME)?
            else {
                return Ok(self.driver.finish(Status::LineSearchFailed));
            };

            let step = direction * rate;
            *x0 += &step;

            let next = evaluate(objective, x0, track_value)?;
            let gradient_change = &next.gradient - &current.gradient;
            let update = update_inverse_hessian(&mut h, &step, &gradient_change);

            self.driver.record(&x_old, x0, &current, &next);
            x_old.assign(&*x0);

            let mut keep_going = true;
            if let Update::Skipped { ys } = update {
                let event = Event::CurvatureSkipped { iteration, ys };
                keep_going = self.driver.discard(NAME, &mut observer, &event);
            }
            keep_going = keep_going
                && self.driver.conclude(
                    NAME,
                    objective,
                    &mut observer,
                    x0,
                    &current,
                    &next,
                    rate,
                );

            current = next;
            if !keep_going {
                return Ok(self.driver.status());
            }
        }
    }
}

/// Minimizes the objective with BFGS and the default line search.
///
/// Unlike [`Solver::minimize`], this leaves the starting point untouched and
/// returns the final iterate in the [`Solution`].
///
/// # Errors
///
/// Returns an error if the objective fails or produces a gradient of the
/// wrong length.
pub fn minimize<O, Obs>(
    objective: &mut O,
    x0: &Array1<f64>,
    stop: Criteria,
    observer: Obs,
) -> Result<Solution, Error>
where
    O: Objective,
    Obs: for<'a> Observer<Event<'a>, Action>,
{
    let mut solver = Bfgs::new(StrongWolfe::default()).with_stop_criteria(stop);
    let mut x = x0.clone();
    let status = solver.minimize_observed(objective, &mut x, observer)?;

    Ok(Solution {
        status,
        x,
        criteria: *solver.criteria(),
    })
}

/// Minimizes the objective with BFGS without observer support.
///
/// This is a convenience wrapper around [`minimize`] that uses a no-op observer.
///
/// # Errors
///
/// Returns an error if the objective fails or produces a gradient of the
/// wrong length.
pub fn minimize_unobserved<O: Objective>(
    objective: &mut O,
    x0: &Array1<f64>,
    stop: Criteria,
) -> Result<Solution, Error> {
    minimize(objective, x0, stop, ())
}
