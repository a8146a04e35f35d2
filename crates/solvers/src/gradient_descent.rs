//! Steepest descent minimization.
//!
//! Each iteration moves along `d = -g` by a step from the line search, with
//! the same progress bookkeeping, stopping rules, and observer hooks as
//! [`bfgs`](crate::bfgs). Convergence is linear at best, so prefer BFGS
//! unless the problem is well conditioned or each gradient is cheap.
//!
//! A non-finite gradient ends the run with [`Status::NaN`], and a failed line
//! search with [`Status::LineSearchFailed`]. An exactly zero gradient
//! completes one iteration without moving, which ends the run on the step
//! tolerance.
//!
//! # Observer Events
//!
//! - [`Event::Iterated`] after every completed iteration
//!
//! Observers can return [`Action::StopEarly`] to end the run.


use ndarray::Array1;

use descent_core::{Criteria, DebugLevel, Objective, Observer, Status};

use crate::{
    Action, Driver, Error, Event, Solution, Solver,
    evaluate::evaluate,
    line_search::{Backtracking, LineSearch, step_length},
};

const NAME: &str = "GradientDescent";

/// Steepest descent solver, generic over its line search.
#[derive(Debug, Clone, Default)]
pub struct GradientDescent<L = Backtracking> {
    driver: Driver,
    line_search: L,
}

impl<L: LineSearch> GradientDescent<L> {
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

impl<L: LineSearch> Solver for GradientDescent<L> {
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
        let mut x_old = x0.clone();
        let track_value = self.driver.start(NAME);

        let mut current = evaluate(objective, x0, track_value)?;
        if let Some(status) = self.driver.stationary_start(&current) {
            return Ok(status);
        }

        loop {
            if current.gradient.iter().any(|g| !g.is_finite()) {
                return Ok(self.driver.finish(Status::NaN));
            }
            if current.gradient.iter().all(|&g| g == 0.0) {
                return Ok(self.driver.settle(NAME, objective, &mut observer, x0, &current));
            }
            let direction = -&current.gradient;

            let Some(rate) = step_length(&self.line_search, objective, x0, &direction, NAME)?
            else {
                return Ok(self.driver.finish(Status::LineSearchFailed));
            };
            x0.scaled_add(rate, &direction);

            let next = evaluate(objective, x0, track_value)?;
            self.driver.record(&x_old, x0, &current, &next);
            x_old.assign(&*x0);

            let keep_going = self.driver.conclude(
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

/// Minimizes the objective with steepest descent and backtracking.
///
/// The starting point is left untouched; the final iterate is returned in
/// the [`Solution`].
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
    let mut solver = GradientDescent::new(Backtracking::default()).with_stop_criteria(stop);
    let mut x = x0.clone();
    let status = solver.minimize_observed(objective, &mut x, observer)?;

    Ok(Solution {
        status,
        x,
        criteria: *solver.criteria(),
    })
}

/// Minimizes the objective with steepest descent without observer support.
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
