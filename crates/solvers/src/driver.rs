use ndarray::Array1;

use descent_core::{Criteria, DebugLevel, Objective, Observer, Status, check_convergence};

use crate::{Action, Error, Event, evaluate::Evaluation, evaluate::sup_norm};

/// Run state shared by every solver.
///
/// Holds the stopping thresholds (kept across runs until replaced), the
/// progress and status of the latest run, and the diagnostic level.
#[derive(Debug, Clone, PartialEq)]
pub struct Driver {
    stop: Criteria,
    current: Criteria,
    status: Status,
    debug: DebugLevel,
}

impl Default for Driver {
    fn default() -> Self {
        Self::with_stop_criteria(Criteria::defaults())
    }
}

impl Driver {
    /// Creates a driver with the default stopping thresholds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a driver with custom stopping thresholds.
    #[must_use]
    pub fn with_stop_criteria(stop: Criteria) -> Self {
        Self {
            stop,
            current: Criteria::zero(),
            status: Status::NotStarted,
            debug: DebugLevel::None,
        }
    }

    /// Replaces the stopping thresholds.
    ///
    /// Any values are accepted. Non-positive thresholds disable their
    /// criterion, except `x_delta`, which the next run replaces with
    /// [`Criteria::DEFAULT_X_DELTA`].
    pub fn set_stop_criteria(&mut self, stop: Criteria) {
        self.stop = stop;
    }

    /// Returns the stopping thresholds.
    #[must_use]
    pub fn stop_criteria(&self) -> &Criteria {
        &self.stop
    }

    /// Returns the progress of the latest run.
    #[must_use]
    pub fn criteria(&self) -> &Criteria {
        &self.current
    }

    /// Returns the status of the latest run.
    #[must_use]
    pub fn status(&self) -> Status {
        self.status
    }

    /// Sets the diagnostic level.
    pub fn set_debug(&mut self, level: DebugLevel) {
        self.debug = level;
    }

    /// Returns the diagnostic level.
    #[must_use]
    pub fn debug(&self) -> DebugLevel {
        self.debug
    }

    /// Prepares for a new run.
    ///
    /// Zeroes the progress, substitutes the default step tolerance if it is
    /// disabled, and returns whether objective values must be tracked.
    pub(crate) fn start(&mut self, solver: &str) -> bool {
        self.current.reset();
        self.status = Status::Continue;

        if self.stop.x_delta <= 0.0 {
            if self.debug.is_enabled() {
                log::debug!(
                    "[{solver}] x_delta threshold {} is disabled, using {}",
                    self.stop.x_delta,
                    Criteria::DEFAULT_X_DELTA
                );
            }
            self.stop.x_delta = Criteria::DEFAULT_X_DELTA;
        }

        self.debug.is_enabled() || self.stop.f_delta > 0.0
    }

    /// Ends the run if the starting point already satisfies the gradient
    /// tolerance.
    ///
    /// No line search can make progress from a stationary point, so the
    /// solver reports convergence with zero iterations instead.
    pub(crate) fn stationary_start(&mut self, initial: &Evaluation) -> Option<Status> {
        let grad_norm = initial.grad_norm();
        if self.stop.grad_norm > 0.0 && grad_norm <= self.stop.grad_norm {
            self.current.grad_norm = grad_norm;
            return Some(self.finish(Status::GradNormTolerance));
        }
        None
    }

    /// Records a completed iteration and checks for convergence.
    pub(crate) fn record(
        &mut self,
        x_old: &Array1<f64>,
        x: &Array1<f64>,
        previous: &Evaluation,
        next: &Evaluation,
    ) -> Status {
        self.current.x_delta = sup_norm(&(x_old - x));
        self.current.iterations += 1;
        self.current.grad_norm = next.grad_norm();
        if let (Some(f_old), Some(f)) = (previous.value, next.value) {
            self.current.f_delta = (f_old - f).abs();
        }

        self.status = check_convergence(&self.stop, &self.current);
        self.status
    }

    /// Completes an iteration that cannot move because the search direction
    /// is zero.
    ///
    /// The iterate stays put, so the recorded step is zero and the step
    /// tolerance ends the run (unless the iteration cap fires first).
    pub(crate) fn settle<O, Obs>(
        &mut self,
        solver: &str,
        objective: &mut O,
        observer: &mut Obs,
        x: &Array1<f64>,
        current: &Evaluation,
    ) -> Status
    where
        O: Objective,
        Obs: for<'a> Observer<Event<'a>, Action>,
    {
        self.record(x, x, current, current);
        self.conclude(solver, objective, observer, x, current, current, 0.0);
        self.status
    }

    /// Sets the final status of the run.
    pub(crate) fn finish(&mut self, status: Status) -> Status {
        self.status = status;
        status
    }

    /// Reports a completed iteration and decides whether to keep going.
    ///
    /// Logs progress, emits [`Event::Iterated`], then asks the objective's
    /// callback. The run continues only if the observer does not stop it,
    /// the callback agrees, and the convergence check returned `Continue`.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn conclude<O, Obs>(
        &self,
        solver: &str,
        objective: &mut O,
        observer: &mut Obs,
        x: &Array1<f64>,
        previous: &Evaluation,
        next: &Evaluation,
        rate: f64,
    ) -> bool
    where
        O: Objective,
        Obs: for<'a> Observer<Event<'a>, Action>,
    {
        if self.debug.is_enabled() {
            let f = next.value.unwrap_or(f64::NAN);
            let df = previous.value.map_or(f64::NAN, |f_old| f_old - f);
            log::debug!(
                "[{solver}] [{:>5}] f = {f:>12.5e} ({df:>10.3e}), ||g||_inf = {:>10.3e}, rate = {rate:.3e}",
                self.current.iterations,
                self.current.grad_norm,
            );
        }
        if self.debug >= DebugLevel::High {
            log::trace!("[{solver}] [{:>5}] x = {x}", self.current.iterations);
        }

        let event = Event::Iterated {
            criteria: &self.current,
            x,
            gradient: &next.gradient,
            value: next.value,
            rate,
            status: self.status,
        };
        if let Some(Action::StopEarly) = observer.observe(&event) {
            return false;
        }

        objective.callback(&self.current, x) && self.status == Status::Continue
    }

    /// Reports that curvature information was discarded.
    ///
    /// Returns `false` if the observer asks to stop.
    pub(crate) fn discard<Obs>(&self, solver: &str, observer: &mut Obs, event: &Event<'_>) -> bool
    where
        Obs: for<'a> Observer<Event<'a>, Action>,
    {
        if self.debug.is_enabled() {
            match event {
                Event::DirectionReset { iteration, slope } => log::debug!(
                    "[{solver}] [{iteration:>5}] non-descent direction (slope = {slope:.3e}), resetting to -g"
                ),
                Event::CurvatureSkipped { iteration, ys } => log::debug!(
                    "[{solver}] [{iteration:>5}] degenerate curvature (y.s = {ys:.3e}), resetting inverse Hessian"
                ),
                Event::Iterated { .. } => {}
            }
        }

        !matches!(observer.observe(event), Some(Action::StopEarly))
    }
}

/// The lifecycle shared by every solver.
///
/// Implementors provide access to their [`Driver`] and the minimization
/// itself; the remaining methods forward to the driver.
pub trait Solver {
    /// Returns the solver's run state.
    fn driver(&self) -> &Driver;

    /// Returns the solver's run state mutably.
    fn driver_mut(&mut self) -> &mut Driver;

    /// Minimizes `objective` starting from `x0`, reporting to `observer`.
    ///
    /// On return `x0` holds the last iterate, and the returned status equals
    /// [`Solver::status`].
    ///
    /// # Errors
    ///
    /// Returns an error if the objective fails or produces a gradient of the
    /// wrong length. `x0` then holds the last iterate the solver moved to,
    /// which the failed evaluation may have been for, and [`Solver::status`]
    /// keeps the result of the last completed iteration (`Continue` if none
    /// completed).
    fn minimize_observed<O, Obs>(
        &mut self,
        objective: &mut O,
        x0: &mut Array1<f64>,
        observer: Obs,
    ) -> Result<Status, Error>
    where
        O: Objective,
        Obs: for<'a> Observer<Event<'a>, Action>;

    /// Minimizes `objective` starting from `x0`.
    ///
    /// This is a convenience wrapper around [`Solver::minimize_observed`]
    /// that uses a no-op observer.
    ///
    /// # Errors
    ///
    /// Returns an error if the objective fails or produces a gradient of the
    /// wrong length.
    fn minimize<O: Objective>(
        &mut self,
        objective: &mut O,
        x0: &mut Array1<f64>,
    ) -> Result<Status, Error> {
        self.minimize_observed(objective, x0, ())
    }

    /// Replaces the stopping thresholds.
    fn set_stop_criteria(&mut self, stop: Criteria) {
        self.driver_mut().set_stop_criteria(stop);
    }

    /// Returns the stopping thresholds.
    fn stop_criteria(&self) -> &Criteria {
        self.driver().stop_criteria()
    }

    /// Returns the progress of the latest run.
    fn criteria(&self) -> &Criteria {
        self.driver().criteria()
    }

    /// Returns the status of the latest run.
    fn status(&self) -> Status {
        self.driver().status()
    }

    /// Sets the diagnostic level.
    fn set_debug(&mut self, level: DebugLevel) {
        self.driver_mut().set_debug(level);
    }

    /// Returns the diagnostic level.
    fn debug(&self) -> DebugLevel {
        self.driver().debug()
    }
}
