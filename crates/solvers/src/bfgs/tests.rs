use std::{cell::Cell, convert::Infallible};

use approx::assert_relative_eq;
use log::Level;
use ndarray::{Array1, Array2, array};
use thiserror::Error;

use descent_core::{Criteria, DebugLevel, Objective, Status};

use crate::{
    Action, Error, Event, Solver,
    line_search::{LineSearch, LineSearchError, StrongWolfe},
};

use super::{Bfgs, minimize_unobserved};

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

fn rosenbrock(x: &Array1<f64>) -> f64 {
    (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0].powi(2)).powi(2)
}

/// Rosenbrock function in two dimensions, optionally vetoing the run once
/// `veto_after` iterations have completed.
#[derive(Default)]
struct Rosenbrock {
    veto_after: Option<usize>,
}

impl Objective for Rosenbrock {
    type Error = Infallible;

    fn value(&self, x: &Array1<f64>) -> Result<f64, Self::Error> {
        Ok(rosenbrock(x))
    }

    fn gradient(&self, x: &Array1<f64>) -> Result<Array1<f64>, Self::Error> {
        Ok(array![
            -2.0 * (1.0 - x[0]) - 400.0 * x[0] * (x[1] - x[0].powi(2)),
            200.0 * (x[1] - x[0].powi(2)),
        ])
    }

    fn callback(&mut self, current: &Criteria, _x: &Array1<f64>) -> bool {
        self.veto_after.is_none_or(|limit| current.iterations < limit)
    }
}

/// f(x) = ½·xᵀAx − b·x with A symmetric positive definite.
struct Quadratic {
    a: Array2<f64>,
    b: Array1<f64>,
}

impl Quadratic {
    fn new() -> Self {
        Self {
            a: array![[4.0, 1.0, 0.0], [1.0, 3.0, 1.0], [0.0, 1.0, 2.0]],
            b: array![1.0, 2.0, 3.0],
        }
    }
}

impl Objective for Quadratic {
    type Error = Infallible;

    fn value(&self, x: &Array1<f64>) -> Result<f64, Self::Error> {
        Ok(0.5 * x.dot(&self.a.dot(x)) - self.b.dot(x))
    }

    fn gradient(&self, x: &Array1<f64>) -> Result<Array1<f64>, Self::Error> {
        Ok(self.a.dot(x) - &self.b)
    }
}

/// f(x) = -x, so the gradient never changes.
struct Ramp;

impl Objective for Ramp {
    type Error = Infallible;

    fn value(&self, x: &Array1<f64>) -> Result<f64, Self::Error> {
        Ok(-x[0])
    }

    fn gradient(&self, _x: &Array1<f64>) -> Result<Array1<f64>, Self::Error> {
        Ok(array![-1.0])
    }
}

/// A bowl whose first gradient is NaN.
#[derive(Default)]
struct NanOnFirstCall {
    called: Cell<bool>,
}

impl Objective for NanOnFirstCall {
    type Error = Infallible;

    fn value(&self, x: &Array1<f64>) -> Result<f64, Self::Error> {
        Ok(x.dot(x))
    }

    fn gradient(&self, x: &Array1<f64>) -> Result<Array1<f64>, Self::Error> {
        if self.called.replace(true) {
            Ok(x * 2.0)
        } else {
            Ok(Array1::from_elem(x.len(), f64::NAN))
        }
    }
}

/// Exact line search for quadratics: the secant step along `d` is the
/// minimizer of `f(x + t·d)`.
struct Exact;

impl LineSearch for Exact {
    fn search<O: Objective>(
        &self,
        objective: &O,
        x: &Array1<f64>,
        direction: &Array1<f64>,
    ) -> Result<f64, LineSearchError> {
        let g = objective.gradient(x).map_err(LineSearchError::objective)?;
        let g_ahead = objective
            .gradient(&(x + direction))
            .map_err(LineSearchError::objective)?;
        let curvature = direction.dot(&(g_ahead - &g));

        Ok(-g.dot(direction) / curvature)
    }
}

/// Always returns the same step.
struct Fixed(f64);

impl LineSearch for Fixed {
    fn search<O: Objective>(
        &self,
        _objective: &O,
        _x: &Array1<f64>,
        _direction: &Array1<f64>,
    ) -> Result<f64, LineSearchError> {
        Ok(self.0)
    }
}

/// Never finds a step.
struct Failing;

impl LineSearch for Failing {
    fn search<O: Objective>(
        &self,
        _objective: &O,
        _x: &Array1<f64>,
        _direction: &Array1<f64>,
    ) -> Result<f64, LineSearchError> {
        Err(LineSearchError::MaxIters { iters: 0 })
    }
}

#[test]
fn minimizes_a_bowl() {
    let mut solver = Bfgs::new(StrongWolfe::default());
    let mut x = array![10.0];

    let status = solver.minimize(&mut Bowl, &mut x).expect("should converge");

    assert_eq!(status, Status::GradNormTolerance);
    assert_eq!(solver.status(), status);
    assert_relative_eq!(x[0], 0.0, epsilon = 1e-9);
    assert!(solver.criteria().grad_norm <= 1e-6);
    assert!(solver.criteria().iterations <= 3);
}

#[test]
fn minimizes_rosenbrock_monotonically() {
    let x0 = array![-1.2, 1.0];
    let mut values = vec![rosenbrock(&x0)];
    let mut last = (x0.clone(), Rosenbrock::default().gradient(&x0).unwrap());

    let observer = |event: &Event<'_>| -> Option<Action> {
        if let Event::Iterated { x, gradient, .. } = event {
            // Every accepted step moved downhill from the previous iterate.
            let (x_prev, g_prev) = &last;
            assert!(g_prev.dot(&(*x - x_prev)) < 0.0);

            values.push(rosenbrock(x));
            last = ((*x).clone(), (*gradient).clone());
        }
        None
    };

    let mut solver = Bfgs::new(StrongWolfe::default());
    let mut x = x0;
    let status = solver
        .minimize_observed(&mut Rosenbrock::default(), &mut x, observer)
        .expect("should converge");

    assert!(status.is_converged(), "unexpected status {status:?}");
    assert!(solver.criteria().iterations < Criteria::DEFAULT_ITERATIONS);
    assert_relative_eq!(x[0], 1.0, epsilon = 1e-4);
    assert_relative_eq!(x[1], 1.0, epsilon = 1e-4);
    assert!(values.windows(2).all(|pair| pair[1] <= pair[0]));
}

#[test]
fn reaches_quadratic_minimizer_with_exact_line_search() {
    let mut solver = Bfgs::new(Exact);
    let mut x = array![0.0, 0.0, 0.0];

    let status = solver
        .minimize(&mut Quadratic::new(), &mut x)
        .expect("should converge");

    assert_eq!(status, Status::GradNormTolerance);
    assert!(solver.criteria().iterations <= 4);
    assert_relative_eq!(x[0], 2.0 / 9.0, epsilon = 1e-9);
    assert_relative_eq!(x[1], 1.0 / 9.0, epsilon = 1e-9);
    assert_relative_eq!(x[2], 13.0 / 9.0, epsilon = 1e-9);
}

#[test]
fn nan_gradient_resets_then_stops() {
    let mut events = Vec::new();
    let observer = |event: &Event<'_>| -> Option<Action> {
        if let Event::DirectionReset { iteration, slope } = event {
            events.push((*iteration, *slope));
        }
        None
    };

    let mut solver = Bfgs::new(StrongWolfe::default());
    let mut x = array![1.0, 2.0];
    let status = solver
        .minimize_observed(&mut NanOnFirstCall::default(), &mut x, observer)
        .expect("numerical trouble is not an error");

    assert_eq!(status, Status::NaN);
    assert_eq!(solver.status(), Status::NaN);
    assert_eq!(x, array![1.0, 2.0]);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].0, 0);
    assert!(events[0].1.is_nan());
}

#[test]
fn callback_veto_stops_after_one_iteration() {
    let mut objective = Rosenbrock {
        veto_after: Some(1),
    };
    let mut solver = Bfgs::new(StrongWolfe::default());
    let mut x = array![-1.2, 1.0];

    let status = solver.minimize(&mut objective, &mut x).expect("should stop");

    assert_eq!(solver.criteria().iterations, 1);
    assert_eq!(status, Status::Continue);
    assert_ne!(x, array![-1.2, 1.0]);
}

#[test]
fn observer_can_stop_early() {
    let observer = |event: &Event<'_>| match event {
        Event::Iterated { criteria, .. } if criteria.iterations >= 2 => Some(Action::StopEarly),
        _ => None,
    };

    let mut solver = Bfgs::new(StrongWolfe::default());
    let mut x = array![-1.2, 1.0];
    let status = solver
        .minimize_observed(&mut Rosenbrock::default(), &mut x, observer)
        .expect("should stop cleanly");

    assert_eq!(status, Status::Continue);
    assert_eq!(solver.criteria().iterations, 2);
}

#[test]
fn disabled_step_tolerance_is_replaced() {
    let stop = Criteria::defaults().with_x_delta(0.0);
    let mut solver = Bfgs::new(StrongWolfe::default()).with_stop_criteria(stop);
    let mut x = array![10.0];

    solver.minimize(&mut Bowl, &mut x).expect("should converge");

    assert_relative_eq!(solver.stop_criteria().x_delta, Criteria::DEFAULT_X_DELTA);
}

#[test]
fn debug_level_tracks_values() {
    let mut values = Vec::new();
    let observer = |event: &Event<'_>| -> Option<Action> {
        if let Event::Iterated { value, .. } = event {
            values.push(*value);
        }
        None
    };

    let mut solver = Bfgs::new(StrongWolfe::default()).with_debug(DebugLevel::Low);
    let mut x = array![-1.2, 1.0];
    solver
        .minimize_observed(&mut Rosenbrock::default(), &mut x, observer)
        .expect("should converge");

    assert!(!values.is_empty());
    assert!(values.iter().all(Option::is_some));
}

#[test]
fn stops_on_small_value_change() {
    let stop = Criteria::defaults().with_f_delta(1.0).with_grad_norm(0.0);
    let mut solver = Bfgs::new(StrongWolfe::default()).with_stop_criteria(stop);
    let mut x = array![-1.2, 1.0];

    let status = solver
        .minimize(&mut Rosenbrock::default(), &mut x)
        .expect("should stop");

    assert_eq!(status, Status::FDeltaTolerance);
    assert!(solver.criteria().f_delta <= 1.0);
    assert!(solver.criteria().iterations >= 1);
}

#[test]
fn degenerate_curvature_is_skipped() {
    let mut skipped = 0;
    let observer = |event: &Event<'_>| -> Option<Action> {
        if matches!(event, Event::CurvatureSkipped { .. }) {
            skipped += 1;
        }
        None
    };

    let stop = Criteria::defaults().with_iterations(3);
    let mut solver = Bfgs::new(Fixed(1.0)).with_stop_criteria(stop);
    let mut x = array![0.0];
    let status = solver
        .minimize_observed(&mut Ramp, &mut x, observer)
        .expect("should run to the limit");

    assert_eq!(status, Status::IterationLimit);
    assert_eq!(skipped, 3);
    assert_relative_eq!(x[0], 3.0);
}

#[test]
fn line_search_failure_ends_the_run() {
    let mut solver = Bfgs::new(Failing);
    let mut x = array![10.0];

    let status = solver.minimize(&mut Bowl, &mut x).expect("not an error");

    assert_eq!(status, Status::LineSearchFailed);
    assert_eq!(x, array![10.0]);
    assert_eq!(solver.criteria().iterations, 0);
}

#[test]
fn unusable_step_ends_the_run() {
    let mut solver = Bfgs::new(Fixed(-1.0));
    let mut x = array![10.0];

    let status = solver.minimize(&mut Bowl, &mut x).expect("not an error");

    assert_eq!(status, Status::LineSearchFailed);
    assert_eq!(x, array![10.0]);
}

#[test]
fn stationary_start_returns_immediately() {
    let mut events = 0;
    let observer = |_event: &Event<'_>| -> Option<Action> {
        events += 1;
        None
    };

    let mut solver = Bfgs::new(StrongWolfe::default());
    let mut x = array![0.0, 0.0];
    let status = solver
        .minimize_observed(&mut Bowl, &mut x, observer)
        .expect("should converge");

    assert_eq!(status, Status::GradNormTolerance);
    assert_eq!(solver.criteria().iterations, 0);
    assert_eq!(events, 0);
}

#[test]
fn solver_state_resets_between_runs() {
    let mut solver = Bfgs::new(StrongWolfe::default());

    let mut x = array![-1.2, 1.0];
    solver
        .minimize(&mut Rosenbrock::default(), &mut x)
        .expect("should converge");
    let first_run = solver.criteria().iterations;

    let mut x = array![10.0];
    solver.minimize(&mut Bowl, &mut x).expect("should converge");

    assert!(first_run > solver.criteria().iterations);
    assert_eq!(solver.status(), Status::GradNormTolerance);
}

#[test]
fn free_function_returns_solution() {
    let x0 = array![3.0, -4.0];

    let solution =
        minimize_unobserved(&mut Bowl, &x0, Criteria::default()).expect("should converge");

    assert_eq!(solution.status, Status::GradNormTolerance);
    assert_eq!(x0, array![3.0, -4.0]);
    assert_relative_eq!(solution.x[0], 0.0, epsilon = 1e-9);
    assert_relative_eq!(solution.x[1], 0.0, epsilon = 1e-9);
    assert_eq!(solution.criteria.iterations, 1);
}

/// Returns a gradient with one component too few.
struct Truncated;

impl Objective for Truncated {
    type Error = Infallible;

    fn value(&self, x: &Array1<f64>) -> Result<f64, Self::Error> {
        Ok(x.dot(x))
    }

    fn gradient(&self, x: &Array1<f64>) -> Result<Array1<f64>, Self::Error> {
        Ok(x.slice(ndarray::s![1..]).to_owned())
    }
}

#[test]
fn wrong_gradient_length_is_an_error() {
    let mut solver = Bfgs::new(StrongWolfe::default());
    let mut x = array![1.0, 2.0];

    let result = solver.minimize(&mut Truncated, &mut x);

    assert!(matches!(
        result,
        Err(Error::DimensionMismatch {
            expected: 2,
            found: 1
        })
    ));
}

#[derive(Debug, Error)]
#[error("simulation diverged")]
struct Diverged;

/// Fails as soon as the gradient is requested.
struct Broken;

impl Objective for Broken {
    type Error = Diverged;

    fn value(&self, _x: &Array1<f64>) -> Result<f64, Self::Error> {
        Err(Diverged)
    }

    fn gradient(&self, _x: &Array1<f64>) -> Result<Array1<f64>, Self::Error> {
        Err(Diverged)
    }
}

#[test]
fn objective_errors_propagate() {
    let mut solver = Bfgs::new(StrongWolfe::default());
    let mut x = array![1.0];

    let result = solver.minimize(&mut Broken, &mut x);

    let Err(Error::Objective(err)) = result else {
        panic!("expected an objective error");
    };
    assert_eq!(err.to_string(), "simulation diverged");
}

#[test]
fn zero_gradient_mid_run_converges_on_step_size() {
    // With the gradient test off, the run lands exactly on the minimizer and
    // the next iteration cannot move.
    let stop = Criteria::defaults().with_grad_norm(0.0);
    let mut solver = Bfgs::new(StrongWolfe::default()).with_stop_criteria(stop);
    let mut x = array![10.0];

    let status = solver.minimize(&mut Bowl, &mut x).expect("should converge");

    assert_eq!(status, Status::XDeltaTolerance);
    assert_eq!(x, array![0.0]);
    assert_eq!(solver.criteria().iterations, 2);
    assert_relative_eq!(solver.criteria().x_delta, 0.0);
}

#[test]
fn zero_gradient_at_start_converges_on_step_size() {
    let mut rates = Vec::new();
    let observer = |event: &Event<'_>| -> Option<Action> {
        if let Event::Iterated { rate, .. } = event {
            rates.push(*rate);
        }
        None
    };

    let stop = Criteria::defaults().with_grad_norm(0.0);
    let mut solver = Bfgs::new(StrongWolfe::default()).with_stop_criteria(stop);
    let mut x = array![0.0, 0.0];
    let status = solver
        .minimize_observed(&mut Bowl, &mut x, observer)
        .expect("should converge");

    assert_eq!(status, Status::XDeltaTolerance);
    assert_eq!(x, array![0.0, 0.0]);
    assert_eq!(solver.criteria().iterations, 1);
    assert_eq!(rates, vec![0.0]);
}

#[test]
fn observer_can_stop_at_a_direction_reset() {
    let mut seen = Vec::new();
    let observer = |event: &Event<'_>| -> Option<Action> {
        seen.push(event.iterations());
        matches!(event, Event::DirectionReset { .. }).then_some(Action::StopEarly)
    };

    let mut solver = Bfgs::new(StrongWolfe::default());
    let mut x = array![1.0, 2.0];
    let status = solver
        .minimize_observed(&mut NanOnFirstCall::default(), &mut x, observer)
        .expect("should stop cleanly");

    assert_eq!(status, Status::Continue);
    assert_eq!(solver.status(), Status::Continue);
    assert_eq!(solver.criteria().iterations, 0);
    assert_eq!(x, array![1.0, 2.0]);
    assert_eq!(seen, vec![0]);
}

#[test]
fn observer_can_stop_at_a_skipped_update() {
    let mut seen = Vec::new();
    let observer = |event: &Event<'_>| -> Option<Action> {
        seen.push(event.iterations());
        matches!(event, Event::CurvatureSkipped { .. }).then_some(Action::StopEarly)
    };

    let mut solver = Bfgs::new(Fixed(1.0));
    let mut x = array![0.0];
    let status = solver
        .minimize_observed(&mut Ramp, &mut x, observer)
        .expect("should stop cleanly");

    // The skip is reported after the step is recorded but before the
    // iteration is announced, so no `Iterated` event arrives.
    assert_eq!(status, Status::Continue);
    assert_eq!(solver.criteria().iterations, 1);
    assert_eq!(x, array![1.0]);
    assert_eq!(seen, vec![0]);
}

/// f(x) = x·x, failing anywhere below x = 6.
struct Cliff;

impl Objective for Cliff {
    type Error = Diverged;

    fn value(&self, x: &Array1<f64>) -> Result<f64, Self::Error> {
        if x[0] < 6.0 {
            Err(Diverged)
        } else {
            Ok(x.dot(x))
        }
    }

    fn gradient(&self, x: &Array1<f64>) -> Result<Array1<f64>, Self::Error> {
        if x[0] < 6.0 {
            Err(Diverged)
        } else {
            Ok(x * 2.0)
        }
    }
}

#[test]
fn error_after_a_step_keeps_last_iterate_and_status() {
    let mut solver = Bfgs::new(Fixed(0.25));
    let mut x = array![10.0];

    let result = solver.minimize(&mut Cliff, &mut x);

    assert!(matches!(result, Err(Error::Objective(_))));
    assert_eq!(x, array![5.0]);
    assert_eq!(solver.status(), Status::Continue);
    assert_eq!(solver.criteria().iterations, 0);
}

/// Collects the levels of log records emitted on the current thread.
mod capture {
    use std::cell::RefCell;

    use log::{Level, LevelFilter, Log, Metadata, Record};

    thread_local! {
        static LEVELS: RefCell<Vec<Level>> = const { RefCell::new(Vec::new()) };
    }

    struct Capture;

    impl Log for Capture {
        fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
            true
        }

        fn log(&self, record: &Record<'_>) {
            LEVELS.with_borrow_mut(|levels| levels.push(record.level()));
        }

        fn flush(&self) {}
    }

    static LOGGER: Capture = Capture;

    pub(super) fn levels(run: impl FnOnce()) -> Vec<Level> {
        // Another test may have installed the logger already.
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(LevelFilter::Trace);

        LEVELS.with_borrow_mut(Vec::clear);
        run();
        LEVELS.with_borrow_mut(std::mem::take)
    }
}

fn logged_levels(debug: DebugLevel) -> Vec<Level> {
    capture::levels(|| {
        let mut solver = Bfgs::new(StrongWolfe::default()).with_debug(debug);
        let mut x = array![-1.2, 1.0];
        solver
            .minimize(&mut Rosenbrock::default(), &mut x)
            .expect("should converge");
    })
}

#[test]
fn logs_nothing_without_debug() {
    assert!(logged_levels(DebugLevel::None).is_empty());
}

#[test]
fn low_debug_logs_one_summary_per_iteration() {
    let levels = logged_levels(DebugLevel::Low);

    assert!(!levels.is_empty());
    assert!(levels.iter().all(|&level| level == Level::Debug));
}

#[test]
fn high_debug_adds_iterates() {
    let levels = logged_levels(DebugLevel::High);

    assert!(levels.contains(&Level::Debug));
    assert!(levels.contains(&Level::Trace));
}

#[test]
fn line_search_failure_warns_without_debug() {
    let levels = capture::levels(|| {
        let mut solver = Bfgs::new(Failing);
        let mut x = array![10.0];
        solver.minimize(&mut Bowl, &mut x).expect("not an error");
    });

    assert_eq!(levels, vec![Level::Warn]);
}
