//! Gradient-based solvers for the Descent optimization framework.
//!
//! Every solver implements [`Solver`], the shared lifecycle: it keeps its
//! stopping thresholds, the progress of the latest run, the latest
//! [`Status`](descent_core::Status), and a [`DebugLevel`](descent_core::DebugLevel)
//! in a [`Driver`], and minimizes an [`Objective`](descent_core::Objective)
//! in place.
//!
//! # Solvers
//!
//! - [`bfgs`] — quasi-Newton descent with an inverse-Hessian approximation
//! - [`gradient_descent`] — steepest descent
//!
//! Both delegate step lengths to a [`line_search::LineSearch`].
//!
//! # Observer Events
//!
//! Solvers emit an [`Event`] after every completed iteration and whenever
//! they discard curvature information. Observers may return
//! [`Action::StopEarly`] to end the run.

mod action;
mod driver;
mod error;
mod evaluate;
mod event;
mod solution;

pub mod bfgs;
pub mod gradient_descent;
pub mod line_search;

pub use action::Action;
pub use driver::{Driver, Solver};
pub use error::Error;
pub use event::Event;
pub use solution::Solution;
