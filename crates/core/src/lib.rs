//! Core traits and types for the Descent optimization framework.
//!
//! This crate defines the shared abstractions that solvers and observers
//! build on:
//!
//! - [`Objective`] — a differentiable scalar function with a per-iteration
//!   continuation callback
//! - [`Observer`] — receives solver events and optionally returns control actions
//! - [`Criteria`] — stopping thresholds and measured progress of a run
//! - [`Status`] — why a run stopped (or that it has not)
//! - [`check_convergence`] — maps thresholds and progress to a [`Status`]
//! - [`DebugLevel`] — per-solver diagnostic verbosity

mod criteria;
mod debug;
mod objective;
mod observer;
mod status;

pub use criteria::{Criteria, check_convergence};
pub use debug::DebugLevel;
pub use objective::Objective;
pub use observer::Observer;
pub use status::Status;
