/// Actions an observer can take during a minimization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Stop the solver and leave the iterate where it is.
    ///
    /// The run's status keeps whatever value the convergence check last
    /// produced, usually [`Status::Continue`](descent_core::Status::Continue).
    StopEarly,
}
