/// Receives solver events and decides whether the run should go on.
///
/// Observers let callers watch or steer a minimization without touching the
/// solver: progress logging, recording iterates for plots, or custom stopping
/// rules all fit here.
///
/// `observe` returns `Option<A>`; `Some(action)` asks the solver for a
/// solver-specific action and `None` leaves the run unchanged.
///
/// Closures implement `Observer` automatically, and `()` is a no-op observer
/// that always returns `None`.
pub trait Observer<E, A> {
    /// Observes a solver event and optionally returns a control action.
    fn observe(&mut self, event: &E) -> Option<A>;
}

impl<E, A, F> Observer<E, A> for F
where
    F: FnMut(&E) -> Option<A>,
{
    fn observe(&mut self, event: &E) -> Option<A> {
        self(event)
    }
}

impl<E, A> Observer<E, A> for () {
    fn observe(&mut self, _event: &E) -> Option<A> {
        None
    }
}
