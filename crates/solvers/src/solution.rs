use ndarray::Array1;

use descent_core::{Criteria, Status};

/// The result of a minimization run started through a free function.
#[derive(Debug, Clone)]
pub struct Solution {
    /// Why the run stopped.
    pub status: Status,

    /// The last iterate.
    pub x: Array1<f64>,

    /// Progress at the end of the run.
    pub criteria: Criteria,
}
