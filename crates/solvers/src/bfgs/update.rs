use ndarray::{Array1, Array2, Zip};

/// Relative threshold below which a curvature pair is treated as degenerate.
const CURVATURE_EPS: f64 = 1e-10;

/// A search direction and whether the curvature safeguard produced it.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum Direction {
    /// `-H·g`, a descent direction.
    QuasiNewton(Array1<f64>),

    /// `-H·g` had slope `slope` (positive or NaN), so `H` was reset to the
    /// identity and the direction is `-g`.
    Reset { direction: Array1<f64>, slope: f64 },
}

/// Outcome of an inverse-Hessian update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) enum Update {
    Applied,

    /// `y·s` was non-finite or too small relative to `‖y‖·‖s‖`; `H` was reset.
    Skipped { ys: f64 },
}

/// Computes `d = -H·g`, resetting `H` when `d` is not a descent direction.
pub(super) fn search_direction(h: &mut Array2<f64>, gradient: &Array1<f64>) -> Direction {
    let direction = -h.dot(gradient);
    let slope = gradient.dot(&direction);

    if slope > 0.0 || slope.is_nan() {
        reset(h);
        return Direction::Reset {
            direction: -gradient,
            slope,
        };
    }

    Direction::QuasiNewton(direction)
}

/// Applies the BFGS update of the inverse-Hessian approximation
///
/// ```text
/// H ← H − ρ·(s·(yᵀH) + (H·y)·sᵀ) + ρ²·(yᵀHy + 1/ρ)·(s·sᵀ),   ρ = 1/(y·s)
/// ```
///
/// for step `s` and gradient change `y`, or resets `H` to the identity when
/// the pair is degenerate.
pub(super) fn update_inverse_hessian(
    h: &mut Array2<f64>,
    s: &Array1<f64>,
    y: &Array1<f64>,
) -> Update {
    let ys = y.dot(s);
    let scale = y.dot(y).sqrt() * s.dot(s).sqrt();

    if !ys.is_finite() || ys <= CURVATURE_EPS * scale {
        reset(h);
        return Update::Skipped { ys };
    }

    let rho = 1.0 / ys;
    let hy = h.dot(y);
    let yh = y.dot(&*h);
    let yhy = y.dot(&hy);
    let ss_coeff = rho * rho * (yhy + ys);

    Zip::indexed(&mut *h).for_each(|(i, j), hij| {
        *hij += ss_coeff * s[i] * s[j] - rho * (s[i] * yh[j] + hy[i] * s[j]);
    });

    Update::Applied
}

fn reset(h: &mut Array2<f64>) {
    h.fill(0.0);
    h.diag_mut().fill(1.0);
}
