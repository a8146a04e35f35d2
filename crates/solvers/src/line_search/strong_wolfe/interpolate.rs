use super::super::ray::Sample;

/// Share of the bracket kept clear at each end when accepting an
/// interpolated step.
const MARGIN: f64 = 0.1;

/// Picks the next trial step between two bracket ends.
///
/// Uses the minimizer of the cubic matching both values and slopes
/// (Nocedal & Wright, eq. 3.59). Falls back to the midpoint when either end
/// is not finite, the cubic has no real minimizer, or the minimizer lands
/// within [`MARGIN`] of an end.
pub(super) fn cubic_step(lo: &Sample, hi: &Sample) -> f64 {
    let (a, b) = (lo.alpha, hi.alpha);
    let midpoint = 0.5 * (a + b);

    if !lo.is_finite() || !hi.is_finite() {
        return midpoint;
    }

    let d1 = lo.slope + hi.slope - 3.0 * (lo.value - hi.value) / (a - b);
    let radicand = d1 * d1 - lo.slope * hi.slope;
    if radicand < 0.0 {
        return midpoint;
    }
    let d2 = (b - a).signum() * radicand.sqrt();
    let alpha = b - (b - a) * (hi.slope + d2 - d1) / (hi.slope - lo.slope + 2.0 * d2);

    let (low, high) = (a.min(b), a.max(b));
    let margin = MARGIN * (high - low);
    if alpha.is_finite() && alpha >= low + margin && alpha <= high - margin {
        alpha
    } else {
        midpoint
    }
}
