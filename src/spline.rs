//! Piecewise-cubic interpolation of voltage against capacity.

use crate::error::{DqdvError, Result};

/// Cubic interpolant with not-a-knot end conditions, stored in Hermite form.
///
/// Evaluation outside the knot range extends the first or last cubic piece.
/// Three knots give the interpolating parabola and two knots the straight line.
#[derive(Debug, Clone)]
pub struct CubicInterpolant {
    xs: Vec<f64>,
    ys: Vec<f64>,
    /// First derivative at each knot
    slopes: Vec<f64>,
}

impl CubicInterpolant {
    /// Builds the interpolant through `(xs[i], ys[i])`.
    ///
    /// `xs` must be strictly increasing and hold at least two values.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> Result<Self> {
        if xs.len() != ys.len() {
            return Err(DqdvError::ComputationError(format!(
                "interpolant needs equal length inputs, got {} x and {} y values",
                xs.len(),
                ys.len()
            )));
        }
        if xs.len() < 2 {
            return Err(DqdvError::TooFewPoints {
                operation: "cubic interpolation",
                required: 2,
                actual: xs.len(),
            });
        }
        if let Some(i) = (1..xs.len()).find(|&i| !(xs[i] > xs[i - 1])) {
            return Err(DqdvError::ComputationError(format!(
                "interpolation knots must be strictly increasing (index {i})"
            )));
        }

        let slopes = knot_slopes(&xs, &ys);
        Ok(Self { xs, ys, slopes })
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        let n = self.xs.len();

        // interval [lo, lo + 1], clamped so the end pieces extrapolate
        let lo = match self.xs.partition_point(|&k| k <= x) {
            0 => 0,
            p if p >= n => n - 2,
            p => p - 1,
        };

        let h = self.xs[lo + 1] - self.xs[lo];
        let secant = (self.ys[lo + 1] - self.ys[lo]) / h;
        let s0 = self.slopes[lo];
        let s1 = self.slopes[lo + 1];

        let t = x - self.xs[lo];
        let c3 = (s0 + s1 - 2.0 * secant) / (h * h);
        let c2 = (3.0 * secant - 2.0 * s0 - s1) / h;
        self.ys[lo] + t * (s0 + t * (c2 + t * c3))
    }

    pub fn evaluate_many(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.evaluate(x)).collect()
    }
}

/// Knot derivatives of the not-a-knot cubic spline.
fn knot_slopes(xs: &[f64], ys: &[f64]) -> Vec<f64> {
    let n = xs.len();
    let dx: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();
    let secant: Vec<f64> = (0..n - 1).map(|i| (ys[i + 1] - ys[i]) / dx[i]).collect();

    if n == 2 {
        return vec![secant[0]; 2];
    }
    if n == 3 {
        // slopes of the single parabola through all three points
        let curvature = (secant[1] - secant[0]) / (xs[2] - xs[0]);
        return vec![
            secant[0] - curvature * dx[0],
            secant[0] + curvature * dx[0],
            secant[1] + curvature * dx[1],
        ];
    }

    // Tridiagonal system; sub[i] and sup[i] are the neighbours of diag[i]
    let mut sub = vec![0.0; n];
    let mut diag = vec![0.0; n];
    let mut sup = vec![0.0; n];
    let mut rhs = vec![0.0; n];

    let d = xs[2] - xs[0];
    diag[0] = dx[1];
    sup[0] = d;
    rhs[0] = ((dx[0] + 2.0 * d) * dx[1] * secant[0] + dx[0] * dx[0] * secant[1]) / d;

    for i in 1..n - 1 {
        sub[i] = dx[i];
        diag[i] = 2.0 * (dx[i - 1] + dx[i]);
        sup[i] = dx[i - 1];
        rhs[i] = 3.0 * (dx[i] * secant[i - 1] + dx[i - 1] * secant[i]);
    }

    let d = xs[n - 1] - xs[n - 3];
    sub[n - 1] = d;
    diag[n - 1] = dx[n - 3];
    rhs[n - 1] = (dx[n - 2] * dx[n - 2] * secant[n - 3]
        + (2.0 * d + dx[n - 2]) * dx[n - 3] * secant[n - 2])
        / d;

    solve_tridiagonal(&sub, &mut diag, &sup, &mut rhs);
    rhs
}

/// Thomas algorithm; the solution is left in `rhs`.
fn solve_tridiagonal(sub: &[f64], diag: &mut [f64], sup: &[f64], rhs: &mut [f64]) {
    let n = diag.len();
    for i in 1..n {
        let w = sub[i] / diag[i - 1];
        diag[i] -= w * sup[i - 1];
        rhs[i] -= w * rhs[i - 1];
    }
    rhs[n - 1] /= diag[n - 1];
    for i in (0..n - 1).rev() {
        rhs[i] = (rhs[i] - sup[i] * rhs[i + 1]) / diag[i];
    }
}

/// Piecewise-linear interpolation on strictly increasing `xs`, clamped at the ends.
pub fn interp_linear(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    let n = xs.len();
    if n == 0 {
        return f64::NAN;
    }
    if x <= xs[0] {
        return ys[0];
    }
    if x >= xs[n - 1] {
        return ys[n - 1];
    }
    let hi = xs.partition_point(|&k| k <= x);
    let lo = hi - 1;
    let t = (x - xs[lo]) / (xs[hi] - xs[lo]);
    ys[lo] + t * (ys[hi] - ys[lo])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_passes_through_knots() {
        let xs = vec![0.0, 0.1, 0.25, 0.3, 0.4, 0.55];
        let ys = vec![3.0, 3.2, 3.35, 3.45, 3.5, 3.9];
        let spline = CubicInterpolant::new(xs.clone(), ys.clone()).unwrap();

        for (x, y) in xs.iter().zip(&ys) {
            assert_abs_diff_eq!(spline.evaluate(*x), *y, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_reproduces_cubic_exactly() {
        // not-a-knot splines are exact for cubic data, including extrapolation
        let f = |x: f64| x.powi(3) - 2.0 * x + 0.5;
        let xs = vec![0.0, 0.5, 1.3, 2.0, 2.2, 3.0];
        let ys = xs.iter().map(|&x| f(x)).collect();
        let spline = CubicInterpolant::new(xs, ys).unwrap();

        for x in [0.25, 1.0, 1.7, 2.9, -0.5, 3.4] {
            assert_abs_diff_eq!(spline.evaluate(x), f(x), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_three_points_is_parabola() {
        let f = |x: f64| 2.0 * x * x - x + 1.0;
        let xs = vec![0.0, 1.0, 3.0];
        let ys = xs.iter().map(|&x| f(x)).collect();
        let spline = CubicInterpolant::new(xs, ys).unwrap();

        for x in [0.5, 2.0, 4.0] {
            assert_abs_diff_eq!(spline.evaluate(x), f(x), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_two_points_is_line() {
        let spline = CubicInterpolant::new(vec![1.0, 2.0], vec![3.0, 5.0]).unwrap();
        assert_abs_diff_eq!(spline.evaluate(1.5), 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(spline.evaluate(3.0), 7.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_degenerate_input() {
        assert!(matches!(
            CubicInterpolant::new(vec![1.0], vec![1.0]),
            Err(DqdvError::TooFewPoints { actual: 1, .. })
        ));
        assert!(CubicInterpolant::new(vec![1.0, 1.0, 2.0], vec![0.0; 3]).is_err());
        assert!(CubicInterpolant::new(vec![1.0, 2.0], vec![0.0]).is_err());
    }

    #[test]
    fn test_interp_linear() {
        let xs = [0.0, 1.0, 3.0];
        let ys = [0.0, 10.0, 30.0];
        assert_abs_diff_eq!(interp_linear(&xs, &ys, 2.0), 20.0);
        assert_abs_diff_eq!(interp_linear(&xs, &ys, -1.0), 0.0);
        assert_abs_diff_eq!(interp_linear(&xs, &ys, 5.0), 30.0);
        assert_abs_diff_eq!(interp_linear(&xs, &ys, 1.0), 10.0);
    }
}
