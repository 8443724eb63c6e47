use crate::curve::Curve;
use crate::error::{DqdvError, Result};

/// Numerical gradient with unit spacing.
///
/// Central differences in the interior, forward and backward differences at the
/// first and last sample. The output has the input's length.
pub fn gradient(data: &[f64]) -> Result<Vec<f64>> {
    let n = data.len();
    if n < 2 {
        return Err(DqdvError::TooFewPoints {
            operation: "gradient",
            required: 2,
            actual: n,
        });
    }

    let mut grad = Vec::with_capacity(n);
    grad.push(data[1] - data[0]);
    for i in 1..n - 1 {
        grad.push((data[i + 1] - data[i - 1]) * 0.5);
    }
    grad.push(data[n - 1] - data[n - 2]);
    Ok(grad)
}

/// `numerator / denominator` element-wise, or `NaN` where `|denominator| <= eps`.
pub fn guarded_ratio(numerator: &[f64], denominator: &[f64], eps: f64) -> Vec<f64> {
    numerator
        .iter()
        .zip(denominator)
        .map(|(&num, &den)| if den.abs() > eps { num / den } else { f64::NAN })
        .collect()
}

/// Computes guarded dQ/dV and dV/dQ along a curve.
///
/// Rows are sorted by capacity and put in the curve kind's orientation
/// (discharge counts down). The capacity and smoothed voltage columns of the
/// returned curve hold that reordered sequence; time, current and the
/// interpolated voltage keep their original row order.
///
/// Where the voltage gradient is within `eps` of zero dQ/dV is `NaN`, and where
/// the capacity gradient is, dV/dQ is `NaN`.
pub fn compute_derivatives(curve: &Curve, eps: f64) -> Result<Curve> {
    let mut order: Vec<usize> = (0..curve.len()).collect();
    order.sort_by(|&a, &b| curve.capacity[a].total_cmp(&curve.capacity[b]));
    curve.kind.orient(&mut order);

    let capacity: Vec<f64> = order.iter().map(|&i| curve.capacity[i]).collect();
    let voltage: Vec<f64> = order.iter().map(|&i| curve.voltage[i]).collect();

    let dq = gradient(&capacity)?;
    let dv = gradient(&voltage)?;

    Ok(Curve {
        capacity,
        voltage,
        dq_dv: guarded_ratio(&dq, &dv, eps),
        dv_dq: guarded_ratio(&dv, &dq, eps),
        ..curve.clone()
    })
}
