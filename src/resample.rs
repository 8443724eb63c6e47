use log::debug;

use crate::curve::Curve;
use crate::error::{DqdvError, Result};
use crate::filter::smooth;
use crate::record::Segment;
use crate::spline::{interp_linear, CubicInterpolant};

/// Resamples a segment's voltage onto a uniform capacity grid and smooths it.
///
/// Capacity is shifted so its minimum becomes zero, duplicate capacities keep
/// their first occurrence, and a cubic interpolant of voltage over capacity is
/// sampled at `no_points` evenly spaced capacities spanning the shifted range.
/// Charge curves come out with ascending capacity and discharge curves with
/// descending capacity.
///
/// Time, current and the raw derivative columns are linearly interpolated onto
/// the same capacity grid, so each row of the output describes one grid point.
/// The interpolated voltage is then smoothed with a Savitzky-Golay filter of
/// `window` samples and order `polyorder`.
///
/// # Errors
///
/// * [`DqdvError::TooFewPoints`] when the segment has fewer than two distinct
///   capacities or `no_points < 2`
/// * the filter's parameter errors when `window`/`polyorder` do not fit
///   `no_points`
pub fn resample_segment(
    segment: &Segment,
    no_points: usize,
    window: usize,
    polyorder: usize,
) -> Result<Curve> {
    if no_points < 2 {
        return Err(DqdvError::TooFewPoints {
            operation: "capacity grid",
            required: 2,
            actual: no_points,
        });
    }

    let q_min = segment
        .capacity
        .iter()
        .copied()
        .fold(f64::INFINITY, f64::min);
    let shifted: Vec<f64> = segment.capacity.iter().map(|q| q - q_min).collect();
    let kept = first_occurrences(&shifted);

    let xs: Vec<f64> = kept.iter().map(|&i| shifted[i]).collect();
    let column = |values: &[f64]| kept.iter().map(|&i| values[i]).collect::<Vec<f64>>();
    let interpolant = CubicInterpolant::new(xs.clone(), column(&segment.voltage))?;

    let mut grid = linspace(xs[0], xs[xs.len() - 1], no_points);
    let mut voltage = interpolant.evaluate_many(&grid);
    let resample_carried = |values: &[f64]| {
        let ys = column(values);
        grid.iter()
            .map(|&q| interp_linear(&xs, &ys, q))
            .collect::<Vec<f64>>()
    };
    let mut time = resample_carried(&segment.time);
    let mut current = resample_carried(&segment.current);
    let mut dv_dq = resample_carried(&segment.dv_dq);
    let mut dq_dv = resample_carried(&segment.dq_dv);

    let kind = segment.kind;
    for values in [
        &mut grid,
        &mut voltage,
        &mut time,
        &mut current,
        &mut dv_dq,
        &mut dq_dv,
    ] {
        kind.orient(values);
    }

    let min_len = [
        grid.len(),
        voltage.len(),
        time.len(),
        current.len(),
        dv_dq.len(),
        dq_dv.len(),
    ]
    .into_iter()
    .min()
    .unwrap_or(0);
    for values in [
        &mut grid,
        &mut voltage,
        &mut time,
        &mut current,
        &mut dv_dq,
        &mut dq_dv,
    ] {
        values.truncate(min_len);
    }

    debug!(
        "resampled {} segment: {} rows, {} distinct capacities -> {} points",
        kind,
        segment.len(),
        xs.len(),
        min_len
    );

    let smoothed = smooth(&voltage, window, polyorder)?;

    Ok(Curve {
        kind,
        time,
        current,
        capacity: grid,
        interpolated_voltage: Some(voltage),
        dv_dq,
        dq_dv,
        voltage: smoothed,
    })
}

/// Indices of the first occurrence of each distinct value, ordered by value.
fn first_occurrences(values: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    // stable: equal values stay in row order
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    order.dedup_by(|later, earlier| values[*later] == values[*earlier]);
    order
}

/// `num` evenly spaced values from `start` to `stop` inclusive.
pub(crate) fn linspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (num - 1) as f64;
            let mut values: Vec<f64> = (0..num).map(|i| start + i as f64 * step).collect();
            values[num - 1] = stop;
            values
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::SegmentKind;
    use approx::assert_abs_diff_eq;

    fn segment(kind: SegmentKind, capacity: &[f64], voltage: &[f64]) -> Segment {
        let n = capacity.len();
        Segment {
            kind,
            current: vec![if kind == SegmentKind::Charge { 1.0 } else { -1.0 }; n],
            time: (0..n).map(|i| i as f64 * 10.0).collect(),
            voltage: voltage.to_vec(),
            capacity: capacity.to_vec(),
            dv_dq: vec![f64::NAN; n],
            dq_dv: vec![f64::NAN; n],
        }
    }

    const Q: [f64; 5] = [0.0, 0.1, 0.2, 0.3, 0.4];
    const V: [f64; 5] = [3.0, 3.2, 3.35, 3.45, 3.5];

    #[test]
    fn test_charge_grid_matches_samples() {
        let curve = resample_segment(&segment(SegmentKind::Charge, &Q, &V), 5, 3, 2).unwrap();

        assert_eq!(curve.len(), 5);
        let interpolated = curve.interpolated_voltage.as_ref().unwrap();
        for i in 0..5 {
            assert_abs_diff_eq!(curve.capacity[i], Q[i], epsilon = 1e-12);
            assert_abs_diff_eq!(interpolated[i], V[i], epsilon = 1e-9);
            // window 3 with order 2 reproduces its input
            assert_abs_diff_eq!(curve.voltage[i], V[i], epsilon = 1e-9);
            assert_abs_diff_eq!(curve.time[i], 10.0 * i as f64, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_discharge_grid_counts_down() {
        let curve = resample_segment(&segment(SegmentKind::Discharge, &Q, &V), 5, 3, 2).unwrap();

        let interpolated = curve.interpolated_voltage.as_ref().unwrap();
        for i in 0..5 {
            assert_abs_diff_eq!(curve.capacity[i], Q[4 - i], epsilon = 1e-12);
            assert_abs_diff_eq!(interpolated[i], V[4 - i], epsilon = 1e-9);
        }
        // time follows its capacity, so the latest sample comes first
        assert_abs_diff_eq!(curve.time[0], 40.0, epsilon = 1e-9);
    }

    #[test]
    fn test_offset_capacity_is_shifted_to_zero() {
        let offset: Vec<f64> = Q.iter().map(|q| q + 1.25).collect();
        let base = resample_segment(&segment(SegmentKind::Charge, &Q, &V), 9, 5, 2).unwrap();
        let moved = resample_segment(&segment(SegmentKind::Charge, &offset, &V), 9, 5, 2).unwrap();

        for i in 0..9 {
            assert_abs_diff_eq!(base.capacity[i], moved.capacity[i], epsilon = 1e-9);
            assert_abs_diff_eq!(base.voltage[i], moved.voltage[i], epsilon = 1e-9);
        }
    }

    #[test]
    fn test_duplicates_keep_first_and_unsorted_input() {
        let capacity = [0.2, 0.0, 0.1, 0.1, 0.3, 0.4];
        let voltage = [3.35, 3.0, 3.2, 9.9, 3.45, 3.5];
        let curve =
            resample_segment(&segment(SegmentKind::Charge, &capacity, &voltage), 5, 3, 2).unwrap();

        let interpolated = curve.interpolated_voltage.unwrap();
        assert_abs_diff_eq!(interpolated[1], 3.2, epsilon = 1e-9);
        assert!(curve.capacity.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_short_segment_still_fills_grid() {
        let curve = resample_segment(
            &segment(SegmentKind::Discharge, &[0.1, 0.2, 0.3], &[3.6, 3.5, 3.3]),
            50,
            11,
            3,
        )
        .unwrap();

        assert_eq!(curve.len(), 50);
        assert_eq!(curve.time.len(), 50);
        assert!(curve.capacity.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_degenerate_inputs() {
        let flat = segment(SegmentKind::Charge, &[0.5, 0.5, 0.5], &[3.0, 3.1, 3.2]);
        assert!(matches!(
            resample_segment(&flat, 10, 3, 1),
            Err(DqdvError::TooFewPoints { actual: 1, .. })
        ));

        let good = segment(SegmentKind::Charge, &Q, &V);
        assert!(matches!(
            resample_segment(&good, 5, 7, 2),
            Err(DqdvError::InsufficientData(5, 7))
        ));
        assert!(resample_segment(&good, 1, 1, 0).is_err());
    }

    #[test]
    fn test_linspace() {
        assert_eq!(linspace(0.0, 1.0, 3), vec![0.0, 0.5, 1.0]);
        assert_eq!(linspace(2.0, 2.0, 1), vec![2.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }
}
