use crate::record::SegmentKind;

/// A processed charge or discharge curve, stored by column.
///
/// Every column has the same length. `NaN` marks a missing value in the
/// derivative columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    pub kind: SegmentKind,
    pub time: Vec<f64>,
    pub current: Vec<f64>,
    pub capacity: Vec<f64>,
    /// Voltage sampled from the interpolant, before smoothing. Only present on
    /// resampled curves.
    pub interpolated_voltage: Option<Vec<f64>>,
    pub dv_dq: Vec<f64>,
    pub dq_dv: Vec<f64>,
    /// Smoothed voltage; the voltage every downstream step works on
    pub voltage: Vec<f64>,
}

impl Curve {
    pub fn len(&self) -> usize {
        self.capacity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capacity.is_empty()
    }

    /// Rows whose capacity lies within `[q_min, q_max]`, in their current order.
    pub fn region(&self, q_min: f64, q_max: f64) -> Curve {
        self.region_after(0.0, q_min, q_max)
    }

    /// Like [`Curve::region`], with capacity counted from the curve's smallest
    /// capacity, the axis resampled curves are built on.
    pub fn region_from_start(&self, q_min: f64, q_max: f64) -> Curve {
        let start = self
            .capacity
            .iter()
            .copied()
            .filter(|q| !q.is_nan())
            .fold(f64::INFINITY, f64::min);
        if start.is_infinite() {
            return self.select(&[]);
        }
        self.region_after(start, q_min, q_max)
    }

    fn region_after(&self, start: f64, q_min: f64, q_max: f64) -> Curve {
        let keep: Vec<usize> = self
            .capacity
            .iter()
            .enumerate()
            .filter_map(|(i, &q)| {
                let q = q - start;
                (q >= q_min && q <= q_max).then_some(i)
            })
            .collect();
        self.select(&keep)
    }

    /// Copies the given rows, in the given order.
    pub(crate) fn select(&self, rows: &[usize]) -> Curve {
        let pick = |column: &[f64]| rows.iter().map(|&i| column[i]).collect::<Vec<f64>>();
        Curve {
            kind: self.kind,
            time: pick(&self.time),
            current: pick(&self.current),
            capacity: pick(&self.capacity),
            interpolated_voltage: self.interpolated_voltage.as_deref().map(|v| pick(v)),
            dv_dq: pick(&self.dv_dq),
            dq_dv: pick(&self.dq_dv),
            voltage: pick(&self.voltage),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve() -> Curve {
        Curve {
            kind: SegmentKind::Discharge,
            time: vec![0.0, 1.0, 2.0, 3.0],
            current: vec![-1.0; 4],
            capacity: vec![0.3, 0.2, 0.1, 0.0],
            interpolated_voltage: Some(vec![3.0, 3.2, 3.4, 3.6]),
            dv_dq: vec![f64::NAN; 4],
            dq_dv: vec![1.0, 2.0, 3.0, 4.0],
            voltage: vec![3.01, 3.19, 3.41, 3.59],
        }
    }

    #[test]
    fn test_region_is_inclusive_and_keeps_order() {
        let region = curve().region(0.1, 0.2);
        assert_eq!(region.capacity, vec![0.2, 0.1]);
        assert_eq!(region.time, vec![1.0, 2.0]);
        assert_eq!(region.interpolated_voltage, Some(vec![3.2, 3.4]));
        assert_eq!(region.kind, SegmentKind::Discharge);
    }

    #[test]
    fn test_region_from_start_ignores_capacity_offset() {
        let mut offset = curve();
        offset.capacity = vec![1.75, 1.5, 1.25, 1.0];

        let region = offset.region_from_start(0.25, 0.5);
        assert_eq!(region.capacity, vec![1.5, 1.25]);
        assert_eq!(region.dq_dv, vec![2.0, 3.0]);
        assert!(offset.region(0.25, 0.5).is_empty());
        assert_eq!(curve().region_from_start(0.1, 0.2).len(), 2);
    }

    #[test]
    fn test_empty_region() {
        let region = curve().region(1.0, 2.0);
        assert!(region.is_empty());
        assert_eq!(region.voltage.len(), 0);

        assert!(curve().select(&[]).region_from_start(0.0, 1.0).is_empty());
    }
}
