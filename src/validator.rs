use log::debug;

use crate::record::{RawRecord, Segment, SegmentKind};
use crate::separator::separate_charge_discharge;

/// A cycle whose charge and discharge segments both passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidCycle {
    pub folder: u32,
    pub cycle: u32,
    pub charge: Segment,
    pub discharge: Segment,
}

impl ValidCycle {
    pub fn segment(&self, kind: SegmentKind) -> &Segment {
        match kind {
            SegmentKind::Charge => &self.charge,
            SegmentKind::Discharge => &self.discharge,
        }
    }
}

/// Returns the cycles of `record` with usable charge and discharge data.
///
/// A cycle is kept only when both segments are non-empty, have at least
/// `min_seg_length` rows and contain at least `min_v_variation` distinct voltage
/// values. Rejected cycles are skipped, never reported as errors.
///
/// The result is ordered by cycle index, but callers should look cycles up by
/// number rather than by position.
pub fn separate_valid_cycles(
    record: &RawRecord,
    folder: u32,
    min_seg_length: usize,
    min_v_variation: usize,
) -> Vec<ValidCycle> {
    let mut valid = Vec::new();

    for (cycle, rows) in record.cycles() {
        let (charge, discharge) = separate_charge_discharge(rows, cycle);

        let usable = |segment: &Segment| {
            !segment.is_empty()
                && segment.len() >= min_seg_length
                && segment.distinct_voltages() >= min_v_variation
        };
        if !usable(&charge) || !usable(&discharge) {
            debug!(
                "folder {folder} cycle {cycle} rejected: charge {} rows, discharge {} rows",
                charge.len(),
                discharge.len()
            );
            continue;
        }

        valid.push(ValidCycle {
            folder,
            cycle,
            charge,
            discharge,
        });
    }

    valid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RawRow;

    fn synthetic_cycle(cycle: u32, points: usize) -> Vec<RawRow> {
        let mut rows = Vec::new();
        for i in 0..points {
            rows.push(RawRow {
                cycle_index: cycle,
                test_time: Some(i as f64),
                current: Some(1.0),
                voltage: Some(3.0 + 0.01 * i as f64),
                charge_capacity: Some(0.01 * (i + 1) as f64),
                discharge_capacity: Some(0.0),
                ..RawRow::default()
            });
        }
        for i in 0..points {
            rows.push(RawRow {
                cycle_index: cycle,
                test_time: Some((points + i) as f64),
                current: Some(-1.0),
                voltage: Some(4.0 - 0.01 * i as f64),
                charge_capacity: Some(0.01 * points as f64),
                discharge_capacity: Some(0.01 * (i + 1) as f64),
                ..RawRow::default()
            });
        }
        rows
    }

    #[test]
    fn test_keeps_valid_and_carries_folder() {
        let record: RawRecord = synthetic_cycle(1, 20)
            .into_iter()
            .chain(synthetic_cycle(2, 20))
            .collect();
        let valid = separate_valid_cycles(&record, 12, 10, 5);

        assert_eq!(valid.len(), 2);
        assert!(valid.iter().all(|c| c.folder == 12));
        assert_eq!(valid[0].charge.len(), 20);
        assert_eq!(valid[0].discharge.len(), 20);
    }

    #[test]
    fn test_length_threshold_boundary() {
        let record: RawRecord = synthetic_cycle(1, 10).into_iter().collect();
        assert_eq!(separate_valid_cycles(&record, 0, 10, 1).len(), 1);

        // drop the last discharge row to fall below the threshold
        let mut rows = synthetic_cycle(1, 10);
        rows.pop();
        let record = RawRecord::new(rows);
        assert!(separate_valid_cycles(&record, 0, 10, 1).is_empty());
    }

    #[test]
    fn test_voltage_variation_threshold() {
        let mut rows = synthetic_cycle(4, 20);
        for row in rows.iter_mut().filter(|r| r.current == Some(1.0)) {
            row.voltage = Some(3.7);
        }
        let record = RawRecord::new(rows);
        assert!(separate_valid_cycles(&record, 0, 10, 2).is_empty());
        assert_eq!(separate_valid_cycles(&record, 0, 10, 1).len(), 1);
    }

    #[test]
    fn test_short_cycle_excluded_without_error() {
        let record: RawRecord = synthetic_cycle(9, 3).into_iter().collect();
        assert!(separate_valid_cycles(&record, 0, 50, 10).is_empty());
    }

    #[test]
    fn test_missing_discharge_rejects_cycle() {
        let rows: Vec<RawRow> = synthetic_cycle(5, 20)
            .into_iter()
            .filter(|r| r.current == Some(1.0))
            .collect();
        let record = RawRecord::new(rows);
        assert!(separate_valid_cycles(&record, 0, 1, 1).is_empty());
    }
}
