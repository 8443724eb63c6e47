use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::columns;
use crate::error::DqdvError;

/// Which half of a cycle a segment, curve or file belongs to.
///
/// Also fixes the capacity orientation used throughout the crate: charge curves
/// run with ascending capacity, discharge curves with descending capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Charge,
    Discharge,
}

impl SegmentKind {
    pub const ALL: [SegmentKind; 2] = [SegmentKind::Charge, SegmentKind::Discharge];

    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentKind::Charge => "charge",
            SegmentKind::Discharge => "discharge",
        }
    }

    /// Header of the cumulative capacity column of this kind
    pub fn capacity_column(&self) -> &'static str {
        match self {
            SegmentKind::Charge => columns::CHARGE_CAPACITY,
            SegmentKind::Discharge => columns::DISCHARGE_CAPACITY,
        }
    }

    /// True when `current` has this kind's polarity. Zero current matches neither.
    pub fn matches_current(&self, current: f64) -> bool {
        match self {
            SegmentKind::Charge => current > 0.0,
            SegmentKind::Discharge => current < 0.0,
        }
    }

    pub fn capacity_of(&self, row: &RawRow) -> Option<f64> {
        match self {
            SegmentKind::Charge => row.charge_capacity,
            SegmentKind::Discharge => row.discharge_capacity,
        }
    }

    /// Puts an ascending-capacity sequence into this kind's orientation.
    pub fn orient<T>(&self, values: &mut [T]) {
        if *self == SegmentKind::Discharge {
            values.reverse();
        }
    }
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SegmentKind {
    type Err = DqdvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "charge" => Ok(SegmentKind::Charge),
            "discharge" => Ok(SegmentKind::Discharge),
            other => Err(DqdvError::InvalidParameter {
                what: "segment kind",
                value: other.to_string(),
            }),
        }
    }
}

/// One measurement row of a raw cycling export. Missing cells are `None`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawRow {
    #[serde(rename = "Cycle_Index")]
    pub cycle_index: u32,
    #[serde(rename = "Test_Time(s)")]
    pub test_time: Option<f64>,
    #[serde(rename = "Current(A)")]
    pub current: Option<f64>,
    #[serde(rename = "Voltage(V)", alias = "Voltage_sm (V)")]
    pub voltage: Option<f64>,
    #[serde(rename = "Charge_Capacity(Ah)")]
    pub charge_capacity: Option<f64>,
    #[serde(rename = "Discharge_Capacity(Ah)")]
    pub discharge_capacity: Option<f64>,
    #[serde(rename = "dV/dQ (computed from preprocessed V) (V/Ah)", default)]
    pub dv_dq: Option<f64>,
    #[serde(rename = "dQ/dV (computed from preprocessed V) (Ah/V)", default)]
    pub dq_dv: Option<f64>,
}

/// All rows of one raw export, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    rows: Vec<RawRow>,
}

impl RawRecord {
    pub fn new(rows: Vec<RawRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Groups rows by cycle index, preserving row order inside each cycle.
    pub fn cycles(&self) -> BTreeMap<u32, Vec<&RawRow>> {
        let mut groups: BTreeMap<u32, Vec<&RawRow>> = BTreeMap::new();
        for row in &self.rows {
            groups.entry(row.cycle_index).or_default().push(row);
        }
        groups
    }
}

impl FromIterator<RawRow> for RawRecord {
    fn from_iter<I: IntoIterator<Item = RawRow>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// The charge-only or discharge-only rows of one cycle, stored by column.
///
/// Every row has current of the kind's polarity and a positive capacity of the
/// matching kind. Missing raw derivative cells are `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub current: Vec<f64>,
    pub time: Vec<f64>,
    pub voltage: Vec<f64>,
    pub capacity: Vec<f64>,
    pub dv_dq: Vec<f64>,
    pub dq_dv: Vec<f64>,
}

impl Segment {
    pub fn empty(kind: SegmentKind) -> Self {
        Self {
            kind,
            current: Vec::new(),
            time: Vec::new(),
            voltage: Vec::new(),
            capacity: Vec::new(),
            dv_dq: Vec::new(),
            dq_dv: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.capacity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capacity.is_empty()
    }

    /// Number of distinct voltage values in the segment, `NaN` excluded
    pub fn distinct_voltages(&self) -> usize {
        let distinct: ahash::AHashSet<u64> = self
            .voltage
            .iter()
            .filter(|v| !v.is_nan())
            // fold -0.0 into 0.0
            .map(|v| (v + 0.0).to_bits())
            .collect();
        distinct.len()
    }

    pub(crate) fn push(
        &mut self,
        current: f64,
        time: f64,
        voltage: f64,
        capacity: f64,
        row: &RawRow,
    ) {
        self.current.push(current);
        self.time.push(time);
        self.voltage.push(voltage);
        self.capacity.push(capacity);
        self.dv_dq.push(row.dv_dq.unwrap_or(f64::NAN));
        self.dq_dv.push(row.dq_dv.unwrap_or(f64::NAN));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cycle: u32, current: f64) -> RawRow {
        RawRow {
            cycle_index: cycle,
            current: Some(current),
            ..RawRow::default()
        }
    }

    #[test]
    fn test_orientation() {
        let mut values = vec![1, 2, 3];
        SegmentKind::Charge.orient(&mut values);
        assert_eq!(values, vec![1, 2, 3]);
        SegmentKind::Discharge.orient(&mut values);
        assert_eq!(values, vec![3, 2, 1]);
    }

    #[test]
    fn test_polarity() {
        assert!(SegmentKind::Charge.matches_current(0.5));
        assert!(!SegmentKind::Charge.matches_current(0.0));
        assert!(SegmentKind::Discharge.matches_current(-0.5));
        assert!(!SegmentKind::Discharge.matches_current(f64::NAN));
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("charge".parse::<SegmentKind>().unwrap(), SegmentKind::Charge);
        assert_eq!(
            "discharge".parse::<SegmentKind>().unwrap(),
            SegmentKind::Discharge
        );
        let err = "rest".parse::<SegmentKind>().unwrap_err();
        assert!(err.to_string().contains("rest"));
    }

    #[test]
    fn test_cycles_grouping_keeps_row_order() {
        let record: RawRecord = vec![row(2, 1.0), row(1, 2.0), row(2, 3.0)]
            .into_iter()
            .collect();
        let cycles = record.cycles();

        assert_eq!(cycles.len(), 2);
        let currents: Vec<_> = cycles[&2].iter().map(|r| r.current).collect();
        assert_eq!(currents, vec![Some(1.0), Some(3.0)]);
    }

    #[test]
    fn test_distinct_voltages() {
        let mut segment = Segment::empty(SegmentKind::Charge);
        let raw = RawRow::default();
        for v in [3.0, 3.1, 3.0, 3.2, f64::NAN, f64::NAN] {
            segment.push(1.0, 0.0, v, 1.0, &raw);
        }
        assert_eq!(segment.distinct_voltages(), 3);
        assert!(segment.dq_dv.iter().all(|x| x.is_nan()));
    }
}
