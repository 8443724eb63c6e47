use log::warn;

use crate::record::{RawRow, Segment, SegmentKind};

/// Splits one cycle's rows into its charge and discharge segments.
///
/// Rows with positive current go to the charge segment and rows with negative
/// current to the discharge segment. Rows missing current, time, voltage or the
/// matching capacity (absent or `NaN`) are dropped, as are rows whose matching capacity is not
/// positive. Row order is preserved; capacity monotonicity is not enforced.
///
/// An empty segment is reported through `log::warn!` and returned as is.
pub fn separate_charge_discharge<'a, I>(rows: I, cycle: u32) -> (Segment, Segment)
where
    I: IntoIterator<Item = &'a RawRow>,
{
    let mut charge = Segment::empty(SegmentKind::Charge);
    let mut discharge = Segment::empty(SegmentKind::Discharge);

    for row in rows {
        let Some(current) = present(row.current) else { continue };
        let segment = if SegmentKind::Charge.matches_current(current) {
            &mut charge
        } else if SegmentKind::Discharge.matches_current(current) {
            &mut discharge
        } else {
            continue;
        };

        let (Some(time), Some(voltage), Some(capacity)) = (
            present(row.test_time),
            present(row.voltage),
            present(segment.kind.capacity_of(row)),
        )
        else {
            continue;
        };
        if capacity > 0.0 {
            segment.push(current, time, voltage, capacity, row);
        }
    }

    for segment in [&charge, &discharge] {
        if segment.is_empty() {
            warn!("[Cycle {cycle}] no {} data found", segment.kind);
        }
    }

    (charge, discharge)
}

/// `NaN` cells count as missing.
fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| !v.is_nan())
}
