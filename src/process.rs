use std::fmt;
use std::str::FromStr;

use crate::config::PipelineConfig;
use crate::curve::Curve;
use crate::error::{DqdvError, Result};
use crate::filter::smooth;
use crate::io::CurveKind;
use crate::record::{RawRecord, Segment, SegmentKind};
use crate::resample::resample_segment;
use crate::validator::{separate_valid_cycles, ValidCycle};

/// Turns one validated segment into a curve.
pub trait CurveProcessor {
    fn process(&self, segment: &Segment, config: &PipelineConfig) -> Result<Curve>;
}

/// Cubic resampling onto the capacity grid followed by smoothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Preprocess;

/// Smoothed voltage on the segment's own rows, without resampling.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmoothOnly;

/// Smoothed current and voltage with capacity rebuilt from the integral of I·dt.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegrateCurrent;

impl CurveProcessor for Preprocess {
    fn process(&self, segment: &Segment, config: &PipelineConfig) -> Result<Curve> {
        resample_segment(segment, config.no_points, config.window, config.polyorder)
    }
}

impl CurveProcessor for SmoothOnly {
    fn process(&self, segment: &Segment, config: &PipelineConfig) -> Result<Curve> {
        Ok(Curve {
            kind: segment.kind,
            time: segment.time.clone(),
            current: segment.current.clone(),
            capacity: segment.capacity.clone(),
            interpolated_voltage: None,
            dv_dq: segment.dv_dq.clone(),
            dq_dv: segment.dq_dv.clone(),
            voltage: smooth(&segment.voltage, config.window, config.polyorder)?,
        })
    }
}

impl CurveProcessor for IntegrateCurrent {
    fn process(&self, segment: &Segment, config: &PipelineConfig) -> Result<Curve> {
        let current = smooth(&segment.current, config.window, config.polyorder)?;
        let voltage = smooth(&segment.voltage, config.window, config.polyorder)?;
        let capacity = integrate_charge(&segment.time, &current);

        Ok(Curve {
            kind: segment.kind,
            time: segment.time.clone(),
            current,
            capacity,
            interpolated_voltage: None,
            dv_dq: segment.dv_dq.clone(),
            dq_dv: segment.dq_dv.clone(),
            voltage,
        })
    }
}

/// Cumulative trapezoidal integral of |I| over time, in ampere-hours.
pub fn integrate_charge(time: &[f64], current: &[f64]) -> Vec<f64> {
    let mut total = 0.0;
    let mut charge = Vec::with_capacity(time.len());
    for i in 0..time.len().min(current.len()) {
        if i > 0 {
            let dt = time[i] - time[i - 1];
            total += 0.5 * (current[i].abs() + current[i - 1].abs()) * dt / 3600.0;
        }
        charge.push(total);
    }
    charge
}

/// The closed set of ways a valid cycle can be processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessMode {
    Preprocess,
    Smooth,
    PreForIntegrate,
}

impl ProcessMode {
    pub const ALL: [ProcessMode; 3] = [
        ProcessMode::Preprocess,
        ProcessMode::Smooth,
        ProcessMode::PreForIntegrate,
    ];

    pub fn processor(&self) -> &'static dyn CurveProcessor {
        match self {
            ProcessMode::Preprocess => &Preprocess,
            ProcessMode::Smooth => &SmoothOnly,
            ProcessMode::PreForIntegrate => &IntegrateCurrent,
        }
    }

    /// Kind under which curves of this mode are persisted
    pub fn curve_kind(&self) -> CurveKind {
        match self {
            ProcessMode::Preprocess => CurveKind::Preprocessed,
            ProcessMode::Smooth => CurveKind::Smoothed,
            ProcessMode::PreForIntegrate => CurveKind::PreForIntegrate,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessMode::Preprocess => "preprocess",
            ProcessMode::Smooth => "smooth",
            ProcessMode::PreForIntegrate => "pre_for_integrate",
        }
    }
}

impl fmt::Display for ProcessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProcessMode {
    type Err = DqdvError;

    fn from_str(s: &str) -> Result<Self> {
        ProcessMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| DqdvError::InvalidParameter {
                what: "processing mode",
                value: s.to_string(),
            })
    }
}

/// Charge and discharge curves of one processed cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedCycle {
    pub folder: u32,
    pub cycle: u32,
    pub charge: Curve,
    pub discharge: Curve,
}

impl ProcessedCycle {
    pub fn curve(&self, kind: SegmentKind) -> &Curve {
        match kind {
            SegmentKind::Charge => &self.charge,
            SegmentKind::Discharge => &self.discharge,
        }
    }
}

/// Resamples and smooths both segments of one cycle.
pub fn preprocess_single(
    charge: &Segment,
    discharge: &Segment,
    config: &PipelineConfig,
) -> Result<(Curve, Curve)> {
    Ok((
        Preprocess.process(charge, config)?,
        Preprocess.process(discharge, config)?,
    ))
}

/// Applies `mode` to one validated cycle.
pub fn process_cycle(
    valid: &ValidCycle,
    config: &PipelineConfig,
    mode: ProcessMode,
) -> Result<ProcessedCycle> {
    let processor = mode.processor();
    Ok(ProcessedCycle {
        folder: valid.folder,
        cycle: valid.cycle,
        charge: processor.process(&valid.charge, config)?,
        discharge: processor.process(&valid.discharge, config)?,
    })
}

/// Validates every cycle of `record` and processes the valid ones with `mode`.
///
/// Any processing failure aborts the whole call.
pub fn process_all(
    record: &RawRecord,
    folder: u32,
    config: &PipelineConfig,
    mode: ProcessMode,
) -> Result<Vec<ProcessedCycle>> {
    config.validate()?;
    separate_valid_cycles(record, folder, config.min_seg_length, config.min_v_variation)
        .iter()
        .map(|valid| process_cycle(valid, config, mode))
        .collect()
}
