//! End-to-end differential analysis of one cycle.

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::config::PipelineConfig;
use crate::curve::Curve;
use crate::derivative::compute_derivatives;
use crate::error::{DqdvError, Result};
use crate::io::{load_curve, save_curve, CurveKind};
use crate::plot::{derivative_series, vq_series, PlotSeries};
use crate::process::ProcessMode;
use crate::record::{RawRecord, SegmentKind};
use crate::validator::{separate_valid_cycles, ValidCycle};

/// Validated cycles of `record`, logged by number for quick reference.
pub fn valid_cycles(record: &RawRecord, folder: u32, config: &PipelineConfig) -> Vec<ValidCycle> {
    let valid =
        separate_valid_cycles(record, folder, config.min_seg_length, config.min_v_variation);

    let cycles: Vec<u32> = valid.iter().map(|valid| valid.cycle).collect();
    info!("valid cycles in folder {folder}: {cycles:?}");
    valid
}

/// Cycle numbers of `record` that pass validation.
pub fn valid_cycle_numbers(record: &RawRecord, folder: u32, config: &PipelineConfig) -> Vec<u32> {
    valid_cycles(record, folder, config)
        .iter()
        .map(|valid| valid.cycle)
        .collect()
}

fn find_valid_cycle(
    record: &RawRecord,
    folder: u32,
    cycle: u32,
    config: &PipelineConfig,
) -> Result<ValidCycle> {
    separate_valid_cycles(record, folder, config.min_seg_length, config.min_v_variation)
        .into_iter()
        .find(|valid| valid.cycle == cycle)
        .ok_or(DqdvError::CycleNotFound { folder, cycle })
}

/// Curve of one cycle's segment produced by `mode`.
///
/// Validates the whole record on every call. To process many cycles, take
/// them from [`valid_cycles`] once and pass each to [`crate::process_cycle`].
pub fn cycle_curve(
    record: &RawRecord,
    folder: u32,
    cycle: u32,
    kind: SegmentKind,
    config: &PipelineConfig,
    mode: ProcessMode,
) -> Result<Curve> {
    config.validate()?;
    let valid = find_valid_cycle(record, folder, cycle, config)?;
    mode.processor().process(valid.segment(kind), config)
}

/// Resampled and smoothed curve of one cycle's segment.
pub fn preprocessed_curve(
    record: &RawRecord,
    folder: u32,
    cycle: u32,
    kind: SegmentKind,
    config: &PipelineConfig,
) -> Result<Curve> {
    cycle_curve(record, folder, cycle, kind, config, ProcessMode::Preprocess)
}

/// Everything produced by [`analyze_region`].
#[derive(Debug, Clone, PartialEq)]
pub struct RegionAnalysis {
    /// Full preprocessed curve of the segment
    pub curve: Curve,
    /// Preprocessed rows inside the capacity range, as reloaded from disk
    pub region: Curve,
    /// Region with guarded dQ/dV and dV/dQ
    pub derivative: Curve,
    /// Files written, one per processing mode
    pub saved: Vec<PathBuf>,
    pub vq: PlotSeries,
    pub derivatives: [PlotSeries; 2],
}

/// Differential analysis of the capacity range `[q_min, q_max]` of one segment.
///
/// The range is measured from the segment's smallest capacity, the axis of the
/// preprocessed V–Q curve, and every processing mode's curve is cut on it.
/// Nothing is written unless the preprocessed region has at least two rows.
/// Each region is saved to `output_dir`; the preprocessed one is then read
/// back, differentiated, and saved again under the same name with its
/// derivative columns filled in.
#[allow(clippy::too_many_arguments)]
pub fn analyze_region<P: AsRef<Path>>(
    record: &RawRecord,
    folder: u32,
    cycle: u32,
    kind: SegmentKind,
    q_min: f64,
    q_max: f64,
    config: &PipelineConfig,
    output_dir: P,
) -> Result<RegionAnalysis> {
    config.validate()?;
    let output_dir = output_dir.as_ref();
    let valid = find_valid_cycle(record, folder, cycle, config)?;
    let segment = valid.segment(kind);

    let curve = ProcessMode::Preprocess.processor().process(segment, config)?;
    let mut regions = vec![(CurveKind::Preprocessed, curve.region_from_start(q_min, q_max))];
    for mode in [ProcessMode::Smooth, ProcessMode::PreForIntegrate] {
        let processed = mode.processor().process(segment, config)?;
        regions.push((mode.curve_kind(), processed.region_from_start(q_min, q_max)));
    }

    let rows = regions[0].1.len();
    if rows < 2 {
        return Err(DqdvError::TooFewPoints {
            operation: "region analysis",
            required: 2,
            actual: rows,
        });
    }
    for (curve_kind, region) in &regions {
        if region.is_empty() {
            warn!("[Cycle {cycle}] {curve_kind} region [{q_min}, {q_max}] has no rows");
        }
    }

    let saved = regions
        .iter()
        .map(|(curve_kind, region)| save_curve(output_dir, *curve_kind, folder, cycle, region))
        .collect::<Result<Vec<_>>>()?;

    let region = load_curve(output_dir, CurveKind::Preprocessed, folder, cycle, kind)?;
    let derivative = compute_derivatives(&region, config.eps)?;
    save_curve(output_dir, CurveKind::Preprocessed, folder, cycle, &derivative)?;

    Ok(RegionAnalysis {
        vq: vq_series(&region, folder, cycle),
        derivatives: derivative_series(&derivative, ProcessMode::Preprocess, folder, cycle),
        curve,
        region,
        derivative,
        saved,
    })
}
