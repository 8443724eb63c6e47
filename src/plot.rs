//! Plot-ready series for capacity/voltage and derivative curves.

use crate::curve::Curve;
use crate::process::ProcessMode;
use crate::record::{Segment, SegmentKind};

/// Legend labels used across the plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotLabel {
    DqdvRaw,
    DvdqRaw,
    DqdvSmoothedGradient,
    DvdqSmoothedGradient,
    DqdvPreprocessedGradient,
    DvdqPreprocessedGradient,
    IntegratedCurrent,
    DvdqIntegratedCurrent,
    VoltageCapacity,
}

impl PlotLabel {
    pub fn text(&self) -> &'static str {
        match self {
            PlotLabel::DqdvRaw => "Raw dQ/dV (from dataset)",
            PlotLabel::DvdqRaw => "Raw dV/dQ (from dataset)",
            PlotLabel::DqdvSmoothedGradient => "dQ/dV (gradient from smoothed V)",
            PlotLabel::DvdqSmoothedGradient => "dV/dQ (gradient from smoothed V)",
            PlotLabel::DqdvPreprocessedGradient => {
                "dQ/dV (gradient from interpolated + smoothed V)"
            }
            PlotLabel::DvdqPreprocessedGradient => {
                "dV/dQ (gradient from interpolated + smoothed V)"
            }
            PlotLabel::IntegratedCurrent => "dQ/dV from I·dt",
            PlotLabel::DvdqIntegratedCurrent => "dV/dQ from I·dt",
            PlotLabel::VoltageCapacity => "Interpolated + Smoothed V–Q",
        }
    }

    /// dQ/dV and dV/dQ labels for curves produced by `mode`
    pub fn derivative_pair(mode: ProcessMode) -> (PlotLabel, PlotLabel) {
        match mode {
            ProcessMode::Preprocess => (
                PlotLabel::DqdvPreprocessedGradient,
                PlotLabel::DvdqPreprocessedGradient,
            ),
            ProcessMode::Smooth => (
                PlotLabel::DqdvSmoothedGradient,
                PlotLabel::DvdqSmoothedGradient,
            ),
            ProcessMode::PreForIntegrate => (
                PlotLabel::IntegratedCurrent,
                PlotLabel::DvdqIntegratedCurrent,
            ),
        }
    }
}

/// One line of a plot: the points plus everything needed to label it.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSeries {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub label: &'static str,
    pub title: String,
    pub x_label: &'static str,
    pub y_label: &'static str,
}

pub fn make_title(what: &str, folder: u32, cycle: u32, kind: SegmentKind) -> String {
    format!("{what} from Folder {folder}, Cycle {cycle} [{kind}]")
}

/// Smoothed voltage against capacity.
pub fn vq_series(curve: &Curve, folder: u32, cycle: u32) -> PlotSeries {
    PlotSeries {
        x: curve.capacity.clone(),
        y: curve.voltage.clone(),
        label: PlotLabel::VoltageCapacity.text(),
        title: make_title("Interpolated + Smoothed V–Q", folder, cycle, curve.kind),
        x_label: "Capacity (Ah)",
        y_label: "Interpolated + Smoothed Voltage (V)",
    }
}

/// dQ/dV and dV/dQ against voltage, skipping rows where the ratio is undefined.
///
/// `mode` is the processing mode the curve came from and selects the labels.
pub fn derivative_series(
    curve: &Curve,
    mode: ProcessMode,
    folder: u32,
    cycle: u32,
) -> [PlotSeries; 2] {
    let (dqdv_label, dvdq_label) = PlotLabel::derivative_pair(mode);
    ratio_series(
        &curve.voltage,
        &curve.dq_dv,
        &curve.dv_dq,
        (dqdv_label, dvdq_label),
        "gradient",
        titler(folder, cycle, curve.kind),
    )
}

/// The derivative columns shipped with the raw export, against measured voltage.
pub fn raw_derivative_series(segment: &Segment, folder: u32, cycle: u32) -> [PlotSeries; 2] {
    ratio_series(
        &segment.voltage,
        &segment.dq_dv,
        &segment.dv_dq,
        (PlotLabel::DqdvRaw, PlotLabel::DvdqRaw),
        "raw",
        titler(folder, cycle, segment.kind),
    )
}

fn titler(folder: u32, cycle: u32, kind: SegmentKind) -> impl Fn(&str) -> String {
    move |what: &str| make_title(what, folder, cycle, kind)
}

fn ratio_series(
    voltage: &[f64],
    dq_dv: &[f64],
    dv_dq: &[f64],
    labels: (PlotLabel, PlotLabel),
    source: &str,
    title: impl Fn(&str) -> String,
) -> [PlotSeries; 2] {
    let defined = |ratio: &[f64]| -> (Vec<f64>, Vec<f64>) {
        voltage
            .iter()
            .zip(ratio)
            .filter(|(_, r)| !r.is_nan())
            .map(|(&v, &r)| (v, r))
            .unzip()
    };

    let (v_dqdv, dqdv) = defined(dq_dv);
    let (v_dvdq, dvdq) = defined(dv_dq);

    [
        PlotSeries {
            x: v_dqdv,
            y: dqdv,
            label: labels.0.text(),
            title: title(&format!("dQ/dV ({source})")),
            x_label: "Voltage (V)",
            y_label: "dQ/dV (Ah/V)",
        },
        PlotSeries {
            x: v_dvdq,
            y: dvdq,
            label: labels.1.text(),
            title: title(&format!("dV/dQ ({source})")),
            x_label: "Voltage (V)",
            y_label: "dV/dQ (V/Ah)",
        },
    ]
}
