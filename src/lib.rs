//! # battery-dqdv
//!
//! Incremental-capacity (dQ/dV) and differential-voltage (dV/dQ) analysis of
//! battery cycling data.
//!
//! A raw cycling export is split into the charge and discharge segments of each
//! cycle. Cycles whose segments are long enough and show enough voltage variation
//! are kept; their voltage is resampled against capacity onto a uniform grid with
//! cubic interpolation, smoothed with a Savitzky-Golay filter, and differentiated
//! with a guard against near-zero denominators.
//!
//! ## Orientation
//!
//! Charge curves run with ascending capacity and discharge curves with
//! descending capacity. [`SegmentKind::orient`] is the single place where that
//! convention is applied.
//!
//! ## Example
//!
//! ```rust
//! use battery_dqdv::{compute_derivatives, resample_segment, Segment, SegmentKind};
//!
//! let segment = Segment {
//!     kind: SegmentKind::Charge,
//!     current: vec![1.0; 5],
//!     time: vec![0.0, 10.0, 20.0, 30.0, 40.0],
//!     voltage: vec![3.0, 3.2, 3.35, 3.45, 3.5],
//!     capacity: vec![0.0, 0.1, 0.2, 0.3, 0.4],
//!     dv_dq: vec![f64::NAN; 5],
//!     dq_dv: vec![f64::NAN; 5],
//! };
//!
//! let curve = resample_segment(&segment, 9, 5, 2).expect("valid segment");
//! let derivative = compute_derivatives(&curve, 1e-6).expect("enough rows");
//! assert_eq!(derivative.dq_dv.len(), 9);
//! ```

pub mod analysis;
pub mod columns;
mod coefficients;
mod config;
mod curve;
mod derivative;
mod error;
mod filter;
pub mod io;
pub mod plot;
mod process;
mod record;
mod resample;
mod separator;
mod spline;
mod validator;

pub use coefficients::{compute_coefficients, compute_coefficients_for_offsets};
pub use config::PipelineConfig;
pub use curve::Curve;
pub use derivative::{compute_derivatives, gradient, guarded_ratio};
pub use error::{DqdvError, Result};
pub use filter::{smooth, FilterConfig, SavitzkyGolayFilter};
pub use io::CurveKind;
pub use process::{
    integrate_charge, preprocess_single, process_all, process_cycle, CurveProcessor,
    IntegrateCurrent, Preprocess, ProcessMode, ProcessedCycle, SmoothOnly,
};
pub use record::{RawRecord, RawRow, Segment, SegmentKind};
pub use resample::resample_segment;
pub use separator::separate_charge_discharge;
pub use spline::CubicInterpolant;
pub use validator::{separate_valid_cycles, ValidCycle};
