use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DqdvError, Result};
use crate::filter::FilterConfig;

/// Thresholds and numeric parameters of the analysis pipeline.
///
/// Fields missing from a JSON document take their default values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Minimum rows in each of the charge and discharge segments
    pub min_seg_length: usize,
    /// Minimum distinct voltage values in each segment
    pub min_v_variation: usize,
    /// Points on the resampled capacity grid
    pub no_points: usize,
    /// Savitzky-Golay window length (odd)
    pub window: usize,
    /// Savitzky-Golay polynomial order
    pub polyorder: usize,
    /// Denominator magnitude below which a derivative ratio is undefined
    pub eps: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_seg_length: 50,
            min_v_variation: 10,
            no_points: 300,
            window: 11,
            polyorder: 3,
            eps: 1e-6,
        }
    }
}

impl PipelineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DqdvError::FileNotFound(path.to_path_buf()));
        }
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    pub fn with_thresholds(mut self, min_seg_length: usize, min_v_variation: usize) -> Self {
        self.min_seg_length = min_seg_length;
        self.min_v_variation = min_v_variation;
        self
    }

    pub fn with_no_points(mut self, no_points: usize) -> Self {
        self.no_points = no_points;
        self
    }

    pub fn with_smoothing(mut self, window: usize, polyorder: usize) -> Self {
        self.window = window;
        self.polyorder = polyorder;
        self
    }

    pub fn with_eps(mut self, eps: f64) -> Self {
        self.eps = eps;
        self
    }

    /// Checks the parameters against each other.
    ///
    /// The smoothing window must be odd, longer than the polynomial order and no
    /// longer than the resampled grid; the grid needs at least two points and
    /// `eps` must be finite and non-negative.
    pub fn validate(&self) -> Result<()> {
        FilterConfig::new(self.window, self.polyorder)
            .map_err(|e| DqdvError::InvalidConfig(e.to_string()))?;

        if self.no_points < 2 {
            return Err(DqdvError::InvalidConfig(format!(
                "no_points must be at least 2, got {}",
                self.no_points
            )));
        }
        if self.window > self.no_points {
            return Err(DqdvError::InvalidConfig(format!(
                "window ({}) must not exceed no_points ({})",
                self.window, self.no_points
            )));
        }
        if !self.eps.is_finite() || self.eps < 0.0 {
            return Err(DqdvError::InvalidConfig(format!(
                "eps must be finite and non-negative, got {}",
                self.eps
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.no_points, 300);
        assert_eq!(config.window, 11);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = PipelineConfig::from_json_str(r#"{"no_points": 120, "eps": 1e-4}"#).unwrap();
        assert_eq!(config.no_points, 120);
        assert_eq!(config.eps, 1e-4);
        assert_eq!(config.min_seg_length, 50);
    }

    #[test]
    fn test_rejects_inconsistent_parameters() {
        let base = PipelineConfig::default();
        for bad in [
            base.clone().with_smoothing(10, 3),
            base.clone().with_smoothing(5, 5),
            base.clone().with_no_points(1),
            base.clone().with_no_points(7),
            base.clone().with_eps(-1.0),
            base.clone().with_eps(f64::NAN),
        ] {
            assert!(matches!(bad.validate(), Err(DqdvError::InvalidConfig(_))), "{bad:?}");
        }
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(
            PipelineConfig::from_json_str("{\"window\": \"eleven\"}"),
            Err(DqdvError::Json(_))
        ));
        assert!(matches!(
            PipelineConfig::from_json_str("{\"window\": 4}"),
            Err(DqdvError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = PipelineConfig::from_path("/nonexistent/battery-dqdv/config.json");
        assert!(matches!(result, Err(DqdvError::FileNotFound(_))));
    }
}
