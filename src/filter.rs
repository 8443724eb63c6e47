use crate::coefficients::CoefficientCache;
use crate::error::{DqdvError, Result};

/// Window parameters of the smoothing filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterConfig {
    /// Size of the filter window (must be odd)
    pub window_size: usize,
    /// Order of the polynomial to fit
    pub poly_order: usize,
}

impl FilterConfig {
    /// Creates a new filter configuration with validation
    pub fn new(window_size: usize, poly_order: usize) -> Result<Self> {
        if window_size % 2 == 0 || window_size == 0 {
            return Err(DqdvError::InvalidWindowSize(window_size));
        }
        if poly_order >= window_size {
            return Err(DqdvError::InvalidPolynomialOrder(poly_order, window_size));
        }
        Ok(Self {
            window_size,
            poly_order,
        })
    }
}

/// A Savitzky-Golay smoothing filter.
///
/// Interior samples are convolved with the symmetric coefficient set. The first
/// and last `window_size / 2` samples are evaluated from a polynomial fitted to
/// the first or last `window_size` samples, so no padding values are invented.
#[derive(Debug)]
pub struct SavitzkyGolayFilter {
    config: FilterConfig,
    cache: CoefficientCache,
}

impl SavitzkyGolayFilter {
    /// Creates a new Savitzky-Golay filter with the specified parameters.
    ///
    /// # Example
    ///
    /// ```rust
    /// use battery_dqdv::SavitzkyGolayFilter;
    ///
    /// let filter = SavitzkyGolayFilter::new(5, 2).expect("Valid parameters");
    /// ```
    pub fn new(window_size: usize, poly_order: usize) -> Result<Self> {
        Ok(Self::with_config(FilterConfig::new(window_size, poly_order)?))
    }

    pub fn with_config(config: FilterConfig) -> Self {
        Self {
            config,
            cache: CoefficientCache::new(),
        }
    }

    /// Applies the filter to `data`.
    ///
    /// Fails with [`DqdvError::InsufficientData`] when `data` is shorter than the
    /// window; the window is never clipped to fit.
    ///
    /// ```rust
    /// use battery_dqdv::SavitzkyGolayFilter;
    ///
    /// let data = vec![1.0, 2.0, 3.0, 4.0, 5.0, 4.0, 3.0, 2.0, 1.0];
    /// let mut filter = SavitzkyGolayFilter::new(5, 2).unwrap();
    /// let smoothed = filter.apply(&data).unwrap();
    /// assert_eq!(smoothed.len(), data.len());
    /// ```
    pub fn apply(&mut self, data: &[f64]) -> Result<Vec<f64>> {
        let window_size = self.config.window_size;
        let n = data.len();
        if n < window_size {
            return Err(DqdvError::InsufficientData(n, window_size));
        }

        let half_window = window_size / 2;
        let coeffs = self
            .cache
            .get_coefficients(window_size, self.config.poly_order)?
            .clone();

        let mut result = Vec::with_capacity(n);
        for center in 0..n {
            let value = if center < half_window || center + half_window >= n {
                self.edge_value(data, center)?
            } else {
                let start = center - half_window;
                convolve(&coeffs, &data[start..start + window_size])
            };
            result.push(value);
        }

        Ok(result)
    }

    /// Evaluates the polynomial fitted to the full window shifted inside `data`
    fn edge_value(&mut self, data: &[f64], center: usize) -> Result<f64> {
        let window_size = self.config.window_size;
        let start = if center < window_size / 2 {
            0
        } else {
            data.len() - window_size
        };
        let offsets: Vec<isize> = (start..start + window_size)
            .map(|i| i as isize - center as isize)
            .collect();

        let weights = self
            .cache
            .get_coefficients_for_offsets(&offsets, self.config.poly_order)?;
        Ok(convolve(weights, &data[start..start + window_size]))
    }

    /// Returns the filter configuration
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }
}

fn convolve(weights: &[f64], window: &[f64]) -> f64 {
    weights.iter().zip(window).map(|(w, x)| w * x).sum()
}

/// Smooths `data` with a Savitzky-Golay filter of the given window and order.
///
/// `window` must be odd, greater than `polyorder` and no larger than the number
/// of samples; violations are returned as errors.
pub fn smooth(data: &[f64], window: usize, polyorder: usize) -> Result<Vec<f64>> {
    SavitzkyGolayFilter::new(window, polyorder)?.apply(data)
}
