use std::collections::hash_map::Entry;

use ahash::AHashMap;
use nalgebra::{DMatrix, DVector};

use crate::error::{DqdvError, Result};

/// Computes symmetric Savitzky-Golay smoothing coefficients.
///
/// A polynomial of degree `poly_order` is fitted by least squares to a window of
/// `window_size` samples centred on zero; the returned weights evaluate that fit
/// at the centre sample.
///
/// # Arguments
///
/// * `window_size` - Size of the moving window (must be odd)
/// * `poly_order` - Degree of the polynomial to fit (must be < window_size)
pub fn compute_coefficients(window_size: usize, poly_order: usize) -> Result<Vec<f64>> {
    if window_size % 2 == 0 || window_size == 0 {
        return Err(DqdvError::InvalidWindowSize(window_size));
    }
    if poly_order >= window_size {
        return Err(DqdvError::InvalidPolynomialOrder(poly_order, window_size));
    }

    let half_window = (window_size / 2) as isize;
    let offsets: Vec<isize> = (-half_window..=half_window).collect();
    compute_coefficients_for_offsets(&offsets, poly_order)
}

/// Computes smoothing weights for an arbitrary set of sample offsets relative to
/// the evaluation point.
///
/// Used at the signal edges, where the window is shifted to stay inside the data
/// and the evaluation point is no longer its centre.
pub fn compute_coefficients_for_offsets(
    offsets: &[isize],
    poly_order: usize,
) -> Result<Vec<f64>> {
    let window_size = offsets.len();
    if window_size == 0 {
        return Err(DqdvError::InvalidWindowSize(0));
    }
    if poly_order >= window_size {
        return Err(DqdvError::InvalidPolynomialOrder(poly_order, window_size));
    }

    // Vandermonde matrix: one row per sample, one column per power
    let mut vandermonde = DMatrix::<f64>::zeros(window_size, poly_order + 1);
    for (i, &off) in offsets.iter().enumerate() {
        let x = off as f64;
        for j in 0..=poly_order {
            vandermonde[(i, j)] = x.powi(j as i32);
        }
    }

    // Normal equations A^T A c = e_0 select the constant term of the fit
    let ata = vandermonde.transpose() * &vandermonde;
    let mut rhs = DVector::<f64>::zeros(poly_order + 1);
    rhs[0] = 1.0;

    let coeffs_poly = ata.lu().solve(&rhs).ok_or_else(|| {
        DqdvError::ComputationError("failed to solve least squares system".to_string())
    })?;

    let weights: Vec<f64> = offsets
        .iter()
        .map(|&off| {
            let x = off as f64;
            (0..=poly_order)
                .map(|j| coeffs_poly[j] * x.powi(j as i32))
                .sum::<f64>()
        })
        .collect();

    Ok(weights)
}

/// Cache of symmetric and edge coefficient sets, keyed by window shape.
#[derive(Debug, Default)]
pub struct CoefficientCache {
    symmetric: AHashMap<(usize, usize), Vec<f64>>,
    // key: (offsets, poly_order)
    asymmetric: AHashMap<(Vec<isize>, usize), Vec<f64>>,
}

impl CoefficientCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets symmetric coefficients from the cache or computes them
    pub fn get_coefficients(&mut self, window_size: usize, poly_order: usize) -> Result<&Vec<f64>> {
        match self.symmetric.entry((window_size, poly_order)) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let coeffs = compute_coefficients(window_size, poly_order)?;
                Ok(entry.insert(coeffs))
            }
        }
    }

    /// Gets edge coefficients for the given offsets from the cache or computes them
    pub fn get_coefficients_for_offsets(
        &mut self,
        offsets: &[isize],
        poly_order: usize,
    ) -> Result<&Vec<f64>> {
        match self.asymmetric.entry((offsets.to_vec(), poly_order)) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let coeffs = compute_coefficients_for_offsets(offsets, poly_order)?;
                Ok(entry.insert(coeffs))
            }
        }
    }
}
