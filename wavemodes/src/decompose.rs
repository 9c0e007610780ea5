//! Multi-scale wavelet decomposition
//!
//! Every scale is transformed independently, so the rows are computed in
//! parallel when the `parallel` feature is on. Row `i` always belongs to
//! scale `i` regardless of execution order.

use crate::error::Result;
use crate::scales::ScaleSet;
use crate::signal::Signal;
use cwt_fft::{CwtBackend, CwtError, WaveletFamily};
use ndarray::{Array2, ArrayView1};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Wavelet coefficients: one row per scale, one column per sample
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientSet {
    coefs: Array2<f64>,
    scales: ScaleSet,
}

impl CoefficientSet {
    /// Wraps a precomputed M×N matrix
    pub fn new(coefs: Array2<f64>, scales: ScaleSet) -> std::result::Result<Self, CwtError> {
        if coefs.nrows() != scales.len() {
            return Err(CwtError::ShapeMismatch {
                expected: scales.len(),
                actual: coefs.nrows(),
            });
        }
        Ok(Self { coefs, scales })
    }

    pub fn num_scales(&self) -> usize {
        self.coefs.nrows()
    }

    /// Samples per row
    pub fn len(&self) -> usize {
        self.coefs.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.coefs.ncols() == 0
    }

    pub fn row(&self, index: usize) -> Option<ArrayView1<'_, f64>> {
        (index < self.num_scales()).then(|| self.coefs.row(index))
    }

    pub fn scales(&self) -> &ScaleSet {
        &self.scales
    }

    pub fn as_array(&self) -> &Array2<f64> {
        &self.coefs
    }
}

/// Runs a [`CwtBackend`] over every scale of a [`ScaleSet`]
pub struct WaveletDecomposer<B: CwtBackend> {
    backend: B,
    family: WaveletFamily,
}

impl<B: CwtBackend> WaveletDecomposer<B> {
    pub fn new(backend: B, family: WaveletFamily) -> Self {
        Self { backend, family }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn family(&self) -> WaveletFamily {
        self.family
    }

    pub fn decompose(&self, signal: &Signal, scales: &ScaleSet) -> Result<CoefficientSet> {
        scales.validate()?;

        let samples = signal.samples();
        let n = samples.len();

        log::debug!(
            "decomposing {} samples at {} scales ({} wavelet, {} backend)",
            n,
            scales.len(),
            self.family,
            self.backend.name()
        );

        let transform = |scale: f64| -> std::result::Result<Vec<f64>, CwtError> {
            let row = self.backend.transform(samples, scale, self.family)?;
            if row.len() != n {
                return Err(CwtError::ShapeMismatch {
                    expected: n,
                    actual: row.len(),
                });
            }
            Ok(row)
        };

        #[cfg(feature = "parallel")]
        let rows: std::result::Result<Vec<Vec<f64>>, CwtError> =
            scales.as_slice().par_iter().map(|&s| transform(s)).collect();

        #[cfg(not(feature = "parallel"))]
        let rows: std::result::Result<Vec<Vec<f64>>, CwtError> =
            scales.as_slice().iter().map(|&s| transform(s)).collect();

        let flat: Vec<f64> = rows?.into_iter().flatten().collect();
        let actual = flat.len();
        let coefs = Array2::from_shape_vec((scales.len(), n), flat).map_err(|_| {
            CwtError::ShapeMismatch {
                expected: scales.len() * n,
                actual,
            }
        })?;

        Ok(CoefficientSet::new(coefs, scales.clone())?)
    }
}
