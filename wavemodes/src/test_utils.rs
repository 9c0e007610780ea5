//! Testing utilities
//!
//! Slice comparisons with a tolerance, plus an identity backend that lets
//! detector behaviour be checked on the raw signal without a real transform.

use cwt_fft::{CwtBackend, CwtError, WaveletFamily};

/// Largest absolute element-wise difference between two slices
///
/// Panics if the lengths differ.
pub fn max_abs_diff(a: &[f64], b: &[f64]) -> f64 {
    assert_eq!(a.len(), b.len(), "length mismatch: {} vs {}", a.len(), b.len());

    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0f64, f64::max)
}

/// Assert two slices are approximately equal
pub fn assert_slices_approx_eq(a: &[f64], b: &[f64], epsilon: f64, msg: &str) {
    let max_diff = max_abs_diff(a, b);

    assert!(
        max_diff < epsilon,
        "{}: max difference {:.3e} >= epsilon {:.3e}",
        msg,
        max_diff,
        epsilon
    );
}

/// Backend returning the signal unchanged at every scale
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughBackend;

impl CwtBackend for PassthroughBackend {
    fn name(&self) -> &'static str {
        "passthrough"
    }

    fn transform(
        &self,
        signal: &[f64],
        _scale: f64,
        _family: WaveletFamily,
    ) -> Result<Vec<f64>, CwtError> {
        if signal.is_empty() {
            return Err(CwtError::EmptySignal);
        }
        Ok(signal.to_vec())
    }
}
