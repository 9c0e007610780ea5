//! Backend seam for the continuous wavelet transform.
//!
//! A backend turns (signal, scale, wavelet family) into one real coefficient
//! sequence of the same length as the signal. Backends differ only in how the
//! linear convolution is computed, so results agree to rounding but are not
//! bit-identical.

use crate::wavelet::{WaveletFamily, PRECISION_RANGE};
use thiserror::Error;

/// Failures of the transform primitive
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CwtError {
    #[error("unsupported wavelet family `{0}`")]
    UnsupportedWavelet(String),

    #[error("scale must be positive and finite, got {0}")]
    InvalidScale(f64),

    #[error("scale {0} is too small for the sampled wavelet")]
    ScaleTooSmall(f64),

    #[error("wavelet precision {0} is outside 2..=20")]
    InvalidPrecision(u32),

    #[error("cannot transform an empty signal")]
    EmptySignal,

    #[error("convolution returned {actual} samples, expected {expected}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("non-finite coefficient at sample {index} for scale {scale}")]
    NonFinite { scale: f64, index: usize },
}

/// Continuous wavelet transform evaluated one scale at a time
pub trait CwtBackend: Send + Sync {
    /// Human-readable backend name for logs and reports
    fn name(&self) -> &'static str;

    /// Returns the coefficients of `signal` at `scale`, one per input sample
    fn transform(
        &self,
        signal: &[f64],
        scale: f64,
        family: WaveletFamily,
    ) -> Result<Vec<f64>, CwtError>;
}

impl<T: CwtBackend + ?Sized> CwtBackend for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn transform(
        &self,
        signal: &[f64],
        scale: f64,
        family: WaveletFamily,
    ) -> Result<Vec<f64>, CwtError> {
        (**self).transform(signal, scale, family)
    }
}

impl<T: CwtBackend + ?Sized> CwtBackend for &T {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn transform(
        &self,
        signal: &[f64],
        scale: f64,
        family: WaveletFamily,
    ) -> Result<Vec<f64>, CwtError> {
        (**self).transform(signal, scale, family)
    }
}

pub(crate) fn check_precision(precision: u32) -> Result<(), CwtError> {
    if PRECISION_RANGE.contains(&precision) {
        Ok(())
    } else {
        Err(CwtError::InvalidPrecision(precision))
    }
}

/// Integrated-wavelet transform with a pluggable linear convolution
///
/// coef = -√scale · diff(signal ⊛ kernel), trimmed symmetrically to the
/// signal length (floor of the excess at the front, ceil at the back).
pub(crate) fn transform_with<F>(
    signal: &[f64],
    scale: f64,
    family: WaveletFamily,
    precision: u32,
    convolve: F,
) -> Result<Vec<f64>, CwtError>
where
    F: FnOnce(&[f64], &[f64]) -> Vec<f64>,
{
    if signal.is_empty() {
        return Err(CwtError::EmptySignal);
    }
    check_precision(precision)?;

    let kernel = family.integrated(precision).kernel(scale)?;
    let n = signal.len();

    let full = convolve(signal, &kernel);
    let expected = n + kernel.len() - 1;
    if full.len() != expected {
        return Err(CwtError::ShapeMismatch {
            expected,
            actual: full.len(),
        });
    }

    // diff() drops one sample, leaving n + kernel_len - 2 >= n
    let excess = full.len() - 1 - n;
    let lead = excess / 2;
    let gain = -scale.sqrt();

    let coefs: Vec<f64> = (lead..lead + n)
        .map(|t| gain * (full[t + 1] - full[t]))
        .collect();

    if let Some(index) = coefs.iter().position(|c| !c.is_finite()) {
        return Err(CwtError::NonFinite { scale, index });
    }

    log::trace!(
        "cwt scale={:.3} family={} kernel_taps={} samples={}",
        scale,
        family,
        kernel.len(),
        n
    );

    Ok(coefs)
}
