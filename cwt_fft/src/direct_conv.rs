//! Time-domain linear convolution
//!
//! O(N·L), exact up to summation order. Used as a reference for the FFT
//! backend and for short signals where planning an FFT is not worth it.

use crate::backend::{transform_with, CwtBackend, CwtError};
use crate::wavelet::{WaveletFamily, DEFAULT_PRECISION};

/// CWT backend summing the convolution directly
#[derive(Debug, Clone, Copy)]
pub struct DirectConvolution {
    precision: u32,
}

impl Default for DirectConvolution {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
        }
    }
}

impl DirectConvolution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    /// Full linear convolution, length `signal.len() + kernel.len() - 1`
    pub fn convolve(&self, signal: &[f64], kernel: &[f64]) -> Vec<f64> {
        if signal.is_empty() || kernel.is_empty() {
            return Vec::new();
        }

        let mut out = vec![0.0; signal.len() + kernel.len() - 1];
        for (i, &s) in signal.iter().enumerate() {
            for (acc, &k) in out[i..i + kernel.len()].iter_mut().zip(kernel) {
                *acc += s * k;
            }
        }
        out
    }
}

impl CwtBackend for DirectConvolution {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn transform(
        &self,
        signal: &[f64],
        scale: f64,
        family: WaveletFamily,
    ) -> Result<Vec<f64>, CwtError> {
        transform_with(signal, scale, family, self.precision, |s, k| {
            self.convolve(s, k)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fft_conv::FftConvolution;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn test_convolve_small() {
        let conv = DirectConvolution::new().convolve(&[1.0, 2.0, 3.0], &[0.0, 1.0, 0.5]);
        assert_eq!(conv, vec![0.0, 1.0, 2.5, 4.0, 1.5]);
    }

    #[test]
    fn test_agrees_with_fft_backend() {
        let mut rng = StdRng::seed_from_u64(7);
        let signal: Vec<f64> = (0..600).map(|_| rng.gen_range(-1.0..1.0)).collect();

        let direct = DirectConvolution::new();
        let fft = FftConvolution::new();

        for family in WaveletFamily::ALL {
            for &scale in &[1.5, 6.0, 30.0] {
                let a = direct.transform(&signal, scale, family).unwrap();
                let b = fft.transform(&signal, scale, family).unwrap();

                let max_diff = a
                    .iter()
                    .zip(b.iter())
                    .map(|(x, y)| (x - y).abs())
                    .fold(0.0f64, f64::max);
                assert!(
                    max_diff < 1e-9,
                    "{} scale {}: max difference {:.3e}",
                    family,
                    scale,
                    max_diff
                );
            }
        }
    }

    #[test]
    fn test_agrees_with_fft_at_custom_precision() {
        let signal: Vec<f64> = (0..300).map(|i| (i as f64 * 0.21).cos()).collect();

        let a = DirectConvolution::new()
            .with_precision(12)
            .transform(&signal, 10.0, WaveletFamily::Morlet)
            .unwrap();
        let b = FftConvolution::new()
            .with_precision(12)
            .transform(&signal, 10.0, WaveletFamily::Morlet)
            .unwrap();

        assert!(a.iter().zip(&b).all(|(x, y)| (x - y).abs() < 1e-9));
    }
}
