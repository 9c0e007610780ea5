//! FFT-based linear convolution using the convolution theorem
//!
//! signal ⊛ kernel = IFFT(FFT(signal) × FFT(kernel))
//!
//! This is O(N log N) instead of O(N·L) for the direct sum, which matters at
//! low frequencies where the dilated wavelet spans thousands of samples.

use crate::backend::{transform_with, CwtBackend, CwtError};
use crate::wavelet::{WaveletFamily, DEFAULT_PRECISION};
use num_complex::Complex;
use rustfft::FftPlanner;

/// CWT backend convolving in the frequency domain with `rustfft`
#[derive(Debug, Clone, Copy)]
pub struct FftConvolution {
    precision: u32,
}

impl Default for FftConvolution {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
        }
    }
}

impl FftConvolution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the wavelet table size (2^precision samples)
    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    /// Full linear convolution, length `signal.len() + kernel.len() - 1`
    pub fn convolve(&self, signal: &[f64], kernel: &[f64]) -> Vec<f64> {
        if signal.is_empty() || kernel.is_empty() {
            return Vec::new();
        }

        let out_len = signal.len() + kernel.len() - 1;

        // Next power of 2 >= output length avoids circular wrap-around
        let fft_size = out_len.next_power_of_two();

        // 1. Zero-pad both sequences to FFT size
        let mut sig_buf = zero_padded(signal, fft_size);
        let mut ker_buf = zero_padded(kernel, fft_size);

        // 2. Forward FFT on both
        let mut planner = FftPlanner::<f64>::new();
        let forward = planner.plan_fft_forward(fft_size);
        forward.process(&mut sig_buf);
        forward.process(&mut ker_buf);

        // 3. Pointwise product
        for (s, k) in sig_buf.iter_mut().zip(ker_buf.iter()) {
            *s = *s * *k;
        }

        // 4. Inverse FFT, rustfft leaves it unnormalized
        let inverse = planner.plan_fft_inverse(fft_size);
        inverse.process(&mut sig_buf);

        let norm = 1.0 / fft_size as f64;
        sig_buf[..out_len].iter().map(|c| c.re * norm).collect()
    }
}

impl CwtBackend for FftConvolution {
    fn name(&self) -> &'static str {
        "fft"
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

fn zero_padded(values: &[f64], size: usize) -> Vec<Complex<f64>> {
    let mut buffer = vec![Complex::new(0.0, 0.0); size];
    for (slot, &v) in buffer.iter_mut().zip(values) {
        slot.re = v;
    }
    buffer
}
