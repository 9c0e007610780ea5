//! Real mother wavelets sampled on their effective support.
//!
//! ψ_morl(x) = exp(-x²/2) · cos(5x)
//! ψ_mexh(x) = 2 / (√3 · π^¼) · (1 - x²) · exp(-x²/2)
//!
//! Both families live on x ∈ [-8, 8]; outside that window they are below
//! 1e-13 and treated as zero.

use crate::backend::CwtError;
use num_complex::Complex;
use rustfft::FftPlanner;
use std::f64::consts::PI;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Number of samples used for wavelet tables is 2^precision
pub const DEFAULT_PRECISION: u32 = 10;

/// Precisions a backend accepts
pub const PRECISION_RANGE: RangeInclusive<u32> = 2..=20;

/// Precision used when estimating the central frequency
pub const CENTRAL_FREQUENCY_PRECISION: u32 = 8;

const SUPPORT: (f64, f64) = (-8.0, 8.0);

/// Supported continuous wavelet families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaveletFamily {
    /// Real Morlet wavelet (`morl`)
    Morlet,
    /// Mexican hat / Ricker wavelet (`mexh`)
    MexicanHat,
}

impl WaveletFamily {
    pub const ALL: [WaveletFamily; 2] = [WaveletFamily::Morlet, WaveletFamily::MexicanHat];

    /// Short identifier used in configuration files
    pub fn identifier(&self) -> &'static str {
        match self {
            WaveletFamily::Morlet => "morl",
            WaveletFamily::MexicanHat => "mexh",
        }
    }

    /// Lower and upper bound of the sampled support
    pub fn support(&self) -> (f64, f64) {
        SUPPORT
    }

    /// Evaluates ψ(x)
    pub fn psi(&self, x: f64) -> f64 {
        let gaussian = (-0.5 * x * x).exp();
        match self {
            WaveletFamily::Morlet => gaussian * (5.0 * x).cos(),
            WaveletFamily::MexicanHat => {
                let norm = 2.0 / (3.0f64.sqrt() * PI.powf(0.25));
                norm * (1.0 - x * x) * gaussian
            }
        }
    }

    /// Samples ψ on its support with 2^precision points
    ///
    /// Returns `(psi, x)`.
    pub fn wavefun(&self, precision: u32) -> (Vec<f64>, Vec<f64>) {
        let n = 1usize << precision;
        let (lower, upper) = self.support();
        let step = (upper - lower) / (n - 1) as f64;

        let x: Vec<f64> = (0..n).map(|i| lower + i as f64 * step).collect();
        let psi = x.iter().map(|&xi| self.psi(xi)).collect();

        (psi, x)
    }

    /// Cumulative integral of ψ, used by the integrated-wavelet transform
    ///
    /// integral[i] = Σ psi[0..=i] · step
    pub fn integrated(&self, precision: u32) -> IntegratedWavelet {
        let (psi, x) = self.wavefun(precision);
        let step = x[1] - x[0];

        let mut cumsum = 0.0;
        let values = psi
            .iter()
            .map(|&p| {
                cumsum += p;
                cumsum * step
            })
            .collect();

        let (lower, upper) = self.support();
        IntegratedWavelet {
            values,
            lower,
            upper,
            step,
        }
    }

    /// Estimates the normalized central frequency from the FFT peak of ψ
    ///
    /// The peak bin k (ignoring DC) of the sampled wavelet gives
    /// f_c = k / (upper - lower). For the Morlet wavelet at precision 8 this is
    /// 13/16 = 0.8125.
    pub fn central_frequency(&self, precision: u32) -> f64 {
        let (psi, x) = self.wavefun(precision);
        let n = psi.len();
        let domain = x[n - 1] - x[0];

        let mut buffer: Vec<Complex<f64>> = psi.iter().map(|&p| Complex::new(p, 0.0)).collect();
        let mut planner = FftPlanner::<f64>::new();
        planner.plan_fft_forward(n).process(&mut buffer);

        // First maximum wins, matching a forward scan
        let mut peak_bin = 1;
        let mut peak_mag = f64::NEG_INFINITY;
        for (bin, value) in buffer.iter().enumerate().skip(1) {
            let mag = value.norm();
            if mag > peak_mag {
                peak_mag = mag;
                peak_bin = bin;
            }
        }

        // Fold bins from the upper (negative-frequency) half
        if peak_bin + 1 > n / 2 {
            peak_bin = n - peak_bin;
        }

        peak_bin as f64 / domain
    }
}

impl fmt::Display for WaveletFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

impl FromStr for WaveletFamily {
    type Err = CwtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "morl" | "morlet" => Ok(WaveletFamily::Morlet),
            "mexh" | "mexican_hat" | "ricker" => Ok(WaveletFamily::MexicanHat),
            _ => Err(CwtError::UnsupportedWavelet(s.to_string())),
        }
    }
}

/// Tabulated cumulative integral of a mother wavelet
#[derive(Debug, Clone)]
pub struct IntegratedWavelet {
    values: Vec<f64>,
    lower: f64,
    upper: f64,
    step: f64,
}

impl IntegratedWavelet {
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Builds the reversed convolution kernel for one scale
    ///
    /// The table is resampled at `j = floor(k / (scale · step))` for
    /// `k = 0 .. ceil(scale · width + 1)`, dropping indices past the end of the
    /// table. A kernel shorter than two taps cannot be differentiated.
    pub fn kernel(&self, scale: f64) -> Result<Vec<f64>, CwtError> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(CwtError::InvalidScale(scale));
        }

        let width = self.upper - self.lower;
        let taps = (scale * width + 1.0).ceil() as usize;
        let stride = scale * self.step;

        let mut kernel: Vec<f64> = (0..taps)
            .map(|k| (k as f64 / stride) as usize)
            .take_while(|&j| j < self.values.len())
            .map(|j| self.values[j])
            .collect();

        if kernel.len() < 2 {
            return Err(CwtError::ScaleTooSmall(scale));
        }

        kernel.reverse();
        Ok(kernel)
    }
}
