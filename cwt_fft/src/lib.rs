//! cwt_fft - Continuous wavelet transform primitive
//!
//! Evaluates the integrated-wavelet CWT one scale at a time for real wavelet
//! families (Morlet, Mexican hat). The linear convolution at the heart of the
//! transform is pluggable: `FftConvolution` uses `rustfft`,
//! `DirectConvolution` sums in the time domain. Both implement `CwtBackend`,
//! which is the only thing downstream code depends on.

pub mod backend;
pub mod direct_conv;
pub mod fft_conv;
pub mod wavelet;

pub use backend::{CwtBackend, CwtError};
pub use direct_conv::DirectConvolution;
pub use fft_conv::FftConvolution;
pub use wavelet::{
    IntegratedWavelet, WaveletFamily, CENTRAL_FREQUENCY_PRECISION, DEFAULT_PRECISION,
    PRECISION_RANGE,
};
