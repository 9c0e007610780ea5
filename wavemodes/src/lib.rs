//! wavemodes - Wave-mode arrival identification for acoustic emission
//!
//! Separates the extensional and flexural plate modes of a recorded
//! acoustic-emission waveform and reports when each one arrives.
//! A continuous wavelet transform spreads the signal over a set of scales;
//! one scale row stands in for the extensional mode, the product of a band
//! of rows for the flexural mode, and a per-mode detector finds the onset in
//! each.
//!
//! The transform itself lives in `cwt_fft` behind the `CwtBackend` trait.

pub mod config;
pub mod decompose;
pub mod detector;
pub mod error;
pub mod peaks;
pub mod pipeline;
pub mod report;
pub mod scales;
pub mod signal;
pub mod signal_io;
pub mod synthesis;
pub mod synthetic;
pub mod test_utils;

pub use config::{
    AnalysisConfig, BackendKind, ModeDetection, DEFAULT_FLEXURAL_PEAK_FRACTION,
    DEFAULT_FREQUENCIES, DEFAULT_SAMPLE_RATE,
};
pub use decompose::{CoefficientSet, WaveletDecomposer};
pub use detector::{ArrivalDetector, ArrivalTime, BaselineStatistic, DetectionFailure, DetectionRule, FailureReason};
pub use error::{ModeError, Result};
pub use pipeline::{analyze, AnalysisReport, ModeAnalyzer, ModeResult};
pub use report::{format_csv, format_json, format_text, write_signals_csv};
pub use scales::{scale_to_frequency, scales_from_frequencies, ScaleSet};
pub use signal::Signal;
pub use signal_io::{
    is_wav_path, load_signal, parse_text, read_text, read_wav, save_signal, write_text, write_wav,
};
pub use synthesis::{extensional, flexural, product_of_rows, SynthesizedSignal, WaveMode};
pub use synthetic::{SyntheticAe, SyntheticBurst};
pub use test_utils::{assert_slices_approx_eq, max_abs_diff, PassthroughBackend};

pub use cwt_fft::{CwtBackend, CwtError, DirectConvolution, FftConvolution, WaveletFamily};
