//! Analysis configuration.
//!
//! One explicit structure carries every selection and detection parameter;
//! stages receive what they need from it instead of sharing mutable state.
//! Field names follow the camelCase keys of the JSON configuration file.
//! Missing keys fall back to the pencil-lead-break reference setup: a 5 MHz
//! acquisition analysed with a Morlet wavelet at 13 frequencies between
//! 40 kHz and 480 kHz.
//!
//! Detection settings are shared by both modes except for what each mode's
//! `ModeDetection` block overrides.

use crate::detector::{ArrivalDetector, BaselineStatistic, DetectionRule};
use crate::error::{ensure_positive, ModeError, Result};
use crate::synthesis::WaveMode;
use clap::ValueEnum;
use cwt_fft::{
    CwtBackend, DirectConvolution, FftConvolution, WaveletFamily, CENTRAL_FREQUENCY_PRECISION,
    DEFAULT_PRECISION, PRECISION_RANGE,
};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

/// Sampling frequency of the reference acquisition (5 MHz)
pub const DEFAULT_SAMPLE_RATE: f64 = 5_000_000.0;

/// Threshold floor of the flexural product as a fraction of its peak
pub const DEFAULT_FLEXURAL_PEAK_FRACTION: f64 = 0.01;

/// Target frequencies of the reference setup (Hz)
pub const DEFAULT_FREQUENCIES: [f64; 13] = [
    40_000.0,  // 0
    60_000.0,  // 1
    80_000.0,  // 2  flexural band start
    100_000.0, // 3
    120_000.0, // 4
    150_000.0, // 5
    180_000.0, // 6  flexural band end
    220_000.0, // 7
    270_000.0, // 8
    310_000.0, // 9  extensional component
    360_000.0, // 10
    420_000.0, // 11
    480_000.0, // 12
];

/// Convolution backend used for the wavelet transform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Fft,
    Direct,
}

impl BackendKind {
    /// Backend sampling its wavelet tables with 2^precision points
    pub fn build(&self, precision: u32) -> Box<dyn CwtBackend> {
        match self {
            BackendKind::Fft => Box::new(FftConvolution::new().with_precision(precision)),
            BackendKind::Direct => Box::new(DirectConvolution::new().with_precision(precision)),
        }
    }
}

/// Detection settings of one mode
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ModeDetection {
    /// Overrides `detectionRule` for this mode
    pub rule: Option<DetectionRule>,
    /// Threshold floor as a fraction of the largest magnitude past the
    /// leading window (baseline rule only)
    pub peak_fraction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Samples per second of the input signal
    pub sample_rate: f64,
    /// Mother wavelet identifier (`morl`, `mexh`)
    pub wavelet_family: String,
    /// Normalized center frequency of the wavelet; `null` estimates it from
    /// the sampled wavelet
    pub wavelet_center_frequency: Option<f64>,
    /// Wavelet tables hold 2^waveletPrecision samples
    pub wavelet_precision: u32,
    /// Frequencies (Hz) to decompose at, in scale-index order
    pub target_frequencies: Vec<f64>,
    /// Scale index whose coefficients stand in for the extensional mode
    pub extensional_scale_index: usize,
    /// Inclusive `[start, end]` scale-index band multiplied for the flexural mode
    pub flexural_scale_index_range: [usize; 2],
    /// Leading samples assumed to contain only noise
    pub leading_window_samples: usize,
    /// Threshold = multiplier × baseline
    pub detection_threshold_multiplier: f64,
    pub baseline_statistic: BaselineStatistic,
    /// Rule used by every mode without its own
    pub detection_rule: DetectionRule,
    /// Absolute lower bound for the detection threshold
    pub noise_floor: f64,
    pub extensional_detection: ModeDetection,
    pub flexural_detection: ModeDetection,
    pub backend: BackendKind,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            wavelet_family: "morl".to_string(),
            wavelet_center_frequency: Some(5.0 / (2.0 * PI)),
            wavelet_precision: DEFAULT_PRECISION,
            target_frequencies: DEFAULT_FREQUENCIES.to_vec(),
            extensional_scale_index: 9,
            flexural_scale_index_range: [2, 6],
            leading_window_samples: 100,
            detection_threshold_multiplier: 10.0,
            baseline_statistic: BaselineStatistic::default(),
            detection_rule: DetectionRule::default(),
            noise_floor: 0.0,
            extensional_detection: ModeDetection::default(),
            flexural_detection: ModeDetection {
                rule: None,
                peak_fraction: DEFAULT_FLEXURAL_PEAK_FRACTION,
            },
            backend: BackendKind::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Inclusive flexural scale-index band
    pub fn flexural_range(&self) -> RangeInclusive<usize> {
        self.flexural_scale_index_range[0]..=self.flexural_scale_index_range[1]
    }

    pub fn wavelet(&self) -> Result<WaveletFamily> {
        Ok(self.wavelet_family.parse()?)
    }

    /// Configured center frequency, or the one estimated from the wavelet
    pub fn center_frequency(&self) -> Result<f64> {
        match self.wavelet_center_frequency {
            Some(fc) => Ok(fc),
            None => {
                let fc = self.wavelet()?.central_frequency(CENTRAL_FREQUENCY_PRECISION);
                log::debug!("estimated {} center frequency {}", self.wavelet_family, fc);
                Ok(fc)
            }
        }
    }

    pub fn mode_detection(&self, mode: WaveMode) -> &ModeDetection {
        match mode {
            WaveMode::Extensional => &self.extensional_detection,
            WaveMode::Flexural => &self.flexural_detection,
        }
    }

    /// Checks everything that does not depend on the signal itself
    pub fn validate(&self) -> Result<()> {
        ensure_positive("sampleRate", self.sample_rate)?;
        if let Some(fc) = self.wavelet_center_frequency {
            ensure_positive("waveletCenterFrequency", fc)?;
        }
        if !PRECISION_RANGE.contains(&self.wavelet_precision) {
            return Err(ModeError::invalid(
                "waveletPrecision",
                self.wavelet_precision,
                format!(
                    "must lie in {}..={}",
                    PRECISION_RANGE.start(),
                    PRECISION_RANGE.end()
                ),
            ));
        }

        if self.target_frequencies.is_empty() {
            return Err(ModeError::invalid(
                "targetFrequencies",
                "[]",
                "at least one frequency is required",
            ));
        }
        for &f in &self.target_frequencies {
            ensure_positive("targetFrequencies", f)?;
        }

        let num_scales = self.target_frequencies.len();
        if self.extensional_scale_index >= num_scales {
            return Err(ModeError::invalid(
                "extensionalScaleIndex",
                self.extensional_scale_index,
                format!("must be below the number of scales ({})", num_scales),
            ));
        }

        let [start, end] = self.flexural_scale_index_range;
        if start > end {
            return Err(ModeError::invalid(
                "flexuralScaleIndexRange",
                format!("[{}, {}]", start, end),
                "range is empty",
            ));
        }
        if end >= num_scales {
            return Err(ModeError::invalid(
                "flexuralScaleIndexRange",
                format!("[{}, {}]", start, end),
                format!("must be below the number of scales ({})", num_scales),
            ));
        }

        if self.leading_window_samples == 0 {
            return Err(ModeError::invalid(
                "leadingWindowSamples",
                0,
                "a baseline needs at least one sample",
            ));
        }

        for mode in [WaveMode::Extensional, WaveMode::Flexural] {
            self.detector(mode)?;
        }

        Ok(())
    }

    /// Checks the parameters that depend on the signal length
    ///
    /// A window equal to the length is accepted here and reported by the
    /// detector as a failure for each mode.
    pub fn validate_for_signal(&self, len: usize) -> Result<()> {
        if self.leading_window_samples > len {
            return Err(ModeError::invalid(
                "leadingWindowSamples",
                self.leading_window_samples,
                format!("longer than the signal ({} samples)", len),
            ));
        }
        Ok(())
    }

    /// Detector for one mode: shared settings plus that mode's overrides
    pub fn detector(&self, mode: WaveMode) -> Result<ArrivalDetector> {
        let overrides = self.mode_detection(mode);

        let detector =
            ArrivalDetector::new(self.leading_window_samples, self.detection_threshold_multiplier)?
                .with_statistic(self.baseline_statistic)
                .with_rule(overrides.rule.unwrap_or(self.detection_rule))
                .with_noise_floor(self.noise_floor)?
                .with_peak_fraction(overrides.peak_fraction)?;
        Ok(detector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = AnalysisConfig::default();
        config.validate().unwrap();

        assert_eq!(config.target_frequencies[config.extensional_scale_index], 310_000.0);
        assert_eq!(config.flexural_range(), 2..=6);
        assert!((config.center_frequency().unwrap() - 0.795_774_715).abs() < 1e-9);
    }

    #[test]
    fn test_null_center_frequency_is_estimated() {
        let config =
            AnalysisConfig::from_json_str(r#"{ "waveletCenterFrequency": null }"#).unwrap();
        config.validate().unwrap();

        assert_eq!(config.wavelet_center_frequency, None);
        assert!((config.center_frequency().unwrap() - 0.8125).abs() < 1e-12);
    }

    #[test]
    fn test_wavelet_precision_bounds() {
        let config = AnalysisConfig {
            wavelet_precision: 1,
            ..AnalysisConfig::default()
        };
        assert_eq!(config.validate().unwrap_err().parameter(), Some("waveletPrecision"));

        let config = AnalysisConfig {
            wavelet_precision: 12,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_per_mode_detection_overrides() {
        let config = AnalysisConfig::from_json_str(
            r#"{
                "detectionRule": "prominence",
                "extensionalDetection": { "rule": "extensional_prominence" }
            }"#,
        )
        .unwrap();

        let ext = config.detector(WaveMode::Extensional).unwrap();
        let flex = config.detector(WaveMode::Flexural).unwrap();
        assert_eq!(ext.rule(), DetectionRule::ExtensionalProminence);
        assert_eq!(flex.rule(), DetectionRule::Prominence);
        assert_eq!(config.flexural_detection.peak_fraction, DEFAULT_FLEXURAL_PEAK_FRACTION);

        let unknown = AnalysisConfig::from_json_str(r#"{ "flexuralDetection": { "rul": null } }"#);
        assert!(matches!(unknown, Err(ModeError::Config(_))));
    }

    #[test]
    fn test_default_flexural_floor_tracks_peak() {
        let config = AnalysisConfig::default();
        let mut signal = vec![0.0; 400];
        signal[200] = 1e-4;
        signal[300] = 1.0;

        let ext = config.detector(WaveMode::Extensional).unwrap();
        let flex = config.detector(WaveMode::Flexural).unwrap();
        assert_eq!(ext.detect(&signal), Ok(200));
        assert_eq!(flex.detect(&signal), Ok(300));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = AnalysisConfig::from_json_str(
            r#"{ "sampleRate": 1000000, "extensionalScaleIndex": 3, "baselineStatistic": "peak" }"#,
        )
        .unwrap();

        assert_eq!(config.sample_rate, 1_000_000.0);
        assert_eq!(config.extensional_scale_index, 3);
        assert_eq!(config.baseline_statistic, BaselineStatistic::Peak);
        assert_eq!(config.wavelet_family, "morl");
        assert_eq!(config.backend, BackendKind::Fft);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = AnalysisConfig::from_json_str(r#"{ "sampleRat": 1 }"#).unwrap_err();
        assert!(matches!(err, ModeError::Config(_)));
    }

    #[test]
    fn test_json_round_trip_keys() {
        let json = AnalysisConfig::default().to_json_pretty().unwrap();
        assert!(json.contains("\"flexuralScaleIndexRange\""));
        assert!(json.contains("\"detectionThresholdMultiplier\""));
        assert_eq!(AnalysisConfig::from_json_str(&json).unwrap(), AnalysisConfig::default());
    }

    #[test]
    fn test_out_of_range_extensional_index() {
        let config = AnalysisConfig {
            extensional_scale_index: 13,
            ..AnalysisConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.parameter(), Some("extensionalScaleIndex"));
    }

    #[test]
    fn test_flexural_range_checks() {
        let empty = AnalysisConfig {
            flexural_scale_index_range: [5, 4],
            ..AnalysisConfig::default()
        };
        assert_eq!(empty.validate().unwrap_err().parameter(), Some("flexuralScaleIndexRange"));

        let too_far = AnalysisConfig {
            flexural_scale_index_range: [10, 13],
            ..AnalysisConfig::default()
        };
        assert_eq!(too_far.validate().unwrap_err().parameter(), Some("flexuralScaleIndexRange"));
    }

    #[test]
    fn test_leading_window_checks() {
        let zero = AnalysisConfig {
            leading_window_samples: 0,
            ..AnalysisConfig::default()
        };
        assert!(zero.validate().is_err());

        let config = AnalysisConfig::default();
        assert!(config.validate_for_signal(100).is_ok());
        assert!(config.validate_for_signal(99).is_err());
    }

    #[test]
    fn test_rejects_non_positive_rates() {
        let config = AnalysisConfig {
            sample_rate: 0.0,
            ..AnalysisConfig::default()
        };
        assert_eq!(config.validate().unwrap_err().parameter(), Some("sampleRate"));

        let config = AnalysisConfig {
            detection_threshold_multiplier: -3.0,
            ..AnalysisConfig::default()
        };
        assert_eq!(
            config.validate().unwrap_err().parameter(),
            Some("detectionThresholdMultiplier")
        );

        let config = AnalysisConfig {
            flexural_detection: ModeDetection {
                rule: None,
                peak_fraction: 1.5,
            },
            ..AnalysisConfig::default()
        };
        assert_eq!(config.validate().unwrap_err().parameter(), Some("peakFraction"));
    }
}
