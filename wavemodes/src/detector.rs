//! Arrival detection on a synthesized mode signal
//!
//! Baseline rule: a noise statistic is measured over a leading window that
//! is assumed to precede any arrival, the threshold is a multiple of it, and
//! the first later sample whose magnitude strictly exceeds the threshold is
//! the arrival. Resolution is one sample; there is no interpolation. An
//! optional peak fraction keeps the threshold above a share of the largest
//! magnitude past the window, which matters for heavy-tailed band products.
//!
//! Prominence rule: the first local extremum after the leading window whose
//! prominence-weighted height beats a sliding-mean noise threshold.
//!
//! Extensional prominence rule: the extremum that starts the first
//! saturated run of weights, measured against the noise before the strongest
//! extremum. It picks its own noise reference, so the leading window only
//! bounds the signal length.

use crate::error::{ensure_positive, ModeError, Result};
use crate::peaks::{extensional_onset, first_significant_extremum};
use crate::synthesis::{SynthesizedSignal, WaveMode};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Noise statistic computed over the leading window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum BaselineStatistic {
    /// Population standard deviation of the window
    #[default]
    StandardDeviation,
    /// Root mean square of the window
    Rms,
    /// Largest magnitude in the window
    Peak,
}

impl BaselineStatistic {
    pub fn compute(&self, window: &[f64]) -> f64 {
        if window.is_empty() {
            return 0.0;
        }
        let n = window.len() as f64;

        match self {
            BaselineStatistic::StandardDeviation => {
                let mean = window.iter().sum::<f64>() / n;
                let variance = window.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
                variance.sqrt()
            }
            BaselineStatistic::Rms => (window.iter().map(|x| x * x).sum::<f64>() / n).sqrt(),
            BaselineStatistic::Peak => window.iter().fold(0.0f64, |acc, x| acc.max(x.abs())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DetectionRule {
    #[default]
    BaselineThreshold,
    /// Sliding-mean prominence rule, suited to the flexural product
    Prominence,
    /// Noise-reference prominence rule, suited to the extensional row
    ExtensionalProminence,
}

/// Lower bound for the noise level of the extensional prominence rule
const EXTENSIONAL_NOISE_MIN: f64 = 1e-6;

/// Why an arrival could not be located
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    /// The leading window leaves no samples to scan
    WindowCoversSignal { window: usize, len: usize },
    /// No sample after the window exceeded the threshold
    BelowThreshold { threshold: f64 },
    /// No extremum stood out from the noise
    NoSignificantExtremum,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::WindowCoversSignal { window, len } => write!(
                f,
                "leading window of {} samples leaves nothing to scan in {} samples",
                window, len
            ),
            FailureReason::BelowThreshold { threshold } => {
                write!(f, "signal never exceeds threshold {:.3e}", threshold)
            }
            FailureReason::NoSignificantExtremum => f.write_str("no significant extremum found"),
        }
    }
}

/// An arrival that could not be located; not fatal to the run
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DetectionFailure {
    pub mode: Option<WaveMode>,
    pub reason: FailureReason,
}

impl DetectionFailure {
    pub fn new(reason: FailureReason) -> Self {
        Self { mode: None, reason }
    }

    pub fn for_mode(mut self, mode: WaveMode) -> Self {
        self.mode = Some(mode);
        self
    }
}

impl fmt::Display for DetectionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            Some(mode) => write!(f, "{} arrival not detected: {}", mode, self.reason),
            None => write!(f, "arrival not detected: {}", self.reason),
        }
    }
}

impl std::error::Error for DetectionFailure {}

/// Onset of a wave mode as a sample index
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ArrivalTime {
    pub index: usize,
    pub sample_rate: f64,
}

impl ArrivalTime {
    pub fn seconds(&self) -> f64 {
        self.index as f64 / self.sample_rate
    }

    pub fn micros(&self) -> f64 {
        self.seconds() * 1e6
    }
}

/// Detection configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrivalDetector {
    leading_window: usize,
    multiplier: f64,
    statistic: BaselineStatistic,
    noise_floor: f64,
    peak_fraction: f64,
    rule: DetectionRule,
}

impl ArrivalDetector {
    /// Baseline-threshold detector over `leading_window` quiet samples
    ///
    /// The multiplier must be finite and positive.
    pub fn new(leading_window: usize, multiplier: f64) -> Result<Self> {
        ensure_positive("detectionThresholdMultiplier", multiplier)?;
        Ok(Self {
            leading_window,
            multiplier,
            statistic: BaselineStatistic::default(),
            noise_floor: 0.0,
            peak_fraction: 0.0,
            rule: DetectionRule::default(),
        })
    }

    pub fn with_statistic(mut self, statistic: BaselineStatistic) -> Self {
        self.statistic = statistic;
        self
    }

    /// Absolute lower bound for the threshold, finite and non-negative
    pub fn with_noise_floor(mut self, noise_floor: f64) -> Result<Self> {
        if !(noise_floor.is_finite() && noise_floor >= 0.0) {
            return Err(ModeError::invalid(
                "noiseFloor",
                noise_floor,
                "must be finite and non-negative",
            ));
        }
        self.noise_floor = noise_floor;
        Ok(self)
    }

    /// Lower bound for the threshold as a fraction of the largest magnitude
    /// past the leading window, in `[0, 1)`
    pub fn with_peak_fraction(mut self, peak_fraction: f64) -> Result<Self> {
        if !(0.0..1.0).contains(&peak_fraction) {
            return Err(ModeError::invalid(
                "peakFraction",
                peak_fraction,
                "must lie in [0, 1)",
            ));
        }
        self.peak_fraction = peak_fraction;
        Ok(self)
    }

    pub fn with_rule(mut self, rule: DetectionRule) -> Self {
        self.rule = rule;
        self
    }

    pub fn leading_window(&self) -> usize {
        self.leading_window
    }

    pub fn rule(&self) -> DetectionRule {
        self.rule
    }

    /// Threshold the baseline rule would apply to `signal`
    pub fn threshold(&self, signal: &[f64]) -> f64 {
        let (window, rest) = signal.split_at(self.leading_window.min(signal.len()));
        let baseline = self.statistic.compute(window);
        let peak = rest.iter().fold(0.0f64, |acc, x| acc.max(x.abs()));

        (self.multiplier * baseline)
            .max(self.noise_floor)
            .max(self.peak_fraction * peak)
    }

    /// Index of the first sample past the leading window that marks an arrival
    pub fn detect(&self, signal: &[f64]) -> std::result::Result<usize, DetectionFailure> {
        let len = signal.len();
        if self.leading_window >= len {
            return Err(DetectionFailure::new(FailureReason::WindowCoversSignal {
                window: self.leading_window,
                len,
            }));
        }

        match self.rule {
            DetectionRule::BaselineThreshold => {
                let threshold = self.threshold(signal);

                signal[self.leading_window..]
                    .iter()
                    .position(|x| x.abs() > threshold)
                    .map(|offset| self.leading_window + offset)
                    .ok_or(DetectionFailure::new(FailureReason::BelowThreshold { threshold }))
            }
            DetectionRule::Prominence => first_significant_extremum(signal, self.leading_window)
                .ok_or(DetectionFailure::new(FailureReason::NoSignificantExtremum)),
            DetectionRule::ExtensionalProminence => extensional_onset(
                signal,
                self.multiplier,
                self.noise_floor.max(EXTENSIONAL_NOISE_MIN),
            )
            .ok_or(DetectionFailure::new(FailureReason::NoSignificantExtremum)),
        }
    }

    /// Detects the arrival in a synthesized signal, tagging failures with its mode
    pub fn detect_arrival(
        &self,
        signal: &SynthesizedSignal,
        sample_rate: f64,
    ) -> std::result::Result<ArrivalTime, DetectionFailure> {
        match self.detect(signal.samples()) {
            Ok(index) => {
                log::info!(
                    "{} arrival at sample {} ({:.1} us)",
                    signal.mode(),
                    index,
                    index as f64 / sample_rate * 1e6
                );
                Ok(ArrivalTime { index, sample_rate })
            }
            Err(failure) => {
                let failure = failure.for_mode(signal.mode());
                log::warn!("{}", failure);
                Err(failure)
            }
        }
    }
}
