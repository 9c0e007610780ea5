//! End-to-end analysis: scales → coefficients → mode signals → arrivals.
//!
//! Parameter problems abort the run before the transform starts. Detection
//! failures do not: each mode carries its own outcome so one mode can fail
//! while the other still reports an arrival.

use crate::config::AnalysisConfig;
use crate::decompose::{CoefficientSet, WaveletDecomposer};
use crate::detector::{ArrivalDetector, ArrivalTime, DetectionFailure};
use crate::error::{ModeError, Result};
use crate::scales::{scales_from_frequencies, ScaleSet};
use crate::signal::Signal;
use crate::synthesis::{self, SynthesizedSignal, WaveMode};
use cwt_fft::{CwtBackend, WaveletFamily};

/// Synthesized signal of one mode and the outcome of detecting its arrival
#[derive(Debug, Clone, PartialEq)]
pub struct ModeResult {
    pub signal: SynthesizedSignal,
    pub arrival: std::result::Result<ArrivalTime, DetectionFailure>,
}

impl ModeResult {
    pub fn mode(&self) -> WaveMode {
        self.signal.mode()
    }

    pub fn arrival_index(&self) -> Option<usize> {
        self.arrival.as_ref().ok().map(|a| a.index)
    }

    /// The arrival, or the detection failure as a [`ModeError`]
    pub fn require_arrival(&self) -> Result<ArrivalTime> {
        Ok(self.arrival.clone()?)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub sample_rate: f64,
    pub backend: &'static str,
    pub wavelet: WaveletFamily,
    pub scales: ScaleSet,
    pub extensional: ModeResult,
    pub flexural: ModeResult,
}

impl AnalysisReport {
    pub fn mode(&self, mode: WaveMode) -> &ModeResult {
        match mode {
            WaveMode::Extensional => &self.extensional,
            WaveMode::Flexural => &self.flexural,
        }
    }

    /// Flexural minus extensional arrival, in seconds, when both were found
    pub fn arrival_delay(&self) -> Option<f64> {
        let ext = self.extensional.arrival.as_ref().ok()?;
        let flex = self.flexural.arrival.as_ref().ok()?;
        Some(flex.seconds() - ext.seconds())
    }
}

/// Configured analysis over a chosen transform backend
pub struct ModeAnalyzer<B: CwtBackend> {
    config: AnalysisConfig,
    scales: ScaleSet,
    decomposer: WaveletDecomposer<B>,
    extensional_detector: ArrivalDetector,
    flexural_detector: ArrivalDetector,
}

impl ModeAnalyzer<Box<dyn CwtBackend>> {
    /// Analyzer using the backend and wavelet precision named in the
    /// configuration
    pub fn from_config(config: AnalysisConfig) -> Result<Self> {
        let backend = config.backend.build(config.wavelet_precision);
        Self::with_backend(config, backend)
    }
}

impl<B: CwtBackend> ModeAnalyzer<B> {
    /// Validates the configuration and precomputes the scale set
    pub fn with_backend(config: AnalysisConfig, backend: B) -> Result<Self> {
        config.validate()?;

        let family = config.wavelet()?;
        let scales = scales_from_frequencies(
            &config.target_frequencies,
            config.center_frequency()?,
            config.sample_rate,
        )?;
        let extensional_detector = config.detector(WaveMode::Extensional)?;
        let flexural_detector = config.detector(WaveMode::Flexural)?;

        log::debug!(
            "analyzer ready: {} wavelet, {} backend, {} scales",
            family,
            backend.name(),
            scales.len()
        );

        Ok(Self {
            config,
            scales,
            decomposer: WaveletDecomposer::new(backend, family),
            extensional_detector,
            flexural_detector,
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn scales(&self) -> &ScaleSet {
        &self.scales
    }

    /// Wavelet coefficients of `signal` at every configured scale
    pub fn decompose(&self, signal: &Signal) -> Result<CoefficientSet> {
        self.check_signal(signal)?;
        self.decomposer.decompose(signal, &self.scales)
    }

    /// Re-runs synthesis and detection on existing coefficients
    pub fn synthesize_and_detect(
        &self,
        coefs: &CoefficientSet,
        sample_rate: f64,
    ) -> Result<(ModeResult, ModeResult)> {
        let ext_signal = synthesis::extensional(coefs, self.config.extensional_scale_index)?;
        let flex_signal = synthesis::flexural(coefs, self.config.flexural_range())?;

        let extensional = ModeResult {
            arrival: self.extensional_detector.detect_arrival(&ext_signal, sample_rate),
            signal: ext_signal,
        };
        let flexural = ModeResult {
            arrival: self.flexural_detector.detect_arrival(&flex_signal, sample_rate),
            signal: flex_signal,
        };

        Ok((extensional, flexural))
    }

    /// Full analysis of one recording
    pub fn analyze(&self, signal: &Signal) -> Result<AnalysisReport> {
        let coefs = self.decompose(signal)?;
        let (extensional, flexural) = self.synthesize_and_detect(&coefs, signal.sample_rate())?;

        Ok(AnalysisReport {
            sample_rate: signal.sample_rate(),
            backend: self.decomposer.backend().name(),
            wavelet: self.decomposer.family(),
            scales: self.scales.clone(),
            extensional,
            flexural,
        })
    }

    fn check_signal(&self, signal: &Signal) -> Result<()> {
        if signal.sample_rate() != self.config.sample_rate {
            return Err(ModeError::invalid(
                "sampleRate",
                signal.sample_rate(),
                format!(
                    "signal rate differs from the configured {} Hz the scales were built for",
                    self.config.sample_rate
                ),
            ));
        }
        self.config.validate_for_signal(signal.len())
    }
}

/// One-shot analysis with the configured backend
pub fn analyze(signal: &Signal, config: &AnalysisConfig) -> Result<AnalysisReport> {
    ModeAnalyzer::from_config(config.clone())?.analyze(signal)
}
