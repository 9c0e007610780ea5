//! Frequency → scale mapping for the continuous wavelet transform.
//!
//! scale = f_c · f_s / f_a
//!
//! where f_c is the wavelet's normalized center frequency, f_s the sample
//! rate and f_a the physical frequency of interest.

use crate::error::{ensure_positive, ModeError, Result};
use serde::Serialize;

/// Ordered scales, index-aligned with the frequencies they came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScaleSet {
    scales: Vec<f64>,
    frequencies: Option<Vec<f64>>,
}

impl ScaleSet {
    /// Builds a scale set directly from scale values
    ///
    /// Such a set carries no frequencies since no wavelet center frequency
    /// or sample rate is known.
    pub fn from_scales(scales: Vec<f64>) -> Result<Self> {
        let set = Self {
            scales,
            frequencies: None,
        };
        set.validate()?;
        Ok(set)
    }

    /// Checks the set is non-empty and every scale is positive
    pub fn validate(&self) -> Result<()> {
        if self.scales.is_empty() {
            return Err(ModeError::invalid("scales", "[]", "at least one scale is required"));
        }
        for &scale in &self.scales {
            ensure_positive("scales", scale)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.scales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scales.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.scales.get(index).copied()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.scales
    }

    /// Physical frequency (Hz) each scale was derived from, if known
    pub fn frequencies(&self) -> Option<&[f64]> {
        self.frequencies.as_deref()
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.scales.iter().copied()
    }
}

/// Maps target frequencies to CWT scales, preserving order
pub fn scales_from_frequencies(
    frequencies: &[f64],
    center_frequency: f64,
    sample_rate: f64,
) -> Result<ScaleSet> {
    ensure_positive("waveletCenterFrequency", center_frequency)?;
    ensure_positive("sampleRate", sample_rate)?;

    if frequencies.is_empty() {
        return Err(ModeError::invalid(
            "targetFrequencies",
            "[]",
            "at least one frequency is required",
        ));
    }

    let mut scales = Vec::with_capacity(frequencies.len());
    for &fa in frequencies {
        ensure_positive("targetFrequencies", fa)?;
        scales.push(center_frequency * sample_rate / fa);
    }

    log::debug!(
        "mapped {} frequencies to scales {:.3?}",
        frequencies.len(),
        scales
    );

    Ok(ScaleSet {
        scales,
        frequencies: Some(frequencies.to_vec()),
    })
}

/// Inverse mapping: the frequency (Hz) a scale emphasizes
pub fn scale_to_frequency(scale: f64, center_frequency: f64, sample_rate: f64) -> f64 {
    center_frequency * sample_rate / scale
}
