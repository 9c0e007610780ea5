//! Uniformly sampled real signal.

use crate::error::{ensure_positive, ModeError, Result};

/// Recorded waveform: samples plus the rate they were taken at
///
/// Immutable after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    samples: Vec<f64>,
    sample_rate: f64,
}

impl Signal {
    /// Wraps samples taken at `sample_rate` Hz
    ///
    /// Rejects an empty sequence, non-finite samples and a non-positive rate.
    pub fn new(samples: Vec<f64>, sample_rate: f64) -> Result<Self> {
        ensure_positive("sampleRate", sample_rate)?;

        if samples.is_empty() {
            return Err(ModeError::invalid("signal", "[]", "must contain at least one sample"));
        }
        if let Some(index) = samples.iter().position(|s| !s.is_finite()) {
            return Err(ModeError::invalid(
                "signal",
                samples[index],
                format!("sample {} is not finite", index),
            ));
        }

        Ok(Self {
            samples,
            sample_rate,
        })
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration covered by the samples, in seconds
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate
    }

    /// Time of sample `index` in microseconds from the first sample
    pub fn time_us(&self, index: usize) -> f64 {
        index as f64 / self.sample_rate * 1e6
    }
}
