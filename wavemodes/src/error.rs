//! Error taxonomy for the arrival pipeline.
//!
//! `InvalidParameter` and `Computation` abort a run. `DetectionFailure`
//! (see `detector`) is carried per mode inside the report and only becomes a
//! `ModeError` when a caller explicitly asks for it with `?`.

use crate::detector::DetectionFailure;
use cwt_fft::CwtError;
use std::fmt::Display;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModeError {
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("wavelet transform failed: {0}")]
    Computation(#[from] CwtError),

    #[error(transparent)]
    Detection(#[from] DetectionFailure),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: cannot parse `{content}` as a sample")]
    Parse { line: usize, content: String },

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl ModeError {
    pub(crate) fn invalid(name: &'static str, value: impl Display, reason: impl Into<String>) -> Self {
        ModeError::InvalidParameter {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Name of the offending parameter, if this is a parameter error
    pub fn parameter(&self) -> Option<&'static str> {
        match self {
            ModeError::InvalidParameter { name, .. } => Some(name),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ModeError>;

/// Requires a finite, strictly positive value
pub(crate) fn ensure_positive(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ModeError::invalid(name, value, "must be positive and finite"))
    }
}
