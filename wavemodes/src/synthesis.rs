//! Mode synthesis from wavelet coefficients.
//!
//! The extensional mode is a single scale row. The flexural mode is the
//! sample-wise product of a contiguous band of rows: a component present in
//! every band survives the product while band-limited noise is suppressed.

use crate::decompose::CoefficientSet;
use crate::error::{ModeError, Result};
use serde::Serialize;
use std::fmt;
use std::ops::RangeInclusive;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WaveMode {
    /// Fast, high-frequency symmetric mode
    Extensional,
    /// Slow, dispersive antisymmetric mode
    Flexural,
}

impl fmt::Display for WaveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaveMode::Extensional => f.pad("extensional"),
            WaveMode::Flexural => f.pad("flexural"),
        }
    }
}

/// A derived time series standing in for one wave mode
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizedSignal {
    mode: WaveMode,
    samples: Vec<f64>,
}

impl SynthesizedSignal {
    pub fn new(mode: WaveMode, samples: Vec<f64>) -> Self {
        Self { mode, samples }
    }

    pub fn mode(&self) -> WaveMode {
        self.mode
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn into_samples(self) -> Vec<f64> {
        self.samples
    }
}

/// Copies row `index` as the extensional-mode signal
pub fn extensional(coefs: &CoefficientSet, index: usize) -> Result<SynthesizedSignal> {
    let row = coefs.row(index).ok_or_else(|| {
        ModeError::invalid(
            "extensionalScaleIndex",
            index,
            format!("must be below the number of scales ({})", coefs.num_scales()),
        )
    })?;

    Ok(SynthesizedSignal::new(WaveMode::Extensional, row.to_vec()))
}

/// Multiplies the rows of an inclusive index band into the flexural-mode signal
pub fn flexural(coefs: &CoefficientSet, band: RangeInclusive<usize>) -> Result<SynthesizedSignal> {
    let (start, end) = (*band.start(), *band.end());
    if start > end {
        return Err(ModeError::invalid(
            "flexuralScaleIndexRange",
            format!("[{}, {}]", start, end),
            "range is empty",
        ));
    }
    if end >= coefs.num_scales() {
        return Err(ModeError::invalid(
            "flexuralScaleIndexRange",
            format!("[{}, {}]", start, end),
            format!("must be below the number of scales ({})", coefs.num_scales()),
        ));
    }

    let indices: Vec<usize> = band.collect();
    let samples = product_of_rows(coefs, &indices)?;

    log::debug!(
        "flexural band [{}, {}]: peak magnitude {:.3e}",
        start,
        end,
        samples.iter().fold(0.0f64, |acc, x| acc.max(x.abs()))
    );

    Ok(SynthesizedSignal::new(WaveMode::Flexural, samples))
}

/// Sample-wise product of the given rows
///
/// Order does not matter up to floating-point rounding. A single index
/// yields that row unchanged.
pub fn product_of_rows(coefs: &CoefficientSet, indices: &[usize]) -> Result<Vec<f64>> {
    if indices.is_empty() {
        return Err(ModeError::invalid("scaleIndices", "[]", "at least one row is required"));
    }

    let mut product = vec![1.0; coefs.len()];
    for &index in indices {
        let row = coefs.row(index).ok_or_else(|| {
            ModeError::invalid(
                "scaleIndices",
                index,
                format!("must be below the number of scales ({})", coefs.num_scales()),
            )
        })?;

        product.iter_mut().zip(row.iter()).for_each(|(p, c)| *p *= c);
    }

    Ok(product)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scales::ScaleSet;
    use ndarray::array;

    fn coefficient_set() -> CoefficientSet {
        let coefs = array![
            [1.0, 2.0, 3.0],
            [2.0, 0.5, -1.0],
            [0.0, 4.0, 2.0],
            [-1.0, 1.0, 1.0],
        ];
        let scales = ScaleSet::from_scales(vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        CoefficientSet::new(coefs, scales).unwrap()
    }

    #[test]
    fn test_extensional_copies_row() {
        let coefs = coefficient_set();
        let mode = extensional(&coefs, 1).unwrap();

        assert_eq!(mode.mode(), WaveMode::Extensional);
        assert_eq!(mode.samples(), &[2.0, 0.5, -1.0]);
    }

    #[test]
    fn test_extensional_index_out_of_range() {
        let err = extensional(&coefficient_set(), 4).unwrap_err();
        assert_eq!(err.parameter(), Some("extensionalScaleIndex"));
    }

    #[test]
    fn test_flexural_multiplies_band() {
        let coefs = coefficient_set();
        let mode = flexural(&coefs, 0..=1).unwrap();

        assert_eq!(mode.mode(), WaveMode::Flexural);
        assert_eq!(mode.samples(), &[2.0, 1.0, -3.0]);
    }

    #[test]
    fn test_single_row_band_is_identity() {
        let coefs = coefficient_set();
        let mode = flexural(&coefs, 3..=3).unwrap();
        assert_eq!(mode.samples(), &[-1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_zero_in_any_row_zeroes_product() {
        let coefs = coefficient_set();
        let mode = flexural(&coefs, 0..=2).unwrap();
        assert_eq!(mode.samples()[0], 0.0);
    }

    #[test]
    #[allow(clippy::reversed_empty_ranges)]
    fn test_flexural_band_checks() {
        let coefs = coefficient_set();

        let err = flexural(&coefs, 2..=1).unwrap_err();
        assert_eq!(err.parameter(), Some("flexuralScaleIndexRange"));

        let err = flexural(&coefs, 2..=4).unwrap_err();
        assert_eq!(err.parameter(), Some("flexuralScaleIndexRange"));
    }

    #[test]
    fn test_product_rejects_empty_and_unknown_rows() {
        let coefs = coefficient_set();
        assert!(product_of_rows(&coefs, &[]).is_err());
        assert!(product_of_rows(&coefs, &[0, 9]).is_err());
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(WaveMode::Extensional.to_string(), "extensional");
        assert_eq!(serde_json::to_string(&WaveMode::Flexural).unwrap(), "\"flexural\"");
    }
}
