//! Local extrema and prominence weighting
//!
//! Used by the two prominence detection rules: every interior peak or trough
//! is weighted by |value · prominence| and the weights are normalized. The
//! flexural rule derives a noise threshold from sliding-window means of the
//! weights; the extensional rule measures the noise before the strongest
//! extremum and walks back from the first window that saturates.

/// A local maximum or minimum of a sampled signal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extremum {
    /// Sample index
    pub index: usize,
    /// Signal value at `index`
    pub value: f64,
    /// Distance between the neighbouring extrema, in samples; the outer
    /// neighbours sit at index 1 and at the signal length
    pub width: usize,
    /// Smaller height difference to the neighbouring extrema
    pub prominence: f64,
}

/// Sliding-window parameters for the weight threshold
const WINDOW: usize = 25;
const HOP: usize = 20;
const NOISE_MIN: f64 = 1e-6;
/// Consecutive windows above `NOISE_MIN` that settle the threshold
const RUN_LENGTH: usize = 3;
/// A largest weight this many times the runner-up is treated as an outlier
const OUTLIER_RATIO: f64 = 5.0;
/// The extensional noise reference ends at a quarter of the strongest
/// extremum's position, but never before 1/40 of the signal
const REFERENCE_DIVISOR: usize = 4;
const MIN_REFERENCE_DIVISOR: usize = 40;

/// Finds interior peaks and troughs
///
/// Sample `i` is an extremum when the differences on either side do not have
/// the same strict sign, so plateaus are reported too. End points are never
/// extrema but act as outer neighbours for width and prominence.
pub fn find_extrema(signal: &[f64]) -> Vec<Extremum> {
    let n = signal.len();
    if n < 3 {
        return Vec::new();
    }

    let locations: Vec<usize> = (1..n - 1)
        .filter(|&i| (signal[i + 1] - signal[i]) * (signal[i] - signal[i - 1]) <= 0.0)
        .collect();

    locations
        .iter()
        .enumerate()
        .map(|(k, &index)| {
            // Outer neighbours take the first and last sample values
            let (prev, prev_value) = match k.checked_sub(1) {
                Some(j) => (locations[j], signal[locations[j]]),
                None => (1, signal[0]),
            };
            let (next, next_value) = match locations.get(k + 1) {
                Some(&j) => (j, signal[j]),
                None => (n, signal[n - 1]),
            };

            let value = signal[index];
            let left = (value - prev_value).abs();
            let right = (next_value - value).abs();

            Extremum {
                index,
                value,
                width: next - prev,
                prominence: left.min(right),
            }
        })
        .collect()
}

/// Weights each extremum by |value · prominence| and normalizes
///
/// The largest weight normalizes the set unless it is an outlier (more than
/// five times the runner-up), in which case the runner-up is used. Returns
/// `None` when every weight is zero.
pub fn normalized_weights(extrema: &[Extremum]) -> Option<Vec<f64>> {
    let weights: Vec<f64> = extrema.iter().map(|e| (e.value * e.prominence).abs()).collect();

    let mut sorted = weights.clone();
    sorted.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));

    let largest = *sorted.first()?;
    let runner_up = sorted.get(1).copied().unwrap_or(0.0);

    let norm = if runner_up > 0.0 && largest / runner_up > OUTLIER_RATIO {
        runner_up
    } else {
        largest
    };

    if !(norm.is_finite() && norm > 0.0) {
        return None;
    }

    Some(weights.iter().map(|w| w / norm).collect())
}

/// Noise threshold from sliding-window means of the weights
///
/// Windows of 25 values advance by 20. The first window of a run of three
/// consecutive windows whose mean exceeds 1e-6 sets the threshold; if the
/// values run out first, the mean of the last window (or the first window of
/// the run in progress) is used.
pub fn sliding_mean_threshold(values: &[f64]) -> f64 {
    let mut start = 0;
    let mut run_len = 0;
    let mut run_first = 0.0;

    loop {
        let end = (start + WINDOW).min(values.len());
        let mean = mean(&values[start.min(end)..end]);

        if mean > NOISE_MIN {
            run_len += 1;
            if run_len == 1 {
                run_first = mean;
            }
        } else {
            run_len = 0;
        }

        let current = if run_len > 1 { run_first } else { mean };

        start += HOP;
        if start + WINDOW > values.len() || run_len >= RUN_LENGTH {
            return current;
        }
    }
}

/// Location of the first extremum whose normalized weight beats the sliding
/// threshold, ignoring extrema before `skip`
pub fn first_significant_extremum(signal: &[f64], skip: usize) -> Option<usize> {
    let extrema = find_extrema(signal);
    let weights = normalized_weights(&extrema)?;
    let threshold = sliding_mean_threshold(&weights);

    log::trace!(
        "prominence rule: {} extrema, weight threshold {:.3e}",
        extrema.len(),
        threshold
    );

    extrema
        .iter()
        .zip(weights.iter())
        .find(|&(e, &w)| e.index >= skip && w > threshold)
        .map(|(e, _)| e.index)
}

/// Onset of the extensional mode from its prominence weights
///
/// The extrema before a quarter of the strongest one's position (at least
/// 1/40 of the signal) set a noise level, the mean of their weights but no
/// less than `noise_min`, and a saturation level, `noise_mult` times the
/// noise level or the largest reference weight. Windows of half the
/// reference count are scanned for the first mean above saturation. The
/// onset is the extremum right after the last sub-noise weight that
/// precedes the first saturated weight, searching from the last quiet
/// window. When no window saturates, the onset is the first weight above
/// noise past the last quiet window.
pub fn extensional_onset(signal: &[f64], noise_mult: f64, noise_min: f64) -> Option<usize> {
    let extrema = find_extrema(signal);
    let weights = normalized_weights(&extrema)?;

    // x / x is exactly one, so this finds the normalizing extremum
    let strongest = weights.iter().position(|&w| w == 1.0)?;
    let limit = (extrema[strongest].index / REFERENCE_DIVISOR)
        .max(signal.len() / MIN_REFERENCE_DIVISOR);
    let reference_end = extrema.iter().rposition(|e| e.index <= limit)?;

    let reference = weights.get(1..reference_end).unwrap_or(&[]);
    let noise = mean(reference).max(noise_min);
    let saturation = reference
        .iter()
        .fold(noise_mult * noise, |acc, &w| acc.max(w));

    // (first weight, mean) of each scanned window
    let half = (reference_end / 2).max(1);
    let mut windows = Vec::new();
    let mut start = 0;
    let mut end = half;
    loop {
        let window_mean = mean(&weights[start..end]);
        windows.push((start, window_mean));
        if window_mean > saturation {
            break;
        }
        start = end + 1;
        end = start + half;
        if end > weights.len() {
            break;
        }
    }

    let saturated = windows.last().is_some_and(|&(_, m)| m > saturation);
    let last_quiet = windows.iter().rposition(|&(_, m)| m < noise).unwrap_or(0);

    log::trace!(
        "extensional rule: {} extrema, noise {:.3e}, saturation {:.3e}, {} windows{}",
        extrema.len(),
        noise,
        saturation,
        windows.len(),
        if saturated { ", saturated" } else { "" }
    );

    let position = if saturated {
        let from = windows[last_quiet].0;
        let first_saturated = (from..weights.len()).find(|&p| weights[p] > saturation)?;
        match (from..=first_saturated).rev().find(|&p| weights[p] <= noise) {
            Some(p) => (p + 1).min(first_saturated),
            None => from,
        }
    } else {
        let row = last_quiet.max(1).min(windows.len() - 1);
        let cut = windows[row].0;
        (cut + 1..weights.len()).find(|&p| weights[p] > noise)?
    };

    Some(extrema[position].index)
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
