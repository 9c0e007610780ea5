//! Report rendering: text, JSON and CSV.

use crate::detector::{ArrivalTime, DetectionFailure, FailureReason};
use crate::error::Result;
use crate::pipeline::{AnalysisReport, ModeResult};
use crate::synthesis::WaveMode;
use serde::Serialize;
use std::fmt::Write as _;
use std::io::Write;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ModeView {
    mode: WaveMode,
    arrival_index: Option<usize>,
    arrival_us: Option<f64>,
    failure: Option<FailureReason>,
}

impl ModeView {
    fn new(result: &ModeResult) -> Self {
        let (arrival, failure) = split(&result.arrival);
        Self {
            mode: result.mode(),
            arrival_index: arrival.map(|a| a.index),
            arrival_us: arrival.map(|a| a.micros()),
            failure: failure.map(|f| f.reason),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportView<'a> {
    sample_rate: f64,
    backend: &'a str,
    wavelet: &'a str,
    scales: &'a [f64],
    frequencies: Option<&'a [f64]>,
    modes: [ModeView; 2],
    delay_us: Option<f64>,
}

fn split(
    arrival: &std::result::Result<ArrivalTime, DetectionFailure>,
) -> (Option<ArrivalTime>, Option<DetectionFailure>) {
    match arrival {
        Ok(a) => (Some(*a), None),
        Err(f) => (None, Some(*f)),
    }
}

fn view(report: &AnalysisReport) -> ReportView<'_> {
    ReportView {
        sample_rate: report.sample_rate,
        backend: report.backend,
        wavelet: report.wavelet.identifier(),
        scales: report.scales.as_slice(),
        frequencies: report.scales.frequencies(),
        modes: [ModeView::new(&report.extensional), ModeView::new(&report.flexural)],
        delay_us: report.arrival_delay().map(|d| d * 1e6),
    }
}

/// Human-readable summary
pub fn format_text(report: &AnalysisReport) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{} wavelet, {} backend, {} scales, fs = {} Hz",
        report.wavelet,
        report.backend,
        report.scales.len(),
        report.sample_rate
    );

    for result in [&report.extensional, &report.flexural] {
        match &result.arrival {
            Ok(arrival) => {
                let _ = writeln!(
                    out,
                    "  {:<12} sample {:>7}  {:>10.2} us",
                    result.mode(),
                    arrival.index,
                    arrival.micros()
                );
            }
            Err(failure) => {
                let _ = writeln!(out, "  {:<12} not detected ({})", result.mode(), failure.reason);
            }
        }
    }

    if let Some(delay) = report.arrival_delay() {
        let _ = writeln!(out, "  delay        {:.2} us", delay * 1e6);
    }

    out
}

pub fn format_json(report: &AnalysisReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(&view(report))?)
}

/// One line per mode: `mode,arrival_index,arrival_us,status`
pub fn format_csv(report: &AnalysisReport) -> String {
    let mut out = String::from("mode,arrival_index,arrival_us,status\n");

    for result in [&report.extensional, &report.flexural] {
        match &result.arrival {
            Ok(a) => {
                let _ = writeln!(out, "{},{},{:.4},detected", result.mode(), a.index, a.micros());
            }
            Err(f) => {
                let _ = writeln!(out, "{},,,\"{}\"", result.mode(), f.reason);
            }
        }
    }

    out
}

/// Writes both synthesized signals side by side for plotting
///
/// Columns: `index,time_us,extensional,flexural`.
pub fn write_signals_csv<W: Write>(report: &AnalysisReport, mut writer: W) -> Result<()> {
    writeln!(writer, "index,time_us,{},{}", WaveMode::Extensional, WaveMode::Flexural)?;

    let ext = report.extensional.signal.samples();
    let flex = report.flexural.signal.samples();
    for (i, (e, f)) in ext.iter().zip(flex.iter()).enumerate() {
        let t = i as f64 / report.sample_rate * 1e6;
        writeln!(writer, "{},{:.4},{:e},{:e}", i, t, e, f)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scales::ScaleSet;
    use crate::synthesis::SynthesizedSignal;
    use cwt_fft::WaveletFamily;

    fn report() -> AnalysisReport {
        let sample_rate = 5_000_000.0;
        AnalysisReport {
            sample_rate,
            backend: "fft",
            wavelet: WaveletFamily::Morlet,
            scales: ScaleSet::from_scales(vec![4.0, 2.0]).unwrap(),
            extensional: ModeResult {
                signal: SynthesizedSignal::new(WaveMode::Extensional, vec![0.0, 1.0, 0.5]),
                arrival: Ok(ArrivalTime { index: 1, sample_rate }),
            },
            flexural: ModeResult {
                signal: SynthesizedSignal::new(WaveMode::Flexural, vec![0.0, 0.0, 0.0]),
                arrival: Err(DetectionFailure::new(FailureReason::BelowThreshold { threshold: 0.0 })
                    .for_mode(WaveMode::Flexural)),
            },
        }
    }

    #[test]
    fn test_text_lists_both_modes() {
        let text = format_text(&report());

        assert!(text.contains("morl wavelet, fft backend, 2 scales"));
        assert!(text.contains("extensional"));
        assert!(text.contains("0.20 us"));
        assert!(text.contains("flexural     not detected"));
        assert!(!text.contains("delay"));
    }

    #[test]
    fn test_json_carries_failure_reason() {
        let json = format_json(&report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["modes"][0]["mode"], "extensional");
        assert_eq!(value["modes"][0]["arrivalIndex"], 1);
        assert!(value["modes"][1]["arrivalIndex"].is_null());
        assert_eq!(value["modes"][1]["failure"]["kind"], "below_threshold");
        assert_eq!(value["wavelet"], "morl");
        assert!(value["frequencies"].is_null());
    }

    #[test]
    fn test_report_from_bare_scales_equals_itself() {
        let report = report();
        assert_eq!(report, report.clone());
    }

    #[test]
    fn test_csv_rows() {
        let csv = format_csv(&report());
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "extensional,1,0.2000,detected");
        assert!(lines[2].starts_with("flexural,,,"));
    }

    #[test]
    fn test_signal_dump_columns() {
        let mut buffer = Vec::new();
        write_signals_csv(&report(), &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "index,time_us,extensional,flexural");
        assert_eq!(lines.len(), 4);
        assert!(lines[2].starts_with("1,0.2000,1e0,"));
    }
}
