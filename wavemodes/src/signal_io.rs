//! Signal loading and saving
//!
//! Text files hold one sample per line with no header. WAV files are read
//! through `hound`; only the first channel is kept and integer PCM is scaled
//! into [-1, 1).

use crate::error::{ModeError, Result};
use crate::signal::Signal;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Bit depth used when writing WAV files
pub const WAV_BITS_PER_SAMPLE: u16 = 16;

/// Parses one numeric sample per line; blank lines are skipped
pub fn parse_text<R: BufRead>(reader: R) -> Result<Vec<f64>> {
    let mut samples = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let value: f64 = trimmed.parse().map_err(|_| ModeError::Parse {
            line: i + 1,
            content: trimmed.to_string(),
        })?;
        samples.push(value);
    }

    Ok(samples)
}

pub fn read_text<P: AsRef<Path>>(path: P) -> Result<Vec<f64>> {
    let file = File::open(path)?;
    parse_text(BufReader::new(file))
}

pub fn write_text<P: AsRef<Path>>(samples: &[f64], path: P) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for s in samples {
        writeln!(writer, "{}", s)?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads the first channel of a WAV file, returning samples and header rate
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<(Vec<f64>, u32)> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let samples: Vec<f64> = match spec.sample_format {
        SampleFormat::Int => {
            let full_scale = (1i64 << (spec.bits_per_sample - 1)) as f64;
            reader
                .samples::<i32>()
                .step_by(channels)
                .map(|s| s.map(|v| v as f64 / full_scale))
                .collect::<std::result::Result<_, _>>()?
        }
        SampleFormat::Float => reader
            .samples::<f32>()
            .step_by(channels)
            .map(|s| s.map(f64::from))
            .collect::<std::result::Result<_, _>>()?,
    };

    log::debug!(
        "read {} samples ({} channel(s), {} Hz, {} bit {:?})",
        samples.len(),
        spec.channels,
        spec.sample_rate,
        spec.bits_per_sample,
        spec.sample_format
    );

    Ok((samples, spec.sample_rate))
}

/// Writes a mono 16-bit WAV, normalizing the peak magnitude to full scale
pub fn write_wav<P: AsRef<Path>>(samples: &[f64], sample_rate: u32, path: P) -> Result<()> {
    let max_amp = samples.iter().map(|x| x.abs()).fold(0.0f64, f64::max);
    let scale = if max_amp > 0.0 { 1.0 / max_amp } else { 1.0 };

    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: WAV_BITS_PER_SAMPLE,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec)?;
    for &sample in samples {
        let pcm = (sample * scale * 32767.0).clamp(-32768.0, 32767.0) as i16;
        writer.write_sample(pcm)?;
    }
    writer.finalize()?;
    Ok(())
}

/// True when the path has a `.wav` extension, in any case
pub fn is_wav_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("wav"))
}

/// Loads a signal from a `.wav` file or a text file
///
/// For WAV input `sample_rate` overrides the header rate. Text files carry no
/// rate, so one must be given.
pub fn load_signal<P: AsRef<Path>>(path: P, sample_rate: Option<f64>) -> Result<Signal> {
    let path = path.as_ref();

    if is_wav_path(path) {
        let (samples, header_rate) = read_wav(path)?;
        Signal::new(samples, sample_rate.unwrap_or(header_rate as f64))
    } else {
        let rate = sample_rate.ok_or_else(|| {
            ModeError::invalid(
                "sampleRate",
                "none",
                format!("text file {} needs an explicit sample rate", path.display()),
            )
        })?;
        Signal::new(read_text(path)?, rate)
    }
}

/// Saves a signal as a peak-normalized WAV file or as text, by extension
///
/// A WAV header stores the rate as a whole number of hertz.
pub fn save_signal<P: AsRef<Path>>(signal: &Signal, path: P) -> Result<()> {
    let path = path.as_ref();
    if !is_wav_path(path) {
        return write_text(signal.samples(), path);
    }

    let rate = signal.sample_rate();
    if rate.fract() != 0.0 || rate > u32::MAX as f64 {
        return Err(ModeError::invalid(
            "sampleRate",
            rate,
            "a WAV header needs a whole number of hertz",
        ));
    }
    write_wav(signal.samples(), rate as u32, path)
}
