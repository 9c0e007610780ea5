use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::info;
use wavemodes::{
    format_csv, format_json, format_text, is_wav_path, load_signal, save_signal,
    scale_to_frequency, scales_from_frequencies, write_signals_csv, AnalysisConfig, BackendKind,
    ModeAnalyzer, SyntheticAe, SyntheticBurst,
};

#[derive(Parser)]
#[command(name = "wavemodes")]
#[command(author, version, about = "Extensional and flexural wave-mode arrival picker", long_about = None)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect mode arrivals in a recorded signal
    Analyze {
        /// Text file (one sample per line) or WAV file
        input: PathBuf,

        /// JSON analysis configuration
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Sample rate in Hz (overrides the configuration and WAV header)
        #[arg(short, long)]
        sample_rate: Option<f64>,

        /// Convolution backend for the wavelet transform
        #[arg(short, long, value_enum)]
        backend: Option<BackendKind>,

        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Write both synthesized mode signals to this CSV file
        #[arg(long)]
        dump_signals: Option<PathBuf>,
    },

    /// Print the frequency → scale table of a configuration
    Scales {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Write a synthetic two-burst test signal
    Synth {
        /// Output file; a `.wav` extension writes 16-bit WAV, anything else text
        output: PathBuf,

        /// Number of samples
        #[arg(short, long, default_value = "5000")]
        length: usize,

        #[arg(short, long, default_value = "5000000")]
        sample_rate: f64,

        /// Onset sample of the extensional burst (default: 20% of the record)
        #[arg(long)]
        extensional_at: Option<usize>,

        /// Onset sample of the flexural burst (default: 40% of the record)
        #[arg(long)]
        flexural_at: Option<usize>,

        /// Standard deviation of the added Gaussian noise
        #[arg(short, long, default_value = "0.001")]
        noise: f64,

        #[arg(long, default_value = "42")]
        seed: u64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Csv,
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    match path {
        Some(path) => AnalysisConfig::from_json_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display())),
        None => Ok(AnalysisConfig::default()),
    }
}

fn cmd_analyze(
    input: &Path,
    config: Option<&Path>,
    sample_rate: Option<f64>,
    backend: Option<BackendKind>,
    format: OutputFormat,
    dump_signals: Option<&Path>,
) -> Result<()> {
    let mut config = load_config(config)?;
    if let Some(backend) = backend {
        config.backend = backend;
    }

    // WAV input falls back to its header rate, text input to the configuration
    let rate = sample_rate.or(if is_wav_path(input) { None } else { Some(config.sample_rate) });

    let signal = load_signal(input, rate)
        .with_context(|| format!("failed to read signal from {}", input.display()))?;
    config.sample_rate = signal.sample_rate();

    info!(
        "loaded {} samples at {} Hz ({:.1} us)",
        signal.len(),
        signal.sample_rate(),
        signal.duration() * 1e6
    );

    let analyzer = ModeAnalyzer::from_config(config).context("invalid analysis configuration")?;
    let report = analyzer.analyze(&signal).context("analysis failed")?;

    match format {
        OutputFormat::Text => print!("{}", format_text(&report)),
        OutputFormat::Json => println!("{}", format_json(&report)?),
        OutputFormat::Csv => print!("{}", format_csv(&report)),
    }

    if let Some(path) = dump_signals {
        let file = File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        write_signals_csv(&report, BufWriter::new(file))?;
        info!("mode signals written to {}", path.display());
    }

    Ok(())
}

fn cmd_scales(config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    config.validate()?;

    let center_frequency = config.center_frequency()?;
    let scales = scales_from_frequencies(
        &config.target_frequencies,
        center_frequency,
        config.sample_rate,
    )?;

    println!("{:>5}  {:>12}  {:>10}  role", "index", "freq (kHz)", "scale");
    for (i, scale) in scales.iter().enumerate() {
        let role = if i == config.extensional_scale_index {
            "extensional"
        } else if config.flexural_range().contains(&i) {
            "flexural"
        } else {
            ""
        };
        let freq = scale_to_frequency(scale, center_frequency, config.sample_rate);
        println!("{:>5}  {:>12.1}  {:>10.3}  {}", i, freq / 1e3, scale, role);
    }

    Ok(())
}

fn cmd_synth(
    output: &Path,
    length: usize,
    sample_rate: f64,
    extensional_at: Option<usize>,
    flexural_at: Option<usize>,
    noise: f64,
    seed: u64,
) -> Result<()> {
    let mut synth = SyntheticAe::pencil_lead_break(length, sample_rate)
        .with_noise(noise)
        .with_seed(seed);

    let onsets = [extensional_at, flexural_at];
    for (burst, onset) in synth.bursts.iter_mut().zip(onsets) {
        if let Some(onset) = onset {
            *burst = SyntheticBurst { onset, ..*burst };
        }
    }

    let signal = synth.generate().context("invalid synthetic signal settings")?;
    save_signal(&signal, output)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!(
        "wrote {} samples to {} (extensional at {}, flexural at {})",
        signal.len(),
        output.display(),
        synth.bursts[0].onset,
        synth.bursts[1].onset
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Analyze {
            input,
            config,
            sample_rate,
            backend,
            format,
            dump_signals,
        } => cmd_analyze(
            &input,
            config.as_deref(),
            sample_rate,
            backend,
            format,
            dump_signals.as_deref(),
        ),

        Commands::Scales { config } => cmd_scales(config.as_deref()),

        Commands::Synth {
            output,
            length,
            sample_rate,
            extensional_at,
            flexural_at,
            noise,
            seed,
        } => {
            if length == 0 {
                bail!("--length must be at least 1");
            }
            cmd_synth(&output, length, sample_rate, extensional_at, flexural_at, noise, seed)
        }
    }
}
