//! prosody command line interface
//!
//! Extracts speaking patterns from audio files.

use clap::{Args, Parser, Subcommand};
use log::{error, info};
use speech_prosody::encoder::write_wav;
use speech_prosody::processor::LogObserver;
use speech_prosody::{
    AnalysisConfig, PatternExtractor, Preprocessor, ProsodyError, ProsodyResult,
    SynthesisParameters, decoder,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "prosody")]
#[command(about = "Speaking-pattern extraction from speech recordings", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print sample rate, channels and duration of an audio file
    Probe {
        /// Input audio file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Write the cleaned analysis buffer as a WAV file
    Preprocess {
        /// Input audio file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output WAV file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Extract speaking patterns as JSON
    Analyze {
        /// Input audio file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output JSON file (stdout when omitted)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Also emit synthesis parameters
        #[arg(long)]
        synthesis: bool,

        #[command(flatten)]
        config: ConfigArgs,
    },
}

/// Config file plus command-line overrides
#[derive(Args)]
struct ConfigArgs {
    /// TOML analysis config
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Analysis sample rate (Hz)
    #[arg(long)]
    sample_rate: Option<u32>,

    /// Frame size in samples
    #[arg(long)]
    frame_size: Option<usize>,

    /// Hop size in samples
    #[arg(long)]
    hop_size: Option<usize>,

    /// Skip spectral-subtraction denoising
    #[arg(long)]
    no_denoise: bool,

    /// Report null pitch fields instead of failing on unvoiced input
    #[arg(long)]
    allow_missing_pitch: bool,
}

impl ConfigArgs {
    fn resolve(&self) -> ProsodyResult<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::from_toml_file(path)?,
            None => AnalysisConfig::default(),
        };

        if let Some(rate) = self.sample_rate {
            config.sample_rate_hz = rate;
        }
        if let Some(frame) = self.frame_size {
            config.frame_size = frame;
        }
        if let Some(hop) = self.hop_size {
            config.hop_size = hop;
        }
        if self.no_denoise {
            config.denoise = false;
        }
        if self.allow_missing_pitch {
            config.require_pitch = false;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    info!("prosody {}", speech_prosody::VERSION);

    let (input, result) = match &cli.command {
        Commands::Probe { input } => (input, probe(input)),
        Commands::Preprocess {
            input,
            output,
            config,
        } => (input, preprocess(input, output, config)),
        Commands::Analyze {
            input,
            output,
            synthesis,
            config,
        } => (input, analyze(input, output.as_deref(), *synthesis, config)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}: {} stage failed: {}", input.display(), err.stage(), err);
            ExitCode::FAILURE
        }
    }
}

fn probe(input: &Path) -> ProsodyResult<()> {
    let audio = decoder::load(input)?;
    println!("File:        {}", input.display());
    println!("Sample rate: {} Hz", audio.sample_rate());
    println!("Channels:    {}", audio.channels());
    println!("Frames:      {}", audio.samples_per_channel());
    println!("Duration:    {:.3} s", audio.duration().as_secs_f64());
    Ok(())
}

fn preprocess(input: &Path, output: &Path, args: &ConfigArgs) -> ProsodyResult<()> {
    let config = args.resolve()?;
    let audio = decoder::load(input)?;
    let buffer = Preprocessor::from_config(&config)?.process(&audio)?;
    write_wav(output, &buffer)?;
    info!(
        "wrote {} ({:.3} s at {} Hz)",
        output.display(),
        buffer.duration_secs(),
        buffer.sample_rate()
    );
    Ok(())
}

fn analyze(
    input: &Path,
    output: Option<&Path>,
    synthesis: bool,
    args: &ConfigArgs,
) -> ProsodyResult<()> {
    let config = args.resolve()?;
    let audio = decoder::load(input)?;
    let mut extractor = PatternExtractor::new(config)?;
    let patterns = extractor.analyze_observed(&audio, &mut LogObserver)?;

    let json = if synthesis {
        let document = serde_json::json!({
            "patterns": patterns,
            "synthesis": SynthesisParameters::from_patterns(&patterns),
        });
        serde_json::to_string_pretty(&document)
            .map_err(|e| ProsodyError::Encode(e.to_string()))?
    } else {
        patterns.to_json()?
    };

    match output {
        Some(path) => {
            std::fs::write(path, json)
                .map_err(|e| ProsodyError::Encode(format!("{}: {}", path.display(), e)))?;
            info!("wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
