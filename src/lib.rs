#![warn(missing_docs)]

//! # speech-prosody: Speaking-Pattern Extraction
//!
//! Turns a recording of one speaker into a compact description of how they
//! speak: speaking rate, pauses, and frame-wise energy and pitch contours.
//!
//! ## Pipeline
//!
//! - **Decode** - any container Symphonia reads, to interleaved `f32`
//! - **Preprocess** - downmix, resample, trim, peak-normalize, denoise
//! - **Analyze** - energy, pitch (probabilistic YIN), pauses, speaking rate
//! - **Output** - [`SpeakingPatterns`] as JSON, optional synthesis controls
//!
//! ## Quick Start
//!
//! ```ignore
//! use speech_prosody::{AnalysisConfig, PatternExtractor};
//!
//! let decoded = speech_prosody::decoder::load("speech.wav")?;
//! let mut extractor = PatternExtractor::new(AnalysisConfig::default())?;
//! let patterns = extractor.analyze(&decoded)?;
//! println!("{:.0} WPM, {} pauses", patterns.speaking_rate_wpm, patterns.pauses.len());
//! ```

/// Core audio types and structures
pub mod core;
/// Error types for extraction stages
pub mod error;
/// Analysis configuration
pub mod config;
/// Audio decoder implementations
pub mod decoder;
/// Audio filter implementations
pub mod filter;
/// Feature extraction stages
pub mod analysis;
/// Audio encoder implementations
pub mod encoder;
/// Preprocessing and extraction pipelines
pub mod processor;
/// Synthesis-parameter mapping
pub mod synthesis;

// Export public types
pub use analysis::{EnergyContour, PauseInterval, PauseList, PitchContour, PitchFrame, SpeakingPatterns};
pub use config::{AnalysisConfig, PitchRange};
pub use core::{AudioBuffer, DecodedAudio, FrameSequence};
pub use error::{ProsodyError, ProsodyResult, Stage};
pub use processor::{PatternExtractor, Preprocessor};
pub use synthesis::SynthesisParameters;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
