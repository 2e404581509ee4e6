use std::fmt;
use std::io;
use thiserror::Error;

/// Result type for prosody analysis operations
pub type ProsodyResult<T> = Result<T, ProsodyError>;

/// Pipeline stage an error originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum Stage {
    /// Configuration loading and validation
    Config,
    /// Container decoding (input adapter)
    Decode,
    /// Channel merge, resample, trim, normalize, denoise
    Preprocess,
    /// Splitting the buffer into analysis frames
    Framing,
    /// Per-frame energy
    Energy,
    /// Per-frame pitch tracking and pitch statistics
    Pitch,
    /// Pause segmentation
    Pause,
    /// Speaking-rate estimation
    Rate,
    /// Assembly of the final result
    Aggregate,
    /// Writing buffers or results out (output adapters)
    Output,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Config => "config",
            Stage::Decode => "decode",
            Stage::Preprocess => "preprocess",
            Stage::Framing => "framing",
            Stage::Energy => "energy",
            Stage::Pitch => "pitch",
            Stage::Pause => "pause",
            Stage::Rate => "rate",
            Stage::Aggregate => "aggregate",
            Stage::Output => "output",
        };
        f.write_str(name)
    }
}

/// Error types for speaking-pattern extraction
#[derive(Error, Debug)]
pub enum ProsodyError {
    /// IO error (file operations, disk access)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Source could not be decoded into samples
    #[error("Load error: {0}")]
    Load(String),

    /// Signal contains no non-zero sample
    #[error("Signal is silent: every sample is zero")]
    EmptySignal,

    /// Signal is shorter than the minimum analysable duration
    #[error("Signal too short: {duration_s:.3}s (minimum {min_s:.3}s)")]
    TooShort {
        /// Duration left after preprocessing
        duration_s: f64,
        /// Configured minimum
        min_s: f64,
    },

    /// No speaking time remains once pauses are removed
    #[error("Degenerate timing: speaking time is {speaking_time_s:.3}s")]
    DegenerateTiming {
        /// Total duration minus pause time
        speaking_time_s: f64,
    },

    /// Pitch tracker found no voiced frame
    #[error("No pitch detected in {frames} frames")]
    NoPitchDetected {
        /// Number of frames analysed
        frames: usize,
    },

    /// Invalid configuration or framing parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Resampling operation failed
    #[error("Resampling error: {0}")]
    Resampling(String),

    /// Encoding failed
    #[error("Encode error: {0}")]
    Encode(String),
}

impl ProsodyError {
    /// Stage this error is reported from, for logging
    pub fn stage(&self) -> Stage {
        match self {
            ProsodyError::Io(_) | ProsodyError::Load(_) => Stage::Decode,
            ProsodyError::EmptySignal
            | ProsodyError::TooShort { .. }
            | ProsodyError::Resampling(_) => Stage::Preprocess,
            ProsodyError::DegenerateTiming { .. } => Stage::Rate,
            ProsodyError::NoPitchDetected { .. } => Stage::Pitch,
            ProsodyError::InvalidParameter(_) => Stage::Config,
            ProsodyError::Encode(_) => Stage::Output,
        }
    }
}

impl From<symphonia::core::errors::Error> for ProsodyError {
    fn from(err: symphonia::core::errors::Error) -> Self {
        ProsodyError::Load(err.to_string())
    }
}

impl From<hound::Error> for ProsodyError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(e) => ProsodyError::Io(e),
            e => ProsodyError::Encode(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_mapping() {
        assert_eq!(ProsodyError::EmptySignal.stage(), Stage::Preprocess);
        assert_eq!(
            ProsodyError::NoPitchDetected { frames: 3 }.stage(),
            Stage::Pitch
        );
        assert_eq!(
            ProsodyError::DegenerateTiming { speaking_time_s: 0.0 }.stage(),
            Stage::Rate
        );
        assert_eq!(ProsodyError::Load("bad".into()).stage(), Stage::Decode);
        assert_eq!(
            ProsodyError::InvalidParameter("hop".into()).stage(),
            Stage::Config
        );
    }

    #[test]
    fn test_display_includes_values() {
        let err = ProsodyError::TooShort {
            duration_s: 0.25,
            min_s: 0.5,
        };
        assert_eq!(err.to_string(), "Signal too short: 0.250s (minimum 0.500s)");
        assert_eq!(Stage::Pitch.to_string(), "pitch");
    }
}
