use crate::error::{ProsodyError, ProsodyResult};
use std::time::Duration;

/// Decoded source as handed over by a decoder: interleaved samples plus layout
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Interleaved samples (f32 from -1.0 to 1.0)
    samples: Vec<f32>,
    /// Sample rate in Hz
    sample_rate: u32,
    /// Number of interleaved channels
    channels: u16,
}

impl DecodedAudio {
    /// Create a decoded source
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> ProsodyResult<Self> {
        if sample_rate == 0 {
            return Err(ProsodyError::InvalidParameter(
                "sample rate must be > 0".to_string(),
            ));
        }
        if channels == 0 {
            return Err(ProsodyError::InvalidParameter(
                "channel count must be > 0".to_string(),
            ));
        }
        if samples.len() % channels as usize != 0 {
            return Err(ProsodyError::InvalidParameter(format!(
                "{} samples not divisible by {} channels",
                samples.len(),
                channels
            )));
        }

        Ok(DecodedAudio {
            samples,
            sample_rate,
            channels,
        })
    }

    /// Interleaved samples
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Channel count
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Samples per channel
    pub fn samples_per_channel(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    /// Duration of the source
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.samples_per_channel() as f64 / self.sample_rate as f64)
    }
}

/// Mono analysis buffer
///
/// Non-empty with a positive sample rate. There is no mutable access: filters
/// produce new buffers instead of editing one in place.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioBuffer {
    /// Create a mono buffer
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> ProsodyResult<Self> {
        if sample_rate == 0 {
            return Err(ProsodyError::InvalidParameter(
                "sample rate must be > 0".to_string(),
            ));
        }
        if samples.is_empty() {
            return Err(ProsodyError::InvalidParameter(
                "audio buffer must not be empty".to_string(),
            ));
        }

        Ok(AudioBuffer {
            samples,
            sample_rate,
        })
    }

    /// Get reference to the samples
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Get owned samples (consumes buffer)
    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    /// Get sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when there are no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Largest absolute sample value
    pub fn peak(&self) -> f32 {
        self.samples
            .iter()
            .map(|&s| s.abs())
            .fold(0.0f32, |a, b| a.max(b))
    }

    /// True when no sample is non-zero
    pub fn is_silent(&self) -> bool {
        self.samples.iter().all(|&s| s == 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoded_audio_creation() {
        let decoded = DecodedAudio::new(vec![0.1, 0.2, 0.3, 0.4], 44100, 2).unwrap();

        assert_eq!(decoded.sample_rate(), 44100);
        assert_eq!(decoded.channels(), 2);
        assert_eq!(decoded.samples_per_channel(), 2);
    }

    #[test]
    fn test_decoded_audio_invalid_samples() {
        // Odd number of samples for stereo should fail
        let result = DecodedAudio::new(vec![0.1, 0.2, 0.3], 44100, 2);
        assert!(result.is_err());
        assert!(DecodedAudio::new(vec![0.1], 44100, 0).is_err());
        assert!(DecodedAudio::new(vec![0.1], 0, 1).is_err());
    }

    #[test]
    fn test_buffer_invariants() {
        assert!(AudioBuffer::new(Vec::new(), 22050).is_err());
        assert!(AudioBuffer::new(vec![0.5], 0).is_err());

        let buffer = AudioBuffer::new(vec![0.0, -0.75, 0.5, 0.0], 4).unwrap();
        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.peak(), 0.75);
        assert_eq!(buffer.duration_secs(), 1.0);
        assert!(!buffer.is_silent());
        assert!(!buffer.is_empty());
    }
}
