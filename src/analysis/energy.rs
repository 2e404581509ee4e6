use crate::core::FrameSequence;
use serde::{Deserialize, Serialize};

/// Added inside the logarithm so digital silence stays finite (-100 dB)
pub const ENERGY_EPSILON: f64 = 1e-10;

/// Per-frame loudness in dB, index-aligned with the frame sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnergyContour(Vec<f64>);

impl EnergyContour {
    /// Wrap precomputed values
    pub fn from_values(values: Vec<f64>) -> Self {
        EnergyContour(values)
    }

    /// dB values in frame order
    pub fn values(&self) -> &[f64] {
        &self.0
    }

    /// Number of frames
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when there are no frames
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Mean dB value, `None` for an empty contour
    pub fn mean_db(&self) -> Option<f64> {
        if self.0.is_empty() {
            None
        } else {
            Some(self.0.iter().sum::<f64>() / self.0.len() as f64)
        }
    }
}

/// `10 * log10(sum(x^2) / N + epsilon)`
pub fn frame_energy_db(frame: &[f32]) -> f64 {
    let sum: f64 = frame.iter().map(|&s| (s as f64) * (s as f64)).sum();
    10.0 * (sum / frame.len().max(1) as f64 + ENERGY_EPSILON).log10()
}

/// Maps every frame to its energy in dB
#[derive(Debug, Clone, Copy, Default)]
pub struct EnergyExtractor;

impl EnergyExtractor {
    /// Create an extractor
    pub fn new() -> Self {
        EnergyExtractor
    }

    /// One dB value per frame
    pub fn extract(&self, frames: &FrameSequence<'_>) -> EnergyContour {
        let mut values = vec![0.0; frames.len()];
        for (slot, frame) in values.iter_mut().zip(frames.iter()) {
            *slot = frame_energy_db(frame);
        }
        EnergyContour(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AudioBuffer;
    use approx::assert_relative_eq;

    #[test]
    fn test_silence_is_finite() {
        assert_relative_eq!(frame_energy_db(&[0.0; 64]), -100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_full_scale_square_wave() {
        // Mean square of +/-1 is 1.0 -> ~0 dB
        let frame: Vec<f32> = (0..64).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        assert_relative_eq!(frame_energy_db(&frame), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_contour_aligned_with_frames() {
        let mut samples = vec![0.5f32; 1000];
        samples.extend(vec![0.0f32; 1000]);
        let buffer = AudioBuffer::new(samples, 8000).unwrap();
        let frames = FrameSequence::new(&buffer, 256, 128).unwrap();

        let contour = EnergyExtractor::new().extract(&frames);
        assert_eq!(contour.len(), frames.len());
        // 0.25 mean square -> -6.02 dB
        assert_relative_eq!(contour.values()[0], 10.0 * 0.25f64.log10(), epsilon = 1e-6);
        assert_relative_eq!(*contour.values().last().unwrap(), -100.0, epsilon = 1e-9);
    }
}
