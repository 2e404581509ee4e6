use crate::core::AudioBuffer;
use crate::error::{ProsodyError, ProsodyResult};

/// Peak normalization - scales the buffer so its largest absolute sample is 1.0
#[derive(Clone, Copy, Debug, Default)]
pub struct Normalize;

impl Normalize {
    /// Create a peak normalizer
    pub fn peak() -> Self {
        Normalize
    }

    /// Divide every sample by the peak; the peak sample lands on exactly +/-1.0
    fn scale_to_peak(samples: &[f32], peak: f32) -> Vec<f32> {
        let peak = peak as f64;
        samples
            .iter()
            .map(|&s| ((s as f64 / peak) as f32).clamp(-1.0, 1.0))
            .collect()
    }
}

impl super::Filter for Normalize {
    fn process(&mut self, buffer: &AudioBuffer) -> ProsodyResult<AudioBuffer> {
        let peak = buffer.peak();

        if peak == 0.0 {
            return Err(ProsodyError::EmptySignal);
        }

        if peak == 1.0 {
            return Ok(buffer.clone());
        }

        AudioBuffer::new(
            Self::scale_to_peak(buffer.samples(), peak),
            buffer.sample_rate(),
        )
    }

    fn name(&self) -> &'static str {
        "normalize"
    }
}
