use crate::core::AudioBuffer;
use crate::error::{ProsodyError, ProsodyResult};
use rubato::{FastFixedIn, PolynomialDegree, Resampler};

/// Input frames handed to rubato per call
const CHUNK_SIZE: usize = 1024;

/// Whole-buffer sample-rate converter backed by a rubato `FastFixedIn`
///
/// The resampler's output delay is removed, so the result is time-aligned with
/// the input and holds `ceil(len * output_rate / input_rate)` samples.
pub struct Resample {
    input_rate: u32,
    output_rate: u32,
}

impl Resample {
    /// Create a new resampler
    ///
    /// # Arguments
    /// * `input_rate` - Input sample rate in Hz
    /// * `output_rate` - Output sample rate in Hz
    pub fn new(input_rate: u32, output_rate: u32) -> ProsodyResult<Self> {
        if input_rate == 0 || output_rate == 0 {
            return Err(ProsodyError::InvalidParameter(format!(
                "sample rates must be > 0, got {input_rate} -> {output_rate}"
            )));
        }

        Ok(Resample {
            input_rate,
            output_rate,
        })
    }

    /// Get the input sample rate
    pub fn input_rate(&self) -> u32 {
        self.input_rate
    }

    /// Get the output sample rate
    pub fn output_rate(&self) -> u32 {
        self.output_rate
    }

    /// Get the ratio of output to input sample rate
    pub fn ratio(&self) -> f64 {
        self.output_rate as f64 / self.input_rate as f64
    }

    fn convert(&self, input: &[f32]) -> ProsodyResult<Vec<f32>> {
        let ratio = self.ratio();
        let mut resampler = FastFixedIn::<f32>::new(
            ratio,
            1.0, // fixed ratio
            PolynomialDegree::Cubic,
            CHUNK_SIZE,
            1,
        )
        .map_err(|e| ProsodyError::Resampling(format!("resampler init: {e}")))?;

        let delay = resampler.output_delay();
        let expected = (input.len() as f64 * ratio).ceil() as usize;
        let mut output = Vec::with_capacity(expected + delay + CHUNK_SIZE);

        let mut pos = 0;
        while input.len() - pos >= resampler.input_frames_next() {
            let n = resampler.input_frames_next();
            let out = resampler
                .process(&[&input[pos..pos + n]], None)
                .map_err(|e| ProsodyError::Resampling(e.to_string()))?;
            output.extend_from_slice(&out[0]);
            pos += n;
        }

        if pos < input.len() {
            let tail: [&[f32]; 1] = [&input[pos..]];
            let out = resampler
                .process_partial(Some(&tail[..]), None)
                .map_err(|e| ProsodyError::Resampling(e.to_string()))?;
            output.extend_from_slice(&out[0]);
        }

        // Flush the filter delay
        while output.len() < delay + expected {
            let out = resampler
                .process_partial::<&[f32]>(None, None)
                .map_err(|e| ProsodyError::Resampling(e.to_string()))?;
            if out[0].is_empty() {
                break;
            }
            output.extend_from_slice(&out[0]);
        }

        Ok(output.into_iter().skip(delay).take(expected).collect())
    }
}

impl super::Filter for Resample {
    fn process(&mut self, buffer: &AudioBuffer) -> ProsodyResult<AudioBuffer> {
        if buffer.sample_rate() != self.input_rate {
            return Err(ProsodyError::InvalidParameter(format!(
                "resampler expects {} Hz input, got {} Hz",
                self.input_rate,
                buffer.sample_rate()
            )));
        }

        if self.input_rate == self.output_rate {
            // No resampling needed
            return Ok(buffer.clone());
        }

        let resampled = self.convert(buffer.samples())?;
        AudioBuffer::new(resampled, self.output_rate)
    }

    fn name(&self) -> &'static str {
        "resample"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Filter;
    use std::f32::consts::PI;

    fn tone(freq: f32, rate: u32, secs: f32) -> AudioBuffer {
        let n = (rate as f32 * secs) as usize;
        let samples = (0..n)
            .map(|i| 0.5 * (2.0 * PI * freq * i as f32 / rate as f32).sin())
            .collect();
        AudioBuffer::new(samples, rate).unwrap()
    }

    #[test]
    fn test_resample_creation() {
        let r = Resample::new(44100, 16000).unwrap();
        assert_eq!(r.input_rate(), 44100);
        assert_eq!(r.output_rate(), 16000);
    }

    #[test]
    fn test_resample_invalid_rate() {
        assert!(Resample::new(0, 16000).is_err());
    }

    #[test]
    fn test_passthrough() {
        let buffer = tone(220.0, 22050, 0.1);
        let out = Resample::new(22050, 22050).unwrap().process(&buffer).unwrap();
        assert_eq!(out, buffer);
    }

    #[test]
    fn test_wrong_input_rate() {
        let buffer = tone(220.0, 48000, 0.1);
        assert!(Resample::new(44100, 22050).unwrap().process(&buffer).is_err());
    }

    #[test]
    fn test_downsample_length_and_level() {
        let buffer = tone(441.0, 44100, 1.0);
        let out = Resample::new(44100, 22050).unwrap().process(&buffer).unwrap();

        assert_eq!(out.sample_rate(), 22050);
        assert_eq!(out.len(), 22050);
        // Tone stays well below Nyquist, so its amplitude survives
        let mid_peak = out.samples()[5000..17000]
            .iter()
            .fold(0.0f32, |a, &s| a.max(s.abs()));
        assert!((mid_peak - 0.5).abs() < 0.05, "peak={mid_peak}");
    }

    #[test]
    fn test_upsample_length() {
        let buffer = tone(200.0, 16000, 0.5);
        let out = Resample::new(16000, 22050).unwrap().process(&buffer).unwrap();
        assert_eq!(out.len(), (8000.0f64 * 22050.0 / 16000.0).ceil() as usize);
    }
}
