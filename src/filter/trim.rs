use crate::config::AnalysisConfig;
use crate::core::AudioBuffer;
use crate::error::{ProsodyError, ProsodyResult};

/// Edge-silence trimmer
///
/// Frame RMS is measured relative to the loudest frame. Leading and trailing
/// frames more than `threshold_db` below it are silent; a silent edge is cut
/// only when it lasts longer than `min_span_s`.
#[derive(Debug, Clone)]
pub struct TrimSilence {
    threshold_db: f64,
    min_span_s: f64,
    frame_size: usize,
    hop_size: usize,
}

impl TrimSilence {
    /// Create a trimmer
    pub fn new(
        threshold_db: f64,
        min_span_s: f64,
        frame_size: usize,
        hop_size: usize,
    ) -> ProsodyResult<Self> {
        if !(threshold_db > 0.0) {
            return Err(ProsodyError::InvalidParameter(format!(
                "trim threshold must be a positive dB distance, got {threshold_db}"
            )));
        }
        if frame_size == 0 || hop_size == 0 {
            return Err(ProsodyError::InvalidParameter(
                "trim frame and hop must be > 0".to_string(),
            ));
        }

        Ok(TrimSilence {
            threshold_db,
            min_span_s,
            frame_size,
            hop_size,
        })
    }

    /// Trimmer using the analysis framing of `config`
    pub fn from_config(config: &AnalysisConfig) -> ProsodyResult<Self> {
        Self::new(
            config.silence_threshold_db,
            config.min_trim_span_s,
            config.frame_size,
            config.hop_size,
        )
    }

    /// RMS of each frame; a buffer shorter than one frame is a single frame
    fn frame_rms(&self, samples: &[f32]) -> Vec<f64> {
        let count = if samples.len() <= self.frame_size {
            1
        } else {
            (samples.len() - self.frame_size) / self.hop_size + 1
        };

        (0..count)
            .map(|i| {
                let start = i * self.hop_size;
                let end = (start + self.frame_size).min(samples.len());
                let frame = &samples[start..end];
                let sum: f64 = frame.iter().map(|&s| (s as f64) * (s as f64)).sum();
                (sum / frame.len() as f64).sqrt()
            })
            .collect()
    }

    /// Sample range `[start, end)` kept after trimming
    pub fn keep_range(&self, buffer: &AudioBuffer) -> (usize, usize) {
        let samples = buffer.samples();
        let rms = self.frame_rms(samples);
        let loudest = rms.iter().cloned().fold(0.0f64, f64::max);

        if loudest == 0.0 {
            return (0, samples.len());
        }

        let floor = loudest * 10f64.powf(-self.threshold_db / 20.0);
        let loud = |r: &f64| *r > floor;

        let (Some(first), Some(last)) = (rms.iter().position(loud), rms.iter().rposition(loud))
        else {
            return (0, samples.len());
        };

        let mut start = first * self.hop_size;
        // The final frame also owns the tail the framing never reached
        let mut end = if last + 1 == rms.len() {
            samples.len()
        } else {
            (last * self.hop_size + self.frame_size).min(samples.len())
        };

        let rate = buffer.sample_rate() as f64;
        if (start as f64 / rate) <= self.min_span_s {
            start = 0;
        }
        if ((samples.len() - end) as f64 / rate) <= self.min_span_s {
            end = samples.len();
        }

        (start, end)
    }
}

impl super::Filter for TrimSilence {
    fn process(&mut self, buffer: &AudioBuffer) -> ProsodyResult<AudioBuffer> {
        let (start, end) = self.keep_range(buffer);
        if start == 0 && end == buffer.len() {
            return Ok(buffer.clone());
        }

        log::debug!(
            "trim: dropping {} leading and {} trailing samples",
            start,
            buffer.len() - end
        );
        AudioBuffer::new(buffer.samples()[start..end].to_vec(), buffer.sample_rate())
    }

    fn name(&self) -> &'static str {
        "trim"
    }
}
