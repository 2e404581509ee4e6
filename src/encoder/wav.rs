use crate::core::AudioBuffer;
use crate::error::{ProsodyError, ProsodyResult};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Mono 32-bit float WAV writer
pub struct WavEncoder {
    writer: Option<WavWriter<BufWriter<File>>>,
    sample_rate: u32,
}

impl WavEncoder {
    /// Create a WAV file for buffers at `sample_rate`
    pub fn new<P: AsRef<Path>>(path: P, sample_rate: u32) -> ProsodyResult<Self> {
        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };

        Ok(WavEncoder {
            writer: Some(WavWriter::create(path, spec)?),
            sample_rate,
        })
    }

    /// Get the sample rate
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Get the number of samples written
    pub fn samples_written(&self) -> u32 {
        self.writer.as_ref().map_or(0, |w| w.len())
    }
}

impl super::Encoder for WavEncoder {
    fn encode(&mut self, buffer: &AudioBuffer) -> ProsodyResult<()> {
        if buffer.sample_rate() != self.sample_rate {
            return Err(ProsodyError::Encode(format!(
                "encoder expects {} Hz, got {} Hz",
                self.sample_rate,
                buffer.sample_rate()
            )));
        }

        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| ProsodyError::Encode("encoder already finalized".to_string()))?;

        for &sample in buffer.samples() {
            writer.write_sample(sample)?;
        }
        Ok(())
    }

    fn finalize(&mut self) -> ProsodyResult<()> {
        if let Some(writer) = self.writer.take() {
            writer.finalize()?;
        }
        Ok(())
    }
}

/// Write `buffer` to `path` in one go
pub fn write_wav<P: AsRef<Path>>(path: P, buffer: &AudioBuffer) -> ProsodyResult<()> {
    use super::Encoder;

    let mut encoder = WavEncoder::new(path, buffer.sample_rate())?;
    encoder.encode(buffer)?;
    encoder.finalize()
}
