//! Audio decoder implementations

pub mod symphonia;

pub use self::symphonia::SymphoniaDecoder;

use crate::core::DecodedAudio;
use crate::error::{ProsodyError, ProsodyResult};
use std::path::Path;

/// Trait for audio decoders
pub trait Decoder: Send {
    /// Source sample rate
    fn sample_rate(&self) -> u32;

    /// Source channel count
    fn channels(&self) -> u16;

    /// Next block of interleaved samples, `None` at end of stream
    fn decode_packet(&mut self) -> ProsodyResult<Option<Vec<f32>>>;

    /// Decode the remaining stream into one [`DecodedAudio`]
    fn decode_to_end(&mut self) -> ProsodyResult<DecodedAudio> {
        let mut samples = Vec::new();
        while let Some(block) = self.decode_packet()? {
            samples.extend_from_slice(&block);
        }
        if samples.is_empty() {
            return Err(ProsodyError::Load("stream contains no samples".to_string()));
        }
        DecodedAudio::new(samples, self.sample_rate(), self.channels())
    }
}

/// Create a decoder from a file path
pub fn from_file<P: AsRef<Path>>(path: P) -> ProsodyResult<Box<dyn Decoder>> {
    SymphoniaDecoder::from_file(path).map(|d| Box::new(d) as Box<dyn Decoder>)
}

/// Decode a whole file
pub fn load<P: AsRef<Path>>(path: P) -> ProsodyResult<DecodedAudio> {
    from_file(path)?.decode_to_end()
}
