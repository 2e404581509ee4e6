//! Audio encoder implementations

pub mod wav;

pub use wav::{WavEncoder, write_wav};

use crate::core::AudioBuffer;
use crate::error::ProsodyResult;

/// Trait for audio encoders
pub trait Encoder {
    /// Append a buffer to the output
    fn encode(&mut self, buffer: &AudioBuffer) -> ProsodyResult<()>;

    /// Finalize encoding (flush any remaining data)
    fn finalize(&mut self) -> ProsodyResult<()> {
        Ok(())
    }
}
