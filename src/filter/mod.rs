//! Buffer-to-buffer preprocessing filters

pub mod denoise;
pub mod normalize;
pub mod remix;
pub mod resample;
pub mod trim;

pub use denoise::SpectralSubtraction;
pub use normalize::Normalize;
pub use remix::downmix;
pub use resample::Resample;
pub use trim::TrimSilence;

use crate::core::AudioBuffer;
use crate::error::ProsodyResult;

/// Trait for audio filters
///
/// Filters never mutate their input; each call yields a new buffer.
pub trait Filter: Send {
    /// Process a buffer through this filter
    fn process(&mut self, buffer: &AudioBuffer) -> ProsodyResult<AudioBuffer>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

/// Filter that returns its input unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl Filter for Passthrough {
    fn process(&mut self, buffer: &AudioBuffer) -> ProsodyResult<AudioBuffer> {
        Ok(buffer.clone())
    }

    fn name(&self) -> &'static str {
        "passthrough"
    }
}
