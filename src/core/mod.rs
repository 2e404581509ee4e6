//! Core audio types and structures

/// Decoded source and mono analysis buffer
pub mod audio;
/// Overlapping analysis frames
pub mod frame;

pub use audio::{AudioBuffer, DecodedAudio};
pub use frame::{FrameSequence, FrameTiming};
