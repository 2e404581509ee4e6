//! Feature extraction stages over framed audio

/// Per-frame energy
pub mod energy;
/// Pattern assembly
pub mod patterns;
/// Pause segmentation
pub mod pause;
/// Per-frame F0 tracking
pub mod pitch;
/// Speaking-rate estimation
pub mod rate;

pub use energy::{EnergyContour, EnergyExtractor};
pub use patterns::{PatternAggregator, SpeakingPatterns};
pub use pause::{PauseInterval, PauseList, PauseSegmenter};
pub use pitch::{
    PitchCandidate, PitchContour, PitchEstimator, PitchFrame, PitchStats, PitchTracker,
    ProbabilisticYin,
};
pub use rate::{RateEstimate, RateEstimator};
