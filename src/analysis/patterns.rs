use super::energy::EnergyContour;
use super::pause::PauseList;
use super::pitch::{PitchContour, PitchStats};
use super::rate::RateEstimate;
use crate::error::{ProsodyError, ProsodyResult};
use serde::{Deserialize, Serialize};

/// Speaking patterns of one recording, in physical units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeakingPatterns {
    /// Words per minute of speaking time
    pub speaking_rate_wpm: f64,
    /// Mean pause length in seconds, 0.0 without pauses
    pub average_pause_duration_s: f64,
    /// Per-frame energy in dB
    pub energy_contour: EnergyContour,
    /// Per-frame pitch
    pub pitch_contour: PitchContour,
    /// Mean F0 over voiced frames
    pub mean_pitch_hz: Option<f64>,
    /// Lowest and highest voiced F0
    pub pitch_range_hz: Option<(f64, f64)>,
    /// Standard deviation of voiced F0
    pub pitch_std_hz: Option<f64>,
    /// Detected pauses
    pub pauses: PauseList,
    /// Analysed duration in seconds
    pub duration_s: f64,
}

impl SpeakingPatterns {
    /// Serialize to pretty JSON
    pub fn to_json(&self) -> ProsodyResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ProsodyError::Encode(e.to_string()))
    }
}

/// Assembles stage outputs into [`SpeakingPatterns`]
#[derive(Debug, Clone, Copy)]
pub struct PatternAggregator {
    require_pitch: bool,
}

impl PatternAggregator {
    /// Aggregator; with `require_pitch = false` a missing pitch yields null fields
    pub fn new(require_pitch: bool) -> Self {
        PatternAggregator { require_pitch }
    }

    /// Merge the stage results, returning the first error
    pub fn aggregate(
        &self,
        energy_contour: EnergyContour,
        pitch_contour: PitchContour,
        pitch_stats: ProsodyResult<PitchStats>,
        pauses: PauseList,
        rate: ProsodyResult<RateEstimate>,
    ) -> ProsodyResult<SpeakingPatterns> {
        let stats = match pitch_stats {
            Ok(stats) => Some(stats),
            Err(ProsodyError::NoPitchDetected { frames }) if !self.require_pitch => {
                log::debug!("no voiced frame in {frames} frames, pitch fields left empty");
                None
            }
            Err(e) => return Err(e),
        };
        let rate = rate?;

        Ok(SpeakingPatterns {
            speaking_rate_wpm: rate.speaking_rate_wpm,
            average_pause_duration_s: pauses.average_duration_s(),
            energy_contour,
            pitch_contour,
            mean_pitch_hz: stats.map(|s| s.mean_hz),
            pitch_range_hz: stats.map(|s| (s.min_hz, s.max_hz)),
            pitch_std_hz: stats.map(|s| s.std_hz),
            pauses,
            duration_s: rate.total_duration_s,
        })
    }
}
