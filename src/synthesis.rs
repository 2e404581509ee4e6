//! Mapping from measured patterns to relative synthesis controls

use crate::analysis::SpeakingPatterns;
use crate::analysis::energy::ENERGY_EPSILON;
use log::info;
use serde::{Deserialize, Serialize};

/// References and clamp bounds for [`SynthesisParameters::from_patterns`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisMapping {
    /// Mean pitch that maps to a factor of 1.0
    pub reference_pitch_hz: f64,
    /// Speaking rate that maps to a factor of 1.0
    pub reference_rate_wpm: f64,
    /// Lower clamp of both factors
    pub min_factor: f64,
    /// Upper clamp of both factors
    pub max_factor: f64,
}

impl Default for SynthesisMapping {
    fn default() -> Self {
        SynthesisMapping {
            reference_pitch_hz: 150.0,
            reference_rate_wpm: 150.0,
            min_factor: 0.5,
            max_factor: 2.0,
        }
    }
}

/// Controls for a speech synthesizer, relative to a neutral voice
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SynthesisParameters {
    /// Pitch multiplier, 1.0 when no pitch was measured
    pub pitch_factor: f64,
    /// Tempo multiplier
    pub rate_factor: f64,
    /// Mean pause length to insert (seconds)
    pub pause_duration_s: f64,
    /// Mean frame energy (dB)
    pub energy_level_db: f64,
}

impl SynthesisParameters {
    /// Derive parameters using the default mapping
    pub fn from_patterns(patterns: &SpeakingPatterns) -> Self {
        Self::with_mapping(patterns, &SynthesisMapping::default())
    }

    /// Derive parameters using `mapping`
    pub fn with_mapping(patterns: &SpeakingPatterns, mapping: &SynthesisMapping) -> Self {
        let clamp = |x: f64| x.clamp(mapping.min_factor, mapping.max_factor);

        let params = SynthesisParameters {
            pitch_factor: patterns
                .mean_pitch_hz
                .map_or(1.0, |hz| clamp(hz / mapping.reference_pitch_hz)),
            rate_factor: clamp(patterns.speaking_rate_wpm / mapping.reference_rate_wpm),
            pause_duration_s: patterns.average_pause_duration_s,
            energy_level_db: patterns
                .energy_contour
                .mean_db()
                .unwrap_or(10.0 * ENERGY_EPSILON.log10()),
        };

        info!(
            "synthesis: pitch x{:.2}, rate x{:.2}, pause {:.3}s",
            params.pitch_factor, params.rate_factor, params.pause_duration_s
        );
        params
    }
}
