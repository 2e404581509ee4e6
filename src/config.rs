//! Analysis configuration threaded through every stage

use crate::error::{ProsodyError, ProsodyResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// F0 search range in Hz
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PitchRange {
    /// Lowest candidate frequency
    pub min_hz: f64,
    /// Highest candidate frequency
    pub max_hz: f64,
}

impl PitchRange {
    /// Whether `hz` lies inside the range (inclusive)
    pub fn contains(&self, hz: f64) -> bool {
        hz >= self.min_hz && hz <= self.max_hz
    }
}

impl Default for PitchRange {
    fn default() -> Self {
        Self {
            min_hz: 50.0,
            max_hz: 500.0,
        }
    }
}

/// Every tunable of one extraction run
///
/// Loadable from TOML; missing keys fall back to [`AnalysisConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Target sample rate of the analysed buffer (Hz)
    pub sample_rate_hz: u32,
    /// Samples per analysis frame
    pub frame_size: usize,
    /// Samples between consecutive frame starts
    pub hop_size: usize,
    /// Edge frames this many dB below the loudest frame are trimmed
    pub silence_threshold_db: f64,
    /// Edge silence shorter than this is kept (seconds)
    pub min_trim_span_s: f64,
    /// Shortest analysable signal after trimming (seconds)
    pub min_duration_s: f64,
    /// Whether the spectral-subtraction pass runs
    pub denoise: bool,
    /// STFT size of the denoise pass
    pub denoise_fft_size: usize,
    /// Percentile of quietest STFT frames used as the noise floor
    pub noise_percentile: f64,
    /// Energy percentile at or below which a frame is silent
    pub pause_percentile: f64,
    /// Silent runs shorter than this are not pauses (seconds)
    pub min_pause_s: f64,
    /// F0 search range
    pub pitch_search_range_hz: PitchRange,
    /// Minimum voicing probability for a voiced frame
    pub voicing_threshold: f64,
    /// Frames quieter than this are unvoiced (dB)
    pub voicing_energy_floor_db: f64,
    /// Empirical words spoken per second of speaking time
    pub words_per_second_constant: f64,
    /// Fail with `NoPitchDetected` instead of returning null pitch fields
    pub require_pitch: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 22_050,
            frame_size: 2048,
            hop_size: 512,
            silence_threshold_db: 20.0,
            min_trim_span_s: 0.1,
            min_duration_s: 0.5,
            denoise: true,
            denoise_fft_size: 1024,
            noise_percentile: 10.0,
            pause_percentile: 25.0,
            min_pause_s: 0.1,
            pitch_search_range_hz: PitchRange::default(),
            voicing_threshold: 0.5,
            voicing_energy_floor_db: -50.0,
            words_per_second_constant: 2.5,
            require_pitch: true,
        }
    }
}

impl AnalysisConfig {
    /// Load a config from a TOML file and validate it
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> ProsodyResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|e| invalid(format!("{}: {}", path.as_ref().display(), e)))?;
        let config: AnalysisConfig = toml::from_str(&text).map_err(|e| {
            ProsodyError::InvalidParameter(format!(
                "{}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field against its allowed range
    pub fn validate(&self) -> ProsodyResult<()> {
        if self.sample_rate_hz == 0 {
            return Err(invalid("sample_rate_hz must be > 0"));
        }
        if self.frame_size == 0 {
            return Err(invalid("frame_size must be > 0"));
        }
        if self.hop_size == 0 || self.hop_size > self.frame_size {
            return Err(invalid(format!(
                "hop_size must be in 1..={}, got {}",
                self.frame_size, self.hop_size
            )));
        }
        if !(self.silence_threshold_db > 0.0) {
            return Err(invalid("silence_threshold_db must be positive"));
        }
        if self.min_trim_span_s < 0.0 || self.min_duration_s < 0.0 || self.min_pause_s < 0.0 {
            return Err(invalid("durations must not be negative"));
        }
        if self.denoise_fft_size < 16 || !self.denoise_fft_size.is_power_of_two() {
            return Err(invalid(format!(
                "denoise_fft_size must be a power of two >= 16, got {}",
                self.denoise_fft_size
            )));
        }
        for (name, p) in [
            ("noise_percentile", self.noise_percentile),
            ("pause_percentile", self.pause_percentile),
        ] {
            if !(0.0..=100.0).contains(&p) {
                return Err(invalid(format!("{name} must be in 0..=100, got {p}")));
            }
        }
        let range = self.pitch_search_range_hz;
        if !(range.min_hz > 0.0 && range.min_hz < range.max_hz) {
            return Err(invalid(format!(
                "pitch search range must satisfy 0 < min < max, got {}..{}",
                range.min_hz, range.max_hz
            )));
        }
        if range.max_hz * 2.0 > self.sample_rate_hz as f64 {
            return Err(invalid("pitch search maximum exceeds the Nyquist frequency"));
        }
        let max_lag = (self.sample_rate_hz as f64 / range.min_hz).ceil() as usize;
        if max_lag + 2 > self.frame_size {
            return Err(invalid(format!(
                "frame_size {} too small for a {} Hz pitch floor (needs > {} samples)",
                self.frame_size,
                range.min_hz,
                max_lag + 1
            )));
        }
        if !(0.0..=1.0).contains(&self.voicing_threshold) {
            return Err(invalid("voicing_threshold must be in 0..=1"));
        }
        if !(self.words_per_second_constant > 0.0) {
            return Err(invalid("words_per_second_constant must be positive"));
        }
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> ProsodyError {
    ProsodyError::InvalidParameter(msg.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_is_valid() {
        assert!(AnalysisConfig::default().validate().is_ok());
    }

    #[test]
    fn test_hop_larger_than_frame() {
        let config = AnalysisConfig {
            hop_size: 4096,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ProsodyError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_frame_too_small_for_pitch_floor() {
        // 50 Hz at 22050 Hz needs 441 lags
        let config = AnalysisConfig {
            frame_size: 256,
            hop_size: 128,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inverted_pitch_range() {
        let config = AnalysisConfig {
            pitch_search_range_hz: PitchRange {
                min_hz: 400.0,
                max_hz: 100.0,
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "hop_size = 256\npause_percentile = 30.0").unwrap();
        writeln!(file, "[pitch_search_range_hz]\nmin_hz = 70.0\nmax_hz = 400.0").unwrap();

        let config = AnalysisConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.hop_size, 256);
        assert_eq!(config.pause_percentile, 30.0);
        assert_eq!(config.pitch_search_range_hz.min_hz, 70.0);
        assert_eq!(config.frame_size, 2048);
        assert_eq!(config.words_per_second_constant, 2.5);
    }

    #[test]
    fn test_invalid_toml_value() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "hop_size = 0").unwrap();
        assert!(AnalysisConfig::from_toml_file(file.path()).is_err());
    }
}
