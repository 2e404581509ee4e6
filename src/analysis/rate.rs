use super::pause::PauseList;
use crate::config::AnalysisConfig;
use crate::error::{ProsodyError, ProsodyResult};
use serde::{Deserialize, Serialize};

/// Timing breakdown behind a speaking-rate figure
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateEstimate {
    /// Analysed duration
    pub total_duration_s: f64,
    /// Sum of pause durations
    pub pause_time_s: f64,
    /// `total_duration_s - pause_time_s`
    pub speaking_time_s: f64,
    /// `speaking_time_s * words_per_second`
    pub estimated_words: f64,
    /// Words per minute of speaking time
    pub speaking_rate_wpm: f64,
}

/// Speaking-rate estimator
///
/// The word count is not measured: it is speaking time multiplied by a fixed
/// words-per-second constant. With the constant `c` the rate therefore always
/// comes out as `c * 60` WPM whatever the content, and only becomes
/// informative once a real word or syllable count replaces the constant.
#[derive(Debug, Clone, Copy)]
pub struct RateEstimator {
    words_per_second: f64,
}

impl RateEstimator {
    /// Estimator with an explicit words-per-second constant
    pub fn new(words_per_second: f64) -> ProsodyResult<Self> {
        if !(words_per_second > 0.0) {
            return Err(ProsodyError::InvalidParameter(format!(
                "words per second must be > 0, got {words_per_second}"
            )));
        }
        Ok(RateEstimator { words_per_second })
    }

    /// Estimator configured from `config`
    pub fn from_config(config: &AnalysisConfig) -> ProsodyResult<Self> {
        Self::new(config.words_per_second_constant)
    }

    /// Rate over `total_duration_s` seconds containing `pauses`
    pub fn estimate(&self, total_duration_s: f64, pauses: &PauseList) -> ProsodyResult<RateEstimate> {
        let pause_time_s = pauses.total_duration_s();
        let speaking_time_s = total_duration_s - pause_time_s;
        if !(speaking_time_s > 0.0) {
            return Err(ProsodyError::DegenerateTiming { speaking_time_s });
        }

        let estimated_words = speaking_time_s * self.words_per_second;
        // words / (speaking_time / 60) reduces to this
        let speaking_rate_wpm = self.words_per_second * 60.0;

        Ok(RateEstimate {
            total_duration_s,
            pause_time_s,
            speaking_time_s,
            estimated_words,
            speaking_rate_wpm,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::energy::EnergyContour;
    use crate::analysis::pause::PauseSegmenter;
    use crate::core::FrameTiming;

    fn pauses_from(values: &[f64]) -> PauseList {
        let timing = FrameTiming {
            hop_size: 100,
            sample_rate: 1000,
            total_samples: values.len() * 100,
        };
        PauseSegmenter::new(25.0, 0.0)
            .unwrap()
            .segment(&EnergyContour::from_values(values.to_vec()), timing)
            .unwrap()
    }

    #[test]
    fn test_default_constant_gives_150_wpm() {
        let estimator = RateEstimator::from_config(&AnalysisConfig::default()).unwrap();
        let estimate = estimator.estimate(4.0, &PauseList::default()).unwrap();

        assert_eq!(estimate.speaking_rate_wpm, 150.0);
        assert_eq!(estimate.speaking_time_s, 4.0);
        assert_eq!(estimate.estimated_words, 10.0);
    }

    #[test]
    fn test_rate_independent_of_pauses() {
        let estimator = RateEstimator::new(2.5).unwrap();
        let pauses = pauses_from(&[-10.0, -10.0, -90.0, -90.0, -90.0, -10.0, -10.0, -10.0]);
        assert_eq!(pauses.len(), 1);

        let estimate = estimator.estimate(0.8, &pauses).unwrap();
        assert!((estimate.pause_time_s - 0.3).abs() < 1e-12);
        assert!((estimate.speaking_time_s - 0.5).abs() < 1e-12);
        assert_eq!(estimate.speaking_rate_wpm, 150.0);
    }

    #[test]
    fn test_all_pause_is_degenerate() {
        let pauses = pauses_from(&[-90.0; 4]);
        let err = RateEstimator::new(2.5)
            .unwrap()
            .estimate(0.4, &pauses)
            .unwrap_err();
        assert!(matches!(err, ProsodyError::DegenerateTiming { .. }));
    }

    #[test]
    fn test_zero_duration_is_degenerate() {
        let err = RateEstimator::new(2.5)
            .unwrap()
            .estimate(0.0, &PauseList::default())
            .unwrap_err();
        assert!(matches!(err, ProsodyError::DegenerateTiming { .. }));
    }

    #[test]
    fn test_invalid_constant() {
        assert!(RateEstimator::new(0.0).is_err());
        assert!(RateEstimator::new(f64::NAN).is_err());
    }
}
