use super::observer::{AnalysisObserver, NoopObserver, StageReport};
use super::preprocess::Preprocessor;
use crate::analysis::{
    EnergyExtractor, PatternAggregator, PauseSegmenter, PitchEstimator, PitchTracker,
    RateEstimator, SpeakingPatterns,
};
use crate::config::AnalysisConfig;
use crate::core::{AudioBuffer, DecodedAudio, FrameSequence};
use crate::error::{ProsodyError, ProsodyResult, Stage};
use log::debug;

/// Runs every stage from decoded samples to [`SpeakingPatterns`]
///
/// One extractor per recording. Stages run in order and the first failure
/// aborts the run.
pub struct PatternExtractor {
    config: AnalysisConfig,
    preprocessor: Preprocessor,
    energy: EnergyExtractor,
    pitch: PitchTracker,
    pauses: PauseSegmenter,
    rate: RateEstimator,
    aggregator: PatternAggregator,
}

impl PatternExtractor {
    /// Extractor with the default stages configured from `config`
    pub fn new(config: AnalysisConfig) -> ProsodyResult<Self> {
        let pitch = PitchTracker::from_config(&config);
        Self::build(config, pitch)
    }

    /// Extractor whose pitch tracker uses a custom estimator
    pub fn with_estimator(
        config: AnalysisConfig,
        estimator: Box<dyn PitchEstimator>,
    ) -> ProsodyResult<Self> {
        let pitch = PitchTracker::with_estimator(estimator, &config);
        Self::build(config, pitch)
    }

    fn build(config: AnalysisConfig, pitch: PitchTracker) -> ProsodyResult<Self> {
        config.validate()?;
        Ok(PatternExtractor {
            preprocessor: Preprocessor::from_config(&config)?,
            energy: EnergyExtractor::new(),
            pitch,
            pauses: PauseSegmenter::from_config(&config)?,
            rate: RateEstimator::from_config(&config)?,
            aggregator: PatternAggregator::new(config.require_pitch),
            config,
        })
    }

    /// Configuration in use
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Preprocessing front end, e.g. to swap the denoiser
    pub fn preprocessor_mut(&mut self) -> &mut Preprocessor {
        &mut self.preprocessor
    }

    /// Preprocess `decoded`, then extract patterns
    pub fn analyze(&mut self, decoded: &DecodedAudio) -> ProsodyResult<SpeakingPatterns> {
        self.analyze_observed(decoded, &mut NoopObserver)
    }

    /// [`analyze`](Self::analyze) reporting each stage to `observer`
    pub fn analyze_observed(
        &mut self,
        decoded: &DecodedAudio,
        observer: &mut dyn AnalysisObserver,
    ) -> ProsodyResult<SpeakingPatterns> {
        let buffer = self.preprocessor.process(decoded)?;
        observer.on_stage(
            &StageReport::new(Stage::Preprocess)
                .with("input_s", decoded.duration().as_secs_f64())
                .with("duration_s", buffer.duration_secs())
                .with("sample_rate_hz", buffer.sample_rate() as f64),
        );
        self.extract_observed(&buffer, observer)
    }

    /// Extract patterns from an already preprocessed buffer
    pub fn extract(&self, buffer: &AudioBuffer) -> ProsodyResult<SpeakingPatterns> {
        self.extract_observed(buffer, &mut NoopObserver)
    }

    /// [`extract`](Self::extract) reporting each stage to `observer`
    pub fn extract_observed(
        &self,
        buffer: &AudioBuffer,
        observer: &mut dyn AnalysisObserver,
    ) -> ProsodyResult<SpeakingPatterns> {
        let frames = FrameSequence::new(buffer, self.config.frame_size, self.config.hop_size)?;
        if frames.is_empty() {
            return Err(ProsodyError::TooShort {
                duration_s: buffer.duration_secs(),
                min_s: self.config.frame_size as f64 / buffer.sample_rate() as f64,
            });
        }
        observer.on_stage(&StageReport::new(Stage::Framing).with("frames", frames.len() as f64));

        let energy = self.energy.extract(&frames);
        observer.on_stage(
            &StageReport::new(Stage::Energy)
                .with("frames", energy.len() as f64)
                .with("mean_db", energy.mean_db().unwrap_or(f64::NAN)),
        );

        let pitch = self.pitch.track(&frames)?;
        let pitch_stats = pitch.stats();
        let mut report = StageReport::new(Stage::Pitch).with("voiced_frames", pitch.voiced_count() as f64);
        if let Ok(stats) = &pitch_stats {
            report = report.with("mean_hz", stats.mean_hz).with("std_hz", stats.std_hz);
        }
        observer.on_stage(&report);

        let pauses = self.pauses.segment(&energy, frames.timing())?;
        observer.on_stage(
            &StageReport::new(Stage::Pause)
                .with("pauses", pauses.len() as f64)
                .with("threshold_db", self.pauses.threshold(&energy).unwrap_or(f64::NAN))
                .with("pause_time_s", pauses.total_duration_s()),
        );

        let rate = self.rate.estimate(buffer.duration_secs(), &pauses);
        if let Ok(estimate) = &rate {
            observer.on_stage(
                &StageReport::new(Stage::Rate)
                    .with("speaking_time_s", estimate.speaking_time_s)
                    .with("wpm", estimate.speaking_rate_wpm),
            );
        }

        let patterns = self.aggregator.aggregate(energy, pitch, pitch_stats, pauses, rate)?;
        debug!(
            "patterns: {:.1} wpm, {} pauses, mean pitch {:?}",
            patterns.speaking_rate_wpm,
            patterns.pauses.len(),
            patterns.mean_pitch_hz
        );
        observer.on_stage(&StageReport::new(Stage::Aggregate).with("duration_s", patterns.duration_s));
        Ok(patterns)
    }
}
