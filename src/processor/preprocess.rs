use crate::config::AnalysisConfig;
use crate::core::{AudioBuffer, DecodedAudio};
use crate::error::{ProsodyError, ProsodyResult};
use crate::filter::{downmix, Filter, Normalize, Resample, SpectralSubtraction, TrimSilence};
use log::debug;

/// Turns decoded audio into the mono, peak-normalized analysis buffer
///
/// Order: downmix, resample, silence check, edge trim, duration check,
/// normalize, denoise, normalize.
pub struct Preprocessor {
    target_rate: u32,
    min_duration_s: f64,
    trim: TrimSilence,
    normalize: Normalize,
    denoiser: Option<Box<dyn Filter>>,
}

impl Preprocessor {
    /// Preprocessor configured from `config`
    pub fn from_config(config: &AnalysisConfig) -> ProsodyResult<Self> {
        config.validate()?;
        let denoiser: Option<Box<dyn Filter>> = if config.denoise {
            Some(Box::new(SpectralSubtraction::from_config(config)?))
        } else {
            None
        };

        Ok(Preprocessor {
            target_rate: config.sample_rate_hz,
            min_duration_s: config.min_duration_s,
            trim: TrimSilence::from_config(config)?,
            normalize: Normalize::peak(),
            denoiser,
        })
    }

    /// Replace the denoise strategy
    pub fn with_denoiser(mut self, denoiser: Box<dyn Filter>) -> Self {
        self.denoiser = Some(denoiser);
        self
    }

    /// Skip denoising
    pub fn without_denoiser(mut self) -> Self {
        self.denoiser = None;
        self
    }

    /// Run every step on `decoded`
    pub fn process(&mut self, decoded: &DecodedAudio) -> ProsodyResult<AudioBuffer> {
        let mono = downmix(decoded)?;
        let mut resampler = Resample::new(mono.sample_rate(), self.target_rate)?;
        let buffer = apply(&mut resampler, &mono)?;

        if buffer.is_silent() {
            return Err(ProsodyError::EmptySignal);
        }

        let buffer = apply(&mut self.trim, &buffer)?;
        let duration_s = buffer.duration_secs();
        if duration_s < self.min_duration_s {
            return Err(ProsodyError::TooShort {
                duration_s,
                min_s: self.min_duration_s,
            });
        }

        let mut normalize = self.normalize;
        let buffer = apply(&mut normalize, &buffer)?;

        let Some(denoiser) = self.denoiser.as_mut() else {
            return Ok(buffer);
        };
        let denoised = apply(&mut **denoiser, &buffer)?;

        // Subtraction moves the peak; bring it back to 1.0
        apply(&mut normalize, &denoised)
    }
}

fn apply(filter: &mut dyn Filter, buffer: &AudioBuffer) -> ProsodyResult<AudioBuffer> {
    let out = filter.process(buffer)?;
    debug!("{}: {} -> {} samples", filter.name(), buffer.len(), out.len());
    Ok(out)
}
