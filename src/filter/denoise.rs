//! Best-effort spectral subtraction
//!
//! The noise magnitude spectrum is the mean spectrum of the quietest STFT
//! frames. Every frame keeps its phase and has that spectrum (scaled by
//! [`OVERSUBTRACTION`]) removed from its magnitude, never dropping below
//! [`SPECTRAL_FLOOR`] of the original. Non-stationary noise survives.

use crate::config::AnalysisConfig;
use crate::core::AudioBuffer;
use crate::error::{ProsodyError, ProsodyResult};
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

/// Noise frames must sit at least this far below the median frame (dB)
pub const DENOISE_MIN_SNR_DB: f64 = 10.0;

/// Multiplier on the noise spectrum before subtraction
pub const OVERSUBTRACTION: f32 = 2.0;

/// Fraction of each bin's magnitude that is always retained
pub const SPECTRAL_FLOOR: f32 = 0.05;

/// Mean noise magnitude below which there is nothing to subtract
const SILENT_NOISE_MAGNITUDE: f32 = 1e-9;

/// Spectral-subtraction denoiser
pub struct SpectralSubtraction {
    fft_size: usize,
    noise_percentile: f64,
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
}

impl SpectralSubtraction {
    /// Create a denoiser with the given STFT size and noise percentile
    pub fn new(fft_size: usize, noise_percentile: f64) -> ProsodyResult<Self> {
        if fft_size < 16 || !fft_size.is_power_of_two() {
            return Err(ProsodyError::InvalidParameter(format!(
                "denoise FFT size must be a power of two >= 16, got {fft_size}"
            )));
        }
        if !(0.0..=100.0).contains(&noise_percentile) {
            return Err(ProsodyError::InvalidParameter(format!(
                "noise percentile must be in 0..=100, got {noise_percentile}"
            )));
        }

        let mut planner = FftPlanner::<f32>::new();
        // Periodic Hann: sums to exactly 1.0 at 50% overlap
        let window = (0..fft_size)
            .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f32 / fft_size as f32).cos())
            .collect();

        Ok(SpectralSubtraction {
            fft_size,
            noise_percentile,
            forward: planner.plan_fft_forward(fft_size),
            inverse: planner.plan_fft_inverse(fft_size),
            window,
        })
    }

    /// Denoiser configured from `config`
    pub fn from_config(config: &AnalysisConfig) -> ProsodyResult<Self> {
        Self::new(config.denoise_fft_size, config.noise_percentile)
    }

    fn hop(&self) -> usize {
        self.fft_size / 2
    }

    /// Frames lying entirely inside a signal of `len >= fft_size` samples
    fn full_frames(&self, len: usize) -> usize {
        (len - self.fft_size) / self.hop() + 1
    }

    /// Windowed spectra of the zero-padded signal
    fn analyze(&self, samples: &[f32]) -> Vec<Vec<Complex<f32>>> {
        let n = self.fft_size;
        let hop = self.hop();
        let frames = (samples.len().saturating_sub(n)).div_ceil(hop) + 1;

        (0..frames)
            .map(|f| {
                let start = f * hop;
                let mut spectrum: Vec<Complex<f32>> = (0..n)
                    .map(|i| {
                        let s = samples.get(start + i).copied().unwrap_or(0.0);
                        Complex::new(s * self.window[i], 0.0)
                    })
                    .collect();
                self.forward.process(&mut spectrum);
                spectrum
            })
            .collect()
    }

    /// Mean magnitude spectrum of the quietest of the first `full` frames, or
    /// `None` when the signal has no noise floor distinct from its content
    ///
    /// Frames past `full` hold zero padding and would rank as quiet.
    fn noise_spectrum(&self, spectra: &[Vec<Complex<f32>>], full: usize) -> Option<Vec<f32>> {
        let ranked = &spectra[..full.min(spectra.len())];
        let energies: Vec<f64> = ranked
            .iter()
            .map(|s| s.iter().map(|c| c.norm_sqr() as f64).sum())
            .collect();

        let mut order: Vec<usize> = (0..energies.len()).collect();
        order.sort_by(|&a, &b| energies[a].total_cmp(&energies[b]));

        let quiet = ((energies.len() as f64 * self.noise_percentile / 100.0).ceil() as usize)
            .clamp(1, energies.len());
        let quiet_frames = &order[..quiet];

        let mut noise = vec![0.0f32; self.fft_size];
        for &f in quiet_frames {
            for (acc, c) in noise.iter_mut().zip(&ranked[f]) {
                *acc += c.norm();
            }
        }
        noise.iter_mut().for_each(|m| *m /= quiet as f32);

        let mean_magnitude = noise.iter().sum::<f32>() / noise.len() as f32;
        if mean_magnitude <= SILENT_NOISE_MAGNITUDE {
            log::debug!("denoise: noise floor is digital silence, skipping");
            return None;
        }

        let noise_energy = quiet_frames.iter().map(|&f| energies[f]).sum::<f64>() / quiet as f64;
        let median_energy = energies[order[order.len() / 2]];
        let snr_db = 10.0 * (median_energy / noise_energy.max(f64::MIN_POSITIVE)).log10();
        if snr_db < DENOISE_MIN_SNR_DB {
            log::debug!("denoise: no separable noise floor ({snr_db:.1} dB), skipping");
            return None;
        }

        Some(noise)
    }

    fn subtract(spectrum: &mut [Complex<f32>], noise: &[f32]) {
        for (c, &n) in spectrum.iter_mut().zip(noise) {
            let magnitude = c.norm();
            if magnitude == 0.0 {
                continue;
            }
            let cleaned = (magnitude - OVERSUBTRACTION * n).max(SPECTRAL_FLOOR * magnitude);
            *c *= cleaned / magnitude;
        }
    }

    /// Inverse STFT with overlap-add, normalized by the summed window
    fn synthesize(&self, spectra: Vec<Vec<Complex<f32>>>, original: &[f32]) -> Vec<f32> {
        let n = self.fft_size;
        let hop = self.hop();
        let total = (spectra.len() - 1) * hop + n;
        let mut acc = vec![0.0f32; total];
        let mut weight = vec![0.0f32; total];

        for (f, mut spectrum) in spectra.into_iter().enumerate() {
            self.inverse.process(&mut spectrum);
            let start = f * hop;
            for i in 0..n {
                acc[start + i] += spectrum[i].re / n as f32;
                weight[start + i] += self.window[i];
            }
        }

        original
            .iter()
            .enumerate()
            .map(|(i, &s)| if weight[i] > 1e-3 { acc[i] / weight[i] } else { s })
            .collect()
    }
}

impl super::Filter for SpectralSubtraction {
    fn process(&mut self, buffer: &AudioBuffer) -> ProsodyResult<AudioBuffer> {
        let samples = buffer.samples();
        if samples.len() < self.fft_size {
            return Ok(buffer.clone());
        }

        let mut spectra = self.analyze(samples);
        let full = self.full_frames(samples.len());
        let Some(noise) = self.noise_spectrum(&spectra, full) else {
            return Ok(buffer.clone());
        };

        for spectrum in spectra.iter_mut() {
            Self::subtract(spectrum, &noise);
        }

        AudioBuffer::new(self.synthesize(spectra, samples), buffer.sample_rate())
    }

    fn name(&self) -> &'static str {
        "denoise"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Filter;

    const RATE: u32 = 16000;

    /// Deterministic uniform noise in [-amp, amp]
    fn noise(len: usize, amp: f32) -> Vec<f32> {
        let mut state: u32 = 0x1234_5678;
        (0..len)
            .map(|_| {
                state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                ((state >> 8) as f32 / (1u32 << 24) as f32 * 2.0 - 1.0) * amp
            })
            .collect()
    }

    fn rms(samples: &[f32]) -> f32 {
        (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
    }

    #[test]
    fn test_reduces_stationary_noise() {
        let lead = RATE as usize / 2;
        let len = RATE as usize * 2;
        let mut samples = noise(len, 0.05);
        for (i, s) in samples.iter_mut().enumerate().skip(lead) {
            *s += 0.5 * (2.0 * PI * 300.0 * i as f32 / RATE as f32).sin();
        }
        let buffer = AudioBuffer::new(samples, RATE).unwrap();

        let out = SpectralSubtraction::new(1024, 10.0).unwrap().process(&buffer).unwrap();
        assert_eq!(out.len(), buffer.len());

        let before = rms(&buffer.samples()[1024..lead - 1024]);
        let after = rms(&out.samples()[1024..lead - 1024]);
        assert!(after < 0.5 * before, "noise rms {before} -> {after}");

        let tone_before = rms(&buffer.samples()[lead + 2048..len - 2048]);
        let tone_after = rms(&out.samples()[lead + 2048..len - 2048]);
        assert!((tone_after / tone_before) > 0.9, "tone rms {tone_before} -> {tone_after}");
    }

    #[test]
    fn test_stationary_tone_is_untouched() {
        let samples: Vec<f32> = (0..RATE as usize)
            .map(|i| (2.0 * PI * 150.0 * i as f32 / RATE as f32).sin())
            .collect();
        let buffer = AudioBuffer::new(samples, RATE).unwrap();

        let out = SpectralSubtraction::new(1024, 10.0).unwrap().process(&buffer).unwrap();
        assert_eq!(out, buffer);
    }

    #[test]
    fn test_digital_silence_floor_is_untouched() {
        let mut samples = vec![0.0f32; RATE as usize];
        samples.extend((0..RATE as usize).map(|i| (2.0 * PI * 200.0 * i as f32 / RATE as f32).sin()));
        let buffer = AudioBuffer::new(samples, RATE).unwrap();

        let out = SpectralSubtraction::new(512, 10.0).unwrap().process(&buffer).unwrap();
        assert_eq!(out, buffer);
    }

    #[test]
    fn test_padded_frame_not_ranked_as_noise() {
        // The last frame holds 520 samples and 504 zeros
        let len = 1024 + 512 * 30 + 8;
        let mut samples = noise(len, 0.05);
        for (i, s) in samples.iter_mut().enumerate().take(len * 3 / 4) {
            *s += 0.5 * (2.0 * PI * 300.0 * i as f32 / RATE as f32).sin();
        }

        let denoiser = SpectralSubtraction::new(1024, 10.0).unwrap();
        let spectra = denoiser.analyze(&samples);
        let full = denoiser.full_frames(len);
        assert_eq!(full, spectra.len() - 1);

        let energy = |s: &Vec<Complex<f32>>| s.iter().map(|c| c.norm_sqr()).sum::<f32>();
        let padded = energy(&spectra[full]);
        assert!(spectra[..full].iter().all(|s| energy(s) > padded));

        let estimate = denoiser.noise_spectrum(&spectra, full);
        assert!(estimate.is_some());
        assert_eq!(estimate, denoiser.noise_spectrum(&spectra[..full], full));
    }

    #[test]
    fn test_invalid_fft_size() {
        assert!(SpectralSubtraction::new(1000, 10.0).is_err());
        assert!(SpectralSubtraction::new(8, 10.0).is_err());
        assert!(SpectralSubtraction::new(1024, 120.0).is_err());
    }
}
