//! Frame-wise F0 tracking
//!
//! The default estimator is a probabilistic YIN: the cumulative-mean-normalized
//! difference function is searched for troughs, and a Beta(2, 18) prior over
//! 100 absolute thresholds distributes probability onto the first trough under
//! each threshold. The winning trough is refined by parabolic interpolation.
//! Frames are independent; unvoiced gaps are reported as-is, never filled.

use super::energy::frame_energy_db;
use crate::config::{AnalysisConfig, PitchRange};
use crate::core::FrameSequence;
use crate::error::{ProsodyError, ProsodyResult};
use serde::{Deserialize, Serialize};

/// Number of absolute thresholds in the voicing prior
const THRESHOLD_STEPS: usize = 100;

/// Beta prior shape parameters (mean 0.1)
const BETA_ALPHA: f64 = 2.0;
const BETA_BETA: f64 = 18.0;

/// Lag slack (samples) at either end of the search range for refined periods
const LAG_TOLERANCE: f64 = 0.5;

/// Pitch of one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PitchFrame {
    /// Fundamental frequency, `None` when unvoiced
    pub f0_hz: Option<f64>,
    /// Probability mass the estimator assigned to a periodic candidate
    pub voicing_confidence: f64,
}

impl PitchFrame {
    /// Unvoiced frame with the given confidence
    pub fn unvoiced(voicing_confidence: f64) -> Self {
        PitchFrame {
            f0_hz: None,
            voicing_confidence,
        }
    }

    /// Whether a frequency is reported
    pub fn is_voiced(&self) -> bool {
        self.f0_hz.is_some()
    }
}

/// Statistics over voiced frames
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PitchStats {
    /// Mean F0
    pub mean_hz: f64,
    /// Lowest voiced F0
    pub min_hz: f64,
    /// Highest voiced F0
    pub max_hz: f64,
    /// Population standard deviation
    pub std_hz: f64,
    /// Number of voiced frames
    pub voiced_frames: usize,
}

/// One [`PitchFrame`] per analysis frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PitchContour(Vec<PitchFrame>);

impl PitchContour {
    /// Wrap precomputed frames
    pub fn from_frames(frames: Vec<PitchFrame>) -> Self {
        PitchContour(frames)
    }

    /// Frames in order
    pub fn frames(&self) -> &[PitchFrame] {
        &self.0
    }

    /// Number of frames
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when there are no frames
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// F0 of voiced frames in order
    pub fn voiced_f0(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().filter_map(|f| f.f0_hz)
    }

    /// Number of voiced frames
    pub fn voiced_count(&self) -> usize {
        self.voiced_f0().count()
    }

    /// Mean, range and deviation over voiced frames
    ///
    /// Fails with `NoPitchDetected` when no frame is voiced.
    pub fn stats(&self) -> ProsodyResult<PitchStats> {
        let voiced: Vec<f64> = self.voiced_f0().collect();
        if voiced.is_empty() {
            return Err(ProsodyError::NoPitchDetected { frames: self.len() });
        }

        let n = voiced.len() as f64;
        let mean = voiced.iter().sum::<f64>() / n;
        let variance = voiced.iter().map(|f| (f - mean).powi(2)).sum::<f64>() / n;

        Ok(PitchStats {
            mean_hz: mean,
            min_hz: voiced.iter().cloned().fold(f64::INFINITY, f64::min),
            max_hz: voiced.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            std_hz: variance.sqrt(),
            voiced_frames: voiced.len(),
        })
    }
}

/// Best periodic candidate of a frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchCandidate {
    /// Candidate frequency (may fall outside the search range)
    pub f0_hz: f64,
    /// Voicing probability in [0, 1]
    pub confidence: f64,
}

/// Per-frame period estimator
///
/// Implementations may trade accuracy for speed; the tracker applies voicing
/// and range decisions uniformly on top.
pub trait PitchEstimator: Send + Sync {
    /// Best candidate of `frame`, or `None` when the frame has no periodic trough
    fn estimate(&self, frame: &[f32], sample_rate: u32) -> Option<PitchCandidate>;
}

/// Shortest and longest lag (samples) covering `range` at `sample_rate`
pub fn lag_bounds(range: PitchRange, sample_rate: u32) -> (usize, usize) {
    let rate = sample_rate as f64;
    let min_lag = ((rate / range.max_hz).floor() as usize).max(1);
    let max_lag = (rate / range.min_hz).ceil() as usize;
    (min_lag, max_lag)
}

/// Probabilistic YIN estimator
#[derive(Debug, Clone)]
pub struct ProbabilisticYin {
    range: PitchRange,
    /// `(threshold, prior weight)`, weights summing to 1
    prior: Vec<(f64, f64)>,
}

impl ProbabilisticYin {
    /// Estimator searching `range`
    pub fn new(range: PitchRange) -> Self {
        let raw: Vec<(f64, f64)> = (1..=THRESHOLD_STEPS)
            .map(|k| {
                let s = k as f64 / THRESHOLD_STEPS as f64;
                (s, s.powf(BETA_ALPHA - 1.0) * (1.0 - s).powf(BETA_BETA - 1.0))
            })
            .collect();
        let total: f64 = raw.iter().map(|(_, w)| w).sum();
        let prior = raw.into_iter().map(|(s, w)| (s, w / total)).collect();

        ProbabilisticYin { range, prior }
    }

    /// `d(tau) = sum_j (x_j - x_{j+tau})^2` for `tau` in `0..=max_lag + 1`
    ///
    /// The extra lag gives a trough at `max_lag` its right neighbour.
    fn difference(frame: &[f32], max_lag: usize) -> Vec<f64> {
        let window = frame.len() - max_lag - 1;
        (0..=max_lag + 1)
            .map(|tau| {
                frame[..window]
                    .iter()
                    .zip(&frame[tau..tau + window])
                    .map(|(&a, &b)| {
                        let diff = (a - b) as f64;
                        diff * diff
                    })
                    .sum()
            })
            .collect()
    }

    /// Cumulative-mean-normalized difference, `d'(0) = 1`
    fn normalized_difference(diff: &[f64]) -> Vec<f64> {
        let mut cmnd = vec![1.0; diff.len()];
        let mut running = 0.0;
        for tau in 1..diff.len() {
            running += diff[tau];
            cmnd[tau] = if running > 0.0 {
                diff[tau] * tau as f64 / running
            } else {
                1.0
            };
        }
        cmnd
    }

    /// Interior local minima within `[min_lag, max_lag]`
    fn troughs(cmnd: &[f64], min_lag: usize) -> Vec<usize> {
        let last = cmnd.len() - 1;
        (min_lag.max(1)..last)
            .filter(|&tau| cmnd[tau] < cmnd[tau - 1] && cmnd[tau] <= cmnd[tau + 1])
            .collect()
    }

    /// Sub-sample lag from a parabola through the trough and its neighbours
    fn refine(cmnd: &[f64], tau: usize) -> f64 {
        let (a, b, c) = (cmnd[tau - 1], cmnd[tau], cmnd[tau + 1]);
        let denom = a - 2.0 * b + c;
        if denom.abs() < 1e-12 {
            return tau as f64;
        }
        tau as f64 + (0.5 * (a - c) / denom).clamp(-0.5, 0.5)
    }
}

impl PitchEstimator for ProbabilisticYin {
    fn estimate(&self, frame: &[f32], sample_rate: u32) -> Option<PitchCandidate> {
        let (min_lag, max_lag) = lag_bounds(self.range, sample_rate);
        if max_lag + 1 >= frame.len() {
            return None;
        }

        let cmnd = Self::normalized_difference(&Self::difference(frame, max_lag));
        let troughs = Self::troughs(&cmnd, min_lag);
        if troughs.is_empty() {
            return None;
        }

        let mut mass = vec![0.0; troughs.len()];
        for &(threshold, weight) in &self.prior {
            if let Some(i) = troughs.iter().position(|&tau| cmnd[tau] < threshold) {
                mass[i] += weight;
            }
        }

        let confidence: f64 = mass.iter().sum();
        let best = if confidence > 0.0 {
            (0..troughs.len())
                .max_by(|&a, &b| mass[a].total_cmp(&mass[b]))
                .unwrap_or(0)
        } else {
            (0..troughs.len())
                .min_by(|&a, &b| cmnd[troughs[a]].total_cmp(&cmnd[troughs[b]]))
                .unwrap_or(0)
        };

        let lag = Self::refine(&cmnd, troughs[best]);
        Some(PitchCandidate {
            f0_hz: sample_rate as f64 / lag,
            confidence: confidence.clamp(0.0, 1.0),
        })
    }
}

/// `f0_hz` when its period lies within half a sample of the lags covering
/// `range`, clamped into `range`
fn fit_to_range(range: PitchRange, f0_hz: f64, sample_rate: u32) -> Option<f64> {
    if range.contains(f0_hz) {
        return Some(f0_hz);
    }
    if !(f0_hz > 0.0) {
        return None;
    }
    let rate = sample_rate as f64;
    let lag = rate / f0_hz;
    let shortest = rate / range.max_hz - LAG_TOLERANCE;
    let longest = rate / range.min_hz + LAG_TOLERANCE;
    (shortest..=longest)
        .contains(&lag)
        .then(|| f0_hz.clamp(range.min_hz, range.max_hz))
}

/// Produces a [`PitchContour`] aligned with a frame sequence
pub struct PitchTracker {
    estimator: Box<dyn PitchEstimator>,
    range: PitchRange,
    voicing_threshold: f64,
    energy_floor_db: f64,
}

impl PitchTracker {
    /// Tracker with the probabilistic YIN estimator
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::with_estimator(
            Box::new(ProbabilisticYin::new(config.pitch_search_range_hz)),
            config,
        )
    }

    /// Tracker with a custom estimator
    pub fn with_estimator(estimator: Box<dyn PitchEstimator>, config: &AnalysisConfig) -> Self {
        PitchTracker {
            estimator,
            range: config.pitch_search_range_hz,
            voicing_threshold: config.voicing_threshold,
            energy_floor_db: config.voicing_energy_floor_db,
        }
    }

    /// Voicing decision and F0 for one frame
    pub fn track_frame(&self, frame: &[f32], sample_rate: u32) -> PitchFrame {
        if frame_energy_db(frame) < self.energy_floor_db {
            return PitchFrame::unvoiced(0.0);
        }

        match self.estimator.estimate(frame, sample_rate) {
            Some(candidate) if candidate.confidence >= self.voicing_threshold => {
                match fit_to_range(self.range, candidate.f0_hz, sample_rate) {
                    Some(f0_hz) => PitchFrame {
                        f0_hz: Some(f0_hz),
                        voicing_confidence: candidate.confidence,
                    },
                    None => PitchFrame::unvoiced(candidate.confidence),
                }
            }
            Some(candidate) => PitchFrame::unvoiced(candidate.confidence),
            None => PitchFrame::unvoiced(0.0),
        }
    }

    /// One record per frame
    ///
    /// Fails with `InvalidParameter` when frames are too short to hold the
    /// longest candidate period.
    pub fn track(&self, frames: &FrameSequence<'_>) -> ProsodyResult<PitchContour> {
        let (_, max_lag) = lag_bounds(self.range, frames.sample_rate());
        if max_lag + 1 >= frames.frame_size() {
            return Err(ProsodyError::InvalidParameter(format!(
                "frame_size {} cannot hold a {} Hz period ({} samples)",
                frames.frame_size(),
                self.range.min_hz,
                max_lag
            )));
        }

        let rate = frames.sample_rate();
        let mut contour = vec![PitchFrame::unvoiced(0.0); frames.len()];
        for (slot, frame) in contour.iter_mut().zip(frames.iter()) {
            *slot = self.track_frame(frame, rate);
        }
        Ok(PitchContour(contour))
    }
}
