use super::energy::EnergyContour;
use crate::config::AnalysisConfig;
use crate::core::FrameTiming;
use crate::error::{ProsodyError, ProsodyResult};
use serde::{Deserialize, Serialize};

/// One silent stretch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PauseInterval {
    /// Start of the first silent frame
    pub start_time_s: f64,
    /// Start of the first frame after the run, or the buffer end when the
    /// run reaches the last frame
    pub end_time_s: f64,
    /// `end_time_s - start_time_s`
    pub duration_s: f64,
}

/// Pauses sorted by start time, never overlapping
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PauseList(Vec<PauseInterval>);

impl PauseList {
    /// Intervals in order
    pub fn intervals(&self) -> &[PauseInterval] {
        &self.0
    }

    /// Number of pauses
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no pause was found
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all durations
    pub fn total_duration_s(&self) -> f64 {
        self.0.iter().map(|p| p.duration_s).sum()
    }

    /// Mean duration, 0.0 without pauses
    pub fn average_duration_s(&self) -> f64 {
        if self.0.is_empty() {
            0.0
        } else {
            self.total_duration_s() / self.0.len() as f64
        }
    }
}

/// Value at percentile `p` (0..=100), linearly interpolated between order
/// statistics. `None` for an empty input.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Turns an energy contour into pauses
#[derive(Debug, Clone)]
pub struct PauseSegmenter {
    percentile: f64,
    min_pause_s: f64,
}

impl PauseSegmenter {
    /// Segmenter with an explicit percentile and minimum pause length
    pub fn new(percentile: f64, min_pause_s: f64) -> ProsodyResult<Self> {
        if !(0.0..=100.0).contains(&percentile) {
            return Err(ProsodyError::InvalidParameter(format!(
                "pause percentile must be in 0..=100, got {percentile}"
            )));
        }
        Ok(PauseSegmenter {
            percentile,
            min_pause_s,
        })
    }

    /// Segmenter configured from `config`
    pub fn from_config(config: &AnalysisConfig) -> ProsodyResult<Self> {
        Self::new(config.pause_percentile, config.min_pause_s)
    }

    /// Energy at or below which a frame is silent
    pub fn threshold(&self, energy: &EnergyContour) -> Option<f64> {
        percentile(energy.values(), self.percentile)
    }

    /// Per-frame silence decision
    pub fn silent_mask(&self, energy: &EnergyContour) -> Vec<bool> {
        match self.threshold(energy) {
            Some(threshold) => energy.values().iter().map(|&e| e <= threshold).collect(),
            None => Vec::new(),
        }
    }

    /// Maximal silent runs at least `min_pause_s` long
    pub fn segment(&self, energy: &EnergyContour, timing: FrameTiming) -> ProsodyResult<PauseList> {
        if timing.sample_rate == 0 || timing.hop_size == 0 {
            return Err(ProsodyError::InvalidParameter(
                "frame timing needs a positive hop and sample rate".to_string(),
            ));
        }

        let mask = self.silent_mask(energy);
        let mut pauses = Vec::new();
        let mut run_start = None;

        // Trailing sentinel closes a run that reaches the last frame
        for (i, silent) in mask.iter().copied().chain(std::iter::once(false)).enumerate() {
            match (silent, run_start) {
                (true, None) => run_start = Some(i),
                (false, Some(start)) => {
                    let start_time_s = timing.time_s(start);
                    // A run through the last frame ends with the buffer
                    let end_time_s = if i == mask.len() {
                        timing.end_s()
                    } else {
                        timing.time_s(i)
                    };
                    let duration_s = end_time_s - start_time_s;
                    if duration_s >= self.min_pause_s {
                        pauses.push(PauseInterval {
                            start_time_s,
                            end_time_s,
                            duration_s,
                        });
                    }
                    run_start = None;
                }
                _ => {}
            }
        }

        Ok(PauseList(pauses))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOP: usize = 100;

    // Frames as long as the hop, so the buffer ends where the last frame does
    fn timing(frames: usize) -> FrameTiming {
        FrameTiming {
            hop_size: HOP,
            sample_rate: 1000,
            total_samples: frames * HOP,
        }
    }

    fn contour(values: &[f64]) -> EnergyContour {
        EnergyContour::from_values(values.to_vec())
    }

    fn segment(segmenter: &PauseSegmenter, values: &[f64]) -> PauseList {
        segmenter.segment(&contour(values), timing(values.len())).unwrap()
    }

    #[test]
    fn test_percentile_interpolates() {
        let values = [4.0, 1.0, 3.0, 2.0, 5.0];
        assert_eq!(percentile(&values, 0.0), Some(1.0));
        assert_eq!(percentile(&values, 25.0), Some(2.0));
        assert_eq!(percentile(&values, 50.0), Some(3.0));
        assert_eq!(percentile(&values, 100.0), Some(5.0));
        assert_eq!(percentile(&[1.0, 2.0], 25.0), Some(1.25));
        assert_eq!(percentile(&[], 25.0), None);
    }

    #[test]
    fn test_single_run() {
        let segmenter = PauseSegmenter::new(25.0, 0.1).unwrap();
        let pauses = segment(&segmenter, &[-10.0, -10.0, -80.0, -80.0, -80.0, -10.0, -10.0, -10.0]);

        assert_eq!(pauses.len(), 1);
        let pause = pauses.intervals()[0];
        assert!((pause.start_time_s - 0.2).abs() < 1e-12);
        assert!((pause.end_time_s - 0.5).abs() < 1e-12);
        assert!((pause.duration_s - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_short_runs_discarded() {
        // 1-frame runs last 0.1 s, 0.15 s minimum drops them
        let segmenter = PauseSegmenter::new(50.0, 0.15).unwrap();
        let pauses = segment(&segmenter, &[-80.0, -10.0, -80.0, -10.0, -80.0, -80.0, -10.0, -10.0]);

        assert_eq!(pauses.len(), 1);
        assert!((pauses.intervals()[0].start_time_s - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_run_reaching_the_end() {
        let segmenter = PauseSegmenter::new(25.0, 0.0).unwrap();
        let pauses = segment(&segmenter, &[-10.0, -10.0, -10.0, -10.0, -60.0, -60.0]);
        assert_eq!(pauses.len(), 1);
        assert!((pauses.intervals()[0].end_time_s - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_trailing_run_closes_at_buffer_end() {
        // 6 frames of 250 samples every 100: the buffer is 750 samples long
        let overlapped = FrameTiming {
            hop_size: HOP,
            sample_rate: 1000,
            total_samples: 750,
        };
        let segmenter = PauseSegmenter::new(25.0, 0.0).unwrap();
        let energy = contour(&[-10.0, -10.0, -10.0, -10.0, -60.0, -60.0]);
        let pauses = segmenter.segment(&energy, overlapped).unwrap();

        assert_eq!(pauses.len(), 1);
        assert!((pauses.intervals()[0].start_time_s - 0.4).abs() < 1e-12);
        assert_eq!(pauses.intervals()[0].end_time_s, 0.75);
    }

    #[test]
    fn test_all_silent_covers_whole_buffer() {
        let overlapped = FrameTiming {
            hop_size: 512,
            sample_rate: 22_050,
            total_samples: 22_050,
        };
        let frames = (22_050 - 2048) / 512 + 1;
        let energy = contour(&vec![-40.0; frames]);
        let pauses = PauseSegmenter::new(25.0, 0.1)
            .unwrap()
            .segment(&energy, overlapped)
            .unwrap();

        assert_eq!(pauses.len(), 1);
        assert_eq!(pauses.intervals()[0].start_time_s, 0.0);
        assert_eq!(pauses.total_duration_s(), 1.0);
    }

    #[test]
    fn test_pauses_sorted_and_disjoint() {
        let values: Vec<f64> = (0..200)
            .map(|i| if (i / 7) % 3 == 0 { -70.0 - (i % 5) as f64 } else { -20.0 + (i % 3) as f64 })
            .collect();
        let energy = contour(&values);

        for p in [10.0, 25.0, 40.0, 60.0] {
            let pauses = PauseSegmenter::new(p, 0.0)
                .unwrap()
                .segment(&energy, timing(values.len()))
                .unwrap();
            for pair in pauses.intervals().windows(2) {
                assert!(pair[0].end_time_s <= pair[1].start_time_s);
            }
        }
    }

    #[test]
    fn test_raising_percentile_never_shrinks_silence() {
        let values: Vec<f64> = (0..97).map(|i| ((i * 37) % 23) as f64 * -3.5).collect();
        let energy = contour(&values);

        let mut previous = 0;
        for step in 0..=20 {
            let p = step as f64 * 5.0;
            let silent = PauseSegmenter::new(p, 0.0)
                .unwrap()
                .silent_mask(&energy)
                .iter()
                .filter(|&&s| s)
                .count();
            assert!(silent >= previous, "p={p}: {silent} < {previous}");
            previous = silent;
        }
        assert_eq!(previous, values.len());
    }

    #[test]
    fn test_average_duration() {
        assert_eq!(PauseList::default().average_duration_s(), 0.0);

        let segmenter = PauseSegmenter::new(60.0, 0.0).unwrap();
        let pauses = segment(&segmenter, &[-80.0, -80.0, -10.0, -80.0, -80.0, -80.0, -80.0, -10.0, -10.0, -10.0]);
        assert_eq!(pauses.len(), 2);
        assert!((pauses.average_duration_s() - 0.3).abs() < 1e-12);
        assert!((pauses.total_duration_s() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_empty_contour() {
        let pauses = segment(&PauseSegmenter::new(25.0, 0.1).unwrap(), &[]);
        assert!(pauses.is_empty());
    }

    #[test]
    fn test_invalid_percentile() {
        assert!(PauseSegmenter::new(101.0, 0.1).is_err());
    }
}
