use super::AudioBuffer;
use crate::error::{ProsodyError, ProsodyResult};

/// Overlapping analysis frames over an [`AudioBuffer`]
///
/// Frame `i` is `samples[i * hop .. i * hop + frame_size]`. A trailing partial
/// frame is dropped, never zero-padded, so every consumer sees the same
/// `floor((L - F) / H) + 1` frames.
#[derive(Debug, Clone, Copy)]
pub struct FrameSequence<'a> {
    buffer: &'a AudioBuffer,
    frame_size: usize,
    hop_size: usize,
    len: usize,
}

impl<'a> FrameSequence<'a> {
    /// Frame a buffer
    pub fn new(buffer: &'a AudioBuffer, frame_size: usize, hop_size: usize) -> ProsodyResult<Self> {
        if frame_size == 0 {
            return Err(ProsodyError::InvalidParameter(
                "frame_size must be > 0".to_string(),
            ));
        }
        if hop_size == 0 || hop_size > frame_size {
            return Err(ProsodyError::InvalidParameter(format!(
                "hop_size must be in 1..={frame_size}, got {hop_size}"
            )));
        }

        Ok(FrameSequence {
            buffer,
            frame_size,
            hop_size,
            len: frame_count(buffer.len(), frame_size, hop_size),
        })
    }

    /// Number of frames
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when the buffer is shorter than one frame
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Samples per frame
    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Samples between frame starts
    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    /// Sample rate of the underlying buffer
    pub fn sample_rate(&self) -> u32 {
        self.buffer.sample_rate()
    }

    /// Frame at `index`
    pub fn get(&self, index: usize) -> Option<&'a [f32]> {
        if index >= self.len {
            return None;
        }
        let start = index * self.hop_size;
        Some(&self.buffer.samples()[start..start + self.frame_size])
    }

    /// Start time of frame `index` in seconds
    pub fn frame_time_s(&self, index: usize) -> f64 {
        self.timing().time_s(index)
    }

    /// Frame-index to time mapping of this sequence
    pub fn timing(&self) -> FrameTiming {
        FrameTiming {
            hop_size: self.hop_size,
            sample_rate: self.buffer.sample_rate(),
            total_samples: self.buffer.len(),
        }
    }

    /// Iterate frames in order
    pub fn iter(&self) -> impl Iterator<Item = &'a [f32]> + 'a {
        let samples = self.buffer.samples();
        let (frame_size, hop_size) = (self.frame_size, self.hop_size);
        (0..self.len).map(move |i| &samples[i * hop_size..i * hop_size + frame_size])
    }
}

/// Maps frame indices to seconds: `index * hop_size / sample_rate`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTiming {
    /// Samples between frame starts
    pub hop_size: usize,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Length of the framed buffer
    pub total_samples: usize,
}

impl FrameTiming {
    /// Start time of frame `index`
    pub fn time_s(&self, index: usize) -> f64 {
        (index * self.hop_size) as f64 / self.sample_rate as f64
    }

    /// End of the framed buffer, the same value as `AudioBuffer::duration_secs`
    pub fn end_s(&self) -> f64 {
        self.total_samples as f64 / self.sample_rate as f64
    }
}

/// `floor((len - frame) / hop) + 1`, or 0 when `len < frame`
pub fn frame_count(len: usize, frame_size: usize, hop_size: usize) -> usize {
    if len < frame_size {
        0
    } else {
        (len - frame_size) / hop_size + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(len: usize) -> AudioBuffer {
        AudioBuffer::new((0..len).map(|i| i as f32).collect(), 100).unwrap()
    }

    #[test]
    fn test_frame_count_formula() {
        for (len, frame, hop) in [(10, 4, 2), (11, 4, 2), (4, 4, 1), (88200, 2048, 512), (1000, 300, 300)] {
            let buffer = ramp(len);
            let frames = FrameSequence::new(&buffer, frame, hop).unwrap();
            assert_eq!(frames.len(), (len - frame) / hop + 1);
            assert_eq!(frames.iter().count(), frames.len());
        }
    }

    #[test]
    fn test_short_buffer_has_no_frames() {
        let buffer = ramp(3);
        let frames = FrameSequence::new(&buffer, 4, 2).unwrap();
        assert!(frames.is_empty());
        assert!(frames.get(0).is_none());
    }

    #[test]
    fn test_frame_contents_and_timing() {
        let buffer = ramp(10);
        let frames = FrameSequence::new(&buffer, 4, 3).unwrap();

        assert_eq!(frames.len(), 3);
        assert_eq!(frames.get(1).unwrap(), &[3.0, 4.0, 5.0, 6.0]);
        assert_eq!(frames.get(2).unwrap(), &[6.0, 7.0, 8.0, 9.0]);
        assert!((frames.frame_time_s(2) - 0.06).abs() < 1e-12);
        assert_eq!(frames.timing().end_s(), buffer.duration_secs());
        assert!(frames.timing().end_s() >= frames.frame_time_s(frames.len()));
    }

    #[test]
    fn test_invalid_parameters() {
        let buffer = ramp(10);
        assert!(matches!(
            FrameSequence::new(&buffer, 0, 1),
            Err(ProsodyError::InvalidParameter(_))
        ));
        assert!(FrameSequence::new(&buffer, 4, 0).is_err());
        assert!(FrameSequence::new(&buffer, 4, 5).is_err());
    }
}
