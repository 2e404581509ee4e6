use crate::core::{AudioBuffer, DecodedAudio};
use crate::error::{ProsodyError, ProsodyResult};

/// Collapse a decoded source to mono by averaging its channels
pub fn downmix(decoded: &DecodedAudio) -> ProsodyResult<AudioBuffer> {
    if decoded.samples().is_empty() {
        return Err(ProsodyError::EmptySignal);
    }
    let channels = decoded.channels() as usize;
    let samples = if channels == 1 {
        decoded.samples().to_vec()
    } else {
        average_channels(decoded.samples(), channels)
    };

    AudioBuffer::new(samples, decoded.sample_rate())
}

/// Average each interleaved group of `channels` samples
fn average_channels(input: &[f32], channels: usize) -> Vec<f32> {
    input
        .chunks_exact(channels)
        .map(|group| group.iter().sum::<f32>() / channels as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remix_stereo_to_mono() {
        // Create test stereo samples: [L1, R1, L2, R2]
        let input = vec![0.0, 1.0, 0.5, 0.5];
        let output = average_channels(&input, 2);

        // Expected: [(0+1)/2, (0.5+0.5)/2] = [0.5, 0.5]
        assert_eq!(output.len(), 2);
        assert!((output[0] - 0.5).abs() < 0.001);
        assert!((output[1] - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_downmix_three_channels() {
        let decoded = DecodedAudio::new(vec![0.3, 0.6, 0.9, -0.3, 0.0, 0.3], 8000, 3).unwrap();
        let mono = downmix(&decoded).unwrap();

        assert_eq!(mono.len(), 2);
        assert_eq!(mono.sample_rate(), 8000);
        assert!((mono.samples()[0] - 0.6).abs() < 1e-6);
        assert!(mono.samples()[1].abs() < 1e-6);
    }

    #[test]
    fn test_downmix_mono_is_copy() {
        let decoded = DecodedAudio::new(vec![0.5, 0.8], 8000, 1).unwrap();
        let mono = downmix(&decoded).unwrap();
        assert_eq!(mono.samples(), &[0.5, 0.8]);
    }

    #[test]
    fn test_downmix_empty_source() {
        let decoded = DecodedAudio::new(Vec::new(), 8000, 2).unwrap();
        assert!(matches!(downmix(&decoded), Err(ProsodyError::EmptySignal)));
    }
}
