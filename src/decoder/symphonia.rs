use crate::error::{ProsodyError, ProsodyResult};
use log::{debug, warn};
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Symphonia-based decoder for every container and codec it supports
pub struct SymphoniaDecoder {
    reader: Box<dyn FormatReader>,
    decoder: Box<dyn symphonia::core::codecs::Decoder>,
    track_id: u32,
    sample_rate: u32,
    channels: u16,
    finished: bool,
}

impl SymphoniaDecoder {
    /// Open and probe a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> ProsodyResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| ProsodyError::Load(format!("{}: {}", path.display(), e)))?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe().format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )?;
        let reader = probed.format;

        let track = reader
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| ProsodyError::Load("no audio track found".to_string()))?;

        let params = &track.codec_params;
        let sample_rate = params
            .sample_rate
            .ok_or_else(|| ProsodyError::Load("unknown sample rate".to_string()))?;
        let channels = params
            .channels
            .map(|c| c.count() as u16)
            .ok_or_else(|| ProsodyError::Load("unknown channel layout".to_string()))?;
        let track_id = track.id;

        let decoder =
            symphonia::default::get_codecs().make(params, &DecoderOptions::default())?;

        debug!(
            "opened {}: {} Hz, {} channel(s)",
            path.display(),
            sample_rate,
            channels
        );

        Ok(SymphoniaDecoder {
            reader,
            decoder,
            track_id,
            sample_rate,
            channels,
            finished: false,
        })
    }
}

impl super::Decoder for SymphoniaDecoder {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn decode_packet(&mut self) -> ProsodyResult<Option<Vec<f32>>> {
        while !self.finished {
            let packet = match self.reader.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    self.finished = true;
                    break;
                }
                Err(SymphoniaError::ResetRequired) => {
                    self.finished = true;
                    break;
                }
                Err(e) => return Err(e.into()),
            };

            if packet.track_id() != self.track_id {
                continue;
            }

            let decoded = match self.decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(msg)) => {
                    warn!("skipping corrupt packet: {msg}");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            if decoded.frames() == 0 {
                continue;
            }

            let mut samples = SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec());
            samples.copy_interleaved_ref(decoded);
            return Ok(Some(samples.samples().to_vec()));
        }
        Ok(None)
    }
}
