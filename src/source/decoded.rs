use std::io::ErrorKind;
use std::path::Path;

use log::{debug, warn};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::{AudioSpec, SampleSource, SourceError};

/// Packet-by-packet decoding of any container/codec symphonia supports
/// (FLAC, MP3, OGG/Vorbis, WAV, ...).
///
/// Only the most recently decoded packet is held in memory.
pub struct DecodedSource {
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    spec: AudioSpec,
    pending: Vec<f32>,
    pending_pos: usize,
    exhausted: bool,
}

impl DecodedSource {
    /// Open an audio file, letting symphonia detect the container. The
    /// extension is used as a format hint.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        let path_ref = path.as_ref();
        let mut hint = Hint::new();
        if let Some(ext) = path_ref.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let file = std::fs::File::open(path_ref)?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());
        let opened = symphonia::default::get_probe().format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )?;

        let format = opened.format;
        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.sample_rate.is_some())
            .ok_or(SourceError::NoAudioTrack)?;

        let sample_rate = track.codec_params.sample_rate.unwrap_or(0);
        let channels = track
            .codec_params
            .channels
            .map(|c| c.count() as u16)
            .unwrap_or(0);
        if channels == 0 {
            return Err(SourceError::UnsupportedChannels);
        }
        let spec = AudioSpec {
            sample_rate,
            channels,
            frames: track.codec_params.n_frames,
        };
        let track_id = track.id;
        let decoder =
            symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

        debug!(
            "opened {} (track {track_id}, {sample_rate} Hz, {channels} ch)",
            path_ref.display()
        );

        Ok(Self {
            format,
            decoder,
            track_id,
            spec,
            pending: Vec::new(),
            pending_pos: 0,
            exhausted: false,
        })
    }

    /// Decode the next packet of our track into `pending`.
    /// Returns `false` at end of stream.
    fn decode_next(&mut self) -> Result<bool, SourceError> {
        loop {
            let packet = match self.format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::ResetRequired) => {
                    self.decoder.reset();
                    continue;
                }
                Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => {
                    return Ok(false);
                }
                Err(e) => return Err(e.into()),
            };

            if packet.track_id() != self.track_id {
                continue;
            }

            let decoded = match self.decoder.decode(&packet) {
                Ok(audio) => audio,
                Err(SymphoniaError::DecodeError(msg)) => {
                    warn!("skipping undecodable packet at ts {}: {msg}", packet.ts());
                    continue;
                }
                Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => {
                    return Ok(false);
                }
                Err(e) => return Err(e.into()),
            };

            let mut sb = SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec());
            sb.copy_interleaved_ref(decoded);
            self.pending.clear();
            self.pending.extend_from_slice(sb.samples());
            self.pending_pos = 0;
            if !self.pending.is_empty() {
                return Ok(true);
            }
        }
    }
}

impl SampleSource for DecodedSource {
    fn spec(&self) -> AudioSpec {
        self.spec
    }

    fn read(&mut self, out: &mut [f32]) -> Result<usize, SourceError> {
        let mut written = 0;
        while written < out.len() {
            if self.pending_pos == self.pending.len() {
                if self.exhausted || !self.decode_next()? {
                    self.exhausted = true;
                    break;
                }
            }
            let n = (out.len() - written).min(self.pending.len() - self.pending_pos);
            out[written..written + n]
                .copy_from_slice(&self.pending[self.pending_pos..self.pending_pos + n]);
            self.pending_pos += n;
            written += n;
        }
        Ok(written)
    }
}
