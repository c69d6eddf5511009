use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use hound::{SampleFormat, WavReader};

use super::{AudioSpec, SampleSource, SourceError};

/// Incremental WAV decoding through `hound`.
///
/// Integer PCM is scaled by `2^(bits - 1)` into `[-1, 1)`; 32-bit float PCM
/// is passed through unchanged.
pub struct WavSource<R: Read> {
    reader: WavReader<R>,
    spec: AudioSpec,
    sample_format: SampleFormat,
    bits_per_sample: u16,
}

impl WavSource<BufReader<File>> {
    /// Open a WAV file for streaming.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        Self::new(WavReader::open(path)?)
    }
}

impl<R: Read> WavSource<R> {
    /// Read WAV data from any byte stream, e.g. a socket or a `Cursor`.
    pub fn from_reader(reader: R) -> Result<Self, SourceError> {
        Self::new(WavReader::new(reader)?)
    }

    fn new(reader: WavReader<R>) -> Result<Self, SourceError> {
        let wav = reader.spec();
        if wav.channels == 0 {
            return Err(SourceError::UnsupportedChannels);
        }
        Ok(Self {
            spec: AudioSpec {
                sample_rate: wav.sample_rate,
                channels: wav.channels,
                frames: Some(reader.duration() as u64),
            },
            sample_format: wav.sample_format,
            bits_per_sample: wav.bits_per_sample,
            reader,
        })
    }
}

fn fill<R, S>(
    reader: &mut WavReader<R>,
    out: &mut [f32],
    convert: impl Fn(S) -> f32,
) -> Result<usize, SourceError>
where
    R: Read,
    S: hound::Sample,
{
    let mut written = 0;
    // `out` drives the zip so no sample is pulled past the end of the buffer
    for (slot, sample) in out.iter_mut().zip(reader.samples::<S>()) {
        *slot = convert(sample?);
        written += 1;
    }
    Ok(written)
}

impl<R: Read> SampleSource for WavSource<R> {
    fn spec(&self) -> AudioSpec {
        self.spec
    }

    fn read(&mut self, out: &mut [f32]) -> Result<usize, SourceError> {
        match (self.sample_format, self.bits_per_sample) {
            (SampleFormat::Float, 32) => fill(&mut self.reader, out, |s: f32| s),
            (SampleFormat::Int, bits) if bits <= 16 => {
                let scale = (1i32 << (bits - 1)) as f32;
                fill(&mut self.reader, out, |s: i16| s as f32 / scale)
            }
            (SampleFormat::Int, bits) => {
                let scale = (1i64 << (bits - 1)) as f32;
                fill(&mut self.reader, out, |s: i32| s as f32 / scale)
            }
            (SampleFormat::Float, bits) => Err(SourceError::Other(format!(
                "unsupported float sample width: {bits} bits"
            ))),
        }
    }
}
