//! Sequential sample sources that a [`BlockStream`](crate::stream::BlockStream)
//! pulls from.
//!
//! A source hands out interleaved `f32` samples in order and can only move
//! forward. Decoding lives behind this trait: [`WavSource`] wraps `hound`,
//! [`DecodedSource`] wraps `symphonia`, and [`MemorySource`] serves a buffer
//! that is already in memory.

mod decoded;
mod memory;
mod wav;

pub use decoded::DecodedSource;
pub use memory::MemorySource;
pub use wav::WavSource;

use symphonia::core::errors::Error as SymphoniaError;

/// Frames read per chunk by the default [`SampleSource::skip`].
const SKIP_CHUNK_FRAMES: usize = 1024;

/// Format information reported by a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioSpec {
    pub sample_rate: u32,
    pub channels: u16,
    /// Total frames (samples per channel), when the container reports it.
    pub frames: Option<u64>,
}

impl AudioSpec {
    /// Duration in seconds, when the frame count is known.
    pub fn duration(&self) -> Option<f64> {
        if self.sample_rate == 0 {
            return None;
        }
        self.frames
            .map(|frames| frames as f64 / self.sample_rate as f64)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("hound error: {0}")]
    Hound(#[from] hound::Error),
    #[error("symphonia error: {0}")]
    Symphonia(SymphoniaError),
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("no audio track found")]
    NoAudioTrack,
    #[error("unsupported number of channels")]
    UnsupportedChannels,
    #[error("{0}")]
    Other(String),
}

impl From<SymphoniaError> for SourceError {
    fn from(err: SymphoniaError) -> Self {
        Self::Symphonia(err)
    }
}

/// A forward-only supply of interleaved audio samples.
pub trait SampleSource {
    /// Format of the samples this source produces.
    fn spec(&self) -> AudioSpec;

    /// Read interleaved samples into `out`.
    ///
    /// `out` may have any length. Each read continues where the previous one
    /// stopped, so a read can begin or end in the middle of a frame. Returns
    /// the number of samples written; `0` means the source is exhausted.
    /// Short reads are allowed, so callers loop until they have what they
    /// need.
    fn read(&mut self, out: &mut [f32]) -> Result<usize, SourceError>;

    /// Discard up to `samples` interleaved samples, returning how many were
    /// actually skipped.
    fn skip(&mut self, samples: usize) -> Result<usize, SourceError> {
        let channels = self.spec().channels.max(1) as usize;
        let mut scratch = vec![0.0f32; (SKIP_CHUNK_FRAMES * channels).min(samples)];
        let mut skipped = 0;
        while skipped < samples {
            let want = (samples - skipped).min(scratch.len());
            let n = self.read(&mut scratch[..want])?;
            if n == 0 {
                break;
            }
            skipped += n;
        }
        Ok(skipped)
    }
}

impl<S: SampleSource + ?Sized> SampleSource for Box<S> {
    fn spec(&self) -> AudioSpec {
        (**self).spec()
    }

    fn read(&mut self, out: &mut [f32]) -> Result<usize, SourceError> {
        (**self).read(out)
    }

    fn skip(&mut self, samples: usize) -> Result<usize, SourceError> {
        (**self).skip(samples)
    }
}
