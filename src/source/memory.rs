use ndarray::Array2;

use super::{AudioSpec, SampleSource, SourceError};

/// An in-memory signal served through the [`SampleSource`] interface.
///
/// Useful for generated signals and for tests; the whole buffer is owned
/// up front, so only the stream built on top of it is bounded in memory.
#[derive(Debug, Clone)]
pub struct MemorySource {
    samples: Vec<f32>,
    spec: AudioSpec,
    pos: usize,
}

impl MemorySource {
    /// Wrap a single-channel signal.
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        let frames = samples.len() as u64;
        Self {
            samples,
            spec: AudioSpec {
                sample_rate,
                channels: 1,
                frames: Some(frames),
            },
            pos: 0,
        }
    }

    /// Wrap interleaved samples with `channels` channels.
    pub fn interleaved(
        samples: Vec<f32>,
        sample_rate: u32,
        channels: u16,
    ) -> Result<Self, SourceError> {
        if channels == 0 || samples.len() % channels as usize != 0 {
            return Err(SourceError::UnsupportedChannels);
        }
        let frames = (samples.len() / channels as usize) as u64;
        Ok(Self {
            samples,
            spec: AudioSpec {
                sample_rate,
                channels,
                frames: Some(frames),
            },
            pos: 0,
        })
    }

    /// Wrap a `(channels, frames)` array.
    pub fn from_array(data: &Array2<f32>, sample_rate: u32) -> Result<Self, SourceError> {
        let (channels, frames) = data.dim();
        let mut samples = Vec::with_capacity(channels * frames);
        for frame in 0..frames {
            for ch in 0..channels {
                samples.push(data[(ch, frame)]);
            }
        }
        Self::interleaved(samples, sample_rate, channels as u16)
    }

    /// Interleaved samples not yet read.
    pub fn remaining(&self) -> usize {
        self.samples.len() - self.pos
    }
}

impl SampleSource for MemorySource {
    fn spec(&self) -> AudioSpec {
        self.spec
    }

    fn read(&mut self, out: &mut [f32]) -> Result<usize, SourceError> {
        let n = out.len().min(self.remaining());
        out[..n].copy_from_slice(&self.samples[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }

    fn skip(&mut self, samples: usize) -> Result<usize, SourceError> {
        let n = samples.min(self.remaining());
        self.pos += n;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mono_reads_in_order() {
        let mut src = MemorySource::mono(vec![1.0, 2.0, 3.0, 4.0, 5.0], 100);
        let mut buf = [0.0f32; 2];
        assert_eq!(src.read(&mut buf).unwrap(), 2);
        assert_eq!(buf, [1.0, 2.0]);
        assert_eq!(src.skip(2).unwrap(), 2);
        assert_eq!(src.read(&mut buf).unwrap(), 1);
        assert_eq!(buf[0], 5.0);
        assert_eq!(src.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_interleaved_rejects_ragged_input() {
        assert!(MemorySource::interleaved(vec![0.0; 5], 100, 2).is_err());
        assert!(MemorySource::interleaved(vec![0.0; 4], 100, 0).is_err());
        let src = MemorySource::interleaved(vec![0.0; 6], 100, 2).unwrap();
        assert_eq!(src.spec().frames, Some(3));
    }

    #[test]
    fn test_from_array_interleaves_channels() {
        let data =
            Array2::from_shape_vec((2, 3), vec![1.0, 2.0, 3.0, -1.0, -2.0, -3.0]).unwrap();
        let mut src = MemorySource::from_array(&data, 44100).unwrap();
        assert_eq!(src.spec().channels, 2);
        let mut buf = [0.0f32; 6];
        assert_eq!(src.read(&mut buf).unwrap(), 6);
        assert_eq!(buf, [1.0, -1.0, 2.0, -2.0, 3.0, -3.0]);
    }
}
