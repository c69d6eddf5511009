//! Block streaming over long signals.
//!
//! A [`BlockStream`] pulls samples from a [`SampleSource`] and yields
//! fixed-size blocks of `block_length` frames each. Consecutive blocks
//! overlap by `frame_length - hop_length` samples, so framing every block
//! with `center = false` gives exactly the frames of the whole signal:
//!
//! ```text
//! block j starts at   j * block_length * hop_length
//! block length        frame_length + (block_length - 1) * hop_length
//! ```
//!
//! Only one block worth of samples is held at a time; nothing is read until
//! the consumer asks for the next block.

use std::iter::FusedIterator;
use std::marker::PhantomData;

use log::{debug, trace, warn};
use ndarray::{Array2, s};

use crate::frame::frame_count;
use crate::sample::Sample;
use crate::source::{AudioSpec, SampleSource, SourceError};
use crate::{Error, Result};

/// Frames requested from the source per read while filling a window.
const READ_CHUNK_FRAMES: usize = 8192;

/// Configuration for [`BlockStream`].
#[derive(Debug, Clone, PartialEq)]
pub struct StreamConfig {
    /// Frames per emitted block.
    pub block_length: usize,
    /// Samples per analysis frame.
    pub frame_length: usize,
    /// Samples between consecutive frame starts.
    pub hop_length: usize,
    /// Pad a short final block with this value up to a whole-frame boundary.
    /// `None` drops the trailing partial frame instead.
    pub fill_value: Option<f32>,
    /// Average all channels into one.
    pub mono: bool,
    /// Seconds to skip before the first block.
    pub offset: Option<f64>,
    /// Maximum seconds to read after `offset`.
    pub duration: Option<f64>,
    /// Centered framing. Always rejected; present so callers porting
    /// centered analysis get an explicit error instead of shifted frames.
    pub center: bool,
    /// Expected sampling rate. Must match the source, since streams never
    /// resample.
    pub sample_rate: Option<u32>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            block_length: 256,
            frame_length: 4096,
            hop_length: 1024,
            fill_value: None,
            mono: true,
            offset: None,
            duration: None,
            center: false,
            sample_rate: None,
        }
    }
}

impl StreamConfig {
    pub fn new(block_length: usize, frame_length: usize, hop_length: usize) -> Self {
        Self {
            block_length,
            frame_length,
            hop_length,
            ..Default::default()
        }
    }

    pub fn with_fill_value(mut self, fill_value: f32) -> Self {
        self.fill_value = Some(fill_value);
        self
    }

    pub fn with_mono(mut self, mono: bool) -> Self {
        self.mono = mono;
        self
    }

    pub fn with_offset(mut self, seconds: f64) -> Self {
        self.offset = Some(seconds);
        self
    }

    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn with_center(mut self, center: bool) -> Self {
        self.center = center;
        self
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = Some(sample_rate);
        self
    }

    /// Samples per full block: `frame_length + (block_length - 1) * hop_length`.
    pub fn block_samples(&self) -> usize {
        self.frame_length + (self.block_length.saturating_sub(1)) * self.hop_length
    }

    /// Distance between consecutive block starts: `block_length * hop_length`.
    pub fn block_advance(&self) -> usize {
        self.block_length * self.hop_length
    }

    /// Samples shared by adjacent blocks. Negative when `hop_length >
    /// frame_length`, in which case that many samples between blocks belong
    /// to no frame.
    pub fn overlap(&self) -> isize {
        self.frame_length as isize - self.hop_length as isize
    }

    /// First sample of block `index`.
    pub fn block_start(&self, index: usize) -> usize {
        index * self.block_advance()
    }

    /// Number of blocks a stream over `total_samples` samples yields.
    pub fn expected_blocks(&self, total_samples: usize) -> usize {
        if self.block_length == 0 || self.hop_length == 0 {
            return 0;
        }
        let full = frame_count(total_samples, self.frame_length, self.hop_length);
        let partial = self.fill_value.is_some() && has_uncovered_tail(self, total_samples, full);
        (full + partial as usize).div_ceil(self.block_length)
    }

    /// Check the parameters on their own, before any source is touched.
    pub fn validate(&self) -> Result<()> {
        if self.frame_length == 0 {
            return Err(Error::config("frame_length", 0, "must be > 0"));
        }
        if self.hop_length == 0 {
            return Err(Error::config("hop_length", 0, "must be > 0"));
        }
        if self.block_length == 0 {
            return Err(Error::config("block_length", 0, "must be >= 1"));
        }
        let block_samples = (self.block_length - 1)
            .checked_mul(self.hop_length)
            .and_then(|n| n.checked_add(self.frame_length));
        let block_advance = self.block_length.checked_mul(self.hop_length);
        if block_samples.is_none() || block_advance.is_none() {
            return Err(Error::config(
                "block_length",
                self.block_length,
                "block size overflows usize",
            ));
        }
        if self.center {
            if self.hop_length > self.frame_length {
                return Err(Error::config(
                    "center",
                    true,
                    format!(
                        "hop_length ({}) exceeds frame_length ({}); centered frames cannot be split into blocks",
                        self.hop_length, self.frame_length
                    ),
                ));
            }
            return Err(Error::UnsupportedOperation {
                operation: "center",
                reason: "centered framing pads both ends of the whole signal; frame blocks with center = false".into(),
            });
        }
        for (name, value) in [("offset", self.offset), ("duration", self.duration)] {
            if let Some(v) = value
                && !(v.is_finite() && v >= 0.0)
            {
                return Err(Error::config(name, v, "must be a finite, non-negative number of seconds"));
            }
        }
        Ok(())
    }

    fn check_source(&self, spec: &AudioSpec) -> Result<()> {
        if spec.channels == 0 {
            return Err(SourceError::UnsupportedChannels.into());
        }
        if let Some(sr) = self.sample_rate
            && sr != spec.sample_rate
        {
            return Err(Error::UnsupportedOperation {
                operation: "resample",
                reason: format!(
                    "requested {sr} Hz but the source is {} Hz; resampling needs whole-signal lookahead",
                    spec.sample_rate
                ),
            });
        }
        Ok(())
    }
}

/// Whether `total` samples leave real samples after the last of `full`
/// whole frames that a padded frame would pick up.
fn has_uncovered_tail(config: &StreamConfig, total: usize, full: usize) -> bool {
    let covered = if full > 0 {
        config.frame_length + (full - 1) * config.hop_length
    } else {
        0
    };
    total > covered.max(full * config.hop_length)
}

fn seconds_to_frames(seconds: Option<f64>, sample_rate: u32) -> Option<usize> {
    seconds.map(|s| (s * sample_rate as f64) as usize)
}

/// Lazy iterator of overlapping sample blocks.
///
/// Each item is an array of shape `(channels, samples)`, or `(1, samples)`
/// with `mono`. Full blocks have [`StreamConfig::block_samples`] samples; a
/// final block may be shorter but always holds whole frames.
///
/// A source error is yielded once as `Err`, after which the stream is
/// finished. Dropping the stream releases the source.
///
/// # Example
/// ```
/// use blockstream::source::MemorySource;
/// use blockstream::stream::{BlockStream, StreamConfig};
///
/// let signal: Vec<f32> = (0..300).map(|i| i as f32).collect();
/// let source = MemorySource::mono(signal, 22050);
/// let config = StreamConfig::new(3, 100, 25);
///
/// let blocks: Vec<_> = BlockStream::<_, f32>::new(source, config)
///     .unwrap()
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(blocks[0].shape(), &[1, 150]);
/// assert_eq!(blocks[1][(0, 0)], 75.0);
/// ```
pub struct BlockStream<S, T = f32> {
    source: S,
    config: StreamConfig,
    spec: AudioSpec,
    channels: usize,
    block_samples: usize,
    block_advance: usize,
    /// Interleaved length of a full window.
    window_len: usize,
    /// Interleaved samples of the current window.
    buffer: Vec<f32>,
    /// Interleaved samples to skip before the first block.
    offset_samples: Option<usize>,
    /// Frames still allowed by `duration`.
    remaining: Option<usize>,
    started: bool,
    /// The last window came up short, so the source is drained.
    exhausted: bool,
    finished: bool,
    blocks_emitted: usize,
    _sample: PhantomData<T>,
}

impl<S: SampleSource, T: Sample> BlockStream<S, T> {
    /// Validate `config` against `source` and prepare the stream.
    ///
    /// Nothing is read from the source here; configuration errors are
    /// reported before the first read.
    pub fn new(source: S, config: StreamConfig) -> Result<Self> {
        config.validate()?;
        let spec = source.spec();
        config.check_source(&spec)?;

        let channels = spec.channels as usize;
        let block_samples = config.block_samples();
        let block_advance = config.block_advance();
        // a window must be addressable as one allocation
        let window_len = block_samples
            .checked_mul(channels)
            .filter(|&n| n <= isize::MAX as usize / std::mem::size_of::<f32>())
            .ok_or_else(|| {
                Error::config(
                    "block_length",
                    config.block_length,
                    format!("{block_samples} samples x {channels} channels cannot be buffered"),
                )
            })?;
        debug!(
            "streaming {} Hz x {} ch: {} samples per block, advance {}, overlap {}",
            spec.sample_rate,
            channels,
            block_samples,
            block_advance,
            config.overlap()
        );

        Ok(Self {
            remaining: seconds_to_frames(config.duration, spec.sample_rate),
            offset_samples: seconds_to_frames(config.offset, spec.sample_rate)
                .map(|frames| frames.saturating_mul(channels)),
            buffer: Vec::new(),
            window_len,
            source,
            config,
            spec,
            channels,
            block_samples,
            block_advance,
            started: false,
            exhausted: false,
            finished: false,
            blocks_emitted: 0,
            _sample: PhantomData,
        })
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Format of the underlying source.
    pub fn spec(&self) -> AudioSpec {
        self.spec
    }

    pub fn block_samples(&self) -> usize {
        self.block_samples
    }

    pub fn block_advance(&self) -> usize {
        self.block_advance
    }

    pub fn blocks_emitted(&self) -> usize {
        self.blocks_emitted
    }

    /// Interleaved capacity of the window buffer. It grows with the samples
    /// actually read and never exceeds `block_samples * channels`.
    pub fn buffer_capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Give the source back, e.g. to inspect its position.
    pub fn into_source(self) -> S {
        self.source
    }

    /// Yield individual analysis frames instead of blocks.
    pub fn frames(self) -> Frames<S, T> {
        Frames {
            blocks: self,
            current: None,
            index: 0,
            count: 0,
        }
    }

    /// Skip `frames` frames, honouring the duration limit.
    fn skip_frames(&mut self, frames: usize) -> Result<()> {
        let frames = self.remaining.map_or(frames, |r| r.min(frames));
        if frames == 0 {
            return Ok(());
        }
        let skipped = self.source.skip(frames.saturating_mul(self.channels))? / self.channels;
        if let Some(r) = self.remaining.as_mut() {
            *r -= skipped.min(*r);
        }
        Ok(())
    }

    /// Grow the buffer to hold `end` samples, doubling but never past one
    /// full window.
    fn reserve_window(&mut self, end: usize) {
        if end > self.buffer.capacity() {
            let cap = end.max(self.buffer.capacity() * 2).min(self.window_len);
            self.buffer.reserve_exact(cap - self.buffer.len());
        }
    }

    /// Top the window up to `block_samples` frames from the source.
    fn fill(&mut self) -> Result<()> {
        let start = self.buffer.len();
        let mut target = self.window_len;
        if let Some(r) = self.remaining {
            target = target.min(start.saturating_add(r.saturating_mul(self.channels)));
        }
        let mut filled = start;
        while filled < target {
            let end = target.min(filled + READ_CHUNK_FRAMES * self.channels);
            self.reserve_window(end);
            self.buffer.resize(end, 0.0);
            let n = self.source.read(&mut self.buffer[filled..end])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        // drop a dangling partial frame
        filled -= filled % self.channels;
        self.buffer.truncate(filled);
        if let Some(r) = self.remaining.as_mut() {
            *r -= ((filled - start) / self.channels).min(*r);
        }
        Ok(())
    }

    /// Move the window forward by one block advance.
    fn advance(&mut self) -> Result<()> {
        let held = self.buffer.len() / self.channels;
        if held >= self.block_advance {
            self.buffer.drain(..self.block_advance * self.channels);
            Ok(())
        } else {
            self.buffer.clear();
            self.skip_frames(self.block_advance - held)
        }
    }

    /// Samples of the current window to emit, given `available` real
    /// samples. Zero means nothing is left to emit.
    fn emit_length(&self, available: usize) -> usize {
        let cfg = &self.config;
        if available == self.block_samples {
            return available;
        }
        let whole = frame_count(available, cfg.frame_length, cfg.hop_length);
        let padded = cfg.fill_value.is_some() && {
            // the previous block's last frame reaches `frame_length -
            // hop_length` samples into this window
            let covered = if whole > 0 {
                cfg.frame_length + (whole - 1) * cfg.hop_length
            } else if self.blocks_emitted == 0 {
                0
            } else {
                cfg.frame_length.saturating_sub(cfg.hop_length)
            };
            available > covered.max(whole * cfg.hop_length)
        };
        match (whole, padded) {
            (0, false) => 0,
            (n, false) => cfg.frame_length + (n - 1) * cfg.hop_length,
            (n, true) => cfg.frame_length + n * cfg.hop_length,
        }
    }

    fn build_block(&self, available: usize, length: usize) -> Array2<T> {
        let fill = self.config.fill_value.unwrap_or(0.0);
        let channels = self.channels;
        let buffer = &self.buffer;
        let at = |ch: usize, i: usize| {
            if i < available {
                buffer[i * channels + ch]
            } else {
                fill
            }
        };

        if self.config.mono && channels > 1 {
            Array2::from_shape_fn((1, length), |(_, i)| {
                let sum: f32 = (0..channels).map(|ch| at(ch, i)).sum();
                T::from_f32(sum / channels as f32)
            })
        } else {
            Array2::from_shape_fn((channels, length), |(ch, i)| T::from_f32(at(ch, i)))
        }
    }

    fn next_block(&mut self) -> Result<Option<Array2<T>>> {
        if self.exhausted {
            return Ok(None);
        }
        if self.started {
            self.advance()?;
        } else {
            self.started = true;
            if let Some(samples) = self.offset_samples {
                let skipped = self.source.skip(samples)? / self.channels;
                debug!("skipped {skipped} frames of offset");
            }
        }

        self.fill()?;
        let available = self.buffer.len() / self.channels;
        if available < self.block_samples {
            self.exhausted = true;
        }

        let length = self.emit_length(available);
        if length == 0 {
            return Ok(None);
        }
        let block = self.build_block(available, length);
        trace!(
            "block {} at sample {}: {} samples",
            self.blocks_emitted,
            self.config.block_start(self.blocks_emitted),
            length
        );
        self.blocks_emitted += 1;
        Ok(Some(block))
    }
}

impl<S: SampleSource, T: Sample> Iterator for BlockStream<S, T> {
    type Item = Result<Array2<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_block() {
            Ok(Some(block)) => Some(Ok(block)),
            Ok(None) => {
                self.finished = true;
                debug!("stream exhausted after {} blocks", self.blocks_emitted);
                None
            }
            Err(e) => {
                self.finished = true;
                warn!("stream stopped after {} blocks: {e}", self.blocks_emitted);
                Some(Err(e))
            }
        }
    }
}

impl<S: SampleSource, T: Sample> FusedIterator for BlockStream<S, T> {}

/// Iterator over the analysis frames of a [`BlockStream`], in signal order.
///
/// Each item has shape `(channels, frame_length)`.
pub struct Frames<S, T = f32> {
    blocks: BlockStream<S, T>,
    current: Option<Array2<T>>,
    index: usize,
    count: usize,
}

impl<S: SampleSource, T: Sample> Iterator for Frames<S, T> {
    type Item = Result<Array2<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        let frame_length = self.blocks.config.frame_length;
        let hop_length = self.blocks.config.hop_length;
        loop {
            if let Some(block) = &self.current
                && self.index < self.count
            {
                let start = self.index * hop_length;
                self.index += 1;
                return Some(Ok(block.slice(s![.., start..start + frame_length]).to_owned()));
            }
            match self.blocks.next()? {
                Ok(block) => {
                    self.count = frame_count(block.ncols(), frame_length, hop_length);
                    self.index = 0;
                    self.current = Some(block);
                }
                Err(e) => {
                    self.current = None;
                    return Some(Err(e));
                }
            }
        }
    }
}

impl<S: SampleSource, T: Sample> FusedIterator for Frames<S, T> {}
