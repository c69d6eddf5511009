//! File-level entry points: metadata queries, opening sources, and small
//! signal utilities.

use hound::{SampleFormat, WavSpec, WavWriter};
use log::debug;
use ndarray::Array2;
use std::path::Path;

use crate::source::{AudioSpec, DecodedSource, SampleSource, SourceError, WavSource};
use crate::stream::{BlockStream, StreamConfig};

/// Container hint taken from the file name, e.g. `"flac"` for `Track.FLAC`.
///
/// [`open`] uses it to route `.wav` to [`WavSource`]; any other hint, or
/// none, falls through to [`DecodedSource`].
pub fn detect_format<P: AsRef<Path>>(path: P) -> Option<String> {
    let ext = path.as_ref().extension()?;
    Some(ext.to_string_lossy().to_lowercase())
}

/// Open an audio file as a sample source.
///
/// `.wav` files go through `hound`; everything else is detected and decoded by
/// `symphonia`.
pub fn open<P: AsRef<Path>>(path: P) -> crate::Result<Box<dyn SampleSource>> {
    let path = path.as_ref();
    let source: Box<dyn SampleSource> = match detect_format(path).as_deref() {
        Some("wav") => Box::new(WavSource::open(path)?),
        _ => Box::new(DecodedSource::open(path)?),
    };
    Ok(source)
}

/// Read the format of an audio file without decoding its samples.
pub fn info<P: AsRef<Path>>(path: P) -> crate::Result<AudioSpec> {
    Ok(open(path)?.spec())
}

/// Native sampling rate of an audio file.
pub fn get_samplerate<P: AsRef<Path>>(path: P) -> crate::Result<u32> {
    Ok(info(path)?.sample_rate)
}

/// Duration of an audio file in seconds.
///
/// Uses the container's frame count when available; otherwise the file is
/// decoded once, in bounded memory, to count frames.
pub fn get_duration<P: AsRef<Path>>(path: P) -> crate::Result<f64> {
    let mut source = open(path)?;
    let spec = source.spec();
    if let Some(duration) = spec.duration() {
        return Ok(duration);
    }

    debug!("frame count unknown, counting by decoding");
    let channels = spec.channels.max(1) as usize;
    let mut buf = vec![0.0f32; 4096 * channels];
    let mut samples = 0usize;
    loop {
        let n = source.read(&mut buf)?;
        if n == 0 {
            break;
        }
        samples += n;
    }
    if spec.sample_rate == 0 {
        return Err(SourceError::Other("source reports a 0 Hz sample rate".into()).into());
    }
    Ok((samples / channels) as f64 / spec.sample_rate as f64)
}

/// Stream an audio file in overlapping blocks.
///
/// # Example
/// ```no_run
/// use blockstream::io;
/// use blockstream::stream::StreamConfig;
///
/// let config = StreamConfig::new(256, 4096, 1024);
/// for block in io::stream("long_recording.flac", config).unwrap() {
///     let block = block.unwrap();
///     println!("block shape: {:?}", block.shape());
/// }
/// ```
pub fn stream<P: AsRef<Path>>(
    path: P,
    config: StreamConfig,
) -> crate::Result<BlockStream<Box<dyn SampleSource>, f32>> {
    // reject bad parameters before touching the file
    config.validate()?;
    BlockStream::new(open(path)?, config)
}

/// Convert multi-channel audio to mono by averaging channels.
pub fn to_mono(data: &Array2<f32>) -> Array2<f32> {
    let channels = data.nrows();
    if channels <= 1 {
        return data.clone();
    }
    data.mean_axis(ndarray::Axis(0))
        .map(|mean| mean.insert_axis(ndarray::Axis(0)))
        .unwrap_or_else(|| Array2::zeros((1, data.ncols())))
}

/// Save audio data to a 16-bit PCM WAV file.
///
/// `data` has shape `(channels, frames)`. Samples are clipped to
/// `[-1.0, 1.0]` before quantization.
pub fn save_wav<P: AsRef<Path>>(
    path: P,
    data: &Array2<f32>,
    sample_rate: u32,
) -> crate::Result<()> {
    let (channels, frames) = data.dim();
    let spec = WavSpec {
        channels: channels as u16,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec).map_err(SourceError::Hound)?;
    for frame in 0..frames {
        for ch in 0..channels {
            let sample = data[(ch, frame)].clamp(-1.0, 1.0);
            writer
                .write_sample((sample * i16::MAX as f32) as i16)
                .map_err(SourceError::Hound)?;
        }
    }
    writer.finalize().map_err(SourceError::Hound)?;
    Ok(())
}

/// Unit-amplitude sine of `duration` seconds at `frequency` Hz.
///
/// Handy as a known signal for a [`MemorySource`](crate::source::MemorySource)
/// or, through [`save_wav`], as a file fixture to stream back.
pub fn tone(frequency: f32, sr: u32, duration: f32) -> Vec<f32> {
    let step = std::f32::consts::TAU * frequency / sr as f32;
    let len = (duration * sr as f32) as usize;
    (0..len).map(|n| (n as f32 * step).sin()).collect()
}

/// Generate a logarithmic chirp from `f0` to `f1` Hz.
pub fn chirp(f0: f32, f1: f32, sr: u32, duration: f32) -> Vec<f32> {
    let n_samples = (duration * sr as f32) as usize;
    let log_f = (f1 / f0).ln() / duration;
    (0..n_samples)
        .map(|i| {
            let t = i as f32 / sr as f32;
            let phase = 2.0 * std::f32::consts::PI * f0 * ((log_f * t).exp() - 1.0) / log_f;
            phase.sin()
        })
        .collect()
}
