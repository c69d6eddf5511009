//! Block-based streaming of long audio signals.
//!
//! `blockstream` reads audio incrementally and hands it out as overlapping
//! blocks of samples, each covering a fixed number of analysis frames.
//! Running frame-based analysis (STFT and friends) on every block with
//! `center = false` reproduces exactly the frames of analyzing the whole
//! signal at once, while memory stays bounded by a single block.
//!
//! # Quick Start
//!
//! ```rust
//! use blockstream::{io, source::MemorySource, stream::{BlockStream, StreamConfig}};
//!
//! // 2 seconds of a 440 Hz tone at 22050 Hz
//! let signal = io::tone(440.0, 22050, 2.0);
//! let source = MemorySource::mono(signal, 22050);
//!
//! // 16 frames of 2048 samples, hopping by 512, per block
//! let config = StreamConfig::new(16, 2048, 512);
//! let stream = BlockStream::<_, f32>::new(source, config).unwrap();
//!
//! for block in stream {
//!     let block = block.unwrap();
//!     assert!(block.ncols() <= 2048 + 15 * 512);
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`stream`] | `BlockStream`, `StreamConfig`, per-frame `Frames` adapter |
//! | [`source`] | `SampleSource` trait; WAV, symphonia and in-memory sources |
//! | [`frame`] | Whole-signal framing, the reference streamed frames agree with |
//! | [`io`] | Metadata queries, `open`/`stream` by path, WAV writing, generators |
//! | [`sample`] | Block element types (`f32`, `f64`) |
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T>`], an alias for
//! `std::result::Result<T, Error>`. Configuration problems are reported
//! before the source is read; a read failure ends the stream after being
//! yielded once. Nothing is retried.
//!
//! # Not supported while streaming
//!
//! Resampling and centered framing both need the whole signal and are
//! rejected with [`Error::UnsupportedOperation`].

#![deny(unsafe_code)]

pub mod error;
pub use error::{Error, Result};

pub mod frame;
pub mod io;
pub mod sample;
pub mod source;
pub mod stream;

pub use source::{AudioSpec, SampleSource};
pub use stream::{BlockStream, Frames, StreamConfig};
