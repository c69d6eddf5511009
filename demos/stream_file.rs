//! File Streaming Example
//!
//! Streams an audio file given on the command line and reports the peak
//! level of every frame without loading the whole file.
//!
//! ```text
//! RUST_LOG=info cargo run --example stream_file -- path/to/audio.flac
//! ```

use blockstream::io;
use blockstream::stream::StreamConfig;
use log::{error, info};

fn main() {
    env_logger::init();

    let Some(path) = std::env::args().nth(1) else {
        error!("usage: stream_file <audio file>");
        std::process::exit(2);
    };

    let spec = match io::info(&path) {
        Ok(spec) => spec,
        Err(e) => {
            error!("cannot read {path}: {e}");
            std::process::exit(1);
        }
    };
    info!(
        "{path}: {} Hz, {} channels, {:?} s",
        spec.sample_rate,
        spec.channels,
        spec.duration()
    );

    let config = StreamConfig::new(64, 4096, 1024).with_sample_rate(spec.sample_rate);
    let stream = match io::stream(&path, config) {
        Ok(stream) => stream,
        Err(e) => {
            error!("cannot stream {path}: {e}");
            std::process::exit(1);
        }
    };

    let mut loudest = (0usize, 0.0f32);
    for (k, frame) in stream.frames().enumerate() {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                error!("stream stopped at frame {k}: {e}");
                std::process::exit(1);
            }
        };
        let peak = frame.iter().fold(0.0f32, |m, x| m.max(x.abs()));
        if peak > loudest.1 {
            loudest = (k, peak);
        }
    }
    info!(
        "Loudest frame: {} (t = {:.2} s), peak {:.3}",
        loudest.0,
        (loudest.0 * 1024) as f64 / spec.sample_rate as f64,
        loudest.1
    );
}
