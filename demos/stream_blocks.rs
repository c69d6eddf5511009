//! Block Streaming Example
//!
//! This example streams a synthetic signal in overlapping blocks:
//! - Generating a chirp in memory
//! - Streaming it block by block
//! - Walking the frames of each block
//! - Checking the frame count against whole-signal framing

use blockstream::frame;
use blockstream::io;
use blockstream::source::MemorySource;
use blockstream::stream::{BlockStream, StreamConfig};
use log::info;

fn main() {
    env_logger::init();
    info!("Block Streaming Example");

    let sr = 22050;
    let signal = io::chirp(55.0, 8000.0, sr, 5.0);
    info!("Generated {} samples\n", signal.len());

    let frame_length = 2048;
    let hop_length = 512;
    let block_length = 32;
    let config = StreamConfig::new(block_length, frame_length, hop_length);
    info!("Block geometry");
    info!("  - Samples per block: {}", config.block_samples());
    info!("  - Advance per block: {}", config.block_advance());
    info!("  - Overlap: {}", config.overlap());

    let stream = BlockStream::<_, f32>::new(MemorySource::mono(signal.clone(), sr), config).unwrap();

    let mut n_frames = 0;
    for (j, block) in stream.enumerate() {
        let block = block.unwrap();
        let frames = frame::frame(block.row(0).as_slice().unwrap(), frame_length, hop_length).unwrap();
        let rms: f32 = (block.iter().map(|x| x * x).sum::<f32>() / block.len() as f32).sqrt();
        info!(
            "Block {j}: {} samples, {} frames, rms {rms:.3}",
            block.ncols(),
            frames.ncols()
        );
        n_frames += frames.ncols();
    }

    let whole = frame::frame_count(signal.len(), frame_length, hop_length);
    info!("Streamed frames: {n_frames}, whole-signal frames: {whole}");
}
