//! Edge case tests for boundary conditions and unusual inputs.
//!
//! Tests cover:
//! - Empty and single-sample sources
//! - Signals exactly one frame or one block long
//! - Blocks larger than the whole signal
//! - Geometry where frames touch or leave gaps

use blockstream::frame;
use blockstream::source::MemorySource;
use blockstream::stream::{BlockStream, StreamConfig};
use ndarray::Array2;

fn ramp(n: usize) -> Vec<f32> {
    (0..n).map(|i| i as f32).collect()
}

fn blocks(y: Vec<f32>, config: StreamConfig) -> Vec<Array2<f32>> {
    BlockStream::<_, f32>::new(MemorySource::mono(y, 22050), config)
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

// Empty / tiny sources

#[test]
fn empty_source() {
    assert!(blocks(Vec::new(), StreamConfig::new(4, 16, 4)).is_empty());
}

#[test]
fn empty_source_with_fill() {
    let cfg = StreamConfig::new(4, 16, 4).with_fill_value(0.0);
    assert!(blocks(Vec::new(), cfg).is_empty());
}

#[test]
fn single_sample_with_unit_frame() {
    let out = blocks(vec![0.5], StreamConfig::new(1, 1, 1));
    assert_eq!(out.len(), 1);
    assert_eq!(out[0][(0, 0)], 0.5);
}

#[test]
fn single_sample_too_short_for_frame() {
    assert!(blocks(vec![0.5], StreamConfig::new(1, 2, 1)).is_empty());
}

// Exact fits

#[test]
fn signal_exactly_one_frame() {
    let out = blocks(ramp(64), StreamConfig::new(8, 64, 16));
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].ncols(), 64);
}

#[test]
fn signal_exactly_one_block() {
    let cfg = StreamConfig::new(8, 64, 16);
    let n = cfg.block_samples();
    let out = blocks(ramp(n), cfg);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].ncols(), n);
}

#[test]
fn block_larger_than_signal() {
    // 10 frames fit, block holds 100
    let out = blocks(ramp(64 + 9 * 16 + 7), StreamConfig::new(100, 64, 16));
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].ncols(), 64 + 9 * 16);
}

// Geometry

#[test]
fn hop_equal_to_frame_tiles_signal() {
    let out = blocks(ramp(100), StreamConfig::new(3, 10, 10));
    let joined: Vec<f32> = out.iter().flat_map(|b| b.row(0).to_vec()).collect();
    assert_eq!(joined, ramp(100));
}

#[test]
fn unit_hop_block_of_one_frame() {
    let y = ramp(20);
    let out = blocks(y.clone(), StreamConfig::new(1, 5, 1));
    assert_eq!(out.len(), frame::frame_count(20, 5, 1));
    for (k, b) in out.iter().enumerate() {
        assert_eq!(b.row(0).to_vec(), y[k..k + 5].to_vec());
    }
}

#[test]
fn hop_larger_than_frame_skips_gap_samples() {
    let out = blocks(ramp(100), StreamConfig::new(1, 3, 10));
    assert_eq!(out.len(), 10);
    for (k, b) in out.iter().enumerate() {
        assert_eq!(b.row(0).to_vec(), vec![(10 * k) as f32, (10 * k + 1) as f32, (10 * k + 2) as f32]);
    }
}

// Long inputs (simulated)

#[test]
fn long_signal_in_small_blocks() {
    // 60 seconds at 22050 Hz
    let n = 22050 * 60;
    let cfg = StreamConfig::new(16, 2048, 512);
    let expected = cfg.expected_blocks(n);
    let mut stream =
        BlockStream::<_, f32>::new(MemorySource::mono(vec![0.1; n], 22050), cfg).unwrap();
    let mut count = 0;
    for block in stream.by_ref() {
        assert!(block.unwrap().ncols() <= 2048 + 15 * 512);
        count += 1;
    }
    assert_eq!(count, expected);
    assert_eq!(stream.blocks_emitted(), expected);
    assert_eq!(stream.into_source().remaining(), 0);
}
