use approx::assert_abs_diff_eq;
use blockstream::source::{DecodedSource, MemorySource, SampleSource, WavSource};
use blockstream::stream::{BlockStream, StreamConfig};
use blockstream::{Error, io};
use ndarray::Array2;

fn write_fixture(name: &str, data: &Array2<f32>, sr: u32) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!("blockstream_{name}.wav"));
    io::save_wav(&path, data, sr).unwrap();
    path
}

fn read_all<S: SampleSource>(mut source: S) -> Vec<f32> {
    let channels = source.spec().channels as usize;
    let mut out = Vec::new();
    let mut buf = vec![0.0f32; 1000 * channels];
    loop {
        let n = source.read(&mut buf).unwrap();
        if n == 0 {
            break;
        }
        out.extend_from_slice(&buf[..n]);
    }
    out
}

#[test]
fn wav_stream_matches_in_memory_stream() {
    let sr = 22050;
    let signal = io::chirp(110.0, 4000.0, sr, 1.5);
    let data = Array2::from_shape_vec((1, signal.len()), signal).unwrap();
    let path = write_fixture("wav_vs_memory", &data, sr);

    let decoded = read_all(WavSource::open(&path).unwrap());
    assert_eq!(decoded.len(), data.ncols());

    let config = StreamConfig::new(8, 2048, 512);
    let from_file: Vec<_> = io::stream(&path, config.clone())
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    let from_memory: Vec<_> = BlockStream::<_, f32>::new(MemorySource::mono(decoded, sr), config)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert!(!from_file.is_empty());
    assert_eq!(from_file, from_memory);

    let _ = std::fs::remove_file(path);
}

#[test]
fn symphonia_and_hound_agree_on_wav() {
    let sr = 16000;
    let signal = io::tone(440.0, sr, 0.5);
    let data = Array2::from_shape_vec((1, signal.len()), signal).unwrap();
    let path = write_fixture("symphonia_vs_hound", &data, sr);

    let decoded = DecodedSource::open(&path).unwrap();
    assert_eq!(decoded.spec().sample_rate, sr);
    assert_eq!(decoded.spec().channels, 1);

    let a = read_all(decoded);
    let b = read_all(WavSource::open(&path).unwrap());
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(&b) {
        assert_abs_diff_eq!(*x, *y, epsilon = 1e-3);
    }

    let _ = std::fs::remove_file(path);
}

#[test]
fn stereo_file_is_downmixed() {
    let sr = 8000;
    let left = io::tone(300.0, sr, 0.25);
    let right: Vec<f32> = left.iter().map(|x| 0.5 * x).collect();
    let n = left.len();
    let data = Array2::from_shape_fn((2, n), |(ch, i)| if ch == 0 { left[i] } else { right[i] });
    let path = write_fixture("stereo", &data, sr);

    let stereo = WavSource::open(&path).unwrap();
    assert_eq!(stereo.spec().channels, 2);
    let interleaved = read_all(stereo);
    let loaded = Array2::from_shape_fn((2, n), |(ch, i)| interleaved[i * 2 + ch]);
    let expected = io::to_mono(&loaded);

    let config = StreamConfig::new(4, 256, 128);
    let blocks: Vec<_> = io::stream(&path, config.clone())
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    for (j, block) in blocks.iter().enumerate() {
        assert_eq!(block.nrows(), 1);
        let start = config.block_start(j);
        for i in 0..block.ncols() {
            assert_abs_diff_eq!(block[(0, i)], expected[(0, start + i)], epsilon = 1e-6);
        }
    }

    let keep = io::stream(&path, config.with_mono(false)).unwrap();
    for block in keep {
        assert_eq!(block.unwrap().nrows(), 2);
    }

    let _ = std::fs::remove_file(path);
}

#[test]
fn file_offset_and_duration() {
    let sr = 1000;
    let signal: Vec<f32> = (0..2000).map(|i| (i % 200) as f32 / 400.0).collect();
    let data = Array2::from_shape_vec((1, signal.len()), signal).unwrap();
    let path = write_fixture("offset_duration", &data, sr);

    let config = StreamConfig::new(2, 100, 50)
        .with_offset(0.5)
        .with_duration(0.3);
    let stream = io::stream(&path, config).unwrap();
    let blocks: Vec<_> = stream.collect::<Result<_, _>>().unwrap();

    // samples [500, 800): frames at 500, 550, ..., 700
    let total_frames: usize = blocks
        .iter()
        .map(|b| blockstream::frame::frame_count(b.ncols(), 100, 50))
        .sum();
    assert_eq!(total_frames, 5);
    let first = WavSource::open(&path).unwrap();
    let all = read_all(first);
    assert_abs_diff_eq!(blocks[0][(0, 0)], all[500], epsilon = 1e-6);

    let _ = std::fs::remove_file(path);
}

#[test]
fn mismatched_sample_rate_is_rejected() {
    let data = Array2::<f32>::zeros((1, 4000));
    let path = write_fixture("rate_mismatch", &data, 44100);

    let err = io::stream(&path, StreamConfig::new(4, 512, 128).with_sample_rate(22050));
    assert!(matches!(
        err,
        Err(Error::UnsupportedOperation { operation: "resample", .. })
    ));
    assert!(io::stream(&path, StreamConfig::new(4, 512, 128).with_sample_rate(44100)).is_ok());

    let _ = std::fs::remove_file(path);
}

#[test]
fn empty_file_yields_no_blocks() {
    let data = Array2::<f32>::zeros((1, 0));
    let path = write_fixture("empty", &data, 22050);

    let mut stream = io::stream(&path, StreamConfig::new(2, 64, 32)).unwrap();
    assert!(stream.next().is_none());
    assert_eq!(io::get_duration(&path).unwrap(), 0.0);

    let _ = std::fs::remove_file(path);
}
