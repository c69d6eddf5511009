//! Whole-signal framing.
//!
//! These helpers frame a signal that is already in memory. A
//! [`BlockStream`](crate::stream::BlockStream) configured with the same
//! `frame_length` and `hop_length` yields blocks whose frames, taken in
//! order, are exactly the frames computed here with `center = false`.

use ndarray::Array2;

fn check_geometry(frame_length: usize, hop_length: usize) -> crate::Result<()> {
    if frame_length == 0 {
        return Err(crate::Error::config("frame_length", 0, "must be > 0"));
    }
    if hop_length == 0 {
        return Err(crate::Error::config("hop_length", 0, "must be > 0"));
    }
    Ok(())
}

/// Number of whole frames that fit in a signal of `length` samples.
///
/// Returns 0 for a zero `hop_length`.
pub fn frame_count(length: usize, frame_length: usize, hop_length: usize) -> usize {
    if hop_length == 0 || frame_length > length {
        return 0;
    }
    1 + (length - frame_length) / hop_length
}

/// Compute frame start indices for framing a signal.
///
/// With `center = true` the signal is conceptually padded by
/// `frame_length / 2` on both sides and the indices refer to the padded
/// signal.
///
/// # Example
/// ```
/// use blockstream::frame::frame_indices;
///
/// let indices = frame_indices(1000, 512, 256, false).unwrap();
/// assert_eq!(indices, vec![0, 256]);
/// ```
pub fn frame_indices(
    len: usize,
    frame_length: usize,
    hop_length: usize,
    center: bool,
) -> crate::Result<Vec<usize>> {
    check_geometry(frame_length, hop_length)?;
    let pad = if center { frame_length / 2 } else { 0 };
    let n_frames = frame_count(len + 2 * pad, frame_length, hop_length);
    Ok((0..n_frames).map(|i| i * hop_length).collect())
}

/// Frame a signal into overlapping windows.
///
/// With `center = true` the signal is zero-padded by `frame_length / 2` at
/// both ends first.
///
/// # Example
/// ```
/// use blockstream::frame::frame_signal;
///
/// let signal = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
/// let frames = frame_signal(&signal, 4, 2, false).unwrap();
/// assert_eq!(frames.len(), 2);
/// assert_eq!(frames[1], vec![3.0, 4.0, 5.0, 6.0]);
/// ```
pub fn frame_signal(
    y: &[f32],
    frame_length: usize,
    hop_length: usize,
    center: bool,
) -> crate::Result<Vec<Vec<f32>>> {
    let indices = frame_indices(y.len(), frame_length, hop_length, center)?;
    let pad = if center { frame_length / 2 } else { 0 };
    let mut padded = vec![0.0f32; y.len() + 2 * pad];
    padded[pad..pad + y.len()].copy_from_slice(y);

    Ok(indices
        .into_iter()
        .map(|start| padded[start..start + frame_length].to_vec())
        .collect())
}

/// Slice a signal into frames stored as the columns of an array.
///
/// The output has shape `(frame_length, n_frames)`; column `i` holds
/// `y[i * hop_length .. i * hop_length + frame_length]`.
///
/// # Errors
/// Fails when `frame_length` or `hop_length` is zero, or when the signal is
/// shorter than one frame.
///
/// # Example
/// ```
/// use blockstream::frame::frame;
///
/// let frames = frame(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3, 2).unwrap();
/// assert_eq!(frames.shape(), &[3, 3]);
/// assert_eq!(frames[(0, 2)], 4.0);
/// ```
pub fn frame(y: &[f32], frame_length: usize, hop_length: usize) -> crate::Result<Array2<f32>> {
    check_geometry(frame_length, hop_length)?;
    if y.len() < frame_length {
        return Err(crate::Error::config(
            "frame_length",
            frame_length,
            format!("input is too short (n={})", y.len()),
        ));
    }

    let n_frames = frame_count(y.len(), frame_length, hop_length);
    Ok(Array2::from_shape_fn((frame_length, n_frames), |(i, k)| {
        y[k * hop_length + i]
    }))
}
