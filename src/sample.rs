//! Element types a block can be emitted as.

/// Floating-point sample representation for emitted blocks.
///
/// Sources always decode to `f32`; blocks are converted on emission.
pub trait Sample: Copy + Send + Sync + std::fmt::Debug + PartialEq + 'static {
    fn from_f32(value: f32) -> Self;
}

impl Sample for f32 {
    #[inline]
    fn from_f32(value: f32) -> Self {
        value
    }
}

impl Sample for f64 {
    #[inline]
    fn from_f32(value: f32) -> Self {
        value as f64
    }
}
