//! Multiscattering LUT error types.

/// Errors raised before or while dispatching a multiscattering pass.
///
/// Settings and buffer problems are reported before any texel is written.
/// [`LutError::WorkerSpawn`] and [`LutError::WorkerPanicked`] surface after
/// dispatch, once every started worker has been joined, so the output
/// buffer may be partially written and should be discarded.
#[derive(Debug, thiserror::Error)]
pub enum LutError {
    /// Width or height of the output grid is zero.
    #[error("LUT dimensions must be non-zero, got {width}x{height}")]
    ZeroDimensions { width: u32, height: u32 },

    /// No directions to integrate over.
    #[error("multiscattering LUT needs at least one sampled direction")]
    ZeroDirections,

    /// No march steps along each ray.
    #[error("multiscattering LUT needs at least one march step per ray")]
    ZeroSamples,

    /// The caller-provided output buffer does not match the grid size.
    #[error("output buffer holds {actual} texels, expected {expected}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// The OS refused to start a worker thread.
    #[error("failed to spawn LUT worker thread: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    /// A worker thread panicked before finishing its rows.
    #[error("a LUT worker thread panicked")]
    WorkerPanicked,
}
