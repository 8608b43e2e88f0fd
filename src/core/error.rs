//! Error types for the culling engine

use thiserror::Error;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    /// LOD thresholds must be sorted strictly high to low.
    #[error("lod levels not strictly descending at index {index}: {prev} -> {next}")]
    LodNotDescending { index: usize, prev: f32, next: f32 },

    /// The state byte reserves 7 bits for the band index.
    #[error("too many lod levels: {0} (limit 127)")]
    LodTooManyLevels(usize),
}
