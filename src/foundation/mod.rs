//! Error type, geometry, color and configuration.

/// Geometry re-exports, `RectExt` and `Color`.
pub mod core;
/// Crate error type.
pub mod error;
pub(crate) mod math;
/// Frame configuration.
pub mod opts;
