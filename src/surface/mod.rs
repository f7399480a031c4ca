//! Views whose content is produced off the UI thread.

/// Worker-thread rendering.
pub mod worker;

pub use worker::{SurfaceContext, SurfaceOpts, SurfaceRenderer, WorkerSurfaceView};
