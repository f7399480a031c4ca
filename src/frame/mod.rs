//! The frame: root of one editor window, plus the platform window seam and a headless
//! backend.

#[allow(clippy::module_inception)]
/// The root of a window.
pub mod frame;
/// Display-less window backend.
pub mod headless;
/// Platform window seam and window accounting.
pub mod platform;

pub use frame::Frame;
pub use headless::{HeadlessSurface, HeadlessWindow};
pub use platform::{PlatformContext, PlatformWindow, WindowLease};
