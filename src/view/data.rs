//! Per-view node data.

use crate::bitmap::Bitmap;
use crate::foundation::core::Rect;

/// Per-view state owned by the tree.
///
/// `size` is expressed in the parent container's coordinate space, as is `mouseable_area`.
#[derive(Clone, Debug)]
pub struct ViewData {
    /// Visual bounds in parent coordinates.
    pub size: Rect,
    /// Hit-test region in parent coordinates.
    pub mouseable_area: Rect,
    /// Content is stale and must be repainted.
    pub dirty: bool,
    /// Whether the view takes part in hit-testing.
    pub mouse_enabled: bool,
    /// Skip background fill (and key out the background bitmap's transparent color).
    pub transparent: bool,
    /// Hidden views are neither painted nor hit.
    pub visible: bool,
    /// Opacity multiplier applied while the view paints, in `[0, 1]`.
    pub alpha_value: f32,
    /// Application-defined identifier, used by controls when notifying listeners.
    pub tag: i32,
    /// Optional background image.
    pub background: Option<Bitmap>,
    /// Receive `on_idle` calls from the frame.
    pub wants_idle: bool,
}

impl ViewData {
    /// Fresh data for a view occupying `size`.
    pub fn new(size: Rect) -> Self {
        Self {
            size,
            mouseable_area: size,
            dirty: false,
            mouse_enabled: true,
            transparent: false,
            visible: true,
            alpha_value: 1.0,
            tag: -1,
            background: None,
            wants_idle: false,
        }
    }
}
