//! Retained view hierarchy: an arena of views and containers, their invalidation state, the
//! compositing passes and input fan-out.

/// The `View` trait and its context.
pub mod behavior;
pub mod data;
/// Input event types.
pub mod event;
pub mod id;
mod dispatch;
mod paint;
/// The view arena.
pub mod tree;

pub use behavior::{View, ViewCx};
pub use data::ViewData;
pub use event::{DragItem, DragPayload, DragType, EventResult, KeyCode, KeyModifiers, VirtualKey};
pub use id::ViewId;
pub use tree::ViewTree;

/// Container repaint policy for [`ViewTree::update`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateMode {
    /// Repaint the whole container when anything inside it is dirty.
    #[default]
    Normal,
    /// Repaint only the dirty children, erasing their background first.
    OnlyDirty,
}
