use std::any::Any;

use crate::animation::{AnimationTarget, TimingFunction};
use crate::bitmap::Bitmap;
use crate::controls::Control;
use crate::draw::context::DrawContext;
use crate::draw::input::MouseButtons;
use crate::foundation::core::{Point, Rect, RectExt};
use crate::view::data::ViewData;
use crate::view::event::{DragPayload, EventResult, KeyCode};
use crate::view::id::ViewId;
use crate::view::tree::{TreeRequest, ViewTree};

/// Overridable behavior of one view.
///
/// Every hook has a default so a view implements only what it reacts to. Points are in the
/// coordinate space of the view's parent, the same space as its `size`; the draw context is
/// already offset so the view can paint at its `size` directly.
///
/// For containers, painting and child dispatch are done by the tree; the behavior's `draw`
/// is not called, and its input hooks only see events no child took.
pub trait View: Any {
    /// Adjust the initial node data (hit area, flags, tag) when the view is created.
    fn configure(&self, _data: &mut ViewData) {}

    /// Paint the view. The default paints the background bitmap.
    fn draw(&mut self, cx: &mut ViewCx<'_>, dc: &mut dyn DrawContext) {
        cx.draw_background(dc);
    }

    /// Paint the part of the view inside `update` (parent coordinates).
    fn draw_rect(&mut self, cx: &mut ViewCx<'_>, dc: &mut dyn DrawContext, _update: Rect) {
        self.draw(cx, dc);
    }

    /// Whether `p` hits this view. Defaults to the mouseable area.
    fn hit_test(&self, data: &ViewData, p: Point, _buttons: MouseButtons) -> bool {
        data.mouseable_area.point_inside(p)
    }

    /// Mouse down at `where_`.
    fn mouse(
        &mut self,
        _cx: &mut ViewCx<'_>,
        _dc: &mut dyn DrawContext,
        _where: Point,
        _buttons: MouseButtons,
    ) -> EventResult {
        EventResult::Unhandled
    }

    /// Scroll wheel; returns `true` if consumed.
    fn on_wheel(&mut self, _cx: &mut ViewCx<'_>, _dc: &mut dyn DrawContext, _where: Point, _distance: f32) -> bool {
        false
    }

    /// Dropped payload; returns `true` if accepted.
    fn on_drop(
        &mut self,
        _cx: &mut ViewCx<'_>,
        _dc: &mut dyn DrawContext,
        _payload: &DragPayload,
        _where: Point,
    ) -> bool {
        false
    }

    /// A drag entered the view.
    fn on_drag_enter(&mut self, _cx: &mut ViewCx<'_>, _payload: &DragPayload, _where: Point) {}

    /// A drag left the view.
    fn on_drag_leave(&mut self, _cx: &mut ViewCx<'_>, _payload: &DragPayload, _where: Point) {}

    /// A drag moved inside the view.
    fn on_drag_move(&mut self, _cx: &mut ViewCx<'_>, _payload: &DragPayload, _where: Point) {}

    /// Key pressed.
    fn on_key_down(&mut self, _cx: &mut ViewCx<'_>, _key: &KeyCode) -> EventResult {
        EventResult::Unhandled
    }

    /// Key released.
    fn on_key_up(&mut self, _cx: &mut ViewCx<'_>, _key: &KeyCode) -> EventResult {
        EventResult::Unhandled
    }

    /// Whether Tab navigation may focus this view.
    fn wants_focus(&self) -> bool {
        false
    }

    /// Keyboard focus arrived.
    fn take_focus(&mut self, _cx: &mut ViewCx<'_>) {}

    /// Keyboard focus left.
    fn loose_focus(&mut self, _cx: &mut ViewCx<'_>) {}

    /// The view became reachable from an open frame.
    fn attached(&mut self, _cx: &mut ViewCx<'_>) {}

    /// The view was unlinked from an attached container.
    fn removed(&mut self, _cx: &mut ViewCx<'_>) {}

    /// Periodic call from the frame, for views with `wants_idle` set.
    fn on_idle(&mut self, _cx: &mut ViewCx<'_>) {}

    /// Control capability, for views that hold a value.
    fn as_control(&self) -> Option<&dyn Control> {
        None
    }

    /// Mutable control capability.
    fn as_control_mut(&mut self) -> Option<&mut dyn Control> {
        None
    }
}

/// Access a view behavior gets to its own node and the rest of the tree while a hook runs.
///
/// Structural changes that could invalidate the running view (focus changes, animation
/// registration) are queued and applied by the frame after the hook returns.
pub struct ViewCx<'a> {
    tree: &'a mut ViewTree,
    id: ViewId,
}

impl<'a> ViewCx<'a> {
    pub(crate) fn new(tree: &'a mut ViewTree, id: ViewId) -> Self {
        Self { tree, id }
    }

    /// The view this context belongs to.
    pub fn id(&self) -> ViewId {
        self.id
    }

    /// Read-only view of the whole tree.
    pub fn tree(&self) -> &ViewTree {
        &*self.tree
    }

    /// Node data of this view.
    pub fn data(&self) -> Option<&ViewData> {
        self.tree.data(self.id)
    }

    /// Bounds in parent coordinates.
    pub fn view_size(&self) -> Rect {
        self.tree.view_size(self.id).unwrap_or(Rect::ZERO)
    }

    /// Hit area in parent coordinates.
    pub fn mouseable_area(&self) -> Rect {
        self.tree.mouseable_area(self.id).unwrap_or(Rect::ZERO)
    }

    /// Opacity multiplier.
    pub fn alpha_value(&self) -> f32 {
        self.tree.alpha_value(self.id)
    }

    /// Application tag.
    pub fn tag(&self) -> i32 {
        self.tree.tag(self.id).unwrap_or(-1)
    }

    /// Own dirty flag.
    pub fn is_dirty(&self) -> bool {
        self.tree.is_self_dirty(self.id)
    }

    /// Background bitmap.
    pub fn background(&self) -> Option<Bitmap> {
        self.tree.background(self.id)
    }

    /// Mark this view for repaint.
    pub fn invalid(&mut self) {
        self.tree.invalid(self.id);
    }

    /// Set or clear the dirty flag.
    pub fn set_dirty(&mut self, dirty: bool) {
        self.tree.set_dirty(self.id, dirty);
    }

    /// Replace the bounds.
    pub fn set_view_size(&mut self, rect: Rect) {
        self.tree.set_view_size(self.id, rect);
    }

    /// Replace the hit area.
    pub fn set_mouseable_area(&mut self, rect: Rect) {
        self.tree.set_mouseable_area(self.id, rect);
    }

    /// Set the opacity multiplier.
    pub fn set_alpha_value(&mut self, alpha: f32) {
        self.tree.set_alpha_value(self.id, alpha);
    }

    /// Replace the background bitmap.
    pub fn set_background(&mut self, bitmap: Option<Bitmap>) {
        self.tree.set_background(self.id, bitmap);
    }

    /// Ask for (or stop) periodic `on_idle` calls.
    pub fn set_wants_idle(&mut self, on: bool) {
        if let Some(d) = self.tree.data_mut(self.id) {
            d.wants_idle = on;
        }
    }

    /// Paint the background bitmap over the view bounds, keyed if the view is transparent.
    pub fn draw_background(&self, dc: &mut dyn DrawContext) {
        let Some(d) = self.data() else {
            return;
        };
        if let Some(bitmap) = d.background.as_ref() {
            if d.transparent {
                bitmap.draw_transparent(dc, d.size, Point::ZERO);
            } else {
                bitmap.draw(dc, d.size, Point::ZERO);
            }
        }
    }

    /// Move keyboard focus to this view once the current event is handled.
    pub fn request_focus(&mut self) {
        self.tree.push_request(TreeRequest::Focus(self.id));
    }

    /// Start an animation on this view once the current event is handled.
    pub fn add_animation(
        &mut self,
        name: impl Into<String>,
        target: impl AnimationTarget + 'static,
        timing: impl TimingFunction + 'static,
    ) {
        self.tree.push_request(TreeRequest::AddAnimation {
            view: self.id,
            name: name.into(),
            target: Box::new(target),
            timing: Box::new(timing),
        });
    }

    /// Cancel a named animation on this view.
    pub fn remove_animation(&mut self, name: impl Into<String>) {
        self.tree.push_request(TreeRequest::RemoveAnimation {
            view: self.id,
            name: name.into(),
        });
    }

    /// Cancel every animation on this view.
    pub fn remove_all_animations(&mut self) {
        self.tree.push_request(TreeRequest::RemoveAnimations(self.id));
    }
}
