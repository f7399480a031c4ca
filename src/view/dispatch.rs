//! Input fan-out: hit-testing children back to front and forwarding events.

use crate::draw::context::DrawContext;
use crate::draw::input::MouseButtons;
use crate::foundation::core::Point;
use crate::view::event::{DragPayload, EventResult, KeyCode};
use crate::view::id::ViewId;
use crate::view::tree::ViewTree;

impl ViewTree {
    /// Whether `p` (parent coordinates) hits a visible, mouse-enabled view.
    pub fn hit_test(&self, id: ViewId, p: Point, buttons: MouseButtons) -> bool {
        let Some(n) = self.node(id) else {
            return false;
        };
        if !n.data.visible || !n.data.mouse_enabled {
            return false;
        }
        match n.behavior.as_ref() {
            Some(b) => b.hit_test(&n.data, p, buttons),
            None => n.data.mouseable_area.contains(p),
        }
    }

    fn hit_child(&self, container: ViewId, local: Point, buttons: MouseButtons) -> Option<ViewId> {
        self.hit_order(container)
            .into_iter()
            .find(|c| self.hit_test(*c, local, buttons))
    }

    fn local_point(&self, id: ViewId, p: Point) -> Point {
        let origin = self.view_size(id).map_or(Point::ZERO, |r| r.origin());
        p - origin.to_vec2()
    }

    /// Deliver a mouse down at `where_` (parent coordinates of `id`).
    ///
    /// A container forwards to the topmost child hit at the converted point; its own
    /// behavior sees the event only when no child is hit. Empty `buttons` are read from
    /// the context.
    pub fn mouse(
        &mut self,
        id: ViewId,
        dc: &mut dyn DrawContext,
        where_: Point,
        buttons: MouseButtons,
    ) -> EventResult {
        let buttons = if buttons.is_empty() {
            dc.get_mouse_buttons()
        } else {
            buttons
        };
        if self.is_container(id) {
            let local = self.local_point(id, where_);
            if let Some(child) = self.hit_child(id, local, buttons) {
                let saved = dc.modify_for_container(where_ - local);
                let result = self.mouse(child, dc, local, buttons);
                dc.restore_offsets(saved);
                return result;
            }
        }
        self.with_behavior(id, |b, cx| b.mouse(cx, dc, where_, buttons))
            .unwrap_or_default()
    }

    /// Deliver a wheel step to the view under `where_`.
    pub fn on_wheel(&mut self, id: ViewId, dc: &mut dyn DrawContext, where_: Point, distance: f32) -> bool {
        if self.is_container(id) {
            let local = self.local_point(id, where_);
            if let Some(child) = self.hit_child(id, local, MouseButtons::NONE) {
                let saved = dc.modify_for_container(where_ - local);
                let handled = self.on_wheel(child, dc, local, distance);
                dc.restore_offsets(saved);
                return handled;
            }
        }
        self.with_behavior(id, |b, cx| b.on_wheel(cx, dc, where_, distance))
            .unwrap_or(false)
    }

    /// Deliver dropped data to the view under `where_`.
    pub fn on_drop(&mut self, id: ViewId, dc: &mut dyn DrawContext, payload: &DragPayload, where_: Point) -> bool {
        if self.is_container(id) {
            if let Some(c) = self.container_mut(id) {
                c.drag_view = None;
            }
            let local = self.local_point(id, where_);
            if let Some(child) = self.hit_child(id, local, MouseButtons::NONE) {
                let saved = dc.modify_for_container(where_ - local);
                let accepted = self.on_drop(child, dc, payload, local);
                dc.restore_offsets(saved);
                return accepted;
            }
        }
        self.with_behavior(id, |b, cx| b.on_drop(cx, dc, payload, where_))
            .unwrap_or(false)
    }

    /// A drag entered `id` at `where_`.
    pub fn on_drag_enter(&mut self, id: ViewId, payload: &DragPayload, where_: Point) {
        if self.is_container(id) {
            let local = self.local_point(id, where_);
            let hit = self.hit_child(id, local, MouseButtons::NONE);
            if let Some(c) = self.container_mut(id) {
                c.drag_view = hit;
            }
            if let Some(child) = hit {
                self.on_drag_enter(child, payload, local);
            }
            return;
        }
        self.with_behavior(id, |b, cx| b.on_drag_enter(cx, payload, where_));
    }

    /// A drag left `id`.
    pub fn on_drag_leave(&mut self, id: ViewId, payload: &DragPayload, where_: Point) {
        if self.is_container(id) {
            let local = self.local_point(id, where_);
            let current = self.container_mut(id).and_then(|c| c.drag_view.take());
            if let Some(child) = current {
                self.on_drag_leave(child, payload, local);
            }
            return;
        }
        self.with_behavior(id, |b, cx| b.on_drag_leave(cx, payload, where_));
    }

    /// A drag moved over `id`; switches the tracked child when the pointer crosses views.
    pub fn on_drag_move(&mut self, id: ViewId, payload: &DragPayload, where_: Point) {
        if !self.is_container(id) {
            self.with_behavior(id, |b, cx| b.on_drag_move(cx, payload, where_));
            return;
        }
        let local = self.local_point(id, where_);
        let hit = self.hit_child(id, local, MouseButtons::NONE);
        let current = self.container(id).and_then(|c| c.drag_view);
        if current == hit {
            if let Some(child) = hit {
                self.on_drag_move(child, payload, local);
            }
            return;
        }
        if let Some(old) = current {
            self.on_drag_leave(old, payload, local);
        }
        if let Some(c) = self.container_mut(id) {
            c.drag_view = hit;
        }
        if let Some(new) = hit {
            self.on_drag_enter(new, payload, local);
        }
    }

    /// Child currently tracked by drag enter/move/leave.
    pub fn drag_view(&self, container: ViewId) -> Option<ViewId> {
        self.container(container)?.drag_view
    }

    /// Offer a key press to `id`; containers ask their children back to front.
    pub fn on_key_down(&mut self, id: ViewId, key: &KeyCode) -> EventResult {
        self.dispatch_key(id, key, true, None)
    }

    /// Offer a key release to `id`; containers ask their children back to front.
    pub fn on_key_up(&mut self, id: ViewId, key: &KeyCode) -> EventResult {
        self.dispatch_key(id, key, false, None)
    }

    /// Key fan-out that never enters the subtree rooted at `skip`.
    pub(crate) fn dispatch_key(
        &mut self,
        id: ViewId,
        key: &KeyCode,
        down: bool,
        skip: Option<ViewId>,
    ) -> EventResult {
        if !self.is_visible(id) || skip == Some(id) {
            return EventResult::Unhandled;
        }
        for child in self.hit_order(id) {
            if self.dispatch_key(child, key, down, skip).is_handled() {
                return EventResult::Handled;
            }
        }
        self.with_behavior(id, |b, cx| {
            if down {
                b.on_key_down(cx, key)
            } else {
                b.on_key_up(cx, key)
            }
        })
        .unwrap_or_default()
    }

    /// Tell the behavior it gained or lost keyboard focus.
    pub(crate) fn notify_focus(&mut self, id: ViewId, gained: bool) {
        self.with_behavior(id, |b, cx| {
            if gained {
                b.take_focus(cx);
            } else {
                b.loose_focus(cx);
            }
        });
        self.invalid(id);
    }

    /// Whether Tab navigation may stop at `id`.
    pub fn wants_focus(&self, id: ViewId) -> bool {
        self.node(id).is_some_and(|n| {
            n.data.visible
                && n.data.mouse_enabled
                && n.behavior.as_ref().is_some_and(|b| b.wants_focus())
        })
    }

    /// Give every attached idle subscriber its periodic call.
    pub(crate) fn run_idle(&mut self) {
        for id in self.idle_views() {
            self.with_behavior(id, |b, cx| b.on_idle(cx));
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/view/dispatch.rs"]
mod tests;
