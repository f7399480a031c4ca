use crate::animation::{AnimationTarget, Animator, TimingFunction};
use crate::draw::context::DrawContext;
use crate::draw::input::MouseButtons;
use crate::draw::recording::NullContext;
use crate::foundation::core::{Point, Rect, RectExt, Size};
use crate::foundation::error::{PlugframeError, PlugframeResult};
use crate::foundation::opts::FrameOpts;
use crate::frame::platform::{PlatformContext, PlatformWindow, WindowLease};
use crate::view::tree::TreeRequest;
use crate::view::{DragPayload, EventResult, KeyCode, UpdateMode, ViewId, ViewTree};

struct OpenWindow {
    window: Box<dyn PlatformWindow>,
    _lease: WindowLease,
}

/// Root of one editor window: owns the view tree, the animator and the platform window.
///
/// The root container paints the frame background and every top-level view; the modal view,
/// when set, paints last and takes all pointer input.
pub struct Frame {
    tree: ViewTree,
    root: ViewId,
    animator: Animator,
    opts: FrameOpts,
    platform: PlatformContext,
    window: Option<OpenWindow>,
    first_draw_done: bool,
    modal: Option<ViewId>,
    modal_adopted: bool,
    focus: Option<ViewId>,
}

impl Frame {
    /// Frame of `size` with an empty root container. The window is opened separately.
    pub fn new(platform: &PlatformContext, size: Rect, opts: FrameOpts) -> Self {
        let mut tree = ViewTree::with_defaults(opts.draw_in_offscreen, opts.update_mode);
        let root = tree.create_container(size);
        tree.set_background_color(root, opts.background);
        tree.set_update_mode(root, UpdateMode::OnlyDirty);
        tree.attach_root(root);
        tracing::debug!(root = %root, ?size, "frame created");
        Self {
            tree,
            root,
            animator: Animator::new(opts.animation_interval_ms),
            opts,
            platform: platform.clone(),
            window: None,
            first_draw_done: false,
            modal: None,
            modal_adopted: false,
            focus: None,
        }
    }

    /// Root container id.
    pub fn root(&self) -> ViewId {
        self.root
    }

    /// The view tree.
    pub fn tree(&self) -> &ViewTree {
        &self.tree
    }

    /// Mutable view tree.
    pub fn tree_mut(&mut self) -> &mut ViewTree {
        &mut self.tree
    }

    /// Options the frame was built with.
    pub fn opts(&self) -> &FrameOpts {
        &self.opts
    }

    /// The animator driving this frame's animations.
    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    /// Bind a platform window. Fails if one is already open.
    pub fn open(&mut self, window: impl PlatformWindow + 'static) -> PlugframeResult<()> {
        if self.window.is_some() {
            return Err(PlugframeError::window("frame already has an open window"));
        }
        self.window = Some(OpenWindow {
            window: Box::new(window),
            _lease: self.platform.lease(),
        });
        self.first_draw_done = false;
        self.tree.invalid(self.root);
        Ok(())
    }

    /// Release the platform window. Returns `false` if none was open.
    pub fn close(&mut self) -> bool {
        self.first_draw_done = false;
        self.window.take().is_some()
    }

    /// Whether a platform window is bound.
    pub fn is_open(&self) -> bool {
        self.window.is_some()
    }

    fn window(&self) -> PlugframeResult<&dyn PlatformWindow> {
        self.window
            .as_ref()
            .map(|w| &*w.window)
            .ok_or_else(PlugframeError::window_closed)
    }

    fn window_mut(&mut self) -> PlugframeResult<&mut Box<dyn PlatformWindow>> {
        self.window
            .as_mut()
            .map(|w| &mut w.window)
            .ok_or_else(PlugframeError::window_closed)
    }

    /// Window position in screen coordinates.
    pub fn get_position(&self) -> PlugframeResult<Point> {
        Ok(self.window()?.position())
    }

    /// Move the window.
    pub fn set_position(&mut self, position: Point) -> PlugframeResult<()> {
        if self.window_mut()?.set_position(position) {
            Ok(())
        } else {
            Err(PlugframeError::window("platform refused to move the window"))
        }
    }

    /// Resize the window and the root container.
    pub fn set_size(&mut self, size: Size) -> PlugframeResult<()> {
        if !self.window_mut()?.set_size(size) {
            return Err(PlugframeError::window(format!("platform refused size {size:?}")));
        }
        let origin = self.get_size().origin();
        self.tree.set_view_size(self.root, Rect::from_origin_size(origin, size));
        self.first_draw_done = false;
        Ok(())
    }

    /// Bounds of the root container.
    pub fn get_size(&self) -> Rect {
        self.tree.view_size(self.root).unwrap_or(Rect::ZERO)
    }

    /// Pointer position relative to the frame.
    pub fn get_current_location(&self) -> PlugframeResult<Point> {
        let w = self.window()?;
        Ok(w.mouse_location() - w.position().to_vec2())
    }

    /// Platform clock, if a window is open.
    pub fn ticks_ms(&self) -> Option<u64> {
        self.window().ok().map(|w| w.ticks_ms())
    }

    /// Full repaint through the window.
    pub fn paint(&mut self) -> PlugframeResult<()> {
        let root = self.root;
        let tree = &mut self.tree;
        let window = self
            .window
            .as_mut()
            .map(|w| &mut w.window)
            .ok_or_else(PlugframeError::window_closed)?;
        window.render(&mut |dc: &mut dyn DrawContext| tree.draw(root, dc));
        self.first_draw_done = true;
        Ok(())
    }

    /// Full repaint into `dc`.
    #[tracing::instrument(level = "debug", skip(self, dc), fields(root = %self.root))]
    pub fn draw(&mut self, dc: &mut dyn DrawContext) {
        self.tree.draw(self.root, dc);
        self.first_draw_done = true;
    }

    /// Repaint the part of the frame inside `update` into `dc`.
    pub fn draw_rect(&mut self, dc: &mut dyn DrawContext, update: Rect) {
        self.tree.draw_rect(self.root, dc, update);
    }

    /// Incremental repaint of dirty views into `dc`.
    pub fn update(&mut self, dc: &mut dyn DrawContext) {
        self.tree.update(self.root, dc);
    }

    /// Redraw a single view through the window, over its parent's background.
    pub fn draw_view(&mut self, view: ViewId) -> PlugframeResult<bool> {
        let Some(size) = self.tree.view_size(view) else {
            return Ok(false);
        };
        let parent = self.tree.parent(view);
        let offset = parent.map(|p| self.tree.frame_offset(p)).unwrap_or_default();
        let tree = &mut self.tree;
        let window = self
            .window
            .as_mut()
            .map(|w| &mut w.window)
            .ok_or_else(PlugframeError::window_closed)?;
        window.render(&mut |dc: &mut dyn DrawContext| {
            let saved = dc.modify_for_container(offset);
            dc.intersect_clip(size);
            if let Some(p) = parent {
                tree.draw_background_rect(p, dc, size);
            }
            tree.draw(view, dc);
            dc.restore_offsets(saved);
        });
        Ok(true)
    }

    /// Periodic maintenance: idle subscribers, then an incremental repaint if anything is
    /// dirty. Nothing is painted before the first full draw.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn idle(&mut self) {
        if self.window.is_none() {
            return;
        }
        self.tree.run_idle();
        self.apply_requests();
        if !self.first_draw_done || !self.is_something_dirty() {
            return;
        }
        let root = self.root;
        let tree = &mut self.tree;
        if let Some(w) = self.window.as_mut() {
            w.window.render(&mut |dc: &mut dyn DrawContext| tree.update(root, dc));
        }
    }

    /// Animator tick at `now_ms`, followed by [`Frame::idle`].
    pub fn tick(&mut self, now_ms: u64) {
        self.animator.tick(&mut self.tree, now_ms);
        self.apply_requests();
        self.idle();
    }

    /// Mark every top-level view overlapping `rect` dirty.
    pub fn invalidate(&mut self, rect: Rect) {
        let children: Vec<ViewId> = self.tree.children(self.root).to_vec();
        for child in children {
            if self.tree.view_size(child).is_some_and(|s| s.overlaps_inclusive(&rect)) {
                self.tree.invalid(child);
            }
        }
        if let Some(w) = self.window.as_mut() {
            w.window.invalidate_rect(rect);
        }
    }

    /// Whether anything in the tree needs a repaint.
    pub fn is_something_dirty(&self) -> bool {
        self.tree.is_dirty(self.root)
    }

    /// Mark the whole frame for repaint, or clear every dirty flag.
    pub fn set_dirty_all(&mut self, dirty: bool) {
        if dirty {
            for id in self.tree.descendants(self.root) {
                self.tree.invalid(id);
            }
        } else {
            self.tree.set_dirty(self.root, false);
        }
    }

    /// Add a top-level view, adopting the caller's reference.
    pub fn add_view(&mut self, view: ViewId) -> bool {
        self.tree.add_view(self.root, view)
    }

    /// Remove a top-level view.
    pub fn remove_view(&mut self, view: ViewId, with_forget: bool) -> bool {
        if self.focus.is_some_and(|f| f == view || self.tree.is_child(view, f, true)) {
            self.set_focus_view(None);
        }
        if self.modal == Some(view) {
            let adopted = self.modal_adopted;
            self.set_modal_view(None);
            if adopted {
                // Clearing already unlinked it from the root.
                if with_forget {
                    self.tree.forget(view);
                }
                return true;
            }
        }
        self.tree.remove_view(self.root, view, with_forget)
    }

    fn root_local(&self, p: Point) -> Point {
        p - self.get_size().origin().to_vec2()
    }

    fn event_context(&self) -> NullContext {
        match self.window.as_ref().and_then(|w| w.window.input()) {
            Some(input) => NullContext::with_input(input),
            None => NullContext::default(),
        }
    }

    /// Deliver a mouse down in frame coordinates through `dc`.
    ///
    /// Any edit focus is dropped first. With a modal view installed only the modal view can
    /// receive the click.
    pub fn mouse(&mut self, dc: &mut dyn DrawContext, where_: Point, buttons: MouseButtons) -> EventResult {
        self.set_focus_view(None);
        let result = match self.modal {
            Some(modal) => {
                let local = self.root_local(where_);
                let buttons = if buttons.is_empty() { dc.get_mouse_buttons() } else { buttons };
                if self.tree.hit_test(modal, local, buttons) {
                    let saved = dc.modify_for_container(where_ - local);
                    let r = self.tree.mouse(modal, dc, local, buttons);
                    dc.restore_offsets(saved);
                    r
                } else {
                    EventResult::Unhandled
                }
            }
            None => self.tree.mouse(self.root, dc, where_, buttons),
        };
        self.apply_requests();
        result
    }

    /// [`Frame::mouse`] with an inert context bound to the window's input device.
    pub fn mouse_down(&mut self, where_: Point, buttons: MouseButtons) -> EventResult {
        let mut dc = self.event_context();
        self.mouse(&mut dc, where_, buttons)
    }

    /// Deliver a wheel step in frame coordinates.
    pub fn on_wheel(&mut self, where_: Point, distance: f32) -> bool {
        let mut dc = self.event_context();
        let handled = match self.modal {
            Some(modal) => {
                let local = self.root_local(where_);
                if self.tree.hit_test(modal, local, MouseButtons::NONE) {
                    let saved = dc.modify_for_container(where_ - local);
                    let h = self.tree.on_wheel(modal, &mut dc, local, distance);
                    dc.restore_offsets(saved);
                    h
                } else {
                    false
                }
            }
            None => self.tree.on_wheel(self.root, &mut dc, where_, distance),
        };
        self.apply_requests();
        handled
    }

    /// Offer a key press: focus view, then modal view (or the top-level views back to
    /// front). An unhandled Tab moves the focus.
    pub fn on_key_down(&mut self, key: &KeyCode) -> EventResult {
        let mut result = self.dispatch_key(key, true);
        if !result.is_handled() && key.is_tab() && self.advance_next_focus_view(key.modifiers.shift) {
            result = EventResult::Handled;
        }
        self.apply_requests();
        result
    }

    /// Offer a key release in the same order as [`Frame::on_key_down`].
    pub fn on_key_up(&mut self, key: &KeyCode) -> EventResult {
        let result = self.dispatch_key(key, false);
        self.apply_requests();
        result
    }

    fn dispatch_key(&mut self, key: &KeyCode, down: bool) -> EventResult {
        let focus = self.focus.filter(|f| self.tree.contains(*f));
        if let Some(focus) = focus {
            if self.tree.dispatch_key(focus, key, down, None).is_handled() {
                return EventResult::Handled;
            }
        }
        let target = self.modal.unwrap_or(self.root);
        self.tree.dispatch_key(target, key, down, focus)
    }

    /// Deliver dropped data. Refused while a modal or focus view is active.
    pub fn on_drop(&mut self, payload: &DragPayload, where_: Point) -> bool {
        if self.modal.is_some() || self.focus.is_some() {
            tracing::debug!("drop refused while modal or focus view is active");
            return false;
        }
        let mut dc = self.event_context();
        let accepted = self.tree.on_drop(self.root, &mut dc, payload, where_);
        self.apply_requests();
        accepted
    }

    /// A drag entered the window.
    pub fn on_drag_enter(&mut self, payload: &DragPayload, where_: Point) {
        if self.modal.is_none() {
            self.tree.on_drag_enter(self.root, payload, where_);
        }
    }

    /// A drag left the window.
    pub fn on_drag_leave(&mut self, payload: &DragPayload, where_: Point) {
        self.tree.on_drag_leave(self.root, payload, where_);
    }

    /// A drag moved inside the window.
    pub fn on_drag_move(&mut self, payload: &DragPayload, where_: Point) {
        if self.modal.is_none() {
            self.tree.on_drag_move(self.root, payload, where_);
        }
    }

    /// Install or clear the modal view.
    ///
    /// Installing fails while another modal view is set. A parentless view is added to the
    /// root (adopting the caller's reference); clearing hands that reference back.
    pub fn set_modal_view(&mut self, view: Option<ViewId>) -> bool {
        match view {
            Some(v) => {
                if self.modal.is_some() || !self.tree.contains(v) {
                    return false;
                }
                let adopted = match self.tree.parent(v) {
                    None => {
                        if !self.tree.add_view(self.root, v) {
                            return false;
                        }
                        true
                    }
                    Some(p) if p == self.root => false,
                    Some(_) => return false,
                };
                self.tree.set_topmost(self.root, Some(v));
                self.tree.invalid(v);
                self.modal = Some(v);
                self.modal_adopted = adopted;
                tracing::debug!(view = %v, "modal view installed");
                true
            }
            None => {
                if let Some(old) = self.modal.take() {
                    self.tree.set_topmost(self.root, None);
                    if self.modal_adopted {
                        self.tree.remove_view(self.root, old, false);
                    } else {
                        self.tree.invalid(self.root);
                    }
                    self.modal_adopted = false;
                }
                true
            }
        }
    }

    /// Current modal view.
    pub fn modal_view(&self) -> Option<ViewId> {
        self.modal.filter(|m| self.tree.contains(*m))
    }

    /// Move keyboard focus; the old and new focus views are told and dirtied.
    pub fn set_focus_view(&mut self, view: Option<ViewId>) {
        let view = view.filter(|v| self.tree.contains(*v));
        if view == self.focus {
            return;
        }
        if let Some(old) = self.focus.take().filter(|v| self.tree.contains(*v)) {
            self.tree.notify_focus(old, false);
        }
        self.focus = view;
        if let Some(new) = view {
            self.tree.notify_focus(new, true);
        }
    }

    /// Current focus view.
    pub fn get_focus_view(&self) -> Option<ViewId> {
        self.focus.filter(|f| self.tree.contains(*f))
    }

    /// Focus the next (or previous) focusable view in paint order, wrapping around.
    ///
    /// While a modal view is set only its subtree is searched.
    pub fn advance_next_focus_view(&mut self, reverse: bool) -> bool {
        let scope = self.modal.unwrap_or(self.root);
        let candidates: Vec<ViewId> = self
            .tree
            .descendants(scope)
            .into_iter()
            .filter(|v| self.tree.wants_focus(*v))
            .collect();
        if candidates.is_empty() {
            return false;
        }
        let n = candidates.len();
        let current = self.get_focus_view().and_then(|f| candidates.iter().position(|c| *c == f));
        let next = match (current, reverse) {
            (Some(i), false) => (i + 1) % n,
            (Some(i), true) => (i + n - 1) % n,
            (None, false) => 0,
            (None, true) => n - 1,
        };
        self.set_focus_view(Some(candidates[next]));
        true
    }

    /// Register an animation on `view`.
    pub fn add_animation(
        &mut self,
        view: ViewId,
        name: impl Into<String>,
        target: impl AnimationTarget + 'static,
        timing: impl TimingFunction + 'static,
    ) -> PlugframeResult<()> {
        self.animator.add_animation(&mut self.tree, view, name, target, timing)
    }

    /// Cancel a named animation.
    pub fn remove_animation(&mut self, view: ViewId, name: &str) -> bool {
        self.animator.remove_animation(&mut self.tree, view, name)
    }

    /// Cancel every animation of `view`.
    pub fn remove_animations(&mut self, view: ViewId) -> usize {
        self.animator.remove_animations(&mut self.tree, view)
    }

    /// Apply focus and animation requests queued by views during the last dispatch.
    fn apply_requests(&mut self) {
        for request in self.tree.take_requests() {
            match request {
                TreeRequest::Focus(v) => self.set_focus_view(Some(v)),
                TreeRequest::AddAnimation {
                    view,
                    name,
                    target,
                    timing,
                } => {
                    if let Err(err) = self
                        .animator
                        .add_boxed(&mut self.tree, view, name, target, timing, None, false)
                    {
                        tracing::warn!(view = %view, %err, "queued animation dropped");
                    }
                }
                TreeRequest::RemoveAnimation { view, name } => {
                    self.animator.remove_animation(&mut self.tree, view, &name);
                }
                TreeRequest::RemoveAnimations(view) => {
                    self.animator.remove_animations(&mut self.tree, view);
                }
            }
        }
    }
}

impl Drop for Frame {
    fn drop(&mut self) {
        self.animator.cancel_all(&mut self.tree);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/frame/frame.rs"]
mod tests;
