use smallvec::SmallVec;

use crate::animation::{AnimationTarget, TimingFunction};
use crate::bitmap::Bitmap;
use crate::controls::Control;
use crate::draw::offscreen::{OffscreenBackground, OffscreenContext};
use crate::foundation::core::{Color, Point, Rect, Vec2};
use crate::view::behavior::{View, ViewCx};
use crate::view::data::ViewData;
use crate::view::id::ViewId;
use crate::view::UpdateMode;

pub(crate) type ChildList = SmallVec<[ViewId; 8]>;

pub(crate) struct ContainerState {
    pub(crate) children: ChildList,
    pub(crate) background_color: Color,
    pub(crate) background_offset: Point,
    pub(crate) offscreen: Option<OffscreenContext>,
    pub(crate) use_offscreen: bool,
    pub(crate) update_mode: UpdateMode,
    pub(crate) topmost: Option<ViewId>,
    pub(crate) drag_view: Option<ViewId>,
}

pub(crate) struct Node {
    pub(crate) ref_count: u32,
    pub(crate) data: ViewData,
    pub(crate) parent: Option<ViewId>,
    pub(crate) attached: bool,
    pub(crate) container: Option<ContainerState>,
    pub(crate) behavior: Option<Box<dyn View>>,
}

struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Work a view asks the owning frame to do once the current dispatch returns.
pub(crate) enum TreeRequest {
    Focus(ViewId),
    AddAnimation {
        view: ViewId,
        name: String,
        target: Box<dyn AnimationTarget>,
        timing: Box<dyn TimingFunction>,
    },
    RemoveAnimation {
        view: ViewId,
        name: String,
    },
    RemoveAnimations(ViewId),
}

/// Arena owning every view of one editor.
///
/// Ownership is an explicit reference count per view. Creating a view hands the caller one
/// reference; [`ViewTree::add_view`] transfers that reference to the container, and
/// [`ViewTree::remember`]/[`ViewTree::forget`] add and drop further ones. A view is destroyed
/// when its count reaches zero, which in turn releases its children.
pub struct ViewTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
    requests: Vec<TreeRequest>,
    draw_in_offscreen: bool,
    update_mode: UpdateMode,
}

impl Default for ViewTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewTree {
    /// Empty tree; new containers composite directly and use [`UpdateMode::Normal`].
    pub fn new() -> Self {
        Self::with_defaults(false, UpdateMode::Normal)
    }

    /// Empty tree with defaults for newly created containers.
    pub fn with_defaults(draw_in_offscreen: bool, update_mode: UpdateMode) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
            requests: Vec::new(),
            draw_in_offscreen,
            update_mode,
        }
    }

    pub(crate) fn node(&self, id: ViewId) -> Option<&Node> {
        let slot = self.slots.get(id.idx as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_ref()
    }

    pub(crate) fn node_mut(&mut self, id: ViewId) -> Option<&mut Node> {
        let slot = self.slots.get_mut(id.idx as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_mut()
    }

    pub(crate) fn container(&self, id: ViewId) -> Option<&ContainerState> {
        self.node(id)?.container.as_ref()
    }

    pub(crate) fn container_mut(&mut self, id: ViewId) -> Option<&mut ContainerState> {
        self.node_mut(id)?.container.as_mut()
    }

    fn insert(&mut self, node: Node) -> ViewId {
        self.live += 1;
        if let Some(idx) = self.free.pop() {
            let slot = &mut self.slots[idx as usize];
            slot.node = Some(node);
            return ViewId::new(idx, slot.generation);
        }
        let idx = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        ViewId::new(idx, 0)
    }

    fn create_node(&mut self, size: Rect, container: bool, behavior: Option<Box<dyn View>>) -> ViewId {
        let mut data = ViewData::new(size);
        if let Some(b) = behavior.as_ref() {
            b.configure(&mut data);
        }
        let container = container.then(|| ContainerState {
            children: ChildList::new(),
            background_color: Color::BLACK,
            background_offset: Point::ZERO,
            offscreen: None,
            use_offscreen: self.draw_in_offscreen,
            update_mode: self.update_mode,
            topmost: None,
            drag_view: None,
        });
        let id = self.insert(Node {
            ref_count: 1,
            data,
            parent: None,
            attached: false,
            container,
            behavior,
        });
        tracing::trace!(view = %id, ?size, "created view");
        id
    }

    /// Create a leaf view driven by `behavior`. The caller owns the returned reference.
    pub fn create_view(&mut self, size: Rect, behavior: impl View + 'static) -> ViewId {
        self.create_node(size, false, Some(Box::new(behavior)))
    }

    /// Create a leaf view without behavior; it paints only its background bitmap.
    pub fn create_bare_view(&mut self, size: Rect) -> ViewId {
        self.create_node(size, false, None)
    }

    /// Create an empty container.
    pub fn create_container(&mut self, size: Rect) -> ViewId {
        self.create_node(size, true, None)
    }

    /// Create a container whose input and lifecycle hooks are handled by `behavior`.
    pub fn create_container_with(&mut self, size: Rect, behavior: impl View + 'static) -> ViewId {
        self.create_node(size, true, Some(Box::new(behavior)))
    }

    /// `true` while `id` refers to a live view.
    pub fn contains(&self, id: ViewId) -> bool {
        self.node(id).is_some()
    }

    /// Number of live views.
    pub fn len(&self) -> usize {
        self.live
    }

    /// `true` when no view is alive.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// `true` if `id` is a live container.
    pub fn is_container(&self, id: ViewId) -> bool {
        self.container(id).is_some()
    }

    /// Current reference count.
    pub fn ref_count(&self, id: ViewId) -> Option<u32> {
        self.node(id).map(|n| n.ref_count)
    }

    /// Take another reference to `id`.
    pub fn remember(&mut self, id: ViewId) -> bool {
        match self.node_mut(id) {
            Some(n) => {
                n.ref_count += 1;
                true
            }
            None => false,
        }
    }

    /// Drop one reference; destroys the view when none remain. Returns `true` if it was
    /// destroyed.
    pub fn forget(&mut self, id: ViewId) -> bool {
        let Some(node) = self.node_mut(id) else {
            debug_assert!(false, "forget on destroyed view {id}");
            tracing::error!(view = %id, "forget on destroyed view ignored");
            return false;
        };
        node.ref_count -= 1;
        if node.ref_count > 0 {
            return false;
        }
        self.destroy(id);
        true
    }

    fn destroy(&mut self, id: ViewId) {
        let Some((parent, attached)) = self.node(id).map(|n| (n.parent, n.attached)) else {
            return;
        };
        if attached {
            self.detach(id);
        }
        if let Some(p) = parent {
            self.unlink(p, id);
        }
        let slot = &mut self.slots[id.idx as usize];
        let Some(node) = slot.node.take() else {
            return;
        };
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.idx);
        self.live -= 1;
        tracing::trace!(view = %id, "destroyed view");

        if let Some(c) = node.container {
            for child in c.children {
                if let Some(n) = self.node_mut(child) {
                    n.parent = None;
                }
                self.forget(child);
            }
        }
        drop(node.behavior);
    }

    fn unlink(&mut self, container: ViewId, child: ViewId) -> bool {
        let Some(c) = self.container_mut(container) else {
            return false;
        };
        let Some(pos) = c.children.iter().position(|v| *v == child) else {
            return false;
        };
        c.children.remove(pos);
        if c.topmost == Some(child) {
            c.topmost = None;
        }
        if c.drag_view == Some(child) {
            c.drag_view = None;
        }
        true
    }

    /// Container holding `id`.
    pub fn parent(&self, id: ViewId) -> Option<ViewId> {
        self.node(id)?.parent
    }

    /// Children of a container in paint order (empty for leaves).
    pub fn children(&self, id: ViewId) -> &[ViewId] {
        match self.container(id) {
            Some(c) => &c.children,
            None => &[],
        }
    }

    /// Number of children.
    pub fn view_count(&self, id: ViewId) -> usize {
        self.children(id).len()
    }

    /// Child at `index` in insertion order.
    pub fn get_view(&self, id: ViewId, index: usize) -> Option<ViewId> {
        self.children(id).get(index).copied()
    }

    /// `true` if `view` is a child of `container`, or any descendant when `deep`.
    pub fn is_child(&self, container: ViewId, view: ViewId, deep: bool) -> bool {
        self.children(container)
            .iter()
            .any(|c| *c == view || (deep && self.is_child(*c, view, true)))
    }

    /// Topmost child whose bounds contain `p` (container-local coordinates).
    ///
    /// With `deep`, a hit container is searched recursively and its answer returned.
    pub fn get_view_at(&self, container: ViewId, p: Point, deep: bool) -> Option<ViewId> {
        for child in self.hit_order(container) {
            let Some(n) = self.node(child) else {
                continue;
            };
            if !n.data.visible || !n.data.size.contains(p) {
                continue;
            }
            if deep && n.container.is_some() {
                let origin = n.data.size.origin().to_vec2();
                return self.get_view_at(child, p - origin, true);
            }
            return Some(child);
        }
        None
    }

    pub(crate) fn paint_order(&self, id: ViewId) -> ChildList {
        let Some(c) = self.container(id) else {
            return ChildList::new();
        };
        let mut out: ChildList = c
            .children
            .iter()
            .copied()
            .filter(|v| Some(*v) != c.topmost)
            .collect();
        if let Some(top) = c.topmost.filter(|t| c.children.contains(t)) {
            out.push(top);
        }
        out
    }

    pub(crate) fn hit_order(&self, id: ViewId) -> ChildList {
        let mut out = self.paint_order(id);
        out.reverse();
        out
    }

    /// Views under `id` (inclusive) in depth-first paint order.
    pub fn descendants(&self, id: ViewId) -> Vec<ViewId> {
        let mut out = Vec::new();
        self.collect_descendants(id, &mut out);
        out
    }

    fn collect_descendants(&self, id: ViewId, out: &mut Vec<ViewId>) {
        if !self.contains(id) {
            return;
        }
        out.push(id);
        for child in self.paint_order(id) {
            self.collect_descendants(child, out);
        }
    }

    /// Append `child` to `container`, adopting the caller's reference.
    pub fn add_view(&mut self, container: ViewId, child: ViewId) -> bool {
        self.insert_child(container, child, None, None)
    }

    /// [`ViewTree::add_view`] with an explicit hit area and mouse flag.
    pub fn add_view_with(
        &mut self,
        container: ViewId,
        child: ViewId,
        mouseable_area: Rect,
        mouse_enabled: bool,
    ) -> bool {
        self.insert_child(container, child, Some(mouseable_area), Some(mouse_enabled))
    }

    fn insert_child(
        &mut self,
        container: ViewId,
        child: ViewId,
        mouseable_area: Option<Rect>,
        mouse_enabled: Option<bool>,
    ) -> bool {
        if container == child || !self.is_container(container) {
            tracing::warn!(container = %container, child = %child, "add_view target is not a container");
            return false;
        }
        match self.node(child) {
            Some(n) if n.parent.is_none() => {}
            _ => {
                tracing::warn!(container = %container, child = %child, "add_view child is dead or already attached");
                return false;
            }
        }
        let mut up = Some(container);
        while let Some(v) = up {
            if v == child {
                tracing::warn!(container = %container, child = %child, "add_view would create a cycle");
                return false;
            }
            up = self.parent(v);
        }

        let attached = self.node(container).is_some_and(|n| n.attached);
        if let Some(c) = self.container_mut(container) {
            c.children.push(child);
        }
        if let Some(n) = self.node_mut(child) {
            n.parent = Some(container);
            n.data.dirty = true;
            if let Some(area) = mouseable_area {
                n.data.mouseable_area = area;
            }
            if let Some(on) = mouse_enabled {
                n.data.mouse_enabled = on;
            }
        }
        if attached {
            self.attach(child);
        }
        true
    }

    /// Unlink `child`; with `with_forget` the container's reference is released too.
    pub fn remove_view(&mut self, container: ViewId, child: ViewId, with_forget: bool) -> bool {
        if !self.unlink(container, child) {
            return false;
        }
        if self.node(child).is_some_and(|n| n.attached) {
            self.detach(child);
        }
        if let Some(n) = self.node_mut(child) {
            n.parent = None;
        }
        self.set_dirty(container, true);
        if with_forget {
            self.forget(child);
        }
        true
    }

    /// Unlink every child of `container`.
    pub fn remove_all(&mut self, container: ViewId, with_forget: bool) {
        let children: ChildList = self.children(container).iter().copied().collect();
        for child in children {
            self.remove_view(container, child, with_forget);
        }
    }

    /// `true` once the view is reachable from an attached root.
    pub fn is_attached(&self, id: ViewId) -> bool {
        self.node(id).is_some_and(|n| n.attached)
    }

    /// Mark a parentless view as the attached root of a window.
    pub fn attach_root(&mut self, id: ViewId) -> bool {
        match self.node(id) {
            Some(n) if n.parent.is_none() && !n.attached => {
                self.attach(id);
                true
            }
            _ => false,
        }
    }

    fn attach(&mut self, id: ViewId) {
        if let Some(n) = self.node_mut(id) {
            n.attached = true;
        }
        self.ensure_offscreen(id);
        self.with_behavior(id, |b, cx| b.attached(cx));
        for child in self.paint_order(id) {
            self.attach(child);
        }
    }

    fn detach(&mut self, id: ViewId) {
        for child in self.paint_order(id) {
            self.detach(child);
        }
        if let Some(c) = self.container_mut(id) {
            c.offscreen = None;
            c.drag_view = None;
        }
        self.with_behavior(id, |b, cx| b.removed(cx));
        if let Some(n) = self.node_mut(id) {
            n.attached = false;
        }
    }

    /// Node data.
    pub fn data(&self, id: ViewId) -> Option<&ViewData> {
        self.node(id).map(|n| &n.data)
    }

    /// Mutable node data. Geometry changes should go through [`ViewTree::set_view_size`].
    pub fn data_mut(&mut self, id: ViewId) -> Option<&mut ViewData> {
        self.node_mut(id).map(|n| &mut n.data)
    }

    /// Bounds in parent coordinates.
    pub fn view_size(&self, id: ViewId) -> Option<Rect> {
        self.data(id).map(|d| d.size)
    }

    /// Replace the bounds and mark the view dirty.
    ///
    /// A hit area that tracked the old bounds follows the new ones. A container's offscreen
    /// buffer is recreated at the new pixel size.
    pub fn set_view_size(&mut self, id: ViewId, rect: Rect) -> bool {
        let Some(n) = self.node_mut(id) else {
            return false;
        };
        let old = n.data.size;
        n.data.size = rect;
        if n.data.mouseable_area == old {
            n.data.mouseable_area = rect;
        }
        n.data.dirty = true;
        let stale = n
            .container
            .as_ref()
            .and_then(|c| c.offscreen.as_ref())
            .is_some_and(|o| (o.width(), o.height()) != pixel_dims(rect));
        if stale {
            if let Some(c) = self.container_mut(id) {
                c.offscreen = None;
            }
            self.ensure_offscreen(id);
            tracing::debug!(view = %id, ?rect, "recreated offscreen after resize");
        }
        true
    }

    /// Hit-test region in parent coordinates.
    pub fn mouseable_area(&self, id: ViewId) -> Option<Rect> {
        self.data(id).map(|d| d.mouseable_area)
    }

    /// Replace the hit-test region.
    pub fn set_mouseable_area(&mut self, id: ViewId, rect: Rect) {
        if let Some(d) = self.data_mut(id) {
            d.mouseable_area = rect;
        }
    }

    /// Set or clear the dirty flag. Clearing a container clears its descendants too.
    pub fn set_dirty(&mut self, id: ViewId, dirty: bool) {
        let Some(d) = self.data_mut(id) else {
            return;
        };
        d.dirty = dirty;
        if !dirty {
            for child in self.paint_order(id) {
                if self.is_dirty(child) {
                    self.set_dirty(child, false);
                }
            }
        }
    }

    /// Mark the view as needing a repaint.
    pub fn invalid(&mut self, id: ViewId) {
        self.set_dirty(id, true);
    }

    /// `true` if the view or anything below it is dirty.
    pub fn is_dirty(&self, id: ViewId) -> bool {
        let Some(n) = self.node(id) else {
            return false;
        };
        n.data.dirty
            || n
                .container
                .as_ref()
                .is_some_and(|c| c.children.iter().any(|v| self.is_dirty(*v)))
    }

    /// The view's own dirty flag, ignoring descendants.
    pub fn is_self_dirty(&self, id: ViewId) -> bool {
        self.data(id).is_some_and(|d| d.dirty)
    }

    /// Include or exclude the view from hit-testing.
    pub fn set_mouse_enabled(&mut self, id: ViewId, on: bool) {
        if let Some(d) = self.data_mut(id) {
            d.mouse_enabled = on;
        }
    }

    /// Whether the view takes part in hit-testing.
    pub fn mouse_enabled(&self, id: ViewId) -> bool {
        self.data(id).is_some_and(|d| d.mouse_enabled)
    }

    /// Toggle background transparency.
    pub fn set_transparent(&mut self, id: ViewId, on: bool) {
        if let Some(d) = self.data_mut(id) {
            if d.transparent != on {
                d.transparent = on;
                d.dirty = true;
            }
        }
    }

    /// Whether the background is skipped.
    pub fn is_transparent(&self, id: ViewId) -> bool {
        self.data(id).is_some_and(|d| d.transparent)
    }

    /// Show or hide the view. The parent is dirtied so the uncovered area repaints.
    pub fn set_visible(&mut self, id: ViewId, on: bool) {
        let Some(d) = self.data_mut(id) else {
            return;
        };
        if d.visible == on {
            return;
        }
        d.visible = on;
        d.dirty = true;
        if let Some(p) = self.parent(id) {
            self.invalid(p);
        }
    }

    /// Whether the view is painted and hit.
    pub fn is_visible(&self, id: ViewId) -> bool {
        self.data(id).is_some_and(|d| d.visible)
    }

    /// Opacity multiplier, `1.0` for unknown views.
    pub fn alpha_value(&self, id: ViewId) -> f32 {
        self.data(id).map_or(1.0, |d| d.alpha_value)
    }

    /// Set the opacity multiplier, clamped to `[0, 1]`; dirties the view on change.
    pub fn set_alpha_value(&mut self, id: ViewId, alpha: f32) {
        let alpha = alpha.clamp(0.0, 1.0);
        if let Some(d) = self.data_mut(id) {
            if d.alpha_value != alpha {
                d.alpha_value = alpha;
                d.dirty = true;
            }
        }
    }

    /// Application tag.
    pub fn tag(&self, id: ViewId) -> Option<i32> {
        self.data(id).map(|d| d.tag)
    }

    /// Replace the application tag.
    pub fn set_tag(&mut self, id: ViewId, tag: i32) {
        if let Some(d) = self.data_mut(id) {
            d.tag = tag;
        }
    }

    /// Background bitmap handle.
    pub fn background(&self, id: ViewId) -> Option<Bitmap> {
        self.data(id)?.background.clone()
    }

    /// Replace the background bitmap, taking a reference to it.
    pub fn set_background(&mut self, id: ViewId, bitmap: Option<Bitmap>) {
        if let Some(d) = self.data_mut(id) {
            d.background = bitmap;
            d.dirty = true;
        }
    }

    /// Container background fill.
    pub fn background_color(&self, id: ViewId) -> Option<Color> {
        self.container(id).map(|c| c.background_color)
    }

    /// Replace the container background fill.
    pub fn set_background_color(&mut self, id: ViewId, color: Color) {
        if let Some(c) = self.container_mut(id) {
            c.background_color = color;
        }
        self.invalid(id);
    }

    /// Offset into the background bitmap.
    pub fn background_offset(&self, id: ViewId) -> Option<Point> {
        self.container(id).map(|c| c.background_offset)
    }

    /// Set the offset into the background bitmap.
    pub fn set_background_offset(&mut self, id: ViewId, offset: Point) {
        if let Some(c) = self.container_mut(id) {
            c.background_offset = offset;
        }
        self.invalid(id);
    }

    /// Enable or disable offscreen compositing for a container.
    pub fn use_offscreen(&mut self, id: ViewId, on: bool) {
        let Some(c) = self.container_mut(id) else {
            return;
        };
        c.use_offscreen = on;
        if !on {
            c.offscreen = None;
        }
        if on && self.is_attached(id) {
            self.ensure_offscreen(id);
        }
        self.invalid(id);
    }

    /// Whether a container composites through an offscreen buffer.
    pub fn uses_offscreen(&self, id: ViewId) -> bool {
        self.container(id).is_some_and(|c| c.use_offscreen)
    }

    /// Pixel size of a container's current offscreen buffer.
    pub fn offscreen_size(&self, id: ViewId) -> Option<(u32, u32)> {
        let o = self.container(id)?.offscreen.as_ref()?;
        Some((o.width(), o.height()))
    }

    /// Container update policy.
    pub fn update_mode(&self, id: ViewId) -> Option<UpdateMode> {
        self.container(id).map(|c| c.update_mode)
    }

    /// Replace the container update policy.
    pub fn set_update_mode(&mut self, id: ViewId, mode: UpdateMode) {
        if let Some(c) = self.container_mut(id) {
            c.update_mode = mode;
        }
    }

    /// Child of `container` that paints last and is hit first, regardless of insertion order.
    pub fn set_topmost(&mut self, container: ViewId, child: Option<ViewId>) -> bool {
        if child.is_some_and(|v| self.parent(v) != Some(container)) {
            return false;
        }
        match self.container_mut(container) {
            Some(c) => {
                c.topmost = child;
                true
            }
            None => false,
        }
    }

    /// Convert a point from the coordinate space `id` paints its children in (a leaf's
    /// parent space) to root coordinates.
    pub fn local_to_frame(&self, id: ViewId, p: Point) -> Point {
        p + self.frame_offset(id)
    }

    /// Inverse of [`ViewTree::local_to_frame`].
    pub fn frame_to_local(&self, id: ViewId, p: Point) -> Point {
        p - self.frame_offset(id)
    }

    pub(crate) fn frame_offset(&self, id: ViewId) -> Vec2 {
        let mut cur = if self.is_container(id) { Some(id) } else { self.parent(id) };
        let mut off = Vec2::ZERO;
        while let Some(c) = cur {
            if let Some(d) = self.data(c) {
                off += d.size.origin().to_vec2();
            }
            cur = self.parent(c);
        }
        off
    }

    /// Concrete behavior of `id`, if it is a `T`.
    pub fn behavior_as<T: View>(&self, id: ViewId) -> Option<&T> {
        let b: &dyn std::any::Any = self.node(id)?.behavior.as_deref()?;
        b.downcast_ref::<T>()
    }

    /// Mutable concrete behavior of `id`, if it is a `T`.
    pub fn behavior_as_mut<T: View>(&mut self, id: ViewId) -> Option<&mut T> {
        let b: &mut dyn std::any::Any = self.node_mut(id)?.behavior.as_deref_mut()?;
        b.downcast_mut::<T>()
    }

    /// Control capability of `id`.
    pub fn control(&self, id: ViewId) -> Option<&dyn Control> {
        self.node(id)?.behavior.as_ref()?.as_control()
    }

    /// Run `f` on the control capability of `id`.
    pub fn with_control_mut<R>(&mut self, id: ViewId, f: impl FnOnce(&mut dyn Control) -> R) -> Option<R> {
        let control = self.node_mut(id)?.behavior.as_mut()?.as_control_mut()?;
        Some(f(control))
    }

    /// Attached views that asked for idle calls.
    pub fn idle_views(&self) -> Vec<ViewId> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, s)| {
                let n = s.node.as_ref()?;
                (n.attached && n.data.wants_idle).then(|| ViewId::new(idx as u32, s.generation))
            })
            .collect()
    }

    /// Run `f` with the behavior of `id` checked out and a context for its node.
    pub(crate) fn with_behavior<R>(
        &mut self,
        id: ViewId,
        f: impl FnOnce(&mut dyn View, &mut ViewCx<'_>) -> R,
    ) -> Option<R> {
        let mut behavior = self.node_mut(id)?.behavior.take()?;
        let out = {
            let mut cx = ViewCx::new(self, id);
            f(behavior.as_mut(), &mut cx)
        };
        if let Some(n) = self.node_mut(id) {
            if n.behavior.is_none() {
                n.behavior = Some(behavior);
            }
        }
        Some(out)
    }

    pub(crate) fn push_request(&mut self, request: TreeRequest) {
        self.requests.push(request);
    }

    pub(crate) fn take_requests(&mut self) -> Vec<TreeRequest> {
        std::mem::take(&mut self.requests)
    }

    /// Create the offscreen buffer of an offscreen-enabled container if it is missing.
    pub(crate) fn ensure_offscreen(&mut self, id: ViewId) -> bool {
        let Some(n) = self.node(id) else {
            return false;
        };
        let size = n.data.size;
        let Some(c) = n.container.as_ref() else {
            return false;
        };
        if !c.use_offscreen {
            return false;
        }
        if c.offscreen.is_some() {
            return true;
        }
        let (w, h) = pixel_dims(size);
        match OffscreenContext::new(w, h, OffscreenBackground::Color(Color::TRANSPARENT)) {
            Ok(off) => {
                if let Some(c) = self.container_mut(id) {
                    c.offscreen = Some(off);
                }
                true
            }
            Err(err) => {
                tracing::warn!(view = %id, %err, "offscreen unavailable, drawing directly");
                false
            }
        }
    }

    pub(crate) fn take_offscreen(&mut self, id: ViewId) -> Option<OffscreenContext> {
        self.container_mut(id)?.offscreen.take()
    }

    pub(crate) fn put_offscreen(&mut self, id: ViewId, off: OffscreenContext) {
        let Some(size) = self.view_size(id) else {
            return;
        };
        if let Some(c) = self.container_mut(id) {
            if c.use_offscreen && c.offscreen.is_none() && (off.width(), off.height()) == pixel_dims(size) {
                c.offscreen = Some(off);
            }
        }
    }
}

pub(crate) fn pixel_dims(r: Rect) -> (u32, u32) {
    let w = r.width().abs().ceil().min(f64::from(u32::MAX)) as u32;
    let h = r.height().abs().ceil().min(f64::from(u32::MAX)) as u32;
    (w, h)
}

#[cfg(test)]
#[path = "../../tests/unit/view/tree.rs"]
mod tests;
