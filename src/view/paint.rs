//! Paint passes: full draw, partial draw and incremental update.

use crate::draw::context::DrawContext;
use crate::draw::offscreen::OffscreenContext;
use crate::foundation::core::{Point, Rect, RectExt};
use crate::view::id::ViewId;
use crate::view::tree::ViewTree;
use crate::view::UpdateMode;

impl ViewTree {
    /// Repaint `id` unconditionally and clear its dirty state.
    ///
    /// Containers paint their background, then each child in insertion order, each child
    /// clipped to its own bounds. With offscreen compositing enabled the result is composed
    /// in the container's buffer and copied to `dc` in one blit.
    pub fn draw(&mut self, id: ViewId, dc: &mut dyn DrawContext) {
        let Some(n) = self.node(id) else {
            return;
        };
        if !n.data.visible {
            self.set_dirty(id, false);
            return;
        }
        let prev_alpha = dc.global_alpha();
        dc.set_global_alpha(prev_alpha * n.data.alpha_value);
        if n.container.is_some() {
            self.draw_container(id, dc, None);
        } else {
            self.draw_leaf(id, dc, None);
        }
        dc.set_global_alpha(prev_alpha);
        self.set_dirty(id, false);
    }

    /// Repaint only the part of `id` inside `update` (parent coordinates).
    pub fn draw_rect(&mut self, id: ViewId, dc: &mut dyn DrawContext, update: Rect) {
        let Some(n) = self.node(id) else {
            return;
        };
        if !n.data.visible || !update.overlaps_inclusive(&n.data.size) {
            return;
        }
        let is_container = n.container.is_some();
        let prev_alpha = dc.global_alpha();
        dc.set_global_alpha(prev_alpha * n.data.alpha_value);
        if is_container {
            self.draw_container(id, dc, Some(update));
        } else {
            self.draw_leaf(id, dc, Some(update));
            self.set_dirty(id, false);
        }
        dc.set_global_alpha(prev_alpha);
    }

    /// Incremental repaint honoring the container's [`UpdateMode`]; a no-op when clean.
    pub fn update(&mut self, id: ViewId, dc: &mut dyn DrawContext) {
        let Some(n) = self.node(id) else {
            return;
        };
        if !n.data.visible {
            return;
        }
        let mode = match n.container.as_ref() {
            None => {
                if n.data.dirty {
                    self.draw(id, dc);
                }
                return;
            }
            Some(c) => c.update_mode,
        };
        match mode {
            UpdateMode::Normal => {
                if self.is_dirty(id) {
                    self.draw(id, dc);
                }
            }
            UpdateMode::OnlyDirty => {
                if self.is_self_dirty(id) {
                    self.draw(id, dc);
                } else if self.is_dirty(id) {
                    self.update_dirty_children(id, dc);
                }
            }
        }
    }

    fn draw_leaf(&mut self, id: ViewId, dc: &mut dyn DrawContext, update: Option<Rect>) {
        let painted = self.with_behavior(id, |b, cx| match update {
            Some(r) => b.draw_rect(cx, dc, r),
            None => b.draw(cx, dc),
        });
        if painted.is_none() {
            self.draw_bare(id, dc);
        }
    }

    fn draw_bare(&self, id: ViewId, dc: &mut dyn DrawContext) {
        let Some(d) = self.data(id) else {
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

    /// `update` is in parent coordinates; `None` repaints everything.
    fn draw_container(&mut self, id: ViewId, dc: &mut dyn DrawContext, update: Option<Rect>) {
        let Some(size) = self.view_size(id) else {
            return;
        };
        let origin = size.origin().to_vec2();
        let bounds = size.originize();
        let area = match update {
            Some(u) => (u - origin).intersect(bounds),
            None => bounds,
        };
        if area.is_void() {
            return;
        }

        if self.ensure_offscreen(id) {
            if let Some(mut off) = self.take_offscreen(id) {
                let clip = self.begin_offscreen(id, &mut off, dc, area);
                self.paint_children(id, &mut off, clip, update.is_some());
                off.copy_from(dc, area + origin, area.origin());
                self.put_offscreen(id, off);
                return;
            }
        }

        let saved = dc.modify_for_container(origin);
        dc.intersect_clip(area);
        let clip = dc.clip_rect_device();
        self.paint_children(id, dc, clip, update.is_some());
        dc.restore_offsets(saved);
    }

    /// Prepare the offscreen for painting `area` (container-local) and return its clip.
    fn begin_offscreen(
        &self,
        id: ViewId,
        off: &mut OffscreenContext,
        dc: &mut dyn DrawContext,
        area: Rect,
    ) -> Rect {
        let origin = self.view_size(id).map_or(Point::ZERO, |r| r.origin()).to_vec2();
        off.reset_state();
        off.set_offset_screen(dc.offset_screen() + origin);
        let parent_clip = dc.clip_rect_device() - (dc.offset() + origin);
        let clip = area.bound(parent_clip);
        off.set_clip_rect_device(clip);
        if self.is_transparent(id) {
            off.erase(clip);
        }
        clip
    }

    /// Background plus children, with `dc` already in container-local space and clipped to
    /// `clip` (device).
    fn paint_children(&mut self, id: ViewId, dc: &mut dyn DrawContext, clip: Rect, partial: bool) {
        let area = clip - dc.offset();
        self.draw_background_rect(id, dc, area);
        for child in self.paint_order(id) {
            let Some(child_size) = self.view_size(child) else {
                continue;
            };
            dc.set_clip_rect_device(clip);
            dc.intersect_clip(child_size);
            if dc.clip_rect_device().is_void() {
                if !partial {
                    self.set_dirty(child, false);
                }
                continue;
            }
            if partial {
                self.draw_rect(child, dc, area);
            } else {
                self.draw(child, dc);
            }
        }
        dc.set_clip_rect_device(clip);
    }

    fn update_dirty_children(&mut self, id: ViewId, dc: &mut dyn DrawContext) {
        let Some(n) = self.node(id) else {
            return;
        };
        let size = n.data.size;
        let origin = size.origin().to_vec2();
        let prev_alpha = dc.global_alpha();
        dc.set_global_alpha(prev_alpha * n.data.alpha_value);

        if self.ensure_offscreen(id) {
            if let Some(mut off) = self.take_offscreen(id) {
                let clip = self.begin_offscreen(id, &mut off, dc, size.originize());
                self.repaint_dirty(id, &mut off, clip);
                off.copy_from(dc, size, Point::ZERO);
                self.put_offscreen(id, off);
                dc.set_global_alpha(prev_alpha);
                return;
            }
        }

        let saved = dc.modify_for_container(origin);
        dc.intersect_clip(size.originize());
        let clip = dc.clip_rect_device();
        self.repaint_dirty(id, dc, clip);
        dc.restore_offsets(saved);
        dc.set_global_alpha(prev_alpha);
    }

    /// Erase each dirty child's background and repaint it whole.
    fn repaint_dirty(&mut self, id: ViewId, dc: &mut dyn DrawContext, clip: Rect) {
        for child in self.paint_order(id) {
            if !self.is_dirty(child) {
                continue;
            }
            let Some(child_size) = self.view_size(child) else {
                continue;
            };
            dc.set_clip_rect_device(clip);
            dc.intersect_clip(child_size);
            if dc.clip_rect_device().is_void() {
                self.set_dirty(child, false);
                continue;
            }
            self.draw_background_rect(id, dc, child_size);
            self.draw(child, dc);
        }
        dc.set_clip_rect_device(clip);
    }

    /// Fill `rect` (container-local) with the container background.
    pub(crate) fn draw_background_rect(&self, id: ViewId, dc: &mut dyn DrawContext, rect: Rect) {
        let Some(n) = self.node(id) else {
            return;
        };
        let Some(c) = n.container.as_ref() else {
            return;
        };
        if let Some(bitmap) = n.data.background.as_ref() {
            let prev = dc.intersect_clip(rect);
            if !dc.clip_rect_device().is_void() {
                let full = Rect::new(0.0, 0.0, f64::from(bitmap.width()), f64::from(bitmap.height()));
                if n.data.transparent {
                    bitmap.draw_transparent(dc, full, c.background_offset);
                } else {
                    bitmap.draw(dc, full, c.background_offset);
                }
            }
            dc.set_clip_rect_device(prev);
        } else if !n.data.transparent {
            let prev = dc.fill_color();
            dc.set_fill_color(c.background_color);
            dc.fill_rect(rect);
            dc.set_fill_color(prev);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/view/paint.rs"]
mod tests;
