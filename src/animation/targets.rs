//! Stock animation targets.

use crate::animation::animator::AnimationTarget;
use crate::animation::lerp::lerp_to_end;
use crate::foundation::core::{Rect, Vec2};
use crate::foundation::error::{PlugframeError, PlugframeResult};
use crate::view::{ViewId, ViewTree};

/// Fades a view's alpha value from its value at start to `end`.
#[derive(Clone, Debug)]
pub struct AlphaValueAnimation {
    start: f32,
    end: f32,
    force_end_value_on_finish: bool,
}

impl AlphaValueAnimation {
    /// Fade to `end`. With `force_end_value_on_finish`, a cancel still snaps to `end`.
    pub fn new(end: f32, force_end_value_on_finish: bool) -> Self {
        Self {
            start: 0.0,
            end: end.clamp(0.0, 1.0),
            force_end_value_on_finish,
        }
    }
}

impl AnimationTarget for AlphaValueAnimation {
    fn animation_start(&mut self, tree: &mut ViewTree, view: ViewId, _name: &str) {
        self.start = tree.alpha_value(view);
    }

    fn animation_tick(&mut self, tree: &mut ViewTree, view: ViewId, _name: &str, pos: f32) {
        tree.set_alpha_value(view, lerp_to_end(&self.start, &self.end, pos));
    }

    fn animation_finished(&mut self, tree: &mut ViewTree, view: ViewId, _name: &str, was_canceled: bool) {
        if !was_canceled || self.force_end_value_on_finish {
            tree.set_alpha_value(view, self.end);
        }
    }
}

/// Moves and resizes a view toward `end`, keeping its hit area in sync.
#[derive(Clone, Debug)]
pub struct ViewSizeAnimation {
    start: Rect,
    end: Rect,
    force_end_value_on_finish: bool,
}

impl ViewSizeAnimation {
    /// Animate the bounds to `end`.
    pub fn new(end: Rect, force_end_value_on_finish: bool) -> Self {
        Self {
            start: Rect::ZERO,
            end,
            force_end_value_on_finish,
        }
    }
}

/// Apply new bounds, dirtying the parent so the uncovered area repaints.
fn move_view(tree: &mut ViewTree, view: ViewId, rect: Rect) {
    if tree.view_size(view) == Some(rect) {
        return;
    }
    if let Some(parent) = tree.parent(view) {
        tree.invalid(parent);
    }
    tree.set_view_size(view, rect);
    tree.set_mouseable_area(view, rect);
}

impl AnimationTarget for ViewSizeAnimation {
    fn animation_start(&mut self, tree: &mut ViewTree, view: ViewId, _name: &str) {
        self.start = tree.view_size(view).unwrap_or(self.end);
    }

    fn animation_tick(&mut self, tree: &mut ViewTree, view: ViewId, _name: &str, pos: f32) {
        let r = lerp_to_end(&self.start, &self.end, pos).round();
        move_view(tree, view, r);
    }

    fn animation_finished(&mut self, tree: &mut ViewTree, view: ViewId, _name: &str, was_canceled: bool) {
        if !was_canceled || self.force_end_value_on_finish {
            move_view(tree, view, self.end);
        }
    }
}

/// Drives the value of a control view toward `end`.
#[derive(Clone, Debug)]
pub struct ControlValueAnimation {
    start: f32,
    end: f32,
    force_end_value_on_finish: bool,
}

impl ControlValueAnimation {
    /// Animate the control value to `end`.
    pub fn new(end: f32, force_end_value_on_finish: bool) -> Self {
        Self {
            start: 0.0,
            end,
            force_end_value_on_finish,
        }
    }
}

fn set_control_value(tree: &mut ViewTree, view: ViewId, value: f32) {
    if tree.with_control_mut(view, |c| c.set_value(value)).is_some() {
        tree.invalid(view);
    }
}

impl AnimationTarget for ControlValueAnimation {
    fn animation_start(&mut self, tree: &mut ViewTree, view: ViewId, _name: &str) {
        match tree.control(view) {
            Some(c) => self.start = c.value(),
            None => tracing::warn!(view = %view, "control value animation on a view without control"),
        }
    }

    fn animation_tick(&mut self, tree: &mut ViewTree, view: ViewId, _name: &str, pos: f32) {
        set_control_value(tree, view, lerp_to_end(&self.start, &self.end, pos));
    }

    fn animation_finished(&mut self, tree: &mut ViewTree, view: ViewId, _name: &str, was_canceled: bool) {
        if !was_canceled || self.force_end_value_on_finish {
            set_control_value(tree, view, self.end);
        }
    }
}

/// How [`ExchangeViewAnimation`] brings the new view in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeStyle {
    /// Cross-fade alpha values.
    AlphaValueFade,
    /// Slide the new view in from the left edge.
    PushInFromLeft,
    /// Slide the new view in from the right edge.
    PushInFromRight,
    /// Slide the new view in from the top edge.
    PushInFromTop,
    /// Slide the new view in from the bottom edge.
    PushInFromBottom,
    /// Slide in from the left while pushing the old view out to the right.
    PushInOutFromLeft,
    /// Slide in from the right while pushing the old view out to the left.
    PushInOutFromRight,
}

/// Replaces one child of a container with another, removing the old one when done.
///
/// Register it on the shared parent container (see [`ExchangeViewAnimation::container`]).
#[derive(Debug)]
pub struct ExchangeViewAnimation {
    old: ViewId,
    new: ViewId,
    container: ViewId,
    style: ExchangeStyle,
    old_alpha_start: f32,
    new_alpha_end: f32,
    destination: Rect,
    started: bool,
}

impl ExchangeViewAnimation {
    /// Check that `old` can be replaced by `new`.
    ///
    /// `old` must be a child of a container; `new` must be parentless. Nothing changes in the
    /// tree until the animation is registered: `animation_start` adds `new` next to `old` and
    /// prepares the first frame of `style`, and the container adopts the caller's reference to
    /// `new` at that point.
    pub fn new(tree: &ViewTree, old: ViewId, new: ViewId, style: ExchangeStyle) -> PlugframeResult<Self> {
        let Some(container) = tree.parent(old) else {
            return Err(PlugframeError::animation(format!("view {old} to exchange has no parent")));
        };
        if !tree.contains(new) || tree.parent(new).is_some() {
            return Err(PlugframeError::animation(format!("replacement view {new} must be live and parentless")));
        }
        Ok(Self {
            old,
            new,
            container,
            style,
            old_alpha_start: tree.alpha_value(old),
            new_alpha_end: tree.alpha_value(new),
            destination: tree.view_size(old).unwrap_or(Rect::ZERO),
            started: false,
        })
    }

    /// Container the animation must be registered on.
    pub fn container(&self) -> ViewId {
        self.container
    }

    fn apply(&self, tree: &mut ViewTree, pos: f32) {
        let pos = f64::from(pos);
        let dest = self.destination;
        let new_size = tree.view_size(self.new).unwrap_or(dest);
        let at = |x: f64, y: f64| Rect::from_origin_size((x, y), new_size.size());
        match self.style {
            ExchangeStyle::AlphaValueFade => {
                let p = pos as f32;
                tree.set_alpha_value(self.old, self.old_alpha_start - self.old_alpha_start * p);
                tree.set_alpha_value(self.new, self.new_alpha_end * p);
            }
            ExchangeStyle::PushInFromLeft => {
                let r = at(dest.x0 - new_size.width() * (1.0 - pos), new_size.y0);
                move_view(tree, self.new, r);
            }
            ExchangeStyle::PushInFromRight => {
                let r = at(dest.x1 - new_size.width() * pos, new_size.y0);
                move_view(tree, self.new, r);
            }
            ExchangeStyle::PushInFromTop => {
                let r = at(new_size.x0, dest.y0 - new_size.height() * (1.0 - pos));
                move_view(tree, self.new, r);
            }
            ExchangeStyle::PushInFromBottom => {
                let r = at(new_size.x0, dest.y1 - new_size.height() * pos);
                move_view(tree, self.new, r);
            }
            ExchangeStyle::PushInOutFromLeft => {
                let r = at(dest.x0 - new_size.width() * (1.0 - pos), new_size.y0);
                move_view(tree, self.new, r);
                move_view(tree, self.old, dest + Vec2::new(dest.width() * pos, 0.0));
            }
            ExchangeStyle::PushInOutFromRight => {
                let r = at(dest.x1 - new_size.width() * pos, new_size.y0);
                move_view(tree, self.new, r);
                move_view(tree, self.old, dest - Vec2::new(dest.width() * pos, 0.0));
            }
        }
    }
}

impl AnimationTarget for ExchangeViewAnimation {
    fn animation_start(&mut self, tree: &mut ViewTree, view: ViewId, name: &str) {
        if view != self.container {
            tracing::warn!(view = %view, name, container = %self.container, "exchange animation registered on a view other than the parent");
        }
        if tree.parent(self.old) != Some(self.container) || !tree.add_view(self.container, self.new) {
            tracing::warn!(old = %self.old, new = %self.new, name, "exchange views changed before the animation started");
            return;
        }
        tree.remember(self.old);
        self.started = true;
        if self.style == ExchangeStyle::AlphaValueFade {
            tree.set_alpha_value(self.new, 0.0);
        } else {
            self.apply(tree, 0.0);
        }
    }

    fn animation_tick(&mut self, tree: &mut ViewTree, _view: ViewId, _name: &str, pos: f32) {
        if self.started {
            self.apply(tree, pos);
        }
    }

    fn animation_finished(&mut self, tree: &mut ViewTree, _view: ViewId, _name: &str, was_canceled: bool) {
        if !std::mem::take(&mut self.started) {
            return;
        }
        if was_canceled {
            self.apply(tree, 1.0);
        }
        if let Some(parent) = tree.parent(self.old) {
            tree.remove_view(parent, self.old, true);
        }
        if tree.contains(self.old) {
            tree.forget(self.old);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/targets.rs"]
mod tests;
