use crate::foundation::error::{PlugframeError, PlugframeResult};
use crate::view::{ViewId, ViewTree};

/// Changes a view from one state to another as an animation runs.
///
/// All three callbacks receive the tree so the target can mutate the animated view and
/// invalidate it; the registration holds a reference on the view, so `view` is alive for
/// every call.
pub trait AnimationTarget {
    /// Called once, synchronously, when the animation is registered.
    fn animation_start(&mut self, _tree: &mut ViewTree, _view: ViewId, _name: &str) {}
    /// Called with each new position in `[0, 1]`.
    fn animation_tick(&mut self, tree: &mut ViewTree, view: ViewId, name: &str, pos: f32);
    /// Called exactly once when the animation completes or is canceled.
    fn animation_finished(&mut self, _tree: &mut ViewTree, _view: ViewId, _name: &str, _was_canceled: bool) {}
}

/// Callback fired after a registration finishes: `(view, name, was_canceled)`.
pub type FinishNotification = Box<dyn FnOnce(ViewId, &str, bool)>;

struct Registration {
    view: ViewId,
    name: String,
    target: Box<dyn AnimationTarget>,
    timing: Box<dyn super::TimingFunction>,
    start_ms: Option<u64>,
    last_pos: Option<f32>,
    notify: Option<FinishNotification>,
    notify_on_cancel: bool,
}

/// Registry of running animations keyed by `(view, name)`.
pub struct Animator {
    entries: Vec<Registration>,
    interval_ms: u64,
}

impl Default for Animator {
    fn default() -> Self {
        Self::new(16)
    }
}

impl Animator {
    /// Empty animator expecting ticks every `interval_ms`.
    pub fn new(interval_ms: u64) -> Self {
        Self {
            entries: Vec::new(),
            interval_ms: interval_ms.max(1),
        }
    }

    /// Tick period the owner should drive [`Animator::tick`] at.
    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Number of active registrations.
    pub fn animation_count(&self) -> usize {
        self.entries.len()
    }

    /// `true` when nothing is running.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `(view, name)` is registered.
    pub fn has_animation(&self, view: ViewId, name: &str) -> bool {
        self.entries.iter().any(|e| e.view == view && e.name == name)
    }

    /// Register an animation, replacing (and canceling) one with the same `(view, name)`.
    pub fn add_animation(
        &mut self,
        tree: &mut ViewTree,
        view: ViewId,
        name: impl Into<String>,
        target: impl AnimationTarget + 'static,
        timing: impl super::TimingFunction + 'static,
    ) -> PlugframeResult<()> {
        self.add_boxed(tree, view, name.into(), Box::new(target), Box::new(timing), None, false)
    }

    /// [`Animator::add_animation`] with a callback after the animation finishes.
    ///
    /// The callback also fires on cancellation when `notify_on_cancel` is set.
    #[allow(clippy::too_many_arguments)]
    pub fn add_animation_with_notification(
        &mut self,
        tree: &mut ViewTree,
        view: ViewId,
        name: impl Into<String>,
        target: impl AnimationTarget + 'static,
        timing: impl super::TimingFunction + 'static,
        notify: impl FnOnce(ViewId, &str, bool) + 'static,
        notify_on_cancel: bool,
    ) -> PlugframeResult<()> {
        self.add_boxed(
            tree,
            view,
            name.into(),
            Box::new(target),
            Box::new(timing),
            Some(Box::new(notify)),
            notify_on_cancel,
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn add_boxed(
        &mut self,
        tree: &mut ViewTree,
        view: ViewId,
        name: String,
        mut target: Box<dyn AnimationTarget>,
        timing: Box<dyn super::TimingFunction>,
        notify: Option<FinishNotification>,
        notify_on_cancel: bool,
    ) -> PlugframeResult<()> {
        if !tree.contains(view) {
            return Err(PlugframeError::animation(format!(
                "cannot animate '{name}' on unknown view {view}"
            )));
        }
        self.remove_animation(tree, view, &name);
        tree.remember(view);
        target.animation_start(tree, view, &name);
        tracing::debug!(view = %view, name = %name, "animation added");
        self.entries.push(Registration {
            view,
            name,
            target,
            timing,
            start_ms: None,
            last_pos: None,
            notify,
            notify_on_cancel,
        });
        Ok(())
    }

    /// Cancel `(view, name)`. Returns `false` if it was not running.
    pub fn remove_animation(&mut self, tree: &mut ViewTree, view: ViewId, name: &str) -> bool {
        let Some(pos) = self.entries.iter().position(|e| e.view == view && e.name == name) else {
            return false;
        };
        let reg = self.entries.remove(pos);
        finish(tree, reg, true);
        true
    }

    /// Cancel every animation of `view`; returns how many were running.
    pub fn remove_animations(&mut self, tree: &mut ViewTree, view: ViewId) -> usize {
        let (gone, keep): (Vec<_>, Vec<_>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|e| e.view == view);
        self.entries = keep;
        let n = gone.len();
        for reg in gone {
            finish(tree, reg, true);
        }
        n
    }

    /// Cancel everything.
    pub fn cancel_all(&mut self, tree: &mut ViewTree) {
        for reg in std::mem::take(&mut self.entries) {
            finish(tree, reg, true);
        }
    }

    /// Advance every registration to `now_ms`, in registration order.
    ///
    /// A registration's clock starts at its first tick. Targets only see a tick when the
    /// position changed; finished registrations are removed after their last tick.
    #[tracing::instrument(level = "trace", skip(self, tree), fields(active = self.entries.len()))]
    pub fn tick(&mut self, tree: &mut ViewTree, now_ms: u64) {
        let mut i = 0;
        while i < self.entries.len() {
            let reg = &mut self.entries[i];
            let start = *reg.start_ms.get_or_insert(now_ms);
            let elapsed = now_ms.saturating_sub(start);
            let pos = reg.timing.position(elapsed).clamp(0.0, 1.0);
            if reg.last_pos != Some(pos) {
                reg.target.animation_tick(tree, reg.view, &reg.name, pos);
                reg.last_pos = Some(pos);
            }
            if reg.timing.is_done(elapsed) {
                let reg = self.entries.remove(i);
                finish(tree, reg, false);
            } else {
                i += 1;
            }
        }
    }
}

fn finish(tree: &mut ViewTree, mut reg: Registration, was_canceled: bool) {
    reg.target
        .animation_finished(tree, reg.view, &reg.name, was_canceled);
    tracing::debug!(view = %reg.view, name = %reg.name, was_canceled, "animation finished");
    if let Some(notify) = reg.notify.take() {
        if !was_canceled || reg.notify_on_cancel {
            notify(reg.view, &reg.name, was_canceled);
        }
    }
    if tree.contains(reg.view) {
        tree.forget(reg.view);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/animator.rs"]
mod tests;
