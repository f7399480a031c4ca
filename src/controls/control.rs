use std::fmt;
use std::rc::Rc;

/// Receives value changes made through user interaction.
pub trait ControlListener {
    /// `tag` identifies the control (its view tag); `value` is the new value.
    fn value_changed(&self, tag: i32, value: f32);
}

impl<F: Fn(i32, f32)> ControlListener for F {
    fn value_changed(&self, tag: i32, value: f32) {
        self(tag, value)
    }
}

/// Value state shared by every control: current value, range and listener.
#[derive(Clone)]
pub struct ControlBase {
    value: f32,
    min: f32,
    max: f32,
    listener: Option<Rc<dyn ControlListener>>,
}

impl fmt::Debug for ControlBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlBase")
            .field("value", &self.value)
            .field("min", &self.min)
            .field("max", &self.max)
            .field("listener", &self.listener.is_some())
            .finish()
    }
}

impl Default for ControlBase {
    fn default() -> Self {
        Self::new(0.0, 1.0)
    }
}

impl ControlBase {
    /// Range `[min, max]` starting at `min`. Swapped bounds are reordered.
    pub fn new(min: f32, max: f32) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            value: min,
            min,
            max,
            listener: None,
        }
    }

    /// Current value.
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Store `value` clamped to the range; returns `true` if it changed.
    pub fn set_value(&mut self, value: f32) -> bool {
        let v = if value.is_nan() { self.min } else { value.clamp(self.min, self.max) };
        if v == self.value {
            return false;
        }
        self.value = v;
        true
    }

    /// Lower bound.
    pub fn min(&self) -> f32 {
        self.min
    }

    /// Upper bound.
    pub fn max(&self) -> f32 {
        self.max
    }

    /// Value mapped to `[0, 1]`.
    pub fn normalized(&self) -> f32 {
        let span = self.max - self.min;
        if span <= 0.0 { 0.0 } else { (self.value - self.min) / span }
    }

    /// Set the value from a `[0, 1]` fraction of the range.
    pub fn set_normalized(&mut self, t: f32) -> bool {
        self.set_value(self.min + (self.max - self.min) * t.clamp(0.0, 1.0))
    }

    /// Replace the listener.
    pub fn set_listener(&mut self, listener: Option<Rc<dyn ControlListener>>) {
        self.listener = listener;
    }

    /// Tell the listener about the current value.
    pub fn notify(&self, tag: i32) {
        if let Some(l) = self.listener.as_ref() {
            l.value_changed(tag, self.value);
        }
    }
}

/// Capability of views that hold a value in a range.
///
/// Programmatic changes through [`Control::set_value`] do not notify the listener; controls
/// notify only for changes made by the user.
pub trait Control {
    /// Shared value state.
    fn base(&self) -> &ControlBase;
    /// Mutable shared value state.
    fn base_mut(&mut self) -> &mut ControlBase;

    /// Current value.
    fn value(&self) -> f32 {
        self.base().value()
    }

    /// Replace the value, clamped to `[min, max]`.
    fn set_value(&mut self, value: f32) {
        self.base_mut().set_value(value);
    }

    /// Lower bound.
    fn min(&self) -> f32 {
        self.base().min()
    }

    /// Upper bound.
    fn max(&self) -> f32 {
        self.base().max()
    }

    /// Replace the listener notified on user changes.
    fn set_listener(&mut self, listener: Option<Rc<dyn ControlListener>>) {
        self.base_mut().set_listener(listener);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/controls/control.rs"]
mod tests;
