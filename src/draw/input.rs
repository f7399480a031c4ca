use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use crate::foundation::core::Point;
use crate::foundation::opts::FrameOpts;

/// Mouse button and modifier state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MouseButtons(u32);

impl MouseButtons {
    /// No buttons.
    pub const NONE: Self = Self(0);
    /// Primary button.
    pub const LEFT: Self = Self(1 << 0);
    /// Middle button.
    pub const MIDDLE: Self = Self(1 << 1);
    /// Secondary button.
    pub const RIGHT: Self = Self(1 << 2);
    /// Double-click marker.
    pub const DOUBLE_CLICK: Self = Self(1 << 3);
    /// Shift modifier.
    pub const SHIFT: Self = Self(1 << 4);
    /// Control modifier.
    pub const CONTROL: Self = Self(1 << 5);
    /// Alt/option modifier.
    pub const ALT: Self = Self(1 << 6);
    /// Command/meta modifier.
    pub const COMMAND: Self = Self(1 << 7);

    /// Raw bits.
    pub fn bits(self) -> u32 {
        self.0
    }

    /// `true` if every bit of `other` is set.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// `true` if any mouse button (not modifier) is down.
    pub fn any_button(self) -> bool {
        self.0 & (Self::LEFT.0 | Self::MIDDLE.0 | Self::RIGHT.0) != 0
    }

    /// `true` if no bit is set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for MouseButtons {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for MouseButtons {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Bounds for the blocking input polls.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PollTiming {
    /// Double-click window.
    pub double_click_ms: u64,
    /// Half-size of the observe rect around the initial mouse position.
    pub drag_threshold_px: f64,
    /// Delay after leaving the observe rect before a drag is reported.
    pub drag_delay_ms: u64,
    /// Hard upper bound for `wait_drag`.
    pub drag_timeout_ms: u64,
}

impl Default for PollTiming {
    fn default() -> Self {
        Self::from(&FrameOpts::default())
    }
}

impl From<&FrameOpts> for PollTiming {
    fn from(opts: &FrameOpts) -> Self {
        Self {
            double_click_ms: opts.double_click_ms,
            drag_threshold_px: opts.drag_threshold_px,
            drag_delay_ms: opts.drag_delay_ms,
            drag_timeout_ms: opts.drag_timeout_ms,
        }
    }
}

/// Live pointer state as seen by a draw context.
///
/// Implementations use interior mutability: contexts hold them behind `Rc`.
pub trait InputDevice {
    /// Currently pressed buttons and modifiers.
    fn mouse_buttons(&self) -> MouseButtons;
    /// Pointer position in screen coordinates.
    fn mouse_location(&self) -> Point;
    /// Monotonic millisecond clock.
    fn ticks_ms(&self) -> u64;
    /// Let the platform deliver pending input. Called once per poll iteration.
    fn pump(&self);
    /// Poll bounds.
    fn timing(&self) -> PollTiming {
        PollTiming::default()
    }
}

/// One step of scripted pointer input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InputSample {
    /// Buttons held after this step.
    pub buttons: MouseButtons,
    /// Pointer position after this step.
    pub location: Point,
    /// Clock advance consumed by this step.
    pub advance_ms: u64,
}

impl InputSample {
    /// Sample with the given buttons and location, advancing the clock by one millisecond.
    pub fn new(buttons: MouseButtons, location: Point) -> Self {
        Self {
            buttons,
            location,
            advance_ms: 1,
        }
    }

    /// Same sample with a different clock advance.
    pub fn after_ms(mut self, ms: u64) -> Self {
        self.advance_ms = ms;
        self
    }
}

/// Deterministic input device driven by a queue of samples.
///
/// Each `pump` consumes one sample; once the queue is empty the state holds and the clock
/// keeps advancing by one millisecond per pump, so every poll loop terminates.
#[derive(Debug)]
pub struct ScriptedInput {
    buttons: Cell<MouseButtons>,
    location: Cell<Point>,
    now_ms: Cell<u64>,
    queue: RefCell<VecDeque<InputSample>>,
    timing: PollTiming,
}

impl Default for ScriptedInput {
    fn default() -> Self {
        Self::new(PollTiming::default())
    }
}

impl ScriptedInput {
    /// Idle device with the given poll bounds.
    pub fn new(timing: PollTiming) -> Self {
        Self {
            buttons: Cell::new(MouseButtons::NONE),
            location: Cell::new(Point::ZERO),
            now_ms: Cell::new(0),
            queue: RefCell::new(VecDeque::new()),
            timing,
        }
    }

    /// Set the current state immediately.
    pub fn set_state(&self, buttons: MouseButtons, location: Point) {
        self.buttons.set(buttons);
        self.location.set(location);
    }

    /// Queue samples for subsequent pumps.
    pub fn push_samples(&self, samples: impl IntoIterator<Item = InputSample>) {
        self.queue.borrow_mut().extend(samples);
    }

    /// Number of samples not yet consumed.
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Advance the clock without changing pointer state.
    pub fn advance(&self, ms: u64) {
        self.now_ms.set(self.now_ms.get().saturating_add(ms));
    }
}

impl InputDevice for ScriptedInput {
    fn mouse_buttons(&self) -> MouseButtons {
        self.buttons.get()
    }

    fn mouse_location(&self) -> Point {
        self.location.get()
    }

    fn ticks_ms(&self) -> u64 {
        self.now_ms.get()
    }

    fn pump(&self) {
        let next = self.queue.borrow_mut().pop_front();
        match next {
            Some(s) => {
                self.buttons.set(s.buttons);
                self.location.set(s.location);
                self.advance(s.advance_ms);
            }
            None => self.advance(1),
        }
    }

    fn timing(&self) -> PollTiming {
        self.timing
    }
}

/// Iteration cap for the polling loops, independent of the device clock.
pub(crate) const MAX_POLLS: u32 = 1_000_000;

#[cfg(test)]
#[path = "../../tests/unit/draw/input.rs"]
mod tests;
