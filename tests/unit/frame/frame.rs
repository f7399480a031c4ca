use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::animation::{AlphaValueAnimation, LinearTimingFunction};
use crate::draw::input::PollTiming;
use crate::draw::recording::RecordingContext;
use crate::foundation::core::Color;
use crate::frame::headless::HeadlessWindow;
use crate::view::event::VirtualKey;
use crate::view::{View, ViewCx};

type Log = Rc<RefCell<Vec<String>>>;

struct Probe {
    name: &'static str,
    log: Log,
    consume: bool,
    color: Color,
    grab_focus: bool,
}

impl Probe {
    fn new(name: &'static str, log: &Log) -> Self {
        Self {
            name,
            log: log.clone(),
            consume: true,
            color: Color::WHITE,
            grab_focus: false,
        }
    }

    fn passive(mut self) -> Self {
        self.consume = false;
        self
    }

    fn colored(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    fn push(&self, what: &str) {
        self.log.borrow_mut().push(format!("{}:{what}", self.name));
    }
}

impl View for Probe {
    fn draw(&mut self, cx: &mut ViewCx<'_>, dc: &mut dyn DrawContext) {
        self.push("draw");
        dc.set_fill_color(self.color);
        dc.fill_rect(cx.view_size());
    }

    fn mouse(&mut self, cx: &mut ViewCx<'_>, _dc: &mut dyn DrawContext, where_: Point, _b: MouseButtons) -> EventResult {
        self.push(&format!("mouse {},{}", where_.x, where_.y));
        if self.grab_focus {
            cx.request_focus();
        }
        self.consume.into()
    }

    fn on_drop(&mut self, _cx: &mut ViewCx<'_>, _dc: &mut dyn DrawContext, _p: &DragPayload, _where: Point) -> bool {
        self.push("drop");
        self.consume
    }

    fn on_key_down(&mut self, _cx: &mut ViewCx<'_>, _key: &KeyCode) -> EventResult {
        self.push("key");
        self.consume.into()
    }

    fn take_focus(&mut self, _cx: &mut ViewCx<'_>) {
        self.push("focus");
    }

    fn loose_focus(&mut self, _cx: &mut ViewCx<'_>) {
        self.push("blur");
    }

    fn wants_focus(&self) -> bool {
        true
    }
}

fn r(x0: f64, y0: f64, x1: f64, y1: f64) -> Rect {
    Rect::new(x0, y0, x1, y1)
}

fn frame() -> Frame {
    Frame::new(&PlatformContext::new(), r(0.0, 0.0, 200.0, 100.0), FrameOpts::default())
}

fn log_of(log: &Log) -> Vec<String> {
    log.borrow_mut().drain(..).collect()
}

#[test]
fn window_lifecycle_tracks_leases() {
    let platform = PlatformContext::new();
    let mut frame = Frame::new(&platform, r(0.0, 0.0, 40.0, 30.0), FrameOpts::default());
    assert!(!frame.is_open());
    frame.open(HeadlessWindow::new(40, 30).unwrap()).unwrap();
    assert_eq!(platform.open_windows(), 1);
    assert!(frame.open(HeadlessWindow::new(40, 30).unwrap()).is_err());
    assert_eq!(platform.open_windows(), 1);

    assert!(frame.close());
    assert!(!frame.close());
    assert_eq!(platform.open_windows(), 0);
    assert_eq!(platform.total_leases(), 1);
}

#[test]
fn window_bound_calls_fail_when_closed() {
    let mut frame = frame();
    assert!(matches!(frame.get_position(), Err(PlugframeError::Window(_))));
    assert!(frame.set_position(Point::new(1.0, 1.0)).is_err());
    assert!(frame.set_size(Size::new(10.0, 10.0)).is_err());
    assert!(frame.get_current_location().is_err());
    assert!(frame.paint().is_err());
    assert_eq!(frame.ticks_ms(), None);
    assert_eq!(frame.get_size(), r(0.0, 0.0, 200.0, 100.0));
}

#[test]
fn position_size_and_pointer_location() {
    let mut frame = frame();
    let window = HeadlessWindow::new(200, 100).unwrap();
    let input = window.scripted_input();
    frame.open(window).unwrap();

    frame.set_position(Point::new(30.0, 40.0)).unwrap();
    assert_eq!(frame.get_position().unwrap(), Point::new(30.0, 40.0));
    input.set_state(MouseButtons::NONE, Point::new(50.0, 45.0));
    assert_eq!(frame.get_current_location().unwrap(), Point::new(20.0, 5.0));

    frame.set_size(Size::new(120.0, 80.0)).unwrap();
    assert_eq!(frame.get_size(), r(0.0, 0.0, 120.0, 80.0));
}

#[test]
fn paint_then_idle_repaints_only_when_dirty() {
    let log = Log::default();
    let mut frame = frame();
    let window = HeadlessWindow::new(200, 100).unwrap();
    let surface = window.surface();
    frame.open(window).unwrap();
    let v = frame.tree_mut().create_view(r(10.0, 10.0, 30.0, 30.0), Probe::new("v", &log).colored(Color::RED));
    frame.add_view(v);

    frame.idle();
    assert_eq!(surface.presents(), 0);

    frame.paint().unwrap();
    assert_eq!(surface.presents(), 1);
    assert_eq!(surface.pixels().pixel(15, 15), Some(Color::RED.premul()));
    assert_eq!(surface.pixels().pixel(50, 50), Some(Color::BLACK.premul()));
    assert!(!frame.is_something_dirty());

    frame.idle();
    assert_eq!(surface.presents(), 1);

    log_of(&log);
    frame.tree_mut().invalid(v);
    frame.idle();
    assert_eq!(surface.presents(), 2);
    assert_eq!(log_of(&log), vec!["v:draw"]);
}

#[test]
fn invalidate_marks_overlapping_views_and_forwards_rect() {
    let log = Log::default();
    let mut frame = frame();
    let window = HeadlessWindow::new(200, 100).unwrap();
    let surface = window.surface();
    frame.open(window).unwrap();
    let a = frame.tree_mut().create_view(r(0.0, 0.0, 50.0, 50.0), Probe::new("a", &log));
    let b = frame.tree_mut().create_view(r(100.0, 0.0, 150.0, 50.0), Probe::new("b", &log));
    frame.add_view(a);
    frame.add_view(b);
    frame.set_dirty_all(false);

    frame.invalidate(r(40.0, 10.0, 60.0, 20.0));
    assert!(frame.tree().is_dirty(a));
    assert!(!frame.tree().is_dirty(b));
    assert_eq!(surface.take_invalidated(), vec![r(40.0, 10.0, 60.0, 20.0)]);

    frame.set_dirty_all(true);
    assert!(frame.tree().is_dirty(b));
}

#[test]
fn modal_view_takes_all_pointer_input() {
    let log = Log::default();
    let mut frame = frame();
    let under = frame.tree_mut().create_view(r(0.0, 0.0, 200.0, 100.0), Probe::new("under", &log));
    frame.add_view(under);
    let modal = frame.tree_mut().create_view(r(50.0, 20.0, 150.0, 80.0), Probe::new("modal", &log));
    assert!(frame.set_modal_view(Some(modal)));
    assert_eq!(frame.modal_view(), Some(modal));
    assert_eq!(frame.tree().parent(modal), Some(frame.root()));

    assert_eq!(frame.mouse_down(Point::new(10.0, 10.0), MouseButtons::LEFT), EventResult::Unhandled);
    assert!(log_of(&log).is_empty());

    assert!(frame.mouse_down(Point::new(60.0, 30.0), MouseButtons::LEFT).is_handled());
    assert_eq!(log_of(&log), vec!["modal:mouse 60,30"]);

    let other = frame.tree_mut().create_bare_view(r(0.0, 0.0, 1.0, 1.0));
    assert!(!frame.set_modal_view(Some(other)));

    assert!(frame.set_modal_view(None));
    assert_eq!(frame.tree().parent(modal), None);
    assert!(frame.tree().contains(modal));
    frame.mouse_down(Point::new(10.0, 10.0), MouseButtons::LEFT);
    assert_eq!(log_of(&log), vec!["under:mouse 10,10"]);
}

#[test]
fn removing_an_adopted_modal_view_releases_it() {
    let mut frame = frame();
    let kept = frame.tree_mut().create_bare_view(r(0.0, 0.0, 10.0, 10.0));
    assert!(frame.set_modal_view(Some(kept)));
    assert!(frame.remove_view(kept, false));
    assert_eq!(frame.modal_view(), None);
    assert_eq!(frame.tree().ref_count(kept), Some(1));

    let released = frame.tree_mut().create_bare_view(r(0.0, 0.0, 10.0, 10.0));
    assert!(frame.set_modal_view(Some(released)));
    assert!(frame.remove_view(released, true));
    assert_eq!(frame.modal_view(), None);
    assert!(!frame.tree().contains(released));
    assert!(!frame.tree().children(frame.root()).contains(&released));
}

#[test]
fn modal_view_paints_last() {
    let log = Log::default();
    let mut frame = frame();
    let modal = frame.tree_mut().create_view(r(20.0, 20.0, 60.0, 60.0), Probe::new("modal", &log));
    frame.set_modal_view(Some(modal));
    let late = frame.tree_mut().create_view(r(0.0, 0.0, 100.0, 100.0), Probe::new("late", &log));
    frame.add_view(late);

    let mut dc = RecordingContext::new(200.0, 100.0);
    frame.draw(&mut dc);
    assert_eq!(log_of(&log), vec!["late:draw", "modal:draw"]);
    assert_eq!(dc.fill_bounds().last(), Some(&r(20.0, 20.0, 60.0, 60.0)));
}

#[test]
fn keys_go_to_focus_view_first() {
    let log = Log::default();
    let mut frame = frame();
    let a = frame.tree_mut().create_view(r(0.0, 0.0, 50.0, 50.0), Probe::new("a", &log));
    let b = frame.tree_mut().create_view(r(50.0, 0.0, 100.0, 50.0), Probe::new("b", &log));
    frame.add_view(a);
    frame.add_view(b);

    frame.set_focus_view(Some(a));
    assert_eq!(log_of(&log), vec!["a:focus"]);
    assert!(frame.on_key_down(&KeyCode::char('x')).is_handled());
    assert_eq!(log_of(&log), vec!["a:key"]);

    frame.set_focus_view(None);
    assert_eq!(log_of(&log), vec!["a:blur"]);
    frame.on_key_down(&KeyCode::char('x'));
    assert_eq!(log_of(&log), vec!["b:key"]);
}

#[test]
fn unhandled_key_is_not_offered_to_the_focus_view_twice() {
    let log = Log::default();
    let mut frame = frame();
    let a = frame.tree_mut().create_view(r(0.0, 0.0, 50.0, 50.0), Probe::new("a", &log).passive());
    let b = frame.tree_mut().create_view(r(50.0, 0.0, 100.0, 50.0), Probe::new("b", &log).passive());
    frame.add_view(a);
    frame.add_view(b);
    frame.set_focus_view(Some(a));
    log_of(&log);

    assert_eq!(frame.on_key_down(&KeyCode::char('x')), EventResult::Unhandled);
    assert_eq!(log_of(&log), vec!["a:key", "b:key"]);
}

#[test]
fn modal_view_receives_keys_instead_of_root() {
    let log = Log::default();
    let mut frame = frame();
    let a = frame.tree_mut().create_view(r(0.0, 0.0, 50.0, 50.0), Probe::new("a", &log));
    frame.add_view(a);
    let modal = frame.tree_mut().create_view(r(50.0, 0.0, 100.0, 50.0), Probe::new("modal", &log).passive());
    frame.set_modal_view(Some(modal));

    assert_eq!(frame.on_key_down(&KeyCode::char('q')), EventResult::Unhandled);
    assert_eq!(log_of(&log), vec!["modal:key"]);
}

#[test]
fn unhandled_tab_cycles_focus() {
    let log = Log::default();
    let mut frame = frame();
    let a = frame.tree_mut().create_view(r(0.0, 0.0, 50.0, 50.0), Probe::new("a", &log).passive());
    let b = frame.tree_mut().create_view(r(50.0, 0.0, 100.0, 50.0), Probe::new("b", &log).passive());
    frame.add_view(a);
    frame.add_view(b);
    let tab = KeyCode::virt(VirtualKey::Tab);

    assert!(frame.on_key_down(&tab).is_handled());
    assert_eq!(frame.get_focus_view(), Some(a));
    assert!(frame.on_key_down(&tab).is_handled());
    assert_eq!(frame.get_focus_view(), Some(b));
    assert!(frame.on_key_down(&tab).is_handled());
    assert_eq!(frame.get_focus_view(), Some(a));
    assert!(frame.on_key_down(&tab.with_shift()).is_handled());
    assert_eq!(frame.get_focus_view(), Some(b));
}

#[test]
fn focus_requested_during_mouse_is_applied_after_dispatch() {
    let log = Log::default();
    let mut frame = frame();
    let mut probe = Probe::new("a", &log);
    probe.grab_focus = true;
    let a = frame.tree_mut().create_view(r(0.0, 0.0, 50.0, 50.0), probe);
    frame.add_view(a);

    frame.mouse_down(Point::new(5.0, 5.0), MouseButtons::LEFT);
    assert_eq!(frame.get_focus_view(), Some(a));
    assert_eq!(log_of(&log), vec!["a:mouse 5,5", "a:focus"]);

    frame.mouse_down(Point::new(150.0, 5.0), MouseButtons::LEFT);
    assert_eq!(frame.get_focus_view(), None);
    assert_eq!(log_of(&log), vec!["a:blur"]);
}

#[test]
fn drop_is_refused_with_focus_or_modal() {
    let log = Log::default();
    let mut frame = frame();
    let a = frame.tree_mut().create_view(r(0.0, 0.0, 50.0, 50.0), Probe::new("a", &log));
    frame.add_view(a);
    let payload = DragPayload::text("hi");

    assert!(frame.on_drop(&payload, Point::new(5.0, 5.0)));
    assert_eq!(log_of(&log), vec!["a:drop"]);

    frame.set_focus_view(Some(a));
    log_of(&log);
    assert!(!frame.on_drop(&payload, Point::new(5.0, 5.0)));
    assert!(log_of(&log).is_empty());
}

#[test]
fn removing_focused_view_clears_focus() {
    let log = Log::default();
    let mut frame = frame();
    let a = frame.tree_mut().create_view(r(0.0, 0.0, 50.0, 50.0), Probe::new("a", &log));
    frame.add_view(a);
    frame.set_focus_view(Some(a));
    assert!(frame.remove_view(a, true));
    assert_eq!(frame.get_focus_view(), None);
    assert!(!frame.tree().contains(a));
}

#[test]
fn tick_drives_animations_and_repaints() {
    let mut frame = frame();
    let window = HeadlessWindow::with_timing(200, 100, PollTiming::default()).unwrap();
    let surface = window.surface();
    frame.open(window).unwrap();
    let v = frame.tree_mut().create_bare_view(r(0.0, 0.0, 10.0, 10.0));
    frame.add_view(v);
    frame.tree_mut().set_alpha_value(v, 0.0);
    frame.paint().unwrap();

    frame
        .add_animation(v, "fade", AlphaValueAnimation::new(1.0, false), LinearTimingFunction::new(100))
        .unwrap();
    frame.tick(1_000);
    frame.tick(1_050);
    assert!((frame.tree().alpha_value(v) - 0.5).abs() < 1e-6);
    frame.tick(1_100);
    assert_eq!(frame.tree().alpha_value(v), 1.0);
    assert!(frame.animator().is_empty());
    assert!(surface.presents() >= 2);
}

#[test]
fn dropping_the_frame_cancels_animations() {
    struct Watch(Rc<RefCell<Option<bool>>>);
    impl AnimationTarget for Watch {
        fn animation_tick(&mut self, _t: &mut ViewTree, _v: ViewId, _n: &str, _pos: f32) {}
        fn animation_finished(&mut self, _t: &mut ViewTree, _v: ViewId, _n: &str, canceled: bool) {
            *self.0.borrow_mut() = Some(canceled);
        }
    }

    let seen = Rc::new(RefCell::new(None));
    let mut frame = frame();
    let v = frame.tree_mut().create_bare_view(r(0.0, 0.0, 10.0, 10.0));
    frame.add_view(v);
    frame
        .add_animation(v, "w", Watch(seen.clone()), LinearTimingFunction::new(100))
        .unwrap();
    assert!(!frame.remove_animation(v, "nope"));
    drop(frame);
    assert_eq!(*seen.borrow(), Some(true));
}
