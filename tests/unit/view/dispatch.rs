use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::draw::recording::RecordingContext;
use crate::foundation::core::{Rect, Vec2};
use crate::view::event::VirtualKey;
use crate::view::{View, ViewCx};

type Log = Rc<RefCell<Vec<String>>>;

struct Probe {
    name: &'static str,
    log: Log,
    consume: bool,
}

impl Probe {
    fn new(name: &'static str, log: &Log) -> Self {
        Self {
            name,
            log: log.clone(),
            consume: true,
        }
    }

    fn passive(mut self) -> Self {
        self.consume = false;
        self
    }

    fn push(&self, what: String) {
        self.log.borrow_mut().push(format!("{}:{what}", self.name));
    }
}

impl View for Probe {
    fn mouse(&mut self, _cx: &mut ViewCx<'_>, dc: &mut dyn DrawContext, where_: Point, _b: MouseButtons) -> EventResult {
        self.push(format!("mouse {},{} off {},{}", where_.x, where_.y, dc.offset().x, dc.offset().y));
        self.consume.into()
    }

    fn on_wheel(&mut self, _cx: &mut ViewCx<'_>, _dc: &mut dyn DrawContext, _where: Point, distance: f32) -> bool {
        self.push(format!("wheel {distance}"));
        self.consume
    }

    fn on_drop(&mut self, _cx: &mut ViewCx<'_>, _dc: &mut dyn DrawContext, payload: &DragPayload, _where: Point) -> bool {
        self.push(format!("drop {}", payload.count()));
        self.consume
    }

    fn on_drag_enter(&mut self, _cx: &mut ViewCx<'_>, _payload: &DragPayload, _where: Point) {
        self.push("enter".into());
    }

    fn on_drag_leave(&mut self, _cx: &mut ViewCx<'_>, _payload: &DragPayload, _where: Point) {
        self.push("leave".into());
    }

    fn on_drag_move(&mut self, _cx: &mut ViewCx<'_>, _payload: &DragPayload, _where: Point) {
        self.push("move".into());
    }

    fn on_key_down(&mut self, _cx: &mut ViewCx<'_>, key: &KeyCode) -> EventResult {
        self.push(format!("key {:?}", key.character));
        self.consume.into()
    }

    fn take_focus(&mut self, _cx: &mut ViewCx<'_>) {
        self.push("focus".into());
    }

    fn loose_focus(&mut self, _cx: &mut ViewCx<'_>) {
        self.push("blur".into());
    }

    fn wants_focus(&self) -> bool {
        true
    }

    fn on_idle(&mut self, cx: &mut ViewCx<'_>) {
        self.push("idle".into());
        cx.set_wants_idle(false);
    }
}

fn r(x0: f64, y0: f64, x1: f64, y1: f64) -> Rect {
    Rect::new(x0, y0, x1, y1)
}

fn entries(log: &Log) -> Vec<String> {
    log.borrow().clone()
}

#[test]
fn mouse_reaches_the_topmost_hit_child_in_local_coordinates() {
    let log = Log::default();
    let mut tree = ViewTree::new();
    let root = tree.create_container(r(0.0, 0.0, 200.0, 200.0));
    let panel = tree.create_container(r(100.0, 50.0, 200.0, 150.0));
    let under = tree.create_view(r(0.0, 0.0, 50.0, 50.0), Probe::new("under", &log));
    let over = tree.create_view(r(10.0, 10.0, 40.0, 40.0), Probe::new("over", &log));
    tree.add_view(root, panel);
    tree.add_view(panel, under);
    tree.add_view(panel, over);

    let mut dc = RecordingContext::new(200.0, 200.0);
    let result = tree.mouse(root, &mut dc, Point::new(120.0, 70.0), MouseButtons::LEFT);
    assert!(result.is_handled());
    assert_eq!(entries(&log), vec!["over:mouse 20,20 off 100,50"]);
    assert_eq!(dc.offset(), Vec2::ZERO);
}

#[test]
fn disabled_or_hidden_children_are_not_hit() {
    let log = Log::default();
    let mut tree = ViewTree::new();
    let root = tree.create_container(r(0.0, 0.0, 100.0, 100.0));
    let under = tree.create_view(r(0.0, 0.0, 50.0, 50.0), Probe::new("under", &log));
    let over = tree.create_view(r(0.0, 0.0, 50.0, 50.0), Probe::new("over", &log));
    tree.add_view(root, under);
    tree.add_view_with(root, over, r(0.0, 0.0, 50.0, 50.0), false);

    let mut dc = RecordingContext::new(100.0, 100.0);
    tree.mouse(root, &mut dc, Point::new(5.0, 5.0), MouseButtons::LEFT);
    tree.set_visible(under, false);
    let miss = tree.mouse(root, &mut dc, Point::new(5.0, 5.0), MouseButtons::LEFT);
    assert_eq!(entries(&log), vec!["under:mouse 5,5 off 0,0"]);
    assert_eq!(miss, EventResult::Unhandled);
}

#[test]
fn hit_area_is_half_open() {
    let log = Log::default();
    let mut tree = ViewTree::new();
    let leaf = tree.create_view(r(0.0, 0.0, 10.0, 10.0), Probe::new("leaf", &log));
    assert!(tree.hit_test(leaf, Point::new(0.0, 0.0), MouseButtons::NONE));
    assert!(!tree.hit_test(leaf, Point::new(10.0, 5.0), MouseButtons::NONE));
}

#[test]
fn wheel_and_drop_follow_the_hit_path() {
    let log = Log::default();
    let mut tree = ViewTree::new();
    let root = tree.create_container(r(0.0, 0.0, 100.0, 100.0));
    let a = tree.create_view(r(0.0, 0.0, 50.0, 50.0), Probe::new("a", &log).passive());
    tree.add_view(root, a);

    let mut dc = RecordingContext::new(100.0, 100.0);
    assert!(!tree.on_wheel(root, &mut dc, Point::new(5.0, 5.0), 1.5));
    assert!(!tree.on_wheel(root, &mut dc, Point::new(80.0, 80.0), 1.0));
    assert!(!tree.on_drop(root, &mut dc, &DragPayload::text("x"), Point::new(5.0, 5.0)));
    assert_eq!(entries(&log), vec!["a:wheel 1.5", "a:drop 1"]);
}

#[test]
fn drag_tracking_switches_between_children() {
    let log = Log::default();
    let mut tree = ViewTree::new();
    let root = tree.create_container(r(0.0, 0.0, 100.0, 100.0));
    let a = tree.create_view(r(0.0, 0.0, 50.0, 100.0), Probe::new("a", &log));
    let b = tree.create_view(r(50.0, 0.0, 100.0, 100.0), Probe::new("b", &log));
    tree.add_view(root, a);
    tree.add_view(root, b);
    let payload = DragPayload::files(["/tmp/x.wav"]);

    tree.on_drag_enter(root, &payload, Point::new(10.0, 10.0));
    assert_eq!(tree.drag_view(root), Some(a));
    tree.on_drag_move(root, &payload, Point::new(20.0, 10.0));
    tree.on_drag_move(root, &payload, Point::new(60.0, 10.0));
    assert_eq!(tree.drag_view(root), Some(b));
    tree.on_drag_leave(root, &payload, Point::new(60.0, 10.0));
    assert_eq!(tree.drag_view(root), None);

    assert_eq!(
        entries(&log),
        vec!["a:enter", "a:move", "a:leave", "b:enter", "b:leave"]
    );
}

#[test]
fn keys_go_to_the_last_child_first_and_stop_when_handled() {
    let log = Log::default();
    let mut tree = ViewTree::new();
    let root = tree.create_container(r(0.0, 0.0, 100.0, 100.0));
    let a = tree.create_view(r(0.0, 0.0, 10.0, 10.0), Probe::new("a", &log));
    let b = tree.create_view(r(0.0, 0.0, 10.0, 10.0), Probe::new("b", &log).passive());
    tree.add_view(root, a);
    tree.add_view(root, b);

    let result = tree.on_key_down(root, &KeyCode::char('k'));
    assert!(result.is_handled());
    assert_eq!(entries(&log), vec!["b:key Some('k')", "a:key Some('k')"]);
    assert_eq!(tree.on_key_up(root, &KeyCode::virt(VirtualKey::Escape)), EventResult::Unhandled);
}

#[test]
fn focus_notifications_and_idle_subscribers() {
    let log = Log::default();
    let mut tree = ViewTree::new();
    let root = tree.create_container(r(0.0, 0.0, 100.0, 100.0));
    let a = tree.create_view(r(0.0, 0.0, 10.0, 10.0), Probe::new("a", &log));
    tree.add_view(root, a);
    tree.attach_root(root);
    assert!(tree.wants_focus(a));
    assert!(!tree.wants_focus(root));

    tree.set_dirty(root, false);
    tree.notify_focus(a, true);
    tree.notify_focus(a, false);
    assert!(tree.is_self_dirty(a));

    tree.data_mut(a).expect("data").wants_idle = true;
    tree.run_idle();
    tree.run_idle();
    assert_eq!(entries(&log), vec!["a:focus", "a:blur", "a:idle"]);
}
