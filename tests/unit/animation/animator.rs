use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::animation::{LinearTimingFunction, RepeatTimingFunction};
use crate::foundation::core::Rect;

type Log = Rc<RefCell<Vec<String>>>;

struct Recorder {
    label: &'static str,
    log: Log,
}

impl Recorder {
    fn new(label: &'static str, log: &Log) -> Self {
        Self {
            label,
            log: log.clone(),
        }
    }
}

impl AnimationTarget for Recorder {
    fn animation_start(&mut self, _tree: &mut ViewTree, _view: ViewId, name: &str) {
        self.log.borrow_mut().push(format!("{}:{name} start", self.label));
    }

    fn animation_tick(&mut self, _tree: &mut ViewTree, _view: ViewId, _name: &str, pos: f32) {
        self.log.borrow_mut().push(format!("{}:tick {pos}", self.label));
    }

    fn animation_finished(&mut self, _tree: &mut ViewTree, _view: ViewId, _name: &str, was_canceled: bool) {
        self.log.borrow_mut().push(format!("{}:finished {was_canceled}", self.label));
    }
}

fn tree_with_view() -> (ViewTree, ViewId) {
    let mut tree = ViewTree::new();
    let v = tree.create_bare_view(Rect::new(0.0, 0.0, 10.0, 10.0));
    (tree, v)
}

#[test]
fn clock_starts_at_first_tick_and_repeats_are_suppressed() {
    let log = Log::default();
    let (mut tree, v) = tree_with_view();
    let mut animator = Animator::default();
    animator
        .add_animation(&mut tree, v, "fade", Recorder::new("r", &log), LinearTimingFunction::new(100))
        .expect("add");
    assert_eq!(tree.ref_count(v), Some(2));
    assert!(animator.has_animation(v, "fade"));

    animator.tick(&mut tree, 1_000);
    animator.tick(&mut tree, 1_050);
    animator.tick(&mut tree, 1_050);
    assert_eq!(animator.animation_count(), 1);
    animator.tick(&mut tree, 1_100);

    assert_eq!(
        *log.borrow(),
        vec!["r:fade start", "r:tick 0", "r:tick 0.5", "r:tick 1", "r:finished false"]
    );
    assert!(animator.is_empty());
    assert_eq!(tree.ref_count(v), Some(1));
}

#[test]
fn same_name_replaces_and_cancels_the_previous_target_first() {
    let log = Log::default();
    let (mut tree, v) = tree_with_view();
    let mut animator = Animator::new(10);
    animator
        .add_animation(&mut tree, v, "move", Recorder::new("first", &log), LinearTimingFunction::new(50))
        .expect("add");
    animator
        .add_animation(&mut tree, v, "move", Recorder::new("second", &log), LinearTimingFunction::new(50))
        .expect("add");

    assert_eq!(
        *log.borrow(),
        vec!["first:move start", "first:finished true", "second:move start"]
    );
    assert_eq!(animator.animation_count(), 1);
    assert_eq!(tree.ref_count(v), Some(2));
}

#[test]
fn unknown_views_are_rejected() {
    let (mut tree, v) = tree_with_view();
    tree.forget(v);
    let mut animator = Animator::default();
    let err = animator
        .add_animation(&mut tree, v, "x", Recorder::new("r", &Log::default()), LinearTimingFunction::new(1))
        .expect_err("dead view");
    assert!(matches!(err, PlugframeError::Animation(_)));
}

#[test]
fn registration_keeps_the_view_alive_until_finished() {
    let (mut tree, v) = tree_with_view();
    let mut animator = Animator::default();
    animator
        .add_animation(&mut tree, v, "x", Recorder::new("r", &Log::default()), LinearTimingFunction::new(10))
        .expect("add");
    tree.forget(v);
    assert!(tree.contains(v));
    assert!(animator.remove_animation(&mut tree, v, "x"));
    assert!(!tree.contains(v));
    assert!(!animator.remove_animation(&mut tree, v, "x"));
}

#[test]
fn notification_fires_on_cancel_only_when_asked() {
    let (mut tree, v) = tree_with_view();
    let fired = Log::default();
    let mut animator = Animator::default();

    let sink = fired.clone();
    animator
        .add_animation_with_notification(
            &mut tree,
            v,
            "quiet",
            Recorder::new("q", &Log::default()),
            LinearTimingFunction::new(10),
            move |_, name, canceled| sink.borrow_mut().push(format!("{name} {canceled}")),
            false,
        )
        .expect("add");
    let sink = fired.clone();
    animator
        .add_animation_with_notification(
            &mut tree,
            v,
            "loud",
            Recorder::new("l", &Log::default()),
            LinearTimingFunction::new(10),
            move |_, name, canceled| sink.borrow_mut().push(format!("{name} {canceled}")),
            true,
        )
        .expect("add");
    assert_eq!(animator.remove_animations(&mut tree, v), 2);

    let sink = fired.clone();
    animator
        .add_animation_with_notification(
            &mut tree,
            v,
            "done",
            Recorder::new("d", &Log::default()),
            LinearTimingFunction::new(0),
            move |_, name, canceled| sink.borrow_mut().push(format!("{name} {canceled}")),
            false,
        )
        .expect("add");
    animator.tick(&mut tree, 5);

    assert_eq!(*fired.borrow(), vec!["loud true", "done false"]);
    assert_eq!(tree.ref_count(v), Some(1));
}

#[test]
fn repeat_with_autoreverse_runs_back_and_forth() {
    let log = Log::default();
    let (mut tree, v) = tree_with_view();
    let mut animator = Animator::default();
    let timing = RepeatTimingFunction::new(LinearTimingFunction::new(10), 2, true);
    animator
        .add_animation(&mut tree, v, "pulse", Recorder::new("r", &log), timing)
        .expect("add");
    for now in [0, 10, 15, 20] {
        animator.tick(&mut tree, now);
    }
    assert_eq!(
        *log.borrow(),
        vec![
            "r:pulse start",
            "r:tick 0",
            "r:tick 1",
            "r:tick 0.5",
            "r:tick 0",
            "r:finished false"
        ]
    );
}

#[test]
fn cancel_all_finishes_every_registration_once() {
    let log = Log::default();
    let (mut tree, v) = tree_with_view();
    let w = tree.create_bare_view(Rect::new(0.0, 0.0, 1.0, 1.0));
    let mut animator = Animator::default();
    animator
        .add_animation(&mut tree, v, "a", Recorder::new("a", &log), LinearTimingFunction::new(10))
        .expect("add");
    animator
        .add_animation(&mut tree, w, "b", Recorder::new("b", &log), LinearTimingFunction::new(10))
        .expect("add");
    animator.cancel_all(&mut tree);
    animator.cancel_all(&mut tree);
    let finished: Vec<_> = log.borrow().iter().filter(|l| l.contains("finished")).cloned().collect();
    assert_eq!(finished, vec!["a:finished true", "b:finished true"]);
}
