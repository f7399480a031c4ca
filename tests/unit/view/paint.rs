use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::bitmap::Bitmap;
use crate::draw::pixmap::PixmapContext;
use crate::draw::recording::{DrawCommand, RecordingContext};
use crate::foundation::core::{Color, Vec2};
use crate::view::{View, ViewCx};

struct Painter {
    color: Color,
    log: Rc<RefCell<Vec<&'static str>>>,
    name: &'static str,
}

impl View for Painter {
    fn draw(&mut self, cx: &mut ViewCx<'_>, dc: &mut dyn DrawContext) {
        self.log.borrow_mut().push(self.name);
        dc.set_fill_color(self.color);
        dc.fill_rect(cx.view_size());
    }
}

fn painter(log: &Rc<RefCell<Vec<&'static str>>>, name: &'static str, color: Color) -> Painter {
    Painter {
        color,
        log: log.clone(),
        name,
    }
}

fn r(x0: f64, y0: f64, x1: f64, y1: f64) -> Rect {
    Rect::new(x0, y0, x1, y1)
}

#[test]
fn container_fills_background_then_clips_each_child() {
    let log = Rc::default();
    let mut tree = ViewTree::new();
    let root = tree.create_container(r(0.0, 0.0, 200.0, 100.0));
    let button = tree.create_view(r(10.0, 10.0, 60.0, 30.0), painter(&log, "button", Color::RED));
    tree.add_view(root, button);

    let mut dc = RecordingContext::new(200.0, 100.0);
    tree.draw(root, &mut dc);

    let cmds = dc.commands();
    assert_eq!(cmds.len(), 2);
    assert_eq!(cmds[0].bounds(), r(0.0, 0.0, 200.0, 100.0));
    assert_eq!(cmds[0].fill_color(), Some(Color::BLACK));
    assert_eq!(cmds[1].bounds(), r(10.0, 10.0, 60.0, 30.0));
    assert_eq!(cmds[1].clip(), Some(r(10.0, 10.0, 60.0, 30.0)));
    assert!(!tree.is_dirty(root));
}

#[test]
fn nested_containers_offset_their_children() {
    let log = Rc::default();
    let mut tree = ViewTree::new();
    let root = tree.create_container(r(0.0, 0.0, 200.0, 200.0));
    let panel = tree.create_container(r(50.0, 50.0, 150.0, 150.0));
    let knob = tree.create_view(r(10.0, 10.0, 20.0, 20.0), painter(&log, "knob", Color::GREEN));
    tree.add_view(root, panel);
    tree.add_view(panel, knob);

    let mut dc = RecordingContext::new(200.0, 200.0);
    tree.draw(root, &mut dc);
    let fills = dc.fill_bounds();
    assert_eq!(fills, vec![
        r(0.0, 0.0, 200.0, 200.0),
        r(50.0, 50.0, 150.0, 150.0),
        r(60.0, 60.0, 70.0, 70.0),
    ]);
    assert_eq!(dc.offset(), Vec2::ZERO);
}

#[test]
fn children_paint_in_insertion_order_with_topmost_last() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut tree = ViewTree::new();
    let root = tree.create_container(r(0.0, 0.0, 100.0, 100.0));
    let a = tree.create_view(r(0.0, 0.0, 10.0, 10.0), painter(&log, "a", Color::RED));
    let b = tree.create_view(r(0.0, 0.0, 10.0, 10.0), painter(&log, "b", Color::BLUE));
    tree.add_view(root, a);
    tree.add_view(root, b);
    tree.set_topmost(root, Some(a));

    tree.draw(root, &mut RecordingContext::new(100.0, 100.0));
    assert_eq!(*log.borrow(), vec!["b", "a"]);
}

#[test]
fn hidden_and_fully_clipped_children_are_skipped_and_cleaned() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut tree = ViewTree::new();
    let root = tree.create_container(r(0.0, 0.0, 100.0, 100.0));
    let hidden = tree.create_view(r(0.0, 0.0, 10.0, 10.0), painter(&log, "hidden", Color::RED));
    let outside = tree.create_view(r(200.0, 0.0, 210.0, 10.0), painter(&log, "outside", Color::RED));
    tree.add_view(root, hidden);
    tree.add_view(root, outside);
    tree.set_visible(hidden, false);

    tree.draw(root, &mut RecordingContext::new(100.0, 100.0));
    assert!(log.borrow().is_empty());
    assert!(!tree.is_dirty(root));
}

#[test]
fn alpha_value_scales_child_paint() {
    let log = Rc::default();
    let mut tree = ViewTree::new();
    let root = tree.create_container(r(0.0, 0.0, 20.0, 20.0));
    let leaf = tree.create_view(r(0.0, 0.0, 10.0, 10.0), painter(&log, "leaf", Color::WHITE));
    tree.add_view(root, leaf);
    tree.set_alpha_value(leaf, 0.5);

    let mut dc = RecordingContext::new(20.0, 20.0);
    tree.draw(root, &mut dc);
    assert_eq!(dc.commands()[1].fill_color().map(|c| c.a), Some(128));
    assert_eq!(dc.global_alpha(), 1.0);
}

#[test]
fn partial_draw_touches_only_overlapping_children() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut tree = ViewTree::new();
    let root = tree.create_container(r(0.0, 0.0, 100.0, 100.0));
    let near = tree.create_view(r(0.0, 0.0, 10.0, 10.0), painter(&log, "near", Color::RED));
    let far = tree.create_view(r(50.0, 50.0, 60.0, 60.0), painter(&log, "far", Color::RED));
    tree.add_view(root, near);
    tree.add_view(root, far);

    let mut dc = RecordingContext::new(100.0, 100.0);
    tree.draw_rect(root, &mut dc, r(0.0, 0.0, 20.0, 20.0));
    assert_eq!(*log.borrow(), vec!["near"]);
    assert_eq!(dc.fill_bounds()[0], r(0.0, 0.0, 20.0, 20.0));
    assert!(tree.is_self_dirty(far));
}

#[test]
fn expose_outside_a_dirty_child_keeps_it_pending_for_update() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut tree = ViewTree::with_defaults(false, UpdateMode::OnlyDirty);
    let root = tree.create_container(r(0.0, 0.0, 100.0, 100.0));
    let near = tree.create_view(r(0.0, 0.0, 10.0, 10.0), painter(&log, "near", Color::RED));
    let far = tree.create_view(r(50.0, 50.0, 60.0, 60.0), painter(&log, "far", Color::RED));
    tree.add_view(root, near);
    tree.add_view(root, far);

    let mut dc = RecordingContext::new(100.0, 100.0);
    tree.draw(root, &mut dc);
    log.borrow_mut().clear();

    tree.invalid(far);
    tree.draw_rect(root, &mut dc, r(0.0, 0.0, 20.0, 20.0));
    assert!(tree.is_self_dirty(far));

    tree.update(root, &mut dc);
    assert_eq!(*log.borrow(), vec!["near", "far"]);
    assert!(!tree.is_dirty(root));
}

#[test]
fn only_dirty_update_erases_and_repaints_dirty_children() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut tree = ViewTree::with_defaults(false, UpdateMode::OnlyDirty);
    let root = tree.create_container(r(0.0, 0.0, 100.0, 100.0));
    let a = tree.create_view(r(0.0, 0.0, 10.0, 10.0), painter(&log, "a", Color::RED));
    let b = tree.create_view(r(20.0, 0.0, 30.0, 10.0), painter(&log, "b", Color::RED));
    tree.add_view(root, a);
    tree.add_view(root, b);

    let mut dc = RecordingContext::new(100.0, 100.0);
    tree.draw(root, &mut dc);
    dc.take_commands();
    log.borrow_mut().clear();

    tree.update(root, &mut dc);
    assert!(dc.commands().is_empty());

    tree.invalid(b);
    tree.update(root, &mut dc);
    assert_eq!(*log.borrow(), vec!["b"]);
    assert_eq!(dc.fill_bounds(), vec![r(20.0, 0.0, 30.0, 10.0), r(20.0, 0.0, 30.0, 10.0)]);
    assert_eq!(dc.commands()[0].fill_color(), Some(Color::BLACK));
    assert!(!tree.is_dirty(root));
}

#[test]
fn normal_update_repaints_the_whole_container() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut tree = ViewTree::new();
    let root = tree.create_container(r(0.0, 0.0, 100.0, 100.0));
    let a = tree.create_view(r(0.0, 0.0, 10.0, 10.0), painter(&log, "a", Color::RED));
    let b = tree.create_view(r(20.0, 0.0, 30.0, 10.0), painter(&log, "b", Color::RED));
    tree.add_view(root, a);
    tree.add_view(root, b);
    tree.set_dirty(root, false);

    tree.invalid(b);
    tree.update(root, &mut RecordingContext::new(100.0, 100.0));
    assert_eq!(*log.borrow(), vec!["a", "b"]);
}

#[test]
fn offscreen_container_reaches_the_target_in_one_blit() {
    let log = Rc::default();
    let mut tree = ViewTree::with_defaults(true, UpdateMode::Normal);
    let root = tree.create_container(r(0.0, 0.0, 40.0, 20.0));
    let leaf = tree.create_view(r(10.0, 5.0, 20.0, 15.0), painter(&log, "leaf", Color::RED));
    tree.add_view(root, leaf);

    let mut dc = RecordingContext::new(40.0, 20.0);
    tree.draw(root, &mut dc);
    assert_eq!(dc.commands().len(), 1);
    assert!(matches!(
        dc.commands()[0],
        DrawCommand::Blit { dest, .. } if dest == r(0.0, 0.0, 40.0, 20.0)
    ));

    let mut off = tree.take_offscreen(root).expect("offscreen");
    assert_eq!(off.pixels().pixel(12, 7), Some(Color::RED.premul()));
    assert_eq!(off.pixels().pixel(1, 1), Some(Color::BLACK.premul()));
}

#[test]
fn offscreen_and_direct_paths_produce_the_same_pixels() {
    let build = |offscreen: bool| {
        let log = Rc::default();
        let mut tree = ViewTree::with_defaults(offscreen, UpdateMode::Normal);
        let root = tree.create_container(r(0.0, 0.0, 32.0, 32.0));
        let panel = tree.create_container(r(8.0, 8.0, 24.0, 24.0));
        tree.set_background_color(panel, Color::BLUE);
        let leaf = tree.create_view(r(4.0, 4.0, 8.0, 8.0), painter(&log, "leaf", Color::RED));
        tree.add_view(root, panel);
        tree.add_view(panel, leaf);
        let mut dc = PixmapContext::new(32, 32).expect("pixmap");
        tree.draw(root, &mut dc);
        dc.to_buffer()
    };
    let direct = build(false);
    let composed = build(true);
    assert_eq!(direct.pixel(13, 13), Some(Color::RED.premul()));
    assert_eq!(direct.pixel(9, 9), Some(Color::BLUE.premul()));
    assert_eq!(direct, composed);
}

#[test]
fn bare_view_paints_its_background_bitmap() {
    let mut tree = ViewTree::new();
    let root = tree.create_container(r(0.0, 0.0, 10.0, 10.0));
    let leaf = tree.create_bare_view(r(2.0, 2.0, 6.0, 6.0));
    tree.set_background(leaf, Some(Bitmap::solid(4, 4, Color::GREEN)));
    tree.add_view(root, leaf);

    let mut dc = PixmapContext::new(10, 10).expect("pixmap");
    tree.draw(root, &mut dc);
    assert_eq!(dc.pixels().pixel(3, 3), Some(Color::GREEN.premul()));
    assert_eq!(dc.pixels().pixel(7, 7), Some(Color::BLACK.premul()));
}
