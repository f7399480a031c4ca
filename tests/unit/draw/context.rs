use super::*;
use crate::draw::input::{InputSample, PollTiming, ScriptedInput};
use crate::draw::recording::{DrawCommand, NullContext, RecordingContext};

fn scripted(timing: PollTiming) -> Rc<ScriptedInput> {
    Rc::new(ScriptedInput::new(timing))
}

#[test]
fn fill_rect_is_offset_into_device_space() {
    let mut dc = RecordingContext::new(200.0, 100.0);
    dc.set_fill_color(Color::RED);
    dc.set_offset(Vec2::new(10.0, 5.0));
    dc.fill_rect(Rect::new(0.0, 0.0, 20.0, 10.0));
    assert_eq!(dc.fill_bounds(), vec![Rect::new(10.0, 5.0, 30.0, 15.0)]);
    assert_eq!(dc.commands()[0].fill_color(), Some(Color::RED));
}

#[test]
fn global_alpha_scales_paint() {
    let mut dc = RecordingContext::new(10.0, 10.0);
    dc.set_fill_color(Color::WHITE);
    dc.set_global_alpha(0.5);
    dc.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0));
    assert_eq!(dc.commands()[0].fill_color().map(|c| c.a), Some(128));
}

#[test]
fn clip_is_stored_in_device_space_and_only_narrows() {
    let mut dc = RecordingContext::new(100.0, 100.0);
    dc.set_offset(Vec2::new(10.0, 10.0));
    let prev = dc.intersect_clip(Rect::new(0.0, 0.0, 50.0, 50.0));
    assert_eq!(prev, Rect::new(0.0, 0.0, 100.0, 100.0));
    assert_eq!(dc.clip_rect_device(), Rect::new(10.0, 10.0, 60.0, 60.0));
    assert_eq!(dc.clip_rect(), Rect::new(0.0, 0.0, 50.0, 50.0));

    dc.intersect_clip(Rect::new(40.0, 40.0, 500.0, 500.0));
    assert_eq!(dc.clip_rect_device(), Rect::new(50.0, 50.0, 60.0, 60.0));
}

#[test]
fn fully_clipped_primitives_are_skipped() {
    let mut dc = RecordingContext::new(100.0, 100.0);
    dc.set_clip_rect_device(Rect::new(5.0, 5.0, 5.0, 5.0));
    dc.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
    dc.draw_line(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
    assert!(dc.commands().is_empty());
}

#[test]
fn modify_and_restore_are_symmetric() {
    let mut dc = RecordingContext::new(100.0, 100.0);
    dc.set_offset(Vec2::new(3.0, 4.0));
    let before = dc.save();
    let saved = dc.modify_for_container(Vec2::new(10.0, 20.0));
    assert_eq!(dc.offset(), Vec2::new(13.0, 24.0));
    assert_eq!(dc.offset_screen(), Vec2::new(10.0, 20.0));
    dc.intersect_clip(Rect::new(0.0, 0.0, 5.0, 5.0));
    dc.restore_offsets(saved);
    assert_eq!(dc.offset(), before.offset);
    assert_eq!(dc.offset_screen(), before.offset_screen);
    assert_eq!(dc.clip_rect_device(), before.clip);
}

#[test]
fn strokes_use_frame_color_and_width() {
    let mut dc = RecordingContext::new(100.0, 100.0);
    dc.set_frame_color(Color::BLUE);
    dc.set_line_width(4.0);
    dc.draw_rect(Rect::new(10.0, 10.0, 20.0, 20.0));
    match &dc.commands()[0] {
        DrawCommand::Stroke { bounds, color, width, .. } => {
            assert_eq!(*color, Color::BLUE);
            assert_eq!(*width, 4.0);
            assert_eq!(*bounds, Rect::new(8.0, 8.0, 22.0, 22.0));
        }
        other => panic!("expected stroke, got {other:?}"),
    }
}

#[test]
fn line_to_advances_the_pen() {
    let mut dc = RecordingContext::new(100.0, 100.0);
    dc.move_to(Point::new(1.0, 1.0));
    dc.line_to(Point::new(5.0, 1.0));
    assert_eq!(dc.state().pen, Point::new(5.0, 1.0));
    assert_eq!(dc.commands().len(), 1);
}

#[test]
fn string_alignment_positions_text() {
    let mut dc = RecordingContext::new(200.0, 50.0);
    dc.set_font(Font::new("x", 10.0));
    let rect = Rect::new(0.0, 0.0, 100.0, 20.0);
    dc.draw_string("abcd", rect, TextAlign::Left, false);
    dc.draw_string("abcd", rect, TextAlign::Center, false);
    dc.draw_string("abcd", rect, TextAlign::Right, true);

    let xs: Vec<f64> = dc
        .commands()
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Text { origin, .. } => Some(origin.x),
            _ => None,
        })
        .collect();
    assert_eq!(xs, vec![0.0, 40.0, 80.0]);
    assert!(dc.commands().iter().any(|c| matches!(c, DrawCommand::Fill { .. })));
}

#[test]
fn polygons_need_points() {
    let mut dc = RecordingContext::new(10.0, 10.0);
    dc.fill_polygon(&[]);
    assert!(dc.commands().is_empty());
    dc.fill_polygon(&[
        Point::new(0.0, 0.0),
        Point::new(4.0, 0.0),
        Point::new(0.0, 4.0),
    ]);
    assert_eq!(dc.fill_bounds(), vec![Rect::new(0.0, 0.0, 4.0, 4.0)]);
}

#[test]
fn pie_slice_includes_center() {
    let mut dc = RecordingContext::new(100.0, 100.0);
    dc.fill_arc(Rect::new(0.0, 0.0, 20.0, 20.0), 0.0, 90.0);
    let b = dc.fill_bounds()[0];
    assert!((b.x0 - 10.0).abs() < 1e-6 && (b.y0 - 10.0).abs() < 1e-6);
    assert!((b.x1 - 20.0).abs() < 0.2 && (b.y1 - 20.0).abs() < 0.2);
}

#[test]
fn gradient_fill_maps_endpoints() {
    let mut dc = RecordingContext::new(100.0, 100.0);
    dc.set_offset(Vec2::new(5.0, 0.0));
    let path = Rect::new(0.0, 0.0, 10.0, 10.0).to_path(0.1);
    dc.fill_linear_gradient(
        &path,
        Point::new(0.0, 0.0),
        Point::new(10.0, 0.0),
        Color::BLACK,
        Color::WHITE,
        None,
    );
    match &dc.commands()[0] {
        DrawCommand::Fill {
            paint: Paint::LinearGradient { start, end, .. },
            ..
        } => {
            assert_eq!(*start, Point::new(5.0, 0.0));
            assert_eq!(*end, Point::new(15.0, 0.0));
        }
        other => panic!("expected gradient fill, got {other:?}"),
    }
}

#[test]
fn mouse_location_is_relative_to_screen_offset() {
    let input = scripted(PollTiming::default());
    input.set_state(MouseButtons::LEFT, Point::new(50.0, 40.0));
    let mut dc = RecordingContext::new(100.0, 100.0).with_input(input);
    dc.modify_for_container(Vec2::new(10.0, 20.0));
    assert_eq!(dc.get_mouse_location(), Point::new(40.0, 20.0));
    assert_eq!(dc.get_mouse_buttons(), MouseButtons::LEFT);
}

#[test]
fn double_click_detected_on_second_press() {
    let input = scripted(PollTiming::default());
    input.set_state(MouseButtons::LEFT, Point::new(10.0, 10.0));
    input.push_samples([
        InputSample::new(MouseButtons::NONE, Point::new(10.0, 10.0)).after_ms(50),
        InputSample::new(MouseButtons::LEFT, Point::new(11.0, 10.0)).after_ms(50),
    ]);
    let mut dc = RecordingContext::new(100.0, 100.0).with_input(input);
    assert!(dc.wait_double_click());
}

#[test]
fn double_click_times_out_or_bails_on_movement() {
    let input = scripted(PollTiming::default());
    input.set_state(MouseButtons::LEFT, Point::new(10.0, 10.0));
    input.push_samples([
        InputSample::new(MouseButtons::NONE, Point::new(10.0, 10.0)).after_ms(450),
        InputSample::new(MouseButtons::LEFT, Point::new(10.0, 10.0)).after_ms(100),
    ]);
    let mut dc = RecordingContext::new(100.0, 100.0).with_input(input.clone());
    assert!(!dc.wait_double_click());

    input.set_state(MouseButtons::LEFT, Point::new(10.0, 10.0));
    input.push_samples([
        InputSample::new(MouseButtons::NONE, Point::new(30.0, 10.0)),
        InputSample::new(MouseButtons::LEFT, Point::new(30.0, 10.0)),
    ]);
    assert!(!dc.wait_double_click());
}

#[test]
fn drag_reported_once_pointer_leaves_observe_rect() {
    let input = scripted(PollTiming::default());
    input.set_state(MouseButtons::LEFT, Point::new(10.0, 10.0));
    input.push_samples([
        InputSample::new(MouseButtons::LEFT, Point::new(11.0, 10.0)),
        InputSample::new(MouseButtons::LEFT, Point::new(15.0, 10.0)),
    ]);
    let mut dc = RecordingContext::new(100.0, 100.0).with_input(input.clone());
    assert!(dc.wait_drag());

    input.set_state(MouseButtons::LEFT, Point::new(10.0, 10.0));
    input.push_samples([InputSample::new(MouseButtons::NONE, Point::new(10.0, 10.0))]);
    assert!(!dc.wait_drag());
}

#[test]
fn drag_honors_delay_and_timeout() {
    let timing = PollTiming {
        drag_delay_ms: 20,
        drag_timeout_ms: 100,
        ..PollTiming::default()
    };
    let input = scripted(timing);
    input.set_state(MouseButtons::LEFT, Point::new(0.0, 0.0));
    input.push_samples([InputSample::new(MouseButtons::LEFT, Point::new(9.0, 0.0))]);
    let mut dc = RecordingContext::new(100.0, 100.0).with_input(input.clone());
    assert!(dc.wait_drag());
    assert!(input.ticks_ms() >= 21);

    input.set_state(MouseButtons::LEFT, Point::new(0.0, 0.0));
    let start = input.ticks_ms();
    assert!(!dc.wait_drag());
    assert!(input.ticks_ms() - start > 100);
}

#[test]
fn contexts_without_input_never_block() {
    let mut dc = NullContext::default();
    assert!(!dc.wait_double_click());
    assert!(!dc.wait_drag());
    assert_eq!(dc.get_mouse_buttons(), MouseButtons::NONE);
    dc.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
}

#[test]
fn save_and_restore_round_trip_whole_state() {
    let mut dc = RecordingContext::new(50.0, 50.0);
    let saved = dc.save();
    dc.set_fill_color(Color::RED);
    dc.set_line_width(3.0);
    dc.set_global_alpha(0.25);
    dc.restore(saved);
    assert_eq!(dc.fill_color(), Color::WHITE);
    assert_eq!(dc.line_width(), 1.0);
    assert_eq!(dc.global_alpha(), 1.0);
}
