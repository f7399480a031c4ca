use super::*;

#[test]
fn estimate_scales_with_size_and_length() {
    let f = Font::new("x", 10.0);
    assert_eq!(estimate_width("abcd", &f), 20.0);
    assert_eq!(estimate_width("", &f), 0.0);
}

#[test]
fn measure_without_data_uses_estimate() {
    let mut engine = TextLayoutEngine::new();
    let f = Font::new("x", 12.0);
    assert_eq!(engine.measure("hello", &f), estimate_width("hello", &f));
}

#[test]
fn layout_requires_font_data_and_valid_size() {
    let mut engine = TextLayoutEngine::new();
    assert!(
        engine
            .layout_line("a", &Font::new("x", 12.0), TextBrush::default())
            .is_err()
    );
    assert!(
        engine
            .layout_line("a", &Font::new("x", 0.0), TextBrush::default())
            .is_err()
    );
}

#[test]
fn garbage_font_bytes_are_rejected() {
    let mut engine = TextLayoutEngine::new();
    let f = Font::new("bogus", 12.0).with_data(vec![1, 2, 3, 4]);
    assert!(engine.layout_line("a", &f, TextBrush::default()).is_err());
    assert_eq!(engine.measure("ab", &f), estimate_width("ab", &f));
}
