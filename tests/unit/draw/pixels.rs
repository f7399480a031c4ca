use super::*;

#[test]
fn over_with_opaque_source_replaces() {
    assert_eq!(over([1, 2, 3, 255], [9, 8, 7, 255], 1.0), [9, 8, 7, 255]);
    assert_eq!(over([1, 2, 3, 255], [9, 8, 7, 255], 0.0), [1, 2, 3, 255]);
}

#[test]
fn over_half_transparent_blends() {
    let out = over([0, 0, 0, 255], [255, 255, 255, 255], 0.5);
    assert_eq!(out[3], 255);
    assert!((126..=129).contains(&out[0]));
}

#[test]
fn crop_clamps_to_bounds() {
    let mut buf = PixelBuffer::new(4, 4);
    buf.data[(4 + 2) * 4..(4 + 2) * 4 + 4].copy_from_slice(&[10, 20, 30, 255]);
    let part = buf.view().crop(Rect::new(2.0, 1.0, 10.0, 3.0));
    assert_eq!((part.width, part.height), (2, 2));
    assert_eq!(part.pixel(0, 0), Some([10, 20, 30, 255]));
}

#[test]
fn blit_respects_clip_and_offsets() {
    let src = PixelBuffer::filled(4, 4, Color::RED);
    let mut dst = vec![0u8; 8 * 8 * 4];
    let written = blit(
        &mut dst,
        8,
        8,
        src.view(),
        Rect::new(0.0, 0.0, 4.0, 4.0),
        Point::new(2.0, 2.0),
        Rect::new(0.0, 0.0, 4.0, 8.0),
        BlitMode::Copy,
        1.0,
    );
    assert_eq!(written, 2 * 4);
    let at = |x: usize, y: usize| &dst[(y * 8 + x) * 4..(y * 8 + x) * 4 + 4];
    assert_eq!(at(2, 2), &[255, 0, 0, 255]);
    assert_eq!(at(3, 5), &[255, 0, 0, 255]);
    assert_eq!(at(4, 2), &[0, 0, 0, 0]);
    assert_eq!(at(1, 2), &[0, 0, 0, 0]);
}

#[test]
fn blit_reads_from_source_offset() {
    let mut src = PixelBuffer::new(4, 1);
    src.data[8..12].copy_from_slice(&[0, 255, 0, 255]);
    let mut dst = vec![0u8; 2 * 4];
    blit(
        &mut dst,
        2,
        1,
        src.view(),
        Rect::new(2.0, 0.0, 4.0, 1.0),
        Point::new(0.0, 0.0),
        Rect::new(0.0, 0.0, 2.0, 1.0),
        BlitMode::Copy,
        1.0,
    );
    assert_eq!(&dst[0..4], &[0, 255, 0, 255]);
}

#[test]
fn from_premul_checks_length() {
    assert!(PixelBuffer::from_premul(2, 2, vec![0; 15]).is_err());
    assert!(PixelBuffer::from_premul(2, 2, vec![0; 16]).is_ok());
}

#[test]
fn straight_export_undoes_premultiplication() {
    let buf = PixelBuffer::from_premul(2, 1, vec![128, 0, 0, 128, 0, 0, 0, 0]).unwrap();
    assert_eq!(buf.to_straight_rgba8(), vec![255, 0, 0, 128, 0, 0, 0, 0]);
}
