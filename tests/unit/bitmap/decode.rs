use std::io::Cursor;

use super::*;

fn png_bytes(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

#[test]
fn decodes_png_and_premultiplies() {
    let buf = decode_raster(&png_bytes(3, 2, [255, 0, 0, 128])).unwrap();
    assert_eq!((buf.width, buf.height), (3, 2));
    assert_eq!(buf.pixel(2, 1), Some([128, 0, 0, 128]));
}

#[test]
fn garbage_is_an_error() {
    assert!(decode_raster(b"not an image").is_err());
    assert!(decode_svg(b"<svg").is_err());
}

#[test]
fn rasterizes_svg_at_natural_size() {
    let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="8" height="4">
        <rect x="0" y="0" width="8" height="4" fill="#00ff00"/>
    </svg>"##;
    assert!(looks_like_svg(svg));
    let buf = decode_svg(svg).unwrap();
    assert_eq!((buf.width, buf.height), (8, 4));
    assert_eq!(buf.pixel(4, 2), Some([0, 255, 0, 255]));
}

#[test]
fn sniffing_rejects_binary() {
    assert!(!looks_like_svg(&png_bytes(1, 1, [0, 0, 0, 255])));
    assert!(looks_like_svg(b"<?xml version=\"1.0\"?>\n<svg/>"));
}

#[test]
fn premultiply_zeroes_transparent_pixels() {
    let mut px = vec![200, 100, 50, 0, 255, 255, 255, 255];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(px, vec![0, 0, 0, 0, 255, 255, 255, 255]);
}
