use anyhow::Context;

use crate::draw::pixels::PixelBuffer;
use crate::foundation::error::{PlugframeError, PlugframeResult};

/// Largest SVG raster edge accepted.
const MAX_SVG_DIM: u32 = 16_384;

/// Decode encoded raster bytes (PNG, JPEG, ...) into premultiplied RGBA8.
#[tracing::instrument(skip(bytes), fields(len = bytes.len()))]
pub fn decode_raster(bytes: &[u8]) -> PlugframeResult<PixelBuffer> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut data = rgba.into_raw();
    premultiply_rgba8_in_place(&mut data);
    PixelBuffer::from_premul(width, height, data)
}

/// Parse SVG bytes and rasterize them at their natural size.
#[tracing::instrument(skip(bytes), fields(len = bytes.len()))]
pub fn decode_svg(bytes: &[u8]) -> PlugframeResult<PixelBuffer> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;

    let size = tree.size();
    let to_px = |v: f32| -> PlugframeResult<u32> {
        if !v.is_finite() || v <= 0.0 {
            return Err(PlugframeError::resource("svg has invalid width/height"));
        }
        Ok((v.ceil() as u32).max(1))
    };
    let width = to_px(size.width())?;
    let height = to_px(size.height())?;
    if width > MAX_SVG_DIM || height > MAX_SVG_DIM {
        return Err(PlugframeError::resource(format!(
            "svg raster size too large: {width}x{height} (max {MAX_SVG_DIM}x{MAX_SVG_DIM})"
        )));
    }

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| PlugframeError::resource("failed to allocate svg pixmap"))?;
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::identity(),
        &mut pixmap.as_mut(),
    );
    PixelBuffer::from_premul(width, height, pixmap.data().to_vec())
}

/// `true` when the bytes look like SVG markup rather than a binary raster format.
pub fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(256)];
    let text = String::from_utf8_lossy(head);
    let t = text.trim_start_matches('\u{feff}').trim_start();
    t.starts_with("<svg") || (t.starts_with("<?xml") && text.contains("<svg"))
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bitmap/decode.rs"]
mod tests;
