//! CPU raster context.

use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::sync::Arc;

use crate::draw::context::{DrawContext, Paint, TextRun};
use crate::draw::input::InputDevice;
use crate::draw::pixels::{self, BlitMode, PixelBuffer, PixelView};
use crate::draw::state::{DrawState, FillRule, Font};
use crate::draw::text::{TextBrush, TextLayoutEngine};
use crate::foundation::core::{Affine, BezPath, Color, Point, Rect, RectExt};
use crate::foundation::error::{PlugframeError, PlugframeResult};
use crate::foundation::math::pixel_span;

/// CPU raster context over a premultiplied RGBA8 pixmap.
///
/// Vector primitives are batched into a `vello_cpu` render context while the clip stays the
/// same. A batch is rasterized into a scratch pixmap and composited onto the surface inside
/// its clip whenever the clip changes or pixels are accessed directly.
pub struct PixmapContext {
    state: DrawState,
    width: u16,
    height: u16,
    pixmap: vello_cpu::Pixmap,
    scratch: Option<vello_cpu::Pixmap>,
    render: Option<vello_cpu::RenderContext>,
    batch_clip: Option<Rect>,
    text: TextLayoutEngine,
    fonts: HashMap<usize, vello_cpu::peniko::FontData>,
    input: Option<Rc<dyn InputDevice>>,
}

impl PixmapContext {
    /// Transparent surface of `width x height` pixels.
    pub fn new(width: u32, height: u32) -> PlugframeResult<Self> {
        if width == 0 || height == 0 {
            return Err(PlugframeError::validation(format!(
                "pixmap size must be non-zero, got {width}x{height}"
            )));
        }
        let w: u16 = width
            .try_into()
            .map_err(|_| PlugframeError::validation("pixmap width exceeds u16"))?;
        let h: u16 = height
            .try_into()
            .map_err(|_| PlugframeError::validation("pixmap height exceeds u16"))?;
        let bounds = Rect::new(0.0, 0.0, f64::from(w), f64::from(h));
        Ok(Self {
            state: DrawState::new(bounds),
            width: w,
            height: h,
            pixmap: vello_cpu::Pixmap::new(w, h),
            scratch: None,
            render: None,
            batch_clip: None,
            text: TextLayoutEngine::new(),
            fonts: HashMap::new(),
            input: None,
        })
    }

    /// Surface filled with `color`.
    pub fn filled(width: u32, height: u32, color: Color) -> PlugframeResult<Self> {
        let mut ctx = Self::new(width, height)?;
        ctx.clear(color);
        Ok(ctx)
    }

    /// Bind an input device for mouse queries.
    pub fn with_input(mut self, input: Rc<dyn InputDevice>) -> Self {
        self.input = Some(input);
        self
    }

    /// Replace the bound input device.
    pub fn set_input(&mut self, input: Option<Rc<dyn InputDevice>>) {
        self.input = input;
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        u32::from(self.width)
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        u32::from(self.height)
    }

    /// Reset the drawing state, keeping the pixels.
    pub fn reset_state(&mut self) {
        self.flush_batch();
        self.state = DrawState::new(self.surface_bounds());
    }

    /// Overwrite every pixel with `color`.
    pub fn clear(&mut self, color: Color) {
        self.batch_clip = None;
        let px = color.premul();
        for d in self.pixmap.data_as_u8_slice_mut().chunks_exact_mut(4) {
            d.copy_from_slice(&px);
        }
    }

    /// Premultiplied pixels, with pending primitives rasterized first.
    pub fn pixels(&mut self) -> PixelView<'_> {
        self.flush_batch();
        PixelView {
            width: u32::from(self.width),
            height: u32::from(self.height),
            data: self.pixmap.data_as_u8_slice(),
        }
    }

    /// Owned copy of the pixels.
    pub fn to_buffer(&mut self) -> PixelBuffer {
        let v = self.pixels();
        PixelBuffer {
            width: v.width,
            height: v.height,
            data: v.data.to_vec(),
        }
    }

    fn with_batch(
        &mut self,
        f: impl FnOnce(&mut vello_cpu::RenderContext, &mut TextLayoutEngine, &mut FontCache<'_>),
    ) {
        let clip = self.state.clip;
        if self.batch_clip.is_some_and(|c| c != clip) {
            self.flush_batch();
        }
        let (w, h) = (self.width, self.height);
        let ctx = self
            .render
            .get_or_insert_with(|| vello_cpu::RenderContext::new(w, h));
        if self.batch_clip.is_none() {
            ctx.reset();
            self.batch_clip = Some(clip);
        }
        let mut fonts = FontCache(&mut self.fonts);
        f(ctx, &mut self.text, &mut fonts);
    }

    fn flush_batch(&mut self) {
        let Some(clip) = self.batch_clip.take() else {
            return;
        };
        let Some(ctx) = self.render.as_mut() else {
            return;
        };
        let (w, h) = (self.width, self.height);
        let scratch = self
            .scratch
            .get_or_insert_with(|| vello_cpu::Pixmap::new(w, h));
        scratch.data_as_u8_slice_mut().fill(0);
        ctx.flush();
        ctx.render_to_pixmap(scratch);

        let src = PixelView {
            width: u32::from(w),
            height: u32::from(h),
            data: scratch.data_as_u8_slice(),
        };
        pixels::blit(
            self.pixmap.data_as_u8_slice_mut(),
            u32::from(w),
            u32::from(h),
            src,
            clip,
            clip.origin(),
            clip,
            BlitMode::Over,
            1.0,
        );
    }

    fn pixel_index(&self, device: Point) -> Option<usize> {
        let x = device.x.floor();
        let y = device.y.floor();
        if x < 0.0 || y < 0.0 || x >= f64::from(self.width) || y >= f64::from(self.height) {
            return None;
        }
        Some(((y as usize) * usize::from(self.width) + (x as usize)) * 4)
    }
}

struct FontCache<'a>(&'a mut HashMap<usize, vello_cpu::peniko::FontData>);

impl FontCache<'_> {
    fn get(&mut self, data: &Arc<Vec<u8>>) -> vello_cpu::peniko::FontData {
        let key = Arc::as_ptr(data) as usize;
        self.0
            .entry(key)
            .or_insert_with(|| {
                vello_cpu::peniko::FontData::new(
                    vello_cpu::peniko::Blob::from((**data).clone()),
                    0,
                )
            })
            .clone()
    }
}

impl DrawContext for PixmapContext {
    fn state(&self) -> &DrawState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut DrawState {
        &mut self.state
    }

    fn surface_bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }

    fn fill_shape(&mut self, path: &BezPath, paint: &Paint, rule: FillRule) {
        let bounds = self.surface_bounds();
        let gradient = match paint {
            Paint::Solid(_) => None,
            Paint::LinearGradient {
                start,
                end,
                from,
                to,
            } => {
                let area = kurbo::Shape::bounding_box(path).bound(bounds);
                if area.is_void() {
                    return;
                }
                match gradient_image(area, *start, *end, *from, *to) {
                    Ok(img) => Some((area, img)),
                    Err(e) => {
                        tracing::warn!("gradient paint failed: {e}");
                        return;
                    }
                }
            }
        };
        let cpu_path = bezpath_to_cpu(path);
        self.with_batch(|ctx, _, _| {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
            ctx.set_fill_rule(match rule {
                FillRule::NonZero => vello_cpu::peniko::Fill::NonZero,
                FillRule::EvenOdd => vello_cpu::peniko::Fill::EvenOdd,
            });
            match (paint, gradient) {
                (Paint::Solid(c), _) => {
                    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
                    ctx.set_paint(c.to_cpu());
                }
                (_, Some((area, img))) => {
                    ctx.set_paint_transform(affine_to_cpu(Affine::translate((area.x0, area.y0))));
                    ctx.set_paint(img);
                }
                (_, None) => return,
            }
            ctx.fill_path(&cpu_path);
        });
    }

    fn blit(&mut self, src: PixelView<'_>, src_rect: Rect, dest: Point, mode: BlitMode, alpha: f32) {
        self.flush_batch();
        let clip = self.state.clip;
        pixels::blit(
            self.pixmap.data_as_u8_slice_mut(),
            u32::from(self.width),
            u32::from(self.height),
            src,
            src_rect,
            dest,
            clip,
            mode,
            alpha,
        );
    }

    fn draw_text_run(&mut self, run: &TextRun<'_>) {
        let Some(data) = run.font.data.clone() else {
            tracing::trace!(family = %run.font.family, "font has no data, text skipped");
            return;
        };
        let brush = TextBrush {
            r: run.color.r,
            g: run.color.g,
            b: run.color.b,
            a: run.color.a,
        };
        let text = run.text;
        let font = run.font;
        let origin = run.origin;
        self.with_batch(|ctx, engine, fonts| {
            let layout = match engine.layout_line(text, font, brush) {
                Ok(l) => l,
                Err(e) => {
                    tracing::warn!(family = %font.family, "text layout failed: {e}");
                    return;
                }
            };
            let font_data = fonts.get(&data);
            ctx.set_transform(affine_to_cpu(Affine::translate((origin.x, origin.y))));
            for line in layout.lines() {
                for item in line.items() {
                    let parley::layout::PositionedLayoutItem::GlyphRun(glyph_run) = item else {
                        continue;
                    };
                    let b = glyph_run.style().brush;
                    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(b.r, b.g, b.b, b.a));
                    let glyphs = glyph_run.glyphs().map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    });
                    ctx.glyph_run(&font_data)
                        .font_size(glyph_run.run().font_size())
                        .fill_glyphs(glyphs);
                }
            }
        });
    }

    fn measure_text(&mut self, text: &str, font: &Font) -> f64 {
        self.text.measure(text, font)
    }

    fn read_pixel(&mut self, device: Point) -> Option<Color> {
        self.flush_batch();
        let i = self.pixel_index(device)?;
        let px = self.pixmap.data_as_u8_slice().get(i..i + 4)?;
        Some(pixels::unpremultiply([px[0], px[1], px[2], px[3]]))
    }

    fn write_pixel(&mut self, device: Point, color: Color) {
        self.flush_batch();
        let Some(i) = self.pixel_index(device) else {
            return;
        };
        let px = color.scale_alpha(self.state.global_alpha).premul();
        if let Some(d) = self.pixmap.data_as_u8_slice_mut().get_mut(i..i + 4) {
            d.copy_from_slice(&px);
        }
    }

    fn flood_fill_device(&mut self, device: Point, color: Color) {
        self.flush_batch();
        let (w, h) = (u32::from(self.width), u32::from(self.height));
        let clip = self.state.clip;
        let (cx0, cx1) = pixel_span(clip.x0, clip.x1, w);
        let (cy0, cy1) = pixel_span(clip.y0, clip.y1, h);
        let Some(seed_i) = self.pixel_index(device) else {
            return;
        };
        let fill = color.premul();
        let data = self.pixmap.data_as_u8_slice_mut();
        let seed = [
            data[seed_i],
            data[seed_i + 1],
            data[seed_i + 2],
            data[seed_i + 3],
        ];
        if seed == fill {
            return;
        }
        let mut queue = VecDeque::new();
        queue.push_back((device.x.floor() as u32, device.y.floor() as u32));
        while let Some((x, y)) = queue.pop_front() {
            if x < cx0 || x >= cx1 || y < cy0 || y >= cy1 {
                continue;
            }
            let i = ((y as usize) * (w as usize) + (x as usize)) * 4;
            if data[i..i + 4] != seed {
                continue;
            }
            data[i..i + 4].copy_from_slice(&fill);
            if x > 0 {
                queue.push_back((x - 1, y));
            }
            if x + 1 < w {
                queue.push_back((x + 1, y));
            }
            if y > 0 {
                queue.push_back((x, y - 1));
            }
            if y + 1 < h {
                queue.push_back((x, y + 1));
            }
        }
    }

    fn read_pixels(&mut self, device_rect: Rect) -> Option<PixelBuffer> {
        let r = device_rect.bound(self.surface_bounds());
        if r.is_void() {
            return None;
        }
        Some(self.pixels().crop(r))
    }

    fn input_device(&self) -> Option<Rc<dyn InputDevice>> {
        self.input.clone()
    }

    fn flush(&mut self) {
        self.flush_batch();
    }
}

fn gradient_image(
    area: Rect,
    start: Point,
    end: Point,
    from: Color,
    to: Color,
) -> PlugframeResult<vello_cpu::Image> {
    let w = area.width().ceil().max(1.0) as u32;
    let h = area.height().ceil().max(1.0) as u32;
    let axis = end - start;
    let len2 = axis.hypot2();
    let mut bytes = vec![0u8; pixels::byte_len(w, h)];
    for y in 0..h {
        for x in 0..w {
            let p = Point::new(area.x0 + f64::from(x) + 0.5, area.y0 + f64::from(y) + 0.5);
            let t = if len2 <= f64::EPSILON {
                0.0
            } else {
                ((p - start).dot(axis) / len2).clamp(0.0, 1.0)
            };
            let lerp = |a: u8, b: u8| -> u8 {
                let af = f64::from(a);
                let bf = f64::from(b);
                (af + (bf - af) * t).round().clamp(0.0, 255.0) as u8
            };
            let c = Color::rgba(
                lerp(from.r, to.r),
                lerp(from.g, to.g),
                lerp(from.b, to.b),
                lerp(from.a, to.a),
            );
            let idx = ((y as usize) * (w as usize) + (x as usize)) * 4;
            bytes[idx..idx + 4].copy_from_slice(&c.premul());
        }
    }
    let pixmap = pixmap_from_premul_bytes(&bytes, w, h)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn pixmap_from_premul_bytes(bytes: &[u8], width: u32, height: u32) -> PlugframeResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| PlugframeError::validation("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| PlugframeError::validation("pixmap height exceeds u16"))?;
    if bytes.len() != pixels::byte_len(width, height) {
        return Err(PlugframeError::validation("pixmap byte len mismatch"));
    }
    let mut px = Vec::<vello_cpu::peniko::color::PremulRgba8>::with_capacity(
        (width as usize) * (height as usize),
    );
    for c in bytes.chunks_exact(4) {
        px.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            c[0], c[1], c[2], c[3],
        ]));
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(px, w, h, true))
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let p = |p: Point| vello_cpu::kurbo::Point::new(p.x, p.y);
    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(a) => out.move_to(p(a)),
            PathEl::LineTo(a) => out.line_to(p(a)),
            PathEl::QuadTo(a, b) => out.quad_to(p(a), p(b)),
            PathEl::CurveTo(a, b, c) => out.curve_to(p(a), p(b), p(c)),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/draw/pixmap.rs"]
mod tests;
