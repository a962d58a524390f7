use crate::pattern::PatternCache;
use crate::shape::outline_path;
use crate::text::render_text_pixmap;
use ab_glyph::FontArc;
use anyhow::{Context, Result, bail};
use bytemuck::{cast_slice, cast_slice_mut};
use dims_core::{ShapeStimulus, StimulusFrame};
use std::collections::HashMap;
use tiny_skia::{
    Color, FillRule, FilterQuality, Mask, Paint, Pixmap, PixmapPaint, Stroke, Transform,
};
use tracing::debug;

pub const CUE_SIZE_PX: f32 = 48.0;

struct TextCache {
    font: FontArc,
    size_px: f32,
    map: HashMap<String, Pixmap>,
}

impl TextCache {
    fn new(font: FontArc, size_px: f32) -> Self {
        Self {
            font,
            size_px,
            map: HashMap::new(),
        }
    }

    fn get_or_render(&mut self, text: &str) -> Option<&Pixmap> {
        if !self.map.contains_key(text) {
            let pm = render_text_pixmap(text, self.size_px, &self.font, Color::BLACK)?;
            self.map.insert(text.to_owned(), pm);
        }
        self.map.get(text)
    }
}

/// Paints [`StimulusFrame`]s into an offscreen canvas.
pub struct SkiaRenderer {
    canvas: Pixmap,
    text_cache: Option<TextCache>,
    patterns: PatternCache,
}

impl SkiaRenderer {
    /// `font` is only needed for frames that carry a cue.
    pub fn new(width: u32, height: u32, font: Option<FontArc>) -> Result<Self> {
        let canvas = Pixmap::new(width, height)
            .with_context(|| format!("cannot allocate a {width}x{height} canvas"))?;
        Ok(Self {
            canvas,
            text_cache: font.map(|f| TextCache::new(f, CUE_SIZE_PX)),
            patterns: PatternCache::default(),
        })
    }

    pub fn width(&self) -> u32 {
        self.canvas.width()
    }

    pub fn height(&self) -> u32 {
        self.canvas.height()
    }

    pub fn canvas(&self) -> &Pixmap {
        &self.canvas
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        if (width, height) == (self.width(), self.height()) {
            return Ok(());
        }
        self.canvas = Pixmap::new(width, height)
            .with_context(|| format!("cannot allocate a {width}x{height} canvas"))?;
        debug!(width, height, "canvas resized");
        Ok(())
    }

    /// Background, then each shape in order, then the cue on top.
    pub fn render_frame(&mut self, frame: &StimulusFrame) -> Result<&Pixmap> {
        self.resize(frame.canvas_width, frame.canvas_height)?;

        let [r, g, b, a] = frame.background;
        self.canvas.fill(Color::from_rgba8(r, g, b, a));

        for shape in &frame.shapes {
            paint_shape(&mut self.canvas, &mut self.patterns, shape)?;
        }

        if let Some(cue) = &frame.cue {
            let Some(cache) = self.text_cache.as_mut() else {
                bail!("task cue {cue:?} requested but no font is loaded");
            };
            // an empty or whitespace-only cue has no ink and draws nothing
            if let Some(text) = cache.get_or_render(cue) {
                let x = (self.canvas.width() as f32 - text.width() as f32) / 2.0;
                let y = (self.canvas.height() as f32 - text.height() as f32) / 2.0;
                self.canvas.draw_pixmap(
                    x.round() as i32,
                    y.round() as i32,
                    text.as_ref(),
                    &PixmapPaint::default(),
                    Transform::identity(),
                    None,
                );
            }
        }

        Ok(&self.canvas)
    }

    /// Copies the canvas, centered, into an RGBA frame buffer and paints the
    /// margin with `background`.
    pub fn present(
        &self,
        frame_buffer: &mut [u8],
        fb_width: u32,
        fb_height: u32,
        background: [u8; 4],
    ) -> Result<()> {
        let expected = fb_width as usize * fb_height as usize * 4;
        if frame_buffer.len() != expected {
            bail!(
                "frame buffer holds {} bytes, expected {expected} for {fb_width}x{fb_height}",
                frame_buffer.len()
            );
        }

        let dst: &mut [[u8; 4]] = cast_slice_mut(frame_buffer);
        dst.fill(background);

        let src: &[[u8; 4]] = cast_slice(self.canvas.data());
        let cw = self.canvas.width().min(fb_width) as usize;
        let ch = self.canvas.height().min(fb_height) as usize;
        let x0 = (fb_width as usize - cw) / 2;
        let y0 = (fb_height as usize - ch) / 2;
        let src_stride = self.canvas.width() as usize;
        let dst_stride = fb_width as usize;

        for row in 0..ch {
            let s = row * src_stride;
            let d = (y0 + row) * dst_stride + x0;
            dst[d..d + cw].copy_from_slice(&src[s..s + cw]);
        }
        Ok(())
    }
}

/// Fill, then the rotated line pattern and the border, both clipped to the
/// outline so only the inner half of the border shows.
fn paint_shape(canvas: &mut Pixmap, patterns: &mut PatternCache, shape: &ShapeStimulus) -> Result<()> {
    let spec = &shape.spec;
    let path = outline_path(&shape.outline).context("shape outline is empty")?;

    let mut paint = Paint::default();
    let [r, g, b, a] = spec.fill;
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    canvas.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);

    let mut clip = Mask::new(canvas.width(), canvas.height()).context("cannot allocate clip mask")?;
    clip.fill_path(&path, FillRule::Winding, true, Transform::identity());

    let size = (spec.outer_radius * 2.0).ceil() as u32;
    if let Some(lines) = patterns.get_or_render(size) {
        let (cx, cy) = (spec.center.0 as f32, spec.center.1 as f32);
        let half = spec.outer_radius as f32;
        let ts = Transform::from_rotate_at(spec.line_direction.to_degrees() as f32, cx, cy)
            .pre_translate(cx - half, cy - half);
        let pp = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        canvas.draw_pixmap(0, 0, lines.as_ref(), &pp, ts, Some(&clip));
    }

    if spec.border_thickness > 0.0 {
        let mut border = Paint::default();
        border.set_color(Color::BLACK);
        border.anti_alias = true;
        let stroke = Stroke {
            width: spec.border_thickness as f32,
            ..Stroke::default()
        };
        canvas.stroke_path(&path, &border, &stroke, Transform::identity(), Some(&clip));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dims_core::ShapeSpec;

    const FILL: [u8; 4] = [0, 145, 153, 255];
    const GRAY: [u8; 4] = [128, 128, 128, 255];

    fn frame(border_thickness: f64, cue: Option<&str>) -> StimulusFrame {
        let spec = ShapeSpec {
            center: (200.0, 100.0),
            outer_radius: 50.0,
            roundness: 0.0,
            border_thickness,
            fill: FILL,
            line_direction: 0.0,
        };
        StimulusFrame {
            canvas_width: 400,
            canvas_height: 200,
            background: GRAY,
            shapes: vec![ShapeStimulus::new(spec).unwrap()],
            cue: cue.map(str::to_owned),
        }
    }

    fn rgba(pm: &Pixmap, x: u32, y: u32) -> [u8; 4] {
        let c = pm.pixel(x, y).unwrap().demultiply();
        [c.red(), c.green(), c.blue(), c.alpha()]
    }

    #[test]
    fn paints_background_fill_and_lines() {
        let mut r = SkiaRenderer::new(10, 10, None).unwrap();
        let pm = r.render_frame(&frame(0.0, None)).unwrap();
        assert_eq!((pm.width(), pm.height()), (400, 200));
        assert_eq!(rgba(pm, 5, 5), GRAY);
        // between two lines at the center
        assert_eq!(rgba(pm, 200, 100), FILL);
        // on a line: pattern row 53 sits at canvas row 103
        let line = rgba(pm, 200, 103);
        assert!(line[0] < 10 && line[1] < 10 && line[2] < 10);
        // the pattern does not leak outside the outline
        assert_eq!(rgba(pm, 160, 55), GRAY);
    }

    #[test]
    fn border_is_drawn_inside_the_outline() {
        let mut r = SkiaRenderer::new(400, 200, None).unwrap();
        let thin = rgba(r.render_frame(&frame(0.0, None)).unwrap(), 246, 100);
        assert_eq!(thin, FILL);
        let thick = rgba(r.render_frame(&frame(10.0, None)).unwrap(), 246, 100);
        assert!(thick[1] < 10);
        // outside half of the stroke is clipped away
        assert_eq!(rgba(r.canvas(), 253, 100), GRAY);
    }

    #[test]
    fn cue_without_font_is_an_error() {
        let mut r = SkiaRenderer::new(400, 200, None).unwrap();
        let err = r.render_frame(&frame(1.0, Some("1"))).unwrap_err();
        assert!(err.to_string().contains("no font"));
    }

    #[test]
    fn cue_is_centered_on_top_of_the_shape() {
        let Some(font) = crate::find_system_font() else {
            eprintln!("no system font available, skipping");
            return;
        };
        let mut r = SkiaRenderer::new(400, 200, Some(font)).unwrap();
        let plain = r.render_frame(&frame(2.0, None)).unwrap().clone();
        let with_cue = r.render_frame(&frame(2.0, Some("X"))).unwrap();

        let (mut min_x, mut min_y, mut max_x, mut max_y) = (u32::MAX, u32::MAX, 0, 0);
        let mut dark = 0;
        for y in 0..200 {
            for x in 0..400 {
                let got = rgba(with_cue, x, y);
                if got == rgba(&plain, x, y) {
                    continue;
                }
                // ink stays inside the diamond, so it is drawn over the fill
                assert!(x.abs_diff(200) + y.abs_diff(100) < 50, "ink at ({x}, {y})");
                if got[0] < 40 && got[1] < 40 && got[2] < 40 {
                    dark += 1;
                }
                (min_x, min_y) = (min_x.min(x), min_y.min(y));
                (max_x, max_y) = (max_x.max(x), max_y.max(y));
            }
        }
        assert!(dark > 20, "cue should leave black ink, got {dark} pixels");
        assert!(((min_x + max_x) as f32 / 2.0 - 200.0).abs() <= 3.0);
        assert!(((min_y + max_y) as f32 / 2.0 - 100.0).abs() <= 3.0);
        assert!(max_y - min_y < CUE_SIZE_PX as u32);
    }

    #[test]
    fn present_centers_the_canvas() {
        let mut r = SkiaRenderer::new(400, 200, None).unwrap();
        r.render_frame(&frame(0.0, None)).unwrap();
        let (w, h) = (520u32, 230u32);
        let mut fb = vec![0u8; (w * h * 4) as usize];
        r.present(&mut fb, w, h, [1, 2, 3, 255]).unwrap();
        let px = |x: u32, y: u32| {
            let i = ((y * w + x) * 4) as usize;
            [fb[i], fb[i + 1], fb[i + 2], fb[i + 3]]
        };
        assert_eq!(px(0, 0), [1, 2, 3, 255]);
        assert_eq!(px(60 + 5, 15 + 5), GRAY);
        assert_eq!(px(60 + 200, 15 + 100), FILL);

        let mut short = vec![0u8; 16];
        assert!(r.present(&mut short, w, h, GRAY).is_err());
    }
}
