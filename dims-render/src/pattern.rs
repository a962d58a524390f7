use std::collections::HashMap;
use tiny_skia::{Color, Paint, Pixmap, Rect, Transform};

/// Distance between neighbouring lines, px.
pub const LINE_SPACING: f32 = 12.0;
pub const LINE_WIDTH: f32 = 2.0;

/// Square pixmap of black horizontal lines on a transparent ground.
pub fn line_pattern(size: u32, spacing: f32, width: f32) -> Option<Pixmap> {
    let mut pm = Pixmap::new(size, size)?;
    let mut paint = Paint::default();
    paint.set_color(Color::BLACK);
    paint.anti_alias = false;

    let mut y = (spacing - width) / 2.0;
    while y < size as f32 {
        if let Some(r) = Rect::from_xywh(0.0, y, size as f32, width) {
            pm.fill_rect(r, &paint, Transform::identity(), None);
        }
        y += spacing;
    }
    Some(pm)
}

/// Line patterns keyed by edge length; trials reuse the same outer radius.
#[derive(Default)]
pub struct PatternCache {
    map: HashMap<u32, Pixmap>,
}

impl PatternCache {
    pub fn get_or_render(&mut self, size: u32) -> Option<&Pixmap> {
        if !self.map.contains_key(&size) {
            let pm = line_pattern(size, LINE_SPACING, LINE_WIDTH)?;
            self.map.insert(size, pm);
        }
        self.map.get(&size)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_alternate_with_gaps() {
        let pm = line_pattern(48, 12.0, 2.0).unwrap();
        let alpha_at = |y: u32| pm.pixel(10, y).unwrap().alpha();
        assert_eq!(alpha_at(5), 255);
        assert_eq!(alpha_at(6), 255);
        assert_eq!(alpha_at(0), 0);
        assert_eq!(alpha_at(11), 0);
        assert_eq!(alpha_at(17), 255);
    }

    #[test]
    fn cache_renders_each_size_once() {
        let mut cache = PatternCache::default();
        assert!(cache.get_or_render(250).is_some());
        assert!(cache.get_or_render(250).is_some());
        assert_eq!(cache.len(), 1);
        assert!(cache.get_or_render(0).is_none());
    }
}
