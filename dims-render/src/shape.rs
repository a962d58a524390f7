use dims_geometry::{PathEl, RoundedPath};
use tiny_skia::{Path, PathBuilder};

/// Converts a rounded outline into a tiny-skia path. `None` for an empty
/// outline.
pub fn outline_path(outline: &RoundedPath) -> Option<Path> {
    let mut pb = PathBuilder::new();
    for el in outline.to_bez_path().elements() {
        match *el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(c, p) => pb.quad_to(c.x as f32, c.y as f32, p.x as f32, p.y as f32),
            PathEl::CurveTo(c1, c2, p) => pb.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}
