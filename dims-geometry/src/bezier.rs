use crate::RoundedPath;
use kurbo::{BezPath, PathEl};

/// Largest distance, in pixels, between a flattened arc and the true circle.
pub const FLATTEN_TOLERANCE: f64 = 0.05;

const MIN_RADIUS: f64 = 1e-9;

impl RoundedPath {
    /// Flattens the outline into a closed Bézier path of lines and cubics.
    pub fn to_bez_path(&self) -> BezPath {
        let mut path = BezPath::new();
        for (i, corner) in self.arcs().iter().enumerate() {
            let start = corner.start_point();
            if i == 0 {
                path.move_to(start);
            } else {
                path.line_to(start);
            }
            if corner.radius > MIN_RADIUS {
                path.extend(corner.to_arc().append_iter(FLATTEN_TOLERANCE));
            }
        }
        if !self.is_empty() {
            path.push(PathEl::ClosePath);
        }
        path
    }
}
