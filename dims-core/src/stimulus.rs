use dims_geometry::{GeometryError, Point, Polygon, RoundedPath, round_polygon};
use std::f64::consts::PI;

/// The stimulus polygon is a square standing on a vertex.
const SIDES: usize = 4;

/// Visual parameters of one object on the stimulus canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeSpec {
    pub center: (f64, f64),
    /// Circumradius of the fully sharp reference square.
    pub outer_radius: f64,
    /// 0 = sharp corners, 1 = corner radius equal to the roundest radius.
    pub roundness: f64,
    pub border_thickness: f64,
    pub fill: [u8; 4],
    /// Rotation of the internal line pattern, radians.
    pub line_direction: f64,
}

impl ShapeSpec {
    /// Area of the sharp square whose circumradius is `outer_radius`.
    pub fn sharpest_surface(&self) -> f64 {
        sharpest_surface(self.outer_radius)
    }

    /// Radius of the circle with the same area as the sharp square.
    pub fn roundest_radius(&self) -> f64 {
        roundest_radius(self.outer_radius)
    }

    /// Absolute corner radius for this object's roundness.
    pub fn corner_radius(&self) -> f64 {
        self.roundness * self.roundest_radius()
    }

    /// Circumradius of the square that, once rounded with
    /// [`corner_radius`](Self::corner_radius), keeps the sharp square's area.
    pub fn equalized_circumradius(&self) -> f64 {
        let r = self.corner_radius();
        let side = ((4.0 - PI) * r * r + self.sharpest_surface()).sqrt();
        side / std::f64::consts::SQRT_2
    }

    /// Area-equalized square around `center` with vertices on the horizontal
    /// and vertical axes.
    pub fn polygon(&self) -> Result<Polygon, GeometryError> {
        let (x, y) = self.center;
        Polygon::regular(Point::new(x, y), self.equalized_circumradius(), SIDES, 0.0)
    }

    pub fn outline(&self) -> Result<RoundedPath, GeometryError> {
        round_polygon(&self.polygon()?, self.corner_radius())
    }
}

/// A shape together with its rounded outline.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeStimulus {
    pub spec: ShapeSpec,
    pub outline: RoundedPath,
}

impl ShapeStimulus {
    pub fn new(spec: ShapeSpec) -> Result<Self, GeometryError> {
        let outline = spec.outline()?;
        Ok(Self { spec, outline })
    }
}

pub fn sharpest_surface(outer_radius: f64) -> f64 {
    (outer_radius * 2.0).powi(2) / 2.0
}

pub fn roundest_radius(outer_radius: f64) -> f64 {
    (sharpest_surface(outer_radius) / PI).sqrt()
}

/// Everything needed to paint one stimulus frame.
#[derive(Debug, Clone, PartialEq)]
pub struct StimulusFrame {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub background: [u8; 4],
    pub shapes: Vec<ShapeStimulus>,
    /// Centered task label, drawn on top of the shapes.
    pub cue: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn spec(roundness: f64) -> ShapeSpec {
        ShapeSpec {
            center: (0.0, 0.0),
            outer_radius: 125.0,
            roundness,
            border_thickness: 1.0,
            fill: [0, 0, 0, 255],
            line_direction: 0.0,
        }
    }

    #[test]
    fn roundest_circle_has_the_sharp_area() {
        let s = spec(1.0);
        assert_relative_eq!(s.sharpest_surface(), 31_250.0);
        let r = s.roundest_radius();
        assert_relative_eq!(PI * r * r, s.sharpest_surface(), epsilon = 1e-6);
    }

    #[test]
    fn sharp_square_keeps_the_outer_radius() {
        assert_relative_eq!(spec(0.0).equalized_circumradius(), 125.0, epsilon = 1e-9);
    }

    #[test]
    fn rounded_square_area_is_equalized() {
        let s = spec(0.6);
        let r = s.corner_radius();
        let side = s.equalized_circumradius() * std::f64::consts::SQRT_2;
        let rounded_area = side * side - (4.0 - PI) * r * r;
        assert_relative_eq!(rounded_area, s.sharpest_surface(), epsilon = 1e-6);
    }

    #[test]
    fn sharp_outline_has_zero_radius_corners() {
        let stim = ShapeStimulus::new(spec(0.0)).unwrap();
        assert_eq!(stim.outline.len(), 4);
        assert_eq!(stim.outline.max_radius(), 0.0);
        let first = stim.outline.arcs()[0].center;
        assert_relative_eq!(first.x, 125.0, epsilon = 1e-9);
    }

    #[test]
    fn fully_round_outline_is_a_circle() {
        let s = spec(1.0);
        let stim = ShapeStimulus::new(s.clone()).unwrap();
        for arc in stim.outline.arcs() {
            assert_relative_eq!(arc.radius, s.roundest_radius(), epsilon = 1e-6);
            assert_relative_eq!(arc.center.x, 0.0, epsilon = 1e-6);
            assert_relative_eq!(arc.center.y, 0.0, epsilon = 1e-6);
        }
    }
}
