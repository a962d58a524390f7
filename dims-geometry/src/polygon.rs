use crate::GeometryError;
use kurbo::{Point, Vec2};
use std::f64::consts::TAU;

const MIN_EDGE: f64 = 1e-9;

/// Closed polygon; insertion order defines edge adjacency and the last
/// point connects back to the first.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    points: Vec<Point>,
}

impl Polygon {
    /// Builds a polygon, rejecting fewer than three points, non-finite
    /// coordinates and zero-length edges.
    pub fn new(points: Vec<Point>) -> Result<Self, GeometryError> {
        if points.len() < 3 {
            return Err(GeometryError::TooFewPoints(points.len()));
        }
        if let Some(i) = points.iter().position(|p| !p.is_finite()) {
            return Err(GeometryError::NonFinitePoint(i));
        }
        let n = points.len();
        for i in 0..n {
            let next = (i + 1) % n;
            if points[i].distance(points[next]) < MIN_EDGE {
                return Err(GeometryError::CoincidentPoints { index: i, next });
            }
        }
        Ok(Self { points })
    }

    /// Regular polygon with `sides` vertices on a circle of `circumradius`
    /// around `center`, the first vertex at angle `phase`.
    pub fn regular(
        center: Point,
        circumradius: f64,
        sides: usize,
        phase: f64,
    ) -> Result<Self, GeometryError> {
        let points = (0..sides)
            .map(|i| {
                let angle = phase + i as f64 * TAU / sides as f64;
                center + Vec2::from_angle(angle) * circumradius
            })
            .collect();
        Self::new(points)
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Length of the edge from point `i` to point `i + 1` (wrapping).
    pub fn edge_length(&self, i: usize) -> f64 {
        let n = self.points.len();
        self.points[i % n].distance(self.points[(i + 1) % n])
    }
}
