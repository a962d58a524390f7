//! Arc-based corner rounding for closed polygons.
//!
//! Every vertex is replaced by a circular arc tangent to both adjacent
//! edges. When the requested radius would push a tangent point past the
//! midpoint of either adjacent edge, that corner alone is shrunk until the
//! tangent point sits on the midpoint. Other corners keep their own radius.

use crate::{GeometryError, Polygon};
use kurbo::{Arc, Point, Vec2};
use std::f64::consts::{FRAC_PI_2, PI, TAU};
use tracing::debug;

const DEGENERATE_EPS: f64 = 1e-9;

/// Direction an arc is traced, using canvas conventions in a y-down frame:
/// `Clockwise` runs through increasing angles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcDirection {
    Clockwise,
    Anticlockwise,
}

/// One rounded corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerArc {
    pub center: Point,
    pub radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    pub direction: ArcDirection,
    /// Distance from the vertex to each tangent point.
    pub tangent_length: f64,
}

impl CornerArc {
    pub fn start_point(&self) -> Point {
        self.center + Vec2::from_angle(self.start_angle) * self.radius
    }

    pub fn end_point(&self) -> Point {
        self.center + Vec2::from_angle(self.end_angle) * self.radius
    }

    /// Signed sweep in `(-2π, 2π)`; negative when anticlockwise.
    pub fn sweep(&self) -> f64 {
        match self.direction {
            ArcDirection::Clockwise => (self.end_angle - self.start_angle).rem_euclid(TAU),
            ArcDirection::Anticlockwise => -(self.start_angle - self.end_angle).rem_euclid(TAU),
        }
    }

    /// The corner as a circular kurbo arc.
    pub fn to_arc(&self) -> Arc {
        Arc {
            center: self.center,
            radii: Vec2::new(self.radius, self.radius),
            start_angle: self.start_angle,
            sweep_angle: self.sweep(),
            x_rotation: 0.0,
        }
    }
}

/// Closed outline made of one arc per polygon vertex, joined by straight
/// connectors from each arc's end to the next arc's start.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundedPath {
    arcs: Vec<CornerArc>,
}

impl RoundedPath {
    pub fn arcs(&self) -> &[CornerArc] {
        &self.arcs
    }

    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// Largest effective corner radius on the path.
    pub fn max_radius(&self) -> f64 {
        self.arcs.iter().map(|a| a.radius).fold(0.0, f64::max)
    }
}

/// Edge from `from` to `to` split into unit direction and length.
struct Edge {
    unit: Vec2,
    len: f64,
}

impl Edge {
    fn between(from: Point, to: Point) -> Self {
        let d = to - from;
        let len = d.hypot();
        Self { unit: d / len, len }
    }
}

/// Quarter turn towards +y: `(-y, x)`.
fn normal(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

/// Per-corner orientation resolved from the two edge vectors.
struct CornerFrame {
    half_angle: f64,
    sign: f64,
    direction: ArcDirection,
}

fn corner_frame(v1: &Edge, v2: &Edge) -> CornerFrame {
    let sin_a = v1.unit.cross(v2.unit).clamp(-1.0, 1.0);
    // cross of v1 with the normal of v2, which reduces to the dot product
    let sin_a90 = v1.unit.dot(v2.unit);
    let mut angle = sin_a.asin();

    let (sign, direction) = if sin_a90 < 0.0 {
        if angle < 0.0 {
            angle += PI;
            (1.0, ArcDirection::Clockwise)
        } else {
            angle = PI - angle;
            (-1.0, ArcDirection::Anticlockwise)
        }
    } else if angle > 0.0 {
        (-1.0, ArcDirection::Anticlockwise)
    } else {
        (1.0, ArcDirection::Clockwise)
    };

    CornerFrame {
        half_angle: angle / 2.0,
        sign,
        direction,
    }
}

/// Rounds every corner of `polygon` with `radius`, degrading the radius
/// per corner where it does not fit.
///
/// A radius of zero yields zero-radius arcs centered on the vertices, which
/// trace the sharp polygon.
pub fn round_polygon(polygon: &Polygon, radius: f64) -> Result<RoundedPath, GeometryError> {
    if !radius.is_finite() || radius < 0.0 {
        return Err(GeometryError::InvalidRadius(radius));
    }

    let points = polygon.points();
    let n = points.len();
    let mut arcs = Vec::with_capacity(n);

    for i in 0..n {
        let p1 = points[(i + n - 1) % n];
        let p2 = points[i];
        let p3 = points[(i + 1) % n];

        let v1 = Edge::between(p2, p1);
        let v2 = Edge::between(p2, p3);
        let frame = corner_frame(&v1, &v2);

        let (sin_h, cos_h) = frame.half_angle.sin_cos();
        if sin_h.abs() < DEGENERATE_EPS || cos_h.abs() < DEGENERATE_EPS {
            return Err(GeometryError::DegenerateCorner { index: i });
        }

        let limit = v1.len.min(v2.len) / 2.0;
        let mut tangent_length = (cos_h * radius / sin_h).abs();
        let corner_radius = if tangent_length > limit {
            tangent_length = limit;
            let clamped = (tangent_length * sin_h / cos_h).abs();
            debug!(corner = i, requested = radius, clamped, "corner radius clamped");
            clamped
        } else {
            radius
        };

        let center = p2 + v2.unit * tangent_length + normal(v2.unit) * (corner_radius * frame.sign);

        arcs.push(CornerArc {
            center,
            radius: corner_radius,
            start_angle: v1.unit.atan2() + FRAC_PI_2 * frame.sign,
            end_angle: v2.unit.atan2() - FRAC_PI_2 * frame.sign,
            direction: frame.direction,
            tangent_length,
        });
    }

    Ok(RoundedPath { arcs })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn square(half_diagonal: f64) -> Polygon {
        Polygon::regular(Point::new(0.0, 0.0), half_diagonal, 4, 0.0).unwrap()
    }

    /// Random convex polygon: sorted angles on a jittered circle.
    fn random_convex(rng: &mut StdRng) -> Polygon {
        let n = rng.random_range(3..9);
        let mut angles: Vec<f64> = (0..n).map(|_| rng.random_range(0.0..TAU)).collect();
        angles.sort_by(|a, b| a.total_cmp(b));
        angles.dedup_by(|a, b| (*a - *b).abs() < 0.2);
        if let (Some(&first), Some(&last)) = (angles.first(), angles.last()) {
            if TAU - last + first < 0.2 {
                angles.pop();
            }
        }
        if angles.len() < 3 {
            angles = vec![0.0, 2.1, 4.2];
        }
        let r = rng.random_range(20.0..200.0);
        let c = Point::new(rng.random_range(-50.0..50.0), rng.random_range(-50.0..50.0));
        Polygon::new(angles.iter().map(|&a| c + Vec2::from_angle(a) * r).collect()).unwrap()
    }

    #[test]
    fn zero_radius_reproduces_sharp_corners() {
        let poly = square(10.0);
        let path = round_polygon(&poly, 0.0).unwrap();
        assert_eq!(path.len(), 4);
        for (arc, vertex) in path.arcs().iter().zip(poly.points()) {
            assert_eq!(arc.radius, 0.0);
            assert_relative_eq!(arc.center.x, vertex.x, epsilon = 1e-12);
            assert_relative_eq!(arc.center.y, vertex.y, epsilon = 1e-12);
        }
    }

    #[test]
    fn small_radius_is_kept_and_arc_touches_both_edges() {
        let poly = square(100.0);
        let path = round_polygon(&poly, 10.0).unwrap();
        for (i, arc) in path.arcs().iter().enumerate() {
            assert_relative_eq!(arc.radius, 10.0);
            // right-angle corners: tangent length equals the radius
            assert_relative_eq!(arc.tangent_length, 10.0, epsilon = 1e-9);
            let vertex = poly.points()[i];
            assert_relative_eq!(arc.start_point().distance(vertex), 10.0, epsilon = 1e-9);
            assert_relative_eq!(arc.end_point().distance(vertex), 10.0, epsilon = 1e-9);
            assert_relative_eq!(arc.sweep().abs(), FRAC_PI_2, epsilon = 1e-9);
        }
    }

    #[test]
    fn bottom_corner_center_lies_inside_the_square() {
        let path = round_polygon(&square(100.0), 10.0).unwrap();
        let bottom = path.arcs()[1];
        assert_relative_eq!(bottom.center.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(bottom.center.y, 100.0 - 10.0 * 2f64.sqrt(), epsilon = 1e-9);
        assert_eq!(bottom.direction, ArcDirection::Clockwise);
    }

    #[test]
    fn oversized_radius_clamps_to_half_edge_on_every_corner() {
        let poly = square(100.0);
        let edge = poly.edge_length(0);
        let path = round_polygon(&poly, 1_000.0).unwrap();
        for arc in path.arcs() {
            assert_relative_eq!(arc.radius, edge / 2.0, epsilon = 1e-9);
            assert_relative_eq!(arc.tangent_length, edge / 2.0, epsilon = 1e-9);
            assert!(arc.radius < 1_000.0);
        }
    }

    #[test]
    fn clamp_is_local_to_the_corner() {
        // the short left edge bounds both of its corners; the far corner
        // keeps the requested radius
        let poly = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(200.0, 0.0),
            Point::new(200.0, 100.0),
            Point::new(0.0, 10.0),
        ])
        .unwrap();
        let path = round_polygon(&poly, 20.0).unwrap();
        let radii: Vec<f64> = path.arcs().iter().map(|a| a.radius).collect();
        assert_relative_eq!(radii[1], 20.0);
        assert!(radii[0] < 20.0);
        assert!(radii[3] < 20.0);
    }

    #[test]
    fn regular_hexagon_clamps_uniformly() {
        let hex = Polygon::regular(Point::new(0.0, 0.0), 50.0, 6, 0.3).unwrap();
        let edge = hex.edge_length(0);
        let path = round_polygon(&hex, 500.0).unwrap();
        let first = path.arcs()[0].radius;
        for arc in path.arcs() {
            assert_relative_eq!(arc.radius, first, epsilon = 1e-9);
            assert_relative_eq!(arc.tangent_length, edge / 2.0, epsilon = 1e-9);
        }
        assert!(first < 500.0);
    }

    #[test]
    fn winding_follows_the_input_order() {
        let poly = square(50.0);
        let cw = round_polygon(&poly, 5.0).unwrap();
        assert!(cw.arcs().iter().all(|a| a.sweep() > 0.0));

        let mut reversed = poly.points().to_vec();
        reversed.reverse();
        let ccw = round_polygon(&Polygon::new(reversed).unwrap(), 5.0).unwrap();
        assert!(ccw.arcs().iter().all(|a| a.sweep() < 0.0));
    }

    #[test]
    fn collinear_and_reversed_corners_are_rejected() {
        let straight = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(20.0, 0.0),
            Point::new(10.0, 10.0),
        ])
        .unwrap();
        assert_eq!(
            round_polygon(&straight, 2.0),
            Err(GeometryError::DegenerateCorner { index: 1 })
        );

        let spike = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(5.0, 0.0),
        ])
        .unwrap();
        assert!(matches!(
            round_polygon(&spike, 2.0),
            Err(GeometryError::DegenerateCorner { .. })
        ));
    }

    #[test]
    fn negative_or_nan_radius_is_rejected() {
        let poly = square(10.0);
        assert_eq!(
            round_polygon(&poly, -1.0),
            Err(GeometryError::InvalidRadius(-1.0))
        );
        assert!(matches!(
            round_polygon(&poly, f64::NAN),
            Err(GeometryError::InvalidRadius(_))
        ));
    }

    #[test]
    fn random_convex_polygons_respect_radius_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let poly = random_convex(&mut rng);
            let r = rng.random_range(0.0..150.0);
            let path = round_polygon(&poly, r).unwrap();
            assert_eq!(path.len(), poly.len());

            let n = poly.len();
            for (i, arc) in path.arcs().iter().enumerate() {
                let shorter = poly.edge_length(i).min(poly.edge_length((i + n - 1) % n));
                assert!(arc.radius <= r + 1e-9);
                assert!(arc.tangent_length <= shorter / 2.0 + 1e-9);
                // tangent points lie on the adjacent edges
                let vertex = poly.points()[i];
                assert_relative_eq!(
                    arc.start_point().distance(vertex),
                    arc.tangent_length,
                    epsilon = 1e-6
                );
                assert_relative_eq!(
                    arc.end_point().distance(vertex),
                    arc.tangent_length,
                    epsilon = 1e-6
                );
            }
        }
    }
}
