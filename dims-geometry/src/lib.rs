pub mod bezier;
pub mod error;
pub mod polygon;
pub mod round;

pub use error::GeometryError;
pub use kurbo::{BezPath, PathEl, Point, Vec2};
pub use polygon::Polygon;
pub use round::{ArcDirection, CornerArc, RoundedPath, round_polygon};
