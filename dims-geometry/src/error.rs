use thiserror::Error;

/// Errors raised while building a rounded outline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("polygon needs at least 3 points, got {0}")]
    TooFewPoints(usize),

    #[error("points {index} and {next} coincide (zero-length edge)")]
    CoincidentPoints { index: usize, next: usize },

    #[error("corner {index} has collinear or reversed edges; half angle is undefined")]
    DegenerateCorner { index: usize },

    #[error("corner radius must be finite and non-negative, got {0}")]
    InvalidRadius(f64),

    #[error("non-finite coordinate at point {0}")]
    NonFinitePoint(usize),
}
