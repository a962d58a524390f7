use dims_core::AnswerSpecError;
use dims_geometry::GeometryError;
use thiserror::Error;

/// Rejected trial configuration. Raised before anything is drawn.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid trial JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("missing required per-object array `{0}`")]
    MissingArray(&'static str),

    #[error("`{field}` has {actual} entries, expected one per object ({expected})")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("`{field}[{index}]` = {value} is outside {min}..={max}")]
    OutOfRange {
        field: &'static str,
        index: usize,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("`trial_duration` must be positive")]
    NonPositiveDuration,

    #[error("`poly_radius` must be a positive number, got {0}")]
    InvalidPolyRadius(f64),

    #[error("unrecognised background color {0:?}")]
    BadColor(String),

    #[error("invalid `choices`: {0}")]
    Choices(#[source] AnswerSpecError),

    #[error("invalid `correct_choice`: {0}")]
    CorrectChoice(#[source] AnswerSpecError),
}

#[derive(Debug, Error)]
pub enum TrialError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot build stimulus outline: {0}")]
    Geometry(#[from] GeometryError),

    #[error("drawing surface is unavailable")]
    SurfaceUnavailable,

    #[error("viewport {width}x{height} leaves no room for the canvas")]
    ViewportTooSmall { width: u32, height: u32 },

    #[error("trial already started")]
    AlreadyStarted,

    #[error(transparent)]
    Display(#[from] anyhow::Error),
}
