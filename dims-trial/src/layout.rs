//! Placement of the objects on the canvas.

use crate::config::{OBJECT_COUNT, ValidatedTrial};
use dims_core::{ShapeSpec, ShapeStimulus, StimulusFrame, WINTER_ISO};
use dims_geometry::GeometryError;

/// Viewport space kept free around the canvas, px.
pub const CHROME_INSETS: (u32, u32) = (120, 30);

/// Horizontal offsets of the object centers from the canvas mid-line.
pub const OBJECT_OFFSETS: [f64; OBJECT_COUNT] = [-302.5, 302.5];

/// Canvas size for a viewport, or `None` when the insets leave nothing.
pub fn canvas_size((width, height): (u32, u32)) -> Option<(u32, u32)> {
    let w = width.checked_sub(CHROME_INSETS.0)?;
    let h = height.checked_sub(CHROME_INSETS.1)?;
    (w > 0 && h > 0).then_some((w, h))
}

pub fn object_center(index: usize, (width, height): (u32, u32)) -> (f64, f64) {
    (
        width as f64 / 2.0 + OBJECT_OFFSETS[index],
        height as f64 / 2.0,
    )
}

pub fn shape_specs(trial: &ValidatedTrial, canvas: (u32, u32)) -> Vec<ShapeSpec> {
    trial
        .objects
        .iter()
        .enumerate()
        .map(|(i, obj)| ShapeSpec {
            center: object_center(i, canvas),
            outer_radius: trial.config.poly_radius,
            roundness: obj.roundness,
            border_thickness: obj.border_thickness,
            fill: WINTER_ISO.sample_rgba(obj.color),
            line_direction: obj.line_direction,
        })
        .collect()
}

/// The full stimulus frame for `trial` on a canvas of the given size.
pub fn build_frame(
    trial: &ValidatedTrial,
    canvas: (u32, u32),
) -> Result<StimulusFrame, GeometryError> {
    let shapes = shape_specs(trial, canvas)
        .into_iter()
        .map(ShapeStimulus::new)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(StimulusFrame {
        canvas_width: canvas.0,
        canvas_height: canvas.1,
        background: trial.background,
        shapes,
        cue: trial
            .config
            .task_cue
            .then(|| trial.config.task_name.clone()),
    })
}
