use crate::error::ConfigError;
use dims_core::{AnswerSpec, CharOrCode, ExpectedAnswer, KeySpec, parse_color};
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;

/// Objects on screen per trial.
pub const OBJECT_COUNT: usize = 2;

/// Trial parameters as supplied by the host, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialConfig {
    /// Valid response keys; empty means no key is listened for.
    #[serde(default)]
    pub choices: Vec<KeySpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_choice: Option<AnswerSpec>,
    /// Milliseconds.
    #[serde(default = "default_trial_duration")]
    pub trial_duration: u64,
    #[serde(default = "default_true")]
    pub response_ends_trial: bool,
    #[serde(default = "default_background")]
    pub background_color: String,
    #[serde(default = "default_true", alias = "taskCue")]
    pub task_cue: bool,
    #[serde(
        default = "default_task_name",
        alias = "taskName",
        deserialize_with = "string_or_number"
    )]
    pub task_name: String,
    #[serde(default = "default_poly_radius")]
    pub poly_radius: f64,

    // Per-object arrays, one entry per object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_thickness: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_color: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines_direction: Option<Vec<f64>>,
}

fn default_trial_duration() -> u64 {
    1500
}

fn default_true() -> bool {
    true
}

fn default_background() -> String {
    "gray".to_owned()
}

fn default_task_name() -> String {
    "1".to_owned()
}

fn default_poly_radius() -> f64 {
    125.0
}

/// Task names are usually numbers in existing timelines.
fn string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }
    Ok(match Raw::deserialize(d)? {
        Raw::Text(s) => s,
        Raw::Int(i) => i.to_string(),
        Raw::Float(f) => f.to_string(),
    })
}

/// Immutable parameters of one object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectParams {
    /// Fraction of the roundest radius, 0..=1.
    pub roundness: f64,
    pub border_thickness: f64,
    /// Position on the fill color ramp, 0..=1.
    pub color: f64,
    /// Radians.
    pub line_direction: f64,
}

/// A configuration that passed validation, with keys, colors and the
/// expected answer resolved.
#[derive(Debug, Clone)]
pub struct ValidatedTrial {
    pub config: TrialConfig,
    pub valid_keys: Vec<u32>,
    pub expected: Option<ExpectedAnswer>,
    pub duration: Duration,
    pub background: [u8; 4],
    pub objects: Vec<ObjectParams>,
}

impl TrialConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader(reader: impl std::io::Read) -> Result<Self, ConfigError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn validate(self) -> Result<ValidatedTrial, ConfigError> {
        if self.trial_duration == 0 {
            return Err(ConfigError::NonPositiveDuration);
        }
        if !(self.poly_radius.is_finite() && self.poly_radius > 0.0) {
            return Err(ConfigError::InvalidPolyRadius(self.poly_radius));
        }
        let background = parse_color(&self.background_color)
            .ok_or_else(|| ConfigError::BadColor(self.background_color.clone()))?;

        let valid_keys = self
            .choices
            .iter()
            .map(|k| CharOrCode::from_spec(k).map(|c| c.key_code()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(ConfigError::Choices)?;
        let expected = self
            .correct_choice
            .as_ref()
            .filter(|spec| !spec.is_empty())
            .map(ExpectedAnswer::resolve)
            .transpose()
            .map_err(ConfigError::CorrectChoice)?;

        let roundness = per_object("corner_radius", &self.corner_radius, 0.0, 1.0)?;
        let border = per_object("border_thickness", &self.border_thickness, 0.0, f64::INFINITY)?;
        let color = per_object("object_color", &self.object_color, 0.0, 1.0)?;
        let direction = per_object(
            "lines_direction",
            &self.lines_direction,
            f64::MIN,
            f64::MAX,
        )?;

        let objects = (0..OBJECT_COUNT)
            .map(|i| ObjectParams {
                roundness: roundness[i],
                border_thickness: border[i],
                color: color[i],
                line_direction: direction[i],
            })
            .collect();

        Ok(ValidatedTrial {
            duration: Duration::from_millis(self.trial_duration),
            config: self,
            valid_keys,
            expected,
            background,
            objects,
        })
    }
}

fn per_object<'a>(
    field: &'static str,
    values: &'a Option<Vec<f64>>,
    min: f64,
    max: f64,
) -> Result<&'a [f64], ConfigError> {
    let values = values.as_deref().ok_or(ConfigError::MissingArray(field))?;
    if values.len() != OBJECT_COUNT {
        return Err(ConfigError::LengthMismatch {
            field,
            expected: OBJECT_COUNT,
            actual: values.len(),
        });
    }
    // NaN fails the range test as well
    if let Some((index, &value)) = values
        .iter()
        .enumerate()
        .find(|(_, v)| !(min..=max).contains(*v))
    {
        return Err(ConfigError::OutOfRange {
            field,
            index,
            value,
            min,
            max,
        });
    }
    Ok(values)
}
