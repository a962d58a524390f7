use crate::config::ValidatedTrial;
use dims_core::{AnswerSpec, KeyResponse, KeySpec};
use serde::{Deserialize, Serialize};

/// Record handed to the host once a trial resolves. A trial without a
/// response reports `-1` for both `rt` and `key_press`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    /// Milliseconds from the first frame to the response.
    #[serde(with = "rt_sentinel")]
    pub rt: Option<f64>,
    #[serde(with = "key_sentinel")]
    pub key_press: Option<u32>,
    /// Absent when the trial is not scored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct: Option<bool>,
    pub choices: Vec<KeySpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_choice: Option<AnswerSpec>,
    pub trial_duration: u64,
    pub response_ends_trial: bool,
    pub lines_direction: Vec<f64>,
    pub background_color: String,
    pub corner_radius: Vec<f64>,
    pub border_thickness: Vec<f64>,
    pub object_color: Vec<f64>,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub task: String,
}

impl TrialResult {
    pub fn new(
        trial: &ValidatedTrial,
        response: Option<KeyResponse>,
        correct: Option<bool>,
        (canvas_width, canvas_height): (u32, u32),
    ) -> Self {
        let cfg = &trial.config;
        let echo = |v: &Option<Vec<f64>>| v.clone().unwrap_or_default();
        Self {
            rt: response.map(|r| r.rt_ms),
            key_press: response.map(|r| r.key),
            correct,
            choices: cfg.choices.clone(),
            correct_choice: cfg.correct_choice.clone(),
            trial_duration: cfg.trial_duration,
            response_ends_trial: cfg.response_ends_trial,
            lines_direction: echo(&cfg.lines_direction),
            background_color: cfg.background_color.clone(),
            corner_radius: echo(&cfg.corner_radius),
            border_thickness: echo(&cfg.border_thickness),
            object_color: echo(&cfg.object_color),
            canvas_width,
            canvas_height,
            task: cfg.task_name.clone(),
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

mod rt_sentinel {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(rt: &Option<f64>, s: S) -> Result<S::Ok, S::Error> {
        match rt {
            Some(ms) => s.serialize_f64(*ms),
            None => s.serialize_i64(-1),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        let ms = f64::deserialize(d)?;
        Ok((ms >= 0.0).then_some(ms))
    }
}

mod key_sentinel {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(key: &Option<u32>, s: S) -> Result<S::Ok, S::Error> {
        match key {
            Some(code) => s.serialize_u32(*code),
            None => s.serialize_i64(-1),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
        let code = i64::deserialize(d)?;
        Ok(u32::try_from(code).ok())
    }
}
