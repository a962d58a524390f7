use serde::{Deserialize, Serialize};
use std::iter;
use thiserror::Error;

/// Key as written in a trial configuration: a numeric key code or a
/// one-character string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeySpec {
    Code(u32),
    Text(String),
}

/// A resolved key identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CharOrCode {
    Code(u32),
    Char(char),
}

impl CharOrCode {
    /// Resolves a configured key; strings must hold exactly one character.
    pub fn from_spec(spec: &KeySpec) -> Result<Self, AnswerSpecError> {
        match spec {
            KeySpec::Code(code) => Ok(CharOrCode::Code(*code)),
            KeySpec::Text(text) => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(CharOrCode::Char(c)),
                    _ => Err(AnswerSpecError::NotOneCharacter(text.clone())),
                }
            }
        }
    }

    /// Key code a press of this key produces. Characters map to the code of
    /// their upper-case form.
    pub fn key_code(&self) -> u32 {
        match *self {
            CharOrCode::Code(code) => code,
            CharOrCode::Char(c) => c.to_uppercase().next().unwrap_or(c) as u32,
        }
    }

    /// Whether a press with `code` selects this key. Characters compare
    /// case-insensitively against the character whose code was pressed.
    pub fn matches(&self, code: u32) -> bool {
        match *self {
            CharOrCode::Code(expected) => code == expected,
            CharOrCode::Char(expected) => char::from_u32(code)
                .is_some_and(|pressed| expected.to_uppercase().eq(iter::once(pressed))),
        }
    }

    fn is_char(&self) -> bool {
        matches!(self, CharOrCode::Char(_))
    }
}

/// Expected answer of a scored trial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExpectedAnswer {
    Single(CharOrCode),
    /// Homogeneous list: all characters or all codes.
    Multiple(Vec<CharOrCode>),
}

/// Why a configured key or expected answer was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnswerSpecError {
    #[error("key {0:?} must be a single character")]
    NotOneCharacter(String),

    #[error("cannot mix characters and key codes")]
    MixedKinds,
}

/// Configured form of [`ExpectedAnswer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerSpec {
    Single(KeySpec),
    Multiple(Vec<KeySpec>),
}

impl AnswerSpec {
    /// An empty list names no answer; such a trial is not scored.
    pub fn is_empty(&self) -> bool {
        matches!(self, AnswerSpec::Multiple(keys) if keys.is_empty())
    }
}

impl ExpectedAnswer {
    pub fn resolve(spec: &AnswerSpec) -> Result<Self, AnswerSpecError> {
        match spec {
            AnswerSpec::Single(k) => Ok(ExpectedAnswer::Single(CharOrCode::from_spec(k)?)),
            AnswerSpec::Multiple(keys) => {
                let keys = keys
                    .iter()
                    .map(CharOrCode::from_spec)
                    .collect::<Result<Vec<_>, _>>()?;
                if let Some(first) = keys.first() {
                    if keys.iter().any(|k| k.is_char() != first.is_char()) {
                        return Err(AnswerSpecError::MixedKinds);
                    }
                }
                Ok(ExpectedAnswer::Multiple(keys))
            }
        }
    }

    /// Whether `pressed` is a correct answer. A missing press never is.
    pub fn is_correct(&self, pressed: Option<u32>) -> bool {
        let Some(code) = pressed else {
            return false;
        };
        match self {
            ExpectedAnswer::Single(key) => key.matches(code),
            ExpectedAnswer::Multiple(keys) => keys.iter().any(|k| k.matches(code)),
        }
    }
}

/// Correctness of a response; `None` when the trial is not scored.
pub fn score(expected: Option<&ExpectedAnswer>, pressed: Option<u32>) -> Option<bool> {
    expected.map(|answer| answer.is_correct(pressed))
}
