use serde::{Deserialize, Serialize};

/// Lifecycle of a single trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrialState {
    /// Initial frame is being drawn.
    #[default]
    Presenting,
    /// Listener and deadline armed; waiting for a key or the timeout.
    AwaitingResponse,
    Resolved,
}

/// First qualifying key press of a trial.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyResponse {
    pub key: u32,
    /// Milliseconds from trial start.
    pub rt_ms: f64,
}
