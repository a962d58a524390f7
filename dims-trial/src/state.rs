use crate::config::ValidatedTrial;
use crate::display::Display;
use crate::error::TrialError;
use crate::layout;
use crate::result::TrialResult;
use dims_core::{KeyResponse, TrialState, score};
use dims_timing::{CancellationToken, Deadline, ResponseListener, Timer};
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialEvent {
    /// A key went down; browser key-code space.
    KeyPressed(u32),
    /// The host woke up, possibly because the deadline is due.
    Tick,
}

/// Runs one trial: draws the stimulus, races the response listener against
/// the deadline and reports the outcome exactly once.
pub struct TrialController<D: Display, T: Timer> {
    trial: ValidatedTrial,
    timer: T,
    display: Option<D>,
    state: TrialState,
    token: CancellationToken,
    listener: Option<ResponseListener>,
    deadline: Option<Deadline>,
    started_ns: u64,
    canvas: (u32, u32),
    response: Option<KeyResponse>,
}

impl<D: Display, T: Timer> TrialController<D, T> {
    pub fn new(trial: ValidatedTrial, display: D, timer: T) -> Self {
        Self {
            trial,
            timer,
            display: Some(display),
            state: TrialState::Presenting,
            token: CancellationToken::new(),
            listener: None,
            deadline: None,
            started_ns: 0,
            canvas: (0, 0),
            response: None,
        }
    }

    /// Draws the stimulus and arms the listener and the deadline.
    ///
    /// On a failed draw the display is released and the trial ends without
    /// a result.
    pub fn start(&mut self) -> Result<(), TrialError> {
        if self.state != TrialState::Presenting {
            return Err(TrialError::AlreadyStarted);
        }
        let display = self.display.as_mut().ok_or(TrialError::SurfaceUnavailable)?;

        let (width, height) = display.viewport();
        let canvas = layout::canvas_size((width, height))
            .ok_or(TrialError::ViewportTooSmall { width, height })?;
        let frame = layout::build_frame(&self.trial, canvas)?;

        if let Err(e) = display.draw(&frame) {
            self.teardown();
            return Err(TrialError::Display(e));
        }
        self.canvas = canvas;

        self.started_ns = self.timer.now();
        if !self.trial.valid_keys.is_empty() {
            self.listener = Some(ResponseListener::arm(
                &self.token,
                self.trial.valid_keys.iter().copied(),
            ));
        }
        self.deadline = Some(Deadline::arm(
            &self.token,
            self.started_ns,
            self.trial.duration,
        ));
        self.state = TrialState::AwaitingResponse;

        info!(
            canvas_width = canvas.0,
            canvas_height = canvas.1,
            keys = ?self.trial.valid_keys,
            duration_ms = self.trial.config.trial_duration,
            "trial started"
        );
        Ok(())
    }

    pub fn handle_event(&mut self, event: TrialEvent) -> Option<TrialResult> {
        match event {
            TrialEvent::KeyPressed(key) => self.handle_key(key),
            TrialEvent::Tick => self.poll(),
        }
    }

    /// Feeds a key press. Returns the result if the press ended the trial.
    ///
    /// A deadline that is already due wins over the key.
    pub fn handle_key(&mut self, key: u32) -> Option<TrialResult> {
        if self.state != TrialState::AwaitingResponse {
            if self.state == TrialState::Resolved {
                warn!(key, "key ignored after resolution");
            }
            return None;
        }
        if let Some(result) = self.poll() {
            return Some(result);
        }

        let accepted = self.listener.as_mut().is_some_and(|l| l.accept(key));
        if !accepted {
            debug!(key, "key ignored");
            return None;
        }

        let rt_ms = self.timer.elapsed_ms(self.started_ns);
        self.response = Some(KeyResponse { key, rt_ms });
        info!(key, rt_ms, "response recorded");

        if self.trial.config.response_ends_trial {
            self.token.cancel();
            return Some(self.resolve());
        }
        None
    }

    /// Resolves the trial if the deadline has passed.
    pub fn poll(&mut self) -> Option<TrialResult> {
        if self.state != TrialState::AwaitingResponse {
            return None;
        }
        let now = self.timer.now();
        let fired = self.deadline.as_ref().is_some_and(|d| d.fire(now));
        if fired {
            debug!(now_ns = now, "deadline reached");
            Some(self.resolve())
        } else {
            None
        }
    }

    /// Time until the deadline is due, while it is armed.
    pub fn next_wakeup(&self) -> Option<Duration> {
        if self.state != TrialState::AwaitingResponse {
            return None;
        }
        self.deadline
            .as_ref()
            .and_then(|d| d.remaining(self.timer.now()))
    }

    /// Deadline timestamp on the controller's timer, while armed.
    pub fn deadline_ns(&self) -> Option<u64> {
        self.deadline
            .as_ref()
            .filter(|d| d.is_armed())
            .map(Deadline::due_ns)
    }

    pub fn state(&self) -> TrialState {
        self.state
    }

    pub fn response(&self) -> Option<KeyResponse> {
        self.response
    }

    pub fn display(&self) -> Option<&D> {
        self.display.as_ref()
    }

    pub fn display_mut(&mut self) -> Option<&mut D> {
        self.display.as_mut()
    }

    /// Canvas size used for the stimulus; zero before `start`.
    pub fn canvas(&self) -> (u32, u32) {
        self.canvas
    }

    fn resolve(&mut self) -> TrialResult {
        self.teardown();
        let correct = score(
            self.trial.expected.as_ref(),
            self.response.map(|r| r.key),
        );
        let result = TrialResult::new(&self.trial, self.response, correct, self.canvas);
        info!(
            rt = ?result.rt,
            key = ?result.key_press,
            correct = ?result.correct,
            "trial resolved"
        );
        result
    }

    /// Disarms both triggers and releases the display, together.
    fn teardown(&mut self) {
        self.token.cancel();
        self.listener = None;
        self.deadline = None;
        self.display = None;
        self.state = TrialState::Resolved;
    }
}
