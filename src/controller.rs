//! Front-end view state and the submission controller
//!
//! The whole UI state is one [`ViewState`] record held in a `watch` channel.
//! Every transition replaces the record in a single step, so renderers never
//! see a result together with an error, and never see a request start without
//! the previous outcome cleared.

use crate::api::GenerationApi;
use crate::export;
use crate::models::GenerationRequest;
use crate::normalize::{resolve_image, InlineImage};
use crate::styles::Style;
use crate::{Error, Result};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::sync::watch;
use tracing::{info, warn};

pub const EMPTY_PROMPT_NOTICE: &str = "Please describe the art you want to create!";

/// Settled result of the last request. Result and error share one slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Outcome {
    #[default]
    Empty,
    Image(InlineImage),
    Error(String),
}

/// Where the controller is in its request cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Requesting,
    Succeeded,
    Failed,
}

/// What a renderer should show. Exactly one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View<'a> {
    Idle,
    Loading,
    Error(&'a str),
    Result(&'a InlineImage),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub style: &'static Style,
    pub prompt: String,
    pub is_generating: bool,
    pub outcome: Outcome,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            style: Style::default_style(),
            prompt: String::new(),
            is_generating: false,
            outcome: Outcome::Empty,
        }
    }
}

impl ViewState {
    pub fn current_result(&self) -> Option<&InlineImage> {
        match &self.outcome {
            Outcome::Image(image) => Some(image),
            _ => None,
        }
    }

    pub fn current_error(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn view(&self) -> View<'_> {
        if self.is_generating {
            return View::Loading;
        }
        match &self.outcome {
            Outcome::Error(message) => View::Error(message),
            Outcome::Image(image) => View::Result(image),
            Outcome::Empty => View::Idle,
        }
    }

    pub fn phase(&self) -> Phase {
        match (self.is_generating, &self.outcome) {
            (true, _) => Phase::Requesting,
            (false, Outcome::Image(_)) => Phase::Succeeded,
            (false, Outcome::Error(_)) => Phase::Failed,
            (false, Outcome::Empty) => Phase::Idle,
        }
    }

    /// Whether the submit action should be enabled.
    pub fn can_submit(&self) -> bool {
        !self.is_generating && !self.prompt.trim().is_empty()
    }

    fn with_style(&self, style: &'static Style) -> Self {
        Self {
            style,
            ..self.clone()
        }
    }

    fn with_prompt(&self, prompt: String) -> Self {
        Self {
            prompt,
            ..self.clone()
        }
    }

    fn requesting(&self) -> Self {
        Self {
            is_generating: true,
            outcome: Outcome::Empty,
            ..self.clone()
        }
    }

    fn settled(&self, outcome: Outcome) -> Self {
        Self {
            is_generating: false,
            outcome,
            ..self.clone()
        }
    }
}

/// Clears `is_generating` if the submission ends without settling, e.g. when
/// its future is dropped mid-request.
struct GeneratingGuard<'a> {
    state: &'a watch::Sender<ViewState>,
    armed: bool,
}

impl<'a> GeneratingGuard<'a> {
    fn arm(state: &'a watch::Sender<ViewState>) -> Self {
        Self { state, armed: true }
    }

    fn settle(mut self, outcome: Outcome) {
        self.armed = false;
        self.state
            .send_modify(|current| *current = current.settled(outcome));
    }
}

impl Drop for GeneratingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!("Generation ended without a result; clearing loading state");
            self.state.send_if_modified(|current| {
                if !current.is_generating {
                    return false;
                }
                *current = current.settled(Outcome::Empty);
                true
            });
        }
    }
}

pub struct Controller<A> {
    api: A,
    state: watch::Sender<ViewState>,
}

impl<A: GenerationApi> Controller<A> {
    pub fn new(api: A) -> Self {
        let (state, _) = watch::channel(ViewState::default());
        Self { api, state }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Receive a snapshot on every transition.
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> ViewState {
        self.state.borrow().clone()
    }

    /// Replace the state with `next(current)` when it returns a record.
    fn transition<F>(&self, next: F) -> bool
    where
        F: FnOnce(&ViewState) -> Option<ViewState>,
    {
        self.state.send_if_modified(|current| match next(current) {
            Some(next) => {
                *current = next;
                true
            }
            None => false,
        })
    }

    /// Select a catalog style. Never starts a request. Observers are only
    /// notified when the selection changes.
    pub fn select_style(&self, id: &str) -> Result<()> {
        let style = Style::find(id).ok_or_else(|| Error::UnknownStyle(id.to_string()))?;
        self.transition(|current| {
            (current.style != style).then(|| current.with_style(style))
        });
        Ok(())
    }

    /// Replace the prompt text. Unchanged text publishes nothing.
    pub fn set_prompt(&self, prompt: impl Into<String>) {
        let prompt = prompt.into();
        self.transition(|current| {
            (current.prompt != prompt).then(|| current.with_prompt(prompt))
        });
    }

    /// Validate and enter the requesting state in one step.
    fn begin(&self) -> Result<GenerationRequest> {
        let mut started = Err(Error::Busy);
        self.transition(|current| {
            if current.is_generating {
                return None;
            }
            let prompt = current.prompt.trim();
            if prompt.is_empty() {
                started = Err(Error::Validation(EMPTY_PROMPT_NOTICE.to_string()));
                return None;
            }
            started = Ok(GenerationRequest::new(prompt, current.style.id));
            Some(current.requesting())
        });
        started
    }

    /// Submit the current prompt and style.
    ///
    /// Returns `Err` only when the submission is rejected before any network
    /// call (empty prompt, request already running). Request failures land in
    /// the state as [`Outcome::Error`] and yield `Ok(Phase::Failed)`.
    pub async fn submit(&self) -> Result<Phase> {
        let request = self.begin().map_err(|e| {
            warn!("Submission rejected: {}", e);
            e
        })?;

        info!(
            "Requesting art in style '{}' ({} chars)",
            request.style,
            request.prompt.len()
        );
        let guard = GeneratingGuard::arm(&self.state);

        let resolved = match self.api.generate(&request).await {
            Ok(body) => resolve_image(&body),
            Err(e) => Err(e),
        };

        let (outcome, phase) = match resolved {
            Ok(image) => {
                info!("Image received ({} chars)", image.as_str().len());
                (Outcome::Image(image), Phase::Succeeded)
            }
            Err(e) => {
                warn!("Generation failed: {}", e);
                (Outcome::Error(e.to_string()), Phase::Failed)
            }
        };
        guard.settle(outcome);

        Ok(phase)
    }

    /// Save the current result under `dir`. `None` when there is none.
    pub fn export(&self, dir: &Path) -> Result<Option<PathBuf>> {
        let image = self.state.borrow().current_result().cloned();
        export::export_image(image.as_ref(), dir, Utc::now())
    }
}
