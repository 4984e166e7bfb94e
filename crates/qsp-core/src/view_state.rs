//! Request lifecycle state machine behind the analysis view.
//!
//! The machine is synchronous and owns every piece of view state: the phase,
//! the input field, the last submitted text and the suggestion list flag.
//! Responses are tagged with the [`RequestToken`] handed out when the request
//! was dispatched; only the token of the most recent dispatch may resolve
//! `Loading`, so overlapping or abandoned calls can never overwrite newer state.

use crate::error::{AnalysisError, FailureClass};
use crate::locale::Locale;
use crate::types::AnalysisResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Identifies one dispatched analysis request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Idle,
    Loading {
        token: RequestToken,
    },
    Success(Box<AnalysisResult>),
    Error {
        message: String,
        class: FailureClass,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ViewPhase {
    Idle,
    Loading,
    Success,
    Error,
}

impl ViewState {
    pub fn phase(&self) -> ViewPhase {
        match self {
            ViewState::Idle => ViewPhase::Idle,
            ViewState::Loading { .. } => ViewPhase::Loading,
            ViewState::Success(_) => ViewPhase::Success,
            ViewState::Error { .. } => ViewPhase::Error,
        }
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            ViewState::Success(result) => Some(result),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            ViewState::Error { message, .. } => Some(message),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ViewEvent {
    /// Submit text for analysis (form submit, suggestion pick, demo button).
    Submit(String),
    Succeeded {
        token: RequestToken,
        result: Box<AnalysisResult>,
    },
    Failed {
        token: RequestToken,
        error: AnalysisError,
    },
    /// Replay the last submitted text after a failure.
    Retry,
    /// Home action: back to `Idle` with everything cleared.
    Reset,
    InputChanged(String),
    ClearInput,
}

/// Work the caller must perform after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Issue exactly one analysis request for `text`, reporting back with `token`.
    Dispatch { token: RequestToken, text: String },
    /// A result just became visible.
    RevealResult,
}

#[derive(Debug)]
pub struct ViewStateMachine {
    state: ViewState,
    input: String,
    last_submitted: Option<String>,
    suggestions_open: bool,
    next_token: u64,
    locale: Locale,
}

impl Default for ViewStateMachine {
    fn default() -> Self {
        Self::new(Locale::default())
    }
}

impl ViewStateMachine {
    pub fn new(locale: Locale) -> Self {
        Self {
            state: ViewState::Idle,
            input: String::new(),
            last_submitted: None,
            suggestions_open: false,
            next_token: 0,
            locale,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn phase(&self) -> ViewPhase {
        self.state.phase()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn last_submitted(&self) -> Option<&str> {
        self.last_submitted.as_deref()
    }

    pub fn suggestions_open(&self) -> bool {
        self.suggestions_open
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Whether the submit control is enabled for the current input.
    pub fn can_submit(&self) -> bool {
        self.phase() != ViewPhase::Loading && !self.input.trim().is_empty()
    }

    /// Apply one event and return the effect the caller has to carry out.
    pub fn apply(&mut self, event: ViewEvent) -> Option<Effect> {
        match event {
            ViewEvent::Submit(text) => self.submit(text),
            ViewEvent::Succeeded { token, result } => {
                if !self.is_current(token) {
                    debug!(%token, "discarding stale analysis result");
                    return None;
                }
                debug!(%token, title = %result.title, "analysis succeeded");
                self.state = ViewState::Success(result);
                Some(Effect::RevealResult)
            }
            ViewEvent::Failed { token, error } => {
                if !self.is_current(token) {
                    debug!(%token, kind = ?error.kind(), "discarding stale analysis failure");
                    return None;
                }
                let class = error.failure_class();
                debug!(%token, kind = ?error.kind(), ?class, "analysis failed: {}", error);
                self.state = ViewState::Error {
                    message: self.locale.failure_message(class).to_string(),
                    class,
                };
                None
            }
            ViewEvent::Retry => {
                if self.phase() != ViewPhase::Error {
                    return None;
                }
                let text = self.last_submitted.clone()?;
                let token = self.issue_token();
                debug!(%token, "retrying last submission");
                self.state = ViewState::Loading { token };
                Some(Effect::Dispatch { token, text })
            }
            ViewEvent::Reset => {
                self.state = ViewState::Idle;
                self.input.clear();
                self.suggestions_open = false;
                None
            }
            ViewEvent::InputChanged(text) => {
                self.input = text;
                self.suggestions_open = true;
                None
            }
            ViewEvent::ClearInput => {
                self.input.clear();
                self.suggestions_open = false;
                None
            }
        }
    }

    fn submit(&mut self, text: String) -> Option<Effect> {
        if text.trim().is_empty() {
            return None;
        }
        let token = self.issue_token();
        if let ViewState::Loading { token: previous } = self.state {
            debug!(%previous, %token, "superseding in-flight request");
        }
        self.input = text.clone();
        self.last_submitted = Some(text.clone());
        self.suggestions_open = false;
        self.state = ViewState::Loading { token };
        Some(Effect::Dispatch { token, text })
    }

    fn issue_token(&mut self) -> RequestToken {
        self.next_token += 1;
        RequestToken(self.next_token)
    }

    fn is_current(&self, token: RequestToken) -> bool {
        matches!(self.state, ViewState::Loading { token: current } if current == token)
    }
}
