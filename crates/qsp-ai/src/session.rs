//! Drives a [`ViewStateMachine`] with real analysis requests.

use crate::gateway::AnalysisGateway;
use parking_lot::Mutex;
use qsp_core::{Effect, Locale, ViewEvent, ViewState, ViewStateMachine};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Shared handle over one view. Cloning is cheap; every clone sees the same
/// state.
#[derive(Clone)]
pub struct AnalysisSession {
    gateway: Arc<AnalysisGateway>,
    machine: Arc<Mutex<ViewStateMachine>>,
}

impl AnalysisSession {
    pub fn new(gateway: Arc<AnalysisGateway>, locale: Locale) -> Self {
        Self {
            gateway,
            machine: Arc::new(Mutex::new(ViewStateMachine::new(locale))),
        }
    }

    /// Submit text. Returns the spawned request, or `None` when the input
    /// was blank and nothing was issued.
    pub fn submit(&self, text: impl Into<String>) -> Option<JoinHandle<()>> {
        self.dispatch(ViewEvent::Submit(text.into()))
    }

    /// Re-issue the last submitted text. Only acts from the error state.
    pub fn retry(&self) -> Option<JoinHandle<()>> {
        self.dispatch(ViewEvent::Retry)
    }

    /// Back to idle. A request still in flight can no longer change the view.
    pub fn reset(&self) {
        self.machine.lock().apply(ViewEvent::Reset);
    }

    pub fn input_changed(&self, text: impl Into<String>) {
        self.machine.lock().apply(ViewEvent::InputChanged(text.into()));
    }

    pub fn clear_input(&self) {
        self.machine.lock().apply(ViewEvent::ClearInput);
    }

    pub fn snapshot(&self) -> ViewState {
        self.machine.lock().state().clone()
    }

    pub fn last_submitted(&self) -> Option<String> {
        self.machine.lock().last_submitted().map(str::to_string)
    }

    pub fn locale(&self) -> Locale {
        self.machine.lock().locale()
    }

    fn dispatch(&self, event: ViewEvent) -> Option<JoinHandle<()>> {
        // the lock is released before the request is spawned
        let effect = self.machine.lock().apply(event);
        let Some(Effect::Dispatch { token, text }) = effect else {
            return None;
        };

        let gateway = Arc::clone(&self.gateway);
        let machine = Arc::clone(&self.machine);
        debug!(%token, "dispatching analysis request");

        Some(tokio::spawn(async move {
            let event = match gateway.request_analysis(&text).await {
                Ok(result) => ViewEvent::Succeeded {
                    token,
                    result: Box::new(result),
                },
                Err(error) => ViewEvent::Failed { token, error },
            };
            machine.lock().apply(event);
        }))
    }
}
