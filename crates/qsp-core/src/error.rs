use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of a single analysis request.
///
/// Providers raise the variant matching what actually went wrong; the kind is
/// never reconstructed later from the message text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("provider returned no text payload")]
    EmptyResponse,

    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("provider error{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    Provider {
        status: Option<u16>,
        message: String,
    },
}

/// Discriminant of [`AnalysisError`], handy for logging and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisErrorKind {
    EmptyResponse,
    MalformedResponse,
    Transport,
    Provider,
}

/// Which user-facing message a failure maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureClass {
    Network,
    Generic,
}

impl AnalysisError {
    pub fn kind(&self) -> AnalysisErrorKind {
        match self {
            AnalysisError::EmptyResponse => AnalysisErrorKind::EmptyResponse,
            AnalysisError::MalformedResponse(_) => AnalysisErrorKind::MalformedResponse,
            AnalysisError::Transport(_) => AnalysisErrorKind::Transport,
            AnalysisError::Provider { .. } => AnalysisErrorKind::Provider,
        }
    }

    /// Transport failures and upstream 5xx responses are reported as network
    /// problems; everything else gets the generic retry message.
    pub fn failure_class(&self) -> FailureClass {
        match self {
            AnalysisError::Transport(_) => FailureClass::Network,
            AnalysisError::Provider {
                status: Some(code), ..
            } if *code >= 500 => FailureClass::Network,
            _ => FailureClass::Generic,
        }
    }

    pub fn provider(status: Option<u16>, message: impl Into<String>) -> Self {
        AnalysisError::Provider {
            status,
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        AnalysisError::MalformedResponse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_and_server_errors_are_network_failures() {
        assert_eq!(
            AnalysisError::Transport("connection refused".into()).failure_class(),
            FailureClass::Network
        );
        assert_eq!(
            AnalysisError::provider(Some(503), "unavailable").failure_class(),
            FailureClass::Network
        );
    }

    #[test]
    fn other_failures_are_generic() {
        assert_eq!(
            AnalysisError::provider(Some(429), "quota").failure_class(),
            FailureClass::Generic
        );
        assert_eq!(
            AnalysisError::provider(None, "missing key").failure_class(),
            FailureClass::Generic
        );
        assert_eq!(
            AnalysisError::EmptyResponse.failure_class(),
            FailureClass::Generic
        );
        assert_eq!(
            AnalysisError::MalformedResponse("eof".into()).failure_class(),
            FailureClass::Generic
        );
    }

    #[test]
    fn provider_error_display_includes_status() {
        let err = AnalysisError::provider(Some(400), "bad request");
        assert_eq!(err.to_string(), "provider error (400): bad request");
        let err = AnalysisError::provider(None, "no key");
        assert_eq!(err.to_string(), "provider error: no key");
    }

    #[test]
    fn json_errors_become_malformed_responses() {
        let err: AnalysisError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), AnalysisErrorKind::MalformedResponse);
    }
}
