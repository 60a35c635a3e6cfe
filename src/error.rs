//! Error types surfaced by the engine and its collaborators

use std::fmt;

use crate::sim::GamePhase;

/// Lifecycle action requested by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start,
    AdvanceRound,
    RequestLogin,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::AdvanceRound => write!(f, "advance round"),
            Self::RequestLogin => write!(f, "request login"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The action is not valid from the current phase
    InvalidTransition { from: GamePhase, action: Action },
    /// A round start was requested while another one was still being set up
    RoundStartInProgress { round: u32 },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTransition { from, action } => {
                write!(f, "cannot {action} from phase {from:?}")
            }
            Self::RoundStartInProgress { round } => {
                write!(f, "round {round} start already in progress")
            }
        }
    }
}

impl std::error::Error for EngineError {}

/// Failure reported by a drawing surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// Surface is gone (canvas detached, context lost)
    SurfaceLost,
    /// Backend rejected a draw call
    Backend(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SurfaceLost => write!(f, "drawing surface lost"),
            Self::Backend(msg) => write!(f, "draw call failed: {msg}"),
        }
    }
}

impl std::error::Error for RenderError {}

/// Failure reported by the score submission collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// Remote call failed
    Transport(String),
    /// Collaborator returned something the engine could not interpret
    MalformedResponse(String),
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(msg) => write!(f, "score submission failed: {msg}"),
            Self::MalformedResponse(msg) => write!(f, "malformed submission response: {msg}"),
        }
    }
}

impl std::error::Error for SubmitError {}

#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "settings i/o error: {err}"),
            Self::Json(err) => write!(f, "settings parse error: {err}"),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for SettingsError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_message() {
        let err = EngineError::InvalidTransition {
            from: GamePhase::Playing,
            action: Action::Start,
        };
        assert_eq!(err.to_string(), "cannot start from phase Playing");
    }

    #[test]
    fn test_settings_error_source() {
        use std::error::Error;
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err = SettingsError::from(json_err);
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("settings parse error"));
    }
}
