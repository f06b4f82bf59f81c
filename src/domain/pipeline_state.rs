//! Lifecycle of one pipeline run.

use std::fmt;

use serde::Serialize;

use crate::domain::{DomainError, DomainResult};

/// `idle → loading → preparing → training → evaluating → done`,
/// with `error` reachable from every running stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineState {
    #[default]
    Idle,
    Loading,
    Preparing,
    Training,
    Evaluating,
    Done,
    Error,
}

impl PipelineState {
    pub fn as_str(self) -> &'static str {
        match self {
            PipelineState::Idle => "idle",
            PipelineState::Loading => "loading",
            PipelineState::Preparing => "preparing",
            PipelineState::Training => "training",
            PipelineState::Evaluating => "evaluating",
            PipelineState::Done => "done",
            PipelineState::Error => "error",
        }
    }

    /// True while a stage is in flight.
    pub fn is_running(self) -> bool {
        matches!(
            self,
            PipelineState::Loading
                | PipelineState::Preparing
                | PipelineState::Training
                | PipelineState::Evaluating
        )
    }

    /// True for `done` and `error`; only a reset leaves these.
    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Error)
    }

    /// The next state in the happy path, if any.
    pub fn successor(self) -> Option<PipelineState> {
        match self {
            PipelineState::Idle => Some(PipelineState::Loading),
            PipelineState::Loading => Some(PipelineState::Preparing),
            PipelineState::Preparing => Some(PipelineState::Training),
            PipelineState::Training => Some(PipelineState::Evaluating),
            PipelineState::Evaluating => Some(PipelineState::Done),
            PipelineState::Done | PipelineState::Error => None,
        }
    }

    /// Move to `to`, rejecting anything outside the state machine.
    pub fn transition(self, to: PipelineState) -> DomainResult<PipelineState> {
        let allowed = match to {
            PipelineState::Error => self.is_running(),
            PipelineState::Idle => self.is_terminal() || self == PipelineState::Idle,
            _ => self.successor() == Some(to),
        };
        if allowed {
            Ok(to)
        } else {
            Err(DomainError::IllegalTransition { from: self, to })
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_idle_when_walking_happy_path_then_reaches_done() {
        let mut state = PipelineState::Idle;
        while let Some(next) = state.successor() {
            state = state.transition(next).unwrap();
        }
        assert_eq!(state, PipelineState::Done);
    }

    #[test]
    fn given_running_stage_when_failing_then_enters_error() {
        for state in [
            PipelineState::Loading,
            PipelineState::Preparing,
            PipelineState::Training,
            PipelineState::Evaluating,
        ] {
            assert_eq!(
                state.transition(PipelineState::Error).unwrap(),
                PipelineState::Error
            );
        }
    }

    #[test]
    fn given_error_when_advancing_then_rejected_until_reset() {
        let err = PipelineState::Error
            .transition(PipelineState::Loading)
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::IllegalTransition {
                from: PipelineState::Error,
                to: PipelineState::Loading
            }
        );
        assert_eq!(
            PipelineState::Error.transition(PipelineState::Idle).unwrap(),
            PipelineState::Idle
        );
    }

    #[test]
    fn given_idle_when_skipping_stage_then_rejected() {
        assert!(PipelineState::Idle
            .transition(PipelineState::Training)
            .is_err());
        assert!(PipelineState::Idle.transition(PipelineState::Error).is_err());
    }
}
