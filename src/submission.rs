//! Score submission and login collaborators
//!
//! The engine hands the final score to a `ScoreSubmitter` once per session,
//! together with a `SubmissionReply`. The collaborator resolves the reply
//! whenever its remote call completes; until then the game-end screen shows
//! a pending state. Nothing here blocks and nothing is retried.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::SubmitError;

/// What the remote side said about a submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOutcome {
    pub success: bool,
    pub message: String,
    /// Offer a login prompt on the game-end screen
    #[serde(default, alias = "showLoginButton")]
    pub prompt_login: bool,
}

impl SubmitOutcome {
    pub fn accepted(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            prompt_login: false,
        }
    }

    /// Advisory outcome shown when the collaborator itself failed
    pub fn from_error(err: &SubmitError) -> Self {
        log::warn!("{err}");
        Self {
            success: false,
            message: "Failed to submit score. Please try again later.".to_string(),
            prompt_login: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SubmissionStatus {
    NotSubmitted,
    Pending { score: u64 },
    Resolved(SubmitOutcome),
}

/// One-shot completion slot for a submission
///
/// Consumed by `resolve`. A reply from an earlier session writes into a
/// slot the engine no longer reads.
#[derive(Debug)]
pub struct SubmissionReply {
    slot: Rc<RefCell<SubmissionStatus>>,
}

impl SubmissionReply {
    pub fn resolve(self, result: Result<SubmitOutcome, SubmitError>) {
        let outcome = result.unwrap_or_else(|err| SubmitOutcome::from_error(&err));
        log::info!(
            "Score submission resolved: success={} message={:?}",
            outcome.success,
            outcome.message
        );
        *self.slot.borrow_mut() = SubmissionStatus::Resolved(outcome);
    }
}

/// Per-session submission bookkeeping owned by the engine
#[derive(Debug)]
pub struct SubmissionTracker {
    slot: Rc<RefCell<SubmissionStatus>>,
}

impl Default for SubmissionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmissionTracker {
    pub fn new() -> Self {
        Self {
            slot: Rc::new(RefCell::new(SubmissionStatus::NotSubmitted)),
        }
    }

    /// Mark the session as submitted. Returns `None` if it already was.
    pub fn begin(&mut self, score: u64) -> Option<SubmissionReply> {
        let mut status = self.slot.borrow_mut();
        if *status != SubmissionStatus::NotSubmitted {
            return None;
        }
        *status = SubmissionStatus::Pending { score };
        Some(SubmissionReply {
            slot: Rc::clone(&self.slot),
        })
    }

    pub fn status(&self) -> SubmissionStatus {
        self.slot.borrow().clone()
    }

    pub fn is_submitted(&self) -> bool {
        !matches!(*self.slot.borrow(), SubmissionStatus::NotSubmitted)
    }

    /// Detach from any outstanding reply and start over
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

pub trait ScoreSubmitter {
    fn submit_score(&mut self, final_score: u64, reply: SubmissionReply);
}

impl<F> ScoreSubmitter for F
where
    F: FnMut(u64, SubmissionReply),
{
    fn submit_score(&mut self, final_score: u64, reply: SubmissionReply) {
        self(final_score, reply)
    }
}

pub trait LoginRequester {
    fn request_login(&mut self);
}

impl<F> LoginRequester for F
where
    F: FnMut(),
{
    fn request_login(&mut self) {
        self()
    }
}
