//! Authentication session context.
//!
//! One session exists per invocation of an authentication flow. It owns the
//! trial counter, so failures never leak from one flow into the next and
//! nothing about them is persisted.

use std::fmt;

use doorlock_core::{TrialCounter, TrialOutcome};
use doorlock_protocol::AuthPurpose;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How an authentication flow ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthOutcome {
    /// The credential matched and the continuation ran.
    Granted,
    /// The trial limit was reached and the alarm ran.
    LockedOut,
}

impl fmt::Display for AuthOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthOutcome::Granted => write!(f, "granted"),
            AuthOutcome::LockedOut => write!(f, "locked-out"),
        }
    }
}

/// State of one authentication flow.
#[derive(Debug, Clone)]
pub struct AuthSession {
    id: Uuid,
    purpose: AuthPurpose,
    trials: TrialCounter,
    attempts: u32,
}

impl AuthSession {
    /// Open a session with a zeroed trial counter.
    pub fn new(purpose: AuthPurpose, max_trials: u8) -> Self {
        Self {
            id: Uuid::new_v4(),
            purpose,
            trials: TrialCounter::new(max_trials),
            attempts: 0,
        }
    }

    /// Log correlation id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn purpose(&self) -> AuthPurpose {
        self.purpose
    }

    pub fn trials(&self) -> &TrialCounter {
        &self.trials
    }

    /// Credentials submitted so far, successful or not.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Count a matching attempt and clear the failures.
    pub fn record_match(&mut self) {
        self.attempts += 1;
        self.trials.reset();
    }

    /// Count a failed attempt.
    pub fn record_mismatch(&mut self) -> TrialOutcome {
        self.attempts += 1;
        self.trials.record_failure()
    }
}
