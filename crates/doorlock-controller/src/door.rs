//! Door cycle state machine.
//!
//! Tracks the physical phase of the door on one node and refuses any move
//! that leaves the strict cycle `Locked → Unlocking → Held → Locking →
//! Locked`. Every accepted transition is kept in a bounded history with its
//! wall-clock time for diagnostics.
//!
//! # Examples
//!
//! ```
//! use doorlock_controller::DoorCycle;
//! use doorlock_core::DoorPhase;
//!
//! let mut door = DoorCycle::new();
//! door.transition_to(DoorPhase::Unlocking).unwrap();
//! assert!(door.transition_to(DoorPhase::Locked).is_err());
//! assert_eq!(door.phase(), DoorPhase::Unlocking);
//! ```

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use doorlock_core::{DoorPhase, Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Transitions kept in history. Four per door cycle.
const MAX_HISTORY_SIZE: usize = 64;

/// One accepted phase change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseTransition {
    pub from: DoorPhase,
    pub to: DoorPhase,
    pub at: DateTime<Utc>,
}

/// Phase tracker of one node's door.
#[derive(Debug, Clone)]
pub struct DoorCycle {
    phase: DoorPhase,
    history: VecDeque<PhaseTransition>,
    completed_cycles: u64,
}

impl DoorCycle {
    /// Start with the door locked.
    pub fn new() -> Self {
        Self {
            phase: DoorPhase::Locked,
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
            completed_cycles: 0,
        }
    }

    pub fn phase(&self) -> DoorPhase {
        self.phase
    }

    /// Whether the door is locked and idle.
    pub fn is_locked(&self) -> bool {
        self.phase == DoorPhase::Locked
    }

    /// Number of full cycles back to `Locked`.
    pub fn completed_cycles(&self) -> u64 {
        self.completed_cycles
    }

    /// Accepted transitions, oldest first.
    pub fn history(&self) -> &VecDeque<PhaseTransition> {
        &self.history
    }

    /// Move to `target`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidStateTransition` if `target` is not the next
    /// phase of the cycle. The current phase is left unchanged.
    pub fn transition_to(&mut self, target: DoorPhase) -> Result<PhaseTransition> {
        if !self.phase.can_transition_to(target) {
            return Err(Error::InvalidStateTransition {
                from: self.phase.to_string(),
                to: target.to_string(),
            });
        }

        let transition = PhaseTransition {
            from: self.phase,
            to: target,
            at: Utc::now(),
        };
        debug!(from = %transition.from, to = %transition.to, "door phase");

        if self.history.len() >= MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
        self.history.push_back(transition.clone());
        self.phase = target;
        if target == DoorPhase::Locked {
            self.completed_cycles += 1;
        }

        Ok(transition)
    }
}

impl Default for DoorCycle {
    fn default() -> Self {
        Self::new()
    }
}
