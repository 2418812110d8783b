use crate::{Result, constants::CREDENTIAL_LENGTH, error::Error};
use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;

/// Fixed-length credential made of raw keypad codes.
///
/// Exactly one credential is authoritative at a time; it lives in the Access
/// node's persistent store. Symbols are whatever codes the keypad produces,
/// no alphabet check is applied.
///
/// # Security
/// The credential travels and is stored in clear. `Debug` masks the symbols
/// so they never end up in logs.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Credential([u8; CREDENTIAL_LENGTH]);

impl Credential {
    /// Create a credential from exactly `CREDENTIAL_LENGTH` symbols.
    #[must_use]
    pub const fn new(symbols: [u8; CREDENTIAL_LENGTH]) -> Self {
        Credential(symbols)
    }

    /// Create a credential from a slice.
    ///
    /// # Errors
    /// Returns `Error::InvalidCredentialLength` if the slice does not hold
    /// exactly `CREDENTIAL_LENGTH` symbols.
    pub fn from_slice(symbols: &[u8]) -> Result<Self> {
        let symbols: [u8; CREDENTIAL_LENGTH] =
            symbols
                .try_into()
                .map_err(|_| Error::InvalidCredentialLength {
                    expected: CREDENTIAL_LENGTH,
                    actual: symbols.len(),
                })?;
        Ok(Credential(symbols))
    }

    /// Symbols in entry order.
    #[must_use]
    pub fn symbols(&self) -> &[u8; CREDENTIAL_LENGTH] {
        &self.0
    }

    /// Compare against another credential using the given strategy.
    ///
    /// # Examples
    ///
    /// ```
    /// use doorlock_core::{CompareMode, Credential};
    ///
    /// let stored = Credential::new(*b"12345");
    /// assert!(stored.matches(&Credential::new(*b"12345"), CompareMode::EarlyExit));
    /// assert!(!stored.matches(&Credential::new(*b"12344"), CompareMode::ConstantTime));
    /// ```
    #[must_use]
    pub fn matches(&self, other: &Credential, mode: CompareMode) -> bool {
        mode.compare(&self.0, &other.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential({})", "*".repeat(CREDENTIAL_LENGTH))
    }
}

impl From<[u8; CREDENTIAL_LENGTH]> for Credential {
    fn from(symbols: [u8; CREDENTIAL_LENGTH]) -> Self {
        Credential(symbols)
    }
}

impl TryFrom<&[u8]> for Credential {
    type Error = Error;

    fn try_from(symbols: &[u8]) -> Result<Self> {
        Credential::from_slice(symbols)
    }
}

/// Strategy used when comparing two credentials.
///
/// `EarlyExit` stops at the first differing symbol, which is what the
/// reference firmware does. It leaks the position of the first wrong symbol
/// through response timing. `ConstantTime` always inspects every symbol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareMode {
    #[default]
    EarlyExit,
    ConstantTime,
}

impl CompareMode {
    /// Compare two symbol sequences. Sequences of different length never match.
    #[must_use]
    pub fn compare(self, a: &[u8], b: &[u8]) -> bool {
        if a.len() != b.len() {
            return false;
        }
        match self {
            CompareMode::EarlyExit => a.iter().zip(b).all(|(x, y)| x == y),
            CompareMode::ConstantTime => a.ct_eq(b).into(),
        }
    }
}

/// Physical phase of the door.
///
/// The phases form a strict cycle with no branches:
/// `Locked → Unlocking → Held → Locking → Locked`. A new cycle only starts
/// after a successful door-open authentication.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorPhase {
    #[default]
    Locked,
    Unlocking,
    Held,
    Locking,
}

impl DoorPhase {
    /// The only phase this one may move to.
    #[must_use]
    pub fn next(self) -> DoorPhase {
        match self {
            DoorPhase::Locked => DoorPhase::Unlocking,
            DoorPhase::Unlocking => DoorPhase::Held,
            DoorPhase::Held => DoorPhase::Locking,
            DoorPhase::Locking => DoorPhase::Locked,
        }
    }

    /// Check if moving to `target` respects the cycle.
    ///
    /// ```
    /// use doorlock_core::DoorPhase;
    ///
    /// assert!(DoorPhase::Locked.can_transition_to(DoorPhase::Unlocking));
    /// assert!(!DoorPhase::Locked.can_transition_to(DoorPhase::Held));
    /// ```
    #[must_use]
    pub fn can_transition_to(self, target: DoorPhase) -> bool {
        self.next() == target
    }
}

impl fmt::Display for DoorPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase_str = match self {
            DoorPhase::Locked => "Locked",
            DoorPhase::Unlocking => "Unlocking",
            DoorPhase::Held => "Held",
            DoorPhase::Locking => "Locking",
        };
        write!(f, "{phase_str}")
    }
}

/// Result of recording a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialOutcome {
    /// The user may try again.
    Retry { remaining: u8 },
    /// The trial limit was reached and the counter has been reset.
    LockedOut,
}

/// Consecutive failed attempts within one authentication session.
///
/// The count always stays in `[0, max)`: reaching the limit reports
/// [`TrialOutcome::LockedOut`] and starts over from zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialCounter {
    count: u8,
    max: u8,
}

impl TrialCounter {
    /// Create a counter that locks out after `max` failures. A `max` of zero
    /// is treated as one.
    #[must_use]
    pub fn new(max: u8) -> Self {
        Self {
            count: 0,
            max: max.max(1),
        }
    }

    #[must_use]
    pub fn count(&self) -> u8 {
        self.count
    }

    #[must_use]
    pub fn max(&self) -> u8 {
        self.max
    }

    /// Record one failed attempt.
    pub fn record_failure(&mut self) -> TrialOutcome {
        self.count += 1;
        if self.count >= self.max {
            self.count = 0;
            TrialOutcome::LockedOut
        } else {
            TrialOutcome::Retry {
                remaining: self.max - self.count,
            }
        }
    }

    /// Forget all failures (successful authentication).
    pub fn reset(&mut self) {
        self.count = 0;
    }
}

impl Default for TrialCounter {
    fn default() -> Self {
        Self::new(crate::constants::MAX_TRIALS)
    }
}
