//! Single-byte protocol codes.
//!
//! Every message on the link is one byte with no payload. Codes fall into two
//! disjoint sets: *commands* start or advance an exchange, *statuses* report
//! an outcome. Credential symbols travel as raw bytes between them and are
//! not codes at all.

use std::fmt;

use doorlock_core::constants::{
    ACCESS_READY, CHANGE_PASS_CMD, FIRST_DELIVERED, INTERFACE_READY, LOCKOUT_WARNING, MATCH,
    MISMATCH, OPEN_DOOR_CMD, SECOND_DELIVERED,
};
use serde::{Deserialize, Serialize};

/// A protocol code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolCode {
    InterfaceReady,
    AccessReady,
    OpenDoor,
    ChangePassword,
    FirstDelivered,
    SecondDelivered,
    Match,
    Mismatch,
    LockoutWarning,
}

impl ProtocolCode {
    /// All codes, commands first.
    pub const ALL: [ProtocolCode; 9] = [
        ProtocolCode::InterfaceReady,
        ProtocolCode::AccessReady,
        ProtocolCode::OpenDoor,
        ProtocolCode::ChangePassword,
        ProtocolCode::FirstDelivered,
        ProtocolCode::SecondDelivered,
        ProtocolCode::Match,
        ProtocolCode::Mismatch,
        ProtocolCode::LockoutWarning,
    ];

    /// Wire value.
    pub fn as_byte(self) -> u8 {
        match self {
            ProtocolCode::InterfaceReady => INTERFACE_READY,
            ProtocolCode::AccessReady => ACCESS_READY,
            ProtocolCode::OpenDoor => OPEN_DOOR_CMD,
            ProtocolCode::ChangePassword => CHANGE_PASS_CMD,
            ProtocolCode::FirstDelivered => FIRST_DELIVERED,
            ProtocolCode::SecondDelivered => SECOND_DELIVERED,
            ProtocolCode::Match => MATCH,
            ProtocolCode::Mismatch => MISMATCH,
            ProtocolCode::LockoutWarning => LOCKOUT_WARNING,
        }
    }

    /// Decode a wire value. Returns `None` for bytes that are not codes.
    ///
    /// ```
    /// use doorlock_protocol::ProtocolCode;
    ///
    /// assert_eq!(ProtocolCode::from_byte(0x05), Some(ProtocolCode::Match));
    /// assert_eq!(ProtocolCode::from_byte(0x00), None);
    /// ```
    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|code| code.as_byte() == byte)
    }

    /// Whether this code starts or advances an exchange.
    pub fn is_command(self) -> bool {
        !self.is_status()
    }

    /// Whether this code reports an outcome.
    pub fn is_status(self) -> bool {
        matches!(
            self,
            ProtocolCode::Match | ProtocolCode::Mismatch | ProtocolCode::LockoutWarning
        )
    }
}

impl fmt::Display for ProtocolCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProtocolCode::InterfaceReady => "INTERFACE_READY",
            ProtocolCode::AccessReady => "ACCESS_READY",
            ProtocolCode::OpenDoor => "OPEN_DOOR_CMD",
            ProtocolCode::ChangePassword => "CHANGE_PASS_CMD",
            ProtocolCode::FirstDelivered => "FIRST_DELIVERED",
            ProtocolCode::SecondDelivered => "SECOND_DELIVERED",
            ProtocolCode::Match => "MATCH",
            ProtocolCode::Mismatch => "MISMATCH",
            ProtocolCode::LockoutWarning => "LOCKOUT_WARNING",
        };
        write!(f, "{name}({:#04x})", self.as_byte())
    }
}

/// Outcome of comparing the two provisioning entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Match,
    Mismatch,
}

impl MatchStatus {
    pub fn from_matched(matched: bool) -> Self {
        if matched {
            MatchStatus::Match
        } else {
            MatchStatus::Mismatch
        }
    }

    pub fn code(self) -> ProtocolCode {
        match self {
            MatchStatus::Match => ProtocolCode::Match,
            MatchStatus::Mismatch => ProtocolCode::Mismatch,
        }
    }

    /// Decode a status byte. Anything other than MATCH counts as a mismatch.
    pub fn from_byte(byte: u8) -> Self {
        Self::from_matched(byte == MATCH)
    }
}

/// Access node answer to an authentication attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Match,
    Mismatch,
    Lockout,
}

impl Verdict {
    pub fn code(self) -> ProtocolCode {
        match self {
            Verdict::Match => ProtocolCode::Match,
            Verdict::Mismatch => ProtocolCode::Mismatch,
            Verdict::Lockout => ProtocolCode::LockoutWarning,
        }
    }

    /// Decode a verdict byte. Returns `None` for bytes that are not one of
    /// the three verdict codes.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            MATCH => Some(Verdict::Match),
            MISMATCH => Some(Verdict::Mismatch),
            LOCKOUT_WARNING => Some(Verdict::Lockout),
            _ => None,
        }
    }
}

/// What an authentication unlocks. Selects the command code and the action
/// taken after a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthPurpose {
    /// Run the door actuation cycle.
    OpenDoor,
    /// Re-enter provisioning to set a new credential.
    ChangePassword,
}

impl AuthPurpose {
    /// Command code that starts this authentication.
    pub fn command(self) -> ProtocolCode {
        match self {
            AuthPurpose::OpenDoor => ProtocolCode::OpenDoor,
            AuthPurpose::ChangePassword => ProtocolCode::ChangePassword,
        }
    }

    /// Decode a menu selection byte forwarded by the Interface node.
    ///
    /// ```
    /// use doorlock_protocol::AuthPurpose;
    ///
    /// assert_eq!(AuthPurpose::from_menu_byte(b'+'), Some(AuthPurpose::OpenDoor));
    /// assert_eq!(AuthPurpose::from_menu_byte(b'7'), None);
    /// ```
    pub fn from_menu_byte(byte: u8) -> Option<Self> {
        match byte {
            OPEN_DOOR_CMD => Some(AuthPurpose::OpenDoor),
            CHANGE_PASS_CMD => Some(AuthPurpose::ChangePassword),
            _ => None,
        }
    }
}

impl fmt::Display for AuthPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthPurpose::OpenDoor => write!(f, "open-door"),
            AuthPurpose::ChangePassword => write!(f, "change-password"),
        }
    }
}
