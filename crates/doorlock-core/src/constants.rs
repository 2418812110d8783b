//! Wire and behaviour constants shared by both nodes.
//!
//! The Interface node and the Access node exchange single-byte codes over a
//! point-to-point serial link with no framing, sequence numbers or checksums.
//! Both firmware images must be built from the same values below, otherwise
//! the rigid turn-taking of the protocol desynchronises silently: a node keeps
//! discarding bytes while it waits for a code the peer will never send.
//!
//! # Exchange Overview
//!
//! ```text
//! Interface                           Access
//!     |  INTERFACE_READY (0x10)  ------>  |   boot / provisioning
//!     |  <------  ACCESS_READY (0x20)     |
//!     |  5 credential symbols    ------>  |
//!     |  <------  FIRST_DELIVERED (0x80)  |
//!     |  5 credential symbols    ------>  |
//!     |  <------  SECOND_DELIVERED (0x08) |
//!     |  <------  MATCH / MISMATCH        |
//!
//!     |  OPEN_DOOR_CMD ('+') or           |   authentication
//!     |  CHANGE_PASS_CMD ('-')   ------>  |
//!     |  <------  ACCESS_READY (0x20)     |
//!     |  5 credential symbols    ------>  |
//!     |  <------  MATCH / MISMATCH /      |
//!     |           LOCKOUT_WARNING         |
//! ```
//!
//! # Usage
//!
//! ```
//! use doorlock_core::constants::*;
//!
//! assert_eq!(OPEN_DOOR_CMD, b'+');
//! assert_eq!(UNLOCK_TICKS + HOLD_TICKS + LOCK_TICKS, 33);
//! ```

// ============================================================================
// Handshake Codes
// ============================================================================

/// Sent by the Interface node at boot and at the start of every provisioning
/// exchange.
pub const INTERFACE_READY: u8 = 0x10;

/// Sent by the Access node to acknowledge a provisioning or authentication
/// request.
pub const ACCESS_READY: u8 = 0x20;

/// Access node confirms reception of the first provisioning entry.
pub const FIRST_DELIVERED: u8 = 0x80;

/// Access node confirms reception of the second provisioning entry.
pub const SECOND_DELIVERED: u8 = 0x08;

// ============================================================================
// Command Codes
// ============================================================================

/// Door-open command. Same value as the keypad `+` key, so a menu key press
/// can be forwarded verbatim.
pub const OPEN_DOOR_CMD: u8 = b'+';

/// Password-change command. Same value as the keypad `-` key.
pub const CHANGE_PASS_CMD: u8 = b'-';

// ============================================================================
// Status Codes
// ============================================================================

/// Credentials matched.
pub const MATCH: u8 = 0x05;

/// Credentials did not match.
pub const MISMATCH: u8 = 0x50;

/// Trial limit reached; the Access node is sounding the alarm.
pub const LOCKOUT_WARNING: u8 = 0x3C;

// ============================================================================
// Keypad
// ============================================================================

/// Keypad key that confirms a credential entry.
pub const ENTER_KEY: u8 = b'=';

// ============================================================================
// Credential & Store Layout
// ============================================================================

/// Number of symbols in a credential.
pub const CREDENTIAL_LENGTH: usize = 5;

/// First store address of the credential. The credential occupies
/// `CREDENTIAL_LENGTH` consecutive bytes from here.
pub const STORE_CREDENTIAL_OFFSET: u16 = 0x0311;

/// Pause after each store byte write (EEPROM write cycle).
pub const STORE_WRITE_DELAY_MS: u64 = 10;

// ============================================================================
// Timing (in ticks unless noted)
// ============================================================================

/// Length of one tick in milliseconds.
pub const TICK_PERIOD_MS: u64 = 1000;

/// Duration of the unlocking phase.
pub const UNLOCK_TICKS: u32 = 15;

/// Duration the door is held open.
pub const HOLD_TICKS: u32 = 3;

/// Duration of the locking phase.
pub const LOCK_TICKS: u32 = 15;

/// Duration the alarm sounds after a lockout.
pub const ALARM_TICKS: u32 = 60;

/// Delay after every credential symbol sent or received, in milliseconds.
pub const INTER_SYMBOL_DELAY_MS: u64 = 50;

/// Pause after the door reaches `Locked` before returning to the menu, in
/// milliseconds.
pub const SETTLE_MS: u64 = 1000;

/// How long transient Interface messages stay on screen, in milliseconds.
pub const MESSAGE_HOLD_MS: u64 = 1500;

/// How long a rejected old password stays on screen during a password
/// change, in milliseconds.
pub const CHANGE_MESSAGE_HOLD_MS: u64 = 2000;

/// How long the "new password set" confirmation stays on screen, in
/// milliseconds.
pub const CONFIRM_MS: u64 = 1000;

/// How long the boot banner stays on screen, in milliseconds.
pub const BANNER_MS: u64 = 2500;

/// Consecutive failed attempts that trigger a lockout.
pub const MAX_TRIALS: u8 = 3;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_and_status_codes_are_disjoint() {
        let commands = [
            INTERFACE_READY,
            ACCESS_READY,
            OPEN_DOOR_CMD,
            CHANGE_PASS_CMD,
            FIRST_DELIVERED,
            SECOND_DELIVERED,
        ];
        let statuses = [MATCH, MISMATCH, LOCKOUT_WARNING];

        for status in statuses {
            assert!(!commands.contains(&status), "{status:#04x} is ambiguous");
        }
    }

    #[test]
    fn test_alarm_duration_matches_warning_code() {
        // The reference firmware reuses the warning byte as the alarm length.
        assert_eq!(ALARM_TICKS, u32::from(LOCKOUT_WARNING));
    }

    #[test]
    fn test_credential_fits_after_offset() {
        assert!(usize::from(STORE_CREDENTIAL_OFFSET) + CREDENTIAL_LENGTH <= usize::from(u16::MAX));
    }
}
