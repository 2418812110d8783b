//! Node configuration.
//!
//! Every value here is part of the behaviour contract between the two nodes:
//! both must run with the same timing and trial limit or their displays and
//! actuators drift apart silently. All fields default to the reference
//! firmware constants, so an empty JSON object is a valid configuration.
//!
//! # Example
//!
//! ```
//! use doorlock_controller::NodeConfig;
//!
//! let json = r#"{ "max_trials": 5, "timing": { "hold_ticks": 10 } }"#;
//! let config = NodeConfig::from_json_str(json).unwrap();
//! assert_eq!(config.max_trials, 5);
//! assert_eq!(config.timing.hold_ticks, 10);
//! assert_eq!(config.timing.unlock_ticks, 15);
//! ```

use std::path::Path;
use std::time::Duration;

use doorlock_core::CompareMode;
use doorlock_core::constants::{
    ALARM_TICKS, BANNER_MS, CHANGE_MESSAGE_HOLD_MS, CONFIRM_MS, CREDENTIAL_LENGTH, HOLD_TICKS,
    INTER_SYMBOL_DELAY_MS, LOCK_TICKS, MAX_TRIALS, MESSAGE_HOLD_MS, SETTLE_MS,
    STORE_CREDENTIAL_OFFSET, STORE_WRITE_DELAY_MS, TICK_PERIOD_MS, UNLOCK_TICKS,
};
use doorlock_protocol::{AuthPurpose, HandshakeConfig};
use serde::{Deserialize, Serialize};

use crate::error::{ControllerError, Result};

/// Phase durations and pacing delays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Length of one tick in milliseconds.
    pub tick_period_ms: u64,

    /// Unlocking phase, in ticks.
    pub unlock_ticks: u32,

    /// Door held open, in ticks.
    pub hold_ticks: u32,

    /// Locking phase, in ticks.
    pub lock_ticks: u32,

    /// Lockout alarm, in ticks.
    pub alarm_ticks: u32,

    /// Pause after each credential symbol, in milliseconds.
    pub inter_symbol_delay_ms: u64,

    /// Pause after each store byte write, in milliseconds.
    pub store_write_delay_ms: u64,

    /// Pause after the door locks, in milliseconds.
    pub settle_ms: u64,

    /// Hold time of transient Interface messages, in milliseconds.
    pub message_hold_ms: u64,

    /// Hold time of a rejection while changing the password, in
    /// milliseconds.
    pub change_message_hold_ms: u64,

    /// Hold time of the provisioning confirmation, in milliseconds.
    pub confirm_ms: u64,

    /// Hold time of the boot banner, in milliseconds.
    pub banner_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: TICK_PERIOD_MS,
            unlock_ticks: UNLOCK_TICKS,
            hold_ticks: HOLD_TICKS,
            lock_ticks: LOCK_TICKS,
            alarm_ticks: ALARM_TICKS,
            inter_symbol_delay_ms: INTER_SYMBOL_DELAY_MS,
            store_write_delay_ms: STORE_WRITE_DELAY_MS,
            settle_ms: SETTLE_MS,
            message_hold_ms: MESSAGE_HOLD_MS,
            change_message_hold_ms: CHANGE_MESSAGE_HOLD_MS,
            confirm_ms: CONFIRM_MS,
            banner_ms: BANNER_MS,
        }
    }
}

impl TimingConfig {
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn message_hold(&self) -> Duration {
        Duration::from_millis(self.message_hold_ms)
    }

    /// How long a rejected credential stays on screen in the `purpose` flow.
    pub fn rejection_hold(&self, purpose: AuthPurpose) -> Duration {
        match purpose {
            AuthPurpose::OpenDoor => self.message_hold(),
            AuthPurpose::ChangePassword => Duration::from_millis(self.change_message_hold_ms),
        }
    }

    pub fn confirm(&self) -> Duration {
        Duration::from_millis(self.confirm_ms)
    }

    pub fn banner(&self) -> Duration {
        Duration::from_millis(self.banner_ms)
    }

    pub fn store_write_delay(&self) -> Duration {
        Duration::from_millis(self.store_write_delay_ms)
    }
}

/// Configuration of one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub timing: TimingConfig,

    /// Consecutive failures that trigger a lockout.
    pub max_trials: u8,

    /// Upper bound on any wait for the peer, in milliseconds. Absent means
    /// wait forever, as the reference firmware does.
    pub stall_timeout_ms: Option<u64>,

    /// How credentials are compared on the Access node.
    pub compare_mode: CompareMode,

    /// First store address of the credential.
    pub store_offset: u16,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            timing: TimingConfig::default(),
            max_trials: MAX_TRIALS,
            stall_timeout_ms: None,
            compare_mode: CompareMode::default(),
            store_offset: STORE_CREDENTIAL_OFFSET,
        }
    }
}

impl NodeConfig {
    /// Parse and validate a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::Config` on malformed JSON or invalid values.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: NodeConfig = serde_json::from_str(json)
            .map_err(|e| ControllerError::config(format!("Invalid configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::Config` if the file cannot be read or parsed.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path).await.map_err(|e| {
            ControllerError::config(format!("Cannot read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&json)
    }

    /// Check that durations and limits are usable.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::Config` naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        let timing = &self.timing;
        let ticks = [
            ("timing.unlock_ticks", timing.unlock_ticks),
            ("timing.hold_ticks", timing.hold_ticks),
            ("timing.lock_ticks", timing.lock_ticks),
            ("timing.alarm_ticks", timing.alarm_ticks),
        ];
        if let Some((name, _)) = ticks.iter().find(|(_, value)| *value == 0) {
            return Err(ControllerError::config(format!("{name} must be at least 1")));
        }
        if timing.tick_period_ms == 0 {
            return Err(ControllerError::config("timing.tick_period_ms must be at least 1"));
        }
        if self.max_trials == 0 {
            return Err(ControllerError::config("max_trials must be at least 1"));
        }
        if self.stall_timeout_ms == Some(0) {
            return Err(ControllerError::config("stall_timeout_ms must be at least 1"));
        }
        let last = u16::try_from(CREDENTIAL_LENGTH - 1)
            .ok()
            .and_then(|span| self.store_offset.checked_add(span));
        if last.is_none() {
            return Err(ControllerError::config(format!(
                "store_offset {:#06x} leaves no room for a {CREDENTIAL_LENGTH} byte credential",
                self.store_offset
            )));
        }
        Ok(())
    }

    /// Settings for the handshake layer.
    pub fn handshake(&self) -> HandshakeConfig {
        HandshakeConfig {
            inter_symbol_delay: Duration::from_millis(self.timing.inter_symbol_delay_ms),
            stall_timeout: self.stall_timeout_ms.map(Duration::from_millis),
        }
    }
}
