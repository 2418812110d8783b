//! Controller error type.
//!
//! Credential mismatches and lockouts are normal protocol outcomes and never
//! show up here. What does show up is unrecoverable without a reset: a
//! stalled peer (only when a stall timeout is configured), a dead link, or a
//! failing persistent store.

use doorlock_hardware::HardwareError;
use doorlock_protocol::ProtocolError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ControllerError {
    /// Handshake failure (stall or link error).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Peripheral failure outside the link.
    #[error("Hardware error: {0}")]
    Hardware(#[from] HardwareError),

    /// Invalid data model operation.
    #[error(transparent)]
    Core(#[from] doorlock_core::Error),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ControllerError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether the peer went silent past the stall timeout.
    pub fn is_stall(&self) -> bool {
        matches!(self, Self::Protocol(ProtocolError::Stall { .. }))
    }

    /// Whether the persistent store failed.
    pub fn is_store_failure(&self) -> bool {
        matches!(self, Self::Hardware(e) if e.is_store_failure())
    }

    /// Whether the node must be reset to recover.
    ///
    /// Configuration errors are raised before a node starts and are the only
    /// non-fatal kind.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, ControllerError>;
