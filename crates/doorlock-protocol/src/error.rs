use doorlock_hardware::HardwareError;
use thiserror::Error;

/// Errors raised by the handshake primitives.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The peer did not send the awaited byte within the stall timeout.
    ///
    /// Only produced when a stall timeout is configured. Without one the
    /// waiting operation never returns.
    #[error("Protocol stall: no {awaiting} after {waited_ms}ms")]
    Stall { awaiting: String, waited_ms: u64 },

    /// The link device failed.
    #[error("Link error: {0}")]
    Link(#[from] HardwareError),
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
