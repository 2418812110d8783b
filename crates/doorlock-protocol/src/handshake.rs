//! Handshake primitives shared by every flow.
//!
//! Both nodes run a fixed sequence of sends and receives with no sequence
//! numbers. These primitives are the only way flows touch the link:
//!
//! - [`Handshake::send_code`] writes one code.
//! - [`Handshake::await_exact`] reads and discards bytes until one specific
//!   code shows up.
//! - [`Handshake::recv_byte`] reads one raw byte (status, verdict).
//! - [`Handshake::await_request`] / [`Handshake::recv_request`] wait for the
//!   peer to open an exchange (menu key, command, provisioning round).
//! - [`Handshake::send_credential`] / [`Handshake::receive_credential`] move
//!   the fixed-length credential one symbol at a time, pausing after each
//!   symbol so the receiver keeps up. No per-symbol acknowledgment exists.
//!
//! # Stalls
//!
//! With the default configuration every read waits forever, matching the
//! reference firmware: a silent peer hangs the node until reset. Setting
//! [`HandshakeConfig::stall_timeout`] bounds each wait for a reply to
//! something this node just sent and surfaces [`ProtocolError::Stall`]
//! instead. It is off unless configured.
//!
//! Waits for the peer to open an exchange are never bounded. The peer only
//! opens one after its user has pressed keys, which takes as long as it
//! takes.

use std::future::Future;
use std::time::Duration;

use doorlock_core::constants::{CREDENTIAL_LENGTH, INTER_SYMBOL_DELAY_MS};
use doorlock_core::Credential;
use doorlock_hardware::SerialLink;
use tracing::{debug, trace};

use crate::codes::ProtocolCode;
use crate::error::{ProtocolError, Result};

/// Timing parameters of the handshake layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandshakeConfig {
    /// Pause after each credential symbol sent or received.
    pub inter_symbol_delay: Duration,

    /// Upper bound on any single wait for a reply. `None` waits forever.
    pub stall_timeout: Option<Duration>,
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        Self {
            inter_symbol_delay: Duration::from_millis(INTER_SYMBOL_DELAY_MS),
            stall_timeout: None,
        }
    }
}

/// Handshake layer over a serial link.
///
/// # Examples
///
/// ```
/// use doorlock_core::Credential;
/// use doorlock_hardware::mock::MockLink;
/// use doorlock_protocol::{Handshake, HandshakeConfig, ProtocolCode};
///
/// # #[tokio::main(flavor = "current_thread", start_paused = true)]
/// # async fn main() -> doorlock_protocol::Result<()> {
/// let (a, b) = MockLink::pair();
/// let mut interface = Handshake::new(a, HandshakeConfig::default());
/// let mut access = Handshake::new(b, HandshakeConfig::default());
///
/// interface.send_code(ProtocolCode::OpenDoor).await?;
/// access.await_exact(ProtocolCode::OpenDoor).await?;
///
/// interface.send_credential(&Credential::new(*b"12345")).await?;
/// assert_eq!(access.receive_credential().await?, Credential::new(*b"12345"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Handshake<L> {
    link: L,
    config: HandshakeConfig,
}

impl<L: SerialLink> Handshake<L> {
    pub fn new(link: L, config: HandshakeConfig) -> Self {
        Self { link, config }
    }

    pub fn config(&self) -> &HandshakeConfig {
        &self.config
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn into_inner(self) -> L {
        self.link
    }

    /// Write one protocol code.
    pub async fn send_code(&mut self, code: ProtocolCode) -> Result<()> {
        debug!(%code, "send");
        self.link.send_byte(code.as_byte()).await?;
        Ok(())
    }

    /// Write one raw byte (menu selection).
    pub async fn send_byte(&mut self, byte: u8) -> Result<()> {
        debug!("send raw {byte:#04x}");
        self.link.send_byte(byte).await?;
        Ok(())
    }

    /// Read one raw byte sent in reply.
    pub async fn recv_byte(&mut self) -> Result<u8> {
        let byte = guard(
            self.config.stall_timeout,
            "byte",
            self.link.recv_byte(),
        )
        .await?;
        debug!("recv {byte:#04x}");
        Ok(byte)
    }

    /// Read until `code` arrives in reply, discarding every other byte.
    ///
    /// Returns the number of bytes discarded on the way.
    pub async fn await_exact(&mut self, code: ProtocolCode) -> Result<usize> {
        let awaiting = code.to_string();
        let discarded = guard(
            self.config.stall_timeout,
            &awaiting,
            discard_until(&mut self.link, code.as_byte()),
        )
        .await?;
        debug!(%code, discarded, "received");
        Ok(discarded)
    }

    /// Wait for the peer to open an exchange with `code`, discarding every
    /// other byte. Never times out.
    pub async fn await_request(&mut self, code: ProtocolCode) -> Result<usize> {
        let discarded = discard_until(&mut self.link, code.as_byte()).await?;
        debug!(%code, discarded, "request");
        Ok(discarded)
    }

    /// Wait for the peer's next raw byte, such as a menu selection. Never
    /// times out.
    pub async fn recv_request(&mut self) -> Result<u8> {
        let byte = self.link.recv_byte().await?;
        debug!("request {byte:#04x}");
        Ok(byte)
    }

    /// Send every symbol of `credential` with the inter-symbol delay.
    pub async fn send_credential(&mut self, credential: &Credential) -> Result<()> {
        for &symbol in credential.symbols() {
            self.link.send_byte(symbol).await?;
            tokio::time::sleep(self.config.inter_symbol_delay).await;
        }
        debug!("credential sent");
        Ok(())
    }

    /// Receive `CREDENTIAL_LENGTH` symbols with the inter-symbol delay.
    pub async fn receive_credential(&mut self) -> Result<Credential> {
        let mut symbols = [0u8; CREDENTIAL_LENGTH];
        for slot in &mut symbols {
            *slot = guard(
                self.config.stall_timeout,
                "credential symbol",
                self.link.recv_byte(),
            )
            .await?;
            tokio::time::sleep(self.config.inter_symbol_delay).await;
        }
        debug!("credential received");
        Ok(Credential::new(symbols))
    }
}

async fn discard_until<L: SerialLink>(link: &mut L, expected: u8) -> Result<usize> {
    let mut discarded = 0;
    loop {
        let byte = link.recv_byte().await?;
        if byte == expected {
            return Ok(discarded);
        }
        trace!("discarding {byte:#04x} while awaiting {expected:#04x}");
        discarded += 1;
    }
}

async fn guard<T, E, F>(limit: Option<Duration>, awaiting: &str, operation: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, E>>,
    ProtocolError: From<E>,
{
    let Some(limit) = limit else {
        return Ok(operation.await?);
    };

    match tokio::time::timeout(limit, operation).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(ProtocolError::Stall {
            awaiting: awaiting.to_string(),
            waited_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doorlock_hardware::mock::MockLink;

    fn pair(config: HandshakeConfig) -> (Handshake<MockLink>, Handshake<MockLink>) {
        let (a, b) = MockLink::pair();
        (Handshake::new(a, config), Handshake::new(b, config))
    }

    #[tokio::test(start_paused = true)]
    async fn test_await_exact_discards_other_bytes() {
        let (mut interface, mut access) = pair(HandshakeConfig::default());

        for byte in [0x00, 0x50, b'+', 0x20] {
            access.send_byte(byte).await.unwrap();
        }

        let discarded = interface.await_exact(ProtocolCode::AccessReady).await.unwrap();
        assert_eq!(discarded, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_credential_transfer_paces_symbols() {
        let (mut interface, mut access) = pair(HandshakeConfig::default());
        let credential = Credential::new(*b"12345");

        let start = tokio::time::Instant::now();
        interface.send_credential(&credential).await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_millis(5 * INTER_SYMBOL_DELAY_MS));

        assert_eq!(access.receive_credential().await.unwrap(), credential);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stall_timeout_reports_awaited_code() {
        let config = HandshakeConfig {
            stall_timeout: Some(Duration::from_secs(2)),
            ..HandshakeConfig::default()
        };
        let (mut interface, _access) = pair(config);

        let err = interface.await_exact(ProtocolCode::AccessReady).await.unwrap_err();
        match err {
            ProtocolError::Stall { awaiting, waited_ms } => {
                assert_eq!(awaiting, "ACCESS_READY(0x20)");
                assert_eq!(waited_ms, 2000);
            }
            other => panic!("expected stall, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stall_timeout_applies_to_credential_symbols() {
        let config = HandshakeConfig {
            stall_timeout: Some(Duration::from_millis(500)),
            ..HandshakeConfig::default()
        };
        let (mut interface, mut access) = pair(config);

        // Only three of five symbols ever arrive
        for symbol in *b"123" {
            interface.send_byte(symbol).await.unwrap();
        }

        let err = access.receive_credential().await.unwrap_err();
        assert!(matches!(err, ProtocolError::Stall { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_timeout_waits_until_byte_arrives() {
        let (mut interface, mut access) = pair(HandshakeConfig::default());

        let waiter = async { interface.recv_byte().await.unwrap() };
        let sender = async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            access.send_code(ProtocolCode::Match).await.unwrap();
        };

        let (byte, ()) = tokio::join!(waiter, sender);
        assert_eq!(byte, 0x05);
    }

    #[tokio::test(start_paused = true)]
    async fn test_requests_outlive_stall_timeout() {
        let config = HandshakeConfig {
            stall_timeout: Some(Duration::from_secs(1)),
            ..HandshakeConfig::default()
        };
        let (mut interface, mut access) = pair(config);

        let waiter = async {
            let menu = access.recv_request().await.unwrap();
            let discarded = access.await_request(ProtocolCode::OpenDoor).await.unwrap();
            (menu, discarded)
        };
        let sender = async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            interface.send_byte(b'+').await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
            interface.send_byte(0x00).await.unwrap();
            interface.send_code(ProtocolCode::OpenDoor).await.unwrap();
        };

        let ((menu, discarded), ()) = tokio::join!(waiter, sender);
        assert_eq!(menu, b'+');
        assert_eq!(discarded, 1);
    }

    #[tokio::test]
    async fn test_closed_link_is_link_error() {
        let (mut interface, access) = pair(HandshakeConfig::default());
        drop(access);

        let err = interface.recv_byte().await.unwrap_err();
        assert!(matches!(err, ProtocolError::Link(_)));
    }
}
