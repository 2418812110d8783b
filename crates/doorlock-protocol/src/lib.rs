//! Cross-node protocol for the door locker controller.
//!
//! The protocol is a rigid turn-taking exchange of single-byte codes and raw
//! credential symbols. This crate defines the codes ([`ProtocolCode`],
//! [`Verdict`], [`MatchStatus`], [`AuthPurpose`]) and the handshake
//! primitives ([`Handshake`]) both controllers are built from.
//!
//! # Integrity
//!
//! There is no framing, checksum or retransmission. A corrupted byte is read
//! as whatever code or symbol it happens to equal. This crate does not try
//! to detect or repair that.

pub mod codes;
pub mod error;
pub mod handshake;

pub use codes::{AuthPurpose, MatchStatus, ProtocolCode, Verdict};
pub use error::{ProtocolError, Result};
pub use handshake::{Handshake, HandshakeConfig};
