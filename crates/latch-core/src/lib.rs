//! Core LATCH protocol types: handshake messages and wire frames.
//!
//! LATCH establishes an encrypted channel between a client application and a
//! remote wallet process that can only reach each other through an untrusted
//! relay. This crate defines the message vocabulary of that protocol:
//!
//! - The four handshake messages (Start, Syn, SynAck, Ack) by which the two
//!   peers exchange public keys
//! - The tagged wire frame a transport uses to tell handshake traffic apart
//!   from encrypted payload traffic
//!
//! All cryptography lives in `latch-crypto`; this crate only carries bytes.

#![forbid(unsafe_code)]

pub mod frame;
pub mod message;

pub use frame::{Frame, FrameError};
pub use message::{HandshakeKind, HandshakeMessage};

/// X25519 public keys are always 32 bytes on the wire.
pub const PUBLIC_KEY_LEN: usize = 32;
