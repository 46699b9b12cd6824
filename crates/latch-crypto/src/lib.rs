//! Cryptographic core of LATCH.
//!
//! This crate provides:
//! - X25519 session keypairs with zeroize-on-drop secret handling
//! - Sealed-box payload encryption (ephemeral X25519 + HKDF-SHA256 +
//!   ChaCha20-Poly1305)
//! - The handshake state machine that takes two peers from nothing to mutual
//!   public-key knowledge over an untrusted relay
//! - A secure channel façade that gates all payload encryption on handshake
//!   completion
//!
//! # Design
//!
//! Both ends of a connection run the *same* state machine — there is no
//! initiator or responder type. Whichever side receives a handshake message
//! feeds it to [`HandshakeSession::respond`] and forwards the reply, if any.
//! After the fixed Start → Syn → SynAck → Ack sequence, each side holds the
//! other's public key and the channel accepts payload traffic.
//!
//! Nothing in this crate performs I/O and no operation blocks; delivering
//! messages (and serializing them) is the transport's job. A session is not
//! safe for concurrent mutation — keep one session per connection, owned by a
//! single task or guarded by a mutex at the channel boundary.

#![forbid(unsafe_code)]

pub mod channel;
pub mod handshake;
pub mod keys;
pub mod sealed;

pub use channel::{ChannelError, SecureChannel};
pub use handshake::HandshakeSession;
pub use keys::SessionKeypair;
pub use sealed::{open, seal, SealedError};
