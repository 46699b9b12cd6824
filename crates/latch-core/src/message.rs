//! Handshake message types.
//!
//! The key exchange is a fixed 4-message sequence:
//!
//! ```text
//! Initiator                              Responder
//!     |                                       |
//!     |  Start (no key)                       |
//!     |-------------------------------------->|
//!     |                                       |
//!     |  Syn (responder's public key)         |
//!     |<--------------------------------------|
//!     |                                       |
//!     |  SynAck (initiator's public key)      |
//!     |-------------------------------------->|
//!     |                                       |
//!     |  Ack (responder's public key)         |
//!     |<--------------------------------------|
//!     |                                       |
//!     [     both sides hold both keys         ]
//! ```
//!
//! Messages are immutable values constructed fresh per step. Only public keys
//! ever appear in a message; private key material never crosses this boundary.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::PUBLIC_KEY_LEN;

/// The kind of a handshake message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandshakeKind {
    /// Asks the peer to begin a key exchange. Carries no key.
    Start,
    /// First keyed message, sent in response to `Start`.
    Syn,
    /// Acknowledges `Syn` and carries the other side's key.
    SynAck,
    /// Terminal message; after it, both sides hold both keys.
    Ack,
}

impl fmt::Display for HandshakeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "START",
            Self::Syn => "SYN",
            Self::SynAck => "SYN_ACK",
            Self::Ack => "ACK",
        };
        write!(f, "{}", name)
    }
}

/// A single handshake message.
///
/// `public_key` is present on Syn, SynAck, and Ack; absent on Start.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandshakeMessage {
    pub kind: HandshakeKind,
    pub public_key: Option<[u8; PUBLIC_KEY_LEN]>,
}

impl HandshakeMessage {
    /// The opening message of an exchange. Carries no key.
    pub fn start() -> Self {
        Self {
            kind: HandshakeKind::Start,
            public_key: None,
        }
    }

    /// Reply to `Start`, carrying the responder's public key.
    pub fn syn(public_key: [u8; PUBLIC_KEY_LEN]) -> Self {
        Self {
            kind: HandshakeKind::Syn,
            public_key: Some(public_key),
        }
    }

    /// Reply to `Syn`, carrying the sender's public key.
    pub fn syn_ack(public_key: [u8; PUBLIC_KEY_LEN]) -> Self {
        Self {
            kind: HandshakeKind::SynAck,
            public_key: Some(public_key),
        }
    }

    /// Terminal reply to `SynAck`, carrying the sender's public key.
    pub fn ack(public_key: [u8; PUBLIC_KEY_LEN]) -> Self {
        Self {
            kind: HandshakeKind::Ack,
            public_key: Some(public_key),
        }
    }
}

impl fmt::Debug for HandshakeMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.public_key {
            Some(pk) => write!(f, "HandshakeMessage({}, key={})", self.kind, hex::encode(pk)),
            None => write!(f, "HandshakeMessage({})", self.kind),
        }
    }
}
