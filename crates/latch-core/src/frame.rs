//! Tagged wire frames.
//!
//! The relay forwards opaque bytes in both directions, so the receiving side
//! needs a cheap way to tell handshake traffic apart from encrypted payload
//! traffic before touching any session state. A one-byte tag at the start of
//! every frame does that:
//!
//! ```text
//! [1 byte: tag] [body]
//! tag 0x01 = Start    (no body)
//! tag 0x02 = Syn      (32-byte public key)
//! tag 0x03 = SynAck   (32-byte public key)
//! tag 0x04 = Ack      (32-byte public key)
//! tag 0x10 = Payload  (sealed ciphertext)
//! ```
//!
//! Handshake frames travel unencrypted (they carry only public keys); payload
//! frames carry sealed-box ciphertext produced by `latch-crypto`. Frames with
//! an unknown tag are rejected here, before reaching the handshake state
//! machine.

use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;

use crate::message::{HandshakeKind, HandshakeMessage};
use crate::PUBLIC_KEY_LEN;

/// Frame type tags.
pub mod tag {
    pub const START: u8 = 0x01;
    pub const SYN: u8 = 0x02;
    pub const SYN_ACK: u8 = 0x03;
    pub const ACK: u8 = 0x04;
    pub const PAYLOAD: u8 = 0x10;
}

/// Errors decoding a wire frame.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("empty frame")]
    Empty,

    #[error("unknown frame tag: {0:#04x}")]
    UnknownTag(u8),

    #[error("bad frame length: expected {expected} body bytes, got {actual}")]
    BadLength { expected: usize, actual: usize },
}

/// A single unit of relay traffic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Unencrypted handshake control message.
    Handshake(HandshakeMessage),
    /// Sealed application ciphertext.
    Payload(Vec<u8>),
}

impl Frame {
    /// Encode the frame for the wire.
    pub fn encode(&self) -> Bytes {
        match self {
            Self::Handshake(msg) => {
                let body_len = msg.public_key.map_or(0, |_| PUBLIC_KEY_LEN);
                let mut buf = BytesMut::with_capacity(1 + body_len);
                buf.put_u8(match msg.kind {
                    HandshakeKind::Start => tag::START,
                    HandshakeKind::Syn => tag::SYN,
                    HandshakeKind::SynAck => tag::SYN_ACK,
                    HandshakeKind::Ack => tag::ACK,
                });
                if let Some(pk) = &msg.public_key {
                    buf.put_slice(pk);
                }
                buf.freeze()
            }
            Self::Payload(ciphertext) => {
                let mut buf = BytesMut::with_capacity(1 + ciphertext.len());
                buf.put_u8(tag::PAYLOAD);
                buf.put_slice(ciphertext);
                buf.freeze()
            }
        }
    }

    /// Decode a frame from wire bytes.
    pub fn decode(data: &[u8]) -> Result<Self, FrameError> {
        let (&tag_byte, body) = data.split_first().ok_or(FrameError::Empty)?;

        match tag_byte {
            tag::START => {
                if !body.is_empty() {
                    return Err(FrameError::BadLength {
                        expected: 0,
                        actual: body.len(),
                    });
                }
                Ok(Self::Handshake(HandshakeMessage::start()))
            }
            tag::SYN | tag::SYN_ACK | tag::ACK => {
                let pk: [u8; PUBLIC_KEY_LEN] =
                    body.try_into().map_err(|_| FrameError::BadLength {
                        expected: PUBLIC_KEY_LEN,
                        actual: body.len(),
                    })?;
                let msg = match tag_byte {
                    tag::SYN => HandshakeMessage::syn(pk),
                    tag::SYN_ACK => HandshakeMessage::syn_ack(pk),
                    _ => HandshakeMessage::ack(pk),
                };
                Ok(Self::Handshake(msg))
            }
            tag::PAYLOAD => Ok(Self::Payload(body.to_vec())),
            other => Err(FrameError::UnknownTag(other)),
        }
    }
}
