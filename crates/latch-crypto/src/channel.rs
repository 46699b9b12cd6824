//! Secure channel façade.
//!
//! This is the surface the transport talks to. Inbound handshake messages go
//! to [`SecureChannel::handle_handshake`]; inbound ciphertext goes to
//! [`SecureChannel::decrypt_inbound`]; outbound payloads go through
//! [`SecureChannel::encrypt_outbound`]. Both payload directions refuse to
//! operate until the handshake has completed — attempting them earlier is a
//! sequencing bug in the caller, not a recoverable protocol state.
//!
//! The transport must call [`SecureChannel::reset`] whenever it establishes a
//! new underlying connection, forcing a fresh handshake before any further
//! payload traffic.

use thiserror::Error;
use tracing::debug;

use latch_core::{HandshakeMessage, PUBLIC_KEY_LEN};

use crate::handshake::HandshakeSession;
use crate::sealed::{self, SealedError};

/// Errors from the secure channel.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// Payload traffic attempted before the handshake reached its terminal
    /// Ack.
    #[error("channel not ready: handshake incomplete")]
    NotReady,

    /// Sealing or opening a payload failed; propagated unchanged.
    #[error(transparent)]
    Sealed(#[from] SealedError),
}

/// Encrypted channel over an untrusted relay.
///
/// One channel per underlying connection; not safe for concurrent mutation
/// without external synchronization.
pub struct SecureChannel {
    session: HandshakeSession,
}

impl SecureChannel {
    /// Create a channel with a fresh session keypair.
    pub fn new() -> Self {
        Self {
            session: HandshakeSession::new(),
        }
    }

    /// Route an inbound handshake message into the state machine.
    ///
    /// Returns the reply for the transport to forward, or `None` when the
    /// message was terminal.
    pub fn handle_handshake(&mut self, msg: &HandshakeMessage) -> Option<HandshakeMessage> {
        self.session.respond(msg)
    }

    /// Seal an outbound payload to the peer's public key.
    pub fn encrypt_outbound(&self, plaintext: &[u8]) -> Result<Vec<u8>, ChannelError> {
        if !self.session.is_exchanged() {
            return Err(ChannelError::NotReady);
        }
        // is_exchanged implies a peer key is held.
        let peer = self.session.peer_public_key().ok_or(ChannelError::NotReady)?;
        Ok(sealed::seal(peer, plaintext)?)
    }

    /// Open an inbound sealed payload with our own key.
    pub fn decrypt_inbound(&self, ciphertext: &[u8]) -> Result<Vec<u8>, ChannelError> {
        if !self.session.is_exchanged() {
            return Err(ChannelError::NotReady);
        }
        Ok(sealed::open(self.session.keypair(), ciphertext)?)
    }

    /// Discard all key material and require a new handshake.
    ///
    /// Call on every new underlying connection (e.g. relay reconnect).
    pub fn reset(&mut self) {
        self.session.regenerate_keys();
        debug!("secure channel reset");
    }

    /// Whether the channel is ready for payload traffic.
    pub fn is_established(&self) -> bool {
        self.session.is_exchanged()
    }

    /// This side's public key, for diagnostics and tests.
    pub fn public_key_bytes(&self) -> [u8; PUBLIC_KEY_LEN] {
        self.session.public_key_bytes()
    }
}

impl Default for SecureChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Complete a handshake between two channels, `a` initiating.
    fn connect(a: &mut SecureChannel, b: &mut SecureChannel) {
        let syn = b.handle_handshake(&HandshakeMessage::start()).unwrap();
        let syn_ack = a.handle_handshake(&syn).unwrap();
        let ack = b.handle_handshake(&syn_ack).unwrap();
        assert!(a.handle_handshake(&ack).is_none());
    }

    #[test]
    fn test_not_ready_before_handshake() {
        let channel = SecureChannel::new();
        assert!(!channel.is_established());
        assert!(matches!(
            channel.encrypt_outbound(b"too early"),
            Err(ChannelError::NotReady)
        ));
        assert!(matches!(
            channel.decrypt_inbound(b"too early"),
            Err(ChannelError::NotReady)
        ));
    }

    #[test]
    fn test_not_ready_mid_handshake() {
        let mut a = SecureChannel::new();
        let mut b = SecureChannel::new();

        let syn = b.handle_handshake(&HandshakeMessage::start()).unwrap();
        let _syn_ack = a.handle_handshake(&syn).unwrap();

        // Neither side has processed an Ack yet.
        assert!(matches!(
            a.encrypt_outbound(b"x"),
            Err(ChannelError::NotReady)
        ));
        assert!(matches!(
            b.encrypt_outbound(b"x"),
            Err(ChannelError::NotReady)
        ));
    }

    #[test]
    fn test_bidirectional_traffic_after_handshake() {
        let mut a = SecureChannel::new();
        let mut b = SecureChannel::new();
        connect(&mut a, &mut b);

        let ct = a.encrypt_outbound(b"request from client").unwrap();
        assert_eq!(b.decrypt_inbound(&ct).unwrap(), b"request from client");

        let ct = b.encrypt_outbound(b"response from wallet").unwrap();
        assert_eq!(a.decrypt_inbound(&ct).unwrap(), b"response from wallet");
    }

    #[test]
    fn test_reset_requires_new_handshake() {
        let mut a = SecureChannel::new();
        let mut b = SecureChannel::new();
        connect(&mut a, &mut b);
        assert!(a.is_established());

        a.reset();
        assert!(!a.is_established());
        assert!(matches!(
            a.encrypt_outbound(b"stale"),
            Err(ChannelError::NotReady)
        ));

        // Old ciphertext sealed to the discarded key no longer opens.
        let ct = b.encrypt_outbound(b"sealed to old key").unwrap();
        b.reset();
        connect(&mut a, &mut b);
        assert!(a.decrypt_inbound(&ct).is_err());
    }

    #[test]
    fn test_reset_changes_public_key() {
        let mut channel = SecureChannel::new();
        let before = channel.public_key_bytes();
        channel.reset();
        assert_ne!(channel.public_key_bytes(), before);
    }

    #[test]
    fn test_sealed_error_propagates() {
        let mut a = SecureChannel::new();
        let mut b = SecureChannel::new();
        connect(&mut a, &mut b);

        let mut ct = a.encrypt_outbound(b"payload").unwrap();
        let last = ct.len() - 1;
        ct[last] ^= 0xff;

        assert!(matches!(
            b.decrypt_inbound(&ct),
            Err(ChannelError::Sealed(SealedError::Decrypt))
        ));
    }
}
