//! Handshake state machine.
//!
//! One transition function serves both ends of a connection: each side feeds
//! every inbound handshake message to [`HandshakeSession::respond`] and
//! forwards whatever reply comes back. There is no initiator or responder
//! type — the asymmetry lives entirely in who sends the first `Start`.
//!
//! The sequence is Start → Syn → SynAck → Ack. The side that replies to
//! `SynAck` with `Ack` already holds the peer key and completes at that
//! moment; the side that receives the `Ack` picks the peer key out of it and
//! completes then. After four messages both sides hold both public keys.
//!
//! A session is single-owner mutable state. Callers must serialize `respond`
//! and `regenerate_keys` per session; encryption itself is stateless and
//! lives in [`crate::sealed`].

use tracing::{debug, warn};
use x25519_dalek::PublicKey;

use latch_core::{HandshakeKind, HandshakeMessage, PUBLIC_KEY_LEN};

use crate::keys::SessionKeypair;

/// Key-exchange state for one session.
///
/// Invariants:
/// - `exchanged` is true only while `peer_public` is set
/// - regenerating keys clears `peer_public` and `exchanged` in the same call,
///   so a new keypair is never observed next to a stale peer key
pub struct HandshakeSession {
    keys: SessionKeypair,
    peer_public: Option<PublicKey>,
    exchanged: bool,
}

impl HandshakeSession {
    /// Create a session with a freshly generated keypair.
    pub fn new() -> Self {
        Self {
            keys: SessionKeypair::generate(),
            peer_public: None,
            exchanged: false,
        }
    }

    /// Process one inbound handshake message and produce the reply to send,
    /// if any.
    ///
    /// Any carried public key is recorded before the reply is decided — last
    /// write wins, even after the exchange has completed. `Ack` is terminal
    /// and produces no reply.
    pub fn respond(&mut self, incoming: &HandshakeMessage) -> Option<HandshakeMessage> {
        if let Some(bytes) = incoming.public_key {
            if self.exchanged {
                // A keyed message after completion silently replaces the peer
                // key and invalidates the session's encryption context.
                warn!(kind = %incoming.kind, "peer key replaced after completed exchange");
            }
            self.peer_public = Some(PublicKey::from(bytes));
        }

        match incoming.kind {
            HandshakeKind::Start => Some(HandshakeMessage::syn(self.keys.public_key_bytes())),
            HandshakeKind::Syn => Some(HandshakeMessage::syn_ack(self.keys.public_key_bytes())),
            HandshakeKind::SynAck => {
                let reply = HandshakeMessage::ack(self.keys.public_key_bytes());
                self.complete();
                Some(reply)
            }
            HandshakeKind::Ack => {
                self.complete();
                None
            }
        }
    }

    /// Discard all key material and start over.
    ///
    /// Used on reconnect: a new underlying connection must never reuse the
    /// previous session's keys. The old secret is zeroized on drop.
    pub fn regenerate_keys(&mut self) {
        self.keys = SessionKeypair::generate();
        self.peer_public = None;
        self.exchanged = false;
        debug!("session keys regenerated");
    }

    /// Whether both sides hold both public keys.
    pub fn is_exchanged(&self) -> bool {
        self.exchanged
    }

    /// This session's own public key.
    pub fn public_key(&self) -> PublicKey {
        self.keys.public_key()
    }

    /// This session's own public key as wire bytes.
    pub fn public_key_bytes(&self) -> [u8; PUBLIC_KEY_LEN] {
        self.keys.public_key_bytes()
    }

    /// The peer's public key, once learned.
    pub fn peer_public_key(&self) -> Option<&PublicKey> {
        self.peer_public.as_ref()
    }

    pub(crate) fn keypair(&self) -> &SessionKeypair {
        &self.keys
    }

    fn complete(&mut self) {
        if self.peer_public.is_some() {
            self.exchanged = true;
            debug!("key exchange complete");
        } else {
            // An Ack that carries no key while none is on record cannot
            // complete the exchange: readiness always implies a peer key.
            warn!("ack without peer key ignored");
        }
    }
}

impl Default for HandshakeSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Drive a full exchange, A initiating. Returns both completed sessions.
    fn run_exchange() -> (HandshakeSession, HandshakeSession) {
        let mut a = HandshakeSession::new();
        let mut b = HandshakeSession::new();

        // A -> B: Start. B replies Syn.
        let syn = b.respond(&HandshakeMessage::start()).unwrap();
        assert_eq!(syn.kind, HandshakeKind::Syn);

        // B -> A: Syn. A replies SynAck.
        let syn_ack = a.respond(&syn).unwrap();
        assert_eq!(syn_ack.kind, HandshakeKind::SynAck);

        // A -> B: SynAck. B replies Ack and completes.
        let ack = b.respond(&syn_ack).unwrap();
        assert_eq!(ack.kind, HandshakeKind::Ack);
        assert!(b.is_exchanged());

        // B -> A: Ack. Terminal, no reply; A completes.
        assert!(a.respond(&ack).is_none());
        assert!(a.is_exchanged());

        (a, b)
    }

    #[test]
    fn test_four_message_convergence() {
        let (a, b) = run_exchange();

        assert_eq!(
            a.peer_public_key().unwrap().as_bytes(),
            &b.public_key_bytes()
        );
        assert_eq!(
            b.peer_public_key().unwrap().as_bytes(),
            &a.public_key_bytes()
        );
    }

    #[test]
    fn test_replies_carry_own_key() {
        let mut session = HandshakeSession::new();
        let own = session.public_key_bytes();

        let syn = session.respond(&HandshakeMessage::start()).unwrap();
        assert_eq!(syn.public_key, Some(own));

        let syn_ack = session.respond(&HandshakeMessage::syn([1u8; 32])).unwrap();
        assert_eq!(syn_ack.public_key, Some(own));
    }

    #[test]
    fn test_not_exchanged_before_ack() {
        let mut session = HandshakeSession::new();
        assert!(!session.is_exchanged());

        session.respond(&HandshakeMessage::start());
        assert!(!session.is_exchanged());

        session.respond(&HandshakeMessage::syn([1u8; 32]));
        assert!(!session.is_exchanged());
    }

    #[test]
    fn test_regenerate_clears_everything() {
        let (mut a, _b) = run_exchange();
        let old_public = a.public_key_bytes();

        a.regenerate_keys();

        assert!(!a.is_exchanged());
        assert!(a.peer_public_key().is_none());
        assert_ne!(a.public_key_bytes(), old_public);
    }

    #[test]
    fn test_ack_without_key_does_not_complete() {
        let mut session = HandshakeSession::new();

        let bare_ack = HandshakeMessage {
            kind: HandshakeKind::Ack,
            public_key: None,
        };
        assert!(session.respond(&bare_ack).is_none());
        assert!(!session.is_exchanged());
        assert!(session.peer_public_key().is_none());
    }

    #[test]
    fn test_ack_without_key_keeps_prior_peer_key() {
        let mut session = HandshakeSession::new();
        session.respond(&HandshakeMessage::syn_ack([3u8; 32]));
        assert!(session.is_exchanged());

        let bare_ack = HandshakeMessage {
            kind: HandshakeKind::Ack,
            public_key: None,
        };
        session.respond(&bare_ack);
        assert!(session.is_exchanged());
        assert_eq!(session.peer_public_key().unwrap().as_bytes(), &[3u8; 32]);
    }

    #[test]
    fn test_late_syn_overwrites_peer_key() {
        // Last write wins, even after completion: a duplicate Syn replaces
        // the recorded peer key and desynchronizes the session.
        let (_a, mut b) = run_exchange();
        let before = *b.peer_public_key().unwrap();

        b.respond(&HandshakeMessage::syn([0x77u8; 32]));

        let after = *b.peer_public_key().unwrap();
        assert_ne!(before.as_bytes(), after.as_bytes());
        assert_eq!(after.as_bytes(), &[0x77u8; 32]);
    }

    #[test]
    fn test_two_independent_exchanges_use_distinct_keys() {
        let (a1, _) = run_exchange();
        let (a2, _) = run_exchange();
        assert_ne!(a1.public_key_bytes(), a2.public_key_bytes());
    }
}
