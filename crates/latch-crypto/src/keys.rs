//! X25519 session keypairs.
//!
//! Every session generates a fresh ephemeral keypair; keys are never written
//! to disk and never survive a re-key. The private scalar stays inside this
//! module — it has no public accessor and is zeroized when the keypair is
//! dropped.

use std::fmt;

use rand::rngs::OsRng;
use x25519_dalek::{PublicKey, StaticSecret};

use latch_core::PUBLIC_KEY_LEN;

/// An X25519 keypair scoped to a single session.
///
/// The secret half is deliberately unreachable from outside this crate:
/// sealing and opening payloads go through [`crate::sealed`], which is the
/// only consumer of the scalar.
pub struct SessionKeypair {
    pub(crate) secret: StaticSecret,
    public: PublicKey,
}

impl SessionKeypair {
    /// Generate a fresh keypair from the OS CSPRNG.
    pub fn generate() -> Self {
        let secret = StaticSecret::random_from_rng(OsRng);
        let public = PublicKey::from(&secret);
        Self { secret, public }
    }

    /// Build a keypair from raw secret bytes.
    ///
    /// Deterministic: the same bytes always derive the same public key.
    /// Intended for tests; production sessions should use [`generate`].
    ///
    /// [`generate`]: Self::generate
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        let secret = StaticSecret::from(bytes);
        let public = PublicKey::from(&secret);
        Self { secret, public }
    }

    /// The public half of this keypair.
    pub fn public_key(&self) -> PublicKey {
        self.public
    }

    /// The public half as raw wire bytes.
    pub fn public_key_bytes(&self) -> [u8; PUBLIC_KEY_LEN] {
        *self.public.as_bytes()
    }
}

impl fmt::Debug for SessionKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print the secret scalar.
        f.debug_struct("SessionKeypair")
            .field("public", &hex::encode(self.public.as_bytes()))
            .finish_non_exhaustive()
    }
}
