//! Sealed-box payload encryption.
//!
//! Payloads crossing the relay are sealed to the recipient's public key:
//! a fresh ephemeral X25519 keypair per call, Diffie-Hellman against the
//! recipient, HKDF-SHA256 to derive the symmetric key, ChaCha20-Poly1305 to
//! seal the bytes. Only the holder of the matching private scalar can open
//! the result; the relay sees nothing but random-looking bytes.
//!
//! # Wire Format
//!
//! ```text
//! [32 bytes: ephemeral public key] [12 bytes: nonce] [ciphertext || 16-byte tag]
//! ```
//!
//! Because both the ephemeral key and the nonce are drawn fresh from the OS
//! CSPRNG on every call, sealing the same plaintext twice never yields the
//! same bytes. That non-determinism is load-bearing: equal ciphertexts would
//! let the relay correlate repeated payloads.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use hkdf::Hkdf;
use rand::{rngs::OsRng, RngCore};
use sha2::Sha256;
use thiserror::Error;
use x25519_dalek::{EphemeralSecret, PublicKey, SharedSecret};
use zeroize::Zeroize;

use latch_core::PUBLIC_KEY_LEN;

use crate::keys::SessionKeypair;

/// ChaCha20-Poly1305 nonce length.
pub const NONCE_LEN: usize = 12;

/// Poly1305 authentication tag length.
pub const TAG_LEN: usize = 16;

/// Bytes a sealed payload adds on top of the plaintext.
pub const SEALED_OVERHEAD: usize = PUBLIC_KEY_LEN + NONCE_LEN + TAG_LEN;

/// HKDF salt, fixed per protocol version.
const HKDF_SALT: &[u8] = b"latch-sealed-v1";

/// Errors sealing or opening a payload.
#[derive(Debug, Error)]
pub enum SealedError {
    #[error("sealed payload too short: {0} bytes")]
    TooShort(usize),

    #[error("peer public key is a low-order point")]
    NonContributory,

    #[error("encryption failed")]
    Encrypt,

    #[error("decryption failed: bad key or tampered ciphertext")]
    Decrypt,
}

/// Seal `plaintext` so that only the holder of the private key matching
/// `recipient` can open it.
pub fn seal(recipient: &PublicKey, plaintext: &[u8]) -> Result<Vec<u8>, SealedError> {
    let ephemeral = EphemeralSecret::random_from_rng(OsRng);
    let ephemeral_public = PublicKey::from(&ephemeral);

    let shared = ephemeral.diffie_hellman(recipient);
    let cipher = sealing_cipher(&shared, &ephemeral_public, recipient)?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from(nonce_bytes);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|_| SealedError::Encrypt)?;

    let mut sealed = Vec::with_capacity(SEALED_OVERHEAD + plaintext.len());
    sealed.extend_from_slice(ephemeral_public.as_bytes());
    sealed.extend_from_slice(&nonce_bytes);
    sealed.extend_from_slice(&ciphertext);
    Ok(sealed)
}

/// Open a payload sealed to `keypair`'s public key.
///
/// Fails if the payload is truncated, malformed, or its authentication tag
/// does not verify. Never returns unverified plaintext.
pub fn open(keypair: &SessionKeypair, sealed: &[u8]) -> Result<Vec<u8>, SealedError> {
    if sealed.len() < SEALED_OVERHEAD {
        return Err(SealedError::TooShort(sealed.len()));
    }

    let (ephemeral_bytes, rest) = sealed.split_at(PUBLIC_KEY_LEN);
    let (nonce_bytes, ciphertext) = rest.split_at(NONCE_LEN);

    let ephemeral_array: [u8; PUBLIC_KEY_LEN] = ephemeral_bytes
        .try_into()
        .map_err(|_| SealedError::TooShort(sealed.len()))?;
    let ephemeral_public = PublicKey::from(ephemeral_array);

    let shared = keypair.secret.diffie_hellman(&ephemeral_public);
    let cipher = sealing_cipher(&shared, &ephemeral_public, &keypair.public_key())?;

    let nonce_array: [u8; NONCE_LEN] = nonce_bytes
        .try_into()
        .map_err(|_| SealedError::TooShort(sealed.len()))?;
    let nonce = Nonce::from(nonce_array);

    cipher
        .decrypt(&nonce, ciphertext)
        .map_err(|_| SealedError::Decrypt)
}

/// Derive the ChaCha20-Poly1305 cipher for one sealed payload.
///
/// The HKDF info string binds both the ephemeral and the recipient public
/// key, so a sealed payload cannot be re-targeted to a different recipient
/// without failing authentication.
fn sealing_cipher(
    shared: &SharedSecret,
    ephemeral: &PublicKey,
    recipient: &PublicKey,
) -> Result<ChaCha20Poly1305, SealedError> {
    if !shared.was_contributory() {
        return Err(SealedError::NonContributory);
    }

    let mut info = [0u8; PUBLIC_KEY_LEN * 2];
    info[..PUBLIC_KEY_LEN].copy_from_slice(ephemeral.as_bytes());
    info[PUBLIC_KEY_LEN..].copy_from_slice(recipient.as_bytes());

    let hk = Hkdf::<Sha256>::new(Some(HKDF_SALT), shared.as_bytes());
    let mut key = [0u8; 32];
    hk.expand(&info, &mut key)
        .expect("32 bytes is a valid HKDF output length");

    let cipher = ChaCha20Poly1305::new(&key.into());
    key.zeroize();
    Ok(cipher)
}
