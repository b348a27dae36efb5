// ABOUTME: Token encryption for OAuth credentials at rest using AES-256-GCM
// ABOUTME: Random nonce per call prepended to ciphertext, base64-encoded for storage
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Token encryption at rest.
//!
//! [`TokenEncryptor`] seals OAuth tokens with AES-256-GCM before they reach
//! the database. Each call uses a fresh random 12-byte nonce, prepended to the
//! ciphertext, and the whole blob is base64-encoded for the TEXT column.
//! Decryption fails closed: truncated or tampered ciphertext is rejected by
//! the authentication tag, never returned as corrupted plaintext.

pub mod keys;

pub use keys::{generate_state, load_or_generate};

use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::{aead::Aead, Aes256Gcm, KeyInit};
use base64::Engine;
use rand::RngCore;
use reviewsync_core::errors::CryptoError;

/// AES-256 key length in bytes
pub const KEY_LEN: usize = 32;

/// AES-GCM nonce length in bytes
const NONCE_LEN: usize = 12;

/// Symmetric encryptor for OAuth tokens at rest.
///
/// Pure and reentrant: encryption and decryption share no mutable state, so a
/// single instance can be shared freely across tasks.
#[derive(Clone)]
pub struct TokenEncryptor {
    key: [u8; KEY_LEN],
}

impl TokenEncryptor {
    /// Create an encryptor from raw key material.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKeyLength`] unless `key` is exactly 32
    /// bytes.
    pub fn new(key: &[u8]) -> Result<Self, CryptoError> {
        if key.len() != KEY_LEN {
            return Err(CryptoError::InvalidKeyLength {
                expected: KEY_LEN,
                actual: key.len(),
            });
        }
        let mut material = [0u8; KEY_LEN];
        material.copy_from_slice(key);
        Ok(Self { key: material })
    }

    /// Encrypt a plaintext token for storage.
    ///
    /// An empty plaintext short-circuits to an empty string, so connections
    /// without a refresh token store an empty column rather than a sealed
    /// empty string.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::EncryptionFailed`] if the AEAD seal fails.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        if plaintext.is_empty() {
            return Ok(String::new());
        }

        let cipher = Aes256Gcm::new(GenericArray::from_slice(&self.key));

        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = GenericArray::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| CryptoError::EncryptionFailed)?;

        // Prepend nonce so decrypt can recover it from the stored blob
        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);

        Ok(base64::engine::general_purpose::STANDARD.encode(sealed))
    }

    /// Decrypt a stored token.
    ///
    /// An empty ciphertext short-circuits to an empty string.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob is not valid base64, is shorter than the
    /// nonce it must carry, or fails AEAD authentication (wrong key or
    /// tampered ciphertext).
    pub fn decrypt(&self, ciphertext: &str) -> Result<String, CryptoError> {
        if ciphertext.is_empty() {
            return Ok(String::new());
        }

        let data = base64::engine::general_purpose::STANDARD.decode(ciphertext)?;
        if data.len() < NONCE_LEN {
            return Err(CryptoError::CiphertextTooShort { len: data.len() });
        }

        let cipher = Aes256Gcm::new(GenericArray::from_slice(&self.key));
        let (nonce_bytes, sealed) = data.split_at(NONCE_LEN);
        let nonce = GenericArray::from_slice(nonce_bytes);

        let plaintext = cipher
            .decrypt(nonce, sealed)
            .map_err(|_| CryptoError::DecryptionFailed)?;

        String::from_utf8(plaintext).map_err(|_| CryptoError::DecryptionFailed)
    }
}

impl std::fmt::Debug for TokenEncryptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never expose key material through Debug output
        f.debug_struct("TokenEncryptor").finish_non_exhaustive()
    }
}

/// Generate a random 32-byte encryption key.
#[must_use]
pub fn generate_key() -> [u8; KEY_LEN] {
    use rand::Rng;
    let mut key = [0u8; KEY_LEN];
    rand::thread_rng().fill(&mut key);
    key
}
