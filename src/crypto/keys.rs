// ABOUTME: Encryption key loading from the environment with development-mode generation
// ABOUTME: Also provides URL-safe random state nonces for OAuth CSRF protection
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key loading and OAuth state generation.
//!
//! The token encryption key lives in `REVIEWSYNC_ENCRYPTION_KEY` as a
//! base64-encoded 32-byte value. When the variable is absent an ephemeral key
//! is generated with a loud warning: tokens sealed with it are unreadable
//! after a restart, which is acceptable only in development.

use anyhow::{anyhow, Result};
use base64::Engine;
use rand::RngCore;
use std::env;
use tracing::{info, warn};

use super::{generate_key, TokenEncryptor, KEY_LEN};

/// Environment variable holding the base64-encoded encryption key
pub const ENCRYPTION_KEY_ENV: &str = "REVIEWSYNC_ENCRYPTION_KEY";

/// Load the token encryptor from the environment, generating an ephemeral key
/// for development when none is configured.
///
/// # Errors
///
/// Returns an error if the environment variable holds invalid base64 or a key
/// that is not exactly 32 bytes.
pub fn load_or_generate() -> Result<TokenEncryptor> {
    if let Ok(encoded) = env::var(ENCRYPTION_KEY_ENV) {
        return load_from_environment(&encoded);
    }

    generate_for_development()
}

fn load_from_environment(encoded: &str) -> Result<TokenEncryptor> {
    info!("Loading token encryption key from environment");
    let key_bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| anyhow!("Invalid base64 encoding in {ENCRYPTION_KEY_ENV}: {e}"))?;

    if key_bytes.len() != KEY_LEN {
        return Err(anyhow!(
            "Token encryption key must be exactly {KEY_LEN} bytes, got {} bytes",
            key_bytes.len()
        ));
    }

    TokenEncryptor::new(&key_bytes).map_err(Into::into)
}

fn generate_for_development() -> Result<TokenEncryptor> {
    warn!("{ENCRYPTION_KEY_ENV} not found in environment");
    warn!("Generating temporary token encryption key - NOT SECURE FOR PRODUCTION");

    let key = generate_key();
    let encoded = base64::engine::general_purpose::STANDARD.encode(key);
    warn!("Generated key (save for production): {ENCRYPTION_KEY_ENV}={encoded}");

    TokenEncryptor::new(&key).map_err(Into::into)
}

/// Generate a random OAuth state nonce for CSRF protection: 32 random bytes,
/// URL-safe base64 without padding.
#[must_use]
pub fn generate_state() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_is_url_safe_and_unique() {
        let a = generate_state();
        let b = generate_state();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43); // 32 bytes, base64 without padding
        assert!(!a.contains('+'));
        assert!(!a.contains('/'));
        assert!(!a.contains('='));
    }
}
