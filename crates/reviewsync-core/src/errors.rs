// ABOUTME: Error taxonomy for crypto, provider, and sync operations
// ABOUTME: Classifies failures so callers can distinguish auth, rate-limit, and transient errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error taxonomy for the sync engine.
//!
//! Three error families cover the engine's failure surface:
//!
//! - [`CryptoError`]: token encryption and decryption. Decrypt fails closed,
//!   so a tampered or truncated ciphertext is an error here, never bad plaintext.
//! - [`ProviderError`]: upstream platform API failures, classified so the
//!   orchestrator can react differently to auth failures (re-authorization),
//!   rate limits and network errors (retry next tick), and missing resources.
//! - [`SyncError`]: the sync service's own failure modes, wrapping the other
//!   two plus persistence and concurrency errors.

/// Errors from token encryption and decryption.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// Key material has the wrong length for the cipher
    #[error("encryption key must be {expected} bytes, got {actual}")]
    InvalidKeyLength {
        /// Required key length in bytes
        expected: usize,
        /// Length that was supplied
        actual: usize,
    },

    /// Stored ciphertext is not valid base64
    #[error("ciphertext is not valid base64")]
    InvalidEncoding {
        /// Underlying decode error
        #[from]
        source: base64::DecodeError,
    },

    /// Decoded ciphertext is shorter than the nonce it must carry
    #[error("ciphertext too short: {len} bytes")]
    CiphertextTooShort {
        /// Decoded ciphertext length
        len: usize,
    },

    /// AEAD encryption failed
    #[error("encryption failed")]
    EncryptionFailed,

    /// AEAD decryption or authentication failed
    #[error("decryption failed: ciphertext rejected")]
    DecryptionFailed,
}

/// Errors from platform provider operations, classified per the sync engine's
/// reaction: re-authorize, retry later, or give up.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The platform rejected the credential
    #[error("{platform}: authentication failed: {details}")]
    AuthFailed {
        /// Platform identifier
        platform: String,
        /// Platform-reported reason
        details: String,
    },

    /// The platform throttled the request
    #[error("{platform}: rate limited")]
    RateLimited {
        /// Platform identifier
        platform: String,
        /// Seconds to wait, when the platform reports one
        retry_after_secs: Option<u64>,
    },

    /// Transport-level failure reaching the platform
    #[error("{platform}: network error: {details}")]
    Network {
        /// Platform identifier
        platform: String,
        /// Transport error description
        details: String,
    },

    /// The requested account or resource does not exist upstream
    #[error("{platform}: {resource} not found")]
    NotFound {
        /// Platform identifier
        platform: String,
        /// Resource that was requested
        resource: String,
    },

    /// The platform answered with a payload the adapter cannot interpret
    #[error("{platform}: invalid response: {details}")]
    InvalidResponse {
        /// Platform identifier
        platform: String,
        /// What was wrong with the payload
        details: String,
    },
}

impl ProviderError {
    /// Construct an [`ProviderError::AuthFailed`] error.
    pub fn auth_failed(platform: impl Into<String>, details: impl Into<String>) -> Self {
        Self::AuthFailed {
            platform: platform.into(),
            details: details.into(),
        }
    }

    /// Construct a [`ProviderError::Network`] error.
    pub fn network(platform: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Network {
            platform: platform.into(),
            details: details.into(),
        }
    }

    /// Construct an [`ProviderError::InvalidResponse`] error.
    pub fn invalid_response(platform: impl Into<String>, details: impl Into<String>) -> Self {
        Self::InvalidResponse {
            platform: platform.into(),
            details: details.into(),
        }
    }

    /// True for failures worth retrying at the next scheduled tick.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Network { .. })
    }

    /// True when the merchant must re-authorize the connection.
    #[must_use]
    pub const fn requires_reauthorization(&self) -> bool {
        matches!(self, Self::AuthFailed { .. })
    }
}

#[cfg(feature = "provider-errors")]
impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        let platform = err
            .url()
            .and_then(|u| u.host_str())
            .unwrap_or("unknown")
            .to_owned();
        if err.is_status() {
            let status = err.status().map_or(0, |s| s.as_u16());
            match status {
                401 | 403 => Self::AuthFailed {
                    platform,
                    details: format!("HTTP {status}"),
                },
                404 => Self::NotFound {
                    platform,
                    resource: "resource".to_owned(),
                },
                429 => Self::RateLimited {
                    platform,
                    retry_after_secs: None,
                },
                _ => Self::Network {
                    platform,
                    details: format!("HTTP {status}"),
                },
            }
        } else {
            Self::Network {
                platform,
                details: err.to_string(),
            }
        }
    }
}

/// Errors from the sync service state machine.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// No connection row exists for the requested id
    #[error("connection {connection_id} not found")]
    ConnectionNotFound {
        /// Requested connection id
        connection_id: i64,
    },

    /// The connection names a platform with no registered provider
    #[error("no provider registered for platform '{platform}'")]
    ProviderNotFound {
        /// Platform named by the connection
        platform: String,
    },

    /// Another sync for the same connection holds the lease
    #[error("connection {connection_id} is already syncing")]
    AlreadySyncing {
        /// Connection whose lease is held
        connection_id: i64,
    },

    /// The sync exceeded its deadline and was cancelled
    #[error("sync timed out after {seconds}s")]
    Timeout {
        /// Deadline that was exceeded, in seconds
        seconds: u64,
    },

    /// The access token is invalid and no refresh path exists
    #[error("invalid or expired access token; re-authorization required")]
    InvalidToken,

    /// A fetched review has no stable platform review id
    #[error("fetched review is missing a platform review id")]
    MissingReviewId,

    /// Token encryption or decryption failed
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// An upstream provider call failed
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The persistence layer reported an error
    #[error("database error: {message}")]
    Database {
        /// Description of the persistence failure
        message: String,
    },
}

impl SyncError {
    /// Wrap a persistence-layer error.
    pub fn database(err: impl std::fmt::Display) -> Self {
        Self::Database {
            message: err.to_string(),
        }
    }

    /// True when the merchant must re-authorize the connection before another
    /// sync can succeed.
    #[must_use]
    pub const fn requires_reauthorization(&self) -> bool {
        match self {
            Self::InvalidToken | Self::Crypto(_) => true,
            Self::Provider(e) => e.requires_reauthorization(),
            _ => false,
        }
    }
}
