// ABOUTME: Core types and constants for the reviewsync engine
// ABOUTME: Foundation crate with data models, platform constants, and error taxonomy
//
// SPDX-License-Identifier: MIT OR Apache-2.0

#![deny(unsafe_code)]

//! # Reviewsync Core
//!
//! Foundation crate providing shared types for the reviewsync review
//! synchronization engine. This crate is designed to change infrequently and
//! carries no async code: data models, the platform identifier constants, and
//! the error taxonomy shared between the sync engine and external platform
//! adapters.
//!
//! ## Features
//!
//! - `provider-errors`: enables `From<reqwest::Error>` for [`errors::ProviderError`]
//!   so HTTP platform adapters can map transport failures into the taxonomy.

/// Error taxonomy: crypto, provider, and sync errors
pub mod errors;
/// Data models: connections, reviews, sync logs, and DTOs
pub mod models;
/// Known platform identifiers
pub mod platforms;

pub use errors::{CryptoError, ProviderError, SyncError};
pub use models::{
    AccountInfo, ApiConnection, Review, ReviewStats, SyncLog, SyncLogStatus, SyncStats, SyncStatus,
    SyncType, SyncedReview, TokenResponse,
};
