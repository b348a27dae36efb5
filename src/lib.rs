// ABOUTME: Library root for the review synchronization service
// ABOUTME: Wires config, crypto, persistence, providers, and the sync engine together
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # reviewsync
//!
//! Background service that keeps a merchant's customer reviews from external
//! social platforms (Google Business, Facebook, Instagram, Xiaohongshu)
//! mirrored into local storage.
//!
//! The moving parts:
//! - [`crypto`]: OAuth tokens are encrypted at rest with AES-256-GCM.
//! - [`providers`]: a uniform async contract over per-platform adapters,
//!   resolved through a registry by platform name.
//! - [`database`] / [`database_plugins`]: SQLite persistence behind a
//!   backend-agnostic gateway trait.
//! - [`sync`]: the per-connection sync state machine and the periodic batch
//!   scheduler driving it.

#![deny(unsafe_code)]

pub mod config;
pub mod crypto;
pub mod database;
pub mod database_plugins;
pub mod logging;
pub mod providers;
pub mod sync;

pub use reviewsync_core::{errors, models, platforms};
