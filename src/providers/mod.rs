// ABOUTME: Review platform provider abstraction and registry
// ABOUTME: Uniform OAuth + review-fetch contract over per-platform adapters
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider layer for social media review platforms.
//!
//! Every platform adapter implements [`ReviewProvider`]; the service layer
//! resolves adapters through the [`ProviderRegistry`] by platform name and
//! never talks to a platform API directly.

pub mod core;
pub mod registry;
pub mod synthetic_provider;

pub use core::{ProviderConfig, ReviewProvider};
pub use registry::ProviderRegistry;
pub use synthetic_provider::SyntheticProvider;
