// ABOUTME: Provider registry mapping platform names to adapter instances
// ABOUTME: The service layer's only path to a ReviewProvider
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use super::core::ReviewProvider;

/// Registry of platform adapters keyed by platform name.
///
/// Built once at startup and shared behind an `Arc`; registration is not
/// supported after construction.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<&'static str, Arc<dyn ReviewProvider>>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter under its own platform name. A second registration
    /// for the same platform replaces the first.
    pub fn register(&mut self, provider: Arc<dyn ReviewProvider>) {
        let platform = provider.platform_name();
        info!(platform, "Registered review provider");
        self.providers.insert(platform, provider);
    }

    /// Look up the adapter for a platform.
    #[must_use]
    pub fn get(&self, platform: &str) -> Option<Arc<dyn ReviewProvider>> {
        self.providers.get(platform).cloned()
    }

    /// Platform names with a registered adapter, sorted for stable output.
    #[must_use]
    pub fn supported_platforms(&self) -> Vec<&'static str> {
        let mut platforms: Vec<&'static str> = self.providers.keys().copied().collect();
        platforms.sort_unstable();
        platforms
    }

    /// Number of registered adapters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// True if no adapter is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
