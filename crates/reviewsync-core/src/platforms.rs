// ABOUTME: Platform identifier constants for supported review platforms
// ABOUTME: Shared between connection records, provider registry, and sync logs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Known platform identifiers.
//!
//! A connection's `platform` column and a provider's `platform_name()` both use
//! these values. Unknown platforms are rejected by the sync service, so adding
//! a new adapter starts here.

/// Google Business Profile reviews
pub const GOOGLE_BUSINESS: &str = "google_business";

/// Facebook page ratings and reviews
pub const FACEBOOK: &str = "facebook";

/// Instagram business account comments surfaced as reviews
pub const INSTAGRAM: &str = "instagram";

/// Xiaohongshu (RED) notes and comments
pub const XIAOHONGSHU: &str = "xiaohongshu";

/// In-memory synthetic platform for development and tests
pub const SYNTHETIC: &str = "synthetic";

/// All platforms with real upstream APIs
pub const ALL: &[&str] = &[GOOGLE_BUSINESS, FACEBOOK, INSTAGRAM, XIAOHONGSHU];

/// Returns true if `platform` names a platform with a real upstream API.
#[must_use]
pub fn is_known(platform: &str) -> bool {
    ALL.contains(&platform)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_platforms() {
        assert!(is_known(GOOGLE_BUSINESS));
        assert!(is_known(XIAOHONGSHU));
        assert!(!is_known(SYNTHETIC));
        assert!(!is_known("myspace"));
    }
}
