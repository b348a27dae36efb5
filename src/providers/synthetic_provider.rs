// ABOUTME: In-memory provider with scriptable reviews and failure injection
// ABOUTME: Backs integration tests and the demo seed binary, no network involved
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reviewsync_core::errors::ProviderError;
use reviewsync_core::models::{AccountInfo, Review, TokenResponse};
use reviewsync_core::platforms;

/// In-memory [`super::ReviewProvider`] implementation.
///
/// Reviews, token validity, and failures are all scriptable, so tests and the
/// seed binary can exercise the full sync pipeline without a platform API.
pub struct SyntheticProvider {
    platform: &'static str,
    valid_token: RwLock<String>,
    reviews: RwLock<Vec<Review>>,
    fetch_error: RwLock<Option<String>>,
    fetch_delay: RwLock<Option<std::time::Duration>>,
    refresh_error: RwLock<Option<String>>,
    last_fetch_since: RwLock<Option<Option<DateTime<Utc>>>>,
    fetch_count: AtomicUsize,
    active_fetches: AtomicUsize,
    peak_fetches: AtomicUsize,
}

impl SyntheticProvider {
    /// Create a provider registered under the `synthetic` platform name with
    /// `synthetic-token` as its valid access token.
    #[must_use]
    pub fn new() -> Self {
        Self::with_platform(platforms::SYNTHETIC)
    }

    /// Create a provider that reports an arbitrary platform name, for tests
    /// that need to impersonate a real platform.
    #[must_use]
    pub fn with_platform(platform: &'static str) -> Self {
        Self {
            platform,
            valid_token: RwLock::new("synthetic-token".to_owned()),
            reviews: RwLock::new(Vec::new()),
            fetch_error: RwLock::new(None),
            fetch_delay: RwLock::new(None),
            refresh_error: RwLock::new(None),
            last_fetch_since: RwLock::new(None),
            fetch_count: AtomicUsize::new(0),
            active_fetches: AtomicUsize::new(0),
            peak_fetches: AtomicUsize::new(0),
        }
    }

    /// Replace the scripted review set returned by `fetch_reviews`.
    pub fn set_reviews(&self, reviews: Vec<Review>) {
        *self
            .reviews
            .write()
            .unwrap_or_else(PoisonError::into_inner) = reviews;
    }

    /// Set the one access token the provider considers valid.
    pub fn set_valid_token(&self, token: &str) {
        *self
            .valid_token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = token.to_owned();
    }

    /// Inject a failure message for subsequent `fetch_reviews` calls, or clear
    /// it with `None`.
    pub fn set_fetch_error(&self, message: Option<&str>) {
        *self
            .fetch_error
            .write()
            .unwrap_or_else(PoisonError::into_inner) = message.map(str::to_owned);
    }

    /// Delay every `fetch_reviews` call, for exercising task deadlines.
    pub fn set_fetch_delay(&self, delay: Option<std::time::Duration>) {
        *self
            .fetch_delay
            .write()
            .unwrap_or_else(PoisonError::into_inner) = delay;
    }

    /// Inject a failure message for subsequent `refresh_token` calls, or clear
    /// it with `None`.
    pub fn set_refresh_error(&self, message: Option<&str>) {
        *self
            .refresh_error
            .write()
            .unwrap_or_else(PoisonError::into_inner) = message.map(str::to_owned);
    }

    /// The `since` argument of the most recent fetch, if any fetch happened.
    #[must_use]
    pub fn last_fetch_since(&self) -> Option<Option<DateTime<Utc>>> {
        *self
            .last_fetch_since
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of `fetch_reviews` calls observed.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }

    /// Highest number of `fetch_reviews` calls ever in flight at once,
    /// for asserting concurrency bounds.
    #[must_use]
    pub fn peak_fetch_concurrency(&self) -> usize {
        self.peak_fetches.load(Ordering::SeqCst)
    }

    fn token_response(access_token: String, refresh_token: Option<String>) -> TokenResponse {
        TokenResponse {
            access_token,
            refresh_token,
            expires_in: 3600,
            token_type: "Bearer".to_owned(),
            expires_at: Utc::now() + Duration::hours(1),
        }
    }
}

impl Default for SyntheticProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl super::ReviewProvider for SyntheticProvider {
    fn platform_name(&self) -> &'static str {
        self.platform
    }

    fn get_authorization_url(&self, state: &str) -> String {
        format!("https://synthetic.invalid/oauth/authorize?state={state}")
    }

    async fn exchange_code_for_token(&self, code: &str) -> Result<TokenResponse, ProviderError> {
        if code.is_empty() {
            return Err(ProviderError::auth_failed(
                self.platform,
                "empty authorization code",
            ));
        }
        let access_token = format!("synthetic-access-{code}");
        self.set_valid_token(&access_token);
        Ok(Self::token_response(
            access_token,
            Some(format!("synthetic-refresh-{code}")),
        ))
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse, ProviderError> {
        if let Some(message) = self
            .refresh_error
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        {
            return Err(ProviderError::auth_failed(self.platform, message));
        }
        if refresh_token.is_empty() {
            return Err(ProviderError::auth_failed(
                self.platform,
                "empty refresh token",
            ));
        }
        let access_token = format!("refreshed-{refresh_token}");
        self.set_valid_token(&access_token);
        Ok(Self::token_response(
            access_token,
            Some(refresh_token.to_owned()),
        ))
    }

    async fn validate_token(&self, access_token: &str) -> Result<bool, ProviderError> {
        let valid = self
            .valid_token
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(*valid == access_token)
    }

    async fn get_account_info(&self, access_token: &str) -> Result<AccountInfo, ProviderError> {
        if !self.validate_token(access_token).await? {
            return Err(ProviderError::auth_failed(self.platform, "invalid token"));
        }
        Ok(AccountInfo {
            account_id: "synthetic-account-1".to_owned(),
            account_name: "Synthetic Demo Account".to_owned(),
            avatar_url: String::new(),
        })
    }

    async fn fetch_reviews(
        &self,
        access_token: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Review>, ProviderError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        let active = self.active_fetches.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_fetches.fetch_max(active, Ordering::SeqCst);
        // Decrements on every exit path, including cancellation mid-delay.
        let _gauge = FetchGauge(&self.active_fetches);

        *self
            .last_fetch_since
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(since);

        let delay = *self
            .fetch_delay
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = self
            .fetch_error
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        {
            return Err(ProviderError::network(self.platform, message));
        }
        if !self.validate_token(access_token).await? {
            return Err(ProviderError::auth_failed(self.platform, "invalid token"));
        }

        let reviews = self
            .reviews
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        Ok(reviews
            .into_iter()
            .filter(|review| since.is_none_or(|cutoff| review.reviewed_at > cutoff))
            .collect())
    }
}

struct FetchGauge<'a>(&'a AtomicUsize);

impl Drop for FetchGauge<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ReviewProvider;

    fn demo_review(id: &str, authored: DateTime<Utc>) -> Review {
        Review {
            platform_review_id: id.to_owned(),
            author_name: "Ada".to_owned(),
            author_photo_url: String::new(),
            rating: Some(5.0),
            review_text: "Great".to_owned(),
            review_reply: String::new(),
            reviewed_at: authored,
            metadata: serde_json::Value::Object(serde_json::Map::new()),
        }
    }

    #[tokio::test]
    async fn since_filters_older_reviews() {
        let provider = SyntheticProvider::new();
        let cutoff = Utc::now();
        provider.set_reviews(vec![
            demo_review("old", cutoff - Duration::days(2)),
            demo_review("new", cutoff + Duration::hours(1)),
        ]);

        let all = provider
            .fetch_reviews("synthetic-token", None)
            .await
            .expect("fetch all");
        assert_eq!(all.len(), 2);

        let recent = provider
            .fetch_reviews("synthetic-token", Some(cutoff))
            .await
            .expect("fetch since");
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].platform_review_id, "new");
        assert_eq!(provider.fetch_count(), 2);
    }

    #[tokio::test]
    async fn refresh_rotates_valid_token() {
        let provider = SyntheticProvider::new();
        let refreshed = provider
            .refresh_token("synthetic-refresh-1")
            .await
            .expect("refresh");
        assert!(provider
            .validate_token(&refreshed.access_token)
            .await
            .expect("validate"));
        assert!(!provider
            .validate_token("synthetic-token")
            .await
            .expect("validate old"));
    }

    #[tokio::test]
    async fn injected_fetch_error_is_retryable() {
        let provider = SyntheticProvider::new();
        provider.set_fetch_error(Some("upstream 503"));
        let err = provider
            .fetch_reviews("synthetic-token", None)
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }
}
