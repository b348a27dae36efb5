// ABOUTME: ReviewProvider trait and per-platform OAuth endpoint configuration
// ABOUTME: Adapters absorb platform API quirks behind this uniform async contract
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reviewsync_core::errors::ProviderError;
use reviewsync_core::models::{AccountInfo, Review, TokenResponse};
use reviewsync_core::platforms;

/// Uniform contract every review platform adapter satisfies.
///
/// Implementations absorb their platform's OAuth and API shape and return
/// normalized models. All failures are classified through [`ProviderError`]
/// so callers can distinguish auth failures from transient ones.
#[async_trait]
pub trait ReviewProvider: Send + Sync {
    /// Platform identifier this adapter serves, one of the
    /// [`reviewsync_core::platforms`] constants.
    fn platform_name(&self) -> &'static str;

    /// Build the authorization URL embedding the caller's CSRF `state`.
    fn get_authorization_url(&self, state: &str) -> String;

    /// Exchange an authorization code for tokens.
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderError`] when the platform rejects the code or the
    /// exchange fails in transit.
    async fn exchange_code_for_token(&self, code: &str) -> Result<TokenResponse, ProviderError>;

    /// Obtain fresh tokens from a refresh token.
    ///
    /// Platforms without true refresh tokens (long-lived-token re-exchange)
    /// still satisfy this by treating the stored token as the refresh input.
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderError`] when the refresh is rejected or fails in
    /// transit.
    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse, ProviderError>;

    /// Check whether an access token is currently usable.
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderError`] on transport failure; callers treat that
    /// the same as an invalid token.
    async fn validate_token(&self, access_token: &str) -> Result<bool, ProviderError>;

    /// Fetch the account the token belongs to.
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderError`] when the lookup fails.
    async fn get_account_info(&self, access_token: &str) -> Result<AccountInfo, ProviderError>;

    /// Fetch reviews authored since `since`; `None` means all history.
    ///
    /// Results may arrive in any order. Every review carries a
    /// `platform_review_id` stable across repeated fetches.
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderError`] when the fetch fails.
    async fn fetch_reviews(
        &self,
        access_token: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Review>, ProviderError>;
}

/// OAuth endpoint and credential configuration for one platform adapter.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// OAuth client id issued by the platform
    pub client_id: String,
    /// OAuth client secret issued by the platform
    pub client_secret: String,
    /// Redirect URI registered with the platform
    pub redirect_uri: String,
    /// Authorization endpoint
    pub auth_url: String,
    /// Token exchange endpoint
    pub token_url: String,
    /// Base URL for data API calls
    pub api_base_url: String,
    /// Scopes requested during authorization
    pub scopes: Vec<String>,
}

impl ProviderConfig {
    /// Default endpoint configuration for a known platform, with client
    /// credentials taken from `<PLATFORM>_CLIENT_ID` / `<PLATFORM>_CLIENT_SECRET`
    /// / `<PLATFORM>_REDIRECT_URI` environment variables when set.
    ///
    /// Returns `None` for unknown platform names.
    #[must_use]
    pub fn for_platform(platform: &str) -> Option<Self> {
        let mut config = match platform {
            platforms::GOOGLE_BUSINESS => Self {
                client_id: String::new(),
                client_secret: String::new(),
                redirect_uri: String::new(),
                auth_url: "https://accounts.google.com/o/oauth2/v2/auth".to_owned(),
                token_url: "https://oauth2.googleapis.com/token".to_owned(),
                api_base_url: "https://mybusiness.googleapis.com/v4".to_owned(),
                scopes: vec!["https://www.googleapis.com/auth/business.manage".to_owned()],
            },
            platforms::FACEBOOK => Self {
                client_id: String::new(),
                client_secret: String::new(),
                redirect_uri: String::new(),
                auth_url: "https://www.facebook.com/v18.0/dialog/oauth".to_owned(),
                token_url: "https://graph.facebook.com/v18.0/oauth/access_token".to_owned(),
                api_base_url: "https://graph.facebook.com/v18.0".to_owned(),
                scopes: vec![
                    "pages_show_list".to_owned(),
                    "pages_read_user_content".to_owned(),
                ],
            },
            platforms::INSTAGRAM => Self {
                client_id: String::new(),
                client_secret: String::new(),
                redirect_uri: String::new(),
                auth_url: "https://www.facebook.com/v18.0/dialog/oauth".to_owned(),
                token_url: "https://graph.facebook.com/v18.0/oauth/access_token".to_owned(),
                api_base_url: "https://graph.facebook.com/v18.0".to_owned(),
                scopes: vec![
                    "instagram_basic".to_owned(),
                    "instagram_manage_comments".to_owned(),
                ],
            },
            platforms::XIAOHONGSHU => Self {
                client_id: String::new(),
                client_secret: String::new(),
                redirect_uri: String::new(),
                auth_url: "https://open.xiaohongshu.com/oauth2/authorize".to_owned(),
                token_url: "https://open.xiaohongshu.com/oauth2/access_token".to_owned(),
                api_base_url: "https://open.xiaohongshu.com/api".to_owned(),
                scopes: vec!["note.read".to_owned(), "comment.read".to_owned()],
            },
            _ => return None,
        };

        let env_prefix = platform.to_uppercase();
        if let Ok(id) = std::env::var(format!("{env_prefix}_CLIENT_ID")) {
            config.client_id = id;
        }
        if let Ok(secret) = std::env::var(format!("{env_prefix}_CLIENT_SECRET")) {
            config.client_secret = secret;
        }
        if let Ok(uri) = std::env::var(format!("{env_prefix}_REDIRECT_URI")) {
            config.redirect_uri = uri;
        }

        Some(config)
    }

    /// Build an authorization URL from this config with the given CSRF state.
    ///
    /// Falls back to a bare query-string concatenation if `auth_url` is not a
    /// parseable absolute URL.
    #[must_use]
    pub fn authorization_url(&self, state: &str) -> String {
        url::Url::parse(&self.auth_url).map_or_else(
            |_| format!("{}?client_id={}&state={state}", self.auth_url, self.client_id),
            |mut url| {
                url.query_pairs_mut()
                    .append_pair("client_id", &self.client_id)
                    .append_pair("redirect_uri", &self.redirect_uri)
                    .append_pair("response_type", "code")
                    .append_pair("scope", &self.scopes.join(" "))
                    .append_pair("state", state);
                url.to_string()
            },
        )
    }
}
