//! Token endpoint operations: code exchange and refresh.

use crate::error::{Result, SpotifyClientError};
use crate::types::{SpotifyConfig, TokenErrorBody, TokenResponse};
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

/// Playback scopes the companion needs.
pub const DEFAULT_SCOPES: &[&str] = &[
    "user-read-currently-playing",
    "user-read-playback-state",
    "user-modify-playback-state",
];

/// Client for the accounts-service token endpoint.
///
/// Both grant types authenticate with HTTP Basic auth built from the client
/// id and secret. Neither operation persists tokens or retries; that is the
/// caller's responsibility.
pub struct AuthClient<'a> {
    http: &'a Client,
    config: &'a SpotifyConfig,
}

impl<'a> AuthClient<'a> {
    pub fn new(http: &'a Client, config: &'a SpotifyConfig) -> Self {
        Self { http, config }
    }

    /// Exchange an authorization code for an access/refresh token pair.
    pub async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<TokenResponse> {
        let url = format!("{}/api/token", self.config.accounts_url);
        debug!(url = %url, "Exchanging authorization code");

        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ];

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&params)
            .send()
            .await?;

        let status = response.status();

        if status.is_success() {
            response.json().await.map_err(|e| {
                SpotifyClientError::ParseError(format!("Failed to parse token response: {}", e))
            })
        } else {
            let body = response.text().await.unwrap_or_default();
            let message = provider_error_message(&body)
                .unwrap_or_else(|| format!("token endpoint returned status {}", status.as_u16()));
            warn!(status = %status, "Authorization code exchange rejected");
            Err(SpotifyClientError::AuthExchange(message))
        }
    }

    /// Obtain a new access token from a refresh token.
    ///
    /// The response may carry a rotated refresh token; callers decide what
    /// to store.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse> {
        let url = format!("{}/api/token", self.config.accounts_url);
        debug!(url = %url, "Refreshing access token");

        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&params)
            .send()
            .await?;

        let status = response.status();

        if status.is_success() {
            response.json().await.map_err(|e| {
                SpotifyClientError::ParseError(format!("Failed to parse refresh response: {}", e))
            })
        } else {
            let body = response.text().await.unwrap_or_default();
            let message = provider_error_message(&body)
                .unwrap_or_else(|| format!("token endpoint returned status {}", status.as_u16()));
            warn!(status = %status, "Token refresh rejected");
            Err(SpotifyClientError::RefreshFailed(message))
        }
    }
}

/// Build the consent-page URL the user visits before the callback delivers
/// an authorization code.
pub fn authorize_url(
    config: &SpotifyConfig,
    scopes: &[&str],
    state: Option<&str>,
) -> Result<Url> {
    let mut url = Url::parse(&format!("{}/authorize", config.accounts_url))
        .map_err(|e| SpotifyClientError::InvalidUrl(e.to_string()))?;

    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("client_id", &config.client_id)
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", &config.redirect_uri)
            .append_pair("scope", &scopes.join(" "));
        if let Some(state) = state {
            query.append_pair("state", state);
        }
    }

    Ok(url)
}

/// Pull the most specific message out of a token-endpoint error body:
/// `error_description`, then `error`, then nothing.
fn provider_error_message(body: &str) -> Option<String> {
    let parsed: TokenErrorBody = serde_json::from_str(body).ok()?;
    parsed.error_description.or(parsed.error)
}
