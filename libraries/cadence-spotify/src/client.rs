//! Main Spotify playback client.

use crate::auth::{authorize_url, AuthClient, DEFAULT_SCOPES};
use crate::error::{Result, SpotifyClientError};
use crate::store::TokenStore;
use crate::types::{
    CurrentlyPlaying, PlaybackSnapshot, PlaybackState, SpotifyConfig, TokenResponse,
};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Client for the Spotify Web API playback surface.
///
/// The client attaches the stored access token to every request, detects
/// authentication failure, and performs a single refresh-then-retry. Tokens
/// live in an injected [`TokenStore`]; the client never clears them on its
/// own, the session-owning caller decides when a failed refresh means
/// logout.
///
/// # Example
///
/// ```ignore
/// use cadence_spotify::{SpotifyClient, SpotifyConfig, TokenStore};
/// use std::sync::Arc;
///
/// let config = SpotifyConfig::new(client_id, client_secret, redirect_uri);
/// let store = Arc::new(TokenStore::in_memory());
/// let client = SpotifyClient::new(config, store)?;
///
/// // Direct the user to the consent page, then exchange the callback code.
/// println!("{}", client.authorize_url(None)?);
/// client.login_with_code(&code).await?;
///
/// let snapshot = client.snapshot().await?;
/// if let Some(track) = snapshot.track {
///     println!("{} — {}", track.name, track.artist_names());
/// }
/// ```
pub struct SpotifyClient {
    http: Client,
    config: SpotifyConfig,
    store: Arc<TokenStore>,
}

impl SpotifyClient {
    /// Create a new client with the given configuration and token store.
    pub fn new(config: SpotifyConfig, store: Arc<TokenStore>) -> Result<Self> {
        let api_url = normalize_url(&config.api_url, "API")?;
        let accounts_url = normalize_url(&config.accounts_url, "accounts")?;

        let config = SpotifyConfig {
            api_url,
            accounts_url,
            ..config
        };

        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("Cadence/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(SpotifyClientError::Request)?;

        Ok(Self {
            http,
            config,
            store,
        })
    }

    /// The injected token store.
    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    /// Whether an access token is stored.
    pub async fn is_authenticated(&self) -> bool {
        self.store.access_token().await.is_some()
    }

    /// URL of the consent page for this client's credentials.
    ///
    /// Uses the default playback scopes unless given others.
    pub fn authorize_url(&self, scopes: Option<&[&str]>) -> Result<Url> {
        authorize_url(&self.config, scopes.unwrap_or(DEFAULT_SCOPES), None)
    }

    /// Exchange an authorization code and store the resulting tokens.
    pub async fn login_with_code(&self, code: &str) -> Result<TokenResponse> {
        let auth = AuthClient::new(&self.http, &self.config);
        let tokens = auth
            .exchange_code(code, &self.config.redirect_uri)
            .await?;

        self.store
            .set_tokens(tokens.access_token.clone(), tokens.refresh_token.clone())
            .await;
        info!("Logged in, tokens stored");

        Ok(tokens)
    }

    /// Clear stored tokens (logout). Idempotent.
    pub async fn logout(&self) {
        self.store.clear().await;
        info!("Logged out");
    }

    /// Try to obtain a new access token from the stored refresh token.
    ///
    /// Returns `true` when a new access token was stored. Returns `false`
    /// without a network call when no refresh token is stored or the client
    /// credentials are missing, and on any request failure; in every `false`
    /// case the stored tokens are left untouched. Never recursive.
    pub async fn refresh(&self) -> bool {
        let Some(refresh_token) = self.store.refresh_token().await else {
            debug!("No refresh token stored, skipping refresh");
            return false;
        };
        if !self.config.has_credentials() {
            warn!("Client credentials not configured, cannot refresh");
            return false;
        }

        let auth = AuthClient::new(&self.http, &self.config);
        match auth.refresh(&refresh_token).await {
            Ok(tokens) => {
                // The provider may rotate the refresh token; keep the old
                // one when the response omits it.
                self.store
                    .set_tokens(tokens.access_token, tokens.refresh_token)
                    .await;
                info!("Access token refreshed");
                true
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed");
                false
            }
        }
    }

    /// Issue an authenticated request against the resource API.
    ///
    /// On a 401 the stored token is refreshed once and the original request
    /// re-dispatched once; a 401 on the retry surfaces as
    /// [`SpotifyClientError::RequestFailed`], never a second refresh. A 204
    /// yields `None`.
    pub async fn request(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<&serde_json::Value>,
    ) -> Result<Option<serde_json::Value>> {
        let token = self
            .store
            .access_token()
            .await
            .ok_or(SpotifyClientError::NotAuthenticated)?;

        let response = self.dispatch(endpoint, &method, body, &token).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            warn!(endpoint = %endpoint, "Access token rejected, attempting refresh");
            if !self.refresh().await {
                return Err(SpotifyClientError::RefreshFailed(
                    "could not obtain a new access token".to_string(),
                ));
            }

            let token = self
                .store
                .access_token()
                .await
                .ok_or(SpotifyClientError::NotAuthenticated)?;
            let retry = self.dispatch(endpoint, &method, body, &token).await?;
            // A second 401 falls through as a plain request failure here.
            return read_response(retry).await;
        }

        read_response(response).await
    }

    // =========================================================================
    // Playback operations
    // =========================================================================

    /// The user's currently playing track, or `None` when nothing is playing.
    pub async fn currently_playing(&self) -> Result<Option<CurrentlyPlaying>> {
        self.get_json("/me/player/currently-playing").await
    }

    /// Full playback state, or `None` when no device is active.
    pub async fn playback_state(&self) -> Result<Option<PlaybackState>> {
        self.get_json("/me/player").await
    }

    /// Resume playback on the active device.
    pub async fn play(&self) -> Result<()> {
        self.command("/me/player/play", Method::PUT).await
    }

    /// Pause playback.
    pub async fn pause(&self) -> Result<()> {
        self.command("/me/player/pause", Method::PUT).await
    }

    /// Skip to the next track.
    pub async fn next_track(&self) -> Result<()> {
        self.command("/me/player/next", Method::POST).await
    }

    /// Skip to the previous track.
    pub async fn previous_track(&self) -> Result<()> {
        self.command("/me/player/previous", Method::POST).await
    }

    /// One poll of the playback snapshot.
    pub async fn snapshot(&self) -> Result<PlaybackSnapshot> {
        let current = self.currently_playing().await?;
        Ok(PlaybackSnapshot::from(current))
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn dispatch(
        &self,
        endpoint: &str,
        method: &Method,
        body: Option<&serde_json::Value>,
        token: &str,
    ) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.config.api_url, endpoint);
        debug!(method = %method, url = %url, "Dispatching request");

        let mut request = self.http.request(method.clone(), &url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }

        Ok(request.send().await?)
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<Option<T>> {
        match self.request(endpoint, Method::GET, None).await? {
            Some(value) => {
                let parsed = serde_json::from_value(value).map_err(|e| {
                    SpotifyClientError::ParseError(format!(
                        "Failed to parse {} response: {}",
                        endpoint, e
                    ))
                })?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }

    async fn command(&self, endpoint: &str, method: Method) -> Result<()> {
        self.request(endpoint, method, None).await?;
        Ok(())
    }
}

async fn read_response(response: reqwest::Response) -> Result<Option<serde_json::Value>> {
    let status = response.status();

    // No-content responses, e.g. "nothing currently playing".
    if status == StatusCode::NO_CONTENT {
        return Ok(None);
    }

    if !status.is_success() {
        return Err(SpotifyClientError::RequestFailed {
            status: status.as_u16(),
        });
    }

    let json = response.json().await.map_err(|e| {
        SpotifyClientError::ParseError(format!("Failed to parse response body: {}", e))
    })?;
    Ok(Some(json))
}

fn normalize_url(url: &str, label: &str) -> Result<String> {
    if url.is_empty() {
        return Err(SpotifyClientError::InvalidUrl(format!(
            "{} URL cannot be empty",
            label
        )));
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(SpotifyClientError::InvalidUrl(format!(
            "{} URL must start with http:// or https://",
            label
        )));
    }
    Ok(url.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SpotifyConfig {
        SpotifyConfig::new("id", "secret", "http://127.0.0.1:8888/callback")
    }

    #[test]
    fn test_url_validation() {
        let store = Arc::new(TokenStore::in_memory());
        assert!(SpotifyClient::new(test_config(), Arc::clone(&store)).is_ok());

        let bad = test_config().with_endpoints("not-a-url", "https://accounts.example.com");
        assert!(matches!(
            SpotifyClient::new(bad, Arc::clone(&store)),
            Err(SpotifyClientError::InvalidUrl(_))
        ));

        let empty = test_config().with_endpoints("https://api.example.com", "");
        assert!(matches!(
            SpotifyClient::new(empty, store),
            Err(SpotifyClientError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_url_normalization() {
        let config = test_config().with_endpoints(
            "https://api.example.com/v1///",
            "https://accounts.example.com/",
        );
        let client =
            SpotifyClient::new(config, Arc::new(TokenStore::in_memory())).expect("valid config");

        assert_eq!(client.config.api_url, "https://api.example.com/v1");
        assert_eq!(client.config.accounts_url, "https://accounts.example.com");
    }
}
