//! Types for Spotify Web API requests and responses.

use serde::{Deserialize, Serialize};

/// Default base URL for the Spotify resource API.
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";

/// Default base URL for the Spotify accounts service (token endpoint).
pub const DEFAULT_ACCOUNTS_URL: &str = "https://accounts.spotify.com";

/// Configuration for connecting to Spotify.
#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    /// OAuth client identifier
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// Redirect URI registered with the provider
    pub redirect_uri: String,
    /// Base URL of the resource API
    pub api_url: String,
    /// Base URL of the accounts service
    pub accounts_url: String,
}

impl SpotifyConfig {
    /// Create a config with the standard Spotify endpoints.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            api_url: DEFAULT_API_URL.to_string(),
            accounts_url: DEFAULT_ACCOUNTS_URL.to_string(),
        }
    }

    /// Override both base URLs (tests, nonstandard deployments).
    pub fn with_endpoints(
        mut self,
        api_url: impl Into<String>,
        accounts_url: impl Into<String>,
    ) -> Self {
        self.api_url = api_url.into();
        self.accounts_url = accounts_url.into();
        self
    }

    /// Whether both client credentials are present.
    pub(crate) fn has_credentials(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

// =============================================================================
// Token Types
// =============================================================================

/// Response from the token endpoint (code exchange or refresh).
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Present on code exchange; optional on refresh (providers may rotate it)
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Access token validity in seconds
    pub expires_in: u64,
}

/// Error body returned by the token endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenErrorBody {
    pub error: Option<String>,
    pub error_description: Option<String>,
}

// =============================================================================
// Playback Types
// =============================================================================

/// Response from `GET /me/player/currently-playing`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CurrentlyPlaying {
    #[serde(default)]
    pub is_playing: bool,
    #[serde(default)]
    pub item: Option<TrackInfo>,
    #[serde(default)]
    pub progress_ms: Option<u64>,
}

/// Response from `GET /me/player`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaybackState {
    #[serde(default)]
    pub is_playing: bool,
    #[serde(default)]
    pub item: Option<TrackInfo>,
    #[serde(default)]
    pub progress_ms: Option<u64>,
    #[serde(default)]
    pub device: Option<Device>,
}

/// Playback device as reported by the API.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Device {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub volume_percent: Option<u32>,
}

/// A track as returned by the API.
///
/// This is a passthrough of the provider's representation; fields the
/// provider omits deserialize to their defaults and unknown fields are
/// ignored, nothing is validated.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackInfo {
    /// Absent for local files
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ArtistInfo>,
    #[serde(default)]
    pub album: Option<AlbumInfo>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
}

impl TrackInfo {
    /// Joined artist names for display.
    pub fn artist_names(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Artist as returned by the API.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtistInfo {
    pub name: String,
}

/// Album as returned by the API.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AlbumInfo {
    pub name: String,
    #[serde(default)]
    pub images: Vec<ImageInfo>,
}

/// Album art image.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImageInfo {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// What is playing right now, recomputed on each poll. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct PlaybackSnapshot {
    pub track: Option<TrackInfo>,
    pub is_playing: bool,
}

impl From<Option<CurrentlyPlaying>> for PlaybackSnapshot {
    fn from(current: Option<CurrentlyPlaying>) -> Self {
        match current {
            Some(current) => Self {
                track: current.item,
                is_playing: current.is_playing,
            },
            // 204 from the API: nothing currently playing
            None => Self::default(),
        }
    }
}
