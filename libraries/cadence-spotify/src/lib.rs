//! Cadence Spotify Client
//!
//! Client library for the Spotify Web API playback surface.
//!
//! # Features
//!
//! - **Authentication**: authorization-code exchange, token refresh,
//!   authorize-URL builder
//! - **Token storage**: explicit, injectable store with pluggable durable
//!   persistence (file-backed or in-memory)
//! - **Playback**: currently-playing, playback state, play, pause and skip,
//!   all behind an authenticated wrapper with a single refresh-then-retry
//!   on 401
//!
//! # Example
//!
//! ```ignore
//! use cadence_spotify::{SpotifyClient, SpotifyConfig, TokenStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SpotifyConfig::new(client_id, client_secret, redirect_uri);
//!     let store = Arc::new(TokenStore::in_memory());
//!     let client = SpotifyClient::new(config, store)?;
//!
//!     println!("Visit: {}", client.authorize_url(None)?);
//!     client.login_with_code("<code from callback>").await?;
//!
//!     let snapshot = client.snapshot().await?;
//!     match snapshot.track {
//!         Some(track) => println!("Now playing: {}", track.name),
//!         None => println!("Nothing playing"),
//!     }
//!
//!     Ok(())
//! }
//! ```

mod auth;
mod client;
mod error;
mod store;
mod types;

// Re-export main types
pub use client::SpotifyClient;
pub use error::{Result, SpotifyClientError};
pub use store::{CredentialPair, FilePersistence, MemoryPersistence, TokenPersistence, TokenStore};
pub use types::{
    AlbumInfo, ArtistInfo, CurrentlyPlaying, Device, ImageInfo, PlaybackSnapshot, PlaybackState,
    SpotifyConfig, TokenResponse, TrackInfo, DEFAULT_ACCOUNTS_URL, DEFAULT_API_URL,
};

// Re-export auth operations for direct use if needed
pub use auth::{authorize_url, AuthClient, DEFAULT_SCOPES};
