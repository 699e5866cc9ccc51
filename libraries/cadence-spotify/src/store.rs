//! Token storage: in-memory credential pair hydrated from durable storage.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// The stored credential pair.
///
/// The refresh token, once set, is retained until explicit logout even when
/// the access token is replaced.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CredentialPair {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

/// Durable storage for the credential pair.
///
/// Writes are last-write-wins with no cross-process coordination.
pub trait TokenPersistence: Send + Sync {
    /// Load the persisted pair, or an empty pair if none exists.
    fn load(&self) -> io::Result<CredentialPair>;

    /// Overwrite the persisted pair.
    fn save(&self, tokens: &CredentialPair) -> io::Result<()>;

    /// Remove the persisted pair.
    fn clear(&self) -> io::Result<()>;
}

/// Persistence that keeps nothing (tests, short-lived embedding).
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryPersistence;

impl TokenPersistence for MemoryPersistence {
    fn load(&self) -> io::Result<CredentialPair> {
        Ok(CredentialPair::default())
    }

    fn save(&self, _tokens: &CredentialPair) -> io::Result<()> {
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        Ok(())
    }
}

/// JSON-file persistence for the credential pair.
#[derive(Debug, Clone)]
pub struct FilePersistence {
    path: PathBuf,
}

impl FilePersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenPersistence for FilePersistence {
    fn load(&self) -> io::Result<CredentialPair> {
        if !self.path.exists() {
            return Ok(CredentialPair::default());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        serde_json::from_str(&contents)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn save(&self, tokens: &CredentialPair) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let serialized = serde_json::to_string(tokens)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        std::fs::write(&self.path, serialized)
    }

    fn clear(&self) -> io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// Holds the access and refresh tokens for one session.
///
/// Reads serve the in-memory pair, hydrated from durable storage at
/// construction; every write goes to both. Persistence failures are logged
/// and not escalated; the in-memory pair stays authoritative.
pub struct TokenStore {
    tokens: RwLock<CredentialPair>,
    persistence: Box<dyn TokenPersistence>,
}

impl TokenStore {
    /// Create a store hydrated from the given durable storage.
    pub fn new(persistence: Box<dyn TokenPersistence>) -> Self {
        let tokens = match persistence.load() {
            Ok(tokens) => tokens,
            Err(e) => {
                warn!(error = %e, "Failed to load persisted tokens, starting empty");
                CredentialPair::default()
            }
        };
        Self {
            tokens: RwLock::new(tokens),
            persistence,
        }
    }

    /// Create an in-memory store with no durable storage.
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryPersistence))
    }

    /// Create an in-memory store seeded with tokens (e.g. from elsewhere).
    pub fn with_tokens(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            tokens: RwLock::new(CredentialPair {
                access_token: Some(access_token.into()),
                refresh_token,
            }),
            persistence: Box::new(MemoryPersistence),
        }
    }

    /// Current credential pair.
    pub async fn get(&self) -> CredentialPair {
        self.tokens.read().await.clone()
    }

    /// Current access token, if any.
    pub async fn access_token(&self) -> Option<String> {
        self.tokens.read().await.access_token.clone()
    }

    /// Current refresh token, if any.
    pub async fn refresh_token(&self) -> Option<String> {
        self.tokens.read().await.refresh_token.clone()
    }

    /// Overwrite the access token in memory and durable storage.
    pub async fn set_access_token(&self, token: impl Into<String>) {
        let snapshot = {
            let mut tokens = self.tokens.write().await;
            tokens.access_token = Some(token.into());
            tokens.clone()
        };
        self.persist(&snapshot);
    }

    /// Overwrite the refresh token in memory and durable storage.
    pub async fn set_refresh_token(&self, token: impl Into<String>) {
        let snapshot = {
            let mut tokens = self.tokens.write().await;
            tokens.refresh_token = Some(token.into());
            tokens.clone()
        };
        self.persist(&snapshot);
    }

    /// Store a new access token and, only when given, a new refresh token.
    ///
    /// A `None` refresh token leaves the previously stored one untouched.
    pub async fn set_tokens(&self, access_token: String, refresh_token: Option<String>) {
        let snapshot = {
            let mut tokens = self.tokens.write().await;
            tokens.access_token = Some(access_token);
            if let Some(refresh_token) = refresh_token {
                tokens.refresh_token = Some(refresh_token);
            }
            tokens.clone()
        };
        self.persist(&snapshot);
    }

    /// Remove both tokens from memory and durable storage (logout).
    ///
    /// Idempotent.
    pub async fn clear(&self) {
        {
            let mut tokens = self.tokens.write().await;
            *tokens = CredentialPair::default();
        }
        if let Err(e) = self.persistence.clear() {
            warn!(error = %e, "Failed to clear persisted tokens");
        }
        debug!("Token store cleared");
    }

    // File writes stay off the lock: callers snapshot the pair and drop the
    // write guard before calling this.
    fn persist(&self, tokens: &CredentialPair) {
        if let Err(e) = self.persistence.save(tokens) {
            warn!(error = %e, "Failed to persist tokens");
        }
    }
}
