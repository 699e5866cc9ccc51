//! Cadence - terminal Spotify playback companion.

use cadence_spotify::{
    FilePersistence, PlaybackSnapshot, SpotifyClient, SpotifyClientError, SpotifyConfig,
    TokenStore,
};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;

use config::AppConfig;

#[derive(Parser)]
#[command(name = "cadence")]
#[command(about = "Spotify playback companion for the terminal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in: print the consent URL, or exchange a callback code
    Login {
        /// Authorization code from the redirect URI callback
        #[arg(long)]
        code: Option<String>,
    },
    /// Forget the stored tokens
    Logout,
    /// Show what is playing right now
    Status,
    /// Resume playback
    Play,
    /// Pause playback
    Pause,
    /// Skip to the next track
    Next,
    /// Skip to the previous track
    Previous,
    /// Poll the current track and print changes
    Watch {
        /// Poll interval in seconds
        #[arg(short, long, default_value_t = 5)]
        interval: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cadence=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = AppConfig::load()?;
    config.validate()?;

    let client = build_client(&config)?;

    match cli.command {
        Commands::Login { code } => login(&client, code.as_deref()).await?,
        Commands::Logout => {
            client.logout().await;
            println!("Logged out");
        }
        Commands::Status => {
            let snapshot = run_session(&client, client.snapshot()).await?;
            println!("{}", snapshot_line(&snapshot));
        }
        Commands::Play => {
            run_session(&client, client.play()).await?;
            println!("Playing");
        }
        Commands::Pause => {
            run_session(&client, client.pause()).await?;
            println!("Paused");
        }
        Commands::Next => {
            run_session(&client, client.next_track()).await?;
            println!("Skipped to next track");
        }
        Commands::Previous => {
            run_session(&client, client.previous_track()).await?;
            println!("Skipped to previous track");
        }
        Commands::Watch { interval } => watch(&client, interval).await?,
    }

    Ok(())
}

fn build_client(config: &AppConfig) -> anyhow::Result<SpotifyClient> {
    let token_file = config.token_file_path();
    tracing::debug!(path = %token_file.display(), "Using token file");

    let store = Arc::new(TokenStore::new(Box::new(FilePersistence::new(token_file))));
    let spotify_config = SpotifyConfig::new(
        config.client_id.clone(),
        config.client_secret.clone(),
        config.redirect_uri.clone(),
    );

    Ok(SpotifyClient::new(spotify_config, store)?)
}

async fn login(client: &SpotifyClient, code: Option<&str>) -> anyhow::Result<()> {
    match code {
        Some(code) => {
            client.login_with_code(code).await?;
            println!("Logged in, tokens stored");
        }
        None => {
            let url = client.authorize_url(None)?;
            println!("Open this URL in a browser and approve access:");
            println!("\n  {url}\n");
            println!("Then run: cadence login --code <code from the callback URL>");
        }
    }
    Ok(())
}

/// Run one operation on behalf of the session.
///
/// This call site owns the session state: an exhausted refresh clears the
/// stored tokens before surfacing the error.
async fn run_session<T>(
    client: &SpotifyClient,
    operation: impl std::future::Future<Output = Result<T, SpotifyClientError>>,
) -> anyhow::Result<T> {
    match operation.await {
        Ok(value) => Ok(value),
        Err(SpotifyClientError::RefreshFailed(reason)) => {
            tracing::warn!(reason = %reason, "Refresh exhausted, clearing session");
            client.logout().await;
            Err(anyhow::anyhow!("session expired; run `cadence login` again"))
        }
        Err(SpotifyClientError::NotAuthenticated) => {
            Err(anyhow::anyhow!("not logged in; run `cadence login` first"))
        }
        Err(e) => Err(e.into()),
    }
}

async fn watch(client: &SpotifyClient, interval_secs: u64) -> anyhow::Result<()> {
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
    let mut last_line = String::new();

    loop {
        ticker.tick().await;
        let snapshot = run_session(client, client.snapshot()).await?;
        let line = snapshot_line(&snapshot);
        if line != last_line {
            println!("{line}");
            last_line = line;
        }
    }
}

fn snapshot_line(snapshot: &PlaybackSnapshot) -> String {
    match &snapshot.track {
        Some(track) => {
            let marker = if snapshot.is_playing { "▶" } else { "⏸" };
            format!("{} {} — {}", marker, track.name, track.artist_names())
        }
        None => "Nothing playing".to_string(),
    }
}
