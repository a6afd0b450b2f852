//! Configuration management for the liked tracks sync.
//!
//! This module handles loading and accessing configuration values from environment
//! variables and `.env` files. It provides a centralized way to manage application
//! configuration including Spotify API credentials, endpoints, server settings and
//! the on-disk data directory.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory, then in the working directory
//! 3. Application defaults (where applicable)

use std::{env, path::PathBuf};

use crate::error::ConfigError;

/// Name of the directory under the platform data dir holding all state.
pub const APP_DIR: &str = "likesync";

/// Every capability the application needs from Spotify, enumerated once.
///
/// Reading saved tracks for ingestion, reading the user's private and
/// collaborative playlists for reconciliation, and creating/modifying
/// private and public playlists.
pub const SPOTIFY_SCOPES: &[&str] = &[
    "user-library-read",
    "playlist-read-private",
    "playlist-read-collaborative",
    "playlist-modify-private",
    "playlist-modify-public",
];

const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";
const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Loads environment variables from a `.env` file.
///
/// Looks for `.env` in the platform-specific local data directory first:
/// - Linux: `~/.local/share/likesync/.env`
/// - macOS: `~/Library/Application Support/likesync/.env`
/// - Windows: `%LOCALAPPDATA%/likesync/.env`
///
/// When that file does not exist a `.env` in the working directory is tried.
/// A missing file is not an error, real environment variables may already
/// carry everything.
///
/// # Errors
///
/// Returns an error if the data directory cannot be created or an existing
/// `.env` file cannot be parsed.
pub async fn load_env() -> Result<(), ConfigError> {
    let dir = data_dir();
    async_fs::create_dir_all(&dir)
        .await
        .map_err(|source| ConfigError::Io {
            path: dir.clone(),
            source,
        })?;

    let path = dir.join(".env");
    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| ConfigError::Dotenv(e.to_string()))?;
        return Ok(());
    }

    match dotenv::dotenv() {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(ConfigError::Dotenv(e.to_string())),
    }
}

/// Root directory for tokens, snapshots and other local state.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path
}

/// Default directory snapshots are written to and looked up from.
pub fn snapshot_dir() -> PathBuf {
    data_dir().join("snapshots")
}

/// Returns the server address for the local OAuth callback server.
///
/// Reads `SERVER_ADDRESS`, e.g. `127.0.0.1:8888`.
pub fn server_addr() -> String {
    var_or("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS)
}

/// Returns the Spotify API client ID (`SPOTIFY_API_AUTH_CLIENT_ID`).
///
/// # Errors
///
/// Returns [`ConfigError::Missing`] if the variable is not set.
pub fn spotify_client_id() -> Result<String, ConfigError> {
    var("SPOTIFY_API_AUTH_CLIENT_ID")
}

/// Returns the Spotify OAuth redirect URI (`SPOTIFY_API_REDIRECT_URI`).
///
/// This must match the redirect URI registered in the Spotify application
/// settings and point at the local callback server.
///
/// # Errors
///
/// Returns [`ConfigError::Missing`] if the variable is not set.
pub fn spotify_redirect_uri() -> Result<String, ConfigError> {
    var("SPOTIFY_API_REDIRECT_URI")
}

/// Space separated scope string built from [`SPOTIFY_SCOPES`].
pub fn spotify_scope() -> String {
    SPOTIFY_SCOPES.join(" ")
}

/// Returns the Spotify OAuth authorization URL (`SPOTIFY_API_AUTH_URL`).
pub fn spotify_apiauth_url() -> String {
    var_or("SPOTIFY_API_AUTH_URL", DEFAULT_AUTH_URL)
}

/// Returns the Spotify Web API base URL (`SPOTIFY_API_URL`).
pub fn spotify_apiurl() -> String {
    var_or("SPOTIFY_API_URL", DEFAULT_API_URL)
}

/// Returns the Spotify OAuth token exchange URL (`SPOTIFY_API_TOKEN_URL`).
pub fn spotify_apitoken_url() -> String {
    var_or("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL)
}

fn var(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name)),
    }
}

fn var_or(name: &'static str, default: &str) -> String {
    var(name).unwrap_or_else(|_| default.to_string())
}
