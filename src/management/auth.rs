use std::path::PathBuf;

use chrono::Utc;
use reqwest::Client;

use crate::{config, error::ApiError, types::Token};

/// Seconds before expiry at which the access token is refreshed.
const EXPIRY_MARGIN_SECS: u64 = 240;

/// Cached OAuth token, stored as JSON in the data directory.
pub struct TokenManager {
    token: Token,
    path: PathBuf,
}

impl TokenManager {
    pub fn new(token: Token) -> Self {
        TokenManager {
            token,
            path: Self::default_path(),
        }
    }

    /// Caches the token at `path` instead of the data directory.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    pub async fn load() -> Result<Self, String> {
        let path = Self::default_path();
        let content = async_fs::read_to_string(&path)
            .await
            .map_err(|e| format!("{}: {}", path.display(), e))?;
        let token: Token = serde_json::from_str(&content).map_err(|e| e.to_string())?;
        Ok(Self { token, path })
    }

    pub async fn persist(&self) -> Result<(), String> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(&self.token).map_err(|e| e.to_string())?;
        async_fs::write(&self.path, json)
            .await
            .map_err(|e| e.to_string())
    }

    /// Returns an access token, refreshing and re-persisting it when close to expiry.
    pub async fn get_valid_token(&mut self) -> Result<String, ApiError> {
        if self.is_expired() {
            let refreshed = self.refresh_token().await.map_err(ApiError::Token)?;
            self.token = refreshed;
            if let Err(e) = self.persist().await {
                tracing::warn!(error = %e, "refreshed token could not be cached");
            }
        }

        Ok(self.token.access_token.clone())
    }

    fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp() as u64;
        now + EXPIRY_MARGIN_SECS >= self.token.obtained_at + self.token.expires_in
    }

    async fn refresh_token(&self) -> Result<Token, String> {
        let client_id = config::spotify_client_id().map_err(|e| e.to_string())?;
        let res = Client::new()
            .post(config::spotify_apitoken_url())
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", self.token.refresh_token.as_str()),
                ("client_id", client_id.as_str()),
            ])
            .send()
            .await
            .map_err(|e| e.to_string())?
            .error_for_status()
            .map_err(|e| format!("refresh rejected, run likesync auth again: {}", e))?;

        let json: serde_json::Value = res.json().await.map_err(|e| e.to_string())?;
        let access_token = json["access_token"]
            .as_str()
            .ok_or("refresh response without access_token")?
            .to_string();

        Ok(Token {
            access_token,
            // Spotify may omit the refresh token, the old one stays valid then.
            refresh_token: json["refresh_token"]
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| self.token.refresh_token.clone()),
            scope: json["scope"].as_str().unwrap_or_default().to_string(),
            expires_in: json["expires_in"].as_u64().unwrap_or(3600),
            obtained_at: Utc::now().timestamp() as u64,
        })
    }

    fn default_path() -> PathBuf {
        config::data_dir().join("cache/token.json")
    }
}
