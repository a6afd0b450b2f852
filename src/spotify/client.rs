use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::Mutex;

use crate::{
    config,
    error::ApiError,
    management::TokenManager,
    types::{
        AddTrackToPlaylistRequest, AddTrackToPlaylistResponse, CreatePlaylistRequest,
        CreatePlaylistResponse, CurrentUserResponse, Cursor, GetUserPlaylistsResponse, Page,
        Playlist, PlaylistRef, SavedTrack, SavedTracksResponse,
    },
};

use super::SpotifyApi;

/// Page size used when listing saved tracks.
pub const SAVED_TRACKS_PAGE_SIZE: u32 = 20;
/// Page size used when listing playlists.
pub const PLAYLISTS_PAGE_SIZE: u32 = 50;

/// [`SpotifyApi`] over the Spotify Web API.
///
/// Every call fetches a valid access token from the wrapped [`TokenManager`]
/// first, so a long ingestion run survives token expiry. Calls are never
/// retried here.
pub struct SpotifyClient {
    http: Client,
    base_url: String,
    tokens: Mutex<TokenManager>,
}

impl SpotifyClient {
    pub fn new(tokens: TokenManager, base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens: Mutex::new(tokens),
        }
    }

    /// Client using the cached token and the configured API URL.
    pub async fn from_cache() -> Result<Self, String> {
        let tokens = TokenManager::load()
            .await
            .map_err(|e| format!("Failed to load token. Please run likesync auth\n Error: {}", e))?;
        Ok(Self::new(tokens, config::spotify_apiurl()))
    }

    async fn token(&self) -> Result<String, ApiError> {
        self.tokens.lock().await.get_valid_token().await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let token = self.token().await?;
        tracing::debug!(%url, "GET");
        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.to_string(),
                source,
            })?;

        decode(url, check_status(url, response).await?).await
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let token = self.token().await?;
        tracing::debug!(%url, "POST");
        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.to_string(),
                source,
            })?;

        decode(url, check_status(url, response).await?).await
    }
}

#[async_trait]
impl SpotifyApi for SpotifyClient {
    async fn list_saved_tracks(&self, cursor: Option<&Cursor>) -> Result<Page<SavedTrack>, ApiError> {
        let url = match cursor {
            Some(cursor) => cursor.as_str().to_string(),
            None => format!(
                "{uri}/me/tracks?limit={limit}",
                uri = self.base_url,
                limit = SAVED_TRACKS_PAGE_SIZE
            ),
        };

        let res: SavedTracksResponse = self.get_json(&url).await?;
        Ok(Page {
            items: res.items,
            next: res.next.map(Cursor::new),
        })
    }

    async fn list_playlists(&self, cursor: Option<&Cursor>) -> Result<Page<Playlist>, ApiError> {
        let url = match cursor {
            Some(cursor) => cursor.as_str().to_string(),
            None => format!(
                "{uri}/me/playlists?limit={limit}",
                uri = self.base_url,
                limit = PLAYLISTS_PAGE_SIZE
            ),
        };

        let res: GetUserPlaylistsResponse = self.get_json(&url).await?;
        Ok(Page {
            items: res.items.into_iter().flatten().collect(),
            next: res.next.map(Cursor::new),
        })
    }

    async fn create_playlist(
        &self,
        owner_id: &str,
        name: &str,
        public: bool,
    ) -> Result<PlaylistRef, ApiError> {
        let url = format!(
            "{uri}/users/{user_id}/playlists",
            uri = self.base_url,
            user_id = owner_id
        );
        let body = CreatePlaylistRequest {
            name: name.to_string(),
            description: String::new(),
            public,
            collaborative: false,
        };

        let res: CreatePlaylistResponse = self.post_json(&url, &body).await?;
        Ok(PlaylistRef {
            id: res.id,
            name: res.name,
        })
    }

    async fn append_track(&self, playlist_id: &str, track_id: &str) -> Result<(), ApiError> {
        let url = format!(
            "{uri}/playlists/{playlist_id}/tracks",
            uri = self.base_url,
            playlist_id = playlist_id
        );
        let body = AddTrackToPlaylistRequest {
            uris: vec![format!("spotify:track:{}", track_id)],
        };

        let _: AddTrackToPlaylistResponse = self.post_json(&url, &body).await?;
        Ok(())
    }

    async fn current_user_id(&self) -> Result<String, ApiError> {
        let url = format!("{uri}/me", uri = self.base_url);
        let res: CurrentUserResponse = self.get_json(&url).await?;
        Ok(res.id)
    }
}

async fn check_status(url: &str, response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    // Spotify wraps failures as {"error": {"status": .., "message": ..}}.
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or(body);

    Err(ApiError::Status {
        url: url.to_string(),
        status,
        message,
    })
}

async fn decode<T: DeserializeOwned>(url: &str, response: Response) -> Result<T, ApiError> {
    response.json::<T>().await.map_err(|source| ApiError::Decode {
        url: url.to_string(),
        source,
    })
}
