use std::sync::Arc;

use futures::stream::{self, StreamExt};
use reqwest::{Client, StatusCode};

use crate::{
    error::{AppError, Result},
    spotify::SpotifyApi,
    types::{
        AddTrackToPlaylistRequest, CreatePlaylistRequest, CreatePlaylistResponse, Playlist,
        SearchResponse, SongRequest, TrackMatch,
    },
    utils,
};

pub const PLAYLIST_DESCRIPTION: &str = "Created with Spotify Playlist Maker";

/// Builds the Spotify search query for a song.
///
/// The query is `track:<song>`, suffixed with ` artist:<artist>` only when an
/// artist is given and not blank.
///
/// # Example
///
/// ```
/// use playlist_maker::spotify::build_search_query;
///
/// assert_eq!(build_search_query("Hey Jude", Some("The Beatles")), "track:Hey Jude artist:The Beatles");
/// assert_eq!(build_search_query("Hey Jude", None), "track:Hey Jude");
/// ```
pub fn build_search_query(song: &str, artist: Option<&str>) -> String {
    let mut query = format!("track:{}", song.trim());
    if let Some(artist) = artist.map(str::trim).filter(|a| !a.is_empty()) {
        query.push_str(&format!(" artist:{artist}"));
    }
    query
}

#[derive(Debug, Clone)]
pub struct PlaylistClient {
    http: Client,
    api_url: String,
}

impl PlaylistClient {
    pub fn new(http: Client, api_url: String) -> Self {
        PlaylistClient { http, api_url }
    }

    /// Creates a new private playlist owned by `owner_id`.
    ///
    /// Posts the name, a fixed description and `public: false` to
    /// `/users/{owner_id}/playlists`.
    ///
    /// # Errors
    ///
    /// - [`AppError::PlaylistCreate`] when Spotify answers with anything but 201
    /// - [`AppError::Upstream`] on timeout, transport failure or an unreadable body
    pub async fn create_playlist(
        &self,
        access_token: &str,
        owner_id: &str,
        name: &str,
    ) -> Result<Playlist> {
        let payload = CreatePlaylistRequest {
            name: name.to_string(),
            description: PLAYLIST_DESCRIPTION.to_string(),
            public: false,
        };

        let res = self
            .http
            .post(format!("{}/users/{}/playlists", self.api_url, owner_id))
            .bearer_auth(access_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::from_transport(&e))?;

        let status = res.status();
        if status != StatusCode::CREATED {
            let body = res.text().await.unwrap_or_default();
            tracing::error!(
                "Failed to create playlist: {} {}",
                status,
                utils::truncate_body(&body, 512)
            );
            return Err(AppError::PlaylistCreate { status });
        }

        let created = res
            .json::<CreatePlaylistResponse>()
            .await
            .map_err(|e| AppError::from_transport(&e))?;

        Ok(Playlist {
            url: utils::playlist_url(&created.id),
            id: created.id,
        })
    }

    /// Searches for the best matching track; only the first result is asked for.
    ///
    /// # Errors
    ///
    /// [`AppError::Upstream`] on a non-200 status, timeout or transport failure.
    pub async fn search_track(&self, access_token: &str, query: &str) -> Result<Option<TrackMatch>> {
        let res = self
            .http
            .get(format!("{}/search", self.api_url))
            .bearer_auth(access_token)
            .query(&[("q", query), ("type", "track"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| AppError::from_transport(&e))?;

        let status = res.status();
        if status != StatusCode::OK {
            let body = res.text().await.unwrap_or_default();
            return Err(AppError::Upstream {
                status,
                body: utils::truncate_body(&body, 512),
            });
        }

        let found = res
            .json::<SearchResponse>()
            .await
            .map_err(|e| AppError::from_transport(&e))?;

        Ok(found
            .tracks
            .and_then(|page| page.items.into_iter().next())
            .map(|track| TrackMatch { uri: track.uri }))
    }

    /// Appends tracks to a playlist, keeping the given order.
    ///
    /// Nothing is sent when `uris` is empty.
    ///
    /// # Errors
    ///
    /// - [`AppError::TrackAdd`] when Spotify answers with anything but 201
    /// - [`AppError::Upstream`] on timeout or transport failure
    pub async fn add_tracks(&self, access_token: &str, playlist_id: &str, uris: &[String]) -> Result<()> {
        if uris.is_empty() {
            return Ok(());
        }

        let res = self
            .http
            .post(format!("{}/playlists/{}/tracks", self.api_url, playlist_id))
            .bearer_auth(access_token)
            .json(&AddTrackToPlaylistRequest {
                uris: uris.to_vec(),
            })
            .send()
            .await
            .map_err(|e| AppError::from_transport(&e))?;

        let status = res.status();
        if status != StatusCode::CREATED {
            let body = res.text().await.unwrap_or_default();
            tracing::error!(
                "Failed to add tracks to playlist: {} {}",
                status,
                utils::truncate_body(&body, 512)
            );
            return Err(AppError::TrackAdd { status });
        }

        Ok(())
    }
}

/// Assembles a playlist from a list of song requests.
#[derive(Clone)]
pub struct PlaylistBuilder {
    api: Arc<dyn SpotifyApi>,
    search_concurrency: usize,
}

impl std::fmt::Debug for PlaylistBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaylistBuilder")
            .field("search_concurrency", &self.search_concurrency)
            .finish_non_exhaustive()
    }
}

impl PlaylistBuilder {
    pub fn new(api: Arc<dyn SpotifyApi>, search_concurrency: usize) -> Self {
        PlaylistBuilder {
            api,
            search_concurrency: search_concurrency.max(1),
        }
    }

    /// Looks up the best matching track for a single song.
    ///
    /// Failures are logged and reported as no match so that one bad title
    /// cannot abort the whole playlist. Songs with a blank title are skipped
    /// without calling Spotify.
    pub async fn match_track(
        &self,
        access_token: &str,
        song: &str,
        artist: Option<&str>,
    ) -> Option<TrackMatch> {
        if song.trim().is_empty() {
            return None;
        }

        let query = build_search_query(song, artist);
        match self.api.search_track(access_token, &query).await {
            Ok(Some(track)) => Some(track),
            Ok(None) => {
                tracing::debug!("No match for {:?}", query);
                None
            }
            Err(e) => {
                tracing::warn!("Search for {:?} failed: {}", query, e);
                None
            }
        }
    }

    /// Creates a playlist named `name` and fills it with the best match for
    /// every song.
    ///
    /// Steps:
    /// 1. resolve the current user id
    /// 2. create the (private) playlist
    /// 3. search every song; searches run concurrently but the matched URIs
    ///    keep the input order, without dedup
    /// 4. append the matched URIs, skipped when nothing matched
    ///
    /// # Errors
    ///
    /// Profile, creation and track-add failures are returned as is. When adding
    /// tracks fails the created playlist is left behind empty.
    pub async fn build_playlist(
        &self,
        access_token: &str,
        songs: &[SongRequest],
        name: &str,
    ) -> Result<Playlist> {
        let user = self.api.fetch_profile(access_token).await?;
        let playlist = self.api.create_playlist(access_token, &user.id, name).await?;
        tracing::info!("Created playlist {} for user {}", playlist.id, user.id);

        let lookups: Vec<_> = songs
            .iter()
            .map(|req| self.match_track(access_token, &req.song, req.artist.as_deref()))
            .collect();

        // `buffered` yields results in input order regardless of completion order.
        let matches: Vec<Option<TrackMatch>> = stream::iter(lookups)
            .buffered(self.search_concurrency)
            .collect()
            .await;
        let uris: Vec<String> = matches.into_iter().flatten().map(|t| t.uri).collect();

        tracing::debug!("Matched {} of {} songs", uris.len(), songs.len());

        if !uris.is_empty() {
            self.api.add_tracks(access_token, &playlist.id, &uris).await?;
        }

        Ok(playlist)
    }
}
