mod common;

use std::{sync::Arc, time::Duration};

use axum::http::StatusCode;
use playlist_maker::{
    error::AppError,
    spotify::{PlaylistBuilder, SpotifyApi, build_search_query},
    types::SongRequest,
};

use common::StubSpotify;

fn song(song: &str, artist: Option<&str>) -> SongRequest {
    SongRequest {
        song: song.to_string(),
        artist: artist.map(str::to_string),
    }
}

fn builder(stub: &Arc<StubSpotify>, concurrency: usize) -> PlaylistBuilder {
    PlaylistBuilder::new(Arc::clone(stub) as Arc<dyn SpotifyApi>, concurrency)
}

#[test]
fn test_build_search_query() {
    assert_eq!(
        build_search_query("Hey Jude", Some("The Beatles")),
        "track:Hey Jude artist:The Beatles"
    );
    assert_eq!(build_search_query("Hey Jude", None), "track:Hey Jude");
    assert_eq!(build_search_query("Hey Jude", Some("")), "track:Hey Jude");
    assert_eq!(build_search_query("Hey Jude", Some("   ")), "track:Hey Jude");
    assert_eq!(
        build_search_query(" Hey Jude ", Some(" The Beatles ")),
        "track:Hey Jude artist:The Beatles"
    );

    // Pure: same input, same output
    assert_eq!(
        build_search_query("Yesterday", Some("x")),
        build_search_query("Yesterday", Some("x"))
    );
}

#[tokio::test]
async fn test_matched_uris_follow_input_order() {
    // Earlier songs answer slower, so completion order is the reverse of input order.
    let mut stub = StubSpotify::new();
    for i in 0..6u64 {
        let query = format!("track:Song {i}");
        stub.catalog.insert(query.clone(), format!("spotify:track:{i}"));
        stub.delays
            .insert(query, Duration::from_millis(60 - i * 10));
    }
    let stub = Arc::new(stub);
    let songs: Vec<SongRequest> = (0..6).map(|i| song(&format!("Song {i}"), None)).collect();

    let playlist = builder(&stub, 6)
        .build_playlist("token", &songs, "Ordered")
        .await
        .unwrap();

    assert_eq!(playlist.url, "https://open.spotify.com/playlist/pl-1");
    let expected: Vec<String> = (0..6).map(|i| format!("spotify:track:{i}")).collect();
    assert_eq!(stub.add_calls(), vec![("pl-1".to_string(), expected)]);

    // the searches really overlapped
    let searches = stub.search_calls();
    assert_eq!(searches.first().map(String::as_str), Some("track:Song 5"));
}

#[tokio::test]
async fn test_duplicates_are_kept() {
    let stub = Arc::new(StubSpotify::new().with_track("track:Hey Jude", "spotify:track:1"));
    let songs = vec![song("Hey Jude", None), song("Hey Jude", None)];

    builder(&stub, 2)
        .build_playlist("token", &songs, "Twice")
        .await
        .unwrap();

    assert_eq!(
        stub.add_calls()[0].1,
        vec!["spotify:track:1".to_string(), "spotify:track:1".to_string()]
    );
}

#[tokio::test]
async fn test_no_matches_skips_add_tracks() {
    let stub = Arc::new(StubSpotify::new());
    let songs = vec![song("Nothing Here", Some("Nobody")), song("Also Missing", None)];

    let playlist = builder(&stub, 4)
        .build_playlist("token", &songs, "Empty")
        .await
        .unwrap();

    assert_eq!(playlist.id, "pl-1");
    assert_eq!(stub.search_calls().len(), 2);
    assert!(stub.add_calls().is_empty());
}

#[tokio::test]
async fn test_search_failure_is_treated_as_no_match() {
    let mut stub = StubSpotify::new()
        .with_track("track:First", "spotify:track:1")
        .with_track("track:Third", "spotify:track:3");
    stub.failing_queries.insert("track:Second".to_string());
    let stub = Arc::new(stub);
    let songs = vec![song("First", None), song("Second", None), song("Third", None)];

    builder(&stub, 1)
        .build_playlist("token", &songs, "Partial")
        .await
        .unwrap();

    assert_eq!(
        stub.add_calls()[0].1,
        vec!["spotify:track:1".to_string(), "spotify:track:3".to_string()]
    );
}

#[tokio::test]
async fn test_blank_song_is_skipped_without_search() {
    let stub = Arc::new(StubSpotify::new());
    let found = builder(&stub, 1).match_track("token", "   ", Some("Artist")).await;

    assert!(found.is_none());
    assert!(stub.search_calls().is_empty());
}

#[tokio::test]
async fn test_match_track_uses_artist_clause() {
    let stub = Arc::new(StubSpotify::new());
    let b = builder(&stub, 1);

    b.match_track("token", "Hey Jude", Some("The Beatles")).await;
    b.match_track("token", "Hey Jude", Some("")).await;
    b.match_track("token", "Hey Jude", None).await;

    assert_eq!(
        stub.search_calls(),
        vec![
            "track:Hey Jude artist:The Beatles".to_string(),
            "track:Hey Jude".to_string(),
            "track:Hey Jude".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_profile_failure_aborts_before_create() {
    let mut stub = StubSpotify::new();
    stub.profile_error = Some(StatusCode::UNAUTHORIZED);
    let stub = Arc::new(stub);

    let err = builder(&stub, 1)
        .build_playlist("token", &[song("Hey Jude", None)], "Nope")
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Upstream { status, .. } if status == StatusCode::UNAUTHORIZED));
    assert!(stub.created.lock().unwrap().is_empty());
    assert!(stub.search_calls().is_empty());
}

#[tokio::test]
async fn test_create_failure_propagates() {
    let mut stub = StubSpotify::new();
    stub.create_error = Some(StatusCode::FORBIDDEN);
    let stub = Arc::new(stub);

    let err = builder(&stub, 1)
        .build_playlist("token", &[song("Hey Jude", None)], "Nope")
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::PlaylistCreate { status } if status == StatusCode::FORBIDDEN));
    assert_eq!(err.status(), StatusCode::FORBIDDEN);
    assert!(stub.search_calls().is_empty());
}

#[tokio::test]
async fn test_track_add_failure_propagates() {
    let mut stub = StubSpotify::new().with_track("track:Hey Jude", "spotify:track:1");
    stub.add_error = Some(StatusCode::INTERNAL_SERVER_ERROR);
    let stub = Arc::new(stub);

    let err = builder(&stub, 1)
        .build_playlist("token", &[song("Hey Jude", None)], "Broken")
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::TrackAdd { .. }));
    assert_eq!(err.to_string(), "Failed to add tracks to playlist");
}
