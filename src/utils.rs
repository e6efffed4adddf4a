use rand::{Rng, distr::Alphanumeric};

pub const PLAYLIST_WEB_URL: &str = "https://open.spotify.com/playlist";

/// Random alphanumeric string, used for session ids and OAuth `state` values.
pub fn generate_random_string(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

pub fn playlist_url(playlist_id: &str) -> String {
    format!("{PLAYLIST_WEB_URL}/{playlist_id}")
}

/// Cuts an upstream response body down to something reasonable for logs and
/// error messages.
pub fn truncate_body(body: &str, max: usize) -> String {
    if body.chars().count() <= max {
        return body.to_string();
    }
    let mut out: String = body.chars().take(max).collect();
    out.push('…');
    out
}
