use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

use crate::types::Track;

pub const MAX_PLAYLIST_PAGE_SIZE: u32 = 50;

pub fn generate_code_verifier() -> String {
    random_string(128)
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Random `state` parameter for CSRF protection of the OAuth redirect.
pub fn generate_state() -> String {
    random_string(16)
}

fn random_string(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

pub fn clamp_limit(limit: i64) -> u32 {
    limit.clamp(1, MAX_PLAYLIST_PAGE_SIZE as i64) as u32
}

pub fn clamp_offset(offset: i64) -> u32 {
    offset.clamp(0, u32::MAX as i64) as u32
}

/// Free-text query used to find a track on YouTube: title followed by artists.
pub fn search_query(track: &Track) -> String {
    if track.artists.is_empty() {
        return track.name.clone();
    }
    format!("{} {}", track.name, track.artists.join(" "))
}

/// Human readable "title - artists" label for a track that could not be exported.
pub fn failure_note(track: &Track) -> String {
    format!("{} - {}", track.name, track.artists.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(name: &str, artists: &[&str]) -> Track {
        Track {
            name: name.to_string(),
            artists: artists.iter().map(|a| a.to_string()).collect(),
            album: String::new(),
            isrc: None,
            spotify_url: None,
        }
    }

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(0), 1);
        assert_eq!(clamp_limit(-4), 1);
        assert_eq!(clamp_limit(20), 20);
        assert_eq!(clamp_limit(500), 50);
    }

    #[test]
    fn test_clamp_offset() {
        assert_eq!(clamp_offset(-1), 0);
        assert_eq!(clamp_offset(120), 120);
    }

    #[test]
    fn test_search_query() {
        assert_eq!(search_query(&track("Song", &["A", "B"])), "Song A B");
        assert_eq!(search_query(&track("Lonely", &[])), "Lonely");
    }

    #[test]
    fn test_failure_note() {
        assert_eq!(failure_note(&track("Song", &["A", "B"])), "Song - A, B");
    }

    #[test]
    fn test_generate_state() {
        let state = generate_state();
        assert_eq!(state.len(), 16);
        assert!(state.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
