//! Background music library.
//!
//! A shared pool of reusable music files. Selection is a non-mutating
//! random pick from the directory listing, so concurrent runs need no
//! locking; the chosen file is read by FFmpeg, never modified or deleted.

use rand::seq::SliceRandom;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File extensions considered playable music tracks.
const MUSIC_EXTENSIONS: &[&str] = &["mp3", "m4a", "wav", "aac"];

/// Read-only pool of background music tracks.
#[derive(Debug, Clone)]
pub struct MusicLibrary {
    dir: PathBuf,
}

impl MusicLibrary {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Pick one track at random, or `None` when the pool is empty or the
    /// directory is missing. Absence of music is never an error.
    pub async fn pick(&self) -> Option<PathBuf> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) => {
                debug!(
                    "Music directory {} unavailable, continuing without music: {}",
                    self.dir.display(),
                    e
                );
                return None;
            }
        };

        let mut tracks: Vec<PathBuf> = Vec::new();
        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => {
                    let path = entry.path();
                    if is_music_file(&path) {
                        tracks.push(path);
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("Failed reading music directory entry: {}", e);
                    break;
                }
            }
        }

        let picked = tracks.choose(&mut rand::thread_rng()).cloned();
        match &picked {
            Some(track) => debug!("Picked music track {}", track.display()),
            None => debug!("Music pool at {} is empty", self.dir.display()),
        }
        picked
    }
}

fn is_music_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| MUSIC_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_pick_from_populated_pool() {
        let dir = TempDir::new().unwrap();
        tokio::fs::write(dir.path().join("track.mp3"), b"x")
            .await
            .unwrap();
        tokio::fs::write(dir.path().join("notes.txt"), b"x")
            .await
            .unwrap();

        let library = MusicLibrary::new(dir.path());
        let picked = library.pick().await.unwrap();
        assert_eq!(picked.extension().unwrap(), "mp3");
    }

    #[tokio::test]
    async fn test_pick_empty_pool_is_none() {
        let dir = TempDir::new().unwrap();
        let library = MusicLibrary::new(dir.path());
        assert!(library.pick().await.is_none());
    }

    #[tokio::test]
    async fn test_pick_missing_directory_is_none() {
        let library = MusicLibrary::new("/nonexistent/music");
        assert!(library.pick().await.is_none());
    }

    #[test]
    fn test_is_music_file() {
        assert!(is_music_file(Path::new("/a/track.MP3")));
        assert!(is_music_file(Path::new("/a/track.wav")));
        assert!(!is_music_file(Path::new("/a/readme.md")));
        assert!(!is_music_file(Path::new("/a/noext")));
    }
}
