//! Builds the song list the demo UI plays from.
//!
//! A path is either a JSON array of songs or a directory scanned for audio files.

use std::path::{Path, PathBuf};

use anyhow::Context;
use walkdir::WalkDir;

use crate::model::Song;

const AUDIO_EXTENSIONS: &[&str] = &["mp3", "flac", "ogg", "wav", "m4a", "aac", "opus"];

pub fn load_catalog(path: &Path) -> anyhow::Result<Vec<Song>> {
    if path.is_dir() {
        return scan_directory(path);
    }
    if has_extension(path, &["json"]) {
        return load_json(path);
    }
    if has_extension(path, AUDIO_EXTENSIONS) {
        return Ok(vec![song_from_path(path)]);
    }
    anyhow::bail!("{} is neither a directory, a JSON song list nor an audio file", path.display())
}

pub fn load_json(path: &Path) -> anyhow::Result<Vec<Song>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read song list {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("invalid song list {}", path.display()))
}

/// Recursively collects audio files, sorted by path.
pub fn scan_directory(root: &Path) -> anyhow::Result<Vec<Song>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(e).with_context(|| format!("failed to read {}", root.display()));
            }
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unreadable entry");
                continue;
            }
        };
        if entry.file_type().is_file() && has_extension(entry.path(), AUDIO_EXTENSIONS) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    tracing::info!(root = %root.display(), count = files.len(), "Scanned music directory");
    Ok(files.iter().map(|path| song_from_path(path)).collect())
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

/// The path doubles as the id. Titles come from the file stem; a parent
/// directory name is used as the album.
fn song_from_path(path: &Path) -> Song {
    let path: PathBuf = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    let uri = path.to_string_lossy().to_string();
    let title = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::trim)
        .filter(|stem| !stem.is_empty())
        .unwrap_or("Unknown title")
        .to_string();

    let song = Song::new(uri.clone(), title, uri);
    match path.parent().and_then(|p| p.file_name()).and_then(|n| n.to_str()) {
        Some(album) => song.with_album(album),
        None => song,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_scan_finds_audio_files_recursively() {
        let dir = tempfile::tempdir().unwrap();
        let album = dir.path().join("Hurry Up");
        std::fs::create_dir(&album).unwrap();
        std::fs::write(album.join("02 Wait.flac"), b"").unwrap();
        std::fs::write(album.join("01 Intro.MP3"), b"").unwrap();
        std::fs::write(dir.path().join("cover.jpg"), b"").unwrap();

        let songs = load_catalog(dir.path()).unwrap();

        let titles: Vec<&str> = songs.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["01 Intro", "02 Wait"]);
        assert_eq!(songs[0].album.as_deref(), Some("Hurry Up"));
        assert_eq!(songs[0].id.as_str(), songs[0].source_uri);
    }

    #[test]
    fn test_json_song_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("songs.json");
        std::fs::write(
            &path,
            r#"[{"id": 7, "title": "Midnight City", "artist": "M83", "file_url": "/m/7.mp3", "duration": "4:03"}]"#,
        )
        .unwrap();

        let songs = load_catalog(&path).unwrap();

        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].id.as_str(), "7");
        assert_eq!(songs[0].duration_hint_ms(), Some(243_000));
    }

    #[test]
    fn test_unknown_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();
        assert!(load_catalog(&path).is_err());
    }
}
