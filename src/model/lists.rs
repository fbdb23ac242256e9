//! Recently-played and favorites lists
//!
//! Both are plain in-memory sequences; persistence is handled by the
//! coordinator through [`crate::store::PersistedLists`].

use super::song::{Song, SongId};

pub const RECENTLY_PLAYED_LIMIT: usize = 50;

/// Most-recent-first, id-deduplicated, bounded to [`RECENTLY_PLAYED_LIMIT`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecentlyPlayed {
    songs: Vec<Song>,
}

impl RecentlyPlayed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the list from stored data, re-establishing the invariants in
    /// case the stored array was edited or written by an older version.
    pub fn from_stored(stored: Vec<Song>) -> Self {
        let mut list = Self::new();
        for song in stored.into_iter().rev() {
            list.record(song);
        }
        list
    }

    /// Moves `song` to the front, inserting it if absent.
    pub fn record(&mut self, song: Song) {
        self.songs.retain(|s| s.id != song.id);
        self.songs.insert(0, song);
        self.songs.truncate(RECENTLY_PLAYED_LIMIT);
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }
}

/// Favorited songs, unique by id. New favorites go to the front.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Favorites {
    songs: Vec<Song>,
}

impl Favorites {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_stored(stored: Vec<Song>) -> Self {
        let mut list = Self::new();
        for song in stored.into_iter().rev() {
            list.add(song);
        }
        list
    }

    /// Returns `false` if the song was already a favorite.
    pub fn add(&mut self, song: Song) -> bool {
        if self.contains(&song.id) {
            return false;
        }
        self.songs.insert(0, song);
        true
    }

    /// Returns `false` if nothing was removed.
    pub fn remove(&mut self, id: &SongId) -> bool {
        let before = self.songs.len();
        self.songs.retain(|s| &s.id != id);
        self.songs.len() != before
    }

    pub fn contains(&self, id: &SongId) -> bool {
        self.songs.iter().any(|s| &s.id == id)
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(n: usize) -> Song {
        Song::new(format!("song-{}", n), format!("Song {}", n), format!("/music/{}.mp3", n))
    }

    #[test]
    fn test_recently_played_keeps_fifty_most_recent_first() {
        let mut recent = RecentlyPlayed::new();
        for n in 0..60 {
            recent.record(song(n));
        }

        assert_eq!(recent.len(), RECENTLY_PLAYED_LIMIT);
        let ids: Vec<&str> = recent.songs().iter().map(|s| s.id.as_str()).collect();
        let expected: Vec<String> = (10..60).rev().map(|n| format!("song-{}", n)).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_rerecording_moves_to_front_without_growing() {
        let mut recent = RecentlyPlayed::new();
        recent.record(song(1));
        recent.record(song(2));
        recent.record(song(3));

        recent.record(song(1));

        assert_eq!(recent.len(), 3);
        assert_eq!(recent.songs()[0].id.as_str(), "song-1");
        assert_eq!(recent.songs()[1].id.as_str(), "song-3");
    }

    #[test]
    fn test_from_stored_drops_duplicates_and_overflow() {
        let mut stored: Vec<Song> = (0..55).map(song).collect();
        stored.push(song(0));

        let recent = RecentlyPlayed::from_stored(stored);
        assert_eq!(recent.len(), RECENTLY_PLAYED_LIMIT);
        assert_eq!(recent.songs()[0].id.as_str(), "song-0");
    }

    #[test]
    fn test_favorites_add_remove_and_dedup() {
        let mut favorites = Favorites::new();
        assert!(favorites.add(song(1)));
        assert!(!favorites.add(song(1)));
        assert_eq!(favorites.len(), 1);
        assert!(favorites.contains(&song(1).id));

        assert!(favorites.remove(&song(1).id));
        assert!(!favorites.contains(&song(1).id));
        assert!(!favorites.remove(&song(1).id));
    }
}
