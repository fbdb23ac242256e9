//! Recently-played and favorites operations
//!
//! The list lock is held across the write so rewrites land in mutation order.

use crate::model::{Song, SongId};

use super::PlaybackCoordinator;

impl PlaybackCoordinator {
    pub async fn add_to_recently_played(&self, song: Song) {
        let mut lists = self.shared.lists.lock().await;
        lists.recently_played.record(song);
        self.shared
            .persisted
            .save_recently_played(lists.recently_played.songs())
            .await;
    }

    pub async fn recently_played(&self) -> Vec<Song> {
        self.shared.lists.lock().await.recently_played.songs().to_vec()
    }

    pub async fn add_to_favorites(&self, song: Song) {
        let mut lists = self.shared.lists.lock().await;
        let song_id = song.id.clone();
        if !lists.favorites.add(song) {
            tracing::debug!(song_id = %song_id, "Song is already a favorite");
            return;
        }
        tracing::info!(song_id = %song_id, "Added to favorites");
        self.shared.persisted.save_favorites(lists.favorites.songs()).await;
    }

    pub async fn remove_from_favorites(&self, song_id: &SongId) {
        let mut lists = self.shared.lists.lock().await;
        if lists.favorites.remove(song_id) {
            tracing::info!(song_id = %song_id, "Removed from favorites");
        }
        self.shared.persisted.save_favorites(lists.favorites.songs()).await;
    }

    /// Adds or removes `song`; returns the new favorite status.
    pub async fn toggle_favorite(&self, song: Song) -> bool {
        if self.is_favorite(&song.id).await {
            self.remove_from_favorites(&song.id).await;
            false
        } else {
            self.add_to_favorites(song).await;
            true
        }
    }

    pub async fn is_favorite(&self, song_id: &SongId) -> bool {
        self.shared.lists.lock().await.favorites.contains(song_id)
    }

    pub async fn favorites(&self) -> Vec<Song> {
        self.shared.lists.lock().await.favorites.songs().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::model::{Song, RECENTLY_PLAYED_LIMIT};
    use std::sync::Arc;
    use std::time::Duration;

    use crate::audio::testing::ScriptedEngine;
    use crate::audio::AudioAdapter;
    use crate::controller::{CoordinatorOptions, PlaybackCoordinator};
    use crate::store::{JsonFileStore, KeyValueStore, MemoryStore, FAVORITES_KEY, RECENTLY_PLAYED_KEY};

    fn stored_ids(raw: Option<String>) -> Vec<String> {
        let songs: Vec<Song> = serde_json::from_str(&raw.unwrap_or_else(|| "[]".to_string())).unwrap();
        songs.into_iter().map(|s| s.id.to_string()).collect()
    }

    #[tokio::test]
    async fn test_favorites_add_check_remove() {
        let f = fixture().await;
        let a = song("a");

        f.coordinator.add_to_favorites(a.clone()).await;
        assert!(f.coordinator.is_favorite(&a.id).await);

        f.coordinator.add_to_favorites(a.clone()).await;
        assert_eq!(f.coordinator.favorites().await.len(), 1);

        f.coordinator.remove_from_favorites(&a.id).await;
        assert!(!f.coordinator.is_favorite(&a.id).await);
        assert!(stored_ids(f.store.raw(FAVORITES_KEY).await).is_empty());
    }

    #[tokio::test]
    async fn test_favorites_are_persisted_in_full() {
        let f = fixture().await;
        f.coordinator.add_to_favorites(song("a")).await;
        f.coordinator.add_to_favorites(song("b")).await;

        assert_eq!(stored_ids(f.store.raw(FAVORITES_KEY).await), vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_toggle_favorite_flips_status() {
        let f = fixture().await;
        assert!(f.coordinator.toggle_favorite(song("a")).await);
        assert!(!f.coordinator.toggle_favorite(song("a")).await);
        assert!(f.coordinator.favorites().await.is_empty());
    }

    #[tokio::test]
    async fn test_sixty_plays_keep_fifty_most_recent() {
        let f = fixture().await;
        for n in 0..60 {
            f.coordinator.add_to_recently_played(song(&format!("s{}", n))).await;
        }

        let recent = f.coordinator.recently_played().await;
        assert_eq!(recent.len(), RECENTLY_PLAYED_LIMIT);
        assert_eq!(recent[0].id.as_str(), "s59");
        assert_eq!(recent[49].id.as_str(), "s10");
        assert_eq!(stored_ids(f.store.raw(RECENTLY_PLAYED_KEY).await).len(), RECENTLY_PLAYED_LIMIT);
    }

    #[tokio::test]
    async fn test_replaying_moves_song_to_front() {
        let f = fixture().await;
        let list = songs(&["a", "b", "c"]);
        for s in &list {
            f.coordinator.play_song(s.clone(), Some(list.clone()), 0).await;
        }

        f.coordinator.play_song(list[0].clone(), Some(list.clone()), 0).await;

        let ids: Vec<String> = f
            .coordinator
            .recently_played()
            .await
            .into_iter()
            .map(|s| s.id.to_string())
            .collect();
        assert_eq!(ids, vec!["a", "c", "b"]);
    }

    #[tokio::test]
    async fn test_lists_are_loaded_at_startup() {
        let store = MemoryStore::new();
        store
            .set(FAVORITES_KEY, serde_json::to_string(&songs(&["x", "y"])).unwrap())
            .await
            .unwrap();
        store.set(RECENTLY_PLAYED_KEY, "garbage".to_string()).await.unwrap();

        let f = fixture_with_store(store).await;

        assert!(f.coordinator.is_favorite(&song("y").id).await);
        assert_eq!(f.coordinator.favorites().await.len(), 2);
        assert!(f.coordinator.recently_played().await.is_empty());
    }

    #[tokio::test]
    async fn test_favorites_survive_failing_store() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"").unwrap();
        let engine = Arc::new(ScriptedEngine::new());
        let adapter = Arc::new(AudioAdapter::new(engine));
        let store = Arc::new(JsonFileStore::new(blocker.join("data")));
        let options = CoordinatorOptions {
            auto_advance_delay: Duration::ZERO,
        };
        let (coordinator, _events) = PlaybackCoordinator::start(adapter, store, options).await;

        coordinator.add_to_favorites(song("a")).await;
        coordinator.add_to_recently_played(song("b")).await;

        assert!(coordinator.is_favorite(&song("a").id).await);
        assert_eq!(coordinator.recently_played().await.len(), 1);
    }
}

