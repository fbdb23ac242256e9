//! Persistent key-value storage for the recently-played and favorites lists

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::BoxFuture;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::model::Song;

pub const RECENTLY_PLAYED_KEY: &str = "recentlyPlayed";
pub const FAVORITES_KEY: &str = "favoritesSongs";

/// Async string key-value store
pub trait KeyValueStore: Send + Sync {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<String>, StoreError>>;
    fn set<'a>(&'a self, key: &'a str, value: String) -> BoxFuture<'a, Result<(), StoreError>>;
}

/// One JSON file per key under a data directory
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<String>, StoreError>> {
        Box::pin(async move {
            let path = self.path_for(key);
            match tokio::fs::read_to_string(&path).await {
                Ok(content) => Ok(Some(content)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
    }

    fn set<'a>(&'a self, key: &'a str, value: String) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            tokio::fs::create_dir_all(&self.dir).await?;
            let path = self.path_for(key);
            // Readers never see a half-written list
            let tmp = path.with_extension("json.tmp");
            tokio::fs::write(&tmp, value).await?;
            tokio::fs::rename(&tmp, &path).await?;
            Ok(())
        })
    }
}

/// In-memory store
#[derive(Clone, Default)]
pub struct MemoryStore {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn raw(&self, key: &str) -> Option<String> {
        self.values.read().await.get(key).cloned()
    }
}

impl KeyValueStore for MemoryStore {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<String>, StoreError>> {
        Box::pin(async move { Ok(self.values.read().await.get(key).cloned()) })
    }

    fn set<'a>(&'a self, key: &'a str, value: String) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            self.values.write().await.insert(key.to_string(), value);
            Ok(())
        })
    }
}

/// Lists loaded at startup
#[derive(Clone, Debug, Default)]
pub struct LoadedLists {
    pub recently_played: Vec<Song>,
    pub favorites: Vec<Song>,
}

/// Reads and rewrites the two song lists. Every failure is logged and
/// absorbed: a bad read yields an empty list, a failed write is dropped.
#[derive(Clone)]
pub struct PersistedLists {
    store: Arc<dyn KeyValueStore>,
}

impl PersistedLists {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn load(&self) -> LoadedLists {
        let (recently_played, favorites) = futures::join!(
            self.load_list(RECENTLY_PLAYED_KEY),
            self.load_list(FAVORITES_KEY)
        );
        tracing::info!(
            recently_played = recently_played.len(),
            favorites = favorites.len(),
            "Loaded persisted song lists"
        );
        LoadedLists {
            recently_played,
            favorites,
        }
    }

    pub async fn save_recently_played(&self, songs: &[Song]) {
        self.save_list(RECENTLY_PLAYED_KEY, songs).await;
    }

    pub async fn save_favorites(&self, songs: &[Song]) {
        self.save_list(FAVORITES_KEY, songs).await;
    }

    async fn load_list(&self, key: &str) -> Vec<Song> {
        let raw = match self.store.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to read song list, starting empty");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Song>>(&raw) {
            Ok(songs) => songs,
            Err(e) => {
                tracing::warn!(key, error = %e, "Stored song list is corrupt, starting empty");
                Vec::new()
            }
        }
    }

    async fn save_list<T: Serialize + ?Sized>(&self, key: &str, songs: &T) {
        let encoded = match serde_json::to_string(songs) {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::error!(key, error = %e, "Failed to encode song list");
                return;
            }
        };
        if let Err(e) = self.store.set(key, encoded).await {
            tracing::warn!(key, error = %e, "Failed to persist song list");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(id: &str) -> Song {
        Song::new(id, id.to_uppercase(), format!("/music/{}.mp3", id))
    }

    #[tokio::test]
    async fn test_missing_keys_load_as_empty() {
        let lists = PersistedLists::new(Arc::new(MemoryStore::new()));
        let loaded = lists.load().await;
        assert!(loaded.recently_played.is_empty());
        assert!(loaded.favorites.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_value_loads_as_empty() {
        let store = MemoryStore::new();
        store.set(FAVORITES_KEY, "{not json".to_string()).await.unwrap();
        store
            .set(RECENTLY_PLAYED_KEY, serde_json::to_string(&vec![song("a")]).unwrap())
            .await
            .unwrap();

        let loaded = PersistedLists::new(Arc::new(store)).load().await;
        assert!(loaded.favorites.is_empty());
        assert_eq!(loaded.recently_played.len(), 1);
    }

    #[tokio::test]
    async fn test_file_store_round_trips_lists() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::new(dir.path().join("data")));
        let lists = PersistedLists::new(store.clone());

        lists.save_favorites(&[song("a"), song("b")]).await;
        let loaded = PersistedLists::new(store).load().await;

        let ids: Vec<&str> = loaded.favorites.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(dir.path().join("data").join("favoritesSongs.json").exists());
    }

    #[tokio::test]
    async fn test_file_store_reads_missing_file_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        assert!(store.get(RECENTLY_PLAYED_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unreachable_directory_is_absorbed() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"").unwrap();
        let store = Arc::new(JsonFileStore::new(blocker.join("data")));
        assert!(store.set(FAVORITES_KEY, "[]".to_string()).await.is_err());

        let lists = PersistedLists::new(store);
        lists.save_favorites(&[song("a")]).await;
        lists.save_recently_played(&[song("b")]).await;

        let loaded = lists.load().await;
        assert!(loaded.favorites.is_empty());
        assert!(loaded.recently_played.is_empty());
    }
}
