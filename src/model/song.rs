//! Song records as supplied by the catalog

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Stable identity of a song. Catalog data uses both numeric and string ids,
/// so either form is accepted and normalized to a string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SongId(String);

impl SongId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SongId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SongId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for SongId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for SongId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for SongId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Unsigned(u64),
            Signed(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => SongId(s),
            RawId::Unsigned(n) => SongId(n.to_string()),
            RawId::Signed(n) => SongId(n.to_string()),
        })
    }
}

/// One timed lyric line
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LyricLine {
    /// Offset from the start of the song, in seconds
    pub time: f64,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub id: SongId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(alias = "file_url")]
    pub source_uri: String,
    /// Catalog duration label, e.g. `"3:14"`
    #[serde(default, alias = "duration", skip_serializing_if = "Option::is_none")]
    pub duration_hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lyrics: Option<Vec<LyricLine>>,
}

impl Song {
    pub fn new(id: impl Into<SongId>, title: impl Into<String>, source_uri: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: None,
            album: None,
            image: None,
            source_uri: source_uri.into(),
            duration_hint: None,
            lyrics: None,
        }
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    /// Parses the `"m:ss"` (or `"h:mm:ss"`) duration label.
    pub fn duration_hint_ms(&self) -> Option<u64> {
        let label = self.duration_hint.as_deref()?.trim();
        let mut total_seconds: u64 = 0;
        for part in label.split(':') {
            let value: u64 = part.trim().parse().ok()?;
            total_seconds = total_seconds.checked_mul(60)?.checked_add(value)?;
        }
        Some(total_seconds * 1000)
    }

    pub fn artist_or_unknown(&self) -> &str {
        self.artist.as_deref().unwrap_or("Unknown artist")
    }
}
