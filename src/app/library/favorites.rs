use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::super::catalog::{Episode, ShowPreview};
use super::super::episode::EpisodeKey;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub(crate) enum FavoriteKind {
    Show {
        seasons: u32,
    },
    Episode {
        season: u32,
        episode: u32,
        title: String,
        file: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FavoriteEntry {
    /// Show id for show favorites, encoded [`EpisodeKey`] for episode favorites.
    pub(crate) id: String,
    pub(crate) kind: FavoriteKind,
    pub(crate) show_id: String,
    pub(crate) show_title: String,
    #[serde(default)]
    pub(crate) image: String,
    #[serde(default)]
    pub(crate) genres: Vec<u32>,
    #[serde(default)]
    pub(crate) updated: String,
    pub(crate) date_added: DateTime<Utc>,
}

impl FavoriteEntry {
    pub(crate) fn for_show(show: &ShowPreview, now: DateTime<Utc>) -> Self {
        Self {
            id: show.id.clone(),
            kind: FavoriteKind::Show {
                seasons: show.seasons,
            },
            show_id: show.id.clone(),
            show_title: show.title.clone(),
            image: show.image.clone(),
            genres: show.genres.clone(),
            updated: show.updated.clone(),
            date_added: now,
        }
    }

    pub(crate) fn for_episode(
        show: &ShowPreview,
        key: &EpisodeKey,
        episode: &Episode,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: key.encode(),
            kind: FavoriteKind::Episode {
                season: key.season,
                episode: key.episode,
                title: episode.title.clone(),
                file: episode.file.clone(),
            },
            show_id: show.id.clone(),
            show_title: show.title.clone(),
            image: show.image.clone(),
            genres: show.genres.clone(),
            updated: show.updated.clone(),
            date_added: now,
        }
    }

    /// Episode title for episode favorites, show title otherwise.
    pub(crate) fn title(&self) -> &str {
        match &self.kind {
            FavoriteKind::Episode { title, .. } => title,
            FavoriteKind::Show { .. } => &self.show_title,
        }
    }

    pub(crate) fn episode_key(&self) -> Option<EpisodeKey> {
        match &self.kind {
            FavoriteKind::Episode {
                season, episode, ..
            } => Some(EpisodeKey::new(self.show_id.clone(), *season, *episode)),
            FavoriteKind::Show { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct Favorites {
    entries: Vec<FavoriteEntry>,
}

impl Favorites {
    pub(crate) fn entries(&self) -> &[FavoriteEntry] {
        &self.entries
    }

    pub(crate) fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    /// Removes the entry with the same id, or appends it. Returns whether the
    /// entry is a favorite afterwards.
    pub(crate) fn toggle(&mut self, entry: FavoriteEntry) -> bool {
        if self.remove(&entry.id) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    pub(crate) fn remove(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }
}
