mod favorites;
mod history;

use std::collections::BTreeMap;
use std::fmt;

use anyhow::Result;
use chrono::Utc;

use crate::store::{
    FAVORITES_KEY, HISTORY_KEY, KeyValueStore, POSITIONS_KEY, THEME_KEY, load_json, save_json,
};

use super::catalog::{Show, ShowPreview};
use super::episode::EpisodeKey;

pub(crate) use favorites::{FavoriteEntry, FavoriteKind, Favorites};
pub(crate) use history::{History, HistoryEntry};

/// Encoded episode key → last known offset in seconds.
pub(crate) type PlaybackPositions = BTreeMap<String, f64>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub(crate) fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Unknown values fall back to light.
    pub(crate) fn parse(raw: &str) -> Self {
        match raw.trim().trim_matches('"') {
            "dark" => Self::Dark,
            _ => Self::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Drops offsets whose key is not a well-formed episode key.
fn valid_positions(raw: PlaybackPositions) -> PlaybackPositions {
    raw.into_iter()
        .filter(|(id, _)| match id.parse::<EpisodeKey>() {
            Ok(_) => true,
            Err(err) => {
                tracing::warn!(key = %id, error = %format!("{err:#}"), "dropping stored position");
                false
            }
        })
        .collect()
}

/// Favorites, listening history, playback positions and theme, mirrored into
/// the store on every change.
pub(crate) struct Library<S: KeyValueStore> {
    store: S,
    favorites: Favorites,
    history: History,
    positions: PlaybackPositions,
    theme: Theme,
}

impl<S: KeyValueStore> Library<S> {
    pub(crate) fn load(store: S) -> Self {
        let favorites = load_json(&store, FAVORITES_KEY);
        let history = load_json(&store, HISTORY_KEY);
        let positions = valid_positions(load_json(&store, POSITIONS_KEY));
        let theme = match store.get(THEME_KEY) {
            Ok(Some(raw)) => Theme::parse(&raw),
            Ok(None) => Theme::default(),
            Err(err) => {
                tracing::warn!(error = %format!("{err:#}"), "theme read failed, using light");
                Theme::default()
            }
        };
        Self {
            store,
            favorites,
            history,
            positions,
            theme,
        }
    }

    #[cfg(test)]
    pub(crate) fn into_store(self) -> S {
        self.store
    }

    pub(crate) fn favorites(&self) -> &[FavoriteEntry] {
        self.favorites.entries()
    }

    pub(crate) fn history(&self) -> &History {
        &self.history
    }

    #[cfg(test)]
    pub(crate) fn positions(&self) -> &PlaybackPositions {
        &self.positions
    }

    pub(crate) fn theme(&self) -> Theme {
        self.theme
    }

    pub(crate) fn is_favorite_show(&self, show_id: &str) -> bool {
        self.favorites.contains(show_id)
    }

    pub(crate) fn is_favorite_episode(&self, key: &EpisodeKey) -> bool {
        self.favorites.contains(&key.encode())
    }

    /// Returns whether the show is a favorite afterwards.
    pub(crate) fn toggle_favorite_show(&mut self, show: &ShowPreview) -> Result<bool> {
        let added = self
            .favorites
            .toggle(FavoriteEntry::for_show(show, Utc::now()));
        tracing::info!(show_id = %show.id, added, "toggled show favorite");
        self.save_favorites()?;
        Ok(added)
    }

    /// Returns whether the episode is a favorite afterwards.
    pub(crate) fn toggle_favorite_episode(&mut self, show: &Show, key: &EpisodeKey) -> Result<bool> {
        let (_, episode) = show.episode(key.season, key.episode)?;
        let entry = FavoriteEntry::for_episode(&show.preview(), key, episode, Utc::now());
        let added = self.favorites.toggle(entry);
        tracing::info!(episode = %key, added, "toggled episode favorite");
        self.save_favorites()?;
        Ok(added)
    }

    pub(crate) fn remove_favorite(&mut self, id: &str) -> Result<bool> {
        let removed = self.favorites.remove(id);
        if removed {
            self.save_favorites()?;
        }
        Ok(removed)
    }

    pub(crate) fn record_play(&mut self, entry: HistoryEntry) -> Result<()> {
        tracing::debug!(episode = %entry.id, "recording play");
        self.history.upsert(entry);
        self.save_history()
    }

    pub(crate) fn mark_completed(&mut self, mut entry: HistoryEntry) -> Result<()> {
        tracing::info!(episode = %entry.id, "episode completed");
        entry.completed = true;
        entry.completed_at = Some(Utc::now());
        self.history.upsert(entry);
        self.save_history()
    }

    pub(crate) fn reset_history(&mut self) -> Result<()> {
        self.history.clear();
        self.positions.clear();
        self.store.remove(HISTORY_KEY)?;
        self.store.remove(POSITIONS_KEY)?;
        tracing::info!("listening history reset");
        Ok(())
    }

    pub(crate) fn position(&self, key: &EpisodeKey) -> f64 {
        self.positions.get(&key.encode()).copied().unwrap_or(0.0)
    }

    /// Writes the full position map on every call and patches the matching
    /// history entry, if any.
    pub(crate) fn update_position(&mut self, key: &EpisodeKey, seconds: f64) -> Result<()> {
        let id = key.encode();
        self.positions.insert(id.clone(), seconds);
        save_json(&self.store, POSITIONS_KEY, &self.positions)?;
        if self.history.patch_position(&id, seconds) {
            self.save_history()?;
        }
        Ok(())
    }

    pub(crate) fn toggle_theme(&mut self) -> Result<Theme> {
        self.theme = self.theme.toggled();
        self.store.set(THEME_KEY, self.theme.as_str())?;
        Ok(self.theme)
    }

    fn save_favorites(&self) -> Result<()> {
        save_json(&self.store, FAVORITES_KEY, &self.favorites)
    }

    fn save_history(&self) -> Result<()> {
        save_json(&self.store, HISTORY_KEY, &self.history)
    }
}
