use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::super::episode::EpisodeKey;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HistoryEntry {
    /// Encoded [`EpisodeKey`].
    pub(crate) id: String,
    pub(crate) show_id: String,
    pub(crate) show_title: String,
    pub(crate) season: u32,
    pub(crate) episode: u32,
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) file: String,
    #[serde(default)]
    pub(crate) image: String,
    #[serde(default)]
    pub(crate) current_time: f64,
    #[serde(default)]
    pub(crate) completed: bool,
    pub(crate) started_at: DateTime<Utc>,
    #[serde(default)]
    pub(crate) completed_at: Option<DateTime<Utc>>,
}

impl HistoryEntry {
    pub(crate) fn key(&self) -> EpisodeKey {
        EpisodeKey::new(self.show_id.clone(), self.season, self.episode)
    }
}

/// Listening history, most recently touched entry first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub(crate) fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub(crate) fn entry(&self, id: &str) -> Option<&HistoryEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub(crate) fn completed(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter().filter(|entry| entry.completed)
    }

    /// Inserts at the front, or merges into the existing entry and moves it to
    /// the front. Incoming fields win; a missing completion date keeps the
    /// previous one.
    pub(crate) fn upsert(&mut self, mut entry: HistoryEntry) {
        if let Some(idx) = self.entries.iter().position(|item| item.id == entry.id) {
            let previous = self.entries.remove(idx);
            if entry.completed_at.is_none() {
                entry.completed_at = previous.completed_at;
            }
        }
        self.entries.insert(0, entry);
    }

    /// Patches the playback offset in place without touching recency order.
    pub(crate) fn patch_position(&mut self, id: &str, seconds: f64) -> bool {
        match self.entries.iter_mut().find(|entry| entry.id == id) {
            Some(entry) => {
                entry.current_time = seconds;
                true
            }
            None => false,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}
