use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Local, Utc};

/// Composite identity of one episode: `{show_id}:{season}:{episode}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct EpisodeKey {
    pub(crate) show_id: String,
    pub(crate) season: u32,
    pub(crate) episode: u32,
}

impl EpisodeKey {
    pub(crate) fn new(show_id: impl Into<String>, season: u32, episode: u32) -> Self {
        Self {
            show_id: show_id.into(),
            season,
            episode,
        }
    }

    pub(crate) fn encode(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for EpisodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.show_id, self.season, self.episode)
    }
}

impl FromStr for EpisodeKey {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        let mut parts = raw.rsplitn(3, ':');
        let episode = parts.next().ok_or_else(|| anyhow!("empty episode key"))?;
        let season = parts
            .next()
            .ok_or_else(|| anyhow!("episode key `{raw}` has no season"))?;
        let show_id = parts
            .next()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| anyhow!("episode key `{raw}` has no show id"))?;

        Ok(Self {
            show_id: show_id.to_string(),
            season: season
                .parse()
                .with_context(|| format!("invalid season in episode key `{raw}`"))?,
            episode: episode
                .parse()
                .with_context(|| format!("invalid episode in episode key `{raw}`"))?,
        })
    }
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    let mut out = s.to_string();
    if out.chars().count() > max {
        out = out.chars().take(max.saturating_sub(3)).collect::<String>() + "...";
    }
    out
}

pub(crate) fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

pub(crate) fn format_date_display(raw: &DateTime<Utc>) -> String {
    raw.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

pub(crate) fn format_updated_display(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

pub(crate) fn season_label(season: u32, title: &str) -> String {
    let title = title.trim();
    if title.is_empty() || title == format!("Season {season}") {
        format!("Season {season}")
    } else {
        format!("Season {season}: {title}")
    }
}
