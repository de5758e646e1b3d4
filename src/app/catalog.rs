use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer};

use crate::http::{HttpSettings, get_text_with_retries};

use super::genre::genre_id_by_name;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct ShowPreview {
    pub(crate) id: String,
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) description: String,
    #[serde(default)]
    pub(crate) image: String,
    #[serde(default)]
    pub(crate) seasons: u32,
    #[serde(default, deserialize_with = "deserialize_genres")]
    pub(crate) genres: Vec<u32>,
    #[serde(default)]
    pub(crate) updated: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct Show {
    pub(crate) id: String,
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) description: String,
    #[serde(default)]
    pub(crate) image: String,
    #[serde(default)]
    pub(crate) seasons: Vec<Season>,
    #[serde(default, deserialize_with = "deserialize_genres")]
    pub(crate) genres: Vec<u32>,
    #[serde(default)]
    pub(crate) updated: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct Season {
    pub(crate) season: u32,
    #[serde(default)]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) episodes: Vec<Episode>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct Episode {
    pub(crate) episode: u32,
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) description: String,
    #[serde(default)]
    pub(crate) file: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct Genre {
    pub(crate) id: u32,
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) shows: Vec<String>,
}

impl Show {
    pub(crate) fn season(&self, number: u32) -> Option<&Season> {
        self.seasons.iter().find(|season| season.season == number)
    }

    pub(crate) fn episode(&self, season: u32, episode: u32) -> Result<(&Season, &Episode)> {
        let found_season = self
            .season(season)
            .ok_or_else(|| anyhow!("season {season} not found in `{}`", self.title))?;
        let found_episode = found_season
            .episodes
            .iter()
            .find(|item| item.episode == episode)
            .ok_or_else(|| {
                anyhow!(
                    "episode {episode} not found in season {season} of `{}`",
                    self.title
                )
            })?;
        Ok((found_season, found_episode))
    }

    pub(crate) fn preview(&self) -> ShowPreview {
        ShowPreview {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            image: self.image.clone(),
            seasons: self.seasons.len() as u32,
            genres: self.genres.clone(),
            updated: self.updated.clone(),
        }
    }
}

pub(crate) fn parse_updated(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw.trim()).ok()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GenreRef {
    Id(u32),
    Name(String),
}

// The list endpoint sends genre ids; the detail endpoint sends genre names.
fn deserialize_genres<'de, D>(deserializer: D) -> Result<Vec<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<GenreRef>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|genre| match genre {
            GenreRef::Id(id) => Some(id),
            GenreRef::Name(name) => genre_id_by_name(&name),
        })
        .collect())
}

pub(crate) trait Catalog {
    fn list_shows(&self) -> Result<Vec<ShowPreview>>;
    fn show(&self, id: &str) -> Result<Show>;
    fn genre(&self, id: u32) -> Result<Genre>;
}

#[derive(Debug, Clone)]
pub(crate) struct CatalogClient {
    base_url: String,
    settings: HttpSettings,
}

impl CatalogClient {
    pub(crate) fn new(base_url: &str, settings: HttpSettings) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            settings,
        }
    }

    fn get(&self, path: &str) -> Result<String> {
        let url = format!("{}{path}", self.base_url);
        get_text_with_retries(&url, &self.settings).map_err(|err| anyhow!(err))
    }
}

impl Catalog for CatalogClient {
    fn list_shows(&self) -> Result<Vec<ShowPreview>> {
        let raw = self.get("/").context("Failed to fetch shows")?;
        let shows = parse_show_previews(&raw)?;
        tracing::info!(count = shows.len(), "fetched show list");
        Ok(shows)
    }

    fn show(&self, id: &str) -> Result<Show> {
        let raw = self
            .get(&format!("/id/{id}"))
            .context("Failed to fetch show details")?;
        let show = parse_show(&raw)?;
        tracing::info!(show_id = id, seasons = show.seasons.len(), "fetched show");
        Ok(show)
    }

    fn genre(&self, id: u32) -> Result<Genre> {
        let raw = self
            .get(&format!("/genre/{id}"))
            .context("Failed to fetch genre")?;
        let genre: Genre = serde_json::from_str(&raw).context("Failed to decode genre")?;
        tracing::info!(genre_id = genre.id, genre = %genre.title, shows = genre.shows.len(), "fetched genre");
        Ok(genre)
    }
}

pub(crate) fn parse_show_previews(raw: &str) -> Result<Vec<ShowPreview>> {
    serde_json::from_str(raw).context("Failed to decode show list")
}

pub(crate) fn parse_show(raw: &str) -> Result<Show> {
    let mut show: Show = serde_json::from_str(raw).context("Failed to decode show details")?;
    show.seasons.sort_by_key(|season| season.season);
    for season in &mut show.seasons {
        season.episodes.sort_by_key(|episode| episode.episode);
    }
    Ok(show)
}
