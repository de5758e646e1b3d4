use std::cmp::Ordering;

use anyhow::{Result, bail};

use crate::cli::SortArg;

use super::catalog::{ShowPreview, parse_updated};
use super::library::{FavoriteEntry, HistoryEntry};

pub(crate) const FEATURED_COUNT: usize = 10;
const EXCERPT_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Route {
    Home,
    Shows,
    Show(String),
    Favorites,
    Completed,
}

impl Route {
    pub(crate) fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let path = match trimmed.trim_end_matches('/') {
            "" => "/",
            path => path,
        };
        match path {
            "/" => Ok(Self::Home),
            "/shows" => Ok(Self::Shows),
            "/favorites" => Ok(Self::Favorites),
            "/completed" => Ok(Self::Completed),
            _ => match path.strip_prefix("/show/") {
                Some(id) if !id.is_empty() && !id.contains('/') => Ok(Self::Show(id.to_string())),
                _ => bail!("unknown route `{trimmed}`"),
            },
        }
    }

    pub(crate) fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Shows => "/shows".to_string(),
            Self::Show(id) => format!("/show/{id}"),
            Self::Favorites => "/favorites".to_string(),
            Self::Completed => "/completed".to_string(),
        }
    }

    pub(crate) fn title(&self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Shows => "Shows",
            Self::Show(_) => "Show",
            Self::Favorites => "Favorites",
            Self::Completed => "Listening History",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SortOrder {
    TitleAsc,
    TitleDesc,
    RecentlyUpdated,
    LeastRecentlyUpdated,
    NewestAdded,
    OldestAdded,
}

impl SortOrder {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::TitleAsc => "A-Z",
            Self::TitleDesc => "Z-A",
            Self::RecentlyUpdated => "Recently updated",
            Self::LeastRecentlyUpdated => "Least recently updated",
            Self::NewestAdded => "Newest added",
            Self::OldestAdded => "Oldest added",
        }
    }

    /// Show lists have no date added.
    pub(crate) fn next_for_shows(self) -> Self {
        match self {
            Self::TitleAsc => Self::TitleDesc,
            Self::TitleDesc => Self::RecentlyUpdated,
            Self::RecentlyUpdated => Self::LeastRecentlyUpdated,
            Self::LeastRecentlyUpdated | Self::NewestAdded | Self::OldestAdded => Self::TitleAsc,
        }
    }

    pub(crate) fn next_for_favorites(self) -> Self {
        match self {
            Self::TitleAsc => Self::TitleDesc,
            Self::TitleDesc => Self::RecentlyUpdated,
            Self::RecentlyUpdated => Self::LeastRecentlyUpdated,
            Self::LeastRecentlyUpdated => Self::NewestAdded,
            Self::NewestAdded => Self::OldestAdded,
            Self::OldestAdded => Self::TitleAsc,
        }
    }
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::TitleAsc => Self::TitleAsc,
            SortArg::TitleDesc => Self::TitleDesc,
            SortArg::Newest => Self::RecentlyUpdated,
            SortArg::Oldest => Self::LeastRecentlyUpdated,
        }
    }
}

/// Case-insensitive substring match over any of `fields`. An empty query
/// matches everything.
pub(crate) fn matches_query(query: &str, fields: &[&str]) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    fields
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

fn compare_titles(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

fn compare_updated(a: &str, b: &str) -> Ordering {
    match (parse_updated(a), parse_updated(b)) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => a.cmp(b),
    }
}

pub(crate) fn visible_shows<'a>(
    shows: &'a [ShowPreview],
    query: &str,
    genre: Option<u32>,
    sort: SortOrder,
) -> Vec<&'a ShowPreview> {
    let mut out = shows
        .iter()
        .filter(|show| genre.is_none_or(|id| show.genres.contains(&id)))
        .filter(|show| matches_query(query, &[&show.title, &show.description]))
        .collect::<Vec<_>>();
    out.sort_by(|a, b| match sort {
        SortOrder::TitleDesc => compare_titles(&b.title, &a.title),
        SortOrder::RecentlyUpdated => compare_updated(&b.updated, &a.updated),
        SortOrder::LeastRecentlyUpdated => compare_updated(&a.updated, &b.updated),
        SortOrder::TitleAsc | SortOrder::NewestAdded | SortOrder::OldestAdded => {
            compare_titles(&a.title, &b.title)
        }
    });
    out
}

pub(crate) fn visible_favorites<'a>(
    favorites: &'a [FavoriteEntry],
    query: &str,
    sort: SortOrder,
) -> Vec<&'a FavoriteEntry> {
    let mut out = favorites
        .iter()
        .filter(|entry| matches_query(query, &[entry.title(), &entry.show_title]))
        .collect::<Vec<_>>();
    out.sort_by(|a, b| match sort {
        SortOrder::TitleAsc => compare_titles(a.title(), b.title()),
        SortOrder::TitleDesc => compare_titles(b.title(), a.title()),
        SortOrder::RecentlyUpdated => compare_updated(&b.updated, &a.updated),
        SortOrder::LeastRecentlyUpdated => compare_updated(&a.updated, &b.updated),
        SortOrder::NewestAdded => b.date_added.cmp(&a.date_added),
        SortOrder::OldestAdded => a.date_added.cmp(&b.date_added),
    });
    out
}

/// Keeps recency order; only filters.
pub(crate) fn visible_history<'a>(
    history: &'a [HistoryEntry],
    query: &str,
) -> Vec<&'a HistoryEntry> {
    history
        .iter()
        .filter(|entry| matches_query(query, &[&entry.title, &entry.show_title]))
        .collect()
}

pub(crate) fn featured(shows: &[ShowPreview]) -> &[ShowPreview] {
    &shows[..shows.len().min(FEATURED_COUNT)]
}

pub(crate) fn description_excerpt(description: &str) -> String {
    let description = description.trim();
    if description.is_empty() {
        return "No description available".to_string();
    }
    if description.chars().count() > EXCERPT_CHARS {
        let head = description.chars().take(EXCERPT_CHARS).collect::<String>();
        return format!("{head}...");
    }
    description.to_string()
}
