use std::sync::mpsc;
use std::thread;

use anyhow::{Context, Result};
use ratatui::widgets::TableState;

use crate::store::KeyValueStore;

use super::super::catalog::{Catalog, CatalogClient};
use super::super::controller::Controller;
use super::super::episode::EpisodeKey;
use super::super::library::Library;
use super::super::player::{MediaBackend, NowPlaying};
use super::super::views::{Route, featured, visible_favorites, visible_history, visible_shows};
use super::{FetchResult, Remote, TuiState};

pub(super) fn status_info(msg: &str) -> String {
    format!("INFO: {msg}")
}

pub(super) fn status_error(msg: &str) -> String {
    format!("ERROR: {msg}")
}

/// What a row of the current table points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum RowTarget {
    Show(String),
    Episode(EpisodeKey),
    Favorite(String),
    History(String),
}

pub(super) fn row_targets<S: KeyValueStore>(state: &TuiState, library: &Library<S>) -> Vec<RowTarget> {
    match &state.route {
        Route::Home => match &state.shows {
            Remote::Ready(shows) => featured(shows)
                .iter()
                .map(|show| RowTarget::Show(show.id.clone()))
                .collect(),
            _ => Vec::new(),
        },
        Route::Shows => match &state.shows {
            Remote::Ready(shows) => visible_shows(shows, &state.query, state.genre, state.show_sort)
                .into_iter()
                .map(|show| RowTarget::Show(show.id.clone()))
                .collect(),
            _ => Vec::new(),
        },
        Route::Show(_) => match &state.show {
            Some(Remote::Ready(show)) => show
                .seasons
                .iter()
                .flat_map(|season| {
                    season.episodes.iter().map(move |episode| {
                        RowTarget::Episode(EpisodeKey::new(
                            show.id.clone(),
                            season.season,
                            episode.episode,
                        ))
                    })
                })
                .collect(),
            _ => Vec::new(),
        },
        Route::Favorites => visible_favorites(library.favorites(), &state.query, state.favorite_sort)
            .into_iter()
            .map(|entry| RowTarget::Favorite(entry.id.clone()))
            .collect(),
        Route::Completed => visible_history(library.history().entries(), &state.query)
            .into_iter()
            .map(|entry| RowTarget::History(entry.id.clone()))
            .collect(),
    }
}

pub(super) fn clamp_selection(table_state: &mut TableState, len: usize) {
    if len == 0 {
        table_state.select(None);
        return;
    }
    match table_state.selected() {
        Some(selected) => table_state.select(Some(selected.min(len - 1))),
        None => table_state.select(Some(0)),
    }
}

/// Runs catalog requests off the UI thread. Each request is tagged with an
/// id so that a response for a view the user already left is dropped.
pub(super) struct Fetcher {
    catalog: CatalogClient,
    tx: mpsc::Sender<FetchResult>,
    rx: mpsc::Receiver<FetchResult>,
}

impl Fetcher {
    pub(super) fn new(catalog: CatalogClient) -> Self {
        let (tx, rx) = mpsc::channel();
        Self { catalog, tx, rx }
    }

    pub(super) fn request_shows(&self, state: &mut TuiState) {
        let request_id = state.issue_request_id();
        state.shows_request = request_id;
        state.shows = Remote::Loading;

        let catalog = self.catalog.clone();
        let tx = self.tx.clone();
        thread::spawn(move || {
            let result = catalog.list_shows().map_err(|err| {
                tracing::warn!(error = %format!("{err:#}"), "show list fetch failed");
                err.to_string()
            });
            let _ = tx.send(FetchResult::Shows { request_id, result });
        });
    }

    pub(super) fn request_show(&self, state: &mut TuiState, id: &str) {
        let request_id = state.issue_request_id();
        state.show_request = request_id;
        state.show = Some(Remote::Loading);

        let catalog = self.catalog.clone();
        let tx = self.tx.clone();
        let id = id.to_string();
        thread::spawn(move || {
            let result = catalog.show(&id).map_err(|err| {
                tracing::warn!(show_id = %id, error = %format!("{err:#}"), "show fetch failed");
                err.to_string()
            });
            let _ = tx.send(FetchResult::Show { request_id, result });
        });
    }

    pub(super) fn drain(&self, state: &mut TuiState) {
        while let Ok(result) = self.rx.try_recv() {
            apply_fetch_result(state, result);
        }
    }
}

pub(super) fn apply_fetch_result(state: &mut TuiState, result: FetchResult) {
    match result {
        FetchResult::Shows { request_id, result } => {
            if request_id != state.shows_request {
                tracing::debug!(request_id, "dropping stale show list response");
                return;
            }
            state.shows = match result {
                Ok(shows) => Remote::Ready(shows),
                Err(message) => Remote::Failed(message),
            };
        }
        FetchResult::Show { request_id, result } => {
            if request_id != state.show_request {
                tracing::debug!(request_id, "dropping stale show response");
                return;
            }
            state.show = Some(match result {
                Ok(show) => Remote::Ready(show),
                Err(message) => Remote::Failed(message),
            });
        }
    }
}

const MAX_BACK_DEPTH: usize = 32;

/// Pushes the current route onto the back stack, skipping repeats and
/// dropping the oldest entry past `MAX_BACK_DEPTH`.
pub(super) fn remember_route(state: &mut TuiState) {
    if state.back.last() == Some(&state.route) {
        return;
    }
    if state.back.len() == MAX_BACK_DEPTH {
        state.back.remove(0);
    }
    state.back.push(state.route.clone());
}

/// Switches view. Search text and selection start fresh on every route.
pub(super) fn navigate(state: &mut TuiState, fetcher: &Fetcher, route: Route, remember: bool) {
    if route == state.route {
        return;
    }
    if remember {
        remember_route(state);
    }
    state.route = route;
    state.query.clear();
    state.editing_query = false;
    state.table_state.select(Some(0));

    match &state.route {
        Route::Show(id) => {
            let id = id.clone();
            fetcher.request_show(state, &id);
        }
        _ => {
            state.show = None;
            state.show_request = 0;
        }
    }
    if matches!(state.route, Route::Home | Route::Shows) && matches!(state.shows, Remote::Failed(_)) {
        fetcher.request_shows(state);
    }
    tracing::debug!(route = %state.route.path(), "navigated");
}

pub(super) fn go_back(state: &mut TuiState, fetcher: &Fetcher) -> bool {
    let Some(previous) = state.back.pop() else {
        return false;
    };
    navigate(state, fetcher, previous, false);
    true
}

pub(super) fn retry(state: &mut TuiState, fetcher: &Fetcher) -> Option<String> {
    match &state.route {
        Route::Show(id) if matches!(state.show, Some(Remote::Failed(_))) => {
            let id = id.clone();
            fetcher.request_show(state, &id);
            Some(status_info("Retrying show details..."))
        }
        Route::Home | Route::Shows if matches!(state.shows, Remote::Failed(_)) => {
            fetcher.request_shows(state);
            Some(status_info("Retrying show list..."))
        }
        _ => None,
    }
}

/// Enter on a row: open shows, play episodes.
pub(super) fn activate_row<S: KeyValueStore, B: MediaBackend>(
    state: &mut TuiState,
    fetcher: &Fetcher,
    controller: &mut Controller<S, B>,
    target: RowTarget,
) -> Result<String> {
    match target {
        RowTarget::Show(id) => {
            navigate(state, fetcher, Route::Show(id), true);
            Ok(status_info("Loading show..."))
        }
        RowTarget::Episode(key) => {
            let Some(Remote::Ready(show)) = &state.show else {
                return Ok(status_error("Show details are not loaded yet."));
            };
            controller.play_from_show(show, &key)?;
            Ok(now_playing_status(controller))
        }
        RowTarget::Favorite(id) => {
            let entry = controller
                .library()
                .favorites()
                .iter()
                .find(|entry| entry.id == id)
                .cloned()
                .context("favorite no longer exists")?;
            match NowPlaying::from_favorite(&entry) {
                Some(episode) => {
                    controller.play(episode)?;
                    Ok(now_playing_status(controller))
                }
                None => {
                    navigate(state, fetcher, Route::Show(entry.show_id.clone()), true);
                    Ok(status_info(&format!("Opening {}...", entry.show_title)))
                }
            }
        }
        RowTarget::History(id) => {
            let episode = controller
                .library()
                .history()
                .entry(&id)
                .map(NowPlaying::from_history)
                .context("history entry no longer exists")?;
            controller.play(episode)?;
            Ok(now_playing_status(controller))
        }
    }
}

fn now_playing_status<S: KeyValueStore, B: MediaBackend>(controller: &Controller<S, B>) -> String {
    match controller.player().current() {
        Some(current) => status_info(&format!("Playing: {} ({})", current.title, current.show_title)),
        None => status_info("Playback started."),
    }
}

fn favorite_status(added: bool, title: &str) -> String {
    if added {
        status_info(&format!("Added to favorites: {title}"))
    } else {
        status_info(&format!("Removed from favorites: {title}"))
    }
}

/// `f` on a row.
pub(super) fn toggle_row_favorite<S: KeyValueStore, B: MediaBackend>(
    state: &TuiState,
    controller: &mut Controller<S, B>,
    target: RowTarget,
) -> Result<String> {
    match target {
        RowTarget::Show(id) => {
            let Remote::Ready(shows) = &state.shows else {
                return Ok(status_error("Show list is not loaded yet."));
            };
            let preview = shows
                .iter()
                .find(|show| show.id == id)
                .context("show is no longer listed")?;
            let added = controller.library_mut().toggle_favorite_show(preview)?;
            Ok(favorite_status(added, &preview.title))
        }
        RowTarget::Episode(key) => {
            let Some(Remote::Ready(show)) = &state.show else {
                return Ok(status_error("Show details are not loaded yet."));
            };
            let added = controller.library_mut().toggle_favorite_episode(show, &key)?;
            let (_, episode) = show.episode(key.season, key.episode)?;
            Ok(favorite_status(added, &episode.title))
        }
        RowTarget::Favorite(id) => {
            let title = controller
                .library()
                .favorites()
                .iter()
                .find(|entry| entry.id == id)
                .map(|entry| entry.title().to_string())
                .unwrap_or_default();
            if controller.library_mut().remove_favorite(&id)? {
                Ok(favorite_status(false, &title))
            } else {
                Ok(status_error("Favorite no longer exists."))
            }
        }
        RowTarget::History(_) => Ok(status_info("Open the show to favorite this episode.")),
    }
}

/// `F` on the show page.
pub(super) fn toggle_current_show_favorite<S: KeyValueStore, B: MediaBackend>(
    state: &TuiState,
    controller: &mut Controller<S, B>,
) -> Result<String> {
    let Some(Remote::Ready(show)) = &state.show else {
        return Ok(status_error("Show details are not loaded yet."));
    };
    let added = controller.library_mut().toggle_favorite_show(&show.preview())?;
    Ok(favorite_status(added, &show.title))
}
