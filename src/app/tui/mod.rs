mod actions;
mod render;
mod session;


use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::widgets::TableState;

use crate::store::KeyValueStore;

use super::catalog::{CatalogClient, Show, ShowPreview};
use super::controller::{Controller, Notice};
use super::genre::{genre_title, next_genre_filter};
use super::player::MediaBackend;
use super::views::{Route, SortOrder};

use self::actions::{
    Fetcher, activate_row, clamp_selection, go_back, navigate, retry, row_targets, status_error,
    status_info, toggle_current_show_favorite, toggle_row_favorite,
};
use self::render::draw_tui;
use self::session::TuiSession;

/// A catalog response as the views see it.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum Remote<T> {
    Loading,
    Ready(T),
    Failed(String),
}

#[derive(Debug)]
pub(super) enum FetchResult {
    Shows {
        request_id: u64,
        result: Result<Vec<ShowPreview>, String>,
    },
    Show {
        request_id: u64,
        result: Result<Show, String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Dialog {
    ConfirmReset,
    ConfirmQuit,
}

pub(super) struct TuiState {
    pub(super) route: Route,
    pub(super) back: Vec<Route>,
    pub(super) shows: Remote<Vec<ShowPreview>>,
    pub(super) show: Option<Remote<Show>>,
    pub(super) shows_request: u64,
    pub(super) show_request: u64,
    last_request_id: u64,
    pub(super) query: String,
    pub(super) editing_query: bool,
    pub(super) show_sort: SortOrder,
    pub(super) favorite_sort: SortOrder,
    pub(super) genre: Option<u32>,
    pub(super) table_state: TableState,
    pub(super) status: String,
    pub(super) dialog: Option<Dialog>,
}

impl TuiState {
    pub(super) fn new(route: Route) -> Self {
        let mut table_state = TableState::default();
        table_state.select(Some(0));
        Self {
            route,
            back: Vec::new(),
            shows: Remote::Loading,
            show: None,
            shows_request: 0,
            show_request: 0,
            last_request_id: 0,
            query: String::new(),
            editing_query: false,
            show_sort: SortOrder::TitleAsc,
            favorite_sort: SortOrder::TitleAsc,
            genre: None,
            table_state,
            status: status_info("Ready."),
            dialog: None,
        }
    }

    pub(super) fn issue_request_id(&mut self) -> u64 {
        self.last_request_id += 1;
        self.last_request_id
    }

    fn searchable(&self) -> bool {
        matches!(
            self.route,
            Route::Shows | Route::Favorites | Route::Completed
        )
    }
}

enum Flow {
    Continue,
    Quit,
}

pub(crate) fn run_tui<S: KeyValueStore, B: MediaBackend>(
    controller: &mut Controller<S, B>,
    catalog: CatalogClient,
    start: Route,
    seek_step: f64,
) -> Result<()> {
    let mut session = TuiSession::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))
        .context("failed to initialize terminal backend")?;
    terminal.clear()?;

    let fetcher = Fetcher::new(catalog);
    let mut state = TuiState::new(Route::Home);
    fetcher.request_shows(&mut state);
    if start != Route::Home {
        navigate(&mut state, &fetcher, start, true);
    }

    loop {
        fetcher.drain(&mut state);
        for notice in controller.pump() {
            state.status = match notice {
                Notice::Info(msg) => status_info(&msg),
                Notice::Error(msg) => status_error(&msg),
            };
        }
        let row_count = row_targets(&state, controller.library()).len();
        clamp_selection(&mut state.table_state, row_count);

        terminal.draw(|frame| draw_tui(frame, &mut state, &*controller))?;

        if !event::poll(Duration::from_millis(200))? {
            continue;
        }

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        if let Flow::Quit = handle_key(&mut state, &fetcher, controller, key, seek_step) {
            break;
        }
    }

    if let Err(err) = controller.player_mut().stop() {
        tracing::warn!(error = %format!("{err:#}"), "failed to stop player on exit");
    }
    terminal.show_cursor()?;
    session.leave()?;
    Ok(())
}

fn handle_key<S: KeyValueStore, B: MediaBackend>(
    state: &mut TuiState,
    fetcher: &Fetcher,
    controller: &mut Controller<S, B>,
    key: KeyEvent,
    seek_step: f64,
) -> Flow {
    if let Some(dialog) = state.dialog {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                state.dialog = None;
                match dialog {
                    Dialog::ConfirmQuit => return Flow::Quit,
                    Dialog::ConfirmReset => {
                        state.status = match controller.library_mut().reset_history() {
                            Ok(()) => status_info("Listening history reset."),
                            Err(err) => status_error(&format!("Reset failed: {err}")),
                        };
                    }
                }
            }
            KeyCode::Esc | KeyCode::Char('n') => {
                state.dialog = None;
                state.status = match dialog {
                    Dialog::ConfirmQuit => status_info("Still listening."),
                    Dialog::ConfirmReset => status_info("Reset canceled."),
                };
            }
            _ => {}
        }
        return Flow::Continue;
    }

    if state.editing_query {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => state.editing_query = false,
            KeyCode::Backspace => {
                state.query.pop();
                state.table_state.select(Some(0));
            }
            KeyCode::Char(c) => {
                state.query.push(c);
                state.table_state.select(Some(0));
            }
            _ => {}
        }
        return Flow::Continue;
    }

    let selected = state.table_state.selected().and_then(|idx| {
        row_targets(state, controller.library())
            .into_iter()
            .nth(idx)
    });

    match key.code {
        KeyCode::Char('q') => {
            if !controller.player().is_active() {
                return Flow::Quit;
            }
            state.dialog = Some(Dialog::ConfirmQuit);
            state.status = status_info("Confirm quit: y/Enter to quit, n/Esc to keep listening.");
        }
        KeyCode::Char('1') => navigate(state, fetcher, Route::Home, true),
        KeyCode::Char('2') => navigate(state, fetcher, Route::Shows, true),
        KeyCode::Char('3') => navigate(state, fetcher, Route::Favorites, true),
        KeyCode::Char('4') => navigate(state, fetcher, Route::Completed, true),
        KeyCode::Esc => {
            if !state.query.is_empty() {
                state.query.clear();
            } else if !go_back(state, fetcher) {
                navigate(state, fetcher, Route::Home, false);
            }
        }
        KeyCode::Up => {
            if let Some(selected) = state.table_state.selected() {
                state.table_state.select(Some(selected.saturating_sub(1)));
            }
        }
        KeyCode::Down => {
            if let Some(selected) = state.table_state.selected() {
                state.table_state.select(Some(selected + 1));
            }
        }
        KeyCode::Enter => {
            let Some(target) = selected else {
                return Flow::Continue;
            };
            state.status = activate_row(state, fetcher, controller, target)
                .unwrap_or_else(|err| status_error(&format!("{err:#}")));
        }
        KeyCode::Char('f') => {
            let Some(target) = selected else {
                state.status = status_error("Nothing selected.");
                return Flow::Continue;
            };
            state.status = toggle_row_favorite(state, controller, target)
                .unwrap_or_else(|err| status_error(&format!("Favorite failed: {err:#}")));
        }
        KeyCode::Char('F') if matches!(state.route, Route::Show(_)) => {
            state.status = toggle_current_show_favorite(state, controller)
                .unwrap_or_else(|err| status_error(&format!("Favorite failed: {err:#}")));
        }
        KeyCode::Char(' ') => {
            if let Err(err) = controller.player_mut().toggle_play() {
                state.status = status_error(&format!("Play/pause failed: {err:#}"));
            }
        }
        KeyCode::Left | KeyCode::Right => {
            let delta = if key.code == KeyCode::Left {
                -seek_step
            } else {
                seek_step
            };
            if let Err(err) = controller.player_mut().seek_by(delta) {
                state.status = status_error(&format!("{err:#}"));
            }
        }
        KeyCode::Char('s') => {
            if controller.player().current().is_some() {
                state.status = match controller.player_mut().stop() {
                    Ok(()) => status_info("Playback stopped."),
                    Err(err) => status_error(&format!("Stop failed: {err:#}")),
                };
            }
        }
        KeyCode::Char('/') if state.searchable() => {
            state.editing_query = true;
            state.status = status_info("Type to search, Enter to finish.");
        }
        KeyCode::Char('o') => match state.route {
            Route::Shows => {
                state.show_sort = state.show_sort.next_for_shows();
                state.status = status_info(&format!("Sorted by {}", state.show_sort.label()));
            }
            Route::Favorites => {
                state.favorite_sort = state.favorite_sort.next_for_favorites();
                state.status = status_info(&format!("Sorted by {}", state.favorite_sort.label()));
            }
            _ => {}
        },
        KeyCode::Char('g') if state.route == Route::Shows => {
            state.genre = next_genre_filter(state.genre);
            state.table_state.select(Some(0));
            state.status = match state.genre {
                Some(id) => status_info(&format!("Genre: {}", genre_title(id))),
                None => status_info("Genre: all"),
            };
        }
        KeyCode::Char('t') => {
            state.status = match controller.library_mut().toggle_theme() {
                Ok(theme) => status_info(&format!("Theme: {theme}")),
                Err(err) => status_error(&format!("Theme change failed: {err:#}")),
            };
        }
        KeyCode::Char('r') => {
            if let Some(status) = retry(state, fetcher) {
                state.status = status;
            }
        }
        KeyCode::Char('x') if state.route == Route::Completed => {
            state.dialog = Some(Dialog::ConfirmReset);
            state.status = status_info("Confirm reset: y/Enter to reset, n/Esc to cancel.");
        }
        _ => {}
    }
    Flow::Continue
}
