use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, BorderType, Borders, Cell, Clear, Gauge, Padding, Paragraph, Row, Table, TableState,
    Wrap,
};

use crate::store::KeyValueStore;

use super::super::catalog::{Show, ShowPreview};
use super::super::controller::Controller;
use super::super::episode::{
    EpisodeKey, format_date_display, format_time, format_updated_display, season_label, truncate,
};
use super::super::genre::{genre_title, genre_titles};
use super::super::library::{FavoriteKind, Library, Theme};
use super::super::player::{AudioPlayer, MediaBackend};
use super::super::views::{
    Route, description_excerpt, featured, visible_favorites, visible_history, visible_shows,
};
use super::{Dialog, Remote, TuiState};

#[derive(Debug, Clone, Copy)]
struct Palette {
    background: Color,
    text: Color,
    muted: Color,
    accent: Color,
    on_accent: Color,
    border: Color,
    modal_border: Color,
    pill_bg: Color,
    pill_fg: Color,
    error: Color,
    info: Color,
    shadow: Color,
}

const DARK: Palette = Palette {
    background: Color::Black,
    text: Color::Rgb(230, 230, 230),
    muted: Color::Rgb(185, 195, 210),
    accent: Color::Rgb(110, 170, 255),
    on_accent: Color::Black,
    border: Color::Rgb(125, 135, 150),
    modal_border: Color::Rgb(160, 190, 235),
    pill_bg: Color::Rgb(72, 82, 96),
    pill_fg: Color::Rgb(230, 235, 242),
    error: Color::Rgb(255, 145, 120),
    info: Color::Rgb(205, 165, 255),
    shadow: Color::Rgb(14, 16, 24),
};

const LIGHT: Palette = Palette {
    background: Color::Rgb(246, 247, 250),
    text: Color::Rgb(32, 36, 44),
    muted: Color::Rgb(96, 104, 118),
    accent: Color::Rgb(36, 99, 200),
    on_accent: Color::White,
    border: Color::Rgb(160, 168, 180),
    modal_border: Color::Rgb(36, 99, 200),
    pill_bg: Color::Rgb(218, 223, 232),
    pill_fg: Color::Rgb(32, 36, 44),
    error: Color::Rgb(190, 50, 30),
    info: Color::Rgb(110, 60, 170),
    shadow: Color::Rgb(200, 204, 212),
};

fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Light => LIGHT,
        Theme::Dark => DARK,
    }
}

pub(super) fn draw_tui<S: KeyValueStore, B: MediaBackend>(
    frame: &mut Frame,
    state: &mut TuiState,
    controller: &Controller<S, B>,
) {
    let library = controller.library();
    let colors = palette(library.theme());
    let bg = Block::default().style(Style::default().bg(colors.background).fg(colors.text));
    frame.render_widget(bg, frame.area());

    let filter_height = if state.searchable() { 3 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(filter_height),
            Constraint::Min(8),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(frame.area());

    draw_header(frame, chunks[0], state, library, colors);
    if state.searchable() {
        draw_filter_bar(frame, chunks[1], state, colors);
    }

    match state.route.clone() {
        Route::Home => draw_home(frame, chunks[2], state, library, colors),
        Route::Shows => draw_shows(frame, chunks[2], state, library, colors),
        Route::Show(_) => draw_show(frame, chunks[2], state, library, colors),
        Route::Favorites => draw_favorites(frame, chunks[2], state, library, colors),
        Route::Completed => draw_history(frame, chunks[2], state, library, colors),
    }

    draw_player(frame, chunks[3], controller.player(), colors);

    let controls = Paragraph::new(controls_line(&state.route, colors))
        .alignment(Alignment::Center)
        .block(panel_block("Controls", colors));
    frame.render_widget(controls, chunks[4]);

    let status_widget = Paragraph::new(state.status.clone())
        .style(status_style(&state.status, colors))
        .block(panel_block("Status", colors));
    frame.render_widget(status_widget, chunks[5]);

    if let Some(dialog) = state.dialog {
        let (title, text) = match dialog {
            Dialog::ConfirmReset => (
                "Confirm Reset",
                "Reset listening history?\n\nEvery completed episode and saved position will be cleared.\n\n[y / Enter] Reset   [n / Esc] Cancel"
                    .to_string(),
            ),
            Dialog::ConfirmQuit => {
                let playing = controller
                    .player()
                    .current()
                    .map(|current| truncate(&current.title, 56))
                    .unwrap_or_default();
                (
                    "Confirm Quit",
                    format!(
                        "An episode is still playing.\n\n{playing}\n\nQuitting stops playback.\n\n[y / Enter] Quit   [n / Esc] Keep listening"
                    ),
                )
            }
        };
        let popup_area = popup_rect_for_text(frame.area(), &text);
        render_popup_shadow(frame, popup_area, colors);
        frame.render_widget(Clear, popup_area);
        let popup = Paragraph::new(text)
            .style(Style::default().bg(colors.background).fg(colors.text))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(modal_block(title, colors));
        frame.render_widget(popup, popup_area);
    }
}

fn draw_header<S: KeyValueStore>(
    frame: &mut Frame,
    area: Rect,
    state: &TuiState,
    library: &Library<S>,
    colors: Palette,
) {
    let active_tab = match state.route {
        Route::Home => 0,
        Route::Shows | Route::Show(_) => 1,
        Route::Favorites => 2,
        Route::Completed => 3,
    };
    let mut spans = vec![
        Span::styled(
            "PODSHELF",
            Style::default()
                .fg(colors.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("   "),
    ];
    for (idx, label) in ["1 Home", "2 Shows", "3 Favorites", "4 History"]
        .iter()
        .enumerate()
    {
        let style = if idx == active_tab {
            pill_active(colors)
        } else {
            pill_inactive(colors)
        };
        spans.push(Span::styled(format!(" {label} "), style));
        spans.push(Span::raw(" "));
    }
    spans.push(Span::styled(
        format!(
            "  {} favorites   theme {}",
            library.favorites().len(),
            library.theme()
        ),
        Style::default().fg(colors.muted),
    ));
    let header = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(panel_block(state.route.title(), colors));
    frame.render_widget(header, area);
}

fn draw_filter_bar(frame: &mut Frame, area: Rect, state: &TuiState, colors: Palette) {
    let cursor = if state.editing_query { "▏" } else { "" };
    let query_style = if state.editing_query {
        Style::default()
            .fg(colors.accent)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(colors.text)
    };
    let mut spans = vec![
        Span::styled("Search ", Style::default().fg(colors.muted)),
        Span::styled(format!("{}{cursor}", state.query), query_style),
    ];
    let sort = match state.route {
        Route::Shows => Some(state.show_sort),
        Route::Favorites => Some(state.favorite_sort),
        _ => None,
    };
    if let Some(sort) = sort {
        spans.push(Span::styled("   Sort ", Style::default().fg(colors.muted)));
        spans.push(Span::styled(sort.label(), Style::default().fg(colors.text)));
    }
    if state.route == Route::Shows {
        spans.push(Span::styled("   Genre ", Style::default().fg(colors.muted)));
        spans.push(Span::styled(
            state.genre.map(genre_title).unwrap_or("All"),
            Style::default().fg(colors.text),
        ));
    }
    let bar = Paragraph::new(Line::from(spans)).block(panel_block("Filter", colors));
    frame.render_widget(bar, area);
}

fn fetch_placeholder<T>(remote: &Remote<T>, what: &str) -> Option<String> {
    match remote {
        Remote::Ready(_) => None,
        Remote::Loading => Some(format!("Loading {what}...")),
        Remote::Failed(message) => Some(format!("Error: {message}\n\nPress r to retry.")),
    }
}

fn draw_placeholder(frame: &mut Frame, area: Rect, title: &str, text: String, colors: Palette) {
    let style = if text.starts_with("Error:") {
        Style::default().fg(colors.error)
    } else {
        Style::default().fg(colors.muted)
    };
    let widget = Paragraph::new(text)
        .style(style)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(panel_block(title, colors));
    frame.render_widget(widget, area);
}

fn header_row(labels: Vec<&'static str>, colors: Palette) -> Row<'static> {
    Row::new(labels).style(
        Style::default()
            .fg(colors.accent)
            .add_modifier(Modifier::BOLD),
    )
}

#[allow(clippy::too_many_arguments)]
fn render_table(
    frame: &mut Frame,
    area: Rect,
    table_state: &mut TableState,
    title: &str,
    header: Row<'static>,
    rows: Vec<Row<'static>>,
    widths: Vec<Constraint>,
    colors: Palette,
) {
    let table = Table::new(rows, widths)
        .header(header)
        .block(panel_block(title, colors))
        .row_highlight_style(
            Style::default()
                .bg(colors.accent)
                .fg(colors.on_accent)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▸ ");
    frame.render_stateful_widget(table, area, table_state);
}

fn favorite_marker(is_favorite: bool) -> &'static str {
    if is_favorite { "★" } else { "" }
}

fn show_rows<S: KeyValueStore>(shows: &[&ShowPreview], library: &Library<S>) -> Vec<Row<'static>> {
    shows
        .iter()
        .map(|show| {
            Row::new(vec![
                Cell::from(favorite_marker(library.is_favorite_show(&show.id))),
                Cell::from(show.title.clone()),
                Cell::from(show.seasons.to_string()),
                Cell::from(genre_titles(&show.genres)),
                Cell::from(format_updated_display(&show.updated)),
            ])
        })
        .collect()
}

fn show_widths() -> Vec<Constraint> {
    vec![
        Constraint::Length(2),
        Constraint::Percentage(40),
        Constraint::Length(8),
        Constraint::Percentage(34),
        Constraint::Length(12),
    ]
}

fn draw_home<S: KeyValueStore>(
    frame: &mut Frame,
    area: Rect,
    state: &mut TuiState,
    library: &Library<S>,
    colors: Palette,
) {
    let shows = match &state.shows {
        Remote::Ready(shows) => shows,
        other => {
            let text = fetch_placeholder(other, "shows").unwrap_or_default();
            draw_placeholder(frame, area, "Featured", text, colors);
            return;
        }
    };

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(64), Constraint::Percentage(36)])
        .split(area);

    let picks = featured(shows).iter().collect::<Vec<_>>();
    let selected = state
        .table_state
        .selected()
        .and_then(|idx| picks.get(idx).copied());
    let about = match selected {
        Some(show) => format!(
            "{}\n\n{}\n\nGenres\n{}\n\nUpdated\n{}",
            truncate(&show.title, 40),
            description_excerpt(&show.description),
            genre_titles(&show.genres),
            format_updated_display(&show.updated),
        ),
        None => "No shows in the catalog.".to_string(),
    };
    let rows = show_rows(&picks, library);

    render_table(
        frame,
        body[0],
        &mut state.table_state,
        "Featured",
        header_row(vec!["", "Title", "Seasons", "Genres", "Updated"], colors),
        rows,
        show_widths(),
        colors,
    );
    let about = Paragraph::new(about)
        .style(Style::default().fg(colors.text))
        .wrap(Wrap { trim: true })
        .block(panel_block("About", colors));
    frame.render_widget(about, body[1]);
}

fn draw_shows<S: KeyValueStore>(
    frame: &mut Frame,
    area: Rect,
    state: &mut TuiState,
    library: &Library<S>,
    colors: Palette,
) {
    let shows = match &state.shows {
        Remote::Ready(shows) => shows,
        other => {
            let text = fetch_placeholder(other, "shows").unwrap_or_default();
            draw_placeholder(frame, area, "Shows", text, colors);
            return;
        }
    };
    let visible = visible_shows(shows, &state.query, state.genre, state.show_sort);
    if visible.is_empty() {
        draw_placeholder(
            frame,
            area,
            "Shows",
            "No shows match the current search.".to_string(),
            colors,
        );
        return;
    }
    let title = format!("Shows ({} of {})", visible.len(), shows.len());
    let rows = show_rows(&visible, library);
    render_table(
        frame,
        area,
        &mut state.table_state,
        &title,
        header_row(vec!["", "Title", "Seasons", "Genres", "Updated"], colors),
        rows,
        show_widths(),
        colors,
    );
}

fn show_summary<S: KeyValueStore>(show: &Show, library: &Library<S>) -> String {
    let mut text = format!(
        "{}{}\n\nGenres\n{}\n\nUpdated\n{}\n\n",
        show.title,
        if library.is_favorite_show(&show.id) {
            "  ★"
        } else {
            ""
        },
        genre_titles(&show.genres),
        format_updated_display(&show.updated),
    );
    for season in &show.seasons {
        text.push_str(&format!(
            "{} ({} episodes)\n",
            season_label(season.season, &season.title),
            season.episodes.len()
        ));
    }
    if !show.description.trim().is_empty() {
        text.push('\n');
        text.push_str(show.description.trim());
    }
    text
}

fn draw_show<S: KeyValueStore>(
    frame: &mut Frame,
    area: Rect,
    state: &mut TuiState,
    library: &Library<S>,
    colors: Palette,
) {
    let show = match &state.show {
        Some(Remote::Ready(show)) => show,
        Some(other) => {
            let text = fetch_placeholder(other, "show details").unwrap_or_default();
            draw_placeholder(frame, area, "Show", text, colors);
            return;
        }
        None => {
            draw_placeholder(frame, area, "Show", "Loading show details...".to_string(), colors);
            return;
        }
    };

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(36), Constraint::Percentage(64)])
        .split(area);

    let mut summary_text = show_summary(show, library);
    let selected_episode = state.table_state.selected().and_then(|idx| {
        show.seasons
            .iter()
            .flat_map(|season| season.episodes.iter())
            .nth(idx)
    });
    if let Some(episode) = selected_episode {
        summary_text.push_str(&format!("\n\nEpisode {}\n{}", episode.episode, episode.title));
        if !episode.description.trim().is_empty() {
            summary_text.push_str(&format!("\n{}", episode.description.trim()));
        }
    }
    let summary = Paragraph::new(summary_text)
        .style(Style::default().fg(colors.text))
        .wrap(Wrap { trim: false })
        .block(panel_block("Show", colors));
    frame.render_widget(summary, body[0]);

    let rows = show
        .seasons
        .iter()
        .flat_map(|season| {
            season.episodes.iter().map(move |episode| {
                let key = EpisodeKey::new(show.id.clone(), season.season, episode.episode);
                let id = key.encode();
                let resume = library.position(&key);
                let completed = library
                    .history()
                    .entry(&id)
                    .is_some_and(|entry| entry.completed);
                Row::new(vec![
                    Cell::from(favorite_marker(library.is_favorite_episode(&key))),
                    Cell::from(format!("S{}", season.season)),
                    Cell::from(episode.episode.to_string()),
                    Cell::from(episode.title.clone()),
                    Cell::from(if resume > 0.0 {
                        format_time(resume)
                    } else {
                        "-".to_string()
                    }),
                    Cell::from(if completed { "✓" } else { "" }),
                ])
            })
        })
        .collect::<Vec<_>>();

    if rows.is_empty() {
        draw_placeholder(
            frame,
            body[1],
            "Episodes",
            "This show has no episodes.".to_string(),
            colors,
        );
        return;
    }
    render_table(
        frame,
        body[1],
        &mut state.table_state,
        "Episodes",
        header_row(vec!["", "Season", "Ep", "Title", "Resume", "Done"], colors),
        rows,
        vec![
            Constraint::Length(2),
            Constraint::Length(7),
            Constraint::Length(4),
            Constraint::Min(20),
            Constraint::Length(8),
            Constraint::Length(5),
        ],
        colors,
    );
}

fn draw_favorites<S: KeyValueStore>(
    frame: &mut Frame,
    area: Rect,
    state: &mut TuiState,
    library: &Library<S>,
    colors: Palette,
) {
    let visible = visible_favorites(library.favorites(), &state.query, state.favorite_sort);
    if visible.is_empty() {
        let text = if library.favorites().is_empty() {
            "No favorites yet. Press f on a show or episode to add one."
        } else {
            "No favorites match the current search."
        };
        draw_placeholder(frame, area, "Favorites", text.to_string(), colors);
        return;
    }

    let rows = visible
        .iter()
        .map(|entry| {
            let (kind, episode) = match &entry.kind {
                FavoriteKind::Show { seasons } => ("Show", format!("{seasons} seasons")),
                FavoriteKind::Episode {
                    season, episode, ..
                } => ("Episode", format!("S{season} E{episode}")),
            };
            Row::new(vec![
                Cell::from(kind),
                Cell::from(entry.title().to_string()),
                Cell::from(entry.show_title.clone()),
                Cell::from(episode),
                Cell::from(format_date_display(&entry.date_added)),
                Cell::from(format_updated_display(&entry.updated)),
            ])
        })
        .collect::<Vec<_>>();

    render_table(
        frame,
        area,
        &mut state.table_state,
        "Favorites",
        header_row(
            vec!["Kind", "Title", "Show", "Episode", "Added", "Updated"],
            colors,
        ),
        rows,
        vec![
            Constraint::Length(8),
            Constraint::Percentage(30),
            Constraint::Percentage(24),
            Constraint::Length(12),
            Constraint::Length(17),
            Constraint::Length(11),
        ],
        colors,
    );
}

fn draw_history<S: KeyValueStore>(
    frame: &mut Frame,
    area: Rect,
    state: &mut TuiState,
    library: &Library<S>,
    colors: Palette,
) {
    let visible = visible_history(library.history().entries(), &state.query);
    if visible.is_empty() {
        let text = if library.history().entries().is_empty() {
            "Nothing played yet."
        } else {
            "No history entries match the current search."
        };
        draw_placeholder(frame, area, "Listening History", text.to_string(), colors);
        return;
    }

    let completed_count = library.history().completed().count();
    let rows = visible
        .iter()
        .map(|entry| {
            let status = match (entry.completed, entry.completed_at.as_ref()) {
                (true, Some(at)) => format!("Completed {}", format_date_display(at)),
                (true, None) => "Completed".to_string(),
                (false, _) => "In progress".to_string(),
            };
            Row::new(vec![
                Cell::from(entry.title.clone()),
                Cell::from(entry.show_title.clone()),
                Cell::from(format!("S{} E{}", entry.season, entry.episode)),
                Cell::from(format_time(entry.current_time)),
                Cell::from(status),
                Cell::from(format_date_display(&entry.started_at)),
            ])
        })
        .collect::<Vec<_>>();

    render_table(
        frame,
        area,
        &mut state.table_state,
        &format!("Listening History ({completed_count} completed)"),
        header_row(
            vec!["Title", "Show", "Episode", "Position", "Status", "Last played"],
            colors,
        ),
        rows,
        vec![
            Constraint::Percentage(28),
            Constraint::Percentage(20),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(28),
            Constraint::Length(17),
        ],
        colors,
    );
}

fn draw_player<B: MediaBackend>(
    frame: &mut Frame,
    area: Rect,
    player: &AudioPlayer<B>,
    colors: Palette,
) {
    let Some(current) = player.current() else {
        let idle = Paragraph::new("Nothing playing. Select an episode and press Enter.")
            .style(Style::default().fg(colors.muted))
            .block(panel_block("Player", colors));
        frame.render_widget(idle, area);
        return;
    };

    let duration = player.duration();
    let ratio = match duration {
        Some(total) if total > 0.0 => (player.position() / total).clamp(0.0, 1.0),
        _ => 0.0,
    };
    let label = format!(
        "{}  {} · {}  {} / {}",
        player.state().label(),
        truncate(&current.title, 40),
        truncate(&current.show_title, 24),
        format_time(player.position()),
        duration.map(format_time).unwrap_or_else(|| "--:--".to_string()),
    );
    let gauge = Gauge::default()
        .block(panel_block("Player", colors))
        .gauge_style(
            Style::default()
                .fg(colors.accent)
                .bg(colors.pill_bg)
                .add_modifier(Modifier::BOLD),
        )
        .label(label)
        .ratio(ratio);
    frame.render_widget(gauge, area);
}

fn controls_line(route: &Route, colors: Palette) -> Line<'static> {
    let route_keys = match route {
        Route::Home => "Enter open  f favorite",
        Route::Shows => "/ search  o sort  g genre  Enter open  f favorite",
        Route::Show(_) => "Enter play  f fav episode  F fav show  Esc back",
        Route::Favorites => "/ search  o sort  Enter play/open  f remove",
        Route::Completed => "/ search  Enter play again  x reset",
    };
    Line::from(vec![
        Span::styled(format!(" {route_keys} "), pill_active(colors)),
        Span::styled(
            "   ↑/↓ move  space play/pause  ←/→ seek  s stop  r retry  t theme  q quit",
            Style::default().fg(colors.muted),
        ),
    ])
}

fn panel_block(title: &str, colors: Palette) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(colors.border))
        .title(title.to_string())
}

fn modal_block(title: &str, colors: Palette) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(
            Style::default()
                .fg(colors.modal_border)
                .add_modifier(Modifier::BOLD),
        )
        .title(title.to_string())
        .padding(Padding::new(2, 2, 1, 1))
}

fn pill_active(colors: Palette) -> Style {
    Style::default()
        .bg(colors.accent)
        .fg(colors.on_accent)
        .add_modifier(Modifier::BOLD)
}

fn pill_inactive(colors: Palette) -> Style {
    Style::default().bg(colors.pill_bg).fg(colors.pill_fg)
}

fn status_style(status: &str, colors: Palette) -> Style {
    if status.starts_with("ERROR:") {
        Style::default()
            .fg(colors.error)
            .add_modifier(Modifier::BOLD)
    } else if status.starts_with("INFO:") {
        Style::default().fg(colors.info)
    } else {
        Style::default().fg(colors.text)
    }
}

fn centered_fixed_rect(width: u16, height: u16, area: Rect) -> Rect {
    let clamped_width = width.min(area.width.max(1));
    let clamped_height = height.min(area.height.max(1));
    let x = area.x + area.width.saturating_sub(clamped_width) / 2;
    let y = area.y + area.height.saturating_sub(clamped_height) / 2;
    Rect::new(x, y, clamped_width, clamped_height)
}

fn render_popup_shadow(frame: &mut Frame, popup_area: Rect, colors: Palette) {
    let area = frame.area();
    let shadow = Rect::new(
        (popup_area.x + 1).min(area.x + area.width.saturating_sub(1)),
        (popup_area.y + 1).min(area.y + area.height.saturating_sub(1)),
        popup_area.width.saturating_sub(1),
        popup_area.height.saturating_sub(1),
    );
    if shadow.width == 0 || shadow.height == 0 {
        return;
    }
    frame.render_widget(
        Block::default().style(Style::default().bg(colors.shadow)),
        shadow,
    );
}

fn popup_rect_for_text(area: Rect, text: &str) -> Rect {
    let max_line_width = text
        .lines()
        .map(|line| line.chars().count() as u16)
        .max()
        .unwrap_or(0);
    let line_count = text.lines().count() as u16;

    let available_width = area.width.saturating_sub(2).max(1);
    let width = max_line_width
        .saturating_add(12)
        .clamp(48.min(available_width), 80.min(available_width));

    let available_height = area.height.saturating_sub(2).max(1);
    let height = line_count
        .saturating_add(6)
        .clamp(10.min(available_height), 18.min(available_height));

    centered_fixed_rect(width, height, area)
}
