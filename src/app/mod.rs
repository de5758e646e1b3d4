mod catalog;
mod controller;
mod episode;
mod genre;
mod library;
mod player;
mod tui;
mod views;

#[cfg(test)]
mod tests;

use anyhow::{Result, bail};

use crate::cli::{Cli, Command, SortArg};
use crate::config::Config;
use crate::paths::database_file_path;
use crate::store::{KeyValueStore, SqliteStore};

use self::catalog::{Catalog, CatalogClient, ShowPreview};
use self::controller::Controller;
use self::episode::{
    EpisodeKey, format_date_display, format_time, format_updated_display, season_label, truncate,
};
use self::genre::genre_titles;
use self::library::{FavoriteKind, Library};
use self::player::{AudioPlayer, MpvBackend};
use self::views::{Route, SortOrder, visible_favorites, visible_shows};

pub fn run(cli: Cli, config: Config) -> Result<()> {
    let store = open_store(&config)?;
    let mut library = Library::load(store);
    let catalog = CatalogClient::new(&config.catalog.base_url, config.catalog.http_settings());

    match cli.command {
        Some(Command::Shows {
            search,
            genre,
            sort,
        }) => run_shows(&catalog, &library, search.as_deref(), genre, sort)?,
        Some(Command::Show { id }) => run_show(&catalog, &library, &id)?,
        Some(Command::Favorites) => run_favorites(&library),
        Some(Command::History) => run_history(&library),
        Some(Command::Theme) => {
            let theme = library.toggle_theme()?;
            println!("Theme: {theme}");
        }
        Some(Command::ResetHistory { yes }) => {
            if !yes {
                bail!("refusing to reset listening history without --yes");
            }
            library.reset_history()?;
            println!("Listening history and saved positions cleared.");
        }
        Some(Command::Tui { route }) => run_tui(library, catalog, &config, route.as_deref())?,
        None => run_tui(library, catalog, &config, None)?,
    }

    Ok(())
}

fn run_tui(
    library: Library<SqliteStore>,
    catalog: CatalogClient,
    config: &Config,
    route: Option<&str>,
) -> Result<()> {
    let start = Route::parse(route.unwrap_or("/"))?;
    let player = AudioPlayer::new(MpvBackend::new(config.player.mpv_bin.clone()));
    let mut controller = Controller::new(library, player);
    tui::run_tui(
        &mut controller,
        catalog,
        start,
        config.player.seek_step_secs,
    )
}

/// The catalog listing behind `podshelf shows`. A genre filter asks the genre
/// endpoint first and falls back to the genre ids on each show.
fn list_shows_for_cli(
    catalog: &impl Catalog,
    search: Option<&str>,
    genre: Option<u32>,
    sort: SortOrder,
) -> Result<Vec<ShowPreview>> {
    let mut shows = catalog.list_shows()?;
    let mut local_genre = genre;
    if let Some(id) = genre {
        match catalog.genre(id) {
            Ok(found) => {
                shows.retain(|show| found.shows.contains(&show.id));
                local_genre = None;
            }
            Err(err) => {
                tracing::warn!(genre = id, error = %format!("{err:#}"), "genre lookup failed, filtering locally");
            }
        }
    }
    Ok(visible_shows(&shows, search.unwrap_or(""), local_genre, sort)
        .into_iter()
        .cloned()
        .collect())
}

fn run_shows<S: KeyValueStore>(
    catalog: &impl Catalog,
    library: &Library<S>,
    search: Option<&str>,
    genre: Option<u32>,
    sort: SortArg,
) -> Result<()> {
    let shows = list_shows_for_cli(catalog, search, genre, sort.into())?;
    if shows.is_empty() {
        println!("No shows match.");
        return Ok(());
    }

    println!(
        "{:<8} {:<2} {:<40} {:<8} {:<36} {:<10}",
        "ID", "", "TITLE", "SEASONS", "GENRES", "UPDATED"
    );
    for show in shows {
        println!(
            "{:<8} {:<2} {:<40} {:<8} {:<36} {:<10}",
            truncate(&show.id, 8),
            if library.is_favorite_show(&show.id) {
                "★"
            } else {
                ""
            },
            truncate(&show.title, 40),
            show.seasons,
            truncate(&genre_titles(&show.genres), 36),
            format_updated_display(&show.updated)
        );
    }
    Ok(())
}

fn run_show<S: KeyValueStore>(
    catalog: &impl Catalog,
    library: &Library<S>,
    id: &str,
) -> Result<()> {
    let show = catalog.show(id)?;
    println!("{}", show.title);
    println!("  Genres: {}", genre_titles(&show.genres));
    println!("  Updated: {}", format_updated_display(&show.updated));
    if library.is_favorite_show(&show.id) {
        println!("  ★ favorite");
    }

    for season in &show.seasons {
        println!();
        println!("{}", season_label(season.season, &season.title));
        println!("  {:<4} {:<2} {:<50} {:<8}", "EP", "", "TITLE", "RESUME");
        for episode in &season.episodes {
            let key = EpisodeKey::new(show.id.clone(), season.season, episode.episode);
            let resume = library.position(&key);
            println!(
                "  {:<4} {:<2} {:<50} {:<8}",
                episode.episode,
                if library.is_favorite_episode(&key) {
                    "★"
                } else {
                    ""
                },
                truncate(&episode.title, 50),
                if resume > 0.0 {
                    format_time(resume)
                } else {
                    "-".to_string()
                }
            );
        }
    }
    Ok(())
}

fn run_favorites<S: KeyValueStore>(library: &Library<S>) {
    let favorites = visible_favorites(library.favorites(), "", SortOrder::NewestAdded);
    if favorites.is_empty() {
        println!("No favorites yet.");
        return;
    }

    println!(
        "{:<8} {:<40} {:<30} {:<10} {:<17}",
        "KIND", "TITLE", "SHOW", "EPISODE", "ADDED"
    );
    for entry in favorites {
        let (kind, episode) = match &entry.kind {
            FavoriteKind::Show { .. } => ("show", "-".to_string()),
            FavoriteKind::Episode {
                season, episode, ..
            } => ("episode", format!("S{season} E{episode}")),
        };
        println!(
            "{:<8} {:<40} {:<30} {:<10} {:<17}",
            kind,
            truncate(entry.title(), 40),
            truncate(&entry.show_title, 30),
            episode,
            format_date_display(&entry.date_added)
        );
    }
}

fn run_history<S: KeyValueStore>(library: &Library<S>) {
    let entries = library.history().entries();
    if entries.is_empty() {
        println!("Nothing played yet.");
        return;
    }

    println!(
        "{:<40} {:<30} {:<10} {:<9} {:<10}",
        "TITLE", "SHOW", "EPISODE", "POSITION", "STATUS"
    );
    for entry in entries {
        println!(
            "{:<40} {:<30} {:<10} {:<9} {:<10}",
            truncate(&entry.title, 40),
            truncate(&entry.show_title, 30),
            format!("S{} E{}", entry.season, entry.episode),
            format_time(entry.current_time),
            if entry.completed {
                "completed"
            } else {
                "started"
            }
        );
    }
}

fn open_store(config: &Config) -> Result<SqliteStore> {
    let db_path = match &config.storage.database {
        Some(path) => path.clone(),
        None => database_file_path()?,
    };
    let store = SqliteStore::open(&db_path)?;
    store.migrate()?;
    Ok(store)
}
