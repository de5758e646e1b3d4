use anyhow::{Result, anyhow, bail};
use chrono::{Duration, Utc};

use crate::store::{FAVORITES_KEY, HISTORY_KEY, KeyValueStore, POSITIONS_KEY, SqliteStore, THEME_KEY};

use super::catalog::{Catalog, Genre, Show, ShowPreview, parse_show, parse_show_previews};
use super::controller::{Controller, Notice};
use super::episode::*;
use super::genre::*;
use super::library::{FavoriteEntry, Library, Theme};
use super::list_shows_for_cli;
use super::player::{
    AudioPlayer, MediaBackend, MediaEvent, NowPlaying, PlayerState, parse_mpv_message,
};
use super::views::*;

/// Records every call and replays queued events on the next poll.
#[derive(Debug, Default)]
pub(crate) struct FakeBackend {
    pub(crate) loaded: Vec<(String, f64)>,
    pub(crate) paused: Option<bool>,
    pub(crate) seeks: Vec<f64>,
    pub(crate) stops: usize,
    pub(crate) queued: Vec<MediaEvent>,
    pub(crate) fail_load: bool,
}

impl MediaBackend for FakeBackend {
    fn load(&mut self, url: &str, start_at: f64) -> Result<()> {
        if self.fail_load {
            bail!("no such file");
        }
        self.loaded.push((url.to_string(), start_at));
        Ok(())
    }

    fn set_paused(&mut self, paused: bool) -> Result<()> {
        self.paused = Some(paused);
        Ok(())
    }

    fn seek(&mut self, seconds: f64) -> Result<()> {
        self.seeks.push(seconds);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.stops += 1;
        Ok(())
    }

    fn poll_events(&mut self) -> Vec<MediaEvent> {
        std::mem::take(&mut self.queued)
    }
}

struct FakeCatalog {
    shows: Vec<ShowPreview>,
    genre: Option<Genre>,
}

impl Catalog for FakeCatalog {
    fn list_shows(&self) -> Result<Vec<ShowPreview>> {
        Ok(self.shows.clone())
    }

    fn show(&self, id: &str) -> Result<Show> {
        bail!("show {id} is not in the fake catalog")
    }

    fn genre(&self, id: u32) -> Result<Genre> {
        self.genre
            .clone()
            .ok_or_else(|| anyhow!("genre {id} unavailable"))
    }
}

pub(crate) fn sample_show() -> Show {
    parse_show(
        r#"{
            "id": "10716",
            "title": "Something Was Wrong",
            "description": "Survivors tell their stories.",
            "image": "https://img/10716.jpg",
            "genres": ["Personal Growth", "Investigative Journalism"],
            "updated": "2022-11-03T07:00:00.000Z",
            "seasons": [
                {
                    "season": 1,
                    "title": "Season 1",
                    "image": "https://img/s1.jpg",
                    "episodes": [
                        {"episode": 2, "title": "Episode Two", "description": "", "file": "https://audio/2.mp3"},
                        {"episode": 1, "title": "Episode One", "description": "", "file": "https://audio/1.mp3"}
                    ]
                }
            ]
        }"#,
    )
    .expect("sample show should parse")
}

pub(crate) fn sample_previews() -> Vec<ShowPreview> {
    parse_show_previews(
        r#"[
            {"id": "1", "title": "Morning Brief", "description": "Daily news roundup", "seasons": 3, "genres": [8], "updated": "2022-05-01T00:00:00.000Z"},
            {"id": "2", "title": "laugh track", "description": "Stand-up Comedy from small clubs", "seasons": 1, "genres": [4, 5], "updated": "2023-01-10T00:00:00.000Z"},
            {"id": "3", "title": "Build Notes", "description": "Founders on business", "seasons": 2, "genres": [6], "updated": "2021-09-15T00:00:00.000Z"}
        ]"#,
    )
    .expect("sample previews should parse")
}

fn library() -> Library<SqliteStore> {
    let store = SqliteStore::open_in_memory().expect("in-memory store");
    store.migrate().expect("migrate");
    Library::load(store)
}

fn reload(library: Library<SqliteStore>) -> Library<SqliteStore> {
    Library::load(library.into_store())
}

fn controller() -> Controller<SqliteStore, FakeBackend> {
    Controller::new(library(), AudioPlayer::new(FakeBackend::default()))
}

fn key(episode: u32) -> EpisodeKey {
    EpisodeKey::new("10716", 1, episode)
}

#[test]
fn toggling_show_favorite_twice_restores_original_set() {
    let mut library = library();
    let show = &sample_previews()[0];

    assert!(library.toggle_favorite_show(show).expect("add"));
    assert!(library.is_favorite_show("1"));
    assert!(!library.toggle_favorite_show(show).expect("remove"));
    assert!(!library.is_favorite_show("1"));
    assert!(library.favorites().is_empty());
}

#[test]
fn episode_favorite_follows_latest_toggle() {
    let mut library = library();
    let show = sample_show();

    library
        .toggle_favorite_episode(&show, &key(2))
        .expect("toggle on");
    assert!(library.is_favorite_episode(&key(2)));
    assert!(!library.is_favorite_episode(&key(1)));
    assert!(!library.is_favorite_show("10716"));

    library
        .toggle_favorite_episode(&show, &key(2))
        .expect("toggle off");
    assert!(!library.is_favorite_episode(&key(2)));
}

#[test]
fn favorites_survive_reload() {
    let mut library = library();
    let show = sample_show();
    library
        .toggle_favorite_episode(&show, &key(1))
        .expect("toggle episode");
    library
        .toggle_favorite_show(&show.preview())
        .expect("toggle show");

    let library = reload(library);
    assert_eq!(library.favorites().len(), 2);
    assert!(library.is_favorite_episode(&key(1)));
    assert!(library.is_favorite_show("10716"));
    let episode = library
        .favorites()
        .iter()
        .find(|entry| entry.id == "10716:1:1")
        .expect("episode favorite");
    assert_eq!(episode.title(), "Episode One");
    assert_eq!(episode.episode_key(), Some(key(1)));
}

#[test]
fn toggling_episode_missing_from_show_fails_without_change() {
    let mut library = library();
    let err = library
        .toggle_favorite_episode(&sample_show(), &key(9))
        .expect_err("missing episode");
    assert!(err.to_string().contains("episode 9 not found"));
    assert!(library.favorites().is_empty());
}

#[test]
fn record_play_twice_keeps_one_entry_with_latest_fields() {
    let mut library = library();
    let episode = NowPlaying::from_show(&sample_show(), &key(1)).expect("episode");

    library
        .record_play(episode.history_entry(10.0))
        .expect("first play");
    library
        .record_play(episode.history_entry(95.0))
        .expect("second play");

    let library = reload(library);
    let entries = library.history().entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, "10716:1:1");
    assert_eq!(entries[0].current_time, 95.0);
}

#[test]
fn replay_keeps_completion_timestamp() {
    let mut library = library();
    let episode = NowPlaying::from_show(&sample_show(), &key(1)).expect("episode");

    library
        .mark_completed(episode.history_entry(0.0))
        .expect("complete");
    let completed_at = library.history().entries()[0].completed_at;
    assert!(completed_at.is_some());

    library
        .record_play(episode.history_entry(0.0))
        .expect("replay");
    let entry = &library.history().entries()[0];
    assert!(!entry.completed);
    assert_eq!(entry.completed_at, completed_at);
}

#[test]
fn update_position_survives_reload_and_patches_history() {
    let mut library = library();
    let episode = NowPlaying::from_show(&sample_show(), &key(2)).expect("episode");
    library
        .record_play(episode.history_entry(0.0))
        .expect("play");

    library.update_position(&key(2), 321.5).expect("position");

    let library = reload(library);
    assert_eq!(library.position(&key(2)), 321.5);
    assert_eq!(library.position(&key(1)), 0.0);
    assert_eq!(
        library.history().entry("10716:1:2").map(|entry| entry.current_time),
        Some(321.5)
    );
}

#[test]
fn reset_history_then_reload_yields_defaults() {
    let mut library = library();
    let episode = NowPlaying::from_show(&sample_show(), &key(1)).expect("episode");
    library
        .record_play(episode.history_entry(0.0))
        .expect("play");
    library.update_position(&key(1), 12.0).expect("position");
    library
        .toggle_favorite_show(&sample_previews()[1])
        .expect("favorite");

    library.reset_history().expect("reset");
    assert!(library.history().entries().is_empty());
    assert!(library.positions().is_empty());

    let library = reload(library);
    assert!(library.history().entries().is_empty());
    assert_eq!(library.position(&key(1)), 0.0);
    assert_eq!(library.favorites().len(), 1);

    let store = library.into_store();
    assert_eq!(store.get(HISTORY_KEY).expect("read"), None);
    assert_eq!(store.get(POSITIONS_KEY).expect("read"), None);
}

#[test]
fn theme_toggle_persists_dark_then_light() {
    let mut library = library();
    assert_eq!(library.theme(), Theme::Light);

    assert_eq!(library.toggle_theme().expect("toggle"), Theme::Dark);
    let mut library = reload(library);
    assert_eq!(library.theme(), Theme::Dark);

    assert_eq!(library.toggle_theme().expect("toggle"), Theme::Light);
    let library = reload(library);
    assert_eq!(library.theme(), Theme::Light);
    assert_eq!(
        library.into_store().get(THEME_KEY).expect("read"),
        Some("light".to_string())
    );
}

#[test]
fn corrupt_payloads_fall_back_to_defaults() {
    let store = SqliteStore::open_in_memory().expect("store");
    store.migrate().expect("migrate");
    store.set(FAVORITES_KEY, "{not json").expect("write");
    store.set(HISTORY_KEY, "42").expect("write");
    store.set(THEME_KEY, "\"dark\"").expect("write");

    let library = Library::load(store);
    assert!(library.favorites().is_empty());
    assert!(library.history().entries().is_empty());
    assert_eq!(library.theme(), Theme::Dark);
}

#[test]
fn stored_positions_with_malformed_keys_are_dropped() {
    let store = SqliteStore::open_in_memory().expect("store");
    store.migrate().expect("migrate");
    store
        .set(POSITIONS_KEY, r#"{"10716:1:2": 42.5, "10716-1-2": 9.0, "10716:x:1": 3.0}"#)
        .expect("write");

    let library = Library::load(store);
    assert_eq!(library.positions().len(), 1);
    assert_eq!(library.position(&key(2)), 42.5);
}

#[test]
fn completing_second_episode_records_only_that_episode() {
    let mut controller = controller();
    let show = sample_show();

    controller.play_from_show(&show, &key(2)).expect("play");
    assert_eq!(controller.player().state(), PlayerState::Loading);
    controller.player_mut().backend_mut().queued = vec![
        MediaEvent::Loaded,
        MediaEvent::Duration(600.0),
        MediaEvent::TimeUpdate(30.0),
        MediaEvent::Ended,
    ];

    let notices = controller.pump();
    assert_eq!(
        notices,
        vec![Notice::Info("Completed: Episode Two".to_string())]
    );
    assert_eq!(controller.player().state(), PlayerState::Completed);

    let library = reload(controller.into_library());
    let entries = library.history().entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, "10716:1:2");
    assert!(entries[0].completed);
    assert!(entries[0].completed_at.is_some());
    assert_eq!(library.position(&key(2)), 0.0);
    assert_eq!(library.history().completed().count(), 1);
}

#[test]
fn play_resumes_from_stored_position() {
    let mut controller = controller();
    controller
        .library_mut()
        .update_position(&key(1), 42.5)
        .expect("position");

    controller
        .play_from_show(&sample_show(), &key(1))
        .expect("play");

    assert_eq!(
        controller.player_mut().backend_mut().loaded,
        vec![("https://audio/1.mp3".to_string(), 42.5)]
    );
    assert_eq!(controller.player().position(), 42.5);
    assert_eq!(
        controller
            .library()
            .history()
            .entry("10716:1:1")
            .map(|entry| entry.current_time),
        Some(42.5)
    );
}

#[test]
fn play_of_missing_episode_leaves_playback_untouched() {
    let mut controller = controller();
    let show = sample_show();
    controller.play_from_show(&show, &key(1)).expect("play");

    let err = controller
        .play_from_show(&show, &key(7))
        .expect_err("missing episode");
    assert!(err.to_string().contains("episode 7 not found"));

    assert_eq!(
        controller.player().current().map(|current| current.key.clone()),
        Some(key(1))
    );
    assert_eq!(controller.player_mut().backend_mut().loaded.len(), 1);
    assert_eq!(controller.library().history().entries().len(), 1);
}

#[test]
fn failed_load_resets_player_and_skips_history() {
    let mut controller = controller();
    controller.player_mut().backend_mut().fail_load = true;

    let err = controller
        .play_from_show(&sample_show(), &key(1))
        .expect_err("load should fail");
    assert!(format!("{err:#}").contains("no such file"));
    assert_eq!(controller.player().state(), PlayerState::Idle);
    assert!(controller.player().current().is_none());
    assert!(controller.library().history().entries().is_empty());
}

#[test]
fn backend_failure_surfaces_error_notice() {
    let mut controller = controller();
    controller
        .play_from_show(&sample_show(), &key(1))
        .expect("play");
    controller.player_mut().backend_mut().queued =
        vec![MediaEvent::Failed("decoder exploded".to_string())];

    let notices = controller.pump();
    assert_eq!(
        notices,
        vec![Notice::Error("Playback failed: decoder exploded".to_string())]
    );
    assert_eq!(controller.player().state(), PlayerState::Idle);
}

#[test]
fn replaying_from_history_starts_stored_episode() {
    let mut controller = controller();
    controller
        .play_from_show(&sample_show(), &key(2))
        .expect("play");
    let entry = controller
        .library()
        .history()
        .entry("10716:1:2")
        .cloned()
        .expect("history entry");

    controller
        .play(NowPlaying::from_history(&entry))
        .expect("replay");
    assert_eq!(controller.player_mut().backend_mut().loaded.len(), 2);
    assert_eq!(controller.library().history().entries().len(), 1);
}

fn player() -> AudioPlayer<FakeBackend> {
    AudioPlayer::new(FakeBackend::default())
}

fn now_playing(episode: u32) -> NowPlaying {
    NowPlaying::from_show(&sample_show(), &key(episode)).expect("episode")
}

#[test]
fn seek_is_rejected_while_idle_or_loading() {
    let mut player = player();
    assert!(player.seek(10.0).is_err());

    player.select_episode(now_playing(1), 0.0).expect("select");
    assert_eq!(player.state(), PlayerState::Loading);
    let err = player.seek(10.0).expect_err("loading");
    assert!(err.to_string().contains("loading"));
    assert!(player.backend_mut().seeks.is_empty());
}

#[test]
fn seek_clamps_to_known_duration() {
    let mut player = player();
    player.select_episode(now_playing(1), 0.0).expect("select");
    player.handle_event(MediaEvent::Duration(120.0));
    assert_eq!(player.state(), PlayerState::Playing);

    player.seek(500.0).expect("seek");
    assert_eq!(player.position(), 120.0);
    player.seek_by(-1000.0).expect("seek back");
    assert_eq!(player.position(), 0.0);
    assert_eq!(player.state(), PlayerState::Playing);
}

#[test]
fn toggle_play_switches_between_playing_and_paused() {
    let mut player = player();
    player.toggle_play().expect("idle toggle is a no-op");
    assert_eq!(player.state(), PlayerState::Idle);

    player.select_episode(now_playing(1), 0.0).expect("select");
    player.handle_event(MediaEvent::Loaded);
    player.toggle_play().expect("pause");
    assert_eq!(player.state(), PlayerState::Paused);
    assert_eq!(player.backend_mut().paused, Some(true));
    player.toggle_play().expect("resume");
    assert_eq!(player.state(), PlayerState::Playing);
    assert_eq!(player.backend_mut().paused, Some(false));
}

#[test]
fn toggle_play_after_completion_restarts_from_zero() {
    let mut player = player();
    player.select_episode(now_playing(1), 50.0).expect("select");
    player.handle_event(MediaEvent::TimeUpdate(60.0));
    let signals = player.handle_event(MediaEvent::Ended);
    assert_eq!(signals.len(), 1);
    assert_eq!(player.state(), PlayerState::Completed);
    assert!(!player.is_active());

    player.toggle_play().expect("restart");
    assert_eq!(player.state(), PlayerState::Playing);
    assert_eq!(player.position(), 0.0);
    assert_eq!(player.backend_mut().seeks, vec![0.0]);
}

#[test]
fn end_of_file_while_loading_completes_episode() {
    let mut player = player();
    player.select_episode(now_playing(2), 9_000.0).expect("select");
    assert_eq!(player.state(), PlayerState::Loading);

    let signals = player.handle_event(MediaEvent::Ended);
    assert_eq!(signals.len(), 1);
    assert_eq!(player.state(), PlayerState::Completed);
    assert_eq!(player.position(), 0.0);
}

#[test]
fn selecting_new_episode_discards_previous_one() {
    let mut player = player();
    player.select_episode(now_playing(1), 0.0).expect("first");
    player.handle_event(MediaEvent::TimeUpdate(10.0));
    player.select_episode(now_playing(2), 5.0).expect("second");

    assert_eq!(player.state(), PlayerState::Loading);
    assert_eq!(player.position(), 5.0);
    assert_eq!(player.duration(), None);
    assert_eq!(
        player.current().map(|current| current.key.clone()),
        Some(key(2))
    );
    assert_eq!(player.backend_mut().loaded.len(), 2);
}

#[test]
fn episode_without_file_is_not_loaded() {
    let mut player = player();
    let mut episode = now_playing(1);
    episode.file = "  ".to_string();

    assert!(player.select_episode(episode, 0.0).is_err());
    assert_eq!(player.state(), PlayerState::Idle);
    assert!(player.backend_mut().loaded.is_empty());
}

#[test]
fn stop_returns_player_to_idle() {
    let mut player = player();
    player.select_episode(now_playing(1), 0.0).expect("select");
    player.stop().expect("stop");

    assert_eq!(player.state(), PlayerState::Idle);
    assert!(player.current().is_none());
    assert_eq!(player.backend_mut().stops, 1);
    assert!(player.handle_event(MediaEvent::TimeUpdate(4.0)).is_empty());
}

#[test]
fn mpv_messages_map_to_media_events() {
    assert_eq!(
        parse_mpv_message(r#"{"event":"property-change","id":1,"name":"time-pos","data":12.5}"#),
        Some(MediaEvent::TimeUpdate(12.5))
    );
    assert_eq!(
        parse_mpv_message(r#"{"event":"property-change","id":2,"name":"duration","data":300.0}"#),
        Some(MediaEvent::Duration(300.0))
    );
    assert_eq!(
        parse_mpv_message(r#"{"event":"property-change","id":3,"name":"pause","data":true}"#),
        Some(MediaEvent::Paused(true))
    );
    assert_eq!(
        parse_mpv_message(r#"{"event":"property-change","id":4,"name":"eof-reached","data":true}"#),
        Some(MediaEvent::Ended)
    );
    assert_eq!(
        parse_mpv_message(r#"{"event":"property-change","id":4,"name":"eof-reached","data":false}"#),
        None
    );
    assert_eq!(
        parse_mpv_message(r#"{"event":"property-change","id":1,"name":"time-pos"}"#),
        None
    );
    assert_eq!(
        parse_mpv_message(r#"{"event":"file-loaded"}"#),
        Some(MediaEvent::Loaded)
    );
    assert_eq!(
        parse_mpv_message(r#"{"event":"end-file","reason":"error","file_error":"loading failed"}"#),
        Some(MediaEvent::Failed("loading failed".to_string()))
    );
    assert_eq!(parse_mpv_message(r#"{"error":"success","request_id":0}"#), None);
    assert_eq!(parse_mpv_message("garbage"), None);
}

#[test]
fn episode_key_round_trips_through_its_encoding() {
    let key = EpisodeKey::new("10716", 3, 12);
    assert_eq!(key.encode(), "10716:3:12");
    assert_eq!("10716:3:12".parse::<EpisodeKey>().expect("parse"), key);

    let nested = "a:b:1:2".parse::<EpisodeKey>().expect("colon in show id");
    assert_eq!(nested.show_id, "a:b");
    assert_eq!(nested.season, 1);
    assert_eq!(nested.episode, 2);
}

#[test]
fn episode_key_rejects_malformed_input() {
    assert!("1:2".parse::<EpisodeKey>().is_err());
    assert!(":1:2".parse::<EpisodeKey>().is_err());
    assert!("show:x:2".parse::<EpisodeKey>().is_err());
    assert!("show:1:-2".parse::<EpisodeKey>().is_err());
}

#[test]
fn routes_parse_and_render_paths() {
    assert_eq!(Route::parse("/").expect("home"), Route::Home);
    assert_eq!(Route::parse("").expect("empty"), Route::Home);
    assert_eq!(Route::parse("/shows/").expect("shows"), Route::Shows);
    assert_eq!(
        Route::parse("/show/10716").expect("show"),
        Route::Show("10716".to_string())
    );
    assert_eq!(Route::parse("/favorites").expect("favorites"), Route::Favorites);
    assert_eq!(Route::parse("/completed").expect("completed"), Route::Completed);
    assert!(Route::parse("/show/").is_err());
    assert!(Route::parse("/show/1/2").is_err());
    assert!(Route::parse("/settings").is_err());
    assert_eq!(Route::Show("7".to_string()).path(), "/show/7");
}

#[test]
fn searching_comedy_finds_the_single_matching_show() {
    let shows = sample_previews();
    let found = visible_shows(&shows, "comedy", None, SortOrder::TitleAsc);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "2");

    assert_eq!(visible_shows(&shows, "  ", None, SortOrder::TitleAsc).len(), 3);
    assert!(visible_shows(&shows, "jazz", None, SortOrder::TitleAsc).is_empty());
}

#[test]
fn show_sorting_and_genre_filter() {
    let shows = sample_previews();
    let ids = |sort| {
        visible_shows(&shows, "", None, sort)
            .into_iter()
            .map(|show| show.id.clone())
            .collect::<Vec<_>>()
    };
    assert_eq!(ids(SortOrder::TitleAsc), vec!["3", "2", "1"]);
    assert_eq!(ids(SortOrder::TitleDesc), vec!["1", "2", "3"]);
    assert_eq!(ids(SortOrder::RecentlyUpdated), vec!["2", "1", "3"]);
    assert_eq!(ids(SortOrder::LeastRecentlyUpdated), vec!["3", "1", "2"]);

    let comedy = visible_shows(&shows, "", Some(4), SortOrder::TitleAsc);
    assert_eq!(comedy.len(), 1);
    assert_eq!(comedy[0].id, "2");
}

#[test]
fn favorites_sort_by_date_added() {
    let shows = sample_previews();
    let now = Utc::now();
    let favorites = vec![
        FavoriteEntry::for_show(&shows[0], now - Duration::days(2)),
        FavoriteEntry::for_show(&shows[1], now),
        FavoriteEntry::for_show(&shows[2], now - Duration::days(1)),
    ];

    let ids = |sort| {
        visible_favorites(&favorites, "", sort)
            .into_iter()
            .map(|entry| entry.id.clone())
            .collect::<Vec<_>>()
    };
    assert_eq!(ids(SortOrder::NewestAdded), vec!["2", "3", "1"]);
    assert_eq!(ids(SortOrder::OldestAdded), vec!["1", "3", "2"]);
    assert_eq!(visible_favorites(&favorites, "brief", SortOrder::TitleAsc).len(), 1);
}

#[test]
fn sort_cycles_skip_date_added_for_shows() {
    let mut sort = SortOrder::TitleAsc;
    for _ in 0..4 {
        sort = sort.next_for_shows();
        assert!(!matches!(sort, SortOrder::NewestAdded | SortOrder::OldestAdded));
    }
    assert_eq!(sort, SortOrder::TitleAsc);
    assert_eq!(SortOrder::LeastRecentlyUpdated.next_for_favorites(), SortOrder::NewestAdded);
}

#[test]
fn home_features_first_ten_shows_with_excerpts() {
    let mut shows = Vec::new();
    for idx in 0..12 {
        let mut show = sample_previews()[0].clone();
        show.id = idx.to_string();
        shows.push(show);
    }
    let picks = featured(&shows);
    assert_eq!(picks.len(), FEATURED_COUNT);
    assert_eq!(picks[9].id, "9");
    assert_eq!(featured(&shows[..3]).len(), 3);

    let long = "x".repeat(150);
    let excerpt = description_excerpt(&long);
    assert_eq!(excerpt.chars().count(), 103);
    assert!(excerpt.ends_with("..."));
    assert_eq!(description_excerpt(""), "No description available");
    assert_eq!(description_excerpt("short"), "short");
}

#[test]
fn genres_decode_from_ids_and_names() {
    let show = sample_show();
    assert_eq!(show.genres, vec![1, 2]);
    assert_eq!(genre_title(4), "Comedy");
    assert_eq!(genre_title(42), UNKNOWN_GENRE);
    assert_eq!(genre_id_by_name("kids and family"), Some(9));
    assert_eq!(genre_titles(&[]), "-");
    assert_eq!(next_genre_filter(None), Some(1));
    assert_eq!(next_genre_filter(Some(3)), Some(4));
    assert_eq!(next_genre_filter(Some(9)), None);
}

#[test]
fn parsed_show_orders_episodes() {
    let show = sample_show();
    let episodes = &show.seasons[0].episodes;
    assert_eq!(episodes[0].episode, 1);
    assert_eq!(episodes[1].episode, 2);
    assert_eq!(show.preview().seasons, 1);
}

#[test]
fn format_helpers() {
    assert_eq!(format_time(0.0), "0:00");
    assert_eq!(format_time(75.9), "1:15");
    assert_eq!(format_time(3600.0), "60:00");
    assert_eq!(format_time(f64::NAN), "0:00");
    assert_eq!(format_time(-3.0), "0:00");
    assert_eq!(truncate("abcdefghij", 6), "abc...");
    assert_eq!(truncate("abc", 6), "abc");
    assert_eq!(season_label(2, "Season 2"), "Season 2");
    assert_eq!(season_label(2, "The Trial"), "Season 2: The Trial");
}

#[test]
fn cli_genre_listing_prefers_genre_endpoint() {
    let mut genre_shows = sample_previews();
    // Genre membership from the endpoint wins over the ids on each show.
    genre_shows[0].genres = vec![];
    let catalog = FakeCatalog {
        shows: genre_shows,
        genre: Some(Genre {
            id: 4,
            title: "Comedy".to_string(),
            shows: vec!["1".to_string(), "2".to_string()],
        }),
    };

    let shows = list_shows_for_cli(&catalog, None, Some(4), SortOrder::TitleAsc).expect("shows");
    let ids = shows.iter().map(|show| show.id.as_str()).collect::<Vec<_>>();
    assert_eq!(ids, vec!["2", "1"]);
}

#[test]
fn cli_genre_listing_falls_back_to_local_filter() {
    let catalog = FakeCatalog {
        shows: sample_previews(),
        genre: None,
    };

    let shows =
        list_shows_for_cli(&catalog, Some("club"), Some(4), SortOrder::TitleAsc).expect("shows");
    assert_eq!(shows.len(), 1);
    assert_eq!(shows[0].id, "2");
}
