mod mpv;

use anyhow::{Result, bail};
use chrono::Utc;

use super::catalog::Show;
use super::episode::EpisodeKey;
use super::library::{FavoriteEntry, FavoriteKind, HistoryEntry};

pub(crate) use mpv::MpvBackend;
#[cfg(test)]
pub(crate) use mpv::parse_mpv_message;

/// Notifications coming from the media backend.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum MediaEvent {
    Loaded,
    Duration(f64),
    TimeUpdate(f64),
    Paused(bool),
    Ended,
    Failed(String),
}

/// Something that can play one audio source at a time.
pub(crate) trait MediaBackend {
    fn load(&mut self, url: &str, start_at: f64) -> Result<()>;
    fn set_paused(&mut self, paused: bool) -> Result<()>;
    fn seek(&mut self, seconds: f64) -> Result<()>;
    fn stop(&mut self) -> Result<()>;
    fn poll_events(&mut self) -> Vec<MediaEvent>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PlayerState {
    Idle,
    Loading,
    Playing,
    Paused,
    Completed,
}

impl PlayerState {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Loading => "LOADING",
            Self::Playing => "PLAYING",
            Self::Paused => "PAUSED",
            Self::Completed => "COMPLETED",
        }
    }
}

/// Emitted upward for the controller to apply.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PlayerSignal {
    PositionChanged { key: EpisodeKey, seconds: f64 },
    Completed { key: EpisodeKey },
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NowPlaying {
    pub(crate) key: EpisodeKey,
    pub(crate) show_title: String,
    pub(crate) title: String,
    pub(crate) file: String,
    pub(crate) image: String,
}

impl NowPlaying {
    pub(crate) fn from_show(show: &Show, key: &EpisodeKey) -> Result<Self> {
        let (_, episode) = show.episode(key.season, key.episode)?;
        Ok(Self {
            key: key.clone(),
            show_title: show.title.clone(),
            title: episode.title.clone(),
            file: episode.file.clone(),
            image: show.image.clone(),
        })
    }

    pub(crate) fn from_history(entry: &HistoryEntry) -> Self {
        Self {
            key: entry.key(),
            show_title: entry.show_title.clone(),
            title: entry.title.clone(),
            file: entry.file.clone(),
            image: entry.image.clone(),
        }
    }

    /// `None` for show favorites.
    pub(crate) fn from_favorite(entry: &FavoriteEntry) -> Option<Self> {
        let FavoriteKind::Episode { title, file, .. } = &entry.kind else {
            return None;
        };
        Some(Self {
            key: entry.episode_key()?,
            show_title: entry.show_title.clone(),
            title: title.clone(),
            file: file.clone(),
            image: entry.image.clone(),
        })
    }

    pub(crate) fn history_entry(&self, current_time: f64) -> HistoryEntry {
        HistoryEntry {
            id: self.key.encode(),
            show_id: self.key.show_id.clone(),
            show_title: self.show_title.clone(),
            season: self.key.season,
            episode: self.key.episode,
            title: self.title.clone(),
            file: self.file.clone(),
            image: self.image.clone(),
            current_time,
            completed: false,
            started_at: Utc::now(),
            completed_at: None,
        }
    }
}

pub(crate) struct AudioPlayer<B: MediaBackend> {
    backend: B,
    state: PlayerState,
    current: Option<NowPlaying>,
    position: f64,
    duration: Option<f64>,
}

impl<B: MediaBackend> AudioPlayer<B> {
    pub(crate) fn new(backend: B) -> Self {
        Self {
            backend,
            state: PlayerState::Idle,
            current: None,
            position: 0.0,
            duration: None,
        }
    }

    pub(crate) fn state(&self) -> PlayerState {
        self.state
    }

    pub(crate) fn current(&self) -> Option<&NowPlaying> {
        self.current.as_ref()
    }

    pub(crate) fn position(&self) -> f64 {
        self.position
    }

    pub(crate) fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub(crate) fn is_active(&self) -> bool {
        matches!(
            self.state,
            PlayerState::Loading | PlayerState::Playing | PlayerState::Paused
        )
    }

    #[cfg(test)]
    pub(crate) fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Replaces whatever was loaded. Moves to `Loading` until the backend
    /// reports the source as playable.
    pub(crate) fn select_episode(&mut self, episode: NowPlaying, resume_at: f64) -> Result<()> {
        if episode.file.trim().is_empty() {
            bail!("`{}` has no audio file", episode.title);
        }

        let resume_at = if resume_at.is_finite() {
            resume_at.max(0.0)
        } else {
            0.0
        };
        if let Err(err) = self.backend.load(&episode.file, resume_at) {
            self.reset();
            return Err(err.context(format!("failed to load `{}`", episode.title)));
        }

        tracing::info!(episode = %episode.key, resume_at, "loading episode");
        self.state = PlayerState::Loading;
        self.current = Some(episode);
        self.position = resume_at;
        self.duration = None;
        Ok(())
    }

    pub(crate) fn toggle_play(&mut self) -> Result<()> {
        match self.state {
            PlayerState::Playing => {
                self.backend.set_paused(true)?;
                self.state = PlayerState::Paused;
            }
            PlayerState::Paused => {
                self.backend.set_paused(false)?;
                self.state = PlayerState::Playing;
            }
            PlayerState::Completed => {
                self.backend.seek(0.0)?;
                self.backend.set_paused(false)?;
                self.position = 0.0;
                self.state = PlayerState::Playing;
            }
            PlayerState::Idle | PlayerState::Loading => {}
        }
        Ok(())
    }

    /// Valid while playing or paused; never changes the state.
    pub(crate) fn seek(&mut self, seconds: f64) -> Result<()> {
        if !matches!(self.state, PlayerState::Playing | PlayerState::Paused) {
            bail!("nothing to seek: player is {}", self.state.label().to_lowercase());
        }
        let upper = self.duration.unwrap_or(f64::MAX);
        let target = seconds.clamp(0.0, upper);
        self.backend.seek(target)?;
        self.position = target;
        Ok(())
    }

    pub(crate) fn seek_by(&mut self, delta: f64) -> Result<()> {
        self.seek(self.position + delta)
    }

    pub(crate) fn stop(&mut self) -> Result<()> {
        let result = self.backend.stop();
        self.reset();
        result
    }

    pub(crate) fn pump(&mut self) -> Vec<PlayerSignal> {
        let events = self.backend.poll_events();
        events
            .into_iter()
            .flat_map(|event| self.handle_event(event))
            .collect()
    }

    pub(crate) fn handle_event(&mut self, event: MediaEvent) -> Vec<PlayerSignal> {
        let Some(key) = self.current.as_ref().map(|current| current.key.clone()) else {
            return Vec::new();
        };

        match event {
            MediaEvent::Loaded => {
                if self.state == PlayerState::Loading {
                    self.state = PlayerState::Playing;
                }
                Vec::new()
            }
            MediaEvent::Duration(seconds) => {
                if seconds.is_finite() && seconds > 0.0 {
                    self.duration = Some(seconds);
                }
                if self.state == PlayerState::Loading {
                    self.state = PlayerState::Playing;
                }
                Vec::new()
            }
            MediaEvent::TimeUpdate(seconds) => {
                if self.state == PlayerState::Loading {
                    self.state = PlayerState::Playing;
                }
                if !matches!(self.state, PlayerState::Playing | PlayerState::Paused) {
                    return Vec::new();
                }
                self.position = seconds.max(0.0);
                vec![PlayerSignal::PositionChanged {
                    key,
                    seconds: self.position,
                }]
            }
            MediaEvent::Paused(paused) => {
                match (self.state, paused) {
                    (PlayerState::Playing, true) => self.state = PlayerState::Paused,
                    (PlayerState::Paused, false) => self.state = PlayerState::Playing,
                    _ => {}
                }
                Vec::new()
            }
            MediaEvent::Ended => {
                if !matches!(
                    self.state,
                    PlayerState::Loading | PlayerState::Playing | PlayerState::Paused
                ) {
                    return Vec::new();
                }
                self.state = PlayerState::Completed;
                self.position = 0.0;
                vec![PlayerSignal::Completed { key }]
            }
            MediaEvent::Failed(message) => {
                tracing::warn!(episode = %key, %message, "playback failed");
                self.reset();
                vec![PlayerSignal::Failed { message }]
            }
        }
    }

    fn reset(&mut self) {
        self.state = PlayerState::Idle;
        self.current = None;
        self.position = 0.0;
        self.duration = None;
    }
}
