use anyhow::Result;

use crate::store::KeyValueStore;

use super::catalog::Show;
use super::episode::EpisodeKey;
use super::library::Library;
use super::player::{AudioPlayer, MediaBackend, NowPlaying, PlayerSignal};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Notice {
    Info(String),
    Error(String),
}

/// Owns the persisted library and the player; every mutation goes through here.
pub(crate) struct Controller<S: KeyValueStore, B: MediaBackend> {
    library: Library<S>,
    player: AudioPlayer<B>,
}

impl<S: KeyValueStore, B: MediaBackend> Controller<S, B> {
    pub(crate) fn new(library: Library<S>, player: AudioPlayer<B>) -> Self {
        Self { library, player }
    }

    pub(crate) fn library(&self) -> &Library<S> {
        &self.library
    }

    pub(crate) fn library_mut(&mut self) -> &mut Library<S> {
        &mut self.library
    }

    pub(crate) fn player(&self) -> &AudioPlayer<B> {
        &self.player
    }

    pub(crate) fn player_mut(&mut self) -> &mut AudioPlayer<B> {
        &mut self.player
    }

    #[cfg(test)]
    pub(crate) fn into_library(self) -> Library<S> {
        self.library
    }

    /// Looks the episode up in `show` and starts it. A missing season or
    /// episode aborts before the current playback is touched.
    pub(crate) fn play_from_show(&mut self, show: &Show, key: &EpisodeKey) -> Result<()> {
        let episode = NowPlaying::from_show(show, key).inspect_err(|err| {
            tracing::warn!(episode = %key, error = %err, "play aborted");
        })?;
        self.play(episode)
    }

    /// Starts `episode` at its stored position and records the play.
    pub(crate) fn play(&mut self, episode: NowPlaying) -> Result<()> {
        let resume_at = self.library.position(&episode.key);
        let entry = episode.history_entry(resume_at);
        self.player.select_episode(episode, resume_at)?;
        self.library.record_play(entry)
    }

    /// Drains backend events and applies the resulting signals.
    pub(crate) fn pump(&mut self) -> Vec<Notice> {
        let signals = self.player.pump();
        let mut notices = Vec::new();
        for signal in signals {
            match self.apply_signal(signal) {
                Ok(Some(notice)) => notices.push(notice),
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(error = %format!("{err:#}"), "failed to persist playback state");
                    notices.push(Notice::Error(format!("Saving playback failed: {err}")));
                }
            }
        }
        notices
    }

    pub(crate) fn apply_signal(&mut self, signal: PlayerSignal) -> Result<Option<Notice>> {
        match signal {
            PlayerSignal::PositionChanged { key, seconds } => {
                self.library.update_position(&key, seconds)?;
                Ok(None)
            }
            PlayerSignal::Completed { key } => {
                let id = key.encode();
                let entry = match self.library.history().entry(&id) {
                    Some(entry) => entry.clone(),
                    None => match self.player.current() {
                        Some(current) if current.key == key => current.history_entry(0.0),
                        _ => return Ok(None),
                    },
                };
                let title = entry.title.clone();
                self.library.mark_completed(entry)?;
                self.library.update_position(&key, 0.0)?;
                Ok(Some(Notice::Info(format!("Completed: {title}"))))
            }
            PlayerSignal::Failed { message } => {
                Ok(Some(Notice::Error(format!("Playback failed: {message}"))))
            }
        }
    }
}
