//! Playback handoff: mode selection and the fatal-error recovery policy.
//!
//! The player engine itself is a black box behind a trait; this module only
//! decides how a stream is loaded and what happens when the engine reports a
//! fatal error.

use tracing::{info, warn};

use crate::errors::PlaybackError;
use crate::models::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackMode {
    /// HLS manifest playback, used for all live-like content.
    Hls,
    /// Direct progressive playback of a media file URL.
    Progressive,
}

/// Pick the playback mode for a record. Live-like categories always stream
/// HLS; VOD falls back to HLS only when the URL itself is a manifest.
pub fn select_mode(category: Category, url: &str) -> PlaybackMode {
    if category.is_live_like() || url.ends_with(".m3u8") {
        PlaybackMode::Hls
    } else {
        PlaybackMode::Progressive
    }
}

/// The action the controller took in response to a fatal engine error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// The stream was reloaded in place.
    RestartedLoad,
    /// The engine's media pipeline was recovered in place.
    RecoveredMedia,
    /// The session was torn down; the caller returns to the catalog.
    TornDown,
}

/// Black-box interface to the underlying player engine.
pub trait PlayerEngine {
    fn load(&mut self, url: &str, mode: PlaybackMode) -> Result<(), PlaybackError>;
    fn play(&mut self) -> Result<(), PlaybackError>;
    /// Re-issue the current load after a network-level fatal error.
    fn restart_load(&mut self) -> Result<(), PlaybackError>;
    /// Recover the decode pipeline after a media-level fatal error.
    fn recover_media(&mut self) -> Result<(), PlaybackError>;
    fn teardown(&mut self);
}

pub struct PlaybackController<E: PlayerEngine> {
    engine: E,
    active: bool,
}

impl<E: PlayerEngine> PlaybackController<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            active: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn start(&mut self, url: &str, category: Category) -> Result<(), PlaybackError> {
        let mode = select_mode(category, url);
        info!("Starting playback of {} in {:?} mode", url, mode);
        self.engine.load(url, mode)?;
        self.engine.play()?;
        self.active = true;
        Ok(())
    }

    /// Apply the recovery policy for a fatal engine error. Network and media
    /// errors are recovered in place; anything else, or a failed recovery,
    /// tears the session down.
    pub fn on_fatal_error(&mut self, error: PlaybackError) -> RecoveryAction {
        match error {
            PlaybackError::Network { message } => {
                warn!("Fatal network error, restarting load: {}", message);
                match self.engine.restart_load() {
                    Ok(()) => RecoveryAction::RestartedLoad,
                    Err(e) => self.teardown_after(e),
                }
            }
            PlaybackError::Media { message } => {
                warn!("Fatal media error, recovering pipeline: {}", message);
                match self.engine.recover_media() {
                    Ok(()) => RecoveryAction::RecoveredMedia,
                    Err(e) => self.teardown_after(e),
                }
            }
            PlaybackError::Other { message } => {
                warn!("Unrecoverable player error: {}", message);
                self.stop();
                RecoveryAction::TornDown
            }
        }
    }

    pub fn stop(&mut self) {
        if self.active {
            self.engine.teardown();
            self.active = false;
        }
    }

    fn teardown_after(&mut self, error: PlaybackError) -> RecoveryAction {
        warn!("Recovery failed, tearing down: {}", error);
        self.stop();
        RecoveryAction::TornDown
    }
}
