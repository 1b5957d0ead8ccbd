//! Folding metadata items into playback state
//!
//! shairport-sync may report a resume as `prsm` then `prgr`, or as `prgr`
//! then `prsm`, and also emits `prsm` on its own for unrelated reasons. The
//! machine therefore only switches to playing once both have been seen since
//! the last pause or stop, in either order.

use std::path::PathBuf;

use super::artwork::ArtworkStore;
use super::events::ListenerEvent;
use crate::error::DecodeError;
use crate::protocol::metadata::{Category, Item, TypedValue, is_track_field, ssnc};
use crate::types::{
    DEFAULT_SAMPLE_RATE, PlaybackPhase, PlaybackState, Progress, TrackInfo, VolumeState,
};

/// Single-writer playback state machine
#[derive(Debug)]
pub struct PlaybackStateMachine {
    sample_rate: u32,
    artwork_store: ArtworkStore,
    state: PlaybackState,
    /// Track fields received since the last `mden`
    pending_track: TrackInfo,
    /// Artwork written by `PICT`, committed by `pcen`
    staged_artwork: Option<PathBuf>,
    pending_play: bool,
    pending_progress: bool,
    device_id_received: bool,
    auth_token_received: bool,
    last_item: Option<Item>,
}

impl PlaybackStateMachine {
    /// Create a machine reporting progress at `sample_rate`
    #[must_use]
    pub fn new(sample_rate: u32, artwork_store: ArtworkStore) -> Self {
        Self {
            sample_rate,
            artwork_store,
            state: PlaybackState::default(),
            pending_track: TrackInfo::new(),
            staged_artwork: None,
            pending_play: false,
            pending_progress: false,
            device_id_received: false,
            auth_token_received: false,
            last_item: None,
        }
    }

    /// Current snapshot
    #[must_use]
    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    /// A resume was seen, waiting for a progress report
    #[must_use]
    pub fn pending_play_signal(&self) -> bool {
        self.pending_play
    }

    /// A progress report was seen, waiting for a resume
    #[must_use]
    pub fn pending_progress_signal(&self) -> bool {
        self.pending_progress
    }

    /// Most recently processed item
    #[must_use]
    pub fn last_item(&self) -> Option<&Item> {
        self.last_item.as_ref()
    }

    /// Apply one item and return the resulting events
    ///
    /// A payload that does not decode leaves the state untouched; the item
    /// is still recorded as the last item.
    pub fn process(&mut self, item: &Item) -> Vec<ListenerEvent> {
        let mut events = Vec::new();

        let result = match item.category() {
            Category::Core => self.process_core(item),
            Category::ShairportExtension => self.process_ssnc(item, &mut events),
        };
        if let Err(e) = result {
            tracing::warn!(
                category = %item.category(),
                code = %item.code(),
                "Ignoring item: {}",
                e
            );
        }

        if self.device_id_received && self.auth_token_received {
            self.device_id_received = false;
            self.auth_token_received = false;
            self.state.remote_available = true;
            if let (Some(device_id), Some(auth_token)) =
                (self.state.device_id.clone(), self.state.auth_token.clone())
            {
                tracing::info!(device_id = %device_id, "Remote control available");
                events.push(ListenerEvent::RemoteControlReady {
                    device_id,
                    auth_token,
                });
            }
        }

        self.last_item = Some(item.clone());
        events.push(ListenerEvent::ItemReceived(item.clone()));
        events
    }

    fn process_core(&mut self, item: &Item) -> Result<(), DecodeError> {
        let Some(entry) = item.entry() else {
            tracing::warn!(
                code = %item.code(),
                data = item.base64().unwrap_or_default(),
                "Unknown core code"
            );
            return Ok(());
        };

        if is_track_field(item.code()) {
            if let Some(value) = item.value()? {
                self.pending_track.insert(entry.name, value);
            }
        }
        Ok(())
    }

    fn process_ssnc(
        &mut self,
        item: &Item,
        events: &mut Vec<ListenerEvent>,
    ) -> Result<(), DecodeError> {
        match item.code() {
            ssnc::USER_AGENT => {
                let user_agent = text(item)?;
                self.announce(events, |state| state.user_agent = user_agent);
            }
            ssnc::SOURCE_NAME => {
                let client_name = text(item)?;
                self.announce(events, |state| state.client_name = client_name);
            }
            ssnc::PICTURE_START => self.set_artwork(None, events),
            ssnc::PICTURE => {
                self.staged_artwork = match item.payload() {
                    Some(data) => match self.artwork_store.store(data) {
                        Ok(path) => Some(path),
                        Err(e) => {
                            tracing::warn!(
                                dir = %self.artwork_store.dir().display(),
                                "Could not store artwork: {}",
                                e
                            );
                            None
                        }
                    },
                    None => None,
                };
            }
            ssnc::PICTURE_END => {
                let staged = self.staged_artwork.clone();
                self.set_artwork(staged, events);
            }
            ssnc::METADATA_END => {
                let track = std::mem::take(&mut self.pending_track);
                if track != self.state.track_info {
                    self.state.track_info = track.clone();
                    events.push(ListenerEvent::TrackInfoChanged(track));
                }
            }
            ssnc::STREAM_PAUSE => {
                self.clear_signals();
                self.set_phase(PlaybackPhase::Paused, events);
            }
            ssnc::STREAM_RESUME => {
                self.pending_play = true;
                self.try_resume(events);
            }
            ssnc::STREAM_END => {
                self.clear_signals();
                self.set_phase(PlaybackPhase::Stopped, events);
                if self.state.connected {
                    self.state.connected = false;
                    events.push(ListenerEvent::Disconnected);
                }
            }
            ssnc::PROGRESS => {
                let Some(TypedValue::Progress(sample)) = item.value()? else {
                    return Ok(());
                };
                self.pending_progress = true;
                self.try_resume(events);

                let progress = Progress::from_sample(&sample, self.sample_rate);
                if progress != self.state.progress {
                    self.state.progress = progress;
                    events.push(ListenerEvent::ProgressChanged(progress));
                }
            }
            ssnc::VOLUME => {
                let Some(TypedValue::Volume(sample)) = item.value()? else {
                    return Ok(());
                };
                let volume = VolumeState::from_sample(&sample);
                if volume != self.state.volume {
                    self.state.volume = volume;
                    events.push(ListenerEvent::VolumeChanged(volume));
                }
            }
            ssnc::DACP_ID => {
                self.state.device_id = text(item)?;
                self.device_id_received = true;
            }
            ssnc::ACTIVE_REMOTE => {
                self.state.auth_token = text(item)?;
                self.auth_token_received = true;
            }
            code if item.entry().is_some() => {
                tracing::trace!(code = %code, "Ignoring ssnc item");
            }
            code => {
                tracing::warn!(
                    code = %code,
                    data = item.base64().unwrap_or_default(),
                    "Unknown shairport-sync code"
                );
            }
        }
        Ok(())
    }

    /// A source announced itself with `snua` or `snam`
    fn announce(&mut self, events: &mut Vec<ListenerEvent>, update: impl FnOnce(&mut PlaybackState)) {
        update(&mut self.state);
        self.state.connected = true;

        // A new announcement invalidates a stale token pair
        if self.device_id_received && self.auth_token_received {
            self.device_id_received = false;
            self.auth_token_received = false;
        }

        events.push(ListenerEvent::Connected {
            user_agent: self.state.user_agent.clone(),
            client_name: self.state.client_name.clone(),
        });
    }

    fn try_resume(&mut self, events: &mut Vec<ListenerEvent>) {
        if self.pending_play && self.pending_progress {
            self.clear_signals();
            self.set_phase(PlaybackPhase::Playing, events);
        }
    }

    fn clear_signals(&mut self) {
        self.pending_play = false;
        self.pending_progress = false;
    }

    fn set_phase(&mut self, phase: PlaybackPhase, events: &mut Vec<ListenerEvent>) {
        if self.state.phase != phase {
            tracing::debug!(from = %self.state.phase, to = %phase, "Playback phase changed");
            self.state.phase = phase;
            events.push(ListenerEvent::PlaybackPhaseChanged(phase));
        }
    }

    fn set_artwork(&mut self, artwork: Option<PathBuf>, events: &mut Vec<ListenerEvent>) {
        if self.state.artwork != artwork {
            self.state.artwork = artwork.clone();
            events.push(ListenerEvent::ArtworkChanged(artwork));
        }
    }
}

impl Default for PlaybackStateMachine {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE, ArtworkStore::default())
    }
}

fn text(item: &Item) -> Result<Option<String>, DecodeError> {
    Ok(item.text()?.map(str::to_string))
}
