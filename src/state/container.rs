//! Latest playback snapshot with change notifications

use tokio::sync::watch;

use crate::types::PlaybackState;

/// Holds the latest snapshot published by the state machine
///
/// Only the task driving the framer publishes; everyone else reads whole
/// snapshots, so a reader never sees a half-applied update.
#[derive(Debug)]
pub struct StateContainer {
    /// State change sender
    tx: watch::Sender<PlaybackState>,
}

impl StateContainer {
    /// Create a new state container
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = watch::channel(PlaybackState::default());
        Self { tx }
    }

    /// Get current state
    #[must_use]
    pub fn get(&self) -> PlaybackState {
        self.tx.borrow().clone()
    }

    /// Subscribe to state changes
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.tx.subscribe()
    }

    /// Publish `state`, notifying subscribers only if it differs
    ///
    /// Returns whether subscribers were notified.
    pub fn publish(&self, state: &PlaybackState) -> bool {
        self.tx.send_if_modified(|current| {
            if current == state {
                false
            } else {
                current.clone_from(state);
                true
            }
        })
    }
}

impl Default for StateContainer {
    fn default() -> Self {
        Self::new()
    }
}
