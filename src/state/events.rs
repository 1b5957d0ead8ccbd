//! Event bus for listener events

use std::path::PathBuf;

use tokio::sync::broadcast;

use crate::protocol::metadata::Item;
use crate::types::{PlaybackPhase, Progress, TrackInfo, VolumeState};

/// Default number of events buffered per subscriber
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Listener events
#[derive(Debug, Clone, PartialEq)]
pub enum ListenerEvent {
    // Connection events
    /// A source announced itself
    Connected {
        /// User agent of the source
        user_agent: Option<String>,
        /// Name of the source device
        client_name: Option<String>,
    },
    /// The source ended its session
    Disconnected,

    // Playback events
    /// A metadata block completed with different track info
    TrackInfoChanged(TrackInfo),
    /// Transport state changed
    PlaybackPhaseChanged(PlaybackPhase),
    /// Position updated
    ProgressChanged(Progress),
    /// Volume changed
    VolumeChanged(VolumeState),
    /// Artwork committed, `None` when cleared
    ArtworkChanged(Option<PathBuf>),

    // Remote events
    /// DACP id and Active-Remote token are both known
    RemoteControlReady {
        /// DACP id of the source
        device_id: String,
        /// Active-Remote token of the source
        auth_token: String,
    },

    /// Every processed item, after the state was updated
    ItemReceived(Item),
}

/// Event bus for distributing events
#[derive(Debug, Clone)]
pub struct EventBus {
    /// Broadcast sender
    tx: broadcast::Sender<ListenerEvent>,
}

impl EventBus {
    /// Create a bus buffering `capacity` events per subscriber
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Subscribe to events
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ListenerEvent> {
        self.tx.subscribe()
    }

    /// Emit an event
    pub fn emit(&self, event: ListenerEvent) {
        // Ignore error if no receivers
        let _ = self.tx.send(event);
    }

    /// Get subscriber count
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

/// Event filter for selective subscription
pub struct EventFilter {
    rx: broadcast::Receiver<ListenerEvent>,
    filter: Box<dyn Fn(&ListenerEvent) -> bool + Send>,
}

impl EventFilter {
    /// Create a filtered event receiver
    pub fn new<F>(bus: &EventBus, filter: F) -> Self
    where
        F: Fn(&ListenerEvent) -> bool + Send + 'static,
    {
        Self {
            rx: bus.subscribe(),
            filter: Box::new(filter),
        }
    }

    /// Receive next matching event
    ///
    /// Events dropped because this receiver lagged are skipped.
    pub async fn recv(&mut self) -> Option<ListenerEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) if (self.filter)(&event) => return Some(event),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Event subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// Helper functions for common filters
impl EventFilter {
    /// Filter for playback events only
    #[must_use]
    pub fn playback_events(bus: &EventBus) -> Self {
        Self::new(bus, |e| {
            matches!(
                e,
                ListenerEvent::TrackInfoChanged(_)
                    | ListenerEvent::PlaybackPhaseChanged(_)
                    | ListenerEvent::ProgressChanged(_)
                    | ListenerEvent::VolumeChanged(_)
                    | ListenerEvent::ArtworkChanged(_)
            )
        })
    }

    /// Filter for connection events only
    #[must_use]
    pub fn connection_events(bus: &EventBus) -> Self {
        Self::new(bus, |e| {
            matches!(
                e,
                ListenerEvent::Connected { .. } | ListenerEvent::Disconnected
            )
        })
    }

    /// Filter for remote-control readiness only
    #[must_use]
    pub fn remote_events(bus: &EventBus) -> Self {
        Self::new(bus, |e| matches!(e, ListenerEvent::RemoteControlReady { .. }))
    }
}
