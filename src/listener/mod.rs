//! Running listener tying a source, a framer and the state machine together
//!
//! One task owns the [`PlaybackStateMachine`]. Every frame read from the
//! source is framed into items, each item is applied in arrival order, the
//! new snapshot is published and the resulting events are broadcast.

mod source;

#[cfg(test)]
mod tests;

#[cfg(unix)]
pub use source::PipeSource;
pub use source::{ChannelSource, DatagramSource, FrameSource};

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::daemon::{DaemonGuard, ReceiverDaemon, ShairportSyncDaemon};
use crate::discovery;
use crate::error::{MetadataError, Result};
use crate::protocol::framing::{DatagramFramer, Framer, PipeFramer};
use crate::remote::RemoteControl;
use crate::state::{ArtworkStore, EventBus, EventFilter, ListenerEvent, PlaybackStateMachine, StateContainer};
use crate::types::{ListenerConfig, PlaybackState, SourceConfig};

/// Pause after a failed read before trying the source again
const READ_ERROR_BACKOFF: Duration = Duration::from_millis(500);

/// Listens to shairport-sync metadata and tracks what is playing
///
/// # Example
///
/// ```rust,no_run
/// use shairport_metadata::{ListenerConfig, ListenerEvent, MetadataListener};
///
/// # async fn example() -> Result<(), shairport_metadata::MetadataError> {
/// let listener = MetadataListener::start(ListenerConfig::default()).await?;
/// let mut events = listener.subscribe();
///
/// while let Ok(event) = events.recv().await {
///     if let ListenerEvent::TrackInfoChanged(track) = event {
///         println!("{:?} by {:?}", track.title(), track.artist());
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct MetadataListener {
    config: ListenerConfig,
    events: EventBus,
    state: Arc<StateContainer>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
    daemon: Option<DaemonGuard>,
}

impl MetadataListener {
    /// Start listening on the configured source
    ///
    /// With `manage_daemon` set, shairport-sync is started first; a failure
    /// to start it is logged and listening goes ahead.
    ///
    /// # Errors
    /// Returns `MetadataError::InvalidConfig` for a bad configuration, or
    /// `MetadataError::Io` if the datagram socket cannot be bound.
    pub async fn start(config: ListenerConfig) -> Result<Self> {
        let daemon = config
            .manage_daemon
            .then(|| Arc::new(ShairportSyncDaemon::default()) as Arc<dyn ReceiverDaemon>);
        Self::start_with_daemon(config, daemon).await
    }

    /// Start listening, managing a specific receiver daemon
    ///
    /// # Errors
    /// Same as [`MetadataListener::start`].
    pub async fn start_with_daemon(
        config: ListenerConfig,
        daemon: Option<Arc<dyn ReceiverDaemon>>,
    ) -> Result<Self> {
        config.validate()?;

        let guard = match daemon {
            Some(daemon) => match blocking(move || DaemonGuard::start(daemon)).await {
                Ok(guard) => Some(guard),
                Err(e) => {
                    tracing::warn!("Can not start the receiver, listening anyway: {}", e);
                    None
                }
            },
            None => None,
        };

        let mut listener = match &config.source {
            #[cfg(unix)]
            SourceConfig::Pipe(pipe) => {
                let source = PipeSource::new(pipe.clone());
                Self::spawn_with(config.clone(), source, PipeFramer::new())
            }
            #[cfg(not(unix))]
            SourceConfig::Pipe(_) => {
                return Err(MetadataError::InvalidConfig {
                    name: "pipe.path",
                    message: "named pipes need a unix platform".to_string(),
                });
            }
            SourceConfig::Datagram(datagram) => {
                let source = DatagramSource::bind(datagram).await?;
                Self::spawn_with(config.clone(), source, DatagramFramer::new())
            }
        };

        listener.daemon = guard;
        Ok(listener)
    }

    /// Run the listener over any frame source
    ///
    /// The configuration's source settings are ignored; `source` and
    /// `framer` are used instead. Must be called inside a Tokio runtime.
    pub fn spawn_with<S, F>(config: ListenerConfig, source: S, framer: F) -> Self
    where
        S: FrameSource + 'static,
        F: Framer + 'static,
    {
        let events = EventBus::new(config.event_capacity);
        let state = Arc::new(StateContainer::new());
        let cancel = CancellationToken::new();
        let machine = PlaybackStateMachine::new(
            config.sample_rate,
            ArtworkStore::new(config.artwork_dir.clone()),
        );

        let task = tokio::spawn(run(
            Box::new(source),
            Box::new(framer),
            machine,
            events.clone(),
            Arc::clone(&state),
            cancel.clone(),
        ));

        Self {
            config,
            events,
            state,
            cancel,
            task: Some(task),
            daemon: None,
        }
    }

    /// Configuration the listener runs with
    #[must_use]
    pub fn config(&self) -> &ListenerConfig {
        &self.config
    }

    /// Subscribe to all listener events
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ListenerEvent> {
        self.events.subscribe()
    }

    /// Subscribe to a subset of events
    #[must_use]
    pub fn filter<F>(&self, filter: F) -> EventFilter
    where
        F: Fn(&ListenerEvent) -> bool + Send + 'static,
    {
        EventFilter::new(&self.events, filter)
    }

    /// Event bus, for the predefined [`EventFilter`] constructors
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Watch state snapshots
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<PlaybackState> {
        self.state.subscribe()
    }

    /// Latest state snapshot
    #[must_use]
    pub fn state(&self) -> PlaybackState {
        self.state.get()
    }

    /// Whether the listening task is still running
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Discover the DACP endpoint of the current source
    ///
    /// Returns `Ok(None)` if the source is not advertised within `timeout`.
    ///
    /// # Errors
    /// Returns `MetadataError::RemoteUnavailable` until both the DACP id and
    /// the Active-Remote token have been received, or a discovery error.
    pub async fn remote(&self, timeout: Duration) -> Result<Option<RemoteControl>> {
        let state = self.state.get();
        let (Some(device_id), Some(auth_token)) = (state.device_id, state.auth_token) else {
            return Err(MetadataError::RemoteUnavailable);
        };

        match discovery::discover_endpoint(&device_id, &auth_token, timeout).await? {
            Some(endpoint) => Ok(Some(RemoteControl::new(endpoint)?)),
            None => Ok(None),
        }
    }

    /// Stop listening and wait for the task to finish
    ///
    /// A managed receiver daemon is stopped as well.
    ///
    /// # Errors
    /// Returns the daemon's error if it could not be stopped.
    pub async fn stop(mut self) -> Result<()> {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::error!("Listener task failed: {}", e);
            }
        }

        match self.daemon.take() {
            Some(guard) => blocking(move || guard.stop()).await,
            None => Ok(()),
        }
    }
}

/// Run process or file work off the async workers
async fn blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| MetadataError::Daemon {
            message: format!("receiver task failed: {e}"),
        })?
}

impl std::fmt::Debug for MetadataListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataListener")
            .field("config", &self.config)
            .field("running", &self.is_running())
            .field("daemon", &self.daemon)
            .finish_non_exhaustive()
    }
}

impl Drop for MetadataListener {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run(
    mut source: Box<dyn FrameSource>,
    mut framer: Box<dyn Framer>,
    mut machine: PlaybackStateMachine,
    events: EventBus,
    state: Arc<StateContainer>,
    cancel: CancellationToken,
) {
    loop {
        let frame = tokio::select! {
            () = cancel.cancelled() => break,
            frame = source.next_frame() => frame,
        };

        match frame {
            Ok(Some(frame)) => {
                // Artwork is written to disk while items are applied
                let events = events.clone();
                let state = Arc::clone(&state);
                let applied = tokio::task::spawn_blocking(move || {
                    apply(&frame, framer.as_mut(), &mut machine, &events, &state);
                    (framer, machine)
                })
                .await;

                match applied {
                    Ok(parts) => (framer, machine) = parts,
                    Err(e) => {
                        tracing::error!("Metadata processing failed: {}", e);
                        return;
                    }
                }
            }
            Ok(None) => {
                tracing::info!("Metadata source closed");
                break;
            }
            Err(e) => {
                tracing::warn!("Error reading metadata: {}", e);
                tokio::select! {
                    () = cancel.cancelled() => break,
                    () = tokio::time::sleep(READ_ERROR_BACKOFF) => {}
                }
            }
        }
    }

    framer.reset();
    tracing::debug!("Metadata listener stopped");
}

fn apply(
    frame: &[u8],
    framer: &mut dyn Framer,
    machine: &mut PlaybackStateMachine,
    events: &EventBus,
    state: &StateContainer,
) {
    for item in framer.push(frame) {
        let emitted = machine.process(&item);
        state.publish(machine.state());
        for event in emitted {
            events.emit(event);
        }
    }
}
