//! # shairport-metadata
//!
//! Now-playing state and remote control for an `AirPlay` receiver running
//! shairport-sync.
//!
//! ## Features
//!
//! - Metadata from the named pipe or the UDP datagram backend
//! - Typed decoding of DMAP and shairport-sync codes
//! - Playback state with change events
//! - Artwork written to disk
//! - DACP endpoint discovery via mDNS
//! - Remote control of the connected source (play/pause, skip, volume)
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use shairport_metadata::{ListenerConfig, ListenerEvent, MetadataListener};
//!
//! # async fn example() -> Result<(), shairport_metadata::MetadataError> {
//! let listener = MetadataListener::start(ListenerConfig::default()).await?;
//! let mut events = listener.subscribe();
//!
//! while let Ok(event) = events.recv().await {
//!     if let ListenerEvent::RemoteControlReady { .. } = event {
//!         if let Some(remote) = listener.remote(Duration::from_secs(5)).await? {
//!             remote.play_pause().await?;
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **High-level**: `MetadataListener` - Source, framing and state in one task
//! - **Mid-level**: `PlaybackStateMachine`, `RemoteControl` - Use with your own I/O
//! - **Low-level**: Protocol modules - Item decoding and framing, no I/O

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Public modules
/// Error types
pub mod error;
/// State management
pub mod state;
/// Core types
pub mod types;

pub mod daemon;
pub mod discovery;
pub mod listener;
pub mod protocol;
pub mod remote;

// Re-exports
pub use daemon::{ReceiverDaemon, ShairportSyncDaemon};
pub use discovery::{discover, discover_endpoint};
pub use error::{MetadataError, Result};
pub use listener::{FrameSource, MetadataListener};
pub use protocol::dacp::{CommandResult, DacpCommand};
pub use protocol::metadata::{Category, FourCc, Item, TypedValue, ValueKind};
pub use remote::{RemoteClient, RemoteControl};
pub use state::{EventFilter, ListenerEvent, PlaybackStateMachine};
pub use types::{
    ListenerConfig, PlaybackPhase, PlaybackState, RemoteEndpoint, SourceConfig, TrackInfo,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude for common imports
///
/// Convenient re-exports
pub mod prelude {
    pub use crate::{
        DacpCommand, Item, ListenerConfig, ListenerEvent, MetadataError, MetadataListener,
        PlaybackPhase, PlaybackState, RemoteControl, TrackInfo,
    };
}
