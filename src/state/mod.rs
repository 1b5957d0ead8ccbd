//! State management and events

mod artwork;
mod container;
mod events;
mod machine;

pub use artwork::{ArtworkStore, ImageFormat};
pub use container::StateContainer;
pub use events::{DEFAULT_EVENT_CAPACITY, EventBus, EventFilter, ListenerEvent};
pub use machine::PlaybackStateMachine;
