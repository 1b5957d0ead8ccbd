//! Core types module

mod config;
mod endpoint;
mod state;


pub use config::{
    DEFAULT_DATAGRAM_ADDR, DEFAULT_PIPE_PATH, DEFAULT_SAMPLE_RATE, DatagramConfig, ListenerConfig,
    ListenerConfigBuilder, PipeConfig, SourceConfig,
};
pub use endpoint::RemoteEndpoint;
pub use state::{PlaybackPhase, PlaybackState, Progress, TrackInfo, VolumeState};
