use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::protocol::metadata::{ProgressSample, TypedValue, VolumeSample};

/// Transport state of the source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum PlaybackPhase {
    /// Nothing playing
    #[default]
    Stopped,
    /// Stream paused
    Paused,
    /// Stream playing
    Playing,
}

impl fmt::Display for PlaybackPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Stopped => "stopped",
            Self::Paused => "paused",
            Self::Playing => "playing",
        };
        f.write_str(name)
    }
}

/// Position within the current track
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Progress {
    /// Seconds played, never negative
    pub position_secs: f64,
    /// Track length in seconds, never negative
    pub duration_secs: f64,
}

impl Progress {
    /// Convert an RTP frame report at `sample_rate`
    #[must_use]
    pub fn from_sample(sample: &ProgressSample, sample_rate: u32) -> Self {
        let rate = f64::from(sample_rate.max(1));
        Self {
            position_secs: ((sample.current - sample.start) / rate).max(0.0),
            duration_secs: ((sample.end - sample.start) / rate).max(0.0),
        }
    }

    /// Played fraction (0.0 - 1.0)
    #[must_use]
    pub fn fraction(&self) -> f64 {
        if self.duration_secs <= 0.0 {
            return 0.0;
        }
        (self.position_secs / self.duration_secs).clamp(0.0, 1.0)
    }
}

/// Normalized volume
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct VolumeState {
    /// Output level between the receiver's limits (0.0 - 1.0)
    pub level: f64,
    /// Level requested by the source (0.0 - 1.0)
    pub source_level: f64,
    /// Source muted
    pub muted: bool,
}

impl VolumeState {
    /// Normalize a dB report
    #[must_use]
    pub fn from_sample(sample: &VolumeSample) -> Self {
        let range = sample.highest_db - sample.lowest_db;
        let level = if range > 0.0 {
            (sample.volume_db - sample.lowest_db) / range
        } else {
            0.0
        };

        Self {
            level: unit(level),
            source_level: unit((sample.airplay_db + 30.0) / 30.0),
            muted: sample.airplay_db == VolumeSample::MUTE_DB,
        }
    }
}

/// Clamp to `[0, 1]`, NaN maps to 0
fn unit(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

/// Metadata of the current track, keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TrackInfo(BTreeMap<&'static str, TypedValue>);

impl TrackInfo {
    /// Create an empty track
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, returning the previous value
    pub fn insert(&mut self, name: &'static str, value: TypedValue) -> Option<TypedValue> {
        self.0.insert(name, value)
    }

    /// Get a field by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TypedValue> {
        self.0.get(name)
    }

    /// Track title
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.get("itemname").and_then(TypedValue::as_str)
    }

    /// Track artist
    #[must_use]
    pub fn artist(&self) -> Option<&str> {
        self.get("songartist").and_then(TypedValue::as_str)
    }

    /// Album name
    #[must_use]
    pub fn album(&self) -> Option<&str> {
        self.get("songalbum").and_then(TypedValue::as_str)
    }

    /// Track length in milliseconds
    #[must_use]
    pub fn duration_ms(&self) -> Option<u64> {
        self.get("songtime").and_then(TypedValue::as_u64)
    }

    /// Number of fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no field is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate fields in name order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &TypedValue)> {
        self.0.iter().map(|(k, v)| (*k, v))
    }
}

/// Snapshot of everything known about the current session
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlaybackState {
    /// A source is connected
    pub connected: bool,

    /// User agent of the source, e.g. `AirPlay/371.4.7`
    pub user_agent: Option<String>,

    /// Name of the source device
    pub client_name: Option<String>,

    /// Active-Remote token of the source
    pub auth_token: Option<String>,

    /// DACP id of the source
    pub device_id: Option<String>,

    /// Both DACP id and token have been received
    pub remote_available: bool,

    /// Metadata of the current track
    pub track_info: TrackInfo,

    /// Transport state
    pub phase: PlaybackPhase,

    /// Position in the current track
    pub progress: Progress,

    /// Volume
    pub volume: VolumeState,

    /// File holding the current artwork
    pub artwork: Option<PathBuf>,
}

impl PlaybackState {
    /// Check if the source is playing
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.phase == PlaybackPhase::Playing
    }
}
