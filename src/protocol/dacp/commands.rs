//! DACP transport commands

use std::fmt;

/// Path prefix shared by all control commands
pub const CONTROL_PATH: &str = "ctrl-int/1";

/// DACP playback commands understood by AirPlay sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DacpCommand {
    /// Start playback
    Play,
    /// Pause playback
    Pause,
    /// Toggle play/pause
    PlayPause,
    /// Resume after fast forward or rewind
    PlayResume,
    /// Stop playback
    Stop,
    /// Skip to next track
    NextItem,
    /// Go to previous track
    PrevItem,
    /// Begin fast forward
    BeginFastForward,
    /// Begin rewind
    BeginRewind,
    /// Increase volume
    VolumeUp,
    /// Decrease volume
    VolumeDown,
    /// Shuffle songs
    ShuffleSongs,
}

impl DacpCommand {
    /// Every command, in wire order
    pub const ALL: [Self; 12] = [
        Self::BeginFastForward,
        Self::BeginRewind,
        Self::PrevItem,
        Self::NextItem,
        Self::Pause,
        Self::PlayPause,
        Self::Play,
        Self::Stop,
        Self::PlayResume,
        Self::ShuffleSongs,
        Self::VolumeDown,
        Self::VolumeUp,
    ];

    /// Name of the command as sent on the wire
    #[must_use]
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Play => "play",
            Self::Pause => "pause",
            Self::PlayPause => "playpause",
            Self::PlayResume => "playresume",
            Self::Stop => "stop",
            Self::NextItem => "nextitem",
            Self::PrevItem => "previtem",
            Self::BeginFastForward => "beginff",
            Self::BeginRewind => "beginrew",
            Self::VolumeUp => "volumeup",
            Self::VolumeDown => "volumedown",
            Self::ShuffleSongs => "shuffle_songs",
        }
    }

    /// Parse a wire name
    #[must_use]
    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.wire_name() == name)
    }

    /// Parse from URL path
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        // Path format: /ctrl-int/1/{command}
        let command = path
            .strip_prefix('/')
            .unwrap_or(path)
            .strip_prefix(CONTROL_PATH)?
            .strip_prefix('/')?;
        Self::from_wire(command)
    }

    /// URL path for the command, e.g. `/ctrl-int/1/nextitem`
    #[must_use]
    pub fn path(&self) -> String {
        format!("/{CONTROL_PATH}/{}", self.wire_name())
    }

    /// Get human-readable description
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Play => "Play",
            Self::Pause => "Pause",
            Self::PlayPause => "Play/Pause",
            Self::PlayResume => "Resume",
            Self::Stop => "Stop",
            Self::NextItem => "Next Track",
            Self::PrevItem => "Previous Track",
            Self::BeginFastForward => "Fast Forward",
            Self::BeginRewind => "Rewind",
            Self::VolumeUp => "Volume Up",
            Self::VolumeDown => "Volume Down",
            Self::ShuffleSongs => "Shuffle",
        }
    }
}

impl fmt::Display for DacpCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Outcome of a command the source answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Source accepted the command (2xx)
    Success,
    /// Source does not implement the command (404, 501)
    NotSupported,
    /// Source rejected the command with another status
    Failed(String),
}

impl CommandResult {
    /// Map an HTTP status code onto a result
    #[must_use]
    pub fn from_status(status: u16, reason: Option<&str>) -> Self {
        match status {
            200..=299 => Self::Success,
            404 | 501 => Self::NotSupported,
            _ => Self::Failed(format!("{status} {}", reason.unwrap_or_default()).trim_end().to_string()),
        }
    }

    /// Whether the command was accepted
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}
