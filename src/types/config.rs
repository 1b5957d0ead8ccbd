use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{MetadataError, Result};

/// Location of the metadata pipe written by shairport-sync
pub const DEFAULT_PIPE_PATH: &str = "/tmp/shairport-sync-metadata";

/// Address shairport-sync sends metadata datagrams to
pub const DEFAULT_DATAGRAM_ADDR: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 5555));

/// Sample rate shairport-sync reports progress in
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Reading from the named pipe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipeConfig {
    /// Path of the FIFO (default: `/tmp/shairport-sync-metadata`)
    pub path: PathBuf,

    /// Wait between checks while the FIFO is missing (default: 5 seconds)
    pub retry_interval: Duration,
}

impl Default for PipeConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_PIPE_PATH),
            retry_interval: Duration::from_secs(5),
        }
    }
}

impl PipeConfig {
    /// Pipe config for a custom path
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Err(invalid("pipe.path", "must not be empty"));
        }
        if self.retry_interval.is_zero() {
            return Err(invalid("pipe.retry_interval", "must be positive"));
        }
        Ok(())
    }
}

/// Receiving UDP datagrams
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatagramConfig {
    /// Local address to bind (default: `127.0.0.1:5555`)
    pub bind: SocketAddr,

    /// Largest datagram accepted (default: 65000 bytes)
    pub receive_buffer: usize,
}

impl Default for DatagramConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_DATAGRAM_ADDR,
            receive_buffer: 65_000,
        }
    }
}

impl DatagramConfig {
    /// Datagram config bound to `bind`
    #[must_use]
    pub fn new(bind: SocketAddr) -> Self {
        Self {
            bind,
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if self.receive_buffer == 0 {
            return Err(invalid("datagram.receive_buffer", "must be positive"));
        }
        Ok(())
    }
}

/// Where metadata comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceConfig {
    /// Named pipe
    Pipe(PipeConfig),
    /// UDP datagrams
    Datagram(DatagramConfig),
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self::Pipe(PipeConfig::default())
    }
}

impl SourceConfig {
    fn validate(&self) -> Result<()> {
        match self {
            Self::Pipe(pipe) => pipe.validate(),
            Self::Datagram(datagram) => datagram.validate(),
        }
    }
}

/// Configuration of a metadata listener
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerConfig {
    /// Metadata transport
    pub source: SourceConfig,

    /// Sample rate used to turn progress frames into seconds (default: 44100)
    pub sample_rate: u32,

    /// Directory receiving artwork files (default: system temp dir)
    pub artwork_dir: PathBuf,

    /// Events buffered per subscriber before it lags (default: 64)
    pub event_capacity: usize,

    /// Start shairport-sync when listening starts and stop it afterwards
    pub manage_daemon: bool,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            sample_rate: DEFAULT_SAMPLE_RATE,
            artwork_dir: std::env::temp_dir(),
            event_capacity: 64,
            manage_daemon: false,
        }
    }
}

impl ListenerConfig {
    /// Create a new config builder
    #[must_use]
    pub fn builder() -> ListenerConfigBuilder {
        ListenerConfigBuilder::default()
    }

    /// Check every setting
    ///
    /// # Errors
    /// Returns `MetadataError::InvalidConfig` naming the first bad setting.
    pub fn validate(&self) -> Result<()> {
        self.source.validate()?;
        if self.sample_rate == 0 {
            return Err(invalid("sample_rate", "must be positive"));
        }
        if self.event_capacity == 0 {
            return Err(invalid("event_capacity", "must be positive"));
        }
        if self.artwork_dir.as_os_str().is_empty() {
            return Err(invalid("artwork_dir", "must not be empty"));
        }
        Ok(())
    }
}

fn invalid(name: &'static str, message: &str) -> MetadataError {
    MetadataError::InvalidConfig {
        name,
        message: message.to_string(),
    }
}

/// Builder for `ListenerConfig`
#[derive(Debug, Clone, Default)]
pub struct ListenerConfigBuilder {
    config: ListenerConfig,
}

impl ListenerConfigBuilder {
    /// Read from a named pipe
    #[must_use]
    pub fn pipe(mut self, pipe: PipeConfig) -> Self {
        self.config.source = SourceConfig::Pipe(pipe);
        self
    }

    /// Receive UDP datagrams
    #[must_use]
    pub fn datagram(mut self, datagram: DatagramConfig) -> Self {
        self.config.source = SourceConfig::Datagram(datagram);
        self
    }

    /// Set sample rate
    #[must_use]
    pub fn sample_rate(mut self, rate: u32) -> Self {
        self.config.sample_rate = rate;
        self
    }

    /// Set artwork directory
    #[must_use]
    pub fn artwork_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.artwork_dir = dir.into();
        self
    }

    /// Set per-subscriber event buffer
    #[must_use]
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.config.event_capacity = capacity;
        self
    }

    /// Start and stop shairport-sync along with the listener
    #[must_use]
    pub fn manage_daemon(mut self, enable: bool) -> Self {
        self.config.manage_daemon = enable;
        self
    }

    /// Build and validate the configuration
    ///
    /// # Errors
    /// Returns `MetadataError::InvalidConfig` if a setting is out of range.
    pub fn build(self) -> Result<ListenerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
