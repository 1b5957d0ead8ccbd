//! Lifecycle of the shairport-sync process
//!
//! The receiver is started when listening starts and stopped again when the
//! returned [`DaemonGuard`] goes away, including on early returns and panics
//! that unwind.

use std::path::PathBuf;
use std::process::Command;
use std::sync::Arc;

use crate::error::{MetadataError, Result};

/// Something that can start and stop the AirPlay receiver
pub trait ReceiverDaemon: Send + Sync {
    /// Start the receiver in the background
    ///
    /// # Errors
    /// Returns `MetadataError::Daemon` if the receiver could not be started.
    fn start(&self) -> Result<()>;

    /// Stop a receiver started by [`ReceiverDaemon::start`]
    ///
    /// # Errors
    /// Returns `MetadataError::Daemon` if the receiver could not be stopped.
    fn stop(&self) -> Result<()>;
}

/// shairport-sync run as a daemon (`-d` to start, `-k` to kill)
///
/// Everything else is taken from the shairport-sync configuration file.
#[derive(Debug, Clone)]
pub struct ShairportSyncDaemon {
    program: PathBuf,
}

impl ShairportSyncDaemon {
    /// Executable looked up on `PATH`
    pub const DEFAULT_PROGRAM: &'static str = "shairport-sync";

    /// Use a specific executable
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, flag: &str, action: &str) -> Result<()> {
        let output = Command::new(&self.program)
            .arg(flag)
            .output()
            .map_err(|e| MetadataError::Daemon {
                message: format!("can not {action} {}: {e}", self.program.display()),
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(MetadataError::Daemon {
                message: format!(
                    "can not {action} {}: {}",
                    self.program.display(),
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            })
        }
    }
}

impl Default for ShairportSyncDaemon {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PROGRAM)
    }
}

impl ReceiverDaemon for ShairportSyncDaemon {
    fn start(&self) -> Result<()> {
        self.run("-d", "start")?;
        tracing::info!(program = %self.program.display(), "Started shairport-sync daemon");
        Ok(())
    }

    fn stop(&self) -> Result<()> {
        self.run("-k", "stop")?;
        tracing::info!(program = %self.program.display(), "Stopped shairport-sync daemon");
        Ok(())
    }
}

/// Running receiver; stopped on [`DaemonGuard::stop`] or drop
#[must_use = "the receiver is stopped when the guard is dropped"]
pub struct DaemonGuard {
    daemon: Option<Arc<dyn ReceiverDaemon>>,
}

impl DaemonGuard {
    /// Start `daemon` and return the guard owning it
    ///
    /// # Errors
    /// Returns the daemon's error if it could not be started; nothing needs
    /// stopping in that case.
    pub fn start(daemon: Arc<dyn ReceiverDaemon>) -> Result<Self> {
        daemon.start()?;
        Ok(Self {
            daemon: Some(daemon),
        })
    }

    /// Stop the receiver now
    ///
    /// # Errors
    /// Returns the daemon's error if it could not be stopped.
    pub fn stop(mut self) -> Result<()> {
        match self.daemon.take() {
            Some(daemon) => daemon.stop(),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for DaemonGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DaemonGuard")
            .field("running", &self.daemon.is_some())
            .finish()
    }
}

impl Drop for DaemonGuard {
    fn drop(&mut self) {
        if let Some(daemon) = self.daemon.take() {
            if let Err(e) = daemon.stop() {
                tracing::warn!("{}", e);
            }
        }
    }
}
