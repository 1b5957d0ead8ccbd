//! Byte sources feeding the framers

use std::net::SocketAddr;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;

use crate::error::Result;
use crate::types::DatagramConfig;

/// Produces raw frames for a [`Framer`](crate::protocol::framing::Framer)
#[async_trait]
pub trait FrameSource: Send {
    /// Wait for the next frame
    ///
    /// Returns `Ok(None)` once the source is exhausted for good.
    ///
    /// # Errors
    /// Returns an error if reading failed; the caller may try again.
    async fn next_frame(&mut self) -> Result<Option<Bytes>>;
}

/// UDP socket receiving metadata datagrams
#[derive(Debug)]
pub struct DatagramSource {
    socket: UdpSocket,
    buf: Vec<u8>,
}

impl DatagramSource {
    /// Bind the configured address
    ///
    /// # Errors
    /// Returns `MetadataError::Io` if the socket cannot be bound.
    pub async fn bind(config: &DatagramConfig) -> Result<Self> {
        let socket = UdpSocket::bind(config.bind).await?;
        tracing::info!(addr = %socket.local_addr()?, "Listening for metadata datagrams");
        Ok(Self::from_socket(socket, config.receive_buffer))
    }

    /// Use an already bound socket
    #[must_use]
    pub fn from_socket(socket: UdpSocket, receive_buffer: usize) -> Self {
        Self {
            socket,
            buf: vec![0u8; receive_buffer],
        }
    }

    /// Bound address
    ///
    /// # Errors
    /// Returns `MetadataError::Io` if the address cannot be read.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }
}

#[async_trait]
impl FrameSource for DatagramSource {
    async fn next_frame(&mut self) -> Result<Option<Bytes>> {
        let (len, peer) = self.socket.recv_from(&mut self.buf).await?;
        tracing::trace!(len, peer = %peer, "Datagram received");
        Ok(Some(Bytes::copy_from_slice(&self.buf[..len])))
    }
}

/// Frames pushed by the application, e.g. from a message bus
#[derive(Debug)]
pub struct ChannelSource {
    rx: mpsc::Receiver<Bytes>,
}

impl ChannelSource {
    /// Read frames from `rx` until all senders are gone
    #[must_use]
    pub fn new(rx: mpsc::Receiver<Bytes>) -> Self {
        Self { rx }
    }

    /// Create a source with its sender
    #[must_use]
    pub fn channel(capacity: usize) -> (mpsc::Sender<Bytes>, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (tx, Self::new(rx))
    }
}

#[async_trait]
impl FrameSource for ChannelSource {
    async fn next_frame(&mut self) -> Result<Option<Bytes>> {
        Ok(self.rx.recv().await)
    }
}

#[cfg(unix)]
pub use pipe::PipeSource;

#[cfg(unix)]
mod pipe {
    use std::path::Path;

    use async_trait::async_trait;
    use bytes::{Bytes, BytesMut};
    use tokio::io::AsyncReadExt;
    use tokio::net::unix::pipe;

    use super::FrameSource;
    use crate::error::Result;
    use crate::types::PipeConfig;

    /// Bytes requested from the FIFO per read
    const READ_CHUNK: usize = 64 * 1024;

    /// Named pipe written by shairport-sync
    ///
    /// Waits for the FIFO to appear, then yields whatever each read
    /// returns; line splitting is left to the framer. When the writer goes
    /// away the FIFO is reopened.
    #[derive(Debug)]
    pub struct PipeSource {
        config: PipeConfig,
        receiver: Option<pipe::Receiver>,
        buf: BytesMut,
    }

    impl PipeSource {
        /// Source for the configured FIFO; nothing is opened until the first read
        #[must_use]
        pub fn new(config: PipeConfig) -> Self {
            Self {
                config,
                receiver: None,
                buf: BytesMut::with_capacity(READ_CHUNK),
            }
        }

        /// Path of the FIFO
        #[must_use]
        pub fn path(&self) -> &Path {
            &self.config.path
        }

        async fn open(&self) -> Result<pipe::Receiver> {
            loop {
                match tokio::fs::metadata(&self.config.path).await {
                    Ok(meta) if is_fifo(&meta) => break,
                    Ok(_) => tracing::warn!(
                        path = %self.config.path.display(),
                        "Not a FIFO. Retrying in {:?}...",
                        self.config.retry_interval
                    ),
                    Err(_) => tracing::warn!(
                        path = %self.config.path.display(),
                        "Could not find pipe. Retrying in {:?}...",
                        self.config.retry_interval
                    ),
                }
                tokio::time::sleep(self.config.retry_interval).await;
            }

            let mut options = pipe::OpenOptions::new();
            // Keep a writer end open so reads wait instead of hitting EOF
            #[cfg(target_os = "linux")]
            options.read_write(true);
            let receiver = options.open_receiver(&self.config.path)?;

            tracing::info!(path = %self.config.path.display(), "Start parsing the pipe");
            Ok(receiver)
        }
    }

    fn is_fifo(meta: &std::fs::Metadata) -> bool {
        use std::os::unix::fs::FileTypeExt;
        meta.file_type().is_fifo()
    }

    #[async_trait]
    impl FrameSource for PipeSource {
        async fn next_frame(&mut self) -> Result<Option<Bytes>> {
            loop {
                if self.receiver.is_none() {
                    self.receiver = Some(self.open().await?);
                }
                let Some(receiver) = self.receiver.as_mut() else {
                    continue;
                };

                self.buf.clear();
                self.buf.reserve(READ_CHUNK);
                let read = match receiver.read_buf(&mut self.buf).await {
                    Ok(read) => read,
                    Err(e) => {
                        self.receiver = None;
                        return Err(e.into());
                    }
                };

                if read == 0 {
                    tracing::debug!(path = %self.config.path.display(), "Pipe writer closed");
                    self.receiver = None;
                    tokio::time::sleep(self.config.retry_interval).await;
                    continue;
                }

                return Ok(Some(self.buf.split().freeze()));
            }
        }
    }
}
