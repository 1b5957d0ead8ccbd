use std::io;
use thiserror::Error;

/// Errors raised while turning a payload into a typed value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Declared length does not match the payload
    #[error("malformed length: declared {declared}, payload has {actual} bytes")]
    LengthMismatch {
        /// Length announced by the record
        declared: usize,
        /// Bytes actually present
        actual: usize,
    },

    /// Requested value kind is not one of the supported kinds
    #[error("unsupported value kind: {0}")]
    UnsupportedKind(String),

    /// Payload is not valid UTF-8
    #[error("payload is not valid UTF-8")]
    InvalidUtf8,

    /// Payload does not have the shape the decoder expects
    #[error("invalid {code} payload: {reason}")]
    InvalidPayload {
        /// Code of the offending item
        code: String,
        /// What was wrong with it
        reason: String,
    },

    /// Integer does not fit the requested representation
    #[error("integer out of range for {target}")]
    OutOfRange {
        /// Target representation
        target: &'static str,
    },
}

/// Errors raised while cutting a byte stream into records
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FramingError {
    /// A required element is missing from a pipe record
    #[error("missing <{0}> element")]
    MissingField(&'static str),

    /// An identifier is not eight ASCII hex digits
    #[error("invalid hex identifier: {0:?}")]
    InvalidHex(String),

    /// The `<length>` element is not a decimal number
    #[error("invalid length: {0:?}")]
    InvalidLength(String),

    /// The payload uses an encoding other than base64
    #[error("unsupported data encoding: {0:?}")]
    UnsupportedEncoding(String),

    /// The payload is not valid base64
    #[error("invalid base64 payload")]
    InvalidBase64,

    /// The record is not wrapped in `<item>` tags
    #[error("record is not an <item> element")]
    NotAnItem,

    /// The record exceeds the size limit
    #[error("record too large: {size} bytes")]
    RecordTooLarge {
        /// Size in bytes when the limit was hit
        size: usize,
    },

    /// The datagram is shorter than its header
    #[error("datagram too short: {len} bytes")]
    TooShort {
        /// Received length
        len: usize,
    },

    /// Category is neither `core` nor `ssnc`
    #[error("unknown category: {0}")]
    UnknownCategory(String),

    /// Chunk header announces an impossible layout
    #[error("invalid chunk {index}/{count}")]
    InvalidChunk {
        /// Declared index
        index: u32,
        /// Declared count
        count: u32,
    },

    /// The record parsed but its payload is inconsistent
    #[error(transparent)]
    Item(#[from] DecodeError),
}

/// Errors returned by the remote-control client
#[derive(Debug, Error)]
pub enum RemoteError {
    /// HTTP transport failed
    #[error("request to {url} failed: {source}")]
    Request {
        /// URL of the failed command
        url: String,
        /// Underlying transport error
        #[source]
        source: reqwest::Error,
    },

    /// Building the HTTP client failed
    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The auth token cannot be sent as a header value
    #[error("invalid Active-Remote token: {0:?}")]
    InvalidToken(String),
}

/// Errors that can occur while listening to metadata or controlling the source
#[derive(Debug, Error)]
pub enum MetadataError {
    /// Malformed framed record
    #[error("framing error: {0}")]
    Framing(#[from] FramingError),

    /// Payload did not match its declared type
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    // ===== Discovery Errors =====
    /// mDNS discovery could not be started
    #[error("discovery failed: {message}")]
    DiscoveryFailed {
        /// Description of the failure
        message: String,
        /// The underlying source of the error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Remote control was requested before both tokens arrived
    #[error("remote control unavailable: no device id and active-remote token received yet")]
    RemoteUnavailable,

    // ===== Network Errors =====
    /// Remote command failed
    #[error("network error: {0}")]
    Network(#[from] RemoteError),

    /// I/O error on the metadata source
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ===== Setup Errors =====
    /// Configuration rejected at construction
    #[error("invalid configuration: {name} - {message}")]
    InvalidConfig {
        /// The offending setting
        name: &'static str,
        /// Why it was rejected
        message: String,
    },

    /// The receiver daemon could not be started or stopped
    #[error("receiver daemon error: {message}")]
    Daemon {
        /// Description of the failure
        message: String,
    },
}

impl MetadataError {
    /// Check if processing can continue after this error
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Framing(_) | Self::Decode(_) | Self::Network(_) | Self::RemoteUnavailable
        )
    }

    /// Check if this error means the remote endpoint should be discovered again
    #[must_use]
    pub fn is_connection_lost(&self) -> bool {
        matches!(self, Self::Network(RemoteError::Request { .. }))
    }
}

/// Result type alias for metadata operations
pub type Result<T> = std::result::Result<T, MetadataError>;
