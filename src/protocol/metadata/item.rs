//! Metadata items and their four-character identifiers

use std::fmt;
use std::sync::OnceLock;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;

use super::codes::{self, CodeEntry};
use super::value::{self, TypedValue, ValueKind};
use crate::error::{DecodeError, FramingError};

/// Four-character identifier used for both categories and codes
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FourCc(pub [u8; 4]);

impl FourCc {
    /// Create from a byte literal
    #[must_use]
    pub const fn new(bytes: &[u8; 4]) -> Self {
        Self(*bytes)
    }

    /// Take the first four bytes of a slice
    #[must_use]
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let head: [u8; 4] = bytes.get(..4)?.try_into().ok()?;
        Some(Self(head))
    }

    /// Parse the pipe's hex form, e.g. `"73736e63"` for `ssnc`
    ///
    /// # Errors
    /// Returns `FramingError::InvalidHex` unless the text is exactly eight hex digits.
    pub fn from_hex(text: &str) -> Result<Self, FramingError> {
        let text = text.trim();
        if text.len() != 8 || !text.is_ascii() {
            return Err(FramingError::InvalidHex(text.to_string()));
        }

        let mut out = [0u8; 4];
        for (slot, pair) in out.iter_mut().zip(text.as_bytes().chunks_exact(2)) {
            let pair = std::str::from_utf8(pair).map_err(|_| FramingError::InvalidHex(text.to_string()))?;
            *slot = u8::from_str_radix(pair, 16)
                .map_err(|_| FramingError::InvalidHex(text.to_string()))?;
        }
        Ok(Self(out))
    }

    /// Hex form as written by the pipe backend
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Raw bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl From<[u8; 4]> for FourCc {
    fn from(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = std::str::from_utf8(&self.0).unwrap_or("????");
        write!(f, "{s}")
    }
}

impl fmt::Debug for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FourCc({self})")
    }
}

impl PartialEq<&[u8; 4]> for FourCc {
    fn eq(&self, other: &&[u8; 4]) -> bool {
        &self.0 == *other
    }
}

/// The two item namespaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub enum Category {
    /// DMAP metadata forwarded from the source (`core`)
    Core,
    /// Events generated by shairport-sync itself (`ssnc`)
    ShairportExtension,
}

impl Category {
    /// Wire identifier for `core`
    pub const CORE: FourCc = FourCc::new(b"core");
    /// Wire identifier for `ssnc`
    pub const SSNC: FourCc = FourCc::new(b"ssnc");

    /// Map a wire identifier onto a category
    #[must_use]
    pub fn from_fourcc(id: FourCc) -> Option<Self> {
        match &id.0 {
            b"core" => Some(Self::Core),
            b"ssnc" => Some(Self::ShairportExtension),
            _ => None,
        }
    }

    /// Wire identifier
    #[must_use]
    pub fn fourcc(self) -> FourCc {
        match self {
            Self::Core => Self::CORE,
            Self::ShairportExtension => Self::SSNC,
        }
    }
}

impl TryFrom<FourCc> for Category {
    type Error = FramingError;

    fn try_from(id: FourCc) -> Result<Self, Self::Error> {
        Self::from_fourcc(id).ok_or_else(|| FramingError::UnknownCategory(id.to_string()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fourcc().fmt(f)
    }
}

/// One metadata record
///
/// Built once per framed record and never mutated. The payload is shared
/// (`Bytes`), so cloning an item for subscribers is cheap.
#[derive(Debug, Clone)]
pub struct Item {
    category: Category,
    code: FourCc,
    payload: Option<Bytes>,
    base64: OnceLock<String>,
}

impl Item {
    /// Create an item from raw bytes
    ///
    /// `length` must equal the payload length, and must be zero exactly when
    /// there is no payload.
    ///
    /// # Errors
    /// Returns `DecodeError::LengthMismatch` when the declared length is inconsistent.
    pub fn new(
        category: Category,
        code: FourCc,
        length: usize,
        payload: Option<Bytes>,
    ) -> Result<Self, DecodeError> {
        let payload = payload.filter(|p| !p.is_empty());
        let actual = payload.as_ref().map_or(0, Bytes::len);
        if actual != length {
            return Err(DecodeError::LengthMismatch {
                declared: length,
                actual,
            });
        }

        Ok(Self {
            category,
            code,
            payload,
            base64: OnceLock::new(),
        })
    }

    /// Create an item whose payload arrived base64 encoded
    ///
    /// The wire text is kept so that [`Item::base64`] returns it verbatim.
    ///
    /// # Errors
    /// Returns `FramingError::InvalidBase64` if the text does not decode, or a
    /// wrapped `DecodeError` if the decoded length disagrees with `length`.
    pub fn from_base64(
        category: Category,
        code: FourCc,
        length: usize,
        text: &str,
    ) -> Result<Self, FramingError> {
        let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        let raw = STANDARD
            .decode(compact.as_bytes())
            .map_err(|_| FramingError::InvalidBase64)?;

        let item = Self::new(category, code, length, Some(Bytes::from(raw)))?;
        if item.payload.is_some() {
            let _ = item.base64.set(compact);
        }
        Ok(item)
    }

    /// Item without payload
    #[must_use]
    pub fn empty(category: Category, code: FourCc) -> Self {
        Self {
            category,
            code,
            payload: None,
            base64: OnceLock::new(),
        }
    }

    /// Item carrying `payload`, length taken from the payload itself
    #[must_use]
    pub fn with_payload(category: Category, code: FourCc, payload: impl Into<Bytes>) -> Self {
        let payload: Bytes = payload.into();
        Self {
            category,
            code,
            payload: (!payload.is_empty()).then_some(payload),
            base64: OnceLock::new(),
        }
    }

    /// Item namespace
    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    /// Item code within its namespace
    #[must_use]
    pub fn code(&self) -> FourCc {
        self.code
    }

    /// Payload bytes, `None` when the record carried no data
    #[must_use]
    pub fn payload(&self) -> Option<&[u8]> {
        self.payload.as_deref()
    }

    /// Shared handle to the payload
    #[must_use]
    pub fn payload_bytes(&self) -> Option<Bytes> {
        self.payload.clone()
    }

    /// Declared length (zero when there is no payload)
    #[must_use]
    pub fn len(&self) -> usize {
        self.payload.as_ref().map_or(0, Bytes::len)
    }

    /// Whether the record carried no payload
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.payload.is_none()
    }

    /// Payload as base64 text, computed on first use
    #[must_use]
    pub fn base64(&self) -> Option<&str> {
        let payload = self.payload.as_ref()?;
        Some(self.base64.get_or_init(|| STANDARD.encode(payload)))
    }

    /// Code table entry for this item, if the code is known
    #[must_use]
    pub fn entry(&self) -> Option<&'static CodeEntry> {
        codes::lookup(self.category, self.code)
    }

    /// Decode the payload using the kind from the code table
    ///
    /// Unknown codes come back as raw bytes.
    ///
    /// # Errors
    /// Returns `DecodeError` if the payload does not fit the table's kind.
    pub fn value(&self) -> Result<Option<TypedValue>, DecodeError> {
        value::decode(self, None)
    }

    /// Decode the payload as an explicit kind
    ///
    /// # Errors
    /// Returns `DecodeError` if the payload does not fit `kind`.
    pub fn value_as(&self, kind: ValueKind) -> Result<Option<TypedValue>, DecodeError> {
        value::decode(self, Some(kind))
    }

    /// Payload decoded as UTF-8 text
    ///
    /// # Errors
    /// Returns `DecodeError::InvalidUtf8` for non UTF-8 payloads.
    pub fn text(&self) -> Result<Option<&str>, DecodeError> {
        self.payload()
            .map(|p| std::str::from_utf8(p).map_err(|_| DecodeError::InvalidUtf8))
            .transpose()
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.category == other.category && self.code == other.code && self.payload == other.payload
    }
}

impl Eq for Item {}
