//! Typed decoding of item payloads

use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use serde::Serialize;

use super::item::Item;
use crate::error::DecodeError;

/// How a payload should be interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// UTF-8 text
    String,
    /// Big-endian unsigned integer of any width
    Integer,
    /// Integer, non-zero means true
    Boolean,
    /// Integer seconds since the Unix epoch
    Timestamp,
    /// Raw bytes, left untouched
    Bytes,
    /// Base64 text form of the payload
    Base64,
    /// Code-specific structured payload
    Custom(CustomDecoder),
}

/// Structured payloads that need their own parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CustomDecoder {
    /// `start/current/end` RTP timestamps (`prgr`)
    Progress,
    /// `airplay_volume,volume,lowest,highest` in dB (`pvol`)
    Volume,
}

impl FromStr for ValueKind {
    type Err = DecodeError;

    /// Parse the short kind names used by shairport-sync tooling
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "str" | "string" => Ok(Self::String),
            "int" | "integer" => Ok(Self::Integer),
            "bool" | "boolean" => Ok(Self::Boolean),
            "date" | "timestamp" => Ok(Self::Timestamp),
            "bytes" => Ok(Self::Bytes),
            "base64" => Ok(Self::Base64),
            "progress" => Ok(Self::Custom(CustomDecoder::Progress)),
            "volume" => Ok(Self::Custom(CustomDecoder::Volume)),
            other => Err(DecodeError::UnsupportedKind(other.to_string())),
        }
    }
}

/// Playback progress as sent by the receiver, in RTP frames
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressSample {
    /// Frame at which the track started
    pub start: f64,
    /// Frame currently playing
    pub current: f64,
    /// Frame at which the track ends
    pub end: f64,
}

/// Volume report in dB
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VolumeSample {
    /// Volume requested by the source, 0 down to -30, -144 for mute
    pub airplay_db: f64,
    /// Output volume
    pub volume_db: f64,
    /// Lowest output volume
    pub lowest_db: f64,
    /// Highest output volume
    pub highest_db: f64,
}

impl VolumeSample {
    /// dB value the source uses to signal mute
    pub const MUTE_DB: f64 = -144.0;
}

/// A decoded payload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TypedValue {
    /// Text
    String(String),
    /// Unsigned integer of arbitrary width
    Integer(BigUint),
    /// Flag
    Boolean(bool),
    /// Point in time
    Timestamp(SystemTime),
    /// Opaque bytes
    Bytes(Vec<u8>),
    /// Base64 text of the payload
    Base64(String),
    /// Playback progress
    Progress(ProgressSample),
    /// Volume report
    Volume(VolumeSample),
}

impl TypedValue {
    /// Text value, if this is a string
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Base64(s) => Some(s),
            _ => None,
        }
    }

    /// Integer value, if it fits in 64 bits
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Integer(n) => n.to_u64(),
            Self::Boolean(b) => Some(u64::from(*b)),
            _ => None,
        }
    }

    /// Boolean value
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

/// Decode an item's payload
///
/// With no `kind` the code table decides; codes missing from the table come
/// back as raw bytes. Items without payload decode to `None`.
///
/// # Errors
/// Returns `DecodeError` if the payload does not fit the kind.
pub fn decode(item: &Item, kind: Option<ValueKind>) -> Result<Option<TypedValue>, DecodeError> {
    let Some(payload) = item.payload() else {
        return Ok(None);
    };

    let kind = match kind {
        Some(kind) => kind,
        None => match item.entry() {
            Some(entry) => entry.kind,
            None => return Ok(Some(TypedValue::Bytes(payload.to_vec()))),
        },
    };

    let value = match kind {
        ValueKind::String => TypedValue::String(decode_string(payload)?.to_string()),
        ValueKind::Integer => TypedValue::Integer(decode_integer(payload)),
        ValueKind::Boolean => TypedValue::Boolean(!decode_integer(payload).is_zero()),
        ValueKind::Timestamp => TypedValue::Timestamp(decode_timestamp(payload)?),
        ValueKind::Bytes => TypedValue::Bytes(payload.to_vec()),
        ValueKind::Base64 => {
            TypedValue::Base64(item.base64().unwrap_or_default().to_string())
        }
        ValueKind::Custom(CustomDecoder::Progress) => {
            let [start, current, end] = decode_numbers::<3>(item, '/')?;
            TypedValue::Progress(ProgressSample {
                start,
                current,
                end,
            })
        }
        ValueKind::Custom(CustomDecoder::Volume) => {
            let [airplay_db, volume_db, lowest_db, highest_db] = decode_numbers::<4>(item, ',')?;
            TypedValue::Volume(VolumeSample {
                airplay_db,
                volume_db,
                lowest_db,
                highest_db,
            })
        }
    };

    Ok(Some(value))
}

fn decode_string(payload: &[u8]) -> Result<&str, DecodeError> {
    std::str::from_utf8(payload).map_err(|_| DecodeError::InvalidUtf8)
}

/// Big-endian unsigned interpretation of the whole payload
#[must_use]
pub fn decode_integer(payload: &[u8]) -> BigUint {
    BigUint::from_bytes_be(payload)
}

fn decode_timestamp(payload: &[u8]) -> Result<SystemTime, DecodeError> {
    let secs = decode_integer(payload)
        .to_u64()
        .ok_or(DecodeError::OutOfRange { target: "timestamp" })?;
    UNIX_EPOCH
        .checked_add(Duration::from_secs(secs))
        .ok_or(DecodeError::OutOfRange { target: "timestamp" })
}

fn decode_numbers<const N: usize>(item: &Item, separator: char) -> Result<[f64; N], DecodeError> {
    let invalid = |reason: String| DecodeError::InvalidPayload {
        code: item.code().to_string(),
        reason,
    };

    let text = decode_string(item.payload().unwrap_or_default())?;
    let parts: Vec<&str> = text.trim().split(separator).collect();
    if parts.len() != N {
        return Err(invalid(format!("expected {N} values, got {}", parts.len())));
    }

    let mut out = [0.0; N];
    for (slot, part) in out.iter_mut().zip(parts) {
        let number: f64 = part
            .trim()
            .parse()
            .map_err(|_| invalid(format!("{part:?} is not a number")))?;
        // `f64::from_str` also accepts nan and inf
        if !number.is_finite() {
            return Err(invalid(format!("{part:?} is not a finite number")));
        }
        *slot = number;
    }
    Ok(out)
}
