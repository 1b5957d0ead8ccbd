//! shairport-sync metadata items
//!
//! Every record carries two four-character codes. The first, the category,
//! is either `core` for DMAP metadata coming from the source (iTunes, Music,
//! ...) or `ssnc` for events generated by shairport-sync itself, such as
//! metadata block delimiters, artwork, progress and volume.

mod codes;
mod item;
mod value;


pub use codes::{CORE_CODES, CodeEntry, SSNC_CODES, TRACK_INFO_CODES, is_track_field, lookup};
pub use item::{Category, FourCc, Item};
pub use value::{
    CustomDecoder, ProgressSample, TypedValue, ValueKind, VolumeSample, decode, decode_integer,
};

/// shairport-sync event codes
pub mod ssnc {
    use super::FourCc;

    /// Client user agent, announces a new session
    pub const USER_AGENT: FourCc = FourCc::new(b"snua");
    /// Client name, announces a new session
    pub const SOURCE_NAME: FourCc = FourCc::new(b"snam");
    /// Picture transfer begins
    pub const PICTURE_START: FourCc = FourCc::new(b"pcst");
    /// Picture payload
    pub const PICTURE: FourCc = FourCc::new(b"PICT");
    /// Picture transfer ends
    pub const PICTURE_END: FourCc = FourCc::new(b"pcen");
    /// Metadata block begins
    pub const METADATA_START: FourCc = FourCc::new(b"mdst");
    /// Metadata block ends
    pub const METADATA_END: FourCc = FourCc::new(b"mden");
    /// Play stream begins
    pub const STREAM_BEGIN: FourCc = FourCc::new(b"pbeg");
    /// Play stream paused (flush)
    pub const STREAM_PAUSE: FourCc = FourCc::new(b"pfls");
    /// Play stream resumed
    pub const STREAM_RESUME: FourCc = FourCc::new(b"prsm");
    /// Play stream ended
    pub const STREAM_END: FourCc = FourCc::new(b"pend");
    /// Progress `start/current/end`
    pub const PROGRESS: FourCc = FourCc::new(b"prgr");
    /// Volume `airplay,volume,low,high`
    pub const VOLUME: FourCc = FourCc::new(b"pvol");
    /// DACP id of the source
    pub const DACP_ID: FourCc = FourCc::new(b"daid");
    /// Active-Remote token of the source
    pub const ACTIVE_REMOTE: FourCc = FourCc::new(b"acre");
    /// Marker of a datagram chunk fragment
    pub const CHUNK: FourCc = FourCc::new(b"chnk");
}
