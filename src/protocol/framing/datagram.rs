//! Binary framing used by the UDP metadata transport
//!
//! ```text
//! 0      4      8
//! +------+------+---------------------
//! | type | code | payload...
//! +------+------+---------------------
//! ```
//!
//! Payloads too large for one datagram are split into `ssnc`/`chnk`
//! fragments:
//!
//! ```text
//! 0      4      8       12      16          20          24
//! +------+------+-------+-------+-----------+-----------+----------
//! | ssnc | chnk | index | count | real type | real code | fragment
//! +------+------+-------+-------+-----------+-----------+----------
//! ```
//!
//! `index` and `count` are big-endian.

use bytes::{Buf, Bytes, BytesMut};

use super::Framer;
use crate::error::FramingError;
use crate::protocol::metadata::{Category, FourCc, Item, ssnc};

const HEADER_LEN: usize = 8;
const CHUNK_HEADER_LEN: usize = 24;

/// Upper bound on the number of fragments of one payload
pub const MAX_CHUNKS: u32 = 4096;

/// One piece of a chunked payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkFragment {
    /// Position of this fragment
    pub index: u32,
    /// Total number of fragments
    pub count: u32,
    /// Category of the reassembled item
    pub category: Category,
    /// Code of the reassembled item
    pub code: FourCc,
    /// Fragment bytes
    pub data: Bytes,
}

/// A parsed datagram
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Datagram {
    /// Self-contained item
    Item(Item),
    /// Fragment of a larger item
    Chunk(ChunkFragment),
}

/// Parse one datagram
///
/// # Errors
/// Returns `FramingError` for truncated headers, unknown categories or
/// impossible chunk layouts.
pub fn parse_datagram(datagram: &[u8]) -> Result<Datagram, FramingError> {
    if datagram.len() < HEADER_LEN {
        return Err(FramingError::TooShort {
            len: datagram.len(),
        });
    }

    let mut buf = Bytes::copy_from_slice(datagram);
    let category = fourcc(&mut buf);
    let code = fourcc(&mut buf);

    if category == Category::SSNC && code == ssnc::CHUNK {
        if datagram.len() < CHUNK_HEADER_LEN {
            return Err(FramingError::TooShort {
                len: datagram.len(),
            });
        }

        let index = buf.get_u32();
        let count = buf.get_u32();
        if count == 0 || count > MAX_CHUNKS || index >= count {
            return Err(FramingError::InvalidChunk { index, count });
        }

        let category = Category::try_from(fourcc(&mut buf))?;
        let code = fourcc(&mut buf);
        return Ok(Datagram::Chunk(ChunkFragment {
            index,
            count,
            category,
            code,
            data: buf,
        }));
    }

    let category = Category::try_from(category)?;
    Ok(Datagram::Item(Item::with_payload(category, code, buf)))
}

fn fourcc(buf: &mut Bytes) -> FourCc {
    let mut out = [0u8; 4];
    buf.copy_to_slice(&mut out);
    FourCc(out)
}

/// Reassembly buffer for one chunk sequence
#[derive(Debug)]
pub struct ChunkAssembly {
    category: Category,
    code: FourCc,
    slots: Vec<Option<Bytes>>,
    filled: usize,
}

impl ChunkAssembly {
    /// Start a sequence shaped after `fragment`
    #[must_use]
    pub fn new(fragment: &ChunkFragment) -> Self {
        Self {
            category: fragment.category,
            code: fragment.code,
            slots: vec![None; fragment.count as usize],
            filled: 0,
        }
    }

    /// Whether `fragment` can go into this buffer
    ///
    /// A fragment for an already filled slot means the sender started over.
    #[must_use]
    pub fn accepts(&self, fragment: &ChunkFragment) -> bool {
        fragment.category == self.category
            && fragment.code == self.code
            && fragment.count as usize == self.slots.len()
            && self
                .slots
                .get(fragment.index as usize)
                .is_some_and(Option::is_none)
    }

    /// Store a fragment at its index
    pub fn insert(&mut self, fragment: ChunkFragment) {
        if let Some(slot @ None) = self.slots.get_mut(fragment.index as usize) {
            *slot = Some(fragment.data);
            self.filled += 1;
        }
    }

    /// Whether every slot is filled
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.filled == self.slots.len()
    }

    /// Number of filled slots
    #[must_use]
    pub fn filled(&self) -> usize {
        self.filled
    }

    /// Concatenate the fragments in index order
    ///
    /// Returns `None` while slots are missing.
    #[must_use]
    pub fn assemble(&self) -> Option<Item> {
        if !self.is_complete() {
            return None;
        }

        let total = self.slots.iter().flatten().map(Bytes::len).sum();
        let mut payload = BytesMut::with_capacity(total);
        for data in self.slots.iter().flatten() {
            payload.extend_from_slice(data);
        }
        Some(Item::with_payload(self.category, self.code, payload.freeze()))
    }
}

/// Datagram framer with chunk reassembly
///
/// At most one sequence is assembled at a time. A plain datagram arriving
/// mid-sequence discards the partial sequence.
#[derive(Debug, Default)]
pub struct DatagramFramer {
    assembly: Option<ChunkAssembly>,
}

impl DatagramFramer {
    /// Create an idle framer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one datagram
    ///
    /// # Errors
    /// Returns `FramingError` if the datagram cannot be parsed. The framer
    /// state is left as it was.
    pub fn process(&mut self, datagram: &[u8]) -> Result<Option<Item>, FramingError> {
        match parse_datagram(datagram)? {
            Datagram::Item(item) => {
                if let Some(stale) = self.assembly.take() {
                    tracing::debug!(
                        code = %stale.code,
                        filled = stale.filled,
                        count = stale.slots.len(),
                        "Discarding incomplete chunk sequence"
                    );
                }
                Ok(Some(item))
            }
            Datagram::Chunk(fragment) => Ok(self.insert(fragment)),
        }
    }

    fn insert(&mut self, fragment: ChunkFragment) -> Option<Item> {
        let mut assembly = match self.assembly.take() {
            Some(current) if current.accepts(&fragment) => current,
            Some(stale) => {
                tracing::debug!(
                    code = %stale.code,
                    filled = stale.filled,
                    "Chunk sequence restarted"
                );
                ChunkAssembly::new(&fragment)
            }
            None => ChunkAssembly::new(&fragment),
        };

        assembly.insert(fragment);
        if assembly.is_complete() {
            assembly.assemble()
        } else {
            self.assembly = Some(assembly);
            None
        }
    }

    /// Whether a chunk sequence is in flight
    #[must_use]
    pub fn is_assembling(&self) -> bool {
        self.assembly.is_some()
    }
}

impl Framer for DatagramFramer {
    fn push(&mut self, frame: &[u8]) -> Vec<Item> {
        match self.process(frame) {
            Ok(Some(item)) => {
                tracing::trace!(
                    category = %item.category(),
                    code = %item.code(),
                    len = item.len(),
                    "Datagram item"
                );
                vec![item]
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(len = frame.len(), "Dropping datagram: {}", e);
                Vec::new()
            }
        }
    }

    fn reset(&mut self) {
        self.assembly = None;
    }
}
