//! Framing of shairport-sync metadata streams
//!
//! shairport-sync publishes metadata either as XML-ish text records on a
//! named pipe or as binary UDP datagrams. Both framers are sans-IO: feed them
//! bytes as they arrive and collect the items they complete.

mod datagram;
mod pipe;

#[cfg(test)]
mod tests;

pub use datagram::{
    ChunkAssembly, ChunkFragment, Datagram, DatagramFramer, MAX_CHUNKS, parse_datagram,
};
pub use pipe::{MAX_RECORD_SIZE, PipeFramer, parse_record};

use super::metadata::Item;

/// Turns raw frames from a transport into metadata items
///
/// What a frame is depends on the transport: a chunk of pipe text, one UDP
/// datagram, or a message from any other bus carrying the same item format.
/// Malformed input is logged and dropped; a framer never fails the stream.
pub trait Framer: Send {
    /// Feed one frame and return the items it completed, in order
    fn push(&mut self, frame: &[u8]) -> Vec<Item>;

    /// Drop any partially assembled state
    fn reset(&mut self);
}
