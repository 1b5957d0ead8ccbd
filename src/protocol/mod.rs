//! Wire formats: metadata items, their framings, and DACP commands

pub mod dacp;
pub mod framing;
pub mod metadata;
