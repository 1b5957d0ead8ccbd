//! DACP remote control of the connected source

mod client;

#[cfg(test)]
mod tests;

pub use client::{RemoteClient, RemoteControl};
