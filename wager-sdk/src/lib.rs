//! Shared wire types for the wager line provider and bet maker.
//!
//! The `client` feature adds typed HTTP clients on top of `reqwest`.

pub mod objects;

#[cfg(feature = "client")]
pub mod client;
