//! Data layer for the viewing-history analyzer.
//!
//! Finds and reads the `ViewingActivity.csv` export, normalizes its rows,
//! aggregates watched hours and reconstructs viewing sessions.

pub mod aggregator;
pub mod analysis;
pub mod normalizer;
pub mod reader;
pub mod sessions;

#[cfg(test)]
mod test_utils;

pub use viewing_core as core;
