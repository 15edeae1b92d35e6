//! Core types for the viewing-history analyzer: the record model, pipeline
//! configuration, command-line settings and parsing helpers shared by the
//! data and binary crates.

pub mod config;
pub mod devices;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;
pub mod titles;

pub use error::{Result, ViewingError};
