//! Config store for zoomprune.
//!
//! A map renderer writes its viewer configuration as a JavaScript file: a
//! fixed assignment prefix followed by one JSON object. Each entry of the
//! object's `tilesets` array describes one world, with the world's output
//! `path` and its `maxZoom` depth. This crate reads that file into typed
//! records, lets callers change a world's depth, and writes it back without
//! losing any attribute it does not understand.
//!
//! # Key Types
//!
//! - [`ConfigStore`] -- Location of the config file; load and persist
//! - [`Configuration`] -- The decoded object: worlds plus passthrough fields
//! - [`World`] -- One tileset entry: path, depth, passthrough fields
//! - [`ConfigError`] -- Everything that can go wrong reading or writing

pub mod error;
pub mod model;
pub mod store;

pub use error::{ConfigError, Result};
pub use model::{Configuration, World};
pub use store::{ConfigStore, CONFIG_PREFIX, DEFAULT_CONFIG_FILE};
