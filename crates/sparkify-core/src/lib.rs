//! Core domain model for sparkify.
//!
//! This crate defines the star-schema rows (one `songplays` fact table and
//! the `songs`, `artists`, `users` and `time` dimensions), the SQLite schema
//! and the conflict-tolerant store used by the loader.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod error;
pub mod model;
pub mod schema;

pub use error::{Error, Result};
