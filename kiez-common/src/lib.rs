//! # Kiez Common Library
//!
//! Shared code for the Kiez server and client components including:
//! - Track data model
//! - Configuration loading and directory resolution
//! - Common error types

pub mod config;
pub mod error;
pub mod track;

pub use error::{Error, Result};
pub use track::{Track, TrackId};
