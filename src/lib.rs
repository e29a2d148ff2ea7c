//! Media Copier Library
//!
//! Copies or moves photos and videos into a directory layout rendered from
//! each file's timestamp.

pub mod cli;
pub mod core;
pub mod error;
pub mod generators;
pub mod models;
pub mod utils;

pub use error::{Error, Result};
