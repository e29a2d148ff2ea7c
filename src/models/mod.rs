//! Data models.

pub mod candidate;
pub mod config;
pub mod entry;
pub mod persistent;
pub mod result;
