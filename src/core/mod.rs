//! Core business logic modules.

pub mod collision;
pub mod duplicate;
pub mod executor;
pub mod metadata;
pub mod progress;
pub mod scanner;
pub mod timestamp;
