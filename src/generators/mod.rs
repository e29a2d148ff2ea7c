//! Name generators.

pub mod pattern;
