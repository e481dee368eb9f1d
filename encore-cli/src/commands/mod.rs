//! Subcommand implementations.

pub mod index;
pub mod resolve;
