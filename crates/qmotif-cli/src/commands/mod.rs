//! CLI command implementations.

pub mod common;
pub mod graph;
pub mod mine;
