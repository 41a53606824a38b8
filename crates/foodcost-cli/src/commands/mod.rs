//! CLI command implementations.

pub mod batch;
pub mod compare;
pub mod config;
pub mod pack;
pub mod process;
