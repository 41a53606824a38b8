//! Data models for purchasing records and configuration.

pub mod config;
pub mod record;

pub use config::*;
pub use record::*;
