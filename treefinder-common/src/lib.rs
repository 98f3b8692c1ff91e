//! # Treefinder Common Library
//!
//! Shared code for the treefinder services:
//! - Error types
//! - TOML configuration loading and data folder resolution
//! - Logging initialisation

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
