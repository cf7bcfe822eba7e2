//! # wavp Common Library
//!
//! Shared code for the wavp workspace:
//! - Bootstrap configuration (TOML file, resolution order, compiled defaults)
//! - Logging initialization
//! - Common error type

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
