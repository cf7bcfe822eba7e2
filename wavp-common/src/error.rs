//! Common error types for wavp

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for wavp operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across wavp crates
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file could not be read
    #[error("Failed to read config file {path:?}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML or has wrong field types
    #[error("Failed to parse config file {path:?}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_config_read_keeps_cause_in_source() {
        let err = Error::ConfigRead {
            path: PathBuf::from("wavp.toml"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "Failed to read config file \"wavp.toml\"");
        assert_eq!(err.source().map(|s| s.to_string()), Some("denied".to_string()));
    }
}
