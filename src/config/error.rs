//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading `blueprint.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("config `{0}` does not exist")]
    NotFound(PathBuf),

    #[error("invalid config syntax")]
    Toml(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_config_error_display() {
        let io_err = ConfigError::Io(
            PathBuf::from("blueprint.toml"),
            Error::new(ErrorKind::PermissionDenied, "denied"),
        );
        assert!(format!("{io_err}").contains("blueprint.toml"));

        let missing = ConfigError::NotFound(PathBuf::from("site/blueprint.toml"));
        assert!(format!("{missing}").contains("does not exist"));

        let validation_err = ConfigError::Validation("[build.root_page] is empty".to_string());
        assert!(format!("{validation_err}").contains("root_page"));
    }
}
