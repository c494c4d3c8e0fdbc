use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading configuration or role manifests
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("YAML parse error: {source}")]
    Yaml {
        #[from]
        source: serde_yaml::Error,
    },

    #[error("Invalid input: {message}")]
    Invalid { message: String },
}

impl LoadError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

pub type LoadResult<T> = Result<T, LoadError>;
