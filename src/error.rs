use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ThumbError {
    #[error("Input must be a file or directory: {0}")]
    InvalidInput(PathBuf),

    #[error("Failed to decode image '{path}': {message}")]
    Decode { path: PathBuf, message: String },

    #[error("{program} failed on '{path}': {stderr}")]
    Subprocess {
        program: String,
        path: PathBuf,
        stderr: String,
    },

    #[error("Failed to render thumbnail for '{path}': {message}")]
    Render { path: PathBuf, message: String },

    #[error("Failed to write output file '{path}': {source}")]
    OutputWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to load label font '{path}': {message}")]
    FontLoad { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to start worker pool: {0}")]
    Pool(String),
}

impl ThumbError {
    pub(crate) fn decode(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        ThumbError::Decode {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub(crate) fn render(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        ThumbError::Render {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
