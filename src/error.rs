//! Error types for the content build

use std::path::{Path, PathBuf};

use thiserror::Error;

/// A front-matter field that failed the post schema
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}: `{field}` {message}", .path.display())]
pub struct ValidationError {
    /// Source file the field came from
    pub path: PathBuf,
    /// Front-matter field name as written by the author
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl AsRef<Path>, field: &str, message: impl Into<String>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Errors that abort a content build
#[derive(Debug, Error)]
pub enum BuildError {
    /// One or more source files violate the schema
    #[error("{}", describe_validation(.0))]
    Validation(Vec<ValidationError>),

    /// Reading a source or writing an output failed
    #[error("IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serializing the content index failed
    #[error("Failed to serialize content index: {0}")]
    Json(#[from] serde_json::Error),

    /// Bad configuration value
    #[error("Configuration error: {0}")]
    Config(String),
}

impl BuildError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Validation errors carried by this error, if any
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            Self::Validation(errors) => errors,
            _ => &[],
        }
    }
}

impl From<ValidationError> for BuildError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(vec![err])
    }
}

fn describe_validation(errors: &[ValidationError]) -> String {
    let mut out = format!("{} validation error(s) in content", errors.len());
    for err in errors {
        out.push_str("\n  - ");
        out.push_str(&err.to_string());
    }
    out
}

pub type Result<T> = std::result::Result<T, BuildError>;
