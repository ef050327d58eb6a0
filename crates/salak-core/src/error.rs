//! Error types for layer loading and resolution

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building a layer registry or resolving an entry layer
///
/// Resolution is all-or-nothing: any of these aborts the request and no
/// partial configuration is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// An `extends` entry (or the requested entry layer) is not in the registry
    #[error("{}", describe_unknown(.missing, .referenced_by))]
    UnknownLayer {
        missing: String,
        referenced_by: Option<String>,
    },

    /// The traversal revisited a layer already on the active path
    #[error("Cyclic extends: {}", format_cycle(.cycle))]
    CyclicExtends { cycle: Vec<String> },

    /// A layer with this name is already registered
    #[error("Duplicate layer name '{name}'")]
    DuplicateLayer { name: String },
}

impl ConfigError {
    /// Create an unknown-layer error for an `extends` reference
    pub fn unknown_layer(missing: impl Into<String>, referenced_by: impl Into<String>) -> Self {
        Self::UnknownLayer {
            missing: missing.into(),
            referenced_by: Some(referenced_by.into()),
        }
    }

    /// Create an unknown-layer error for a missing entry layer
    pub fn unknown_entry(missing: impl Into<String>) -> Self {
        Self::UnknownLayer {
            missing: missing.into(),
            referenced_by: None,
        }
    }
}

fn describe_unknown(missing: &str, referenced_by: &Option<String>) -> String {
    match referenced_by {
        Some(layer) => format!("Unknown layer '{missing}' extended by '{layer}'"),
        None => format!("Unknown layer '{missing}'"),
    }
}

/// Format cycle for error messages, closing the loop on the first layer
fn format_cycle(cycle: &[String]) -> String {
    let mut parts: Vec<&str> = cycle.iter().map(String::as_str).collect();
    if let Some(first) = cycle.first() {
        parts.push(first);
    }
    parts.join(" → ")
}

/// Main error type for salak operations
#[derive(Debug, Error)]
pub enum SalakError {
    /// Registry or resolution failure
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// File system I/O errors
    #[error("IO error for path '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A definition document could not be parsed in its format
    #[error("Failed to parse {format} layer definition '{path}': {message}")]
    ParseError {
        path: PathBuf,
        format: &'static str,
        message: String,
    },

    /// A definition parsed but its contents are not a valid layer
    #[error("Invalid layer definition '{path}': {message}")]
    InvalidDefinition { path: PathBuf, message: String },

    /// No loader exists for this file extension
    #[error("Unsupported layer definition format: '{path}'")]
    UnsupportedFormat { path: PathBuf },
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Io,
    Parse,
    Definition,
    Format,
}

impl SalakError {
    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            SalakError::Config(_) => ErrorKind::Config,
            SalakError::IoError { .. } => ErrorKind::Io,
            SalakError::ParseError { .. } => ErrorKind::Parse,
            SalakError::InvalidDefinition { .. } => ErrorKind::Definition,
            SalakError::UnsupportedFormat { .. } => ErrorKind::Format,
        }
    }

    /// Check if this error only affects a single definition file
    ///
    /// Directory loading can skip such files when asked to; registry and
    /// resolution errors are never recoverable.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Parse | ErrorKind::Definition | ErrorKind::Format
        )
    }

    /// Create an IO error with path context
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            source,
        }
    }

    /// Create a parse error for a definition document
    pub fn parse_error(
        path: impl Into<PathBuf>,
        format: &'static str,
        message: impl ToString,
    ) -> Self {
        Self::ParseError {
            path: path.into(),
            format,
            message: message.to_string(),
        }
    }

    /// Create an invalid-definition error
    pub fn invalid_definition(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            path: path.into(),
            message: message.into(),
        }
    }
}
