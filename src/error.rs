//! Error types for trimming operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a trim run.
///
/// Every variant is fatal. Elements that merely lack optional type
/// information are handled inside the pruner and never show up here.
#[derive(Debug, Error)]
pub enum TrimError {
    /// IO error while reading the source or writing the destination.
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not well-formed XML.
    #[error("XML error at byte {position}: {message}")]
    Xml { position: usize, message: String },

    /// A required element is absent from the document.
    #[error("Missing required element: {0}")]
    MissingElement(&'static str),

    /// A required attribute is absent from an element.
    #[error("Missing required attribute {attribute} on {element}")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },

    /// A search term list did not compile to a valid regular expression.
    #[error("Invalid name pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// An options file could not be read or decoded.
    #[error("Invalid options file {}: {message}", path.display())]
    Options { path: PathBuf, message: String },
}

impl TrimError {
    /// Create an IO error for the given path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an XML error at a byte position.
    pub fn xml(position: usize, message: impl Into<String>) -> Self {
        Self::Xml {
            position,
            message: message.into(),
        }
    }

    /// Create a missing attribute error.
    pub fn missing_attribute(element: impl Into<String>, attribute: &'static str) -> Self {
        Self::MissingAttribute {
            element: element.into(),
            attribute,
        }
    }
}
