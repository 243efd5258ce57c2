use std::path::PathBuf;
use thiserror::Error;

use super::node::NodeKind;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DocumentError {
    #[error("provided node must have a root of '{expected}', found '{found}'")]
    InvalidDocument { expected: &'static str, found: String },

    #[error("cannot add an element to a node of kind {0}")]
    UnsupportedNodeKind(NodeKind),

    #[error("failed to parse document from {origin}: {source}")]
    MalformedDocument { origin: String, source: ParseError },

    #[error("document file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read document file '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write document to '{path}': {source}")]
    PersistenceFailed {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Structural failures found while building a tree from XML text.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    #[error(transparent)]
    Xml(#[from] quick_xml::Error),

    #[error("document has no root element")]
    MissingRoot,

    #[error("second root element <{0}> after the document root")]
    MultipleRoots(String),

    #[error("element <{0}> is never closed")]
    Unclosed(String),

    #[error("closing tag </{0}> has no matching start tag")]
    UnexpectedClose(String),

    #[error("text content outside the root element")]
    StrayText,

    #[error("document is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}
