//! Structured editing of XML configuration documents.

mod edit;
mod error;
mod node;
mod parse;
mod source;

pub use edit::{EntryShape, APP_SETTINGS, CONNECTION_STRINGS, ENTRY_TAG};
pub use error::{DocumentError, ParseError};
pub use node::{Attribute, ConfigDocument, Declaration, Element, Node, NodeKind, ROOT_NAME};
pub use source::{read_text, write_text, DocumentSource};
