use thiserror::Error;

use crate::document::DocumentError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SubsystemError {
    #[error("cache invalidation rejected for scope '{scope}': {reason}")]
    InvalidationRejected { scope: String, reason: String },

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("failed to deserialize section '{section}': {source}")]
    Deserialize {
        section: String,
        source: toml::de::Error,
    },
}
