use std::path::PathBuf;

use crate::document::DocumentError;
use crate::scope::SubsystemError;
use thiserror::Error;

/// Top-level error type for the dynamic-config library.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("scope '{0}' has no active configuration path")]
    InvalidScope(String),

    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// Not raised by the override controller itself. It lets callers mix
    /// scope reads and overrides in one function returning `Result<_, Error>`
    /// and propagate both with `?`.
    #[error("configuration subsystem error: {0}")]
    Subsystem(#[from] SubsystemError),

    #[error("failed to activate override of scope '{scope}' with '{path}': {source}")]
    OverrideActivationFailed {
        scope: String,
        path: PathBuf,
        source: SubsystemError,
    },

    #[error("restored scope '{scope}' to '{path}' but invalidation failed: {source}")]
    OverrideReleaseWarning {
        scope: String,
        path: PathBuf,
        source: SubsystemError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConfigScope, OverrideSpec};
    use std::fs;
    use tempfile::tempdir;

    fn overridden_setting(scope: &ConfigScope, key: &str) -> Result<Option<String>, Error> {
        let _active = OverrideSpec::for_scope(scope).activate_with_text("<configuration/>")?;
        Ok(scope.read_setting(key)?)
    }

    #[test]
    fn test_scope_reads_propagate_as_subsystem_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.config");
        fs::write(&path, "<configuration/>").unwrap();
        let scope = ConfigScope::with_xml("app", &path);

        assert_eq!(overridden_setting(&scope, "missing").unwrap(), None);

        let wrong_root = dir.path().join("wrong.config");
        fs::write(&wrong_root, "<settings/>").unwrap();
        scope.set_active_path(&wrong_root);
        scope.invalidate_cache().unwrap();
        let result = scope.read_setting("k").map_err(Error::from);
        assert!(matches!(
            result,
            Err(Error::Subsystem(SubsystemError::Document(DocumentError::InvalidDocument { .. })))
        ));
    }
}
