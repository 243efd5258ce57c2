use std::path::{Path, PathBuf};

use tracing::debug;

use super::node::{ConfigDocument, Element, ROOT_NAME};
use super::parse::{parse_document, write_document};
use super::DocumentError;

/// Where a document comes from before it is edited and saved.
#[derive(Debug, Clone)]
pub enum DocumentSource {
    Text(String),
    File(PathBuf),
    Scratch,
}

impl DocumentSource {
    /// Materializes the document.
    pub fn load(&self) -> Result<ConfigDocument, DocumentError> {
        match self {
            DocumentSource::Text(content) => ConfigDocument::from_text(content),
            DocumentSource::File(path) => ConfigDocument::from_file(path),
            DocumentSource::Scratch => Ok(ConfigDocument::from_scratch()),
        }
    }

    /// Loads the document, hands it to `mutate`, then writes it to `target`.
    ///
    /// Nothing is written when loading or `mutate` fails.
    pub fn apply_and_save<F>(&self, mutate: F, target: &Path) -> Result<ConfigDocument, DocumentError>
    where
        F: FnOnce(&mut ConfigDocument) -> Result<(), DocumentError>,
    {
        let mut doc = self.load()?;
        mutate(&mut doc)?;
        doc.save(target)?;
        Ok(doc)
    }
}

impl ConfigDocument {
    pub fn from_text(content: &str) -> Result<Self, DocumentError> {
        parse_document(content).map_err(|source| DocumentError::MalformedDocument {
            origin: "string content".to_string(),
            source,
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let contents = read_text(path)?;
        debug!(path = %path.display(), "loaded configuration document");
        parse_document(&contents).map_err(|source| DocumentError::MalformedDocument {
            origin: path.display().to_string(),
            source,
        })
    }

    /// A document holding only an empty configuration root.
    pub fn from_scratch() -> Self {
        Self::with_root(Element::new(ROOT_NAME))
    }

    /// Serializes the document to `path`, replacing whatever is there.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        let path = path.as_ref();
        let persistence = |source| DocumentError::PersistenceFailed {
            path: path.to_path_buf(),
            source,
        };
        let text = write_document(self).map_err(persistence)?;
        write_text(path, &text)?;
        debug!(path = %path.display(), "saved configuration document");
        Ok(())
    }
}

/// Reads a whole file, mapping a missing file to [`DocumentError::NotFound`].
pub fn read_text(path: &Path) -> Result<String, DocumentError> {
    std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            DocumentError::NotFound(path.to_path_buf())
        } else {
            DocumentError::ReadFailed {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })
}

/// Writes `content` verbatim to `path`, replacing any existing file.
pub fn write_text(path: &Path, content: &str) -> Result<(), DocumentError> {
    std::fs::write(path, content).map_err(|source| DocumentError::PersistenceFailed {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::EntryShape;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn test_from_scratch_has_only_root() {
        let doc = ConfigDocument::from_scratch();
        let root = doc.root().unwrap();

        assert_eq!(root.name(), "configuration");
        assert!(root.children().is_empty());
    }

    #[test]
    fn test_from_text_malformed() {
        let result = ConfigDocument::from_text("<configuration><appSettings></configuration>");
        assert!(matches!(result, Err(DocumentError::MalformedDocument { .. })));
    }

    #[test]
    fn test_from_file_missing() {
        let result = ConfigDocument::from_file("/nonexistent/path/app.config");
        assert!(matches!(result, Err(DocumentError::NotFound(_))));
    }

    #[test]
    fn test_from_file_malformed_names_path() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "<configuration>").unwrap();

        let err = ConfigDocument::from_file(file.path()).unwrap_err();
        assert!(matches!(err, DocumentError::MalformedDocument { .. }));
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }

    #[test]
    fn test_scratch_round_trip_through_file() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("app.config");

        DocumentSource::Scratch
            .apply_and_save(
                |doc| {
                    doc.set_app_settings([("a", "1")])?;
                    Ok(())
                },
                &target,
            )
            .unwrap();

        let reloaded = ConfigDocument::from_file(&target).unwrap();
        let section = reloaded.app_settings().unwrap().unwrap();
        assert_eq!(section.entries(EntryShape::KEY_VALUE).collect::<Vec<_>>(), vec![("a", "1")]);
    }

    #[test]
    fn test_save_overwrites_existing_content() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", "Z".repeat(4096)).unwrap();

        ConfigDocument::from_scratch().save(file.path()).unwrap();

        let text = std::fs::read_to_string(file.path()).unwrap();
        assert!(!text.contains('Z'));
        assert!(ConfigDocument::from_text(&text).is_ok());
    }

    #[test]
    fn test_save_to_unwritable_path() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("missing-dir").join("app.config");

        let err = ConfigDocument::from_scratch().save(&target).unwrap_err();
        assert!(matches!(err, DocumentError::PersistenceFailed { ref path, .. } if *path == target));
    }

    #[test]
    fn test_failed_mutation_writes_nothing() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("app.config");
        let source = DocumentSource::Text("<settings/>".into());

        let result = source.apply_and_save(
            |doc| {
                doc.set_app_settings([("k", "v")])?;
                Ok(())
            },
            &target,
        );

        assert!(matches!(result, Err(DocumentError::InvalidDocument { .. })));
        assert!(!target.exists());
    }
}
